//! Per-request identity and the access guards evaluated before any use-case.
//!
//! Inbound adapters resolve the caller into an [`Identity`] once per request
//! and pass the narrowed [`Actor`] into domain services, so no service reads
//! ambient session state.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::user::{Role, UserId, Username};
use super::{Error, ErrorCode};

/// Maximum lifetime of a session measured from login.
pub const SESSION_MAX_AGE_HOURS: i64 = 24;

/// Caller classification for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Student(UserId),
    Admin(UserId),
}

/// Authenticated caller, as handed to domain services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Student(UserId),
    Admin(UserId),
}

impl Actor {
    pub fn user_id(self) -> UserId {
        match self {
            Self::Student(id) | Self::Admin(id) => id,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin(_))
    }
}

impl Identity {
    /// Build an identity for an authenticated user of the given role.
    pub fn for_role(user_id: UserId, role: Role) -> Self {
        match role {
            Role::Student => Self::Student(user_id),
            Role::Admin => Self::Admin(user_id),
        }
    }

    /// Pass for any authenticated caller.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::{ErrorCode, Identity};
    ///
    /// let err = Identity::Anonymous.require_auth().unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::Unauthorized);
    /// ```
    pub fn require_auth(self) -> Result<Actor, Error> {
        match self {
            Self::Anonymous => Err(Error::from_code(ErrorCode::Unauthorized)),
            Self::Student(id) => Ok(Actor::Student(id)),
            Self::Admin(id) => Ok(Actor::Admin(id)),
        }
    }

    /// Pass only for administrators. Anonymous callers are also refused with
    /// `Forbidden`.
    pub fn require_admin(self) -> Result<Actor, Error> {
        match self {
            Self::Admin(id) => Ok(Actor::Admin(id)),
            Self::Anonymous | Self::Student(_) => Err(Error::from_code(ErrorCode::Forbidden)),
        }
    }
}

/// Session payload recorded at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub user_id: UserId,
    pub username: Username,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

impl SessionGrant {
    /// Whether the grant has outlived [`SESSION_MAX_AGE_HOURS`] at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.issued_at) >= TimeDelta::hours(SESSION_MAX_AGE_HOURS)
    }

    pub fn identity(&self) -> Identity {
        Identity::for_role(self.user_id, self.role)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    fn uid(raw: i64) -> UserId {
        UserId::new(raw).expect("valid id")
    }

    #[fixture]
    fn grant() -> SessionGrant {
        SessionGrant {
            user_id: uid(7),
            username: Username::new("s1").expect("valid username"),
            role: Role::Student,
            issued_at: DateTime::parse_from_rfc3339("2024-09-01T08:00:00Z")
                .expect("valid timestamp")
                .with_timezone(&Utc),
        }
    }

    #[rstest]
    #[case(Identity::Anonymous, Err(ErrorCode::Unauthorized))]
    #[case(Identity::Student(uid(3)), Ok(Actor::Student(uid(3))))]
    #[case(Identity::Admin(uid(1)), Ok(Actor::Admin(uid(1))))]
    fn require_auth_classifies(
        #[case] identity: Identity,
        #[case] expected: Result<Actor, ErrorCode>,
    ) {
        assert_eq!(identity.require_auth().map_err(|err| err.code()), expected);
    }

    #[rstest]
    #[case(Identity::Anonymous, Err(ErrorCode::Forbidden))]
    #[case(Identity::Student(uid(3)), Err(ErrorCode::Forbidden))]
    #[case(Identity::Admin(uid(1)), Ok(Actor::Admin(uid(1))))]
    fn require_admin_classifies(
        #[case] identity: Identity,
        #[case] expected: Result<Actor, ErrorCode>,
    ) {
        assert_eq!(identity.require_admin().map_err(|err| err.code()), expected);
    }

    #[rstest]
    #[case(TimeDelta::zero(), false)]
    #[case(TimeDelta::hours(23) + TimeDelta::minutes(59), false)]
    #[case(TimeDelta::hours(24), true)]
    #[case(TimeDelta::days(3), true)]
    fn grants_expire_after_a_day(
        grant: SessionGrant,
        #[case] elapsed: TimeDelta,
        #[case] expired: bool,
    ) {
        let now = grant.issued_at + elapsed;
        assert_eq!(grant.is_expired(now), expired);
    }

    #[rstest]
    fn grant_identity_follows_role(mut grant: SessionGrant) {
        assert_eq!(grant.identity(), Identity::Student(uid(7)));
        grant.role = Role::Admin;
        assert_eq!(grant.identity(), Identity::Admin(uid(7)));
    }
}
