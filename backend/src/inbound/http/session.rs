//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: recording a [`SessionGrant`] at login and
//! resolving the caller's [`Identity`] on every request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::{Error, Identity, SessionGrant};

pub(crate) const GRANT_KEY: &str = "grant";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record a fresh login. The session id is renewed first so a cookie
    /// planted before login cannot be reused afterwards.
    pub fn persist_grant(&self, grant: &SessionGrant) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(GRANT_KEY, grant)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The live grant, if any. Unreadable or expired payloads are purged and
    /// read as logged out.
    pub fn grant(&self, now: DateTime<Utc>) -> Option<SessionGrant> {
        let grant = match self.0.get::<SessionGrant>(GRANT_KEY) {
            Ok(grant) => grant?,
            Err(error) => {
                warn!(%error, "discarding unreadable session payload");
                self.purge();
                return None;
            }
        };
        if grant.is_expired(now) {
            debug!(user_id = %grant.user_id, issued_at = %grant.issued_at, "session expired");
            self.purge();
            return None;
        }
        Some(grant)
    }

    /// Classify the caller for the access guards.
    pub fn identity(&self, now: DateTime<Utc>) -> Identity {
        self.grant(now)
            .map_or(Identity::Anonymous, |grant| grant.identity())
    }

    /// Drop every session value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
