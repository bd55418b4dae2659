//! Registration join entity linking a student to a course.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::course::{CourseCode, CourseId, MeetingTime};
use super::user::{UserId, Username};

/// Store-allocated registration identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i64")]
pub struct RegistrationId(i64);

/// Error returned when an identifier is not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRegistrationId;

impl fmt::Display for InvalidRegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration id must be a positive integer")
    }
}

impl std::error::Error for InvalidRegistrationId {}

impl RegistrationId {
    /// Validate and construct a [`RegistrationId`].
    pub fn new(id: i64) -> Result<Self, InvalidRegistrationId> {
        if id <= 0 {
            return Err(InvalidRegistrationId);
        }
        Ok(Self(id))
    }

    /// Raw integer value as stored.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RegistrationId> for i64 {
    fn from(value: RegistrationId) -> Self {
        value.0
    }
}

/// Lifecycle state of a registration. Dropping deletes the row, so only
/// active enrollments are ever stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Enrolled,
}

impl RegistrationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
        }
    }
}

/// Active enrollment of one student in one course.
///
/// ## Invariants
/// - At most one registration exists per `(student_id, course_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: RegistrationId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

/// Registration joined with the course and student display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationView {
    pub registration: Registration,
    pub code: CourseCode,
    pub name: String,
    pub instructor: String,
    pub credits: u32,
    pub schedule: MeetingTime,
    pub username: Username,
}

/// Course already held by a student, as consulted by the conflict scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCourse {
    pub course_id: CourseId,
    pub code: CourseCode,
    pub schedule: MeetingTime,
}
