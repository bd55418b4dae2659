//! Driving port for enrolling in and dropping courses.

use async_trait::async_trait;

use crate::domain::{Actor, CourseId, Error, Registration, RegistrationId};

/// Domain use-case port for the Enrollment Engine's mutating operations.
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Enroll the acting user in a course.
    async fn enroll(&self, actor: Actor, course: CourseId) -> Result<Registration, Error>;

    /// Drop a registration. Students may only drop their own.
    async fn drop_registration(&self, actor: Actor, id: RegistrationId) -> Result<(), Error>;
}
