//! Driven port for registrations and the enrollment unit of work.

use async_trait::async_trait;

use crate::domain::enrollment::EnrollmentRejection;
use crate::domain::{Actor, CourseId, Registration, RegistrationId, RegistrationView, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration repository adapters.
    pub enum RegistrationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "registration repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "registration repository query failed: {message}",
        /// The target course does not exist.
        CourseNotFound { course_id: i64 } =>
            "course {course_id} not found",
        /// The registration does not exist.
        RegistrationNotFound { registration_id: i64 } =>
            "registration {registration_id} not found",
        /// The enrollment policy refused the request.
        Rejected { rejection: EnrollmentRejection } =>
            "enrollment rejected: {rejection}",
        /// The actor may not drop this registration.
        Forbidden =>
            "registration belongs to another student",
    }
}

/// Port for the enrollment critical sections.
///
/// Implementations evaluate the policy in
/// [`crate::domain::enrollment::policy`] against a snapshot taken while the
/// affected student and course are locked, and apply the registration row and
/// counter change in the same unit of work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Admit `student` into `course` and take a seat.
    async fn enroll(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<Registration, RegistrationRepositoryError>;

    /// Delete a registration on behalf of `actor` and release its seat.
    async fn drop_registration(
        &self,
        id: RegistrationId,
        actor: Actor,
    ) -> Result<(), RegistrationRepositoryError>;

    /// Registrations joined with course and student fields, ordered by course
    /// code then id. `None` lists every student's registrations.
    async fn list_views(
        &self,
        student: Option<UserId>,
    ) -> Result<Vec<RegistrationView>, RegistrationRepositoryError>;
}
