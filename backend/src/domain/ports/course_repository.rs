//! Driven port for the course catalogue.

use async_trait::async_trait;

use crate::domain::{Course, CourseDetails, CourseId, NewCourse};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "course repository query failed: {message}",
        /// Another course already uses the code.
        DuplicateCode { code: String } =>
            "course code {code} already exists",
        /// No course has the requested id.
        NotFound { course_id: i64 } =>
            "course {course_id} not found",
        /// The requested capacity is lower than the seats already taken.
        CapacityBelowEnrollment { enrolled: u32 } =>
            "capacity cannot be lower than the {enrolled} seats already taken",
    }
}

/// Port for catalogue reads and administrative writes.
///
/// Writes that touch the enrollment counter or registrations lock the course
/// for the duration of the change.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// All courses ordered by code.
    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Insert a course with no enrollments and return its id.
    async fn create(&self, course: &NewCourse) -> Result<CourseId, CourseRepositoryError>;

    /// Replace the editable fields of a course, keeping code and counter.
    async fn update(
        &self,
        id: CourseId,
        details: &CourseDetails,
    ) -> Result<Course, CourseRepositoryError>;

    /// Delete a course together with every registration referencing it.
    /// Returns the number of registrations removed.
    async fn delete_with_registrations(&self, id: CourseId) -> Result<u64, CourseRepositoryError>;
}
