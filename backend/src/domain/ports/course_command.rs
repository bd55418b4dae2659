//! Driving port for administrative catalogue changes.

use async_trait::async_trait;

use crate::domain::{Course, CourseDetails, CourseId, Error, NewCourse};

/// Domain use-case port for creating, editing and removing courses.
#[async_trait]
pub trait CourseCommand: Send + Sync {
    /// Create a course; a duplicate code yields `Conflict`.
    async fn create_course(&self, course: NewCourse) -> Result<CourseId, Error>;

    /// Replace the editable fields of an existing course.
    async fn update_course(&self, id: CourseId, details: CourseDetails) -> Result<Course, Error>;

    /// Remove a course and every registration referencing it.
    async fn delete_course(&self, id: CourseId) -> Result<(), Error>;
}
