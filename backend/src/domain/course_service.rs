//! Course catalogue services.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{CourseCommand, CourseQuery, CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseDetails, CourseId, Error, NewCourse};

fn map_repository_error(error: CourseRepositoryError) -> Error {
    match error {
        CourseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CourseRepositoryError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
        CourseRepositoryError::DuplicateCode { .. } => {
            Error::conflict("Course code already exists")
        }
        CourseRepositoryError::NotFound { .. } => Error::not_found("Course not found"),
        err @ CourseRepositoryError::CapacityBelowEnrollment { .. } => {
            Error::invalid_request(err.to_string())
                .with_details(serde_json::json!({ "field": "capacity", "code": "below_enrolled" }))
        }
    }
}

/// Catalogue service implementing [`CourseQuery`] and [`CourseCommand`].
#[derive(Clone)]
pub struct CourseService<R> {
    courses: Arc<R>,
}

impl<R> CourseService<R> {
    /// Create a new service over the course repository.
    pub fn new(courses: Arc<R>) -> Self {
        Self { courses }
    }
}

#[async_trait]
impl<R> CourseQuery for CourseService<R>
where
    R: CourseRepository,
{
    async fn list_courses(&self) -> Result<Vec<Course>, Error> {
        self.courses.list().await.map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> CourseCommand for CourseService<R>
where
    R: CourseRepository,
{
    async fn create_course(&self, course: NewCourse) -> Result<CourseId, Error> {
        let id = self
            .courses
            .create(&course)
            .await
            .map_err(map_repository_error)?;
        info!(course = %id, code = %course.code, "course created");
        Ok(id)
    }

    async fn update_course(&self, id: CourseId, details: CourseDetails) -> Result<Course, Error> {
        self.courses
            .update(id, &details)
            .await
            .map_err(map_repository_error)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), Error> {
        let removed = self
            .courses
            .delete_with_registrations(id)
            .await
            .map_err(map_repository_error)?;
        info!(course = %id, registrations_removed = removed, "course deleted");
        Ok(())
    }
}
