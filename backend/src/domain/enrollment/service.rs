//! Enrollment driving ports backed by a [`RegistrationRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    EnrollmentCommand, RegistrationRepository, RegistrationRepositoryError, RegistrationsQuery,
};
use crate::domain::{
    Actor, CourseId, Error, ErrorCode, Registration, RegistrationId, RegistrationView,
};

fn map_repository_error(error: RegistrationRepositoryError) -> Error {
    match error {
        RegistrationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("registration repository unavailable: {message}"))
        }
        RegistrationRepositoryError::Query { message } => {
            Error::internal(format!("registration repository error: {message}"))
        }
        RegistrationRepositoryError::CourseNotFound { .. } => Error::not_found("Course not found"),
        RegistrationRepositoryError::RegistrationNotFound { .. } => {
            Error::not_found("Registration not found")
        }
        RegistrationRepositoryError::Rejected { rejection } => Error::from(rejection),
        RegistrationRepositoryError::Forbidden => Error::from_code(ErrorCode::Forbidden),
    }
}

/// Enrollment service implementing the enroll/drop command and the
/// registrations listing.
#[derive(Clone)]
pub struct EnrollmentService<R> {
    registrations: Arc<R>,
}

impl<R> EnrollmentService<R> {
    /// Create a new service over the registration repository.
    pub fn new(registrations: Arc<R>) -> Self {
        Self { registrations }
    }
}

#[async_trait]
impl<R> EnrollmentCommand for EnrollmentService<R>
where
    R: RegistrationRepository,
{
    async fn enroll(&self, actor: Actor, course: CourseId) -> Result<Registration, Error> {
        let student = actor.user_id();
        match self.registrations.enroll(student, course).await {
            Ok(registration) => {
                debug!(
                    student = %student,
                    course = %course,
                    registration = %registration.id,
                    "enrollment accepted"
                );
                Ok(registration)
            }
            Err(err) => {
                debug!(student = %student, course = %course, reason = %err, "enrollment refused");
                Err(map_repository_error(err))
            }
        }
    }

    async fn drop_registration(&self, actor: Actor, id: RegistrationId) -> Result<(), Error> {
        self.registrations
            .drop_registration(id, actor)
            .await
            .map_err(map_repository_error)?;
        info!(registration = %id, by = %actor.user_id(), "registration dropped");
        Ok(())
    }
}

#[async_trait]
impl<R> RegistrationsQuery for EnrollmentService<R>
where
    R: RegistrationRepository,
{
    async fn list_registrations(&self, actor: Actor) -> Result<Vec<RegistrationView>, Error> {
        let scope = match actor {
            Actor::Admin(_) => None,
            Actor::Student(id) => Some(id),
        };
        self.registrations
            .list_views(scope)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
