//! Domain ports for the hexagonal boundary.
//!
//! Driving ports are the use-cases inbound adapters call. Driven ports are
//! implemented by outbound adapters (PostgreSQL, in-memory, Argon2).

mod macros;
pub(crate) use macros::define_port_error;

mod course_command;
mod course_query;
mod course_repository;
mod enrollment_command;
mod login_service;
mod password_hasher;
mod registration_repository;
mod registrations_query;
mod signup_service;
mod students_query;
mod user_repository;

pub use course_command::CourseCommand;
pub use course_query::CourseQuery;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError};
pub use enrollment_command::EnrollmentCommand;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use registration_repository::MockRegistrationRepository;
pub use registration_repository::{RegistrationRepository, RegistrationRepositoryError};
pub use registrations_query::RegistrationsQuery;
pub use signup_service::SignupService;
pub use students_query::StudentsQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
