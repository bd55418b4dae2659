//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    CourseCommand, CourseQuery, EnrollmentCommand, LoginService, RegistrationsQuery,
    SignupService, StudentsQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub signup: Arc<dyn SignupService>,
    pub students: Arc<dyn StudentsQuery>,
    pub courses: Arc<dyn CourseQuery>,
    pub course_admin: Arc<dyn CourseCommand>,
    pub enrollment: Arc<dyn EnrollmentCommand>,
    pub registrations: Arc<dyn RegistrationsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub signup: Arc<dyn SignupService>,
    pub students: Arc<dyn StudentsQuery>,
    pub courses: Arc<dyn CourseQuery>,
    pub course_admin: Arc<dyn CourseCommand>,
    pub enrollment: Arc<dyn EnrollmentCommand>,
    pub registrations: Arc<dyn RegistrationsQuery>,
    clock: Arc<dyn Clock>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state reading the system clock.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_clock(ports, Arc::new(DefaultClock))
    }

    /// Construct state with an explicit clock, used to age sessions in tests.
    pub fn with_clock(ports: HttpStatePorts, clock: Arc<dyn Clock>) -> Self {
        let HttpStatePorts {
            login,
            signup,
            students,
            courses,
            course_admin,
            enrollment,
            registrations,
        } = ports;
        Self {
            login,
            signup,
            students,
            courses,
            course_admin,
            enrollment,
            registrations,
            clock,
        }
    }

    /// Current instant according to the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}
