//! Domain primitives, the Enrollment Engine and domain services.
//!
//! Purpose: define strongly typed entities shared by the HTTP and
//! persistence adapters, plus the services that implement the driving ports.
//! Types validate their invariants at construction and document them in
//! Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Identity / Actor / SessionGrant: the access-control gate.
//! - User, Course, Registration and their identifiers.
//! - enrollment: admission policy and the enrollment service.

pub mod access;
pub mod accounts_service;
pub mod auth;
pub mod course;
pub mod course_service;
pub mod enrollment;
pub mod error;
pub mod ports;
pub mod registration;
pub mod trace_id;
pub mod user;

pub use self::access::{Actor, Identity, SESSION_MAX_AGE_HOURS, SessionGrant};
pub use self::accounts_service::AccountsService;
pub use self::auth::{LoginCredentials, LoginValidationError, SignupDetails};
pub use self::course::{
    ClockTime, Course, CourseCode, CourseDetails, CourseDraft, CourseId, CourseValidationError,
    MeetingTime, NewCourse, Weekday,
};
pub use self::course_service::CourseService;
pub use self::enrollment::EnrollmentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::registration::{
    InvalidRegistrationId, Registration, RegistrationId, RegistrationStatus, RegistrationView,
    ScheduledCourse,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, NewUser, Role, User, UserCredentials, UserId, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use registrar::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("Forbidden"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
