//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` handler, the request and response
//! bodies they use, and the session cookie security scheme. The document is
//! served by Swagger UI in debug builds and printed by the `openapi-dump`
//! binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, RegistrationStatus, Role, Weekday};
use crate::inbound::http::accounts::{
    LoginRequest, LoginResponse, SessionStatusResponse, SignupRequest,
};
use crate::inbound::http::courses::{CourseRequest, CourseResponse};
use crate::inbound::http::registrations::{RegistrationRequest, RegistrationResponse};
use crate::inbound::http::schemas::{CreatedResponse, SuccessResponse};
use crate::inbound::http::students::StudentResponse;
use crate::inbound::http::validation::IntegerInput;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Registrar API",
        description = "Course catalogue, enrollment and account endpoints behind a cookie session."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::session_status,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::registrations::list_registrations,
        crate::inbound::http::registrations::create_registration,
        crate::inbound::http::registrations::delete_registration,
        crate::inbound::http::students::list_students,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        Weekday,
        RegistrationStatus,
        IntegerInput,
        SignupRequest,
        LoginRequest,
        LoginResponse,
        SessionStatusResponse,
        CourseRequest,
        CourseResponse,
        RegistrationRequest,
        RegistrationResponse,
        StudentResponse,
        SuccessResponse,
        CreatedResponse,
    )),
    tags(
        (name = "accounts", description = "Sign-up, login and the student roster"),
        (name = "courses", description = "Course catalogue administration"),
        (name = "registrations", description = "Enrollment and drop")
    )
)]
pub struct ApiDoc;
