//! Account API handlers: sign-up, login, logout and session status.
//!
//! ```text
//! POST /api/signup {"username":"s1","password":"pw","email":"s1@uni.edu"}
//! POST /api/login {"username":"admin","password":"admin123"}
//! POST /api/logout
//! GET /api/session
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, Role, SessionGrant, SignupDetails};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::SuccessResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    map_login_validation_error, map_user_validation_error, require,
};

/// Sign-up request body for `POST /api/signup`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "s1")]
    pub username: Option<String>,
    #[schema(example = "pw")]
    pub password: Option<String>,
    #[schema(example = "s1@uni.edu")]
    pub email: Option<String>,
}

impl TryFrom<SignupRequest> for SignupDetails {
    type Error = Error;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        let username = require(value.username, "username")?;
        let password = require(value.password, "password")?;
        let email = require(value.email, "email")?;
        Self::try_from_parts(&username, &password, &email).map_err(map_user_validation_error)
    }
}

/// Login request body for `POST /api/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: Option<String>,
    #[schema(example = "admin123")]
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let username = require(value.username, "username")?;
        let password = require(value.password, "password")?;
        Self::try_from_parts(&username, &password).map_err(map_login_validation_error)
    }
}

/// Successful login reply.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub role: Role,
    #[schema(example = "admin")]
    pub username: String,
}

/// Current session as seen by the browser client.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Create a student account.
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = SuccessResponse),
        (status = 400, description = "Invalid request or duplicate account", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let details = SignupDetails::try_from(payload.into_inner())?;
    state.signup.signup(&details).await?;
    Ok(web::Json(SuccessResponse::with_message(
        "Registration successful",
    )))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let user = state.login.authenticate(&credentials).await?;
    let grant = SessionGrant {
        user_id: user.id,
        username: user.username.clone(),
        role: user.role,
        issued_at: state.now(),
    };
    session.persist_grant(&grant)?;
    debug!(user_id = %user.id, role = %user.role, "session established");
    Ok(web::Json(LoginResponse {
        success: true,
        role: user.role,
        username: user.username.into(),
    }))
}

/// End the session. Succeeds without a session too.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Session cleared", body = SuccessResponse)),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> web::Json<SuccessResponse> {
    session.purge();
    web::Json(SuccessResponse::ok())
}

/// Report whether the caller holds a live session.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Session status", body = SessionStatusResponse)),
    tags = ["accounts"],
    operation_id = "sessionStatus",
    security([])
)]
#[get("/session")]
pub async fn session_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> web::Json<SessionStatusResponse> {
    let status = match session.grant(state.now()) {
        Some(grant) => SessionStatusResponse {
            logged_in: true,
            role: Some(grant.role),
            username: Some(grant.username.into()),
        },
        None => SessionStatusResponse {
            logged_in: false,
            role: None,
            username: None,
        },
    };
    web::Json(status)
}
