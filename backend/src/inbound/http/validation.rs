//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive with every field optional so a missing member is
//! reported as a domain `invalid_request` error with `{field, code}` details
//! instead of a framework rejection.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{CourseValidationError, Error, LoginValidationError, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldErrorCode {
    MissingField,
    InvalidNumber,
    InvalidId,
    MalformedBody,
}

impl FieldErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidNumber => "invalid_number",
            Self::InvalidId => "invalid_id",
            Self::MalformedBody => "malformed_body",
        }
    }
}

pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

pub(crate) fn missing_field_error(field: &'static str) -> Error {
    field_error(
        field,
        FieldErrorCode::MissingField.as_str(),
        format!("missing required field: {field}"),
    )
}

/// Unwrap an optional request member or report it as missing.
pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Integer request member that also accepts its decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum IntegerInput {
    Number(i64),
    Text(String),
}

impl IntegerInput {
    pub(crate) fn parse(self, field: &'static str) -> Result<i64, Error> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(raw) => raw.trim().parse().map_err(|_| {
                field_error(
                    field,
                    FieldErrorCode::InvalidNumber.as_str(),
                    format!("{field} must be a whole number"),
                )
            }),
        }
    }
}

impl From<i64> for IntegerInput {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Parse a positive integer identifier from a path segment.
pub(crate) fn parse_path_id(raw: &str, field: &'static str) -> Result<i64, Error> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| invalid_id_error(field))
}

pub(crate) fn invalid_id_error(field: &'static str) -> Error {
    field_error(
        field,
        FieldErrorCode::InvalidId.as_str(),
        format!("{field} must be a positive integer"),
    )
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match &err {
        UserValidationError::InvalidId => ("id", "invalid_id"),
        UserValidationError::EmptyUsername => ("username", "empty"),
        UserValidationError::UsernameTooLong { .. } => ("username", "too_long"),
        UserValidationError::UsernameInvalidCharacters => ("username", "invalid_characters"),
        UserValidationError::EmptyEmail => ("email", "empty"),
        UserValidationError::InvalidEmail => ("email", "invalid_email"),
        UserValidationError::EmptyPassword => ("password", "empty"),
        UserValidationError::UnknownRole => ("role", "unknown_role"),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn map_course_validation_error(err: CourseValidationError) -> Error {
    field_error(err.field(), err.reason(), err.to_string())
}

/// JSON extractor configuration that reports body errors in the API's error
/// shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    field_error(
        "body",
        FieldErrorCode::MalformedBody.as_str(),
        format!("request body is not valid JSON: {err}"),
    )
    .into()
}
