//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod courses;
pub mod error;
pub mod registrations;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod students;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
