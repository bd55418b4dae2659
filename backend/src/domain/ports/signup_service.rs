//! Driving port for self-service account creation.

use async_trait::async_trait;

use crate::domain::{Error, SignupDetails, User};

/// Domain use-case port for creating student accounts.
#[async_trait]
pub trait SignupService: Send + Sync {
    /// Create a student account; a taken username or email yields `Conflict`.
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error>;
}
