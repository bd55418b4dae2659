//! Driving port for the administrator's student roster.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Domain use-case port for listing student accounts.
#[async_trait]
pub trait StudentsQuery: Send + Sync {
    /// Every student account ordered by id.
    async fn list_students(&self) -> Result<Vec<User>, Error>;
}
