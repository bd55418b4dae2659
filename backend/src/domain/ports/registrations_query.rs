//! Driving port for registration listings.

use async_trait::async_trait;

use crate::domain::{Actor, Error, RegistrationView};

/// Domain use-case port for reading registrations.
#[async_trait]
pub trait RegistrationsQuery: Send + Sync {
    /// Students see their own registrations; administrators see all.
    async fn list_registrations(&self, actor: Actor) -> Result<Vec<RegistrationView>, Error>;
}
