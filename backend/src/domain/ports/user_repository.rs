//! Driven port for account persistence.

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserCredentials, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// Username or email is already taken.
        Conflict { message: String } =>
            "user repository conflict: {message}",
    }
}

/// Port for storing and reading accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Duplicate usernames or emails yield
    /// [`UserRepositoryError::Conflict`].
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch an account and its password hash by exact username.
    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError>;

    /// Whether an account with this username exists.
    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError>;

    /// Every student account ordered by id.
    async fn list_students(&self) -> Result<Vec<User>, UserRepositoryError>;
}
