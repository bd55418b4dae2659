//! Account services: login, sign-up, the student roster and admin seeding.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginService, PasswordHasher, PasswordHasherError, SignupService, StudentsQuery,
    UserRepository, UserRepositoryError,
};
use crate::domain::{Error, ErrorCode, LoginCredentials, NewUser, Role, SignupDetails, User};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Conflict { .. } => {
            Error::conflict("Username or email already exists")
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Account service implementing the login, sign-up and roster ports.
#[derive(Clone)]
pub struct AccountsService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountsService<U, H> {
    /// Create a new service over the account repository and hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<U, H> AccountsService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn create_account(&self, details: &SignupDetails, role: Role) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(map_hasher_error)?;
        let new_user = NewUser {
            username: details.username().clone(),
            email: details.email().clone(),
            password_hash,
            role,
        };
        self.users
            .create(&new_user)
            .await
            .map_err(map_repository_error)
    }

    /// Create an administrator account unless the username is already taken.
    ///
    /// Returns `true` when an account was created. A concurrent creation that
    /// wins the race is reported as already present.
    pub async fn ensure_admin(&self, details: &SignupDetails) -> Result<bool, Error> {
        let exists = self
            .users
            .username_exists(details.username())
            .await
            .map_err(map_repository_error)?;
        if exists {
            return Ok(false);
        }
        match self.create_account(details, Role::Admin).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "default admin created");
                Ok(true)
            }
            Err(err) if err.code() == ErrorCode::Conflict => {
                warn!(username = %details.username(), "default admin created concurrently");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl<U, H> LoginService for AccountsService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_username(credentials.username())
            .await
            .map_err(map_repository_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user)
    }
}

#[async_trait]
impl<U, H> SignupService for AccountsService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error> {
        let user = self.create_account(details, Role::Student).await?;
        info!(user_id = %user.id, username = %user.username, "student account created");
        Ok(user)
    }
}

#[async_trait]
impl<U, H> StudentsQuery for AccountsService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn list_students(&self) -> Result<Vec<User>, Error> {
        self.users
            .list_students()
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "accounts_service_tests.rs"]
mod tests;
