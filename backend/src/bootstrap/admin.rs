//! Default administrator seeding.

use tracing::info;

use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::{AccountsService, Error, SignupDetails};

/// Create the configured administrator unless the username is taken.
///
/// Safe to run on every start; an existing account is left untouched.
///
/// # Errors
/// Returns the domain error raised by the account store or hasher.
pub async fn seed_default_admin<U, H>(
    accounts: &AccountsService<U, H>,
    details: &SignupDetails,
) -> Result<(), Error>
where
    U: UserRepository,
    H: PasswordHasher,
{
    if !accounts.ensure_admin(details).await? {
        info!(username = %details.username(), "default admin already present");
    }
    Ok(())
}
