//! Builders wiring domain services over the configured store into
//! [`HttpState`].

use std::sync::Arc;

use crate::bootstrap::seed_default_admin;
use crate::domain::ports::{
    CourseRepository, PasswordHasher, RegistrationRepository, UserRepository,
};
use crate::domain::{AccountsService, CourseService, EnrollmentService, Error, SignupDetails};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselCourseRepository, DieselRegistrationRepository, DieselUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Services assembled over one set of repositories.
struct Wiring<U, H> {
    ports: HttpStatePorts,
    accounts: Arc<AccountsService<U, H>>,
}

fn wire<U, C, R, H>(
    users: Arc<U>,
    courses: Arc<C>,
    registrations: Arc<R>,
    hasher: Arc<H>,
) -> Wiring<U, H>
where
    U: UserRepository + 'static,
    C: CourseRepository + 'static,
    R: RegistrationRepository + 'static,
    H: PasswordHasher + 'static,
{
    let accounts = Arc::new(AccountsService::new(users, hasher));
    let catalogue = Arc::new(CourseService::new(courses));
    let enrollment = Arc::new(EnrollmentService::new(registrations));
    let ports = HttpStatePorts {
        login: accounts.clone(),
        signup: accounts.clone(),
        students: accounts.clone(),
        courses: catalogue.clone(),
        course_admin: catalogue,
        enrollment: enrollment.clone(),
        registrations: enrollment,
    };
    Wiring { ports, accounts }
}

/// Ports served by a single in-memory store.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use registrar::inbound::http::state::HttpState;
/// use registrar::outbound::memory::MemoryStore;
/// use registrar::outbound::security::Argon2PasswordHasher;
/// use registrar::server::memory_ports;
///
/// let state = HttpState::new(memory_ports(
///     Arc::new(MemoryStore::new()),
///     Arc::new(Argon2PasswordHasher),
/// ));
/// let _courses = state.courses.clone();
/// ```
pub fn memory_ports<H>(store: Arc<MemoryStore>, hasher: Arc<H>) -> HttpStatePorts
where
    H: PasswordHasher + 'static,
{
    wire(store.clone(), store.clone(), store, hasher).ports
}

async fn finish<U, H>(
    wiring: Wiring<U, H>,
    admin: Option<&SignupDetails>,
) -> Result<HttpState, Error>
where
    U: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    if let Some(details) = admin {
        seed_default_admin(&wiring.accounts, details).await?;
    }
    Ok(HttpState::new(wiring.ports))
}

fn diesel_wiring(pool: &DbPool) -> Wiring<DieselUserRepository, Argon2PasswordHasher> {
    wire(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselCourseRepository::new(pool.clone())),
        Arc::new(DieselRegistrationRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher),
    )
}

/// Build handler state for the configured store, seeding the default
/// administrator when `admin` is given.
///
/// # Errors
/// Returns the domain error raised while seeding the administrator.
pub async fn build_http_state(
    config: &ServerConfig,
    admin: Option<&SignupDetails>,
) -> Result<HttpState, Error> {
    match &config.db_pool {
        Some(pool) => finish(diesel_wiring(pool), admin).await,
        None => {
            let store = Arc::new(MemoryStore::new());
            let wiring = wire(store.clone(), store.clone(), store, Arc::new(Argon2PasswordHasher));
            finish(wiring, admin).await
        }
    }
}
