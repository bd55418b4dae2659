//! Test helpers for inbound HTTP components.

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use crate::domain::{AccountsService, SignupDetails};
use crate::inbound::http::session_config::SessionSettings;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::outbound::security::Argon2PasswordHasher;
use crate::server::{AppDependencies, memory_ports};

pub(crate) const ADMIN_USERNAME: &str = "admin";
pub(crate) const ADMIN_PASSWORD: &str = "admin123";

/// Clock that only moves when told to.
pub(crate) struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub(crate) fn advance(&self, delta: TimeDelta) {
        *self.0.lock().expect("clock mutex") += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over a fresh in-memory store holding the default admin.
pub(crate) async fn seeded_state_with_clock(clock: Arc<dyn Clock>) -> web::Data<HttpState> {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(Argon2PasswordHasher);
    let accounts = AccountsService::new(store.clone(), hasher.clone());
    let admin = SignupDetails::try_from_parts(ADMIN_USERNAME, ADMIN_PASSWORD, "admin@uni.edu")
        .expect("admin fixture");
    accounts.ensure_admin(&admin).await.expect("seed admin");
    web::Data::new(HttpState::with_clock(memory_ports(store, hasher), clock))
}

pub(crate) async fn seeded_state() -> web::Data<HttpState> {
    seeded_state_with_clock(Arc::new(DefaultClock)).await
}

/// Dependencies for the full application with a throwaway session key.
pub(crate) fn app_deps(http_state: web::Data<HttpState>) -> AppDependencies {
    AppDependencies {
        http_state,
        session: SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        },
    }
}

pub(crate) fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Send a JSON request and decode the JSON reply.
pub(crate) async fn call_json<S>(
    app: &S,
    req: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (actix_web::http::StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    };
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON response body")
    };
    (status, value)
}

/// Log in and return the session cookie.
pub(crate) async fn login_cookie<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    session_cookie(&res).expect("login sets a session cookie")
}

/// Create a student account and log it in.
pub(crate) async fn student_cookie<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/signup")
        .set_json(json!({
            "username": username,
            "password": "pw",
            "email": format!("{username}@uni.edu"),
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "signup failed: {}", res.status());
    login_cookie(app, username, "pw").await
}

/// Course payload in the shape the browser form posts.
pub(crate) fn course_body(code: &str, day: &str, start: &str, end: &str, capacity: u32) -> Value {
    json!({
        "code": code,
        "name": format!("{code} lecture"),
        "instructor": "Dr. Smith",
        "credits": "3",
        "capacity": capacity.to_string(),
        "day": day,
        "start_time": start,
        "end_time": end,
        "semester": "Fall 2024",
        "description": "",
    })
}

/// Create a course as the admin and return its id.
pub(crate) async fn create_course_as<S>(app: &S, admin: &Cookie<'static>, body: Value) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, value) = call_json(
        app,
        test::TestRequest::post().uri("/api/courses").set_json(body),
        Some(admin),
    )
    .await;
    assert!(status.is_success(), "course creation failed: {value}");
    value["id"].as_i64().expect("course id")
}
