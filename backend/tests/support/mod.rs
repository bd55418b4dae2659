//! Live-server harness shared by the behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server itself runs several
//! workers over one in-memory store, so concurrent requests really do race.
//! Dropping the `WorldFixture` stops the server even if a step panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{HttpServer, web};
use awc::Client;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use registrar::bootstrap::seed_default_admin;
use registrar::domain::{AccountsService, SignupDetails, TRACE_ID_HEADER};
use registrar::inbound::http::session_config::SessionSettings;
use registrar::inbound::http::state::HttpState;
use registrar::outbound::memory::MemoryStore;
use registrar::outbound::security::Argon2PasswordHasher;
use registrar::server::{AppDependencies, build_app, memory_ports};

pub(crate) mod steps;

pub(crate) const ADMIN: &str = "admin";
pub(crate) const ADMIN_PASSWORD: &str = "admin123";
pub(crate) const STUDENT_PASSWORD: &str = "pw";

/// Outcome of the most recent request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) trace_id: Option<String>,
    pub(crate) body: Value,
}

impl Reply {
    pub(crate) fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

pub(crate) struct RegistrarWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    /// Session cookie pair per logged-in username.
    pub(crate) sessions: HashMap<String, String>,
    /// Course id per course code, recorded as courses are created.
    pub(crate) courses: HashMap<String, i64>,
    pub(crate) last: Option<Reply>,
    /// `Set-Cookie` pair from the most recent reply, if any.
    pub(crate) last_set_cookie: Option<String>,
    pub(crate) replies: Vec<Reply>,
}

pub(crate) type SharedWorld = Rc<RefCell<RegistrarWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// Run `operation` on the harness runtime with the server's base URL.
///
/// The world stays borrowed for the duration, so the future must not touch it.
pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

async fn seeded_state() -> HttpState {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(Argon2PasswordHasher);
    let accounts = AccountsService::new(store.clone(), hasher.clone());
    let admin = SignupDetails::try_from_parts(ADMIN, ADMIN_PASSWORD, "admin@university.edu")
        .expect("admin details");
    seed_default_admin(&accounts, &admin)
        .await
        .expect("seed admin");
    HttpState::new(memory_ports(store, hasher))
}

async fn spawn_server(http_state: HttpState) -> (String, ServerHandle) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let http_state = web::Data::new(http_state);
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .disable_signals()
    .workers(4)
    .listen(listener)
    .expect("listen on test socket")
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{addr}"), handle)
}

pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let (base_url, server) = local.block_on(&runtime, async {
        let state = seeded_state().await;
        spawn_server(state).await
    });

    WorldFixture {
        world: Rc::new(RefCell::new(RegistrarWorld {
            runtime,
            local,
            base_url,
            server,
            sessions: HashMap::new(),
            courses: HashMap::new(),
            last: None,
            last_set_cookie: None,
            replies: Vec::new(),
        })),
    }
}

/// One HTTP call: method, path, optional cookie and optional JSON body.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) cookie: Option<String>,
    pub(crate) payload: Option<Value>,
}

impl Call {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            cookie: None,
            payload: None,
        }
    }

    pub(crate) fn cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }

    pub(crate) fn json(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Send `call` and return the reply alongside any `Set-Cookie` pair.
pub(crate) async fn send(base_url: &str, call: Call) -> (Reply, Option<String>) {
    let Call {
        method,
        path,
        cookie,
        payload,
    } = call;
    let mut request = Client::default().request(method, format!("{base_url}{path}"));
    if let Some(cookie) = cookie {
        request = request.insert_header((header::COOKIE, cookie));
    }
    let mut response = match payload {
        Some(payload) => request.send_json(&payload).await.expect("send request"),
        None => request.send().await.expect("send request"),
    };

    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_owned);
    let status = response.status().as_u16();
    let bytes = response.body().await.expect("response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (
        Reply {
            status,
            trace_id,
            body,
        },
        set_cookie,
    )
}

/// Send `call` on behalf of `actor` (or anonymously) and record the reply.
pub(crate) fn perform(world: &SharedWorld, actor: Option<&str>, call: Call) -> Reply {
    let cookie = actor.map(|name| session_cookie(world, name));
    let (reply, set_cookie) = with_world_async(world, |base_url| async move {
        send(&base_url, call.cookie(cookie)).await
    });
    let mut ctx = world.borrow_mut();
    ctx.last = Some(reply.clone());
    ctx.last_set_cookie = set_cookie;
    reply
}

pub(crate) fn session_cookie(world: &SharedWorld, username: &str) -> String {
    world
        .borrow()
        .sessions
        .get(username)
        .cloned()
        .unwrap_or_else(|| panic!("no session for {username}"))
}

/// Log `username` in and remember the issued cookie.
pub(crate) fn log_in(world: &SharedWorld, username: &str, password: &str) -> Reply {
    let body = json!({ "username": username, "password": password });
    let (reply, cookie) = with_world_async(world, |base_url| async move {
        send(&base_url, Call::new(Method::POST, "/api/login").json(body)).await
    });
    if let Some(cookie) = cookie {
        world
            .borrow_mut()
            .sessions
            .insert(username.to_owned(), cookie);
    }
    world.borrow_mut().last = Some(reply.clone());
    reply
}

/// Sign `username` up as a student and log them in.
pub(crate) fn enrol_student(world: &SharedWorld, username: &str) {
    let body = json!({
        "username": username,
        "password": STUDENT_PASSWORD,
        "email": format!("{username}@uni.edu"),
    });
    let reply = perform(world, None, Call::new(Method::POST, "/api/signup").json(body));
    assert_eq!(reply.status, 200, "signup {username}: {:?}", reply.body);
    let reply = log_in(world, username, STUDENT_PASSWORD);
    assert_eq!(reply.status, 200, "login {username}: {:?}", reply.body);
}

pub(crate) fn course_payload(
    code: &str,
    day: &str,
    start: &str,
    end: &str,
    capacity: u32,
) -> Value {
    json!({
        "code": code,
        "name": format!("{code} course"),
        "instructor": "Dr. Byte",
        "credits": "3",
        "capacity": capacity.to_string(),
        "day": day,
        "start_time": start,
        "end_time": end,
        "semester": "Fall 2024",
        "description": "",
    })
}

/// Create a course as the admin and remember its id under `code`.
pub(crate) fn admin_creates_course(
    world: &SharedWorld,
    code: &str,
    day: &str,
    start: &str,
    end: &str,
    capacity: u32,
) {
    let payload = course_payload(code, day, start, end, capacity);
    let reply = perform(
        world,
        Some(ADMIN),
        Call::new(Method::POST, "/api/courses").json(payload),
    );
    assert_eq!(reply.status, 200, "create {code}: {:?}", reply.body);
    let id = reply
        .body
        .get("id")
        .and_then(Value::as_i64)
        .expect("created course id");
    world.borrow_mut().courses.insert(code.to_owned(), id);
}

pub(crate) fn course_id(world: &SharedWorld, code: &str) -> i64 {
    world
        .borrow()
        .courses
        .get(code)
        .copied()
        .unwrap_or_else(|| panic!("unknown course {code}"))
}

/// Current catalogue entry for `code`, read as the admin.
pub(crate) fn catalogue_entry(world: &SharedWorld, code: &str) -> Option<Value> {
    let reply = perform(world, Some(ADMIN), Call::new(Method::GET, "/api/courses"));
    assert_eq!(reply.status, 200);
    reply
        .body
        .as_array()
        .expect("course array")
        .iter()
        .find(|course| course.get("code").and_then(Value::as_str) == Some(code))
        .cloned()
}

/// Registrations visible to `actor`.
pub(crate) fn registrations_of(world: &SharedWorld, actor: &str) -> Vec<Value> {
    let reply = perform(
        world,
        Some(actor),
        Call::new(Method::GET, "/api/registrations"),
    );
    assert_eq!(reply.status, 200);
    reply.body.as_array().cloned().expect("registration array")
}

pub(crate) fn last_reply(world: &SharedWorld) -> Reply {
    world.borrow().last.clone().expect("a request was made")
}
