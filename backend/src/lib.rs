//! Registrar library: course catalogue, enrollment engine and HTTP API.
//!
//! The crate is laid out hexagonally. [`domain`] holds the entities, the
//! enrollment policy and the services behind the driving ports; [`inbound`]
//! adapts HTTP requests onto those ports; [`outbound`] implements the driven
//! ports over PostgreSQL, memory and Argon2.

pub mod bootstrap;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
