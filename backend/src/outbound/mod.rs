//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: single-process store used without a database and in tests
//! - **security**: Argon2id password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. The only business rule they run
//! is the enrollment admission policy, evaluated inside their critical
//! section.

pub mod memory;
pub mod persistence;
pub mod security;
