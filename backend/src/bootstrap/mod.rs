//! Startup concerns: configuration loading and default-admin seeding.

pub mod admin;
pub mod config;

pub use admin::seed_default_admin;
pub use config::{AppSettings, SettingsError};
