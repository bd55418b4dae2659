//! Driving port for catalogue reads.

use async_trait::async_trait;

use crate::domain::{Course, Error};

/// Domain use-case port for browsing courses.
#[async_trait]
pub trait CourseQuery: Send + Sync {
    /// All courses ordered by code.
    async fn list_courses(&self) -> Result<Vec<Course>, Error>;
}
