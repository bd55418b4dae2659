//! Administrator roster of student accounts.

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Student account as shown to administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    #[schema(example = 2)]
    pub id: i64,
    #[schema(example = "s1")]
    pub username: String,
    #[schema(example = "s1@uni.edu")]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for StudentResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            username: user.username.into(),
            email: user.email.into(),
            created_at: user.created_at,
        }
    }
}

/// List student accounts ordered by id.
#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "Students", body = [StudentResponse]),
        (status = 403, description = "Administrators only", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "listStudents"
)]
#[get("/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<StudentResponse>>> {
    session.identity(state.now()).require_admin()?;
    let students = state.students.list_students().await?;
    Ok(web::Json(
        students.into_iter().map(StudentResponse::from).collect(),
    ))
}
