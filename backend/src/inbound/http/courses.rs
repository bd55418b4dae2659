//! Course catalogue handlers.
//!
//! ```text
//! GET /api/courses
//! POST /api/courses {"code":"CS101","name":"Intro", ...}
//! PUT /api/courses/{id}
//! DELETE /api/courses/{id}
//! ```

use actix_web::{delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Course, CourseCode, CourseDetails, CourseDraft, CourseId, Error, NewCourse, Weekday,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CreatedResponse, SuccessResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    IntegerInput, invalid_id_error, map_course_validation_error, parse_path_id, require,
};

/// Course body for `POST /api/courses` and `PUT /api/courses/{id}`.
///
/// `code` is read on create only; an update never renames a course.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CourseRequest {
    #[schema(example = "CS101")]
    pub code: Option<String>,
    #[schema(example = "Introduction to Programming")]
    pub name: Option<String>,
    #[schema(example = "Dr. Smith")]
    pub instructor: Option<String>,
    pub credits: Option<IntegerInput>,
    pub capacity: Option<IntegerInput>,
    #[schema(example = "Monday")]
    pub day: Option<String>,
    #[schema(example = "09:00")]
    pub start_time: Option<String>,
    #[schema(example = "10:30")]
    pub end_time: Option<String>,
    #[schema(example = "Fall 2024")]
    pub semester: Option<String>,
    pub description: Option<String>,
}

impl CourseRequest {
    fn into_parts(self) -> Result<(Option<String>, CourseDetails), Error> {
        let name = require(self.name, "name")?;
        let instructor = require(self.instructor, "instructor")?;
        let credits = require(self.credits, "credits")?.parse("credits")?;
        let capacity = require(self.capacity, "capacity")?.parse("capacity")?;
        let day = require(self.day, "day")?;
        let start_time = require(self.start_time, "start_time")?;
        let end_time = require(self.end_time, "end_time")?;
        let semester = require(self.semester, "semester")?;
        let details = CourseDetails::try_from_draft(CourseDraft {
            name: &name,
            instructor: &instructor,
            credits,
            capacity,
            day: &day,
            start_time: &start_time,
            end_time: &end_time,
            semester: &semester,
            description: self.description.as_deref(),
        })
        .map_err(map_course_validation_error)?;
        Ok((self.code, details))
    }

    fn into_new_course(self) -> Result<NewCourse, Error> {
        let (code, details) = self.into_parts()?;
        let code = CourseCode::new(require(code, "code")?).map_err(map_course_validation_error)?;
        Ok(NewCourse { code, details })
    }

    fn into_details(self) -> Result<CourseDetails, Error> {
        self.into_parts().map(|(_, details)| details)
    }
}

/// Catalogue entry as listed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "CS101")]
    pub code: String,
    pub name: String,
    pub instructor: String,
    #[schema(example = 3)]
    pub credits: u32,
    #[schema(example = 30)]
    pub capacity: u32,
    #[schema(example = 12)]
    pub enrolled: u32,
    pub day: Weekday,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "10:30")]
    pub end_time: String,
    pub semester: String,
    pub description: Option<String>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        let Course {
            id,
            code,
            details,
            enrolled,
        } = course;
        Self {
            id: id.get(),
            code: code.into(),
            name: details.name,
            instructor: details.instructor,
            credits: details.credits,
            capacity: details.capacity,
            enrolled,
            day: details.schedule.day(),
            start_time: details.schedule.start().to_string(),
            end_time: details.schedule.end().to_string(),
            semester: details.semester,
            description: details.description,
        }
    }
}

fn course_id_from_path(raw: &str) -> Result<CourseId, Error> {
    let id = parse_path_id(raw, "id")?;
    CourseId::new(id).map_err(|_| invalid_id_error("id"))
}

/// List every course ordered by code.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Courses", body = [CourseResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    session.identity(state.now()).require_auth()?;
    let courses = state.courses.list_courses().await?;
    Ok(web::Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Create a course with no enrollments.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course created", body = CreatedResponse),
        (status = 400, description = "Invalid request or duplicate code", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    session.identity(state.now()).require_admin()?;
    let course = payload.into_inner().into_new_course()?;
    let id = state.course_admin.create_course(course).await?;
    Ok(web::Json(CreatedResponse::new(id.get())))
}

/// Replace a course's editable fields.
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = SuccessResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CourseRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    session.identity(state.now()).require_admin()?;
    let id = course_id_from_path(&path)?;
    let details = payload.into_inner().into_details()?;
    state.course_admin.update_course(id, details).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Delete a course together with its registrations.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = SuccessResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuccessResponse>> {
    session.identity(state.now()).require_admin()?;
    let id = course_id_from_path(&path)?;
    state.course_admin.delete_course(id).await?;
    Ok(web::Json(SuccessResponse::ok()))
}
