//! Registration handlers fronting the Enrollment Engine.
//!
//! ```text
//! GET /api/registrations
//! POST /api/registrations {"course_id":1}
//! DELETE /api/registrations/{id}
//! ```

use actix_web::{delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CourseId, Error, RegistrationId, RegistrationStatus, RegistrationView, Weekday};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::SuccessResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{IntegerInput, invalid_id_error, parse_path_id, require};

/// Enrollment body for `POST /api/registrations`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegistrationRequest {
    pub course_id: Option<IntegerInput>,
}

impl RegistrationRequest {
    fn course_id(self) -> Result<CourseId, Error> {
        let raw = require(self.course_id, "course_id")?.parse("course_id")?;
        CourseId::new(raw).map_err(|_| invalid_id_error("course_id"))
    }
}

/// Registration joined with its course and student.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 2)]
    pub student_id: i64,
    #[schema(example = 1)]
    pub course_id: i64,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    #[schema(example = "CS101")]
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub credits: u32,
    pub day: Weekday,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "10:30")]
    pub end_time: String,
    #[schema(example = "s1")]
    pub username: String,
}

impl From<RegistrationView> for RegistrationResponse {
    fn from(view: RegistrationView) -> Self {
        let RegistrationView {
            registration,
            code,
            name,
            instructor,
            credits,
            schedule,
            username,
        } = view;
        Self {
            id: registration.id.get(),
            student_id: registration.student_id.get(),
            course_id: registration.course_id.get(),
            status: registration.status,
            registered_at: registration.registered_at,
            code: code.into(),
            name,
            instructor,
            credits,
            day: schedule.day(),
            start_time: schedule.start().to_string(),
            end_time: schedule.end().to_string(),
            username: username.into(),
        }
    }
}

/// Students see their own registrations; administrators see all.
#[utoipa::path(
    get,
    path = "/api/registrations",
    responses(
        (status = 200, description = "Registrations", body = [RegistrationResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "listRegistrations"
)]
#[get("/registrations")]
pub async fn list_registrations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RegistrationResponse>>> {
    let actor = session.identity(state.now()).require_auth()?;
    let views = state.registrations.list_registrations(actor).await?;
    Ok(web::Json(
        views.into_iter().map(RegistrationResponse::from).collect(),
    ))
}

/// Enroll the session user in a course.
#[utoipa::path(
    post,
    path = "/api/registrations",
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Enrolled", body = SuccessResponse),
        (status = 400, description = "Course full, schedule conflict or already registered", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "createRegistration"
)]
#[post("/registrations")]
pub async fn create_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let actor = session.identity(state.now()).require_auth()?;
    let course = payload.into_inner().course_id()?;
    state.enrollment.enroll(actor, course).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Drop a registration. Students may only drop their own.
#[utoipa::path(
    delete,
    path = "/api/registrations/{id}",
    params(("id" = i64, Path, description = "Registration id")),
    responses(
        (status = 200, description = "Dropped", body = SuccessResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Registration not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "deleteRegistration"
)]
#[delete("/registrations/{id}")]
pub async fn delete_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let actor = session.identity(state.now()).require_auth()?;
    let raw = parse_path_id(&path, "id")?;
    let id = RegistrationId::new(raw).map_err(|_| invalid_id_error("id"))?;
    state.enrollment.drop_registration(actor, id).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use crate::inbound::http::test_utils::{
        ADMIN_PASSWORD, ADMIN_USERNAME, app_deps, call_json, course_body, create_course_as,
        login_cookie, seeded_state, student_cookie,
    };
    use crate::server::build_app;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn enroll<S>(app: &S, cookie: &Cookie<'static>, course_id: Value) -> (StatusCode, Value)
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        call_json(
            app,
            test::TestRequest::post()
                .uri("/api/registrations")
                .set_json(json!({ "course_id": course_id })),
            Some(cookie),
        )
        .await
    }

    async fn registrations<S>(app: &S, cookie: &Cookie<'static>) -> Vec<Value>
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let (status, body) = call_json(
            app,
            test::TestRequest::get().uri("/api/registrations"),
            Some(cookie),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().expect("registration list").clone()
    }

    #[rstest]
    #[actix_web::test]
    async fn enrollment_rejections_follow_the_check_order() {
        let app = test::init_service(build_app(app_deps(seeded_state().await))).await;
        let admin = login_cookie(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        let a100 =
            create_course_as(&app, &admin, course_body("A100", "Monday", "09:00", "10:30", 1))
                .await;
        let b200 =
            create_course_as(&app, &admin, course_body("B200", "Monday", "10:00", "11:00", 5))
                .await;
        let s1 = student_cookie(&app, "s1").await;
        let s2 = student_cookie(&app, "s2").await;

        assert_eq!(enroll(&app, &s1, json!(a100)).await.0, StatusCode::OK);

        let (status, body) = enroll(&app, &s1, json!(b200)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Schedule conflict with A100 on Monday");
        assert_eq!(body["code"], "schedule_conflict");

        let (status, body) = enroll(&app, &s2, json!(a100.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Course is full");

        let (status, body) = enroll(&app, &s2, json!(999)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Course not found");
    }

    #[rstest]
    #[actix_web::test]
    async fn repeat_enrollment_is_already_registered() {
        let app = test::init_service(build_app(app_deps(seeded_state().await))).await;
        let admin = login_cookie(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        let id =
            create_course_as(&app, &admin, course_body("CS101", "Monday", "09:00", "10:30", 30))
                .await;
        let s1 = student_cookie(&app, "s1").await;
        enroll(&app, &s1, json!(id)).await;

        let (status, body) = enroll(&app, &s1, json!(id)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Already registered for this course");
        let (_, courses) =
            call_json(&app, test::TestRequest::get().uri("/api/courses"), Some(&s1)).await;
        assert_eq!(courses[0]["enrolled"], 1);
    }

    #[rstest]
    #[case::missing(json!({}), "missing_field")]
    #[case::word(json!({"course_id": "abc"}), "invalid_number")]
    #[case::zero(json!({"course_id": 0}), "invalid_id")]
    #[actix_web::test]
    async fn malformed_course_ids_are_rejected(#[case] body: Value, #[case] code: &str) {
        let app = test::init_service(build_app(app_deps(seeded_state().await))).await;
        let s1 = student_cookie(&app, "s1").await;

        let (status, reply) = call_json(
            &app,
            test::TestRequest::post()
                .uri("/api/registrations")
                .set_json(body),
            Some(&s1),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["details"]["code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn listings_are_scoped_to_the_caller() {
        let app = test::init_service(build_app(app_deps(seeded_state().await))).await;
        let admin = login_cookie(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        let cs =
            create_course_as(&app, &admin, course_body("CS101", "Monday", "09:00", "10:30", 30))
                .await;
        let ma =
            create_course_as(&app, &admin, course_body("MA201", "Tuesday", "09:00", "10:30", 30))
                .await;
        let s1 = student_cookie(&app, "s1").await;
        let s2 = student_cookie(&app, "s2").await;
        enroll(&app, &s1, json!(ma)).await;
        enroll(&app, &s2, json!(cs)).await;

        let own = registrations(&app, &s1).await;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0]["code"], "MA201");
        assert_eq!(own[0]["username"], "s1");
        assert_eq!(own[0]["status"], "enrolled");
        assert_eq!(own[0]["day"], "Tuesday");

        let all = registrations(&app, &admin).await;
        let codes: Vec<&str> = all.iter().filter_map(|row| row["code"].as_str()).collect();
        assert_eq!(codes, ["CS101", "MA201"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn only_owners_and_admins_drop_registrations() {
        let app = test::init_service(build_app(app_deps(seeded_state().await))).await;
        let admin = login_cookie(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        let cs =
            create_course_as(&app, &admin, course_body("CS101", "Monday", "09:00", "10:30", 30))
                .await;
        let s1 = student_cookie(&app, "s1").await;
        let s2 = student_cookie(&app, "s2").await;
        enroll(&app, &s1, json!(cs)).await;
        let reg_id = registrations(&app, &s1).await[0]["id"]
            .as_i64()
            .expect("registration id");
        let uri = format!("/api/registrations/{reg_id}");

        let (status, body) =
            call_json(&app, test::TestRequest::delete().uri(&uri), Some(&s2)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");

        let (status, _) =
            call_json(&app, test::TestRequest::delete().uri(&uri), Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            call_json(&app, test::TestRequest::delete().uri(&uri), Some(&s1)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Registration not found");

        let (_, courses) =
            call_json(&app, test::TestRequest::get().uri("/api/courses"), Some(&s1)).await;
        assert_eq!(courses[0]["enrolled"], 0);
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_enrollment_is_unauthorised() {
        let app = test::init_service(build_app(app_deps(seeded_state().await))).await;

        let (status, _) = call_json(
            &app,
            test::TestRequest::post()
                .uri("/api/registrations")
                .set_json(json!({"course_id": 1})),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
