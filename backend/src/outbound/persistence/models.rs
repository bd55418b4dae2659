//! Internal Diesel row structs and their conversion into domain types.
//!
//! Rows are persistence details and never leave this module tree. Conversion
//! failures mean stored data violates a domain invariant and surface as a
//! plain message for the caller's `Query` error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Course, CourseCode, CourseDetails, CourseId, EmailAddress, MeetingTime, Registration,
    RegistrationId, RegistrationStatus, RegistrationView, Role, ScheduledCourse, User,
    UserCredentials, UserId, Username,
};

use super::schema::{courses, registrations, users};

fn corrupt(what: &str, err: impl std::fmt::Display) -> String {
    format!("stored {what} is invalid: {err}")
}

fn unsigned(value: i32, what: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|err| corrupt(what, err))
}

fn signed(value: u32, what: &str) -> Result<i32, String> {
    i32::try_from(value).map_err(|err| corrupt(what, err))
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_credentials(self) -> Result<UserCredentials, String> {
        let user = User {
            id: UserId::new(self.id).map_err(|err| corrupt("user id", err))?,
            username: Username::new(&self.username).map_err(|err| corrupt("username", err))?,
            email: EmailAddress::new(&self.email).map_err(|err| corrupt("email", err))?,
            role: self.role.parse::<Role>().map_err(|err| corrupt("role", err))?,
            created_at: self.created_at,
        };
        Ok(UserCredentials {
            user,
            password_hash: self.password_hash,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, String> {
        self.into_credentials().map(|stored| stored.user)
    }
}

/// Insertable struct for creating new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the courses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub credits: i32,
    pub capacity: i32,
    pub enrolled: i32,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub semester: String,
    pub description: Option<String>,
}

impl CourseRow {
    pub(crate) fn into_course(self) -> Result<Course, String> {
        let schedule = MeetingTime::parse(&self.day, &self.start_time, &self.end_time)
            .map_err(|err| corrupt("meeting time", err))?;
        Ok(Course {
            id: CourseId::new(self.id).map_err(|err| corrupt("course id", err))?,
            code: CourseCode::new(&self.code).map_err(|err| corrupt("course code", err))?,
            details: CourseDetails {
                name: self.name,
                instructor: self.instructor,
                credits: unsigned(self.credits, "credits")?,
                capacity: unsigned(self.capacity, "capacity")?,
                schedule,
                semester: self.semester,
                description: self.description,
            },
            enrolled: unsigned(self.enrolled, "enrolled")?,
        })
    }
}

/// Insertable struct for new courses; `enrolled` takes its column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub instructor: &'a str,
    pub credits: i32,
    pub capacity: i32,
    pub day: &'static str,
    pub start_time: String,
    pub end_time: String,
    pub semester: &'a str,
    pub description: Option<&'a str>,
}

/// Changeset for the administrator-editable course fields.
///
/// `description` is written even when `None` so clearing it sticks.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CourseChangeset<'a> {
    pub name: &'a str,
    pub instructor: &'a str,
    pub credits: i32,
    pub capacity: i32,
    pub day: &'static str,
    pub start_time: String,
    pub end_time: String,
    pub semester: &'a str,
    pub description: Option<&'a str>,
}

impl<'a> CourseChangeset<'a> {
    pub(crate) fn from_details(details: &'a CourseDetails) -> Result<Self, String> {
        Ok(Self {
            name: &details.name,
            instructor: &details.instructor,
            credits: signed(details.credits, "credits")?,
            capacity: signed(details.capacity, "capacity")?,
            day: details.schedule.day().as_str(),
            start_time: details.schedule.start().to_string(),
            end_time: details.schedule.end().to_string(),
            semester: &details.semester,
            description: details.description.as_deref(),
        })
    }

    pub(crate) fn into_insert(self, code: &'a str) -> NewCourseRow<'a> {
        NewCourseRow {
            code,
            name: self.name,
            instructor: self.instructor,
            credits: self.credits,
            capacity: self.capacity,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            semester: self.semester,
            description: self.description,
        }
    }
}

/// Row struct for reading from the registrations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub status: String,
    pub registered_at: DateTime<Utc>,
}

impl RegistrationRow {
    pub(crate) fn into_registration(self) -> Result<Registration, String> {
        let status = match self.status.as_str() {
            "enrolled" => RegistrationStatus::Enrolled,
            other => return Err(corrupt("registration status", other)),
        };
        Ok(Registration {
            id: RegistrationId::new(self.id).map_err(|err| corrupt("registration id", err))?,
            student_id: UserId::new(self.student_id).map_err(|err| corrupt("student id", err))?,
            course_id: CourseId::new(self.course_id).map_err(|err| corrupt("course id", err))?,
            status,
            registered_at: self.registered_at,
        })
    }
}

/// Insertable struct for new registrations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub(crate) struct NewRegistrationRow {
    pub student_id: i64,
    pub course_id: i64,
    pub status: &'static str,
}

/// Course columns consulted by the conflict scan.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScheduleRow {
    pub id: i64,
    pub code: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

impl ScheduleRow {
    pub(crate) fn into_scheduled(self) -> Result<ScheduledCourse, String> {
        Ok(ScheduledCourse {
            course_id: CourseId::new(self.id).map_err(|err| corrupt("course id", err))?,
            code: CourseCode::new(&self.code).map_err(|err| corrupt("course code", err))?,
            schedule: MeetingTime::parse(&self.day, &self.start_time, &self.end_time)
                .map_err(|err| corrupt("meeting time", err))?,
        })
    }
}

/// Course display columns joined into registration listings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseSummaryRow {
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub credits: i32,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

pub(crate) fn registration_view(
    registration: RegistrationRow,
    course: CourseSummaryRow,
    username: String,
) -> Result<RegistrationView, String> {
    Ok(RegistrationView {
        registration: registration.into_registration()?,
        code: CourseCode::new(&course.code).map_err(|err| corrupt("course code", err))?,
        name: course.name,
        instructor: course.instructor,
        credits: unsigned(course.credits, "credits")?,
        schedule: MeetingTime::parse(&course.day, &course.start_time, &course.end_time)
            .map_err(|err| corrupt("meeting time", err))?,
        username: Username::new(&username).map_err(|err| corrupt("username", err))?,
    })
}
