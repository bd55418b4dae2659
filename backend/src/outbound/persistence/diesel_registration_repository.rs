//! PostgreSQL-backed enrollment unit of work.
//!
//! Row locks are always taken in the order user, course, registration so
//! concurrent enrollments and drops cannot deadlock. The admission decision
//! is made by [`admit`] against rows read under those locks; the unique
//! `(student_id, course_id)` constraint backs up the duplicate check.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{debug, warn};

use crate::domain::enrollment::{EnrollmentRejection, admit, may_drop, release_seat};
use crate::domain::ports::{RegistrationRepository, RegistrationRepositoryError};
use crate::domain::{
    Actor, CourseId, Registration, RegistrationId, RegistrationStatus, RegistrationView,
    ScheduledCourse, UserId,
};

use super::error_mapping::{DbFailure, TxError, classify};
use super::models::{
    CourseRow, CourseSummaryRow, NewRegistrationRow, RegistrationRow, ScheduleRow,
    registration_view,
};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, registrations, users};

const STUDENT_COURSE_KEY: &str = "registrations_student_course_key";

/// Diesel-backed implementation of [`RegistrationRepository`].
#[derive(Clone)]
pub struct DieselRegistrationRepository {
    pool: DbPool,
}

impl DieselRegistrationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type RegistrationTxError = TxError<RegistrationRepositoryError>;

fn map_pool_error(error: PoolError) -> RegistrationRepositoryError {
    RegistrationRepositoryError::connection(error.into_message())
}

fn map_failure(failure: DbFailure) -> RegistrationRepositoryError {
    match failure {
        DbFailure::Connection(message) => RegistrationRepositoryError::connection(message),
        DbFailure::UniqueViolation { constraint }
            if constraint.as_deref() == Some(STUDENT_COURSE_KEY) =>
        {
            RegistrationRepositoryError::rejected(EnrollmentRejection::AlreadyRegistered)
        }
        DbFailure::UniqueViolation { constraint } => RegistrationRepositoryError::query(format!(
            "unique constraint {} violated",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DbFailure::Query(message) => RegistrationRepositoryError::query(message),
    }
}

fn domain(error: RegistrationRepositoryError) -> RegistrationTxError {
    TxError::Domain(error)
}

fn corrupt_row(message: String) -> RegistrationTxError {
    domain(RegistrationRepositoryError::query(message))
}

#[async_trait]
impl RegistrationRepository for DieselRegistrationRepository {
    async fn enroll(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<Registration, RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let registration = conn
            .transaction::<_, RegistrationTxError, _>(|conn| {
                async move {
                    // Serializes concurrent enrollments by the same student.
                    users::table
                        .find(student.get())
                        .select(users::id)
                        .for_update()
                        .first::<i64>(conn)
                        .await?;

                    let target: Option<CourseRow> = courses::table
                        .find(course.get())
                        .select(CourseRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let target = target
                        .ok_or_else(|| {
                            domain(RegistrationRepositoryError::course_not_found(course.get()))
                        })?
                        .into_course()
                        .map_err(corrupt_row)?;

                    let held_rows: Vec<ScheduleRow> = registrations::table
                        .inner_join(courses::table)
                        .filter(registrations::student_id.eq(student.get()))
                        .select(ScheduleRow::as_select())
                        .load(conn)
                        .await?;
                    let held = held_rows
                        .into_iter()
                        .map(ScheduleRow::into_scheduled)
                        .collect::<Result<Vec<ScheduledCourse>, _>>()
                        .map_err(corrupt_row)?;

                    admit(&target, &held).map_err(|rejection| {
                        domain(RegistrationRepositoryError::rejected(rejection))
                    })?;

                    let row: RegistrationRow = diesel::insert_into(registrations::table)
                        .values(&NewRegistrationRow {
                            student_id: student.get(),
                            course_id: course.get(),
                            status: RegistrationStatus::Enrolled.as_str(),
                        })
                        .returning(RegistrationRow::as_returning())
                        .get_result(conn)
                        .await?;
                    diesel::update(courses::table.find(course.get()))
                        .set(courses::enrolled.eq(courses::enrolled + 1))
                        .execute(conn)
                        .await?;

                    row.into_registration().map_err(corrupt_row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| err.resolve(map_failure))?;

        debug!(registration = registration.id.get(), "registration stored");
        Ok(registration)
    }

    async fn drop_registration(
        &self,
        id: RegistrationId,
        actor: Actor,
    ) -> Result<(), RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, RegistrationTxError, _>(|conn| {
            async move {
                let not_found =
                    || domain(RegistrationRepositoryError::registration_not_found(id.get()));

                // Unlocked read to learn which course to lock first.
                let course_id: i64 = registrations::table
                    .find(id.get())
                    .select(registrations::course_id)
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(not_found)?;

                let enrolled: i32 = courses::table
                    .find(course_id)
                    .select(courses::enrolled)
                    .for_update()
                    .first(conn)
                    .await?;

                // A concurrent drop may have removed the row before the lock.
                let row: RegistrationRow = registrations::table
                    .find(id.get())
                    .select(RegistrationRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(not_found)?;
                let registration = row.into_registration().map_err(corrupt_row)?;

                if !may_drop(actor, registration.student_id) {
                    return Err(domain(RegistrationRepositoryError::forbidden()));
                }

                diesel::delete(registrations::table.find(id.get()))
                    .execute(conn)
                    .await?;

                let release = release_seat(u32::try_from(enrolled).unwrap_or_default());
                if release.underflow {
                    warn!(course_id, "enrollment counter already zero on drop");
                }
                let remaining = i32::try_from(release.enrolled).unwrap_or(i32::MAX);
                diesel::update(courses::table.find(course_id))
                    .set(courses::enrolled.eq(remaining))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.resolve(map_failure))
    }

    async fn list_views(
        &self,
        student: Option<UserId>,
    ) -> Result<Vec<RegistrationView>, RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = registrations::table
            .inner_join(courses::table)
            .inner_join(users::table)
            .select((
                RegistrationRow::as_select(),
                CourseSummaryRow::as_select(),
                users::username,
            ))
            .order((courses::code.asc(), registrations::id.asc()))
            .into_boxed();
        if let Some(student) = student {
            query = query.filter(registrations::student_id.eq(student.get()));
        }

        let rows: Vec<(RegistrationRow, CourseSummaryRow, String)> =
            query.load(&mut conn).await.map_err(|err| map_failure(classify(err)))?;

        rows.into_iter()
            .map(|(registration, course, username)| {
                registration_view(registration, course, username)
            })
            .collect::<Result<_, _>>()
            .map_err(RegistrationRepositoryError::query)
    }
}
