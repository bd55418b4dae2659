//! PostgreSQL-backed course catalogue.
//!
//! Updates and deletes lock the course row so they serialize with enrollment
//! transactions touching the same counter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseDetails, CourseId, NewCourse};

use super::error_mapping::{DbFailure, TxError, classify};
use super::models::{CourseChangeset, CourseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, registrations};

/// Diesel-backed implementation of [`CourseRepository`].
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    CourseRepositoryError::connection(error.into_message())
}

fn map_failure(failure: DbFailure, code: Option<&str>) -> CourseRepositoryError {
    match failure {
        DbFailure::Connection(message) => CourseRepositoryError::connection(message),
        DbFailure::UniqueViolation { constraint }
            if constraint.as_deref() == Some("courses_code_key") =>
        {
            CourseRepositoryError::duplicate_code(code.unwrap_or_default())
        }
        DbFailure::UniqueViolation { constraint } => CourseRepositoryError::query(format!(
            "unique constraint {} violated",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DbFailure::Query(message) => CourseRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CourseRepositoryError {
    map_failure(classify(error), None)
}

type CourseTxError = TxError<CourseRepositoryError>;

fn corrupt_row(message: String) -> CourseTxError {
    TxError::Domain(CourseRepositoryError::query(message))
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CourseRow> = courses::table
            .order(courses::code.asc())
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(CourseRow::into_course)
            .collect::<Result<_, _>>()
            .map_err(CourseRepositoryError::query)
    }

    async fn create(&self, course: &NewCourse) -> Result<CourseId, CourseRepositoryError> {
        let code = course.code.as_ref();
        let row = CourseChangeset::from_details(&course.details)
            .map_err(CourseRepositoryError::query)?
            .into_insert(code);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id: i64 = diesel::insert_into(courses::table)
            .values(&row)
            .returning(courses::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), Some(code)))?;

        CourseId::new(id).map_err(|err| CourseRepositoryError::query(err.to_string()))
    }

    async fn update(
        &self,
        id: CourseId,
        details: &CourseDetails,
    ) -> Result<Course, CourseRepositoryError> {
        let changeset =
            CourseChangeset::from_details(details).map_err(CourseRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, CourseTxError, _>(|conn| {
            async move {
                let enrolled: Option<i32> = courses::table
                    .find(id.get())
                    .select(courses::enrolled)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(enrolled) = enrolled else {
                    return Err(TxError::Domain(CourseRepositoryError::not_found(id.get())));
                };
                if changeset.capacity < enrolled {
                    let seats = u32::try_from(enrolled).unwrap_or_default();
                    return Err(TxError::Domain(
                        CourseRepositoryError::capacity_below_enrollment(seats),
                    ));
                }

                let row: CourseRow = diesel::update(courses::table.find(id.get()))
                    .set(&changeset)
                    .returning(CourseRow::as_returning())
                    .get_result(conn)
                    .await?;
                row.into_course().map_err(corrupt_row)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.resolve(|failure| map_failure(failure, None)))
    }

    async fn delete_with_registrations(&self, id: CourseId) -> Result<u64, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, CourseTxError, _>(|conn| {
            async move {
                let locked: Option<i64> = courses::table
                    .find(id.get())
                    .select(courses::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Err(TxError::Domain(CourseRepositoryError::not_found(id.get())));
                }

                let removed = diesel::delete(
                    registrations::table.filter(registrations::course_id.eq(id.get())),
                )
                .execute(conn)
                .await?;
                diesel::delete(courses::table.find(id.get()))
                    .execute(conn)
                    .await?;
                Ok(removed as u64)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.resolve(|failure| map_failure(failure, None)))
    }
}
