//! Single-process store implementing every driven repository port.
//!
//! One mutex guards users, courses and registrations, so each enroll, drop
//! or cascade runs its check and mutation as a single critical section. Used
//! when no database URL is configured and by the HTTP test suites.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::enrollment::{admit, may_drop, release_seat};
use crate::domain::ports::{
    CourseRepository, CourseRepositoryError, RegistrationRepository, RegistrationRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Actor, Course, CourseDetails, CourseId, NewCourse, NewUser, Registration, RegistrationId,
    RegistrationStatus, RegistrationView, Role, ScheduledCourse, User, UserCredentials, UserId,
    Username,
};

#[derive(Default)]
struct State {
    last_user_id: i64,
    last_course_id: i64,
    last_registration_id: i64,
    users: BTreeMap<UserId, UserCredentials>,
    courses: BTreeMap<CourseId, Course>,
    registrations: BTreeMap<RegistrationId, Registration>,
}

impl State {
    fn held_by(&self, student: UserId) -> Vec<ScheduledCourse> {
        self.registrations
            .values()
            .filter(|registration| registration.student_id == student)
            .filter_map(|registration| self.courses.get(&registration.course_id))
            .map(|course| ScheduledCourse {
                course_id: course.id,
                code: course.code.clone(),
                schedule: course.details.schedule,
            })
            .collect()
    }

    fn view(&self, registration: &Registration) -> Option<RegistrationView> {
        let course = self.courses.get(&registration.course_id)?;
        let student = self.users.get(&registration.student_id)?;
        Some(RegistrationView {
            registration: registration.clone(),
            code: course.code.clone(),
            name: course.details.name.clone(),
            instructor: course.details.instructor.clone(),
            credits: course.details.credits,
            schedule: course.details.schedule,
            username: student.user.username.clone(),
        })
    }
}

/// In-memory implementation of the user, course and registration ports.
pub struct MemoryStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Create an empty store stamped by the supplied clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "memory store lock poisoned".to_owned())
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut state = self.lock().map_err(UserRepositoryError::query)?;
        let taken = state.users.values().any(|stored| {
            stored.user.username == user.username || stored.user.email == user.email
        });
        if taken {
            return Err(UserRepositoryError::conflict("username or email already taken"));
        }
        let id = UserId::new(next_id(&mut state.last_user_id)).map_err(|err| {
            UserRepositoryError::query(format!("allocated invalid user id: {err}"))
        })?;
        let created = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: self.clock.utc(),
        };
        state.users.insert(
            id,
            UserCredentials {
                user: created.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(created)
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        let state = self.lock().map_err(UserRepositoryError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.username.as_ref() == username)
            .cloned())
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let state = self.lock().map_err(UserRepositoryError::query)?;
        Ok(state
            .users
            .values()
            .any(|stored| &stored.user.username == username))
    }

    async fn list_students(&self) -> Result<Vec<User>, UserRepositoryError> {
        let state = self.lock().map_err(UserRepositoryError::query)?;
        Ok(state
            .users
            .values()
            .filter(|stored| stored.user.role == Role::Student)
            .map(|stored| stored.user.clone())
            .collect())
    }
}

#[async_trait]
impl CourseRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.lock().map_err(CourseRepositoryError::query)?;
        let mut courses: Vec<Course> = state.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(courses)
    }

    async fn create(&self, course: &NewCourse) -> Result<CourseId, CourseRepositoryError> {
        let mut state = self.lock().map_err(CourseRepositoryError::query)?;
        if state.courses.values().any(|existing| existing.code == course.code) {
            return Err(CourseRepositoryError::duplicate_code(course.code.as_ref()));
        }
        let id = CourseId::new(next_id(&mut state.last_course_id)).map_err(|err| {
            CourseRepositoryError::query(format!("allocated invalid course id: {err}"))
        })?;
        state.courses.insert(
            id,
            Course {
                id,
                code: course.code.clone(),
                details: course.details.clone(),
                enrolled: 0,
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: CourseId,
        details: &CourseDetails,
    ) -> Result<Course, CourseRepositoryError> {
        let mut state = self.lock().map_err(CourseRepositoryError::query)?;
        let course = state
            .courses
            .get_mut(&id)
            .ok_or_else(|| CourseRepositoryError::not_found(id.get()))?;
        if details.capacity < course.enrolled {
            return Err(CourseRepositoryError::capacity_below_enrollment(
                course.enrolled,
            ));
        }
        course.details = details.clone();
        Ok(course.clone())
    }

    async fn delete_with_registrations(&self, id: CourseId) -> Result<u64, CourseRepositoryError> {
        let mut state = self.lock().map_err(CourseRepositoryError::query)?;
        if !state.courses.contains_key(&id) {
            return Err(CourseRepositoryError::not_found(id.get()));
        }
        let before = state.registrations.len();
        state
            .registrations
            .retain(|_, registration| registration.course_id != id);
        let removed = before - state.registrations.len();
        state.courses.remove(&id);
        Ok(removed as u64)
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn enroll(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<Registration, RegistrationRepositoryError> {
        let mut state = self.lock().map_err(RegistrationRepositoryError::query)?;
        let target = state
            .courses
            .get(&course)
            .ok_or_else(|| RegistrationRepositoryError::course_not_found(course.get()))?;
        admit(target, &state.held_by(student)).map_err(RegistrationRepositoryError::rejected)?;

        let id = RegistrationId::new(next_id(&mut state.last_registration_id)).map_err(|err| {
            RegistrationRepositoryError::query(format!("allocated invalid registration id: {err}"))
        })?;
        let registration = Registration {
            id,
            student_id: student,
            course_id: course,
            status: RegistrationStatus::Enrolled,
            registered_at: self.clock.utc(),
        };
        state.registrations.insert(id, registration.clone());
        if let Some(target) = state.courses.get_mut(&course) {
            target.enrolled += 1;
        }
        Ok(registration)
    }

    async fn drop_registration(
        &self,
        id: RegistrationId,
        actor: Actor,
    ) -> Result<(), RegistrationRepositoryError> {
        let mut state = self.lock().map_err(RegistrationRepositoryError::query)?;
        let registration = state
            .registrations
            .get(&id)
            .ok_or_else(|| RegistrationRepositoryError::registration_not_found(id.get()))?;
        if !may_drop(actor, registration.student_id) {
            return Err(RegistrationRepositoryError::forbidden());
        }
        let course_id = registration.course_id;
        state.registrations.remove(&id);
        if let Some(course) = state.courses.get_mut(&course_id) {
            let release = release_seat(course.enrolled);
            if release.underflow {
                warn!(course = %course_id, "enrollment counter already zero on drop");
            }
            course.enrolled = release.enrolled;
        }
        Ok(())
    }

    async fn list_views(
        &self,
        student: Option<UserId>,
    ) -> Result<Vec<RegistrationView>, RegistrationRepositoryError> {
        let state = self.lock().map_err(RegistrationRepositoryError::query)?;
        let mut views: Vec<RegistrationView> = state
            .registrations
            .values()
            .filter(|registration| student.is_none_or(|id| registration.student_id == id))
            .filter_map(|registration| state.view(registration))
            .collect();
        views.sort_by(|a, b| {
            a.code
                .cmp(&b.code)
                .then(a.registration.id.cmp(&b.registration.id))
        });
        Ok(views)
    }
}
