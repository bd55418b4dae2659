//! Admission, conflict and release rules.

use thiserror::Error;

use crate::domain::access::Actor;
use crate::domain::course::{Course, CourseCode, MeetingTime, Weekday};
use crate::domain::registration::ScheduledCourse;
use crate::domain::user::UserId;
use crate::domain::Error;

/// Reason an otherwise valid enrollment request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentRejection {
    #[error("Course is full")]
    CourseFull,
    #[error("Schedule conflict with {code} on {day}")]
    ScheduleConflict { code: CourseCode, day: Weekday },
    #[error("Already registered for this course")]
    AlreadyRegistered,
}

impl From<EnrollmentRejection> for Error {
    fn from(value: EnrollmentRejection) -> Self {
        let message = value.to_string();
        match value {
            EnrollmentRejection::CourseFull => Error::course_full(message),
            EnrollmentRejection::ScheduleConflict { .. } => Error::schedule_conflict(message),
            EnrollmentRejection::AlreadyRegistered => Error::already_registered(message),
        }
    }
}

/// First held course, other than `target` itself, whose slot collides with
/// `candidate`.
pub fn find_conflict<'a>(
    target: &Course,
    candidate: &MeetingTime,
    held: &'a [ScheduledCourse],
) -> Option<&'a ScheduledCourse> {
    held.iter()
        .filter(|entry| entry.course_id != target.id)
        .find(|entry| candidate.overlaps(&entry.schedule))
}

/// Decide whether a student holding `held` may take a seat in `course`.
///
/// Checks run in a fixed order and the first failure wins: capacity, then
/// schedule overlap with another held course, then an existing registration
/// for the same course.
///
/// # Examples
/// ```
/// use registrar::domain::enrollment::{admit, EnrollmentRejection};
/// # use registrar::domain::{Course, CourseCode, CourseDetails, CourseId, MeetingTime};
/// # let course = Course {
/// #     id: CourseId::new(1).unwrap(),
/// #     code: CourseCode::new("CS101").unwrap(),
/// #     details: CourseDetails {
/// #         name: "Intro".into(),
/// #         instructor: "Hopper".into(),
/// #         credits: 3,
/// #         capacity: 1,
/// #         schedule: MeetingTime::parse("Monday", "09:00", "10:00").unwrap(),
/// #         semester: "Fall".into(),
/// #         description: None,
/// #     },
/// #     enrolled: 1,
/// # };
/// assert_eq!(admit(&course, &[]), Err(EnrollmentRejection::CourseFull));
/// ```
pub fn admit(course: &Course, held: &[ScheduledCourse]) -> Result<(), EnrollmentRejection> {
    if course.is_full() {
        return Err(EnrollmentRejection::CourseFull);
    }
    if let Some(clash) = find_conflict(course, &course.details.schedule, held) {
        return Err(EnrollmentRejection::ScheduleConflict {
            code: clash.code.clone(),
            day: clash.schedule.day(),
        });
    }
    if held.iter().any(|entry| entry.course_id == course.id) {
        return Err(EnrollmentRejection::AlreadyRegistered);
    }
    Ok(())
}

/// Students may only drop their own registrations; administrators may drop
/// any.
pub fn may_drop(actor: Actor, owner: UserId) -> bool {
    match actor {
        Actor::Admin(_) => true,
        Actor::Student(id) => id == owner,
    }
}

/// Counter value after releasing one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRelease {
    pub enrolled: u32,
    /// The counter was already zero; callers log this as an invariant breach.
    pub underflow: bool,
}

/// Decrement an enrollment counter, flooring at zero.
pub fn release_seat(enrolled: u32) -> SeatRelease {
    match enrolled.checked_sub(1) {
        Some(enrolled) => SeatRelease {
            enrolled,
            underflow: false,
        },
        None => SeatRelease {
            enrolled: 0,
            underflow: true,
        },
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
