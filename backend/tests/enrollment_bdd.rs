//! Behaviour tests for the enrollment engine over the live API.
//!
//! These scenarios drive seat counting, schedule conflicts, repeat
//! enrollment, owner-checked drops and cascade deletes through real HTTP
//! requests, including a burst of concurrent enrollments.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

#[allow(dead_code)]
mod support;

use actix_web::http::Method;
use futures::future::join_all;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use support::{
    ADMIN, Call, SharedWorld, WorldFixture, admin_creates_course, catalogue_entry, course_id,
    enrol_student, perform, registrations_of, send, session_cookie, with_world_async,
};

#[fixture]
fn world() -> WorldFixture {
    support::world()
}

fn enroll(world: &SharedWorld, student: &str, code: &str) {
    let payload = json!({ "course_id": course_id(world, code) });
    perform(
        world,
        Some(student),
        Call::new(Method::POST, "/api/registrations").json(payload),
    );
}

fn registration_id(world: &SharedWorld, owner: &str, code: &str) -> i64 {
    registrations_of(world, ADMIN)
        .iter()
        .find(|row| {
            row.get("username").and_then(Value::as_str) == Some(owner)
                && row.get("code").and_then(Value::as_str) == Some(code)
        })
        .and_then(|row| row.get("id").and_then(Value::as_i64))
        .unwrap_or_else(|| panic!("{owner} holds no registration for {code}"))
}

fn drop_as(world: &SharedWorld, actor: &str, owner: &str, code: &str) {
    let id = registration_id(world, owner, code);
    perform(
        world,
        Some(actor),
        Call::new(Method::DELETE, format!("/api/registrations/{id}")),
    );
}

#[given(
    "the admin has created course \"{code}\" on \"{day}\" from \"{start}\" to \"{end}\" with capacity {capacity}"
)]
fn the_admin_has_created_course(
    world: &WorldFixture,
    code: String,
    day: String,
    start: String,
    end: String,
    capacity: u32,
) {
    admin_creates_course(&world.world(), &code, &day, &start, &end, capacity);
}

#[when("\"{student}\" enrolls in \"{code}\"")]
fn student_enrolls_in(world: &WorldFixture, student: String, code: String) {
    enroll(&world.world(), &student, &code);
}

#[when("\"{student}\" drops their registration for \"{code}\"")]
fn student_drops_their_registration(world: &WorldFixture, student: String, code: String) {
    drop_as(&world.world(), &student, &student, &code);
}

#[when("\"{actor}\" drops the registration of \"{owner}\" for \"{code}\"")]
fn actor_drops_the_registration_of(
    world: &WorldFixture,
    actor: String,
    owner: String,
    code: String,
) {
    drop_as(&world.world(), &actor, &owner, &code);
}

#[when("the admin deletes course \"{code}\"")]
fn the_admin_deletes_course(world: &WorldFixture, code: String) {
    let world = world.world();
    let id = course_id(&world, &code);
    perform(
        &world,
        Some(ADMIN),
        Call::new(Method::DELETE, format!("/api/courses/{id}")),
    );
}

#[when("{count} students race to enroll in \"{code}\"")]
fn students_race_to_enroll(world: &WorldFixture, count: usize, code: String) {
    let world = world.world();
    let names: Vec<String> = (0..count).map(|i| format!("racer{i}")).collect();
    for name in &names {
        enrol_student(&world, name);
    }
    let course = course_id(&world, &code);
    let cookies: Vec<String> = names
        .iter()
        .map(|name| session_cookie(&world, name))
        .collect();

    let replies = with_world_async(&world, |base_url| async move {
        let attempts = cookies.into_iter().map(|cookie| {
            let call = Call::new(Method::POST, "/api/registrations")
                .cookie(Some(cookie))
                .json(json!({ "course_id": course }));
            let base_url = base_url.clone();
            async move { send(&base_url, call).await.0 }
        });
        join_all(attempts).await
    });
    world.borrow_mut().replies = replies;
}

#[then("course \"{code}\" shows {enrolled} enrolled")]
fn course_shows_enrolled(world: &WorldFixture, code: String, enrolled: i64) {
    let entry = catalogue_entry(&world.world(), &code).expect("course listed");
    assert_eq!(entry.get("enrolled").and_then(Value::as_i64), Some(enrolled));
}

#[then("course \"{code}\" is no longer listed")]
fn course_is_no_longer_listed(world: &WorldFixture, code: String) {
    assert!(catalogue_entry(&world.world(), &code).is_none());
}

#[then("\"{student}\" holds {count} registrations")]
fn student_holds_registrations(world: &WorldFixture, student: String, count: usize) {
    assert_eq!(registrations_of(&world.world(), &student).len(), count);
}

#[then("exactly {count} enrollments succeed")]
fn exactly_enrollments_succeed(world: &WorldFixture, count: usize) {
    let world = world.world();
    let ctx = world.borrow();
    let admitted = ctx.replies.iter().filter(|reply| reply.status == 200).count();
    assert_eq!(admitted, count);
}

#[then("every other enrollment is rejected with \"{message}\"")]
fn every_other_enrollment_is_rejected(world: &WorldFixture, message: String) {
    let world = world.world();
    let ctx = world.borrow();
    for reply in ctx.replies.iter().filter(|reply| reply.status != 200) {
        assert_eq!(reply.status, 400);
        assert_eq!(reply.error_message(), Some(message.as_str()));
    }
}

#[then("the registrations for \"{code}\" number {count}")]
fn the_registrations_for_number(world: &WorldFixture, code: String, count: usize) {
    let rows = registrations_of(&world.world(), ADMIN);
    let held = rows
        .iter()
        .filter(|row| row.get("code").and_then(Value::as_str) == Some(code.as_str()))
        .count();
    assert_eq!(held, count);
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "A single seat is released and taken again"
)]
fn single_seat_is_released_and_taken_again(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Overlapping classes on the same day conflict"
)]
fn overlapping_classes_conflict(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Back-to-back classes do not conflict"
)]
fn back_to_back_classes_do_not_conflict(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Enrolling twice counts once"
)]
fn enrolling_twice_counts_once(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Students cannot drop each other's registrations"
)]
fn students_cannot_drop_each_others_registrations(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Deleting a course removes its registrations"
)]
fn deleting_a_course_removes_its_registrations(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Concurrent enrollments never overfill a course"
)]
fn concurrent_enrollments_never_overfill(world: WorldFixture) {
    drop(world);
}
