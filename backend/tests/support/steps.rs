//! Steps shared by every behaviour suite.

use serde_json::Value;
use rstest_bdd_macros::{given, then};

use super::{ADMIN, ADMIN_PASSWORD, WorldFixture, enrol_student, last_reply, log_in};

#[given("a running registrar with the default admin")]
fn a_running_registrar_with_the_default_admin(world: &WorldFixture) {
    let reply = log_in(&world.world(), ADMIN, ADMIN_PASSWORD);
    assert_eq!(reply.status, 200, "admin login: {:?}", reply.body);
}

#[given("student \"{name}\" is signed in")]
fn student_is_signed_in(world: &WorldFixture, name: String) {
    enrol_student(&world.world(), &name);
}

#[then("the request succeeds")]
fn the_request_succeeds(world: &WorldFixture) {
    let reply = last_reply(&world.world());
    assert_eq!(reply.status, 200, "unexpected reply: {:?}", reply.body);
    assert_eq!(reply.body.get("success"), Some(&Value::Bool(true)));
}

#[then("the request is rejected with {status} and message \"{message}\"")]
fn the_request_is_rejected(world: &WorldFixture, status: u16, message: String) {
    let reply = last_reply(&world.world());
    assert_eq!(reply.status, status, "unexpected reply: {:?}", reply.body);
    assert_eq!(reply.error_message(), Some(message.as_str()));
}
