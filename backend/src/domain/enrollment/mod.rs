//! Enrollment Engine.
//!
//! The admission and release rules live in [`policy`] as pure functions over
//! a consistent snapshot. Adapters own the unit of work: they lock the rows
//! involved, load the snapshot, apply the policy and write the outcome before
//! releasing the lock. [`service`] exposes the driving ports on top.

pub mod policy;
pub mod service;

pub use self::policy::{
    EnrollmentRejection, SeatRelease, admit, find_conflict, may_drop, release_seat,
};
pub use self::service::EnrollmentService;
