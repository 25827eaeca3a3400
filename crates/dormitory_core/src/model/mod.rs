//! Dormitory domain model.
//!
//! # Responsibility
//! - Define canonical records for rooms, students, things and accounts.
//! - Express "not living" and "unowned" as enum states instead of magic ids.
//!
//! # Invariants
//! - Every persisted entity is identified by a positive typed id.
//! - `Residency` and `Custody` are the only representation of absence.

pub mod ids;
pub mod page;
pub mod room;
pub mod student;
pub mod thing;
pub mod user;
