//! Entity controllers.
//!
//! # Responsibility
//! - Wrap one store each with existence checks and per-entity validation.
//! - Translate "row absent" store signals into typed `NotFound` errors.
//! - Own single-entity guards (residency, custody hand-over, relocation).
//!
//! # Invariants
//! - Controllers hold no state between calls; every guard re-reads storage.
//! - Guard and write run inside one `Transactional::atomically` section.

use crate::error::{Conflict, DormError};
use crate::store::StoreError;

pub mod room_controller;
pub mod student_controller;
pub mod thing_controller;
pub mod user_controller;

/// Reports a unique-index hit with the same conflict the pre-check raises.
pub(crate) fn unique_as(conflict: Conflict) -> impl FnOnce(StoreError) -> DormError {
    move |err| match err {
        StoreError::UniqueViolation(_) => DormError::Conflict(conflict),
        other => DormError::Store(other),
    }
}
