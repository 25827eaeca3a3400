//! Core domain logic for the dormitory occupancy and custody engine.
//! This crate is the single source of truth for residency and custody rules.

pub mod config;
pub mod context;
pub mod controller;
pub mod db;
pub mod error;
pub mod logging;
pub mod manager;
pub mod model;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use context::RequestContext;
pub use controller::room_controller::RoomController;
pub use controller::student_controller::StudentController;
pub use controller::thing_controller::ThingController;
pub use controller::user_controller::UserController;
pub use db::{open_db, open_db_in_memory, open_db_with_options, DbError, DbOptions};
pub use error::{AuthFailure, Conflict, DormError, DormResult, ErrorKind, InvalidInput, NotFound};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use manager::auth_manager::AuthManager;
pub use manager::room_manager::RoomManager;
pub use manager::student_manager::{NewStudentRequest, StudentManager};
pub use manager::thing_manager::ThingManager;
pub use manager::Dormitory;
pub use model::ids::{RoomId, StudentId, ThingId, UserId};
pub use model::page::PageRequest;
pub use model::room::Room;
pub use model::student::{Residency, ResidencyRecord, Student, StudentDraft, TransferDirection};
pub use model::thing::{Custody, CustodyRecord, RoomTransferRecord, Thing, ThingDraft, ThingInfo};
pub use model::user::{PasswordDigest, PrivilegeLevel, User};
pub use store::{StoreError, StoreResult, UniqueKey};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
