//! Orchestration managers.
//!
//! # Responsibility
//! - Compose controllers into use-cases (onboard, settle, evict, give,
//!   return, transfer, authenticate, room upkeep).
//! - Run each guarded sequence in one transaction bounded by the request
//!   deadline.
//! - Emit one metadata-only log event per operation.
//!
//! # Invariants
//! - Managers either forward controller errors unchanged or remap them where
//!   the business meaning differs (stale owner -> `ThingHasNoOwner`).

use crate::context::RequestContext;
use crate::controller::room_controller::RoomController;
use crate::controller::student_controller::StudentController;
use crate::controller::thing_controller::ThingController;
use crate::controller::user_controller::UserController;
use crate::error::DormResult;
use crate::store::room_store::SqliteRoomStore;
use crate::store::student_store::SqliteStudentStore;
use crate::store::thing_store::SqliteThingStore;
use crate::store::user_store::SqliteUserStore;
use crate::store::StoreResult;
use log::{error, info, warn};
use rusqlite::Connection;
use std::time::Instant;

pub mod auth_manager;
pub mod room_manager;
pub mod student_manager;
pub mod thing_manager;

use auth_manager::AuthManager;
use room_manager::RoomManager;
use student_manager::StudentManager;
use thing_manager::ThingManager;

pub type SqliteStudentManager<'conn> = StudentManager<
    SqliteStudentStore<'conn>,
    SqliteRoomStore<'conn>,
    SqliteThingStore<'conn>,
    SqliteUserStore<'conn>,
>;
pub type SqliteThingManager<'conn> =
    ThingManager<SqliteThingStore<'conn>, SqliteRoomStore<'conn>, SqliteStudentStore<'conn>>;
pub type SqliteAuthManager<'conn> = AuthManager<SqliteUserStore<'conn>>;
pub type SqliteRoomManager<'conn> = RoomManager<SqliteRoomStore<'conn>>;

/// All use-case entry points wired over one SQLite connection.
pub struct Dormitory<'conn> {
    pub rooms: SqliteRoomManager<'conn>,
    pub students: SqliteStudentManager<'conn>,
    pub things: SqliteThingManager<'conn>,
    pub auth: SqliteAuthManager<'conn>,
}

impl<'conn> Dormitory<'conn> {
    /// Wires controllers and managers over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let rooms = SqliteRoomStore::try_new(conn)?;
        let students = SqliteStudentStore::try_new(conn)?;
        let things = SqliteThingStore::try_new(conn)?;
        let users = SqliteUserStore::try_new(conn)?;

        Ok(Self {
            rooms: RoomManager::new(RoomController::new(rooms)),
            students: StudentManager::new(
                StudentController::new(students),
                RoomController::new(rooms),
                ThingController::new(things),
                UserController::new(users),
            ),
            things: ThingManager::new(
                ThingController::new(things),
                RoomController::new(rooms),
                StudentController::new(students),
            ),
            auth: AuthManager::new(UserController::new(users)),
        })
    }
}

/// Runs one manager operation and logs its outcome.
pub(crate) fn observe<T>(
    operation: &'static str,
    ctx: &RequestContext,
    work: impl FnOnce() -> DormResult<T>,
) -> DormResult<T> {
    let started_at = Instant::now();
    let result = ctx.checkpoint().and_then(|()| work());
    let duration_ms = started_at.elapsed().as_millis();

    match &result {
        Ok(_) => info!(
            "event={} module=manager status=ok actor={} duration_ms={}",
            operation,
            ctx.actor(),
            duration_ms
        ),
        Err(err) if err.is_rejection() => warn!(
            "event={} module=manager status=rejected actor={} duration_ms={} error_code={}",
            operation,
            ctx.actor(),
            duration_ms,
            err.code()
        ),
        Err(err) => error!(
            "event={} module=manager status=error actor={} duration_ms={} error_code={} error={}",
            operation,
            ctx.actor(),
            duration_ms,
            err.code(),
            err
        ),
    }

    result
}
