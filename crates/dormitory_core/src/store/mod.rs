//! Persistence ports and their SQLite adapters.
//!
//! # Responsibility
//! - Define one narrow store contract per entity.
//! - Keep SQL details inside the persistence boundary.
//! - Run guard-then-write sequences inside one immediate transaction.
//!
//! # Invariants
//! - Lookups report absence as `Ok(None)`, never as an error.
//! - Business-key uniqueness is backed by unique indexes and reported as
//!   `StoreError::UniqueViolation`.
//! - Nested atomic sections join the outermost transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::error::{DormError, DormResult};
use crate::model::student::TransferDirection;
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

pub mod room_store;
pub mod student_store;
pub mod thing_store;
pub mod user_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Business key guarded by a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Login,
    StudentNumber,
    MarkNumber,
}

impl Display for UniqueKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => f.write_str("users.login"),
            Self::StudentNumber => f.write_str("students.student_number"),
            Self::MarkNumber => f.write_str("things.mark_number"),
        }
    }
}

/// Store adapter failure.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Insert collided with an existing business key.
    UniqueViolation(UniqueKey),
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl StoreError {
    /// Returns whether the failure was lock contention rather than bad data.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, _))) => matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UniqueViolation(key) => write!(f, "unique constraint violated: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "store requires table `{table}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Unit-of-work seam shared by every store.
pub trait Transactional {
    /// Runs `work` inside one write transaction.
    ///
    /// The write lock is taken before `work` reads anything, so the guard
    /// it evaluates cannot go stale before the write. When a transaction is
    /// already open on the same connection, `work` joins it. The optional
    /// deadline bounds the lock wait and vetoes a commit that would land late.
    fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>;
}

pub(crate) fn run_atomically<T, F>(
    conn: &Connection,
    deadline: Option<Instant>,
    work: F,
) -> DormResult<T>
where
    F: FnOnce() -> DormResult<T>,
{
    if !conn.is_autocommit() {
        return work();
    }

    let restore = match deadline {
        Some(deadline) => {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .filter(|remaining| !remaining.is_zero())
                .ok_or(DormError::DeadlineExceeded)?;
            let configured = current_busy_timeout(conn)?;
            conn.busy_timeout(remaining.min(configured))?;
            Some(configured)
        }
        None => None,
    };

    let outcome = run_immediate(conn, deadline, work);

    if let Some(configured) = restore {
        conn.busy_timeout(configured)?;
    }
    outcome
}

fn run_immediate<T, F>(conn: &Connection, deadline: Option<Instant>, work: F) -> DormResult<T>
where
    F: FnOnce() -> DormResult<T>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|err| {
        if is_expired(deadline) {
            DormError::DeadlineExceeded
        } else {
            DormError::from(err)
        }
    })?;

    let value = work()?;
    if is_expired(deadline) {
        // Dropping `tx` rolls the work back.
        return Err(DormError::DeadlineExceeded);
    }
    tx.commit()?;
    Ok(value)
}

fn is_expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

fn current_busy_timeout(conn: &Connection) -> StoreResult<Duration> {
    let millis: i64 = conn.query_row("PRAGMA busy_timeout;", [], |row| row.get(0))?;
    Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
}

/// Maps a unique-index failure on insert or update to `UniqueViolation(key)`.
pub(crate) fn classify_write_error(err: rusqlite::Error, key: UniqueKey) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::UniqueViolation(key)
        }
        _ => StoreError::from(err),
    }
}

/// Verifies the connection went through `open_db*` before a store uses it.
pub(crate) fn ensure_schema_ready(conn: &Connection, tables: &[&'static str]) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [*table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StoreError::MissingRequiredTable(*table));
        }
    }

    Ok(())
}

pub(crate) fn parse_direction(value: &str, column: &'static str) -> StoreResult<TransferDirection> {
    TransferDirection::from_db(value)
        .ok_or_else(|| StoreError::InvalidData(format!("invalid direction `{value}` in {column}")))
}
