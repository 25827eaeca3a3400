//! Account store contract and SQLite implementation.

use crate::error::DormResult;
use crate::model::ids::UserId;
use crate::model::user::{PasswordDigest, PrivilegeLevel, User};
use crate::store::{
    classify_write_error, ensure_schema_ready, run_atomically, StoreError, StoreResult,
    Transactional, UniqueKey,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Instant;

/// Persistence port for accounts.
pub trait UserStore: Transactional {
    fn create_user(
        &self,
        login: &str,
        password: &PasswordDigest,
        privilege: PrivilegeLevel,
    ) -> StoreResult<UserId>;
    fn get_user_id_by_login(&self, login: &str) -> StoreResult<Option<UserId>>;
    fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
}

/// SQLite-backed account store.
#[derive(Clone, Copy)]
pub struct SqliteUserStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserStore<'conn> {
    /// Creates a store over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_schema_ready(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl Transactional for SqliteUserStore<'_> {
    fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        run_atomically(self.conn, deadline, work)
    }
}

impl UserStore for SqliteUserStore<'_> {
    fn create_user(
        &self,
        login: &str,
        password: &PasswordDigest,
        privilege: PrivilegeLevel,
    ) -> StoreResult<UserId> {
        self.conn
            .execute(
                "INSERT INTO users (login, password_salt, password_hash, privilege_level)
                 VALUES (?1, ?2, ?3, ?4);",
                params![login, password.salt(), password.hash(), privilege.as_db()],
            )
            .map_err(|err| classify_write_error(err, UniqueKey::Login))?;
        Ok(UserId(self.conn.last_insert_rowid()))
    }

    fn get_user_id_by_login(&self, login: &str) -> StoreResult<Option<UserId>> {
        let id = self
            .conn
            .query_row("SELECT id FROM users WHERE login = ?1;", [login], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(id.map(UserId))
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, login, password_salt, password_hash, privilege_level
             FROM users
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> StoreResult<User> {
    let level: i64 = row.get("privilege_level")?;
    let privilege = PrivilegeLevel::from_db(level).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid privilege level `{level}` in users.privilege_level"
        ))
    })?;

    Ok(User {
        id: UserId(row.get("id")?),
        login: row.get("login")?,
        password: PasswordDigest::from_parts(row.get("password_salt")?, row.get("password_hash")?),
        privilege,
    })
}
