//! Student store contract and SQLite implementation.
//!
//! # Invariants
//! - `update_student` rewrites every editable column; callers carry forward
//!   the fields they do not change.
//! - Residency and custody transfers are append-only history rows; the
//!   current-state columns follow through insert triggers.

use crate::error::DormResult;
use crate::model::ids::{RoomId, StudentId, ThingId, UserId};
use crate::model::page::PageRequest;
use crate::model::student::{Residency, ResidencyRecord, Student, StudentDraft, TransferDirection};
use crate::model::thing::{CustodyRecord, Thing};
use crate::store::thing_store::{parse_thing_row, THING_SELECT_SQL};
use crate::store::{
    classify_write_error, ensure_schema_ready, parse_direction, run_atomically, StoreResult,
    Transactional, UniqueKey,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Instant;

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    account_id,
    name,
    surname,
    group_name,
    student_number,
    room_id
FROM students";

/// Persistence port for students and their residency/custody history.
pub trait StudentStore: Transactional {
    fn create_student(&self, draft: &StudentDraft, account_id: UserId) -> StoreResult<StudentId>;
    fn list_students(&self, page: PageRequest) -> StoreResult<Vec<Student>>;
    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>>;
    fn get_student_id_by_number(&self, number: &str) -> StoreResult<Option<StudentId>>;
    /// Returns `false` when no row matched `id`.
    fn update_student(&self, id: StudentId, draft: &StudentDraft) -> StoreResult<bool>;
    /// `Get` settles the student into `room_id`; `Ret` evicts them from it.
    fn record_residency_transfer(
        &self,
        student_id: StudentId,
        room_id: RoomId,
        direction: TransferDirection,
    ) -> StoreResult<()>;
    /// `Get` hands the thing to the student; `Ret` returns it to the pool.
    fn record_custody_transfer(
        &self,
        student_id: StudentId,
        thing_id: ThingId,
        direction: TransferDirection,
    ) -> StoreResult<()>;
    /// Things currently held by the student.
    fn things_of(&self, student_id: StudentId, page: PageRequest) -> StoreResult<Vec<Thing>>;
    fn residency_history(&self, student_id: StudentId) -> StoreResult<Vec<ResidencyRecord>>;
    fn custody_history(&self, student_id: StudentId) -> StoreResult<Vec<CustodyRecord>>;
}

/// SQLite-backed student store.
#[derive(Clone, Copy)]
pub struct SqliteStudentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentStore<'conn> {
    /// Creates a store over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_schema_ready(
            conn,
            &["students", "things", "residency_history", "custody_history"],
        )?;
        Ok(Self { conn })
    }
}

impl Transactional for SqliteStudentStore<'_> {
    fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        run_atomically(self.conn, deadline, work)
    }
}

impl StudentStore for SqliteStudentStore<'_> {
    fn create_student(&self, draft: &StudentDraft, account_id: UserId) -> StoreResult<StudentId> {
        self.conn
            .execute(
                "INSERT INTO students (
                    account_id,
                    name,
                    surname,
                    group_name,
                    student_number,
                    room_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, NULL);",
                params![
                    account_id.get(),
                    draft.name.as_str(),
                    draft.surname.as_str(),
                    draft.group.as_str(),
                    draft.student_number.as_str(),
                ],
            )
            .map_err(|err| classify_write_error(err, UniqueKey::StudentNumber))?;
        Ok(StudentId(self.conn.last_insert_rowid()))
    }

    fn list_students(&self, page: PageRequest) -> StoreResult<Vec<Student>> {
        let (limit, offset) = page.limit_offset();
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL}
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![limit, offset])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn get_student_id_by_number(&self, number: &str) -> StoreResult<Option<StudentId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM students WHERE student_number = ?1;",
                [number],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(StudentId))
    }

    fn update_student(&self, id: StudentId, draft: &StudentDraft) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE students
                 SET
                    name = ?1,
                    surname = ?2,
                    group_name = ?3,
                    student_number = ?4
                 WHERE id = ?5;",
                params![
                    draft.name.as_str(),
                    draft.surname.as_str(),
                    draft.group.as_str(),
                    draft.student_number.as_str(),
                    id.get(),
                ],
            )
            .map_err(|err| classify_write_error(err, UniqueKey::StudentNumber))?;
        Ok(changed > 0)
    }

    fn record_residency_transfer(
        &self,
        student_id: StudentId,
        room_id: RoomId,
        direction: TransferDirection,
    ) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO residency_history (student_id, room_id, direction)
             VALUES (?1, ?2, ?3);",
            params![student_id.get(), room_id.get(), direction.as_db()],
        )?;
        Ok(())
    }

    fn record_custody_transfer(
        &self,
        student_id: StudentId,
        thing_id: ThingId,
        direction: TransferDirection,
    ) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO custody_history (student_id, thing_id, direction)
             VALUES (?1, ?2, ?3);",
            params![student_id.get(), thing_id.get(), direction.as_db()],
        )?;
        Ok(())
    }

    fn things_of(&self, student_id: StudentId, page: PageRequest) -> StoreResult<Vec<Thing>> {
        let (limit, offset) = page.limit_offset();
        let mut stmt = self.conn.prepare(&format!(
            "{THING_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY id ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![student_id.get(), limit, offset])?;
        let mut things = Vec::new();
        while let Some(row) = rows.next()? {
            things.push(parse_thing_row(row)?);
        }
        Ok(things)
    }

    fn residency_history(&self, student_id: StudentId) -> StoreResult<Vec<ResidencyRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, room_id, direction, created_at
             FROM residency_history
             WHERE student_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([student_id.get()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let direction: String = row.get("direction")?;
            records.push(ResidencyRecord {
                student_id: StudentId(row.get("student_id")?),
                room_id: RoomId(row.get("room_id")?),
                direction: parse_direction(&direction, "residency_history.direction")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(records)
    }

    fn custody_history(&self, student_id: StudentId) -> StoreResult<Vec<CustodyRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, thing_id, direction, created_at
             FROM custody_history
             WHERE student_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([student_id.get()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let direction: String = row.get("direction")?;
            records.push(CustodyRecord {
                student_id: StudentId(row.get("student_id")?),
                thing_id: ThingId(row.get("thing_id")?),
                direction: parse_direction(&direction, "custody_history.direction")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(records)
    }
}

fn parse_student_row(row: &Row<'_>) -> StoreResult<Student> {
    Ok(Student {
        id: StudentId(row.get("id")?),
        account_id: UserId(row.get("account_id")?),
        name: row.get("name")?,
        surname: row.get("surname")?,
        group: row.get("group_name")?,
        student_number: row.get("student_number")?,
        residency: Residency::from_column(row.get("room_id")?),
    })
}
