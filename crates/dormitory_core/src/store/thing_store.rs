//! Thing store contract and SQLite implementation.
//!
//! # Invariants
//! - `record_room_transfer` writes the audit row and moves the thing in one
//!   statement (see the `trg_room_transfer_history_apply` trigger).

use crate::error::DormResult;
use crate::model::ids::{RoomId, ThingId};
use crate::model::page::PageRequest;
use crate::model::thing::{Custody, RoomTransferRecord, Thing, ThingDraft};
use crate::store::{
    classify_write_error, ensure_schema_ready, run_atomically, StoreError, StoreResult,
    Transactional, UniqueKey,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Instant;

pub(crate) const THING_SELECT_SQL: &str = "SELECT
    id,
    mark_number,
    thing_type,
    owner_id,
    room_id
FROM things";

/// Persistence port for things.
pub trait ThingStore: Transactional {
    fn create_thing(&self, draft: &ThingDraft) -> StoreResult<ThingId>;
    fn list_things(&self, page: PageRequest) -> StoreResult<Vec<Thing>>;
    fn get_thing(&self, id: ThingId) -> StoreResult<Option<Thing>>;
    /// Returns `false` when no row was deleted.
    fn delete_thing(&self, id: ThingId) -> StoreResult<bool>;
    fn get_thing_id_by_mark_number(&self, mark_number: i64) -> StoreResult<Option<ThingId>>;
    /// Appends a room-transfer row and relocates the thing to `dst_room`.
    fn record_room_transfer(
        &self,
        thing_id: ThingId,
        src_room: RoomId,
        dst_room: RoomId,
    ) -> StoreResult<()>;
    /// Room moves of one thing, oldest first.
    fn room_transfer_history(&self, thing_id: ThingId) -> StoreResult<Vec<RoomTransferRecord>>;
    fn room_exists(&self, room_id: RoomId) -> StoreResult<bool>;
}

/// SQLite-backed thing store.
#[derive(Clone, Copy)]
pub struct SqliteThingStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteThingStore<'conn> {
    /// Creates a store over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_schema_ready(conn, &["things", "rooms", "room_transfer_history"])?;
        Ok(Self { conn })
    }
}

impl Transactional for SqliteThingStore<'_> {
    fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        run_atomically(self.conn, deadline, work)
    }
}

impl ThingStore for SqliteThingStore<'_> {
    fn create_thing(&self, draft: &ThingDraft) -> StoreResult<ThingId> {
        self.conn
            .execute(
                "INSERT INTO things (mark_number, thing_type, owner_id, room_id)
                 VALUES (?1, ?2, NULL, ?3);",
                params![
                    draft.mark_number,
                    draft.thing_type.as_str(),
                    draft.room_id.get()
                ],
            )
            .map_err(|err| classify_write_error(err, UniqueKey::MarkNumber))?;
        Ok(ThingId(self.conn.last_insert_rowid()))
    }

    fn list_things(&self, page: PageRequest) -> StoreResult<Vec<Thing>> {
        let (limit, offset) = page.limit_offset();
        let mut stmt = self.conn.prepare(&format!(
            "{THING_SELECT_SQL}
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![limit, offset])?;
        let mut things = Vec::new();
        while let Some(row) = rows.next()? {
            things.push(parse_thing_row(row)?);
        }
        Ok(things)
    }

    fn get_thing(&self, id: ThingId) -> StoreResult<Option<Thing>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{THING_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_thing_row(row)?));
        }
        Ok(None)
    }

    fn delete_thing(&self, id: ThingId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM things WHERE id = ?1;", [id.get()])?;
        Ok(changed > 0)
    }

    fn get_thing_id_by_mark_number(&self, mark_number: i64) -> StoreResult<Option<ThingId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM things WHERE mark_number = ?1;",
                [mark_number],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(ThingId))
    }

    fn record_room_transfer(
        &self,
        thing_id: ThingId,
        src_room: RoomId,
        dst_room: RoomId,
    ) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO room_transfer_history (thing_id, src_room_id, dst_room_id)
             VALUES (?1, ?2, ?3);",
            params![thing_id.get(), src_room.get(), dst_room.get()],
        )?;
        Ok(())
    }

    fn room_transfer_history(&self, thing_id: ThingId) -> StoreResult<Vec<RoomTransferRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT thing_id, src_room_id, dst_room_id, created_at
             FROM room_transfer_history
             WHERE thing_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([thing_id.get()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(RoomTransferRecord {
                thing_id: ThingId(row.get("thing_id")?),
                src_room_id: RoomId(row.get("src_room_id")?),
                dst_room_id: RoomId(row.get("dst_room_id")?),
                created_at: row.get("created_at")?,
            });
        }
        Ok(records)
    }

    fn room_exists(&self, room_id: RoomId) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM rooms WHERE id = ?1);",
            [room_id.get()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

pub(crate) fn parse_thing_row(row: &Row<'_>) -> StoreResult<Thing> {
    let mark_number: i64 = row.get("mark_number")?;
    if mark_number <= 0 {
        return Err(StoreError::InvalidData(format!(
            "invalid mark number `{mark_number}` in things.mark_number"
        )));
    }

    Ok(Thing {
        id: ThingId(row.get("id")?),
        mark_number,
        thing_type: row.get("thing_type")?,
        custody: Custody::from_column(row.get("owner_id")?),
        room_id: RoomId(row.get("room_id")?),
    })
}
