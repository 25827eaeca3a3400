//! Room store contract and SQLite implementation.

use crate::error::DormResult;
use crate::model::ids::RoomId;
use crate::model::page::PageRequest;
use crate::model::room::Room;
use crate::model::thing::Thing;
use crate::store::thing_store::{parse_thing_row, THING_SELECT_SQL};
use crate::store::{ensure_schema_ready, run_atomically, StoreResult, Transactional};
use rusqlite::{params, Connection, Row};
use std::time::Instant;

const ROOM_SELECT_SQL: &str = "SELECT
    id,
    room_type,
    room_number
FROM rooms";

/// Persistence port for rooms.
pub trait RoomStore: Transactional {
    fn create_room(&self, room_type: &str, room_number: i64) -> StoreResult<RoomId>;
    fn list_rooms(&self, page: PageRequest) -> StoreResult<Vec<Room>>;
    fn get_room(&self, id: RoomId) -> StoreResult<Option<Room>>;
    /// Returns `false` when no row was deleted.
    fn delete_room(&self, id: RoomId) -> StoreResult<bool>;
    /// Things currently stored in the room.
    fn things_in(&self, room_id: RoomId) -> StoreResult<Vec<Thing>>;
    /// Number of students currently living in the room.
    fn resident_count(&self, room_id: RoomId) -> StoreResult<i64>;
}

/// SQLite-backed room store.
#[derive(Clone, Copy)]
pub struct SqliteRoomStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoomStore<'conn> {
    /// Creates a store over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_schema_ready(conn, &["rooms", "things", "students"])?;
        Ok(Self { conn })
    }
}

impl Transactional for SqliteRoomStore<'_> {
    fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        run_atomically(self.conn, deadline, work)
    }
}

impl RoomStore for SqliteRoomStore<'_> {
    fn create_room(&self, room_type: &str, room_number: i64) -> StoreResult<RoomId> {
        self.conn.execute(
            "INSERT INTO rooms (room_type, room_number) VALUES (?1, ?2);",
            params![room_type, room_number],
        )?;
        Ok(RoomId(self.conn.last_insert_rowid()))
    }

    fn list_rooms(&self, page: PageRequest) -> StoreResult<Vec<Room>> {
        let (limit, offset) = page.limit_offset();
        let mut stmt = self.conn.prepare(&format!(
            "{ROOM_SELECT_SQL}
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![limit, offset])?;
        let mut rooms = Vec::new();
        while let Some(row) = rows.next()? {
            rooms.push(parse_room_row(row)?);
        }
        Ok(rooms)
    }

    fn get_room(&self, id: RoomId) -> StoreResult<Option<Room>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROOM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_room_row(row)?));
        }
        Ok(None)
    }

    fn delete_room(&self, id: RoomId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM rooms WHERE id = ?1;", [id.get()])?;
        Ok(changed > 0)
    }

    fn things_in(&self, room_id: RoomId) -> StoreResult<Vec<Thing>> {
        let mut stmt = self.conn.prepare(&format!(
            "{THING_SELECT_SQL}
             WHERE room_id = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([room_id.get()])?;
        let mut things = Vec::new();
        while let Some(row) = rows.next()? {
            things.push(parse_thing_row(row)?);
        }
        Ok(things)
    }

    fn resident_count(&self, room_id: RoomId) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM students WHERE room_id = ?1;",
            [room_id.get()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn parse_room_row(row: &Row<'_>) -> StoreResult<Room> {
    Ok(Room {
        id: RoomId(row.get("id")?),
        room_type: row.get("room_type")?,
        room_number: row.get("room_number")?,
    })
}
