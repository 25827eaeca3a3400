//! Room controller.

use crate::error::{require_positive, require_text, Conflict, DormResult, NotFound};
use crate::model::ids::RoomId;
use crate::model::page::PageRequest;
use crate::model::room::Room;
use crate::model::thing::Thing;
use crate::store::room_store::RoomStore;
use log::debug;
use std::time::Instant;

/// Room use-cases over a `RoomStore`.
pub struct RoomController<S: RoomStore> {
    store: S,
}

impl<S: RoomStore> RoomController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts a room. `(room_type, room_number)` pairs may repeat.
    pub fn add_room(&self, room_type: &str, room_number: i64) -> DormResult<RoomId> {
        require_text("room_type", room_type)?;
        require_positive("room_number", room_number)?;
        Ok(self.store.create_room(room_type.trim(), room_number)?)
    }

    pub fn get_room(&self, id: RoomId) -> DormResult<Room> {
        self.store
            .get_room(id)?
            .ok_or_else(|| NotFound::Room(id).into())
    }

    pub fn list_rooms(&self, page: PageRequest) -> DormResult<Vec<Room>> {
        Ok(self.store.list_rooms(page)?)
    }

    /// Deletes an empty room.
    ///
    /// # Errors
    /// - `NotFound(Room)` when the room does not exist.
    /// - `Conflict(RoomNotEmpty)` while students live there or things are
    ///   stored there.
    pub fn delete_room(&self, id: RoomId) -> DormResult<()> {
        self.store.atomically(None, || {
            self.get_room(id)?;
            let residents = self.store.resident_count(id)?;
            let things = self.store.things_in(id)?.len();
            if residents > 0 || things > 0 {
                debug!(
                    "event=room_delete module=controller status=rejected room_id={} residents={} things={}",
                    id, residents, things
                );
                return Err(Conflict::RoomNotEmpty.into());
            }
            if !self.store.delete_room(id)? {
                return Err(NotFound::Room(id).into());
            }
            Ok(())
        })
    }

    /// Lists things stored in an existing room.
    pub fn get_room_things(&self, id: RoomId) -> DormResult<Vec<Thing>> {
        self.get_room(id)?;
        Ok(self.store.things_in(id)?)
    }

    pub(crate) fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        self.store.atomically(deadline, work)
    }
}
