//! Thing controller.
//!
//! # Responsibility
//! - Enforce mark-number uniqueness on insert.
//! - Guard relocation: a thing moves only from where it actually is to a
//!   different, existing room.
//!
//! # Invariants
//! - `transfer_thing` re-reads the thing's room inside the write transaction,
//!   even when the caller already looked it up.

use crate::controller::unique_as;
use crate::error::{require_positive, require_text, Conflict, DormResult, InvalidInput, NotFound};
use crate::model::ids::{RoomId, ThingId};
use crate::model::page::PageRequest;
use crate::model::thing::{Custody, RoomTransferRecord, Thing, ThingDraft};
use crate::store::thing_store::ThingStore;
use log::debug;
use std::time::Instant;

/// Thing use-cases over a `ThingStore`.
pub struct ThingController<S: ThingStore> {
    store: S,
}

impl<S: ThingStore> ThingController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts an unowned thing located in `room_id`.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank type or non-positive mark/room.
    /// - `Conflict(ThingAlreadyExists)` when the mark number is taken.
    /// - `NotFound(Room)` when the initial room does not exist.
    pub fn add_thing(
        &self,
        mark_number: i64,
        thing_type: &str,
        room_id: RoomId,
    ) -> DormResult<ThingId> {
        require_positive("mark_number", mark_number)?;
        require_text("thing_type", thing_type)?;
        require_positive("room_id", room_id.get())?;

        self.store.atomically(None, || {
            if self
                .store
                .get_thing_id_by_mark_number(mark_number)?
                .is_some()
            {
                return Err(Conflict::ThingAlreadyExists.into());
            }
            if !self.store.room_exists(room_id)? {
                return Err(NotFound::Room(room_id).into());
            }
            let draft = ThingDraft {
                mark_number,
                thing_type: thing_type.trim().to_string(),
                room_id,
            };
            self.store
                .create_thing(&draft)
                .map_err(unique_as(Conflict::ThingAlreadyExists))
        })
    }

    pub fn get_thing(&self, id: ThingId) -> DormResult<Thing> {
        self.store
            .get_thing(id)?
            .ok_or_else(|| NotFound::Thing(id).into())
    }

    pub fn get_thing_id_by_mark_number(&self, mark_number: i64) -> DormResult<ThingId> {
        self.store
            .get_thing_id_by_mark_number(mark_number)?
            .ok_or_else(|| NotFound::MarkNumber(mark_number).into())
    }

    pub fn get_thing_room(&self, id: ThingId) -> DormResult<RoomId> {
        Ok(self.get_thing(id)?.room_id)
    }

    pub fn get_current_owner(&self, id: ThingId) -> DormResult<Custody> {
        Ok(self.get_thing(id)?.custody)
    }

    pub fn list_things(&self, page: PageRequest) -> DormResult<Vec<Thing>> {
        Ok(self.store.list_things(page)?)
    }

    /// Things nobody holds, wherever they are stored.
    pub fn get_free_things(&self) -> DormResult<Vec<Thing>> {
        let things = self.store.list_things(PageRequest::ALL)?;
        Ok(things
            .into_iter()
            .filter(|thing| thing.custody == Custody::Unowned)
            .collect())
    }

    /// Moves a thing from `src_room` to `dst_room`.
    ///
    /// # Errors
    /// - `NotFound(Thing)` when the thing does not exist.
    /// - `InvalidInput(BadSrcRoom)` when the thing is not in `src_room`.
    /// - `InvalidInput(BadDstRoom)` when `dst_room` does not exist or equals
    ///   `src_room`.
    pub fn transfer_thing(
        &self,
        thing_id: ThingId,
        src_room: RoomId,
        dst_room: RoomId,
    ) -> DormResult<()> {
        self.store.atomically(None, || {
            let thing = self.get_thing(thing_id)?;
            if thing.room_id != src_room {
                debug!(
                    "event=thing_transfer module=controller status=rejected thing_id={} actual_room={} src_room={}",
                    thing_id, thing.room_id, src_room
                );
                return Err(InvalidInput::BadSrcRoom.into());
            }
            if dst_room == src_room || !dst_room.is_valid() || !self.store.room_exists(dst_room)? {
                return Err(InvalidInput::BadDstRoom.into());
            }
            Ok(self
                .store
                .record_room_transfer(thing_id, src_room, dst_room)?)
        })
    }

    pub fn delete_thing(&self, id: ThingId) -> DormResult<()> {
        self.store.atomically(None, || {
            self.get_thing(id)?;
            if !self.store.delete_thing(id)? {
                return Err(NotFound::Thing(id).into());
            }
            Ok(())
        })
    }

    pub fn get_room_transfer_history(&self, id: ThingId) -> DormResult<Vec<RoomTransferRecord>> {
        self.get_thing(id)?;
        Ok(self.store.room_transfer_history(id)?)
    }

    pub(crate) fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        self.store.atomically(deadline, work)
    }
}
