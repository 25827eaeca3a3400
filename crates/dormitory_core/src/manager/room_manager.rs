//! Room use-cases bounded by the request deadline.

use crate::context::RequestContext;
use crate::controller::room_controller::RoomController;
use crate::error::DormResult;
use crate::manager::observe;
use crate::model::ids::RoomId;
use crate::model::page::PageRequest;
use crate::model::room::Room;
use crate::model::thing::Thing;
use crate::store::room_store::RoomStore;

/// Room entry points taking a `RequestContext`.
pub struct RoomManager<R: RoomStore> {
    rooms: RoomController<R>,
}

impl<R: RoomStore> RoomManager<R> {
    pub fn new(rooms: RoomController<R>) -> Self {
        Self { rooms }
    }

    pub fn add_room(
        &self,
        ctx: &RequestContext,
        room_type: &str,
        room_number: i64,
    ) -> DormResult<RoomId> {
        observe("room_add", ctx, || {
            self.rooms.atomically(ctx.deadline(), || {
                self.rooms.add_room(room_type, room_number)
            })
        })
    }

    pub fn get_room(&self, ctx: &RequestContext, id: RoomId) -> DormResult<Room> {
        observe("room_get", ctx, || self.rooms.get_room(id))
    }

    pub fn list_rooms(&self, ctx: &RequestContext, page: PageRequest) -> DormResult<Vec<Room>> {
        observe("room_list", ctx, || self.rooms.list_rooms(page))
    }

    /// Deletes an empty room.
    ///
    /// # Errors
    /// - `NotFound(Room)` when the room does not exist.
    /// - `Conflict(RoomNotEmpty)` while students live there or things are
    ///   stored there.
    pub fn delete_room(&self, ctx: &RequestContext, id: RoomId) -> DormResult<()> {
        observe("room_delete", ctx, || {
            self.rooms
                .atomically(ctx.deadline(), || self.rooms.delete_room(id))
        })
    }

    pub fn get_room_things(&self, ctx: &RequestContext, id: RoomId) -> DormResult<Vec<Thing>> {
        observe("room_things", ctx, || self.rooms.get_room_things(id))
    }
}
