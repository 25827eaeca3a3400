//! Thing orchestration: composed views, relocation and ownership lookup.

use crate::context::RequestContext;
use crate::controller::room_controller::RoomController;
use crate::controller::student_controller::StudentController;
use crate::controller::thing_controller::ThingController;
use crate::error::{require_positive, DormError, DormResult, NotFound};
use crate::manager::observe;
use crate::model::ids::{RoomId, ThingId};
use crate::model::page::PageRequest;
use crate::model::room::Room;
use crate::model::thing::{Custody, Thing, ThingInfo};
use crate::store::room_store::RoomStore;
use crate::store::student_store::StudentStore;
use crate::store::thing_store::ThingStore;
use std::collections::HashMap;

/// Cross-entity thing use-cases.
pub struct ThingManager<T, R, S>
where
    T: ThingStore,
    R: RoomStore,
    S: StudentStore,
{
    things: ThingController<T>,
    rooms: RoomController<R>,
    students: StudentController<S>,
}

impl<T, R, S> ThingManager<T, R, S>
where
    T: ThingStore,
    R: RoomStore,
    S: StudentStore,
{
    pub fn new(
        things: ThingController<T>,
        rooms: RoomController<R>,
        students: StudentController<S>,
    ) -> Self {
        Self {
            things,
            rooms,
            students,
        }
    }

    /// Adds an unowned thing to an existing room.
    ///
    /// A taken mark is reported before an unknown room.
    pub fn add_thing(
        &self,
        ctx: &RequestContext,
        mark_number: i64,
        thing_type: &str,
        room_id: RoomId,
    ) -> DormResult<ThingId> {
        observe("thing_add", ctx, || {
            self.things.atomically(ctx.deadline(), || {
                self.things.add_thing(mark_number, thing_type, room_id)
            })
        })
    }

    pub fn delete_thing(&self, ctx: &RequestContext, mark_number: i64) -> DormResult<()> {
        observe("thing_delete", ctx, || {
            require_positive("mark_number", mark_number)?;
            self.things.atomically(ctx.deadline(), || {
                let thing_id = self.things.get_thing_id_by_mark_number(mark_number)?;
                ctx.checkpoint()?;
                self.things.delete_thing(thing_id)
            })
        })
    }

    /// Every thing together with the room it is stored in.
    pub fn get_full_thing_info(&self, ctx: &RequestContext) -> DormResult<Vec<ThingInfo>> {
        observe("thing_list_full", ctx, || {
            self.things.atomically(ctx.deadline(), || {
                let things = self.things.list_things(PageRequest::ALL)?;
                self.with_rooms(ctx, things)
            })
        })
    }

    /// Unowned things together with the room they are stored in.
    pub fn get_free_things(&self, ctx: &RequestContext) -> DormResult<Vec<ThingInfo>> {
        observe("thing_list_free", ctx, || {
            self.things.atomically(ctx.deadline(), || {
                let things = self.things.get_free_things()?;
                self.with_rooms(ctx, things)
            })
        })
    }

    /// Things held by the student with `number`.
    pub fn get_student_things(
        &self,
        ctx: &RequestContext,
        number: &str,
    ) -> DormResult<Vec<ThingInfo>> {
        observe("thing_list_student", ctx, || {
            self.things.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                let things = self
                    .students
                    .get_student_things(student_id, PageRequest::ALL)?;
                self.with_rooms(ctx, things)
            })
        })
    }

    /// Moves the thing with `mark_number` into `new_room_id`.
    ///
    /// The source room is read here and verified again by the controller
    /// inside the same transaction.
    ///
    /// # Errors
    /// - `NotFound` for an unknown mark number or destination room.
    /// - `InvalidInput(BadDstRoom)` when the thing is already there.
    pub fn transfer_thing(
        &self,
        ctx: &RequestContext,
        mark_number: i64,
        new_room_id: RoomId,
    ) -> DormResult<()> {
        observe("thing_transfer", ctx, || {
            require_positive("mark_number", mark_number)?;
            require_positive("room_id", new_room_id.get())?;
            self.things.atomically(ctx.deadline(), || {
                let thing_id = self.things.get_thing_id_by_mark_number(mark_number)?;
                ctx.checkpoint()?;
                self.rooms.get_room(new_room_id)?;
                ctx.checkpoint()?;
                let src_room = self.things.get_thing_room(thing_id)?;
                ctx.checkpoint()?;
                self.things.transfer_thing(thing_id, src_room, new_room_id)
            })
        })
    }

    /// Returns the student number of whoever holds the thing.
    ///
    /// # Errors
    /// - `ThingHasNoOwner` when the thing is unowned or its owner reference
    ///   no longer resolves to a student.
    pub fn get_owner(&self, ctx: &RequestContext, mark_number: i64) -> DormResult<String> {
        observe("thing_owner", ctx, || {
            require_positive("mark_number", mark_number)?;
            let thing_id = self.things.get_thing_id_by_mark_number(mark_number)?;
            ctx.checkpoint()?;
            let Custody::OwnedBy(owner_id) = self.things.get_current_owner(thing_id)? else {
                return Err(DormError::ThingHasNoOwner(mark_number));
            };
            ctx.checkpoint()?;
            match self.students.get_student(owner_id) {
                Ok(student) => Ok(student.student_number),
                Err(DormError::NotFound(NotFound::Student(_))) => {
                    Err(DormError::ThingHasNoOwner(mark_number))
                }
                Err(err) => Err(err),
            }
        })
    }

    // One room lookup per distinct room rather than per thing.
    fn with_rooms(&self, ctx: &RequestContext, things: Vec<Thing>) -> DormResult<Vec<ThingInfo>> {
        let mut rooms: HashMap<RoomId, Room> = HashMap::new();
        let mut items = Vec::with_capacity(things.len());
        for thing in things {
            let room = match rooms.get(&thing.room_id) {
                Some(room) => room.clone(),
                None => {
                    ctx.checkpoint()?;
                    let room = self.rooms.get_room(thing.room_id)?;
                    rooms.insert(thing.room_id, room.clone());
                    room
                }
            };
            items.push(ThingInfo { thing, room });
        }
        Ok(items)
    }
}
