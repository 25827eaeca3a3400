//! Student controller.
//!
//! # Responsibility
//! - Enforce student-number uniqueness on insert.
//! - Guard the residency state machine:
//!   `NotLiving --settle--> LivingIn(room) --evict--> NotLiving`.
//! - Record custody hand-overs for an existing student.
//!
//! # Invariants
//! - Settle requires `Residency::NotLiving`; evict requires `LivingIn`.
//! - Field changes are read-modify-write of the whole record.

use crate::controller::unique_as;
use crate::error::{require_positive, require_text, Conflict, DormResult, NotFound};
use crate::model::ids::{RoomId, StudentId, ThingId, UserId};
use crate::model::page::PageRequest;
use crate::model::student::{Residency, ResidencyRecord, Student, StudentDraft, TransferDirection};
use crate::model::thing::{CustodyRecord, Thing};
use crate::store::student_store::StudentStore;
use log::debug;
use std::time::Instant;

/// Student use-cases over a `StudentStore`.
pub struct StudentController<S: StudentStore> {
    store: S,
}

impl<S: StudentStore> StudentController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts a not-yet-living student bound to an existing account.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank field or a non-positive account id.
    /// - `Conflict(StudentAlreadyInBase)` when the number is taken.
    pub fn add_student(
        &self,
        draft: &StudentDraft,
        account_id: UserId,
    ) -> DormResult<StudentId> {
        require_positive("account_id", account_id.get())?;
        validate_draft(draft)?;
        let draft = &draft.trimmed();

        self.store.atomically(None, || {
            if self
                .store
                .get_student_id_by_number(&draft.student_number)?
                .is_some()
            {
                return Err(Conflict::StudentAlreadyInBase.into());
            }
            self.store
                .create_student(draft, account_id)
                .map_err(unique_as(Conflict::StudentAlreadyInBase))
        })
    }

    pub fn get_student(&self, id: StudentId) -> DormResult<Student> {
        self.store
            .get_student(id)?
            .ok_or_else(|| NotFound::Student(id).into())
    }

    pub fn get_student_id_by_number(&self, number: &str) -> DormResult<StudentId> {
        let number = number.trim();
        self.store
            .get_student_id_by_number(number)?
            .ok_or_else(|| NotFound::StudentNumber(number.to_string()).into())
    }

    pub fn list_students(&self, page: PageRequest) -> DormResult<Vec<Student>> {
        Ok(self.store.list_students(page)?)
    }

    pub fn get_current_room(&self, id: StudentId) -> DormResult<Residency> {
        Ok(self.get_student(id)?.residency)
    }

    /// Moves a not-living student into `room_id`.
    pub fn settle_student(&self, id: StudentId, room_id: RoomId) -> DormResult<()> {
        self.store.atomically(None, || {
            let student = self.get_student(id)?;
            if let Residency::LivingIn(current) = student.residency {
                debug!(
                    "event=student_settle module=controller status=rejected student_id={} room_id={}",
                    id, current
                );
                return Err(Conflict::StudentAlreadyLiving.into());
            }
            Ok(self
                .store
                .record_residency_transfer(id, room_id, TransferDirection::Get)?)
        })
    }

    /// Moves a living student out of their current room.
    pub fn evict_student(&self, id: StudentId) -> DormResult<()> {
        self.store.atomically(None, || {
            let student = self.get_student(id)?;
            let Residency::LivingIn(room_id) = student.residency else {
                debug!(
                    "event=student_evict module=controller status=rejected student_id={}",
                    id
                );
                return Err(Conflict::StudentNotLiving.into());
            };
            Ok(self
                .store
                .record_residency_transfer(id, room_id, TransferDirection::Ret)?)
        })
    }

    pub fn change_student_group(&self, id: StudentId, group: &str) -> DormResult<()> {
        require_text("group", group)?;
        self.rewrite(id, |draft| draft.group = group.trim().to_string())
    }

    pub fn change_student_name(&self, id: StudentId, name: &str) -> DormResult<()> {
        require_text("name", name)?;
        self.rewrite(id, |draft| draft.name = name.trim().to_string())
    }

    pub fn change_student_surname(&self, id: StudentId, surname: &str) -> DormResult<()> {
        require_text("surname", surname)?;
        self.rewrite(id, |draft| draft.surname = surname.trim().to_string())
    }

    /// Records that the student took `thing_id` from the pool.
    ///
    /// Ownership guards live in `StudentManager::give_student_thing`.
    pub fn transfer_thing(&self, student_id: StudentId, thing_id: ThingId) -> DormResult<()> {
        self.store.atomically(None, || {
            self.get_student(student_id)?;
            Ok(self
                .store
                .record_custody_transfer(student_id, thing_id, TransferDirection::Get)?)
        })
    }

    /// Records that the student handed `thing_id` back to the pool.
    pub fn return_thing(&self, student_id: StudentId, thing_id: ThingId) -> DormResult<()> {
        self.store.atomically(None, || {
            self.get_student(student_id)?;
            Ok(self
                .store
                .record_custody_transfer(student_id, thing_id, TransferDirection::Ret)?)
        })
    }

    /// Things currently held by an existing student.
    pub fn get_student_things(&self, id: StudentId, page: PageRequest) -> DormResult<Vec<Thing>> {
        self.get_student(id)?;
        Ok(self.store.things_of(id, page)?)
    }

    pub fn get_residency_history(&self, id: StudentId) -> DormResult<Vec<ResidencyRecord>> {
        self.get_student(id)?;
        Ok(self.store.residency_history(id)?)
    }

    pub fn get_custody_history(&self, id: StudentId) -> DormResult<Vec<CustodyRecord>> {
        self.get_student(id)?;
        Ok(self.store.custody_history(id)?)
    }

    pub(crate) fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        self.store.atomically(deadline, work)
    }

    fn rewrite(&self, id: StudentId, edit: impl FnOnce(&mut StudentDraft)) -> DormResult<()> {
        self.store.atomically(None, || {
            let mut draft = self.get_student(id)?.to_draft();
            edit(&mut draft);
            if !self
                .store
                .update_student(id, &draft)
                .map_err(unique_as(Conflict::StudentAlreadyInBase))?
            {
                return Err(NotFound::Student(id).into());
            }
            Ok(())
        })
    }
}

pub(crate) fn validate_draft(draft: &StudentDraft) -> DormResult<()> {
    require_text("name", &draft.name)?;
    require_text("surname", &draft.surname)?;
    require_text("group", &draft.group)?;
    require_text("student_number", &draft.student_number)?;
    Ok(())
}
