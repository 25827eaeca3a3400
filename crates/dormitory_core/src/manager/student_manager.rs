//! Student orchestration: onboarding, residency and custody hand-over.
//!
//! # Invariants
//! - Onboarding creates the account and the student in one transaction; a
//!   failed student insert leaves no orphan account behind.
//! - A thing is given only while unowned and returned only by its owner.
//!   Giving does not check that the student lives where the thing is stored.

use crate::context::RequestContext;
use crate::controller::room_controller::RoomController;
use crate::controller::student_controller::{validate_draft, StudentController};
use crate::controller::thing_controller::ThingController;
use crate::controller::user_controller::UserController;
use crate::error::{require_positive, require_text, Conflict, DormError, DormResult, NotFound};
use crate::manager::observe;
use crate::model::ids::{RoomId, StudentId, UserId};
use crate::model::page::PageRequest;
use crate::model::student::{Residency, Student, StudentDraft};
use crate::model::thing::Custody;
use crate::model::user::PrivilegeLevel;
use crate::store::room_store::RoomStore;
use crate::store::student_store::StudentStore;
use crate::store::thing_store::ThingStore;
use crate::store::user_store::UserStore;

/// Request model for onboarding a student together with their account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudentRequest {
    pub name: String,
    pub surname: String,
    pub group: String,
    pub student_number: String,
    pub login: String,
    pub password: String,
}

impl NewStudentRequest {
    fn draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            surname: self.surname.clone(),
            group: self.group.clone(),
            student_number: self.student_number.clone(),
        }
    }
}

/// Cross-entity student use-cases.
pub struct StudentManager<S, R, T, U>
where
    S: StudentStore,
    R: RoomStore,
    T: ThingStore,
    U: UserStore,
{
    students: StudentController<S>,
    rooms: RoomController<R>,
    things: ThingController<T>,
    users: UserController<U>,
}

impl<S, R, T, U> StudentManager<S, R, T, U>
where
    S: StudentStore,
    R: RoomStore,
    T: ThingStore,
    U: UserStore,
{
    pub fn new(
        students: StudentController<S>,
        rooms: RoomController<R>,
        things: ThingController<T>,
        users: UserController<U>,
    ) -> Self {
        Self {
            students,
            rooms,
            things,
            users,
        }
    }

    /// Creates a `Student`-level account and a not-living student bound to it.
    ///
    /// # Errors
    /// - `InvalidInput` when any field is blank.
    /// - `Conflict(LoginOccupied)` / `Conflict(StudentAlreadyInBase)`; no row
    ///   is created in either case.
    pub fn add_new_student(
        &self,
        ctx: &RequestContext,
        request: &NewStudentRequest,
    ) -> DormResult<StudentId> {
        observe("student_add", ctx, || {
            let draft = request.draft();
            validate_draft(&draft)?;
            require_text("login", &request.login)?;
            require_text("password", &request.password)?;

            self.students.atomically(ctx.deadline(), || {
                ctx.checkpoint()?;
                if !self.users.is_login_free(&request.login)? {
                    return Err(Conflict::LoginOccupied.into());
                }
                ctx.checkpoint()?;
                match self
                    .students
                    .get_student_id_by_number(&request.student_number)
                {
                    Ok(_) => return Err(Conflict::StudentAlreadyInBase.into()),
                    Err(DormError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                }
                ctx.checkpoint()?;
                self.users
                    .add_user(&request.login, &request.password, PrivilegeLevel::Student)?;
                ctx.checkpoint()?;
                let account_id = self.users.get_user_id_by_login(&request.login)?;
                ctx.checkpoint()?;
                self.students.add_student(&draft, account_id)
            })
        })
    }

    /// Settles the student with `number` into `room_id`.
    ///
    /// # Errors
    /// - `InvalidInput` for a non-positive room id, before touching storage.
    /// - `NotFound` for an unknown student number or room.
    /// - `Conflict(StudentAlreadyLiving)` when the student already lives
    ///   somewhere.
    pub fn settle_student(
        &self,
        ctx: &RequestContext,
        number: &str,
        room_id: RoomId,
    ) -> DormResult<()> {
        observe("student_settle", ctx, || {
            require_positive("room_id", room_id.get())?;
            self.students.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                self.rooms.get_room(room_id)?;
                ctx.checkpoint()?;
                self.students.settle_student(student_id, room_id)
            })
        })
    }

    /// Evicts the student with `number` from their current room.
    pub fn evict_student(&self, ctx: &RequestContext, number: &str) -> DormResult<()> {
        observe("student_evict", ctx, || {
            self.students.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                self.students.evict_student(student_id)
            })
        })
    }

    /// Hands an unowned thing to a student.
    ///
    /// # Errors
    /// - `NotFound` for an unknown student number or mark number.
    /// - `Conflict(ThingHasOwner)` when anyone already holds the thing.
    pub fn give_student_thing(
        &self,
        ctx: &RequestContext,
        number: &str,
        mark_number: i64,
    ) -> DormResult<()> {
        observe("thing_give", ctx, || {
            require_positive("mark_number", mark_number)?;
            self.students.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                let thing_id = self.things.get_thing_id_by_mark_number(mark_number)?;
                ctx.checkpoint()?;
                match self.things.get_current_owner(thing_id)? {
                    Custody::Unowned => {
                        ctx.checkpoint()?;
                        self.students.transfer_thing(student_id, thing_id)
                    }
                    Custody::OwnedBy(_) => Err(Conflict::ThingHasOwner.into()),
                }
            })
        })
    }

    /// Takes a thing back from the student who holds it.
    ///
    /// # Errors
    /// - `Conflict(StudentIsNotOwner)` unless this exact student holds it.
    pub fn return_student_thing(
        &self,
        ctx: &RequestContext,
        number: &str,
        mark_number: i64,
    ) -> DormResult<()> {
        observe("thing_return", ctx, || {
            require_positive("mark_number", mark_number)?;
            self.students.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                let thing_id = self.things.get_thing_id_by_mark_number(mark_number)?;
                ctx.checkpoint()?;
                if self.things.get_current_owner(thing_id)? != Custody::OwnedBy(student_id) {
                    return Err(Conflict::StudentIsNotOwner.into());
                }
                ctx.checkpoint()?;
                self.students.return_thing(student_id, thing_id)
            })
        })
    }

    /// Resolves the student number bound to an account.
    pub fn get_student_by_acc_id(
        &self,
        ctx: &RequestContext,
        account_id: UserId,
    ) -> DormResult<String> {
        observe("student_by_account", ctx, || {
            self.students
                .list_students(PageRequest::ALL)?
                .into_iter()
                .find(|student| student.account_id == account_id)
                .map(|student| student.student_number)
                .ok_or_else(|| NotFound::StudentAccount(account_id).into())
        })
    }

    pub fn get_student(&self, ctx: &RequestContext, number: &str) -> DormResult<Student> {
        observe("student_get", ctx, || {
            let student_id = self.students.get_student_id_by_number(number)?;
            ctx.checkpoint()?;
            self.students.get_student(student_id)
        })
    }

    pub fn list_students(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> DormResult<Vec<Student>> {
        observe("student_list", ctx, || self.students.list_students(page))
    }

    pub fn get_current_room(&self, ctx: &RequestContext, number: &str) -> DormResult<Residency> {
        observe("student_current_room", ctx, || {
            let student_id = self.students.get_student_id_by_number(number)?;
            ctx.checkpoint()?;
            self.students.get_current_room(student_id)
        })
    }

    pub fn change_student_group(
        &self,
        ctx: &RequestContext,
        number: &str,
        group: &str,
    ) -> DormResult<()> {
        observe("student_change_group", ctx, || {
            self.students.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                self.students.change_student_group(student_id, group)
            })
        })
    }

    pub fn change_student_name(
        &self,
        ctx: &RequestContext,
        number: &str,
        name: &str,
    ) -> DormResult<()> {
        observe("student_change_name", ctx, || {
            self.students.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                self.students.change_student_name(student_id, name)
            })
        })
    }

    pub fn change_student_surname(
        &self,
        ctx: &RequestContext,
        number: &str,
        surname: &str,
    ) -> DormResult<()> {
        observe("student_change_surname", ctx, || {
            self.students.atomically(ctx.deadline(), || {
                let student_id = self.students.get_student_id_by_number(number)?;
                ctx.checkpoint()?;
                self.students.change_student_surname(student_id, surname)
            })
        })
    }
}
