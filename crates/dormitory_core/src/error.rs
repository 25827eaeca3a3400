//! Closed error taxonomy exposed to callers of controllers and managers.
//!
//! # Responsibility
//! - Name every rule violation with a dedicated variant.
//! - Classify errors into coarse kinds for the transport layer.
//!
//! # Invariants
//! - Rule violations never surface as `Store` errors; store errors mean the
//!   backend failed, not that the request was wrong.

use crate::model::ids::{RoomId, StudentId, ThingId, UserId};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DormResult<T> = Result<T, DormError>;

/// Absent entity, keyed by whatever the caller looked it up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    Room(RoomId),
    Student(StudentId),
    StudentNumber(String),
    StudentAccount(UserId),
    Thing(ThingId),
    MarkNumber(i64),
    User(UserId),
    Login(String),
}

impl Display for NotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Room(id) => write!(f, "room not found: {id}"),
            Self::Student(id) => write!(f, "student not found: {id}"),
            Self::StudentNumber(number) => write!(f, "student not found: number `{number}`"),
            Self::StudentAccount(id) => write!(f, "student not found: account {id}"),
            Self::Thing(id) => write!(f, "thing not found: {id}"),
            Self::MarkNumber(mark) => write!(f, "thing not found: mark {mark}"),
            Self::User(id) => write!(f, "user not found: {id}"),
            Self::Login(login) => write!(f, "user not found: login `{login}`"),
        }
    }
}

/// Request contradicts current persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    StudentAlreadyInBase,
    StudentAlreadyLiving,
    StudentNotLiving,
    ThingAlreadyExists,
    ThingHasOwner,
    StudentIsNotOwner,
    LoginOccupied,
    /// Room still holds residents or things.
    RoomNotEmpty,
}

impl Conflict {
    pub fn code(self) -> &'static str {
        match self {
            Self::StudentAlreadyInBase => "student_already_in_base",
            Self::StudentAlreadyLiving => "student_already_living",
            Self::StudentNotLiving => "student_not_living",
            Self::ThingAlreadyExists => "thing_already_exists",
            Self::ThingHasOwner => "thing_has_owner",
            Self::StudentIsNotOwner => "student_is_not_owner",
            Self::LoginOccupied => "login_occupied",
            Self::RoomNotEmpty => "room_not_empty",
        }
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::StudentAlreadyInBase => "already in base",
            Self::StudentAlreadyLiving => "already living",
            Self::StudentNotLiving => "not living",
            Self::ThingAlreadyExists => "already exists",
            Self::ThingHasOwner => "thing has owner",
            Self::StudentIsNotOwner => "student is not owner",
            Self::LoginOccupied => "login occupied",
            Self::RoomNotEmpty => "room is not empty",
        };
        f.write_str(message)
    }
}

/// Request is malformed regardless of stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    EmptyField(&'static str),
    NonPositiveId(&'static str),
    BadSrcRoom,
    BadDstRoom,
}

impl Display for InvalidInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "field `{field}` must not be empty"),
            Self::NonPositiveId(field) => write!(f, "field `{field}` must be positive"),
            Self::BadSrcRoom => f.write_str("bad src room"),
            Self::BadDstRoom => f.write_str("bad dst room"),
        }
    }
}

/// Credential check failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    CredentialNotFound,
    PasswordMismatch,
}

impl Display for AuthFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CredentialNotFound => f.write_str("user not found"),
            Self::PasswordMismatch => f.write_str("password mismatch"),
        }
    }
}

/// Coarse classification used to pick a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    Auth,
    Unavailable,
    Internal,
}

/// Error returned by every controller and manager operation.
#[derive(Debug)]
pub enum DormError {
    NotFound(NotFound),
    Conflict(Conflict),
    InvalidInput(InvalidInput),
    Auth(AuthFailure),
    /// The thing is unowned, or its owner reference no longer resolves.
    ThingHasNoOwner(i64),
    /// The request deadline passed before the operation could finish.
    DeadlineExceeded,
    Store(StoreError),
}

impl DormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::ThingHasNoOwner(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Auth(_) => ErrorKind::Auth,
            Self::DeadlineExceeded => ErrorKind::Unavailable,
            Self::Store(err) if err.is_busy() => ErrorKind::Unavailable,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(conflict) => conflict.code(),
            Self::InvalidInput(_) => "invalid_input",
            Self::Auth(AuthFailure::CredentialNotFound) => "credential_not_found",
            Self::Auth(AuthFailure::PasswordMismatch) => "password_mismatch",
            Self::ThingHasNoOwner(_) => "thing_has_no_owner",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Store(_) => "store_failed",
        }
    }

    /// Returns whether the request itself was refused, as opposed to failing.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Unavailable | ErrorKind::Internal
        )
    }
}

impl Display for DormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(err) => write!(f, "{err}"),
            Self::Conflict(err) => write!(f, "{err}"),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::ThingHasNoOwner(mark) => write!(f, "thing has no owner: mark {mark}"),
            Self::DeadlineExceeded => f.write_str("request deadline exceeded"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NotFound> for DormError {
    fn from(value: NotFound) -> Self {
        Self::NotFound(value)
    }
}

impl From<Conflict> for DormError {
    fn from(value: Conflict) -> Self {
        Self::Conflict(value)
    }
}

impl From<InvalidInput> for DormError {
    fn from(value: InvalidInput) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<AuthFailure> for DormError {
    fn from(value: AuthFailure) -> Self {
        Self::Auth(value)
    }
}

impl From<StoreError> for DormError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for DormError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreError::from(value))
    }
}

/// Rejects blank required text fields.
pub(crate) fn require_text(field: &'static str, value: &str) -> DormResult<()> {
    if value.trim().is_empty() {
        return Err(InvalidInput::EmptyField(field).into());
    }
    Ok(())
}

/// Rejects zero and negative ids/marks before any storage access.
pub(crate) fn require_positive(field: &'static str, value: i64) -> DormResult<()> {
    if value <= 0 {
        return Err(InvalidInput::NonPositiveId(field).into());
    }
    Ok(())
}
