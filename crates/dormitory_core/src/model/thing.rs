//! Thing record, custody state and composed views.
//!
//! # Invariants
//! - A thing has at most one owner and is located in exactly one room.
//! - Custody (who holds it) and location (where it is stored) are orthogonal.
//! - `mark_number` is globally unique and positive.

use crate::model::ids::{RoomId, StudentId, ThingId};
use crate::model::room::Room;
use crate::model::student::TransferDirection;
use serde::{Deserialize, Serialize};

/// Who currently holds a thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "student_id")]
pub enum Custody {
    Unowned,
    OwnedBy(StudentId),
}

impl Custody {
    /// Maps the nullable `things.owner_id` column.
    pub fn from_column(owner_id: Option<i64>) -> Self {
        match owner_id {
            Some(id) => Self::OwnedBy(StudentId(id)),
            None => Self::Unowned,
        }
    }

    pub fn owner(self) -> Option<StudentId> {
        match self {
            Self::OwnedBy(student_id) => Some(student_id),
            Self::Unowned => None,
        }
    }

    pub fn is_owned(self) -> bool {
        matches!(self, Self::OwnedBy(_))
    }
}

/// Persisted thing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thing {
    pub id: ThingId,
    pub mark_number: i64,
    pub thing_type: String,
    pub custody: Custody,
    pub room_id: RoomId,
}

/// Insert payload for a new thing. New things start unowned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThingDraft {
    pub mark_number: i64,
    pub thing_type: String,
    pub room_id: RoomId,
}

/// Thing joined with the room it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingInfo {
    pub thing: Thing,
    pub room: Room,
}

/// One room-to-room move of a thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTransferRecord {
    pub thing_id: ThingId,
    pub src_room_id: RoomId,
    pub dst_room_id: RoomId,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// One hand-over of a thing between a student and the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRecord {
    pub student_id: StudentId,
    pub thing_id: ThingId,
    pub direction: TransferDirection,
    /// Epoch milliseconds.
    pub created_at: i64,
}
