//! Student record and residency state.
//!
//! # Invariants
//! - A student lives in at most one room; `Residency::NotLiving` is a state,
//!   not a missing row.
//! - `student_number` is globally unique.

use crate::model::ids::{RoomId, StudentId, UserId};
use serde::{Deserialize, Serialize};

/// Where a student currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "room_id")]
pub enum Residency {
    NotLiving,
    LivingIn(RoomId),
}

impl Residency {
    /// Maps the nullable `students.room_id` column.
    pub fn from_column(room_id: Option<i64>) -> Self {
        match room_id {
            Some(id) => Self::LivingIn(RoomId(id)),
            None => Self::NotLiving,
        }
    }

    pub fn room(self) -> Option<RoomId> {
        match self {
            Self::LivingIn(room_id) => Some(room_id),
            Self::NotLiving => None,
        }
    }

    pub fn is_living(self) -> bool {
        matches!(self, Self::LivingIn(_))
    }
}

/// Direction tag stored on residency and custody history rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    /// Student moves in / takes the thing.
    Get,
    /// Student moves out / hands the thing back.
    Ret,
}

impl TransferDirection {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Ret => "ret",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "get" => Some(Self::Get),
            "ret" => Some(Self::Ret),
            _ => None,
        }
    }
}

/// Persisted student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub account_id: UserId,
    pub name: String,
    pub surname: String,
    pub group: String,
    pub student_number: String,
    pub residency: Residency,
}

impl Student {
    /// Copies the editable fields so an update can carry them forward.
    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            surname: self.surname.clone(),
            group: self.group.clone(),
            student_number: self.student_number.clone(),
        }
    }
}

/// Editable student fields. Store updates rewrite all of them at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub surname: String,
    pub group: String,
    pub student_number: String,
}

impl StudentDraft {
    /// Copy with surrounding whitespace stripped from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            group: self.group.trim().to_string(),
            student_number: self.student_number.trim().to_string(),
        }
    }
}

/// One move-in or move-out entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidencyRecord {
    pub student_id: StudentId,
    pub room_id: RoomId,
    pub direction: TransferDirection,
    /// Epoch milliseconds.
    pub created_at: i64,
}
