//! Room record.

use crate::model::ids::RoomId;
use serde::{Deserialize, Serialize};

/// One dormitory room.
///
/// `(room_type, room_number)` is not unique; two wings may reuse numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_type: String,
    pub room_number: i64,
}
