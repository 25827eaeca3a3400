//! Strongly-typed row identifiers.
//!
//! Ids are SQLite rowids, so valid values start at 1.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw rowid value.
            pub fn get(self) -> i64 {
                self.0
            }

            /// Returns whether this id can reference a stored row.
            pub fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a row in `rooms`.
    RoomId
);
row_id!(
    /// Identifier of a row in `students`.
    StudentId
);
row_id!(
    /// Identifier of a row in `things`.
    ThingId
);
row_id!(
    /// Identifier of a row in `users`.
    UserId
);

#[cfg(test)]
mod tests {
    use super::{RoomId, UserId};

    #[test]
    fn only_positive_ids_are_valid() {
        assert!(RoomId(1).is_valid());
        assert!(!RoomId(0).is_valid());
        assert!(!UserId(-3).is_valid());
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&RoomId(42)).expect("id should serialize");
        assert_eq!(json, "42");
    }
}
