//! Account record, privilege levels and password digests.
//!
//! # Invariants
//! - `login` is globally unique.
//! - Plain-text passwords never reach storage; only salted digests do.

use crate::model::ids::UserId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Role carried by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeLevel {
    NonAuth,
    Student,
    Supply,
    Comend,
}

impl PrivilegeLevel {
    pub(crate) fn as_db(self) -> i64 {
        match self {
            Self::NonAuth => 0,
            Self::Student => 1,
            Self::Supply => 2,
            Self::Comend => 3,
        }
    }

    pub(crate) fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::NonAuth),
            1 => Some(Self::Student),
            2 => Some(Self::Supply),
            3 => Some(Self::Comend),
            _ => None,
        }
    }
}

/// Salted SHA-256 digest of an account password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: String,
    hash: String,
}

impl PasswordDigest {
    /// Derives a digest with a fresh random salt.
    pub fn derive(password: &str) -> Self {
        Self::with_salt(Uuid::new_v4().simple().to_string(), password)
    }

    /// Derives a digest with a caller-provided salt.
    pub fn with_salt(salt: impl Into<String>, password: &str) -> Self {
        let salt = salt.into();
        let hash = hash_password(&salt, password);
        Self { salt, hash }
    }

    /// Rebuilds a digest loaded from storage.
    pub fn from_parts(salt: String, hash: String) -> Self {
        Self { salt, hash }
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns whether `password` produces this digest.
    pub fn matches(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.hash
    }
}

// Digests are secrets too; keep them out of debug logs.
impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Persisted account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub password: PasswordDigest,
    pub privilege: PrivilegeLevel,
}

#[cfg(test)]
mod tests {
    use super::{PasswordDigest, PrivilegeLevel};

    #[test]
    fn digest_matches_only_original_password() {
        let digest = PasswordDigest::derive("hunter2");
        assert!(digest.matches("hunter2"));
        assert!(!digest.matches("hunter3"));
        assert!(!digest.matches(""));
    }

    #[test]
    fn same_password_with_different_salts_differs() {
        let first = PasswordDigest::with_salt("a", "secret");
        let second = PasswordDigest::with_salt("b", "secret");
        assert_ne!(first.hash(), second.hash());
    }

    #[test]
    fn debug_output_hides_digest() {
        let digest = PasswordDigest::with_salt("salt", "secret");
        let rendered = format!("{digest:?}");
        assert!(!rendered.contains(digest.hash()));
    }

    #[test]
    fn privilege_levels_roundtrip_db_codes() {
        for level in [
            PrivilegeLevel::NonAuth,
            PrivilegeLevel::Student,
            PrivilegeLevel::Supply,
            PrivilegeLevel::Comend,
        ] {
            assert_eq!(PrivilegeLevel::from_db(level.as_db()), Some(level));
        }
        assert_eq!(PrivilegeLevel::from_db(9), None);
    }
}
