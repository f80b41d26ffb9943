//! Credential directory — role-tagged accounts keyed by identifier.
//!
//! DESIGN
//! ======
//! One map covers both portals; each record's `Profile` variant carries its
//! role, so lookup is a single keyed probe. Secrets are reduced to SHA-256
//! digests when the seed is loaded and the plaintext is dropped.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::model::{Role, Session};

const BUILTIN_SEED: &str = include_str!("seed/directory.json");

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory seed is not valid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read directory seed: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory entry {index} has an empty identifier")]
    EmptyIdentifier { index: usize },
    #[error("directory entry {identifier} has an empty secret")]
    EmptySecret { identifier: String },
    #[error("duplicate directory identifier: {identifier}")]
    Duplicate { identifier: String },
}

/// Seed entry as written in the JSON file. The identifier is the email.
#[derive(Deserialize)]
struct SeedEntry {
    secret: String,
    #[serde(flatten)]
    session: Session,
}

type SecretDigest = [u8; 32];

struct DirectoryRecord {
    secret_digest: SecretDigest,
    session: Session,
}

/// Lowercase (Unicode-aware) and trim an identifier. Returns `None` if
/// nothing is left.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> Option<String> {
    let normalized = identifier.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn hash_secret(secret: &str) -> SecretDigest {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(secret.as_bytes()));
    digest
}

/// Compare digests without an early exit on the first differing byte.
fn digests_match(a: &SecretDigest, b: &SecretDigest) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub struct Directory {
    records: HashMap<String, DirectoryRecord>,
}

impl Directory {
    /// Directory compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded seed is malformed.
    pub fn builtin() -> Result<Self, DirectoryError> {
        Self::from_seed_json(BUILTIN_SEED)
    }

    /// Load a directory from a seed file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub async fn load(path: &Path) -> Result<Self, DirectoryError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_seed_json(&raw)
    }

    /// Parse and validate a JSON seed (array of entries).
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON, empty identifiers or secrets, or
    /// identifiers that collide after normalization.
    pub fn from_seed_json(raw: &str) -> Result<Self, DirectoryError> {
        let entries: Vec<SeedEntry> = serde_json::from_str(raw)?;
        let mut records = HashMap::with_capacity(entries.len());

        for (index, entry) in entries.into_iter().enumerate() {
            let identifier =
                normalize_identifier(&entry.session.email).ok_or(DirectoryError::EmptyIdentifier { index })?;
            if entry.secret.is_empty() {
                return Err(DirectoryError::EmptySecret { identifier });
            }
            if records.contains_key(&identifier) {
                return Err(DirectoryError::Duplicate { identifier });
            }

            let mut session = entry.session;
            session.email.clone_from(&identifier);
            let record = DirectoryRecord { secret_digest: hash_secret(&entry.secret), session };
            records.insert(identifier, record);
        }

        Ok(Self { records })
    }

    /// Match an identifier/secret pair. Returns the account's session with
    /// no secret attached, or `None` when either half does not match.
    #[must_use]
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Option<Session> {
        let identifier = normalize_identifier(identifier)?;
        let record = self.records.get(&identifier)?;
        if !digests_match(&record.secret_digest, &hash_secret(secret)) {
            return None;
        }
        Some(record.session.clone())
    }

    /// Number of accounts with the given role.
    #[must_use]
    pub fn count_role(&self, role: Role) -> usize {
        self.records
            .values()
            .filter(|r| r.session.role() == role)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
