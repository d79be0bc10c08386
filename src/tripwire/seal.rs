//! FSC-006: Database authentication — seal on generate, authenticate on check.
//!
//! The tag lives in its own file, never inside the database. Only a `Pass`
//! lets the verifier trust the database entries.

use crate::core::database;
use crate::core::types::{AuthOutcome, AuthTag, Fingerprint, SecretKey};
use crate::error::FscError;
use crate::tripwire::hasher;
use std::path::Path;
use tracing::{debug, warn};

/// Database bytes and stored tag text, read together.
#[derive(Debug, Clone)]
pub struct SealedDatabase {
    pub bytes: Vec<u8>,
    pub stored_tag: String,
}

impl SealedDatabase {
    /// Recompute the keyed digest over `bytes` and compare in constant time.
    pub fn authenticate(&self, key: &SecretKey) -> AuthOutcome {
        let stored = self.stored_tag.trim();
        if stored.len() != Fingerprint::HEX_LEN {
            return AuthOutcome::Fail(format!(
                "stored tag is {} chars, expected {}",
                stored.len(),
                Fingerprint::HEX_LEN
            ));
        }
        let expected = match hex::decode(stored) {
            Ok(bytes) => bytes,
            Err(e) => return AuthOutcome::Fail(format!("stored tag is not hex: {}", e)),
        };
        if hasher::verify_keyed_bytes(&self.bytes, key, &expected) {
            AuthOutcome::Pass
        } else {
            AuthOutcome::Fail("tag mismatch".to_string())
        }
    }
}

/// Keyed digest over serialized database bytes.
pub fn seal(db_bytes: &[u8], key: &SecretKey) -> AuthTag {
    hasher::keyed_digest_bytes(db_bytes, key)
}

/// Persist a tag as hex plus newline, atomically.
pub fn write_tag(tag: &AuthTag, path: &Path) -> Result<(), FscError> {
    let text = format!("{}\n", tag.to_hex());
    database::write_atomic(path, text.as_bytes(), "auth tag")
}

/// Read both artifacts. Missing or unreadable files are fatal.
pub fn read_sealed(db_path: &Path, tag_path: &Path) -> Result<SealedDatabase, FscError> {
    let bytes = std::fs::read(db_path).map_err(|e| FscError::ArtifactRead {
        what: "digest database",
        path: db_path.to_path_buf(),
        source: e,
    })?;
    let stored_tag = std::fs::read_to_string(tag_path).map_err(|e| FscError::ArtifactRead {
        what: "auth tag",
        path: tag_path.to_path_buf(),
        source: e,
    })?;
    debug!(db_bytes = bytes.len(), "read sealed database");
    Ok(SealedDatabase { bytes, stored_tag })
}

/// Authenticate the persisted database against its persisted tag.
pub fn authenticate(
    db_path: &Path,
    tag_path: &Path,
    key: &SecretKey,
) -> Result<AuthOutcome, FscError> {
    let outcome = read_sealed(db_path, tag_path)?.authenticate(key);
    if let AuthOutcome::Fail(reason) = &outcome {
        warn!(database = %db_path.display(), %reason, "database authentication failed");
    }
    Ok(outcome)
}
