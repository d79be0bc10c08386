//! FSC-001: Core value types.
//!
//! Metadata records, fingerprints, digest database entries, auth tags,
//! the operator secret, artifact locations, and verification results.

use crate::error::FscError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Metadata record
// ============================================================================

/// Width of each decimal timestamp field. Fits any `i64`, sign included.
pub const TIMESTAMP_FIELD_LEN: usize = 20;

/// Length of [`FileMetadataRecord::to_bytes`].
pub const METADATA_RECORD_LEN: usize = 4 + 4 + 4 + 8 + 8 + TIMESTAMP_FIELD_LEN * 2;

/// Filesystem attributes bound into a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadataRecord {
    /// Permission and file-type bits
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub inode: u64,
    /// Size in bytes
    pub size: u64,
    /// Last modification, seconds since the epoch
    pub mtime: i64,
    /// Last status change, seconds since the epoch
    pub ctime: i64,
}

impl FileMetadataRecord {
    /// Canonical encoding: big-endian integers followed by two NUL-padded
    /// decimal timestamp fields.
    pub fn to_bytes(&self) -> [u8; METADATA_RECORD_LEN] {
        let mut out = [0u8; METADATA_RECORD_LEN];
        out[0..4].copy_from_slice(&self.mode.to_be_bytes());
        out[4..8].copy_from_slice(&self.uid.to_be_bytes());
        out[8..12].copy_from_slice(&self.gid.to_be_bytes());
        out[12..20].copy_from_slice(&self.inode.to_be_bytes());
        out[20..28].copy_from_slice(&self.size.to_be_bytes());
        write_timestamp_field(&mut out[28..28 + TIMESTAMP_FIELD_LEN], self.mtime);
        write_timestamp_field(&mut out[28 + TIMESTAMP_FIELD_LEN..], self.ctime);
        out
    }
}

fn write_timestamp_field(field: &mut [u8], secs: i64) {
    let digits = secs.to_string();
    // i64::MIN renders as 20 chars, exactly the field width
    field[..digits.len()].copy_from_slice(digits.as_bytes());
}

// ============================================================================
// Fingerprint
// ============================================================================

/// SHA-256 digest of a file's content followed by its metadata record.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; Fingerprint::LEN]);

impl Fingerprint {
    pub const LEN: usize = 32;
    pub const HEX_LEN: usize = Self::LEN * 2;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex, always [`Fingerprint::HEX_LEN`] chars.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse exactly [`Fingerprint::HEX_LEN`] hex chars.
    pub fn from_hex(s: &str) -> Result<Self, String> {
        if s.len() != Self::HEX_LEN {
            return Err(format!(
                "digest must be {} hex chars, got {}",
                Self::HEX_LEN,
                s.len()
            ));
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| format!("invalid hex digest: {}", e))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ============================================================================
// Digest database
// ============================================================================

/// One tracked file and its fingerprint at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub path: String,
    pub fingerprint: Fingerprint,
}

/// Entries in target-list order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestDatabase {
    pub entries: Vec<DigestEntry>,
}

/// HMAC-SHA256 over the serialized digest database.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTag([u8; Fingerprint::LEN]);

impl AuthTag {
    pub fn from_bytes(bytes: [u8; Fingerprint::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for AuthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthTag({})", self.to_hex())
    }
}

/// Result of checking a database against its stored tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Pass,
    Fail(String),
}

// ============================================================================
// Secret key
// ============================================================================

/// Operator-supplied secret for the database auth tag. Never printed.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(key: impl Into<Vec<u8>>) -> Result<Self, FscError> {
        let key = key.into();
        if key.is_empty() {
            return Err(FscError::EmptyKey);
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl std::str::FromStr for SecretKey {
    type Err = FscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.as_bytes().to_vec())
    }
}

// ============================================================================
// Artifact locations
// ============================================================================

pub const DEFAULT_TARGETS_PATH: &str = "config";
pub const DEFAULT_DATABASE_PATH: &str = "filedb";
pub const DEFAULT_AUTH_TAG_PATH: &str = "hashdb";

/// Where the three persisted artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactPaths {
    /// Quoted-path target list
    #[serde(default = "default_targets")]
    pub targets: PathBuf,

    /// Digest database
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Auth tag over the digest database
    #[serde(default = "default_auth_tag")]
    pub auth_tag: PathBuf,
}

fn default_targets() -> PathBuf {
    PathBuf::from(DEFAULT_TARGETS_PATH)
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_auth_tag() -> PathBuf {
    PathBuf::from(DEFAULT_AUTH_TAG_PATH)
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            database: default_database(),
            auth_tag: default_auth_tag(),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of re-checking one database entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Okay,
    Changed,
    Unreadable { reason: String },
}

impl EntryStatus {
    pub fn is_okay(&self) -> bool {
        matches!(self, Self::Okay)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Okay => write!(f, "okay"),
            Self::Changed => write!(f, "changed"),
            Self::Unreadable { .. } => write!(f, "unreadable"),
        }
    }
}

/// Per-file line of a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub path: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}", self.path, self.status)
    }
}

/// Verifier lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifierState {
    Authenticating,
    Comparing,
    Done,
    Aborted,
}

impl fmt::Display for VerifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticating => write!(f, "AUTHENTICATING"),
            Self::Comparing => write!(f, "COMPARING"),
            Self::Done => write!(f, "DONE"),
            Self::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// Everything a check run produced.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub state: VerifierState,
    pub entries: Vec<EntryReport>,
}

impl VerificationReport {
    pub fn authenticated(&self) -> bool {
        self.state != VerifierState::Aborted
    }

    /// Entries that are changed or unreadable.
    pub fn problems(&self) -> usize {
        self.entries.iter().filter(|e| !e.status.is_okay()).count()
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub files: usize,
    pub tag: AuthTag,
}

// ============================================================================
// Tests
// ============================================================================
