//! FSC-000: Error taxonomy.
//!
//! Every failure the core can produce, each naming the path or artifact
//! involved. Core functions return these as values; only `main` exits.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while hashing, sealing, or verifying.
#[derive(Error, Debug)]
pub enum FscError {
    /// The filesystem entry could not be inspected.
    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be opened for reading.
    #[error("could not read file: {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A read failed part-way through the file.
    #[error("read error {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target list contains a line that is not a quoted path.
    #[error("target list {path} line {line}: {reason}")]
    TargetList {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A path cannot be written as a single database line.
    #[error("path cannot be stored in the digest database: {path:?}")]
    UnrepresentablePath { path: String },

    /// The digest database does not follow `"<path>":<hex>` lines.
    #[error("malformed digest database at line {line}: {reason}")]
    MalformedDatabase { line: usize, reason: String },

    /// A persisted artifact (target list, database, auth tag) is missing or unreadable.
    #[error("unable to read {what}: {path}: {source}")]
    ArtifactRead {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted artifact could not be written.
    #[error("could not write {what}: {path}: {source}")]
    ArtifactWrite {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operator secret was empty.
    #[error("secret key must not be empty")]
    EmptyKey,

    /// The settings file could not be parsed.
    #[error("invalid settings file {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    /// The settings parsed but describe an unusable layout.
    #[error("{0} settings validation error(s)")]
    InvalidSettings(usize),

    /// The digest database does not match its auth tag.
    #[error("integrity check failed: {database} does not match {auth_tag}")]
    AuthenticationFailed { database: PathBuf, auth_tag: PathBuf },

    /// `--tripwire` was requested and at least one file is not okay.
    #[error("{0} file(s) changed or unreadable")]
    ChangesDetected(usize),

    /// Writing the machine-readable report failed.
    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FscError {
    /// Log failures that indicate tampering rather than plain I/O trouble.
    pub fn log_if_security_critical(&self) {
        if let FscError::AuthenticationFailed { .. } = self {
            tracing::error!(target: "security", "TAMPER ALERT: {}", self);
        }
    }
}
