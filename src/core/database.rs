//! FSC-005: Digest database — build, serialize, parse, save (atomic).
//!
//! One line per tracked file, in target-list order:
//! `"<path>":<64 lowercase hex>\n`.

use super::parser;
use super::types::{
    ArtifactPaths, DigestDatabase, DigestEntry, Fingerprint, GenerationSummary, SecretKey,
};
use crate::error::FscError;
use crate::tripwire::{hasher, seal};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fingerprint every target in order. The first failure aborts the build.
pub fn build(targets: &[PathBuf]) -> Result<DigestDatabase, FscError> {
    let mut entries = Vec::with_capacity(targets.len());
    for path in targets {
        let text = path.to_str().ok_or_else(|| FscError::UnrepresentablePath {
            path: path.to_string_lossy().into_owned(),
        })?;
        let fingerprint = hasher::digest(path)?;
        debug!(path = text, digest = %fingerprint, "fingerprinted");
        entries.push(DigestEntry {
            path: text.to_string(),
            fingerprint,
        });
    }
    Ok(DigestDatabase { entries })
}

impl DigestDatabase {
    /// Serialized file contents.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FscError> {
        let mut out = Vec::with_capacity(self.entries.len() * (Fingerprint::HEX_LEN + 32));
        for entry in &self.entries {
            if entry.path.contains(['\n', '\r', '\0']) {
                return Err(FscError::UnrepresentablePath {
                    path: entry.path.clone(),
                });
            }
            out.push(b'"');
            out.extend_from_slice(entry.path.as_bytes());
            out.extend_from_slice(b"\":");
            out.extend_from_slice(entry.fingerprint.to_hex().as_bytes());
            out.push(b'\n');
        }
        Ok(out)
    }
}

/// Parse serialized database text.
pub fn parse(text: &str) -> Result<DigestDatabase, FscError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let malformed = |reason: &str| FscError::MalformedDatabase {
            line: idx + 1,
            reason: reason.to_string(),
        };

        let rest = line
            .strip_prefix('"')
            .ok_or_else(|| malformed("entry must start with a quoted path"))?;
        // digest hex never contains a quote, so the last `":` is the separator
        let sep = rest
            .rfind("\":")
            .ok_or_else(|| malformed("missing \": separator"))?;
        let path = &rest[..sep];
        let hex = &rest[sep + 2..];
        let fingerprint = Fingerprint::from_hex(hex).map_err(|e| malformed(&e))?;
        entries.push(DigestEntry {
            path: path.to_string(),
            fingerprint,
        });
    }
    Ok(DigestDatabase { entries })
}

/// Write bytes atomically (temp file + rename), overwriting any prior version.
pub fn write_atomic(path: &Path, bytes: &[u8], what: &'static str) -> Result<(), FscError> {
    let write_err = |p: &Path, e: std::io::Error| FscError::ArtifactWrite {
        what,
        path: p.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }

    let tmp_path = tmp_path_for(path);
    std::fs::write(&tmp_path, bytes).map_err(|e| write_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(path, e));
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save serialized database bytes.
pub fn save(bytes: &[u8], path: &Path) -> Result<(), FscError> {
    write_atomic(path, bytes, "digest database")
}

/// Load and parse the database file.
pub fn load(path: &Path) -> Result<DigestDatabase, FscError> {
    let text = std::fs::read_to_string(path).map_err(|e| FscError::ArtifactRead {
        what: "digest database",
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&text)
}

/// Full generation run: read targets, build, seal, persist database then tag.
pub fn generate(paths: &ArtifactPaths, key: &SecretKey) -> Result<GenerationSummary, FscError> {
    let targets = parser::parse_target_list_file(&paths.targets)?;
    info!(count = targets.len(), "writing file hashes to db");

    let db = build(&targets)?;
    let bytes = db.to_bytes()?;
    let tag = seal::seal(&bytes, key);

    save(&bytes, &paths.database)?;
    info!("generating db hash");
    seal::write_tag(&tag, &paths.auth_tag)?;

    info!(files = db.entries.len(), "generation complete");
    Ok(GenerationSummary {
        files: db.entries.len(),
        tag,
    })
}
