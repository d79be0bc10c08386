//! FSC-004: SHA-256 file fingerprints and HMAC-SHA256 keyed digests.
//!
//! A fingerprint is SHA-256 over the file's bytes in order, followed by the
//! 68-byte canonical metadata record. The keyed variant covers raw bytes only
//! and is used for the digest database itself.

use crate::core::types::{AuthTag, FileMetadataRecord, Fingerprint, SecretKey};
use crate::error::FscError;
use crate::tripwire::metadata;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

type HmacSha256 = Hmac<Sha256>;

const STREAM_BUF_SIZE: usize = 65536;

/// Fingerprint a file: content, then its metadata record.
pub fn digest(path: &Path) -> Result<Fingerprint, FscError> {
    let file = std::fs::File::open(path).map_err(|e| FscError::FileOpen {
        path: path.to_path_buf(),
        source: e,
    })?;
    let record = metadata::extract(path)?;
    digest_reader(file, &record).map_err(|e| FscError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Fingerprint arbitrary content with a given metadata record.
pub fn digest_reader<R: Read>(
    reader: R,
    record: &FileMetadataRecord,
) -> std::io::Result<Fingerprint> {
    let mut hasher = Sha256::new();
    stream(reader, |chunk| hasher.update(chunk))?;
    hasher.update(record.to_bytes());
    Ok(Fingerprint::from_bytes(to_array(&hasher.finalize())))
}

/// HMAC-SHA256 over a file's raw bytes.
pub fn digest_keyed(path: &Path, key: &SecretKey) -> Result<AuthTag, FscError> {
    let file = std::fs::File::open(path).map_err(|e| FscError::FileOpen {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut mac = new_mac(key);
    stream(file, |chunk| mac.update(chunk)).map_err(|e| FscError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(AuthTag::from_bytes(to_array(&mac.finalize().into_bytes())))
}

/// HMAC-SHA256 over an in-memory buffer.
pub fn keyed_digest_bytes(bytes: &[u8], key: &SecretKey) -> AuthTag {
    let mut mac = new_mac(key);
    mac.update(bytes);
    AuthTag::from_bytes(to_array(&mac.finalize().into_bytes()))
}

/// Constant-time check of `expected` against HMAC-SHA256 of `bytes`.
pub fn verify_keyed_bytes(bytes: &[u8], key: &SecretKey, expected: &[u8]) -> bool {
    let mut mac = new_mac(key);
    mac.update(bytes);
    mac.verify_slice(expected).is_ok()
}

fn new_mac(key: &SecretKey) -> HmacSha256 {
    <HmacSha256 as Mac>::new_from_slice(key.expose())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"))
}

fn to_array(out: &[u8]) -> [u8; Fingerprint::LEN] {
    let mut bytes = [0u8; Fingerprint::LEN];
    bytes.copy_from_slice(out);
    bytes
}

fn stream<R: Read>(mut reader: R, mut update: impl FnMut(&[u8])) -> std::io::Result<()> {
    let mut buf = [0u8; STREAM_BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        update(&buf[..n]);
    }
    Ok(())
}
