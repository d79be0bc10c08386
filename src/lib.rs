//! fscheck — file system integrity checker.
//!
//! Fingerprints files by SHA-256 over content plus a canonical metadata
//! record, stores the fingerprints in a digest database, and seals that
//! database with HMAC-SHA256 under an operator secret.

pub mod cli;
pub mod core;
pub mod error;
pub mod tripwire;
