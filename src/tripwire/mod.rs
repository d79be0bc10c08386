//! Tripwire — metadata-bound fingerprints, HMAC sealing, verification.

pub mod hasher;
pub mod metadata;
pub mod seal;
pub mod verifier;
