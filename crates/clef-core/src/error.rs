//! Error types for `clef-core`.

use thiserror::Error;

/// Errors produced by derivation operations.
///
/// The password-compliance loop and the RSA prime search are expected
/// control flow, not errors; nothing in this crate retries a failed
/// operation on the caller's behalf.
#[derive(Debug, Error)]
pub enum DeriveError {
    /// Seed unwrap failed — authentication tag mismatch, so either the
    /// password is wrong or the blob was tampered with.
    #[error("seed unwrap failed: wrong password or corrupted seed")]
    BadPassword,

    /// Seedless key or raw derivation attempted without the unsafe opt-in.
    #[error("generating keys without a strong seed is not allowed")]
    UnsafeRequested,

    /// Password specification violates its own constraints.
    #[error("invalid password specification: {0}")]
    InvalidSpec(String),

    /// Key-type selector outside the supported enumeration.
    #[error("invalid key type: {0}")]
    InvalidKeyType(String),

    /// Seed blob is not exactly [`SEED_LEN`](crate::seed::SEED_LEN) bytes.
    #[error("invalid seed length: {0} bytes (expected {expected})", expected = crate::seed::SEED_LEN)]
    InvalidSeedLength(usize),

    /// Wrapped error from the underlying byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
