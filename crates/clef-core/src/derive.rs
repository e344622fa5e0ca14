//! Public derivation entry points.
//!
//! Each entry point appends an operation suffix to the caller's realm
//! before keying the generator, so passwords, raw bytes and each key type
//! live in disjoint derivation domains. The suffixes and the key-type
//! names they embed are a compatibility contract.
//!
//! Seedless derivation is always allowed for passwords, but keys and raw
//! bytes refuse it unless the caller opts in: a password-stretched key is
//! too weak to anchor long-term key material.

use crate::drbg::Drbg;
use crate::error::DeriveError;
use crate::keygen::{self, KeyType, PrivateKey};
use crate::password::{self, PasswordSpec};

fn reader_for(
    password: &str,
    realm: &str,
    seed: Option<&[u8]>,
    allow_unsafe: bool,
) -> Result<Drbg, DeriveError> {
    match seed {
        Some(seed) => Drbg::with_seed(password, realm, seed),
        None if allow_unsafe => Ok(Drbg::new(password, realm)),
        None => Err(DeriveError::UnsafeRequested),
    }
}

/// Derive a password for `realm` satisfying `spec`.
///
/// Generator realm: `<realm>-pass`. Seedless use is implicitly allowed.
///
/// # Errors
///
/// - [`DeriveError::BadPassword`] / [`DeriveError::InvalidSeedLength`] from
///   seed unwrapping.
/// - [`DeriveError::InvalidSpec`] if `spec` is inconsistent.
pub fn get_pass(
    password: &str,
    realm: &str,
    seed: Option<&[u8]>,
    spec: &PasswordSpec,
) -> Result<String, DeriveError> {
    let mut rng = reader_for(password, &format!("{realm}-pass"), seed, true)?;
    password::generate_password(&mut rng, spec)
}

/// Derive a private key of type `kt` for `realm`.
///
/// Generator realm: `<realm>-key(<KT>)`, e.g. `example.com-key(EC256)`.
///
/// # Errors
///
/// - [`DeriveError::UnsafeRequested`] if `seed` is absent and
///   `allow_unsafe` is false.
/// - [`DeriveError::BadPassword`] / [`DeriveError::InvalidSeedLength`] from
///   seed unwrapping.
pub fn get_key(
    password: &str,
    realm: &str,
    seed: Option<&[u8]>,
    kt: KeyType,
    allow_unsafe: bool,
) -> Result<PrivateKey, DeriveError> {
    let mut rng = reader_for(password, &format!("{realm}-key({kt})"), seed, allow_unsafe)?;
    keygen::generate_key(&mut rng, kt)
}

/// Derive a raw byte stream for `realm`.
///
/// Generator realm: `<realm>-raw`. The returned reader yields the
/// keystream itself; the caller decides how many bytes to take.
///
/// # Errors
///
/// - [`DeriveError::UnsafeRequested`] if `seed` is absent and
///   `allow_unsafe` is false.
/// - [`DeriveError::BadPassword`] / [`DeriveError::InvalidSeedLength`] from
///   seed unwrapping.
pub fn get_raw(
    password: &str,
    realm: &str,
    seed: Option<&[u8]>,
    allow_unsafe: bool,
) -> Result<Drbg, DeriveError> {
    reader_for(password, &format!("{realm}-raw"), seed, allow_unsafe)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
