//! Encrypted master-seed envelope.
//!
//! This module provides:
//! - [`generate_encrypted_seed`] — create a fresh password-encrypted 256-byte seed blob
//! - [`unwrap_seed`] — decrypt a seed blob back into usable key material
//!
//! Blob layout (fixed offsets, no magic, no version tag):
//!
//! ```text
//! offset  size   meaning
//! 0       12     AES-GCM nonce (doubles as the PBKDF2 salt)
//! 12      228    AES-GCM ciphertext
//! 240     16     AES-GCM authentication tag
//! ```
//!
//! The nonce is deliberately reused as the PBKDF2 salt: unwrapping proves
//! both confidentiality and that the caller knows the password, and the
//! nonce and tag remain available as public salt material downstream.
//! The unwrapped output keeps the same 256-byte shape, with the nonce and
//! tag copied through unchanged around the decrypted middle.

use std::io;

use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use zeroize::Zeroizing;

use crate::error::DeriveError;
use crate::kdf;

/// Seed blob length in bytes.
pub const SEED_LEN: usize = 256;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Plaintext region length: everything between the nonce and the tag.
const PLAINTEXT_LEN: usize = SEED_LEN - NONCE_LEN - TAG_LEN;

/// Create a fresh encrypted seed blob for the given master password.
///
/// Draws 256 bytes from the OS CSPRNG, derives the wrapping key from the
/// password salted with the random 12-byte prefix, then seals the middle
/// 228 bytes in place under AES-256-GCM. The returned blob is the only
/// artifact a caller ever needs to persist.
///
/// This is the single non-deterministic operation in the crate.
///
/// # Errors
///
/// Returns [`DeriveError::Io`] if the OS CSPRNG or the AEAD provider fails.
pub fn generate_encrypted_seed(password: &str) -> Result<[u8; SEED_LEN], DeriveError> {
    let mut seed = [0u8; SEED_LEN];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|e| io::Error::other(format!("CSPRNG fill failed: {e}")))?;

    let key = kdf::pass_key(password, &seed[..NONCE_LEN]);
    let sealing_key = gcm_key(key.as_ref())?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&seed[..NONCE_LEN]);
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: ciphertext overwrites the plaintext region, the tag
    // lands in the trailing 16 bytes.
    let tag = sealing_key
        .seal_in_place_separate_tag(
            nonce,
            aead::Aad::empty(),
            &mut seed[NONCE_LEN..SEED_LEN - TAG_LEN],
        )
        .map_err(|_| io::Error::other("AES-256-GCM seal failed"))?;
    seed[SEED_LEN - TAG_LEN..].copy_from_slice(tag.as_ref());

    Ok(seed)
}

/// Decrypt a seed blob, authenticating it against the master password.
///
/// The output buffer mirrors the blob: bytes [0, 12) and [240, 256) are
/// copied through unchanged (they are reused as public salt material by
/// the seeded generator), and the middle 228 bytes are the plaintext.
///
/// # Errors
///
/// - [`DeriveError::InvalidSeedLength`] if `seed` is not exactly 256 bytes.
/// - [`DeriveError::BadPassword`] if tag verification fails.
pub fn unwrap_seed(password: &str, seed: &[u8]) -> Result<Zeroizing<[u8; SEED_LEN]>, DeriveError> {
    if seed.len() != SEED_LEN {
        return Err(DeriveError::InvalidSeedLength(seed.len()));
    }

    let key = kdf::pass_key(password, &seed[..NONCE_LEN]);
    let opening_key = gcm_key(key.as_ref())?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&seed[..NONCE_LEN]);
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    // open_in_place wants ciphertext || tag in one buffer.
    let mut ct_tag = Zeroizing::new([0u8; PLAINTEXT_LEN + TAG_LEN]);
    ct_tag.copy_from_slice(&seed[NONCE_LEN..]);

    let plaintext = opening_key
        .open_in_place(nonce, aead::Aad::empty(), &mut ct_tag[..])
        .map_err(|_| DeriveError::BadPassword)?;

    let mut unwrapped = Zeroizing::new([0u8; SEED_LEN]);
    unwrapped[..NONCE_LEN].copy_from_slice(&seed[..NONCE_LEN]);
    unwrapped[NONCE_LEN..SEED_LEN - TAG_LEN].copy_from_slice(plaintext);
    unwrapped[SEED_LEN - TAG_LEN..].copy_from_slice(&seed[SEED_LEN - TAG_LEN..]);

    Ok(unwrapped)
}

fn gcm_key(key: &[u8]) -> Result<aead::LessSafeKey, DeriveError> {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| io::Error::other("failed to create AES-256-GCM key"))?;
    Ok(aead::LessSafeKey::new(unbound))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
