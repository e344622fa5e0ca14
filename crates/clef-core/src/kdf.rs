//! Key stretching and seed expansion.
//!
//! This module provides:
//! - [`pass_key`] — PBKDF2-HMAC-SHA256 stretch of the master password
//! - [`seed_key`] — HKDF-SHA256 expansion of an unwrapped seed into a
//!   realm-bound generator key
//!
//! Both functions are pure: the same inputs always produce the same key.
//! Every derived output in this crate traces back to one of these two.

use std::io;
use std::num::NonZeroU32;

use ring::{hkdf, pbkdf2};
use zeroize::Zeroizing;

use crate::error::DeriveError;
use crate::seed::{NONCE_LEN, SEED_LEN, TAG_LEN};

/// Derived key length in bytes (256 bits) — AES-256 key size.
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count. Changing this changes every derived output.
const PBKDF2_ROUNDS: NonZeroU32 = match NonZeroU32::new(4096) {
    Some(n) => n,
    None => unreachable!(),
};

/// HKDF salt length: seed nonce concatenated with the GCM tag.
const HKDF_SALT_LEN: usize = NONCE_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// HKDF output length marker
// ---------------------------------------------------------------------------

/// Marker type for `ring::hkdf::Prk::expand` — requests 32-byte output.
struct HkdfLen32;

impl hkdf::KeyType for HkdfLen32 {
    fn len(&self) -> usize {
        KEY_LEN
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Stretch a master password into a 256-bit key with PBKDF2-HMAC-SHA256.
///
/// The salt is context-dependent: the realm string for the weak generator,
/// or the 12-byte seed-blob prefix for the seed envelope.
pub(crate) fn pass_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ROUNDS,
        salt,
        password.as_bytes(),
        &mut key[..],
    );
    key
}

/// Expand an unwrapped seed into a realm-bound 256-bit generator key.
///
/// The HKDF salt is assembled from the public parts of the seed blob:
/// the 12-byte nonce followed by the 16-byte authentication tag. The full
/// 256-byte unwrapped seed is the input key material and the realm is the
/// info string, so distinct realms yield independent keys from one seed.
pub(crate) fn seed_key(
    unwrapped: &[u8; SEED_LEN],
    realm: &str,
) -> Result<Zeroizing<[u8; KEY_LEN]>, DeriveError> {
    let mut salt = [0u8; HKDF_SALT_LEN];
    salt[..NONCE_LEN].copy_from_slice(&unwrapped[..NONCE_LEN]);
    salt[NONCE_LEN..].copy_from_slice(&unwrapped[SEED_LEN - TAG_LEN..]);

    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, &salt).extract(unwrapped.as_slice());
    let info = [realm.as_bytes()];
    let okm = prk
        .expand(&info, HkdfLen32)
        .map_err(|_| io::Error::other("HKDF expand failed"))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    okm.fill(&mut key[..])
        .map_err(|_| io::Error::other("HKDF fill failed"))?;
    Ok(key)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
