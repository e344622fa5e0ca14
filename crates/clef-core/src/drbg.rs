//! Deterministic random byte generator.
//!
//! This module provides:
//! - [`Drbg::new`] — weak generator keyed from password + realm alone
//! - [`Drbg::with_seed`] — strong generator keyed through an encrypted seed
//!
//! Both yield the same thing: an infinite, byte-addressable AES-256-CTR
//! keystream that is a pure function of its 32-byte key. There is no
//! rekeying and no reseeding after construction; the zero IV is part of
//! the contract. Reads are byte-granular — `read(24)` returns exactly the
//! concatenation of `read(5)`, `read(9)`, `read(10)` on a fresh instance —
//! so partial cipher blocks are carried across calls.
//!
//! A `Drbg` is not thread-safe: concurrent reads would corrupt the CTR
//! counter and with it the determinism contract. One derivation, one
//! instance.

use std::io::{self, Read};

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes256;

use crate::error::DeriveError;
use crate::kdf::{self, KEY_LEN};
use crate::seed;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// AES block length — the CTR counter width.
const BLOCK_LEN: usize = 16;

/// Deterministic byte generator backed by an AES-256-CTR keystream.
pub struct Drbg {
    keystream: Aes256Ctr,
}

impl Drbg {
    /// Weak constructor: key the generator from password and realm only.
    ///
    /// The key is `PBKDF2-HMAC-SHA256(password, realm, 4096, 32)`. Without
    /// a seed the output entropy is bounded by the password, which is why
    /// key and raw derivations gate this path behind an explicit opt-in.
    #[must_use]
    pub fn new(password: &str, realm: &str) -> Self {
        let key = kdf::pass_key(password, realm.as_bytes());
        Self::from_key(&key)
    }

    /// Strong constructor: key the generator through an encrypted seed.
    ///
    /// Unwraps the seed with the password, then derives the generator key
    /// with HKDF-SHA256 (IKM = the full unwrapped seed, salt = nonce ‖ tag,
    /// info = realm).
    ///
    /// # Errors
    ///
    /// - [`DeriveError::InvalidSeedLength`] if `seed` is not 256 bytes.
    /// - [`DeriveError::BadPassword`] if the seed does not authenticate.
    pub fn with_seed(password: &str, realm: &str, seed: &[u8]) -> Result<Self, DeriveError> {
        let unwrapped = seed::unwrap_seed(password, seed)?;
        let key = kdf::seed_key(&unwrapped, realm)?;
        Ok(Self::from_key(&key))
    }

    fn from_key(key: &[u8; KEY_LEN]) -> Self {
        let iv = [0u8; BLOCK_LEN];
        Self {
            keystream: Aes256Ctr::new(key.into(), (&iv).into()),
        }
    }

    /// Fill `buf` with the next bytes of the keystream.
    pub fn fill(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        self.keystream.apply_keystream(buf);
    }
}

impl Read for Drbg {
    /// Infinite stream: always fills the whole buffer.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill(buf);
        Ok(buf.len())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
