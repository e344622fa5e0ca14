//! Key-type selection and asymmetric key generation.
//!
//! This module provides:
//! - [`KeyType`] — the supported key-type enumeration and its stable names
//! - [`PrivateKey`] — the tagged result of a derivation
//! - [`generate_key`] — route a byte source to the matching generator
//!
//! The textual key-type names feed realm-suffix construction, so they are
//! part of the compatibility contract: renaming one silently changes every
//! key users derive with it.

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::ec::{self, Curve, EcKey};
use crate::error::DeriveError;
use crate::rsa::{self, RsaPrivateKey};

/// Supported key types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    /// ECDSA over NIST P-256.
    Ec256,
    /// ECDSA over NIST P-384.
    Ec384,
    /// ECDSA over NIST P-521.
    Ec521,
    /// Two-prime RSA, 2048-bit modulus.
    Rsa2048,
    /// Two-prime RSA, 4096-bit modulus.
    Rsa4096,
    /// X25519 Diffie-Hellman scalar.
    X25519,
    /// Ed25519 signing seed.
    Ed25519,
}

impl KeyType {
    /// Every supported key type.
    pub const ALL: [Self; 7] = [
        Self::Ec256,
        Self::Ec384,
        Self::Ec521,
        Self::Rsa2048,
        Self::Rsa4096,
        Self::X25519,
        Self::Ed25519,
    ];

    /// Stable name used in realm-suffix construction.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ec256 => "EC256",
            Self::Ec384 => "EC384",
            Self::Ec521 => "EC521",
            Self::Rsa2048 => "RSA2048",
            Self::Rsa4096 => "RSA4096",
            Self::X25519 => "X25519",
            Self::Ed25519 => "ED25519",
        }
    }

    /// Parse a key-type name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`DeriveError::InvalidKeyType`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self, DeriveError> {
        match name.to_ascii_uppercase().as_str() {
            "EC256" => Ok(Self::Ec256),
            "EC384" => Ok(Self::Ec384),
            "EC521" => Ok(Self::Ec521),
            "RSA2048" => Ok(Self::Rsa2048),
            "RSA4096" => Ok(Self::Rsa4096),
            "X25519" => Ok(Self::X25519),
            "ED25519" => Ok(Self::Ed25519),
            _ => Err(DeriveError::InvalidKeyType(name.into())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// X25519 private key: the clamped 32-byte scalar.
pub struct X25519Key {
    scalar: Zeroizing<[u8; 32]>,
}

impl X25519Key {
    /// The clamped private scalar.
    #[must_use]
    pub fn scalar(&self) -> &[u8; 32] {
        &self.scalar
    }

    /// Public key: scalar multiplication of the basepoint.
    #[must_use]
    pub fn public(&self) -> [u8; 32] {
        x25519_dalek::x25519(*self.scalar, x25519_dalek::X25519_BASEPOINT_BYTES)
    }
}

impl fmt::Debug for X25519Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("X25519Key(***)")
    }
}

/// Ed25519 private key: the 32-byte seed; the expanded form is derived
/// on demand by the standard SHA-512 construction.
pub struct Ed25519Key {
    seed: Zeroizing<[u8; 32]>,
}

impl Ed25519Key {
    /// The private seed.
    #[must_use]
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    /// Public verification key.
    #[must_use]
    pub fn verifying_key(&self) -> ed25519_dalek::VerifyingKey {
        ed25519_dalek::SigningKey::from_bytes(&self.seed).verifying_key()
    }
}

impl fmt::Debug for Ed25519Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ed25519Key(***)")
    }
}

/// A derived private key, tagged by algorithm.
///
/// The PEM encoder dispatches on the tag; no further runtime polymorphism
/// is needed.
pub enum PrivateKey {
    /// RSA with CRT parameters.
    Rsa(RsaPrivateKey),
    /// ECDSA over a NIST curve.
    Ec(EcKey),
    /// X25519 scalar.
    X25519(X25519Key),
    /// Ed25519 seed.
    Ed25519(Ed25519Key),
}

impl PrivateKey {
    /// The key type this key was derived as.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Rsa(key) => {
                if key.bits() <= 2048 {
                    KeyType::Rsa2048
                } else {
                    KeyType::Rsa4096
                }
            }
            Self::Ec(key) => match key.curve() {
                Curve::P256 => KeyType::Ec256,
                Curve::P384 => KeyType::Ec384,
                Curve::P521 => KeyType::Ec521,
            },
            Self::X25519(_) => KeyType::X25519,
            Self::Ed25519(_) => KeyType::Ed25519,
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({}, ***)", self.key_type())
    }
}

/// Generate a private key of the requested type from the byte source.
///
/// Byte-consumption per type is frozen: RSA and ECDSA delegate to their
/// frozen generators, X25519 reads exactly 32 bytes and clamps, Ed25519
/// reads exactly 32 seed bytes.
///
/// # Errors
///
/// Returns [`DeriveError::Io`] if the byte source fails.
pub fn generate_key<R: Read>(rng: &mut R, kt: KeyType) -> Result<PrivateKey, DeriveError> {
    match kt {
        KeyType::Ec256 => Ok(PrivateKey::Ec(ec::generate_ec_key(rng, Curve::P256)?)),
        KeyType::Ec384 => Ok(PrivateKey::Ec(ec::generate_ec_key(rng, Curve::P384)?)),
        KeyType::Ec521 => Ok(PrivateKey::Ec(ec::generate_ec_key(rng, Curve::P521)?)),
        KeyType::Rsa2048 => Ok(PrivateKey::Rsa(rsa::generate_rsa_key(rng, 2048)?)),
        KeyType::Rsa4096 => Ok(PrivateKey::Rsa(rsa::generate_rsa_key(rng, 4096)?)),
        KeyType::X25519 => {
            let mut scalar = Zeroizing::new([0u8; 32]);
            rng.read_exact(&mut scalar[..])?;
            clamp_x25519(&mut scalar);
            Ok(PrivateKey::X25519(X25519Key { scalar }))
        }
        KeyType::Ed25519 => {
            let mut seed = Zeroizing::new([0u8; 32]);
            rng.read_exact(&mut seed[..])?;
            Ok(PrivateKey::Ed25519(Ed25519Key { seed }))
        }
    }
}

/// X25519 scalar clamping: clear the low cofactor bits and the top bit,
/// set bit 254.
fn clamp_x25519(k: &mut [u8; 32]) {
    k[0] &= 248;
    k[31] &= 127;
    k[31] |= 64;
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
