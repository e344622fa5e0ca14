//! Deterministic ECDSA private-key selection for the NIST curves.
//!
//! The private scalar draw is frozen: read `bitlen(order)/8 + 8` bytes
//! from the caller's reader (40, 56 and 73 bytes for P-256, P-384 and
//! P-521), reduce modulo `order - 1`, add one. The extra 64 bits make the
//! reduction bias negligible, and the byte count must never change — it
//! is part of the reproducibility contract.

use std::io::{self, Read};

use num_bigint::BigUint;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::Zeroizing;

use crate::error::DeriveError;

/// Supported NIST curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// NIST P-256 (secp256r1).
    P256,
    /// NIST P-384 (secp384r1).
    P384,
    /// NIST P-521 (secp521r1).
    P521,
}

impl Curve {
    /// Group order as big-endian hex.
    const fn order_hex(self) -> &'static [u8] {
        match self {
            Self::P256 => b"FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551",
            Self::P384 => {
                b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFC7634D81F4372DDF581A0DB248B0A77AECEC196ACCC52973"
            }
            Self::P521 => {
                b"01FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFA51868783BF2F966B7FCC0148F709A5D03BB5C9B8899C47AEBB6FB71E91386409"
            }
        }
    }

    fn order(self) -> BigUint {
        BigUint::parse_bytes(self.order_hex(), 16).expect("curve order constant parses")
    }

    /// Bit length of the group order.
    const fn order_bits(self) -> usize {
        match self {
            Self::P256 => 256,
            Self::P384 => 384,
            Self::P521 => 521,
        }
    }

    /// Bytes consumed per scalar draw: `order_bits/8 + 8`.
    const fn candidate_len(self) -> usize {
        self.order_bits() / 8 + 8
    }

    /// Fixed-width scalar encoding length (the curve's field size).
    #[must_use]
    pub const fn scalar_len(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Conventional curve name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }
}

/// ECDSA private key: curve, fixed-width scalar, and uncompressed public point.
pub struct EcKey {
    pub(crate) curve: Curve,
    pub(crate) scalar: Zeroizing<Vec<u8>>,
    pub(crate) public: Vec<u8>,
}

impl EcKey {
    /// The key's curve.
    #[must_use]
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Private scalar, big-endian, padded to [`Curve::scalar_len`] bytes.
    #[must_use]
    pub fn scalar_bytes(&self) -> &[u8] {
        &self.scalar
    }

    /// Public point in uncompressed SEC1 form (`0x04 || x || y`).
    #[must_use]
    pub fn public_point(&self) -> &[u8] {
        &self.public
    }
}

impl std::fmt::Debug for EcKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EcKey({}, ***)", self.curve.name())
    }
}

impl PartialEq for EcKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve
            && self.scalar.as_slice() == other.scalar.as_slice()
            && self.public == other.public
    }
}

impl Eq for EcKey {}

/// Draw a private scalar for `curve` from the reader and derive its
/// public point.
///
/// # Errors
///
/// Returns [`DeriveError::Io`] if the reader fails.
#[allow(clippy::arithmetic_side_effects)] // big-integer reduction, order > 1
pub fn generate_ec_key<R: Read>(rng: &mut R, curve: Curve) -> Result<EcKey, DeriveError> {
    let mut candidate = Zeroizing::new(vec![0u8; curve.candidate_len()]);
    rng.read_exact(candidate.as_mut_slice())?;

    let order_minus_1 = curve.order() - 1u32;
    let k = (BigUint::from_bytes_be(&candidate) % &order_minus_1) + 1u32;

    let raw = Zeroizing::new(k.to_bytes_be());
    let mut scalar = Zeroizing::new(vec![0u8; curve.scalar_len()]);
    let offset = curve.scalar_len() - raw.len();
    scalar[offset..].copy_from_slice(&raw);

    let public = public_point(curve, &scalar)?;

    Ok(EcKey {
        curve,
        scalar,
        public,
    })
}

/// Scalar-basepoint multiplication, returning the uncompressed point.
fn public_point(curve: Curve, scalar: &[u8]) -> Result<Vec<u8>, DeriveError> {
    let out_of_range = || io::Error::other("EC scalar out of range");
    let point = match curve {
        Curve::P256 => {
            let sk = p256::SecretKey::from_slice(scalar).map_err(|_| out_of_range())?;
            sk.public_key().to_encoded_point(false).as_bytes().to_vec()
        }
        Curve::P384 => {
            let sk = p384::SecretKey::from_slice(scalar).map_err(|_| out_of_range())?;
            sk.public_key().to_encoded_point(false).as_bytes().to_vec()
        }
        Curve::P521 => {
            let sk = p521::SecretKey::from_slice(scalar).map_err(|_| out_of_range())?;
            sk.public_key().to_encoded_point(false).as_bytes().to_vec()
        }
    };
    Ok(point)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
