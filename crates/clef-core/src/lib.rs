//! `clef-core` — deterministic derivation engine for the clef vaultless
//! password and key manager.
//!
//! The same master password, realm and optional seed always produce the
//! same output — a policy-compliant password, a raw byte stream, or a
//! private key — so nothing secret ever needs to be stored. The only
//! artifact worth persisting is the encrypted seed blob, and losing it
//! only costs the strong-derivation domain.
//!
//! This crate is the audit target: zero network, zero async, zero
//! interactive dependencies. Reproducibility is the load-bearing
//! property; every generator consumes generator bytes in a frozen order.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;

mod kdf;

pub mod drbg;
pub mod seed;

pub mod password;

pub mod ec;
pub mod keygen;
pub mod rsa;

pub mod pem;

pub mod derive;

pub use derive::{get_key, get_pass, get_raw};
pub use drbg::Drbg;
pub use ec::{Curve, EcKey};
pub use error::DeriveError;
pub use keygen::{generate_key, Ed25519Key, KeyType, PrivateKey, X25519Key};
pub use password::{generate_password, PasswordSpec};
pub use pem::{encode_pem, pem_string};
pub use rsa::{generate_rsa_key, RsaPrivateKey};
pub use seed::{generate_encrypted_seed, unwrap_seed, SEED_LEN};
