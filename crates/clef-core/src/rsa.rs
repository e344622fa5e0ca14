//! Deterministic RSA key generation.
//!
//! This is a frozen copy of a historical prime-search and multi-prime RSA
//! construction. Mainstream generators keep changing how many bytes they
//! pull from their randomness source, which silently changes the keys a
//! deterministic stream produces; this module pins the byte-consumption
//! pattern forever. Do not "modernize" it against a current library
//! implementation — equivalent output distributions are not equivalent
//! byte consumption.
//!
//! Every branch below depends only on bytes drawn, in order, from the
//! caller's reader.

#![allow(clippy::arithmetic_side_effects)]

use std::fmt;
use std::io::Read;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive};

use crate::error::DeriveError;

/// Fixed public exponent.
pub const RSA_EXPONENT: u32 = 65537;

/// Small primes used to rapidly reject composite candidates. Truncated at
/// the point where their product still fits a u64; 2 is excluded because
/// candidates are odd by construction.
const SMALL_PRIMES: [u8; 15] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Product of [`SMALL_PRIMES`]. Reducing a candidate by this single value
/// lets the sieve test divisibility with u64 arithmetic only.
const SMALL_PRIMES_PRODUCT: u64 = 16_294_579_238_595_022_365;

/// Miller-Rabin rounds for the final primality decision.
const MILLER_RABIN_ROUNDS: usize = 20;

/// RSA private key with CRT precomputation.
///
/// Produced only by [`generate_rsa_key`]; the fields are byte-exact
/// functions of the reader that generated them.
pub struct RsaPrivateKey {
    pub(crate) n: BigUint,
    pub(crate) e: BigUint,
    pub(crate) d: BigUint,
    pub(crate) primes: Vec<BigUint>,
    pub(crate) dp: BigUint,
    pub(crate) dq: BigUint,
    pub(crate) qinv: BigUint,
}

impl RsaPrivateKey {
    /// Modulus bit length.
    #[must_use]
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// Public modulus.
    #[must_use]
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Prime factors of the modulus.
    #[must_use]
    pub fn primes(&self) -> &[BigUint] {
        &self.primes
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RsaPrivateKey(***)")
    }
}

impl PartialEq for RsaPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.e == other.e && self.d == other.d && self.primes == other.primes
    }
}

impl Eq for RsaPrivateKey {}

/// Generate a two-prime RSA key of exactly `bits` modulus bits.
///
/// # Errors
///
/// Returns [`DeriveError::Io`] if the reader fails, or
/// [`DeriveError::InvalidKeyType`] for degenerate sizes.
pub fn generate_rsa_key<R: Read>(rng: &mut R, bits: usize) -> Result<RsaPrivateKey, DeriveError> {
    generate_multi_prime_key(rng, 2, bits)
}

fn generate_multi_prime_key<R: Read>(
    rng: &mut R,
    nprimes: usize,
    bits: usize,
) -> Result<RsaPrivateKey, DeriveError> {
    if nprimes < 2 {
        return Err(DeriveError::InvalidKeyType(
            "RSA key needs at least two primes".into(),
        ));
    }

    if bits < 64 {
        let prime_limit = (1u64 << (bits / nprimes)) as f64;
        // pi approximates the number of primes below prime_limit. Generated
        // primes start with 11 in binary, so only a quarter are reachable;
        // halve again so the search terminates in reasonable time.
        let mut pi = prime_limit / (prime_limit.ln() - 1.0);
        pi /= 4.0;
        pi /= 2.0;
        if pi <= nprimes as f64 {
            return Err(DeriveError::InvalidKeyType(
                "too few primes of the given length to generate an RSA key".into(),
            ));
        }
    }

    let e = BigUint::from(RSA_EXPONENT);

    loop {
        let mut todo = bits;
        // Each prime is of the form 2^bitlen × 0.11..; for seven or more
        // primes the product loses enough leading weight that the target
        // must be widened to compensate.
        if nprimes >= 7 {
            todo += (nprimes - 2) / 5;
        }

        let mut primes: Vec<BigUint> = Vec::with_capacity(nprimes);
        for i in 0..nprimes {
            let p = prime(rng, todo / (nprimes - i))?;
            todo = todo.saturating_sub(p.bits() as usize);
            primes.push(p);
        }

        if !pairwise_distinct(&primes) {
            continue;
        }

        let mut n = BigUint::one();
        let mut totient = BigUint::one();
        for p in &primes {
            n *= p;
            totient *= p - 1u32;
        }
        if n.bits() as usize != bits {
            // The top two bits of each prime are set, so this should not
            // happen for two primes; for more primes it occasionally does.
            continue;
        }

        let Some(d) = mod_inverse(&e, &totient) else {
            continue;
        };

        let dp = &d % (&primes[0] - 1u32);
        let dq = &d % (&primes[1] - 1u32);
        let Some(qinv) = mod_inverse(&primes[1], &primes[0]) else {
            continue;
        };

        return Ok(RsaPrivateKey {
            n,
            e,
            d,
            primes,
            dp,
            dq,
            qinv,
        });
    }
}

fn pairwise_distinct(primes: &[BigUint]) -> bool {
    for (i, p) in primes.iter().enumerate() {
        for q in &primes[..i] {
            if p == q {
                return false;
            }
        }
    }
    true
}

/// Search the reader's byte stream for a prime of exactly `bits` bits.
///
/// Candidate construction: fill `ceil(bits/8)` bytes, mask the top byte
/// down to `bits`, set the top two bits (so products of two candidates
/// never come up a bit short), and force the value odd. The candidate is
/// then nudged upward by the smallest even `delta < 2^20` that clears the
/// small-prime sieve before the full Miller-Rabin check runs.
pub(crate) fn prime<R: Read>(rng: &mut R, bits: usize) -> Result<BigUint, DeriveError> {
    if bits < 2 {
        return Err(DeriveError::InvalidKeyType(
            "prime size must be at least 2 bits".into(),
        ));
    }

    let mut b = bits % 8;
    if b == 0 {
        b = 8;
    }
    let len = (bits + 7) / 8;
    let mut bytes = vec![0u8; len];

    loop {
        rng.read_exact(&mut bytes)?;

        // Clear excess leading bits so the candidate fits in `bits`.
        bytes[0] &= ((1u16 << b) - 1) as u8;
        if b >= 2 {
            bytes[0] |= 3u8 << (b - 2);
        } else {
            // b == 1: the top two bits straddle a byte boundary.
            bytes[0] |= 1;
            if len > 1 {
                bytes[1] |= 0x80;
            }
        }
        bytes[len - 1] |= 1;

        let mut p = BigUint::from_bytes_be(&bytes);

        // One big reduction, then the sieve runs in u64 space. The sum
        // below cannot overflow: the remainder is under the product and
        // delta stays under 2^20.
        let m = (&p % SMALL_PRIMES_PRODUCT).to_u64().unwrap_or(0);

        'delta: for delta in (0..1u64 << 20).step_by(2) {
            let candidate = m + delta;
            for &sp in &SMALL_PRIMES {
                let sp = u64::from(sp);
                if candidate % sp == 0 && (bits > 6 || candidate != sp) {
                    continue 'delta;
                }
            }
            if delta > 0 {
                p += delta;
            }
            break;
        }

        // Adding delta may have pushed the value one bit too long.
        if p.bits() as usize == bits && is_probably_prime(&p, MILLER_RABIN_ROUNDS) {
            return Ok(p);
        }
    }
}

/// Miller-Rabin primality test with fixed small-prime witnesses.
///
/// The verdict never feeds back into byte consumption, so the witness
/// schedule is free to differ from any particular library as long as it
/// classifies candidates correctly.
pub(crate) fn is_probably_prime(n: &BigUint, rounds: usize) -> bool {
    const WITNESSES: [u32; 20] = [
        2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
    ];

    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }
    if *n == two {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n - 1 as 2^r * d with d odd.
    let n_minus_1 = n - 1u32;
    let mut d = n_minus_1.clone();
    let mut r = 0usize;
    while d.is_even() {
        d >>= 1;
        r += 1;
    }

    for &w in WITNESSES.iter().take(rounds) {
        let a = BigUint::from(w);
        if a >= n_minus_1 {
            continue;
        }

        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }

        let mut composite = true;
        for _ in 1..r {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                composite = false;
                break;
            }
        }
        if composite {
            return false;
        }
    }

    true
}

/// Modular inverse of `a` modulo `m`, if it exists.
fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = BigInt::from(a.clone());
    let m = BigInt::from(m.clone());
    let gcd = a.extended_gcd(&m);
    if !gcd.gcd.is_one() {
        return None;
    }
    gcd.x.mod_floor(&m).to_biguint()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drbg::Drbg;

    #[test]
    fn miller_rabin_classifies_known_values() {
        assert!(is_probably_prime(&BigUint::from(2u32), 20));
        assert!(is_probably_prime(&BigUint::from(3u32), 20));
        assert!(is_probably_prime(&BigUint::from(65_537u32), 20));
        // Mersenne prime 2^61 - 1.
        assert!(is_probably_prime(&BigUint::from((1u64 << 61) - 1), 20));

        assert!(!is_probably_prime(&BigUint::from(1u32), 20));
        assert!(!is_probably_prime(&BigUint::from(15u32), 20));
        // Carmichael number — fools Fermat, not Miller-Rabin.
        assert!(!is_probably_prime(&BigUint::from(561u32), 20));
        assert!(!is_probably_prime(&BigUint::from((1u64 << 61) + 1), 20));
    }

    #[test]
    fn mod_inverse_known_values() {
        let inv = mod_inverse(&BigUint::from(3u32), &BigUint::from(11u32))
            .expect("inverse should exist");
        assert_eq!(inv, BigUint::from(4u32));
        assert!(mod_inverse(&BigUint::from(4u32), &BigUint::from(8u32)).is_none());
    }

    #[test]
    fn prime_is_deterministic_with_exact_bit_length() {
        let a = prime(&mut Drbg::new("p", "prime64"), 64).expect("prime should succeed");
        let b = prime(&mut Drbg::new("p", "prime64"), 64).expect("prime should succeed");
        assert_eq!(a, b);
        assert_eq!(a.bits(), 64);
        assert!(is_probably_prime(&a, 20));
    }

    #[test]
    fn prime_handles_byte_boundary_sizes() {
        // bits % 8 == 1 exercises the straddled top-two-bits branch.
        let p9 = prime(&mut Drbg::new("p", "prime9"), 9).expect("prime should succeed");
        assert_eq!(p9.bits(), 9);
        assert!(is_probably_prime(&p9, 20));

        // bits % 8 == 0 treats the whole top byte as significant.
        let p16 = prime(&mut Drbg::new("p", "prime16"), 16).expect("prime should succeed");
        assert_eq!(p16.bits(), 16);
        assert!(is_probably_prime(&p16, 20));
    }

    #[test]
    fn tiny_prime_sizes_allow_the_small_primes_themselves() {
        let p = prime(&mut Drbg::new("p", "prime5"), 5).expect("prime should succeed");
        assert_eq!(p.bits(), 5);
        assert!(is_probably_prime(&p, 20));
    }

    #[test]
    fn prime_rejects_sub_two_bit_requests() {
        let result = prime(&mut Drbg::new("p", "r"), 1);
        assert!(matches!(result, Err(DeriveError::InvalidKeyType(_))));
    }

    #[test]
    fn small_key_is_deterministic_and_consistent() {
        let a = generate_rsa_key(&mut Drbg::new("pass1", "rsa128"), 128)
            .expect("generation should succeed");
        let b = generate_rsa_key(&mut Drbg::new("pass1", "rsa128"), 128)
            .expect("generation should succeed");
        assert_eq!(a, b);
        assert_eq!(a.bits(), 128);
        assert_eq!(a.primes.len(), 2);
        assert_eq!(&a.primes[0] * &a.primes[1], a.n);

        // d inverts e modulo the totient: m^(e*d) == m (mod n).
        let m = BigUint::from(0x1234_5678u32);
        let c = m.modpow(&a.e, &a.n);
        assert_eq!(c.modpow(&a.d, &a.n), m);

        // CRT parameters are consistent with p and q.
        assert_eq!(a.dp, &a.d % (&a.primes[0] - 1u32));
        assert_eq!(a.dq, &a.d % (&a.primes[1] - 1u32));
        assert_eq!((&a.qinv * &a.primes[1]) % &a.primes[0], BigUint::one());
    }

    #[test]
    fn distinct_streams_give_distinct_keys() {
        let a = generate_rsa_key(&mut Drbg::new("pass1", "rsa128"), 128)
            .expect("generation should succeed");
        let b = generate_rsa_key(&mut Drbg::new("pass2", "rsa128"), 128)
            .expect("generation should succeed");
        assert_ne!(a, b);
    }

    #[test]
    fn multi_prime_construction_holds_together() {
        let key = generate_multi_prime_key(&mut Drbg::new("pass1", "rsa3x"), 3, 192)
            .expect("generation should succeed");
        assert_eq!(key.bits(), 192);
        assert_eq!(key.primes.len(), 3);

        let m = BigUint::from(0xCAFEu32);
        let c = m.modpow(&key.e, &key.n);
        assert_eq!(c.modpow(&key.d, &key.n), m);
    }

    #[test]
    fn seven_prime_target_widening_applies() {
        let key = generate_multi_prime_key(&mut Drbg::new("pass1", "rsa7x"), 7, 448)
            .expect("generation should succeed");
        assert_eq!(key.bits(), 448);
        assert_eq!(key.primes.len(), 7);
    }

    #[test]
    fn infeasible_tiny_request_is_rejected() {
        let result = generate_multi_prime_key(&mut Drbg::new("p", "r"), 2, 8);
        assert!(matches!(result, Err(DeriveError::InvalidKeyType(_))));
    }
}
