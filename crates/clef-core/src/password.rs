//! Policy-driven password generation.
//!
//! This module provides:
//! - [`PasswordSpec`] — length and per-category minimum counts
//! - [`generate_password`] — draw candidates from a deterministic byte
//!   source until one satisfies the spec
//!
//! Candidates are built from a fixed 94-character alphabet; indexes into it
//! come from a rejection sampler, so every character is uniform over the
//! alphabet. The alphabet order is a compatibility contract — reordering it
//! silently changes every derived password.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::DeriveError;

/// Password alphabet: lowercase, uppercase, digits, then 32 specials.
const ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890`~!@#$%^&*()-_=+[{]}\\|;:'\",<.>/?";

/// Password policy: total length plus minimum counts per character class.
///
/// A minimum of zero is a prohibition, not a "don't care": a spec with
/// `digits: 0` only accepts passwords containing no digits at all.
/// `allowed_special` empty means any special from the alphabet counts;
/// non-empty restricts specials to exactly that set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordSpec {
    /// Total password length.
    pub length: usize,
    /// Minimum number of uppercase letters.
    pub upper: usize,
    /// Minimum number of lowercase letters.
    pub lower: usize,
    /// Minimum number of digits.
    pub digits: usize,
    /// Minimum number of special characters.
    pub special: usize,
    /// Permitted special characters; empty means "any special".
    #[serde(default)]
    pub allowed_special: String,
}

impl Default for PasswordSpec {
    /// The front-end default: 10 characters, 3 upper, 3 lower, 1 digit,
    /// 1 special, any special allowed.
    fn default() -> Self {
        Self {
            length: 10,
            upper: 3,
            lower: 3,
            digits: 1,
            special: 1,
            allowed_special: String::new(),
        }
    }
}

impl PasswordSpec {
    /// Check the spec's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`DeriveError::InvalidSpec`] if the length is zero, the
    /// minimum counts cannot fit in the length, or `allowed_special`
    /// contains anything other than ASCII punctuation.
    pub fn validate(&self) -> Result<(), DeriveError> {
        if self.length == 0 {
            return Err(DeriveError::InvalidSpec("length must be at least 1".into()));
        }

        for c in self.allowed_special.chars() {
            if !c.is_ascii_punctuation() {
                return Err(DeriveError::InvalidSpec(format!(
                    "allowed special set contains non-special character {c:?}"
                )));
            }
        }

        let minimum = self
            .upper
            .checked_add(self.lower)
            .and_then(|n| n.checked_add(self.digits))
            .and_then(|n| n.checked_add(self.special))
            .ok_or_else(|| DeriveError::InvalidSpec("minimum counts overflow".into()))?;
        if self.length < minimum {
            return Err(DeriveError::InvalidSpec(format!(
                "length {} is less than the sum of minimum counts {minimum}",
                self.length
            )));
        }

        Ok(())
    }

    /// Check a candidate against the spec.
    #[must_use]
    pub fn is_compliant(&self, candidate: &str) -> bool {
        let mut upper = 0usize;
        let mut lower = 0usize;
        let mut digits = 0usize;
        let mut special = 0usize;

        for c in candidate.chars() {
            if c.is_uppercase() {
                upper = upper.saturating_add(1);
            }
            if c.is_lowercase() {
                lower = lower.saturating_add(1);
            }
            if c.is_numeric() {
                digits = digits.saturating_add(1);
            }
            if c.is_ascii_punctuation() {
                if self.allowed_special.is_empty() {
                    special = special.saturating_add(1);
                } else if self.allowed_special.contains(c) {
                    special = special.saturating_add(1);
                } else {
                    // A special outside the allowed set disqualifies the
                    // candidate outright.
                    return false;
                }
            }
        }

        count_satisfies(upper, self.upper)
            && count_satisfies(lower, self.lower)
            && count_satisfies(digits, self.digits)
            && count_satisfies(special, self.special)
    }
}

/// A category count is acceptable iff it meets the minimum, and is zero
/// whenever the minimum is zero.
const fn count_satisfies(observed: usize, minimum: usize) -> bool {
    if observed > 0 && minimum == 0 {
        return false;
    }
    observed >= minimum
}

/// Uniform index in `[0, max)` by rejection sampling single bytes.
///
/// A draw of 255 is always rejected, as is the high residue band
/// `[255 - 255 % max, 255)`; surviving bytes divide evenly into `max`
/// buckets, so the result is exactly uniform.
// max is 94 here and never zero.
#[allow(clippy::arithmetic_side_effects)]
fn rand_range<R: Read>(rng: &mut R, max: u8) -> Result<u8, DeriveError> {
    debug_assert!(max > 0);
    let mut base = [0u8; 1];

    loop {
        rng.read_exact(&mut base)?;
        let b = base[0];
        if b == u8::MAX {
            continue;
        }

        let rem = u8::MAX % max;
        let buck = u8::MAX / max;
        if b < u8::MAX - rem {
            return Ok(b / buck);
        }
    }
}

/// Draw one candidate of `length` alphabet characters.
fn rand_string<R: Read>(rng: &mut R, length: usize) -> Result<String, DeriveError> {
    let mut out = String::with_capacity(length);
    for _ in 0..length {
        let pos = rand_range(rng, ALPHABET.len() as u8)?;
        out.push(char::from(ALPHABET[usize::from(pos)]));
    }
    Ok(out)
}

/// Generate a password satisfying `spec` from the byte source `rng`.
///
/// Draws whole candidates and retries until one complies. The loop is
/// deliberately uncapped: a retry bound would turn an unlucky-but-valid
/// stream into an error and is not part of the contract. For realistic
/// specs the expected number of draws is small.
///
/// # Errors
///
/// - [`DeriveError::InvalidSpec`] if the spec fails [`PasswordSpec::validate`].
/// - [`DeriveError::Io`] if the byte source fails.
pub fn generate_password<R: Read>(rng: &mut R, spec: &PasswordSpec) -> Result<String, DeriveError> {
    spec.validate()?;

    loop {
        let candidate = rand_string(rng, spec.length)?;
        if spec.is_compliant(&candidate) {
            return Ok(candidate);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drbg::Drbg;

    fn test_spec() -> PasswordSpec {
        PasswordSpec {
            length: 16,
            upper: 3,
            lower: 3,
            digits: 2,
            special: 1,
            allowed_special: String::new(),
        }
    }

    #[test]
    fn alphabet_is_94_unique_characters() {
        assert_eq!(ALPHABET.len(), 94);
        let mut seen = [false; 256];
        for &b in ALPHABET {
            assert!(!seen[usize::from(b)], "duplicate alphabet byte {b}");
            seen[usize::from(b)] = true;
        }
    }

    #[test]
    fn generated_password_is_deterministic() {
        let spec = test_spec();
        let a = generate_password(&mut Drbg::new("pass1", "example.com"), &spec)
            .expect("generation should succeed");
        let b = generate_password(&mut Drbg::new("pass1", "example.com"), &spec)
            .expect("generation should succeed");
        assert_eq!(a, b);
        assert_eq!(a.len(), spec.length);
    }

    #[test]
    fn generated_password_is_compliant() {
        let spec = test_spec();
        for realm in ["a.example", "b.example", "c.example", "d.example"] {
            let pw = generate_password(&mut Drbg::new("pass1", realm), &spec)
                .expect("generation should succeed");
            assert!(spec.is_compliant(&pw), "non-compliant password {pw:?}");
        }
    }

    #[test]
    fn allowed_special_restricts_output() {
        let spec = PasswordSpec {
            length: 12,
            upper: 1,
            lower: 1,
            digits: 1,
            special: 1,
            allowed_special: "@#".into(),
        };
        let pw = generate_password(&mut Drbg::new("pass1", "restricted"), &spec)
            .expect("generation should succeed");
        for c in pw.chars() {
            if c.is_ascii_punctuation() {
                assert!("@#".contains(c), "unexpected special {c:?} in {pw:?}");
            }
        }
    }

    #[test]
    fn zero_minimum_forbids_category() {
        let spec = PasswordSpec {
            length: 8,
            upper: 4,
            lower: 4,
            digits: 0,
            special: 0,
            allowed_special: String::new(),
        };
        let pw = generate_password(&mut Drbg::new("pass1", "letters-only"), &spec)
            .expect("generation should succeed");
        assert!(pw.chars().all(char::is_alphabetic), "unexpected {pw:?}");
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let too_long = PasswordSpec {
            length: 4,
            upper: 3,
            lower: 3,
            digits: 0,
            special: 0,
            allowed_special: String::new(),
        };
        assert!(matches!(
            generate_password(&mut Drbg::new("p", "r"), &too_long),
            Err(DeriveError::InvalidSpec(_))
        ));

        let zero_length = PasswordSpec {
            length: 0,
            upper: 0,
            lower: 0,
            digits: 0,
            special: 0,
            allowed_special: String::new(),
        };
        assert!(matches!(
            generate_password(&mut Drbg::new("p", "r"), &zero_length),
            Err(DeriveError::InvalidSpec(_))
        ));

        let bad_special = PasswordSpec {
            allowed_special: "ab".into(),
            ..PasswordSpec::default()
        };
        assert!(matches!(
            generate_password(&mut Drbg::new("p", "r"), &bad_special),
            Err(DeriveError::InvalidSpec(_))
        ));
    }

    #[test]
    fn compliance_is_a_biconditional_on_zero() {
        let no_digits = PasswordSpec {
            length: 4,
            upper: 1,
            lower: 1,
            digits: 0,
            special: 1,
            allowed_special: String::new(),
        };
        assert!(no_digits.is_compliant("aB!c"));
        assert!(!no_digits.is_compliant("aB!1"), "digit present despite zero minimum");
    }

    #[test]
    fn compliance_rejects_disallowed_special() {
        let spec = PasswordSpec {
            length: 4,
            upper: 0,
            lower: 3,
            digits: 0,
            special: 1,
            allowed_special: "@".into(),
        };
        assert!(spec.is_compliant("abc@"));
        assert!(!spec.is_compliant("abc!"));
    }

    #[test]
    fn rand_range_never_reaches_max() {
        let mut rng = Drbg::new("sampler", "bounds");
        for _ in 0..10_000 {
            let v = rand_range(&mut rng, 94).expect("sampling should succeed");
            assert!(v < 94);
        }
    }

    /// Chi-square goodness-of-fit over one million draws.
    ///
    /// The stream is deterministic, so this is a fixed computation; the
    /// bound corresponds to p ≈ 2e-5 at 93 degrees of freedom.
    #[test]
    fn rand_range_is_uniform() {
        const DRAWS: usize = 1_000_000;
        let mut rng = Drbg::new("sampler", "uniformity");
        let mut counts = [0u64; 94];
        for _ in 0..DRAWS {
            let v = rand_range(&mut rng, 94).expect("sampling should succeed");
            counts[usize::from(v)] = counts[usize::from(v)].saturating_add(1);
        }

        let expected = DRAWS as f64 / 94.0;
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        assert!(chi2 < 160.0, "chi-square statistic too large: {chi2}");
    }

    #[test]
    fn spec_serde_roundtrip() {
        let spec = test_spec();
        let json = serde_json::to_string(&spec).expect("serialize should succeed");
        let back: PasswordSpec = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(spec, back);
    }
}
