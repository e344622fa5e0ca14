#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for password generation: every generated password
//! satisfies the spec that produced it.

use clef_core::{get_pass, PasswordSpec};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Feasible specs (every category required at least once) always
    /// produce compliant passwords of the right length.
    #[test]
    fn generated_passwords_comply(
        length in 8usize..=16,
        upper in 1usize..=2,
        lower in 1usize..=2,
        digits in 1usize..=2,
        special in 1usize..=2,
        realm in "[a-z]{1,8}",
    ) {
        prop_assume!(upper + lower + digits + special <= length);
        let spec = PasswordSpec {
            length,
            upper,
            lower,
            digits,
            special,
            allowed_special: String::new(),
        };

        let password = get_pass("prop-master", &realm, None, &spec)
            .expect("get_pass should succeed");
        prop_assert_eq!(password.chars().count(), length);
        prop_assert!(spec.is_compliant(&password), "non-compliant: {:?}", password);
    }

    /// A restricted special set is honored end to end.
    #[test]
    fn restricted_specials_are_honored(realm in "[a-z]{1,8}") {
        let spec = PasswordSpec {
            length: 12,
            upper: 1,
            lower: 1,
            digits: 1,
            special: 1,
            allowed_special: "!@".into(),
        };

        let password = get_pass("prop-master", &realm, None, &spec)
            .expect("get_pass should succeed");
        for c in password.chars() {
            if c.is_ascii_punctuation() {
                prop_assert!("!@".contains(c), "unexpected special {:?}", c);
            }
        }
    }
}
