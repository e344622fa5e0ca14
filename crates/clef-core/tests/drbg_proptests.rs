#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the deterministic byte generator.

use std::io::Read;

use clef_core::Drbg;
use proptest::prelude::*;

fn read_n(drbg: &mut Drbg, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    drbg.read_exact(&mut buf).expect("drbg read should succeed");
    buf
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Reading a + b + c bytes in one call equals three successive reads.
    #[test]
    fn split_reads_concatenate(a in 0usize..300, b in 0usize..300, c in 0usize..300) {
        let total = a + b + c;
        let whole = read_n(&mut Drbg::new("prop", "split"), total);

        let mut split = Drbg::new("prop", "split");
        let mut parts = read_n(&mut split, a);
        parts.extend_from_slice(&read_n(&mut split, b));
        parts.extend_from_slice(&read_n(&mut split, c));

        prop_assert_eq!(whole, parts);
    }

    /// Any two distinct realms key distinct streams.
    #[test]
    fn realms_key_distinct_streams(
        realm_a in "[a-z0-9.]{1,16}",
        realm_b in "[a-z0-9.]{1,16}",
    ) {
        prop_assume!(realm_a != realm_b);
        let a = read_n(&mut Drbg::new("prop", &realm_a), 64);
        let b = read_n(&mut Drbg::new("prop", &realm_b), 64);
        prop_assert_ne!(a, b);
    }

    /// The stream is a pure function of (password, realm).
    #[test]
    fn streams_reproduce(password in ".{0,24}", realm in ".{0,24}") {
        let a = read_n(&mut Drbg::new(&password, &realm), 128);
        let b = read_n(&mut Drbg::new(&password, &realm), 128);
        prop_assert_eq!(a, b);
    }
}
