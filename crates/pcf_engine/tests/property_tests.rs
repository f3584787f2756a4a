use pcf_engine::{fold_pcf, folded_limit_transport, normalize_pcf, Pcf, PcfError};
use pcf_poly::{Polynomial, RationalFunction};
use proptest::prelude::*;

fn poly(coeffs: &[i64]) -> RationalFunction {
    RationalFunction::from_polynomial(Polynomial::from_integers(coeffs))
}

/// PCFs with positive coefficients, so no denominator vanishes.
fn arb_pcf() -> impl Strategy<Value = Pcf> {
    (1i64..=5, 1i64..=4, 0i64..=3, 1i64..=3).prop_map(|(a0, a1, b1, b2)| {
        Pcf::new(poly(&[a0, a1]), poly(&[0, b1, b2])).unwrap()
    })
}

/// Inflation factors that do not vanish at any n ≥ 0.
fn arb_factor() -> impl Strategy<Value = RationalFunction> {
    (1i64..=4, 0i64..=3).prop_map(|(k, m)| poly(&[k, m]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn inflation_preserves_limit(pcf in arb_pcf(), c in arb_factor(), depth in 5u64..25) {
        let inflated = pcf.inflate(&c).unwrap();
        let original = pcf.limit_exact(depth, None).unwrap().value;
        prop_assert_eq!(inflated.limit_exact(depth, None).unwrap().value, original);
    }

    #[test]
    fn deflation_is_idempotent(pcf in arb_pcf(), c in arb_factor(), d in arb_factor()) {
        let inflated = pcf.inflate(&c).unwrap().inflate(&d).unwrap();
        let once = inflated.deflate_all().unwrap();
        let twice = once.deflate_all().unwrap();
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn checkpoint_resumption_is_exact(pcf in arb_pcf(), first in 1u64..40, extra in 1u64..40) {
        let checkpoint = pcf.checkpoint(first, None).unwrap();
        let resumed = pcf.resume(&checkpoint, first + extra).unwrap();
        prop_assert_eq!(resumed.matrix, pcf.step(first + extra, None).unwrap());
    }

    #[test]
    fn normalizing_twice_changes_nothing(pcf in arb_pcf(), c in arb_factor()) {
        let once = normalize_pcf(&pcf.inflate(&c).unwrap()).unwrap();
        let twice = normalize_pcf(&once.pcf).unwrap();
        prop_assert_eq!(&twice.pcf, &once.pcf);
        prop_assert_eq!(twice.shift, 0);
        prop_assert!(twice.inflation.is_one());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn fold_transport_round_trip(pcf in arb_pcf()) {
        let limit = pcf.limit(120, None, None).unwrap();
        let folded = fold_pcf(&pcf, 2).unwrap();
        // a(n) = k(n + 1) makes the coboundary singular at n = 1
        let moved = match folded_limit_transport(&pcf, 2, &limit) {
            Err(PcfError::SingularTransform(_)) => return Ok(()),
            other => other.unwrap(),
        };
        let own = folded.limit(120, None, None).unwrap();
        prop_assert!(
            (moved.to_f64() - own.to_f64()).abs() <= 1e-9 * own.to_f64().abs().max(1.0),
            "transported {} vs folded {}", moved.to_f64(), own.to_f64()
        );
    }
}
