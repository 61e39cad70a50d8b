//! Property suite: algebraic laws checked against randomized bitmaps and a
//! dense oracle.

use ewah::Ewah;
use proptest::prelude::*;

mod oracle;
use oracle::DenseBitmap;

/// Strictly ascending bit positions from a vector of positive strides.
fn positions(strides: &[u64]) -> Vec<u64> {
    let mut cur = 0u64;
    strides
        .iter()
        .map(|&s| {
            cur += s;
            cur - 1
        })
        .collect()
}

fn build(bits: &[u64]) -> (Ewah, DenseBitmap) {
    let mut bm = Ewah::new();
    let mut dense = DenseBitmap::new();
    for &b in bits {
        bm.set(b).unwrap();
        dense.set(b);
    }
    (bm, dense)
}

fn strides() -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(1u64..1_500, 0..120)
}

proptest! {
    #[test]
    fn set_bits_read_back_and_neighbors_do_not(s in strides()) {
        let bits = positions(&s);
        let (bm, dense) = build(&bits);

        prop_assert_eq!(bm.cardinality(), bits.len() as u64);
        for &b in &bits {
            prop_assert!(bm.get(b));
            prop_assert_eq!(bm.get(b + 1), dense.get(b + 1));
            if b > 0 {
                prop_assert_eq!(bm.get(b - 1), dense.get(b - 1));
            }
        }
        prop_assert_eq!(bm.size_in_bits(), dense.size_in_bits());
    }

    #[test]
    fn inclusion_exclusion(sa in strides(), sb in strides()) {
        let (a, _) = build(&positions(&sa));
        let (b, _) = build(&positions(&sb));
        prop_assert_eq!(
            a.and(&b).cardinality() + a.or(&b).cardinality(),
            a.cardinality() + b.cardinality()
        );
    }

    #[test]
    fn xor_is_or_minus_and(sa in strides(), sb in strides()) {
        let (a, _) = build(&positions(&sa));
        let (b, _) = build(&positions(&sb));
        let composed = a.or(&b).and_not(&a.and(&b));
        prop_assert!(a.xor(&b).equal(&composed));
    }

    #[test]
    fn operators_agree_with_the_dense_oracle(sa in strides(), sb in strides()) {
        let (a, da) = build(&positions(&sa));
        let (b, db) = build(&positions(&sb));

        let checks: [(Ewah, DenseBitmap); 4] = [
            (a.and(&b), da.and(&db)),
            (a.or(&b), da.or(&db)),
            (a.xor(&b), da.xor(&db)),
            (a.and_not(&b), da.and_not(&db)),
        ];
        for (got, want) in &checks {
            prop_assert_eq!(got.cardinality(), want.cardinality());
            prop_assert_eq!(got.size_in_bits(), want.size_in_bits());
            // Probe every word boundary region rather than every bit.
            let mut i = 0u64;
            while i < want.size_in_bits() {
                prop_assert_eq!(got.get(i), want.get(i), "bit {}", i);
                prop_assert_eq!(got.get(i + 63), want.get(i + 63), "bit {}", i + 63);
                i += 64;
            }
        }
    }

    #[test]
    fn double_not_restores_the_bitmap(s in strides()) {
        let bits = positions(&s);
        let (mut bm, _) = build(&bits);
        let original = bm.clone();
        bm.not().not();
        prop_assert!(bm.equal(&original));
    }

    #[test]
    fn not_complement_counts(s in strides()) {
        let bits = positions(&s);
        let (mut bm, mut dense) = build(&bits);
        let size = bm.size_in_bits();
        let before = bm.cardinality();
        bm.not();
        dense.not();
        prop_assert_eq!(before + bm.cardinality(), size);
        prop_assert_eq!(bm.cardinality(), dense.cardinality());
        for &b in &bits {
            prop_assert!(!bm.get(b));
        }
    }

    #[test]
    fn reencoding_reads_is_identity(s in strides()) {
        let bits = positions(&s);
        let (bm, _) = build(&bits);
        let mut rebuilt = Ewah::new();
        for i in 0..bm.size_in_bits() {
            if bm.get(i) {
                rebuilt.set(i).unwrap();
            }
        }
        prop_assert!(rebuilt.equal(&bm));
    }

    #[test]
    fn counter_sinks_match_materialized(sa in strides(), sb in strides()) {
        let (a, _) = build(&positions(&sa));
        let (b, _) = build(&positions(&sb));
        prop_assert_eq!(a.and_cardinality(&b), a.and(&b).cardinality());
        prop_assert_eq!(a.or_cardinality(&b), a.or(&b).cardinality());
        prop_assert_eq!(a.xor_cardinality(&b), a.xor(&b).cardinality());
        prop_assert_eq!(a.and_not_cardinality(&b), a.and_not(&b).cardinality());
    }

    #[test]
    fn wire_round_trip(s in strides()) {
        let bits = positions(&s);
        let (bm, _) = build(&bits);
        let back = Ewah::from_bytes(&bm.to_bytes()).unwrap();
        prop_assert!(back.equal(&bm));
    }

    #[test]
    fn clone_then_diverge(s in strides()) {
        let bits = positions(&s);
        let (bm, _) = build(&bits);
        let mut copy = bm.clone();
        prop_assert!(copy.equal(&bm));
        copy.set(copy.size_in_bits() + 64).unwrap();
        prop_assert!(!copy.equal(&bm));
        prop_assert_eq!(bm.cardinality(), bits.len() as u64);
    }
}
