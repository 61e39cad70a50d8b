//! E2E suite: Boolean operators on the compressed form.
//!
//! AND / OR / XOR / AND-NOT over bitmaps of unequal lengths, variadic folds,
//! swap, and the popcount-sink cardinality variants.

use ewah::Ewah;

mod oracle;
use oracle::DenseBitmap;

fn bitmap(bits: &[u64]) -> Ewah {
    let mut bm = Ewah::new();
    for &b in bits {
        bm.set(b).unwrap();
    }
    bm
}

// ─────────────────────────────────────────────────────────────────────────────
// The four operators over unequal-length operands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn and_or_over_short_and_long() {
    let a = bitmap(&[10, 70, 100]);
    let b = bitmap(&[100, 15_000]);

    let and = a.and(&b);
    assert_eq!(and.cardinality(), 1);
    assert!(and.get(100));
    assert!(!and.get(10) && !and.get(70) && !and.get(15_000));

    let or = a.or(&b);
    assert_eq!(or.cardinality(), 4);
    for bit in [10, 70, 100, 15_000] {
        assert!(or.get(bit), "bit {bit}");
    }
    assert_eq!(or.size_in_bits(), 15_001);

    // Both directions agree: the operators are symmetric.
    assert!(b.and(&a).equal(&and));
    assert!(b.or(&a).equal(&or));
}

#[test]
fn and_not_and_xor_over_short_and_long() {
    let a = bitmap(&[10, 70, 100]);
    let b = bitmap(&[100, 15_000]);

    let diff = a.and_not(&b);
    assert_eq!(diff.cardinality(), 2);
    assert!(diff.get(10) && diff.get(70));
    assert!(!diff.get(100) && !diff.get(15_000));

    let xor = a.xor(&b);
    assert_eq!(xor.cardinality(), 3);
    assert!(xor.get(10) && xor.get(70) && xor.get(15_000));
    assert!(!xor.get(100));
    assert!(b.xor(&a).equal(&xor));
}

#[test]
fn overlapping_mid_range_bitmaps() {
    let d = bitmap(&[10, 70, 100, 150, 15_000]);
    let e = bitmap(&[11, 13, 100, 15_000]);

    let diff = d.and_not(&e);
    assert_eq!(diff.cardinality(), 3);
    assert!(diff.get(10) && diff.get(70) && diff.get(150));

    let or = d.or(&e);
    assert_eq!(or.cardinality(), 7);

    let xor = d.xor(&e);
    assert_eq!(xor.cardinality(), 5);
    for bit in [10, 70, 150, 11, 13] {
        assert!(xor.get(bit), "bit {bit}");
    }
    assert!(!xor.get(100) && !xor.get(15_000));
}

#[test]
fn operators_with_an_empty_operand() {
    let a = bitmap(&[5, 500]);
    let empty = Ewah::new();

    assert_eq!(a.and(&empty).cardinality(), 0);
    assert_eq!(a.and(&empty).size_in_bits(), a.size_in_bits());
    assert_eq!(empty.and(&a).cardinality(), 0);

    assert!(a.or(&empty).equal(&empty.or(&a)));
    assert_eq!(a.or(&empty).cardinality(), 2);

    assert_eq!(a.and_not(&empty).cardinality(), 2);
    assert_eq!(empty.and_not(&a).cardinality(), 0);

    assert_eq!(a.xor(&empty).cardinality(), 2);
}

#[test]
fn results_agree_with_the_dense_oracle() {
    let bits_a: Vec<u64> = (0..200).map(|k| k * 13).collect();
    let bits_b: Vec<u64> = (0..150).map(|k| k * 17 + 5).collect();
    let a = bitmap(&bits_a);
    let b = bitmap(&bits_b);
    let mut da = DenseBitmap::new();
    let mut db = DenseBitmap::new();
    for &x in &bits_a {
        da.set(x);
    }
    for &x in &bits_b {
        db.set(x);
    }

    let pairs: [(Ewah, DenseBitmap); 4] = [
        (a.and(&b), da.and(&db)),
        (a.or(&b), da.or(&db)),
        (a.xor(&b), da.xor(&db)),
        (a.and_not(&b), da.and_not(&db)),
    ];
    for (got, want) in &pairs {
        assert_eq!(got.size_in_bits(), want.size_in_bits());
        assert_eq!(got.cardinality(), want.cardinality());
        for i in 0..want.size_in_bits() {
            assert_eq!(got.get(i), want.get(i), "bit {i}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Variadic folds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn folds_over_three_operands() {
    let a = bitmap(&[1, 2, 3, 900]);
    let b = bitmap(&[2, 3, 900, 5_000]);
    let c = bitmap(&[3, 900, 5_000, 70_000]);

    let and = a.and_many(&[&b, &c]);
    assert_eq!(and.cardinality(), 2);
    assert!(and.get(3) && and.get(900));

    let or = a.or_many(&[&b, &c]);
    assert_eq!(or.cardinality(), 6);

    let xor = a.xor_many(&[&b, &c]);
    assert!(xor.equal(&a.xor(&b).xor(&c)));

    let diff = a.and_not_many(&[&b, &c]);
    assert_eq!(diff.cardinality(), 1);
    assert!(diff.get(1));
}

// ─────────────────────────────────────────────────────────────────────────────
// Swap
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn swap_exchanges_whole_bitmaps() {
    let mut d = bitmap(&[11, 13, 100, 15_000]);
    let mut e = bitmap(&[10, 70, 100, 150, 15_000]);

    d.swap(&mut e);

    assert_eq!(d.cardinality(), 5);
    assert_eq!(e.cardinality(), 4);
    assert!(d.get(10));
    assert!(e.get(11));
    assert!(!d.get(11));
    assert!(!e.get(10));

    // Both remain fully functional after the swap.
    d.set(20_000).unwrap();
    e.set(20_001).unwrap();
    assert_eq!(d.cardinality(), 6);
    assert_eq!(e.cardinality(), 5);
}

// ─────────────────────────────────────────────────────────────────────────────
// Counter-sink cardinality variants
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn cardinality_variants_match_materialized_operators() {
    let a = bitmap(&(0..300).map(|k| k * 31).collect::<Vec<_>>());
    let b = bitmap(&(0..240).map(|k| k * 41 + 7).collect::<Vec<_>>());

    assert_eq!(a.and_cardinality(&b), a.and(&b).cardinality());
    assert_eq!(a.or_cardinality(&b), a.or(&b).cardinality());
    assert_eq!(a.xor_cardinality(&b), a.xor(&b).cardinality());
    assert_eq!(a.and_not_cardinality(&b), a.and_not(&b).cardinality());

    // Inclusion–exclusion over the counter variants alone.
    assert_eq!(
        a.and_cardinality(&b) + a.or_cardinality(&b),
        a.cardinality() + b.cardinality()
    );
}
