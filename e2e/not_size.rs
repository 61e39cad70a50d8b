//! E2E suite: complement, size adjustment, and the wire layout.

use ewah::{Ewah, EwahError};

fn bitmap(bits: &[u64]) -> Ewah {
    let mut bm = Ewah::new();
    for &b in bits {
        bm.set(b).unwrap();
    }
    bm
}

// ─────────────────────────────────────────────────────────────────────────────
// NOT
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn not_accounts_for_every_bit() {
    let mut c = bitmap(&[10, 100, 10_000]);
    let size = c.size_in_bits();
    let before = c.cardinality();

    c.not();
    let after = c.cardinality();

    assert_eq!(before + after, size);
    assert!(!c.get(10));
    assert!(!c.get(100));
    assert!(!c.get(10_000));
    assert!(c.get(0) && c.get(9) && c.get(11));
    assert_eq!(c.size_in_bits(), size);
}

#[test]
fn not_is_an_involution() {
    let mut c = bitmap(&[0, 1, 63, 64, 1_000, 4_095]);
    let original = c.clone();
    c.not().not();
    assert!(c.equal(&original));
}

#[test]
fn not_of_the_empty_bitmap_stays_empty() {
    let mut bm = Ewah::new();
    bm.not();
    assert_eq!(bm.cardinality(), 0);
    assert_eq!(bm.size_in_bits(), 0);
    assert!(!bm.get(0));
}

#[test]
fn not_keeps_bits_past_the_size_clear() {
    // 100 ones; the complement holds zero bits, and complementing again
    // restores all 100 without leaking into bits 100..128.
    let mut bm = Ewah::new();
    bm.set_size_in_bits_with_default(100, true).unwrap();
    bm.not();
    assert_eq!(bm.cardinality(), 0);
    bm.not();
    assert_eq!(bm.cardinality(), 100);
    assert!(!bm.get(100) && !bm.get(127));
}

#[test]
fn not_then_and_is_a_difference() {
    let a = bitmap(&[1, 2, 3, 4, 5]);
    let mut b = bitmap(&[2, 4]);
    b.set_size_in_bits_with_default(a.size_in_bits(), false).unwrap();
    b.not();
    let diff = a.and(&b);
    assert_eq!(diff.cardinality(), 3);
    assert!(diff.get(1) && diff.get(3) && diff.get(5));
    assert!(diff.equal(&a.and_not(&bitmap(&[2, 4]))));
}

// ─────────────────────────────────────────────────────────────────────────────
// Size adjustment
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn sub_word_trim_and_the_boundary_rule() {
    let mut bm = bitmap(&[100]);
    assert_eq!(bm.size_in_bits(), 101);
    bm.set_size_in_bits(128).unwrap();
    assert_eq!(bm.size_in_bits(), 128);
    bm.set_size_in_bits(65).unwrap();
    assert_eq!(bm.size_in_bits(), 65);
    assert!(!bm.get(100));

    assert_eq!(bm.set_size_in_bits(64), Err(EwahError::ShrinkRejected));
    assert_eq!(bm.set_size_in_bits(129), Err(EwahError::ShrinkRejected));
    assert_eq!(bm.size_in_bits(), 65);
}

#[test]
fn extend_with_false_bits() {
    let mut bm = bitmap(&[3]);
    bm.set_size_in_bits_with_default(10_000, false).unwrap();
    assert_eq!(bm.size_in_bits(), 10_000);
    assert_eq!(bm.cardinality(), 1);
    assert!(!bm.get(9_999));
    // The extension is materialized, not just declared: the padded words
    // survive a wire round trip and further appends.
    let back = Ewah::from_bytes(&bm.to_bytes()).unwrap();
    assert!(back.equal(&bm));
    bm.set(10_000).unwrap();
    assert!(bm.get(10_000));
}

#[test]
fn extend_with_true_bits() {
    let mut bm = bitmap(&[3]);
    bm.set_size_in_bits_with_default(300, true).unwrap();
    assert_eq!(bm.size_in_bits(), 300);
    assert_eq!(bm.cardinality(), 1 + (300 - 4));
    assert!(bm.get(3));
    assert!(!bm.get(2));
    for i in 4..300 {
        assert!(bm.get(i), "bit {i}");
    }
    assert!(!bm.get(300));
}

#[test]
fn extend_to_a_mid_word_target_with_true_bits() {
    let mut bm = Ewah::new();
    bm.set(10).unwrap();
    // Target inside the same word as the current size.
    bm.set_size_in_bits_with_default(40, true).unwrap();
    assert_eq!(bm.size_in_bits(), 40);
    assert_eq!(bm.cardinality(), 1 + (40 - 11));
    assert!(bm.get(11) && bm.get(39));
    assert!(!bm.get(40));
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire layout
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn wire_round_trip_preserves_everything() {
    let mut bm = bitmap(&[0, 70, 543, 8_000]);
    bm.set_size_in_bits(8_020).unwrap();

    let bytes = bm.to_bytes();
    assert_eq!(bytes.len(), 16 + bm.size_in_words() * 8);

    let back = Ewah::from_bytes(&bytes).unwrap();
    assert!(back.equal(&bm));
    assert_eq!(back.size_in_bits(), 8_020);
    assert_eq!(back.cardinality(), 4);
    for i in 0..back.size_in_bits() {
        assert_eq!(back.get(i), bm.get(i), "bit {i}");
    }
}

#[test]
fn wire_round_trip_of_operator_output() {
    let a = bitmap(&[1, 65, 129, 10_000]);
    let b = bitmap(&[65, 10_000, 20_000]);
    let or = a.or(&b);
    let back = Ewah::from_bytes(&or.to_bytes()).unwrap();
    assert!(back.equal(&or));
    assert_eq!(back.or_cardinality(&a), or.cardinality());
}

#[test]
fn malformed_wire_input_is_rejected() {
    assert_eq!(Ewah::from_bytes(b"short"), Err(EwahError::CorruptBuffer));

    let good = bitmap(&[9]).to_bytes();
    let truncated = &good[..good.len() - 1];
    assert_eq!(Ewah::from_bytes(truncated), Err(EwahError::CorruptBuffer));

    let mut oversized_claim = good.clone();
    oversized_claim[8..16].copy_from_slice(&u64::MAX.to_ne_bytes());
    assert_eq!(
        Ewah::from_bytes(&oversized_claim),
        Err(EwahError::CorruptBuffer)
    );
}
