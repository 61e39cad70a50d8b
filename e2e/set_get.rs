//! E2E suite: construction and read path.
//!
//! Covers monotonic `set`, word-aligned `get` with the cursor finger,
//! cardinality, lifecycle (reset / clone / copy / equality), and the
//! error contract for out-of-order or out-of-range sets.

use ewah::{Ewah, EwahError, SET_INDEX_MAX};

// ─────────────────────────────────────────────────────────────────────────────
// Basic set / get across word boundaries
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn set_three_bits_read_back() {
    let mut bm = Ewah::new();
    bm.reset();
    bm.set(10).unwrap().set(70).unwrap().set(100).unwrap();

    assert!(bm.get(10));
    assert!(bm.get(70));
    assert!(bm.get(100));
    assert!(!bm.get(99));
    assert_eq!(bm.cardinality(), 3);
    assert_eq!(bm.size_in_bits(), 101);
}

#[test]
fn reads_at_and_past_the_size_are_false() {
    let mut bm = Ewah::new();
    bm.set(64).unwrap();
    assert_eq!(bm.size_in_bits(), 65);
    assert!(!bm.get(65));
    assert!(!bm.get(66));
    assert!(!bm.get(1 << 40));
}

#[test]
fn empty_bitmap_reads_false_everywhere() {
    let bm = Ewah::new();
    assert!(!bm.get(0));
    assert!(!bm.get(63));
    assert!(!bm.get(1_000_000));
    assert_eq!(bm.cardinality(), 0);
    assert_eq!(bm.size_in_bits(), 0);
    assert_eq!(bm.size_in_words(), 1);
}

#[test]
fn bit_zero_and_word_boundaries() {
    let mut bm = Ewah::new();
    for &i in &[0u64, 63, 64, 127, 128, 4096] {
        bm.set(i).unwrap();
    }
    for &i in &[0u64, 63, 64, 127, 128, 4096] {
        assert!(bm.get(i), "bit {i}");
    }
    for &i in &[1u64, 62, 65, 126, 129, 4095] {
        assert!(!bm.get(i), "bit {i}");
    }
    assert_eq!(bm.cardinality(), 6);
}

// ─────────────────────────────────────────────────────────────────────────────
// Error contract
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn set_is_monotonic_only() {
    let mut bm = Ewah::new();
    bm.set(15).unwrap();
    assert_eq!(bm.set(7), Err(EwahError::NonMonotonicSet));
    // The failed call left everything intact.
    assert_eq!(bm.cardinality(), 1);
    assert_eq!(bm.size_in_bits(), 16);
    assert!(bm.get(15));
    assert!(!bm.get(7));
}

#[test]
fn set_rejects_indexes_past_the_cap() {
    let mut bm = Ewah::new();
    assert_eq!(bm.set(SET_INDEX_MAX + 1), Err(EwahError::IndexOutOfRange));
    assert_eq!(bm.set(u64::MAX), Err(EwahError::IndexOutOfRange));
    assert_eq!(bm.size_in_bits(), 0);
    // The cap itself is settable.
    bm.set(SET_INDEX_MAX).unwrap();
    assert!(bm.get(SET_INDEX_MAX));
    assert_eq!(bm.cardinality(), 1);
}

#[test]
fn errors_display_and_compose() {
    let err = Ewah::new().set(u64::MAX).unwrap_err();
    assert_eq!(err, EwahError::IndexOutOfRange);
    assert!(!err.to_string().is_empty());
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(boxed.source().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Read finger: ascending, backward, interleaved access
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn ascending_then_backward_reads_agree_with_a_fresh_bitmap() {
    let mut bm = Ewah::new();
    let bits: Vec<u64> = (0..500).map(|k| k * 97).collect();
    for &b in &bits {
        bm.set(b).unwrap();
    }
    let fresh = bm.clone();

    // Ascending pass warms the finger.
    for &b in &bits {
        assert!(bm.get(b));
    }
    // Backward pass repeatedly invalidates it; answers must not change.
    for &b in bits.iter().rev() {
        assert!(bm.get(b));
        assert_eq!(bm.get(b + 1), fresh.get(b + 1));
    }
    // Interleaved far jumps.
    assert!(bm.get(bits[499]));
    assert!(bm.get(bits[0]));
    assert!(bm.get(bits[250]));
    assert_eq!(bm.cardinality(), 500);
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reset_restores_the_empty_state() {
    let mut bm = Ewah::new();
    bm.set(9).unwrap().set(900).unwrap();
    bm.reset();
    assert_eq!(bm.size_in_bits(), 0);
    assert_eq!(bm.cardinality(), 0);
    assert!(!bm.get(9));
    // Fully usable again, including bits below the old size.
    bm.set(2).unwrap();
    assert!(bm.get(2));
}

#[test]
fn clone_and_copy_are_deep() {
    let mut a = Ewah::new();
    a.set(100).unwrap().set(200).unwrap();

    let mut b = a.clone();
    assert!(b.equal(&a));
    b.set(300).unwrap();
    assert!(!b.equal(&a));
    assert_eq!(a.cardinality(), 2);

    let mut c = Ewah::new();
    c.set(5).unwrap();
    c.copy_from(&a);
    assert!(c.equal(&a));
    c.set(400).unwrap();
    assert_eq!(a.cardinality(), 2);
    assert_eq!(c.cardinality(), 3);
}

#[test]
fn equality_requires_matching_size() {
    let mut a = Ewah::new();
    a.set(10).unwrap();
    let mut b = Ewah::new();
    b.set(10).unwrap();
    assert!(a.equal(&b));
    assert_eq!(a, b);

    // Same bits, different declared size.
    b.set_size_in_bits(20).unwrap();
    assert!(!a.equal(&b));
}

#[test]
fn compressed_size_reporting() {
    let mut bm = Ewah::new();
    bm.set(0).unwrap();
    assert_eq!(bm.size_in_words(), 2);
    assert_eq!(bm.size_in_bytes(), 16);
    // A distant bit adds one marker and one literal.
    bm.set(1 << 20).unwrap();
    assert_eq!(bm.size_in_words(), 4);
}
