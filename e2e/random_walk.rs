//! E2E suite: large random-stride bitmaps.
//!
//! Builds 10,000-bit bitmaps from a seeded walker, then checks reads
//! (forward, backward, random), cardinality, re-encoding, and counter-sink
//! agreement at scale.

use ewah::Ewah;

mod oracle;
use oracle::{random_walk_bits, XorShift64};

const SEED: u64 = 0xcc9e_2d51;
const COUNT: usize = 10_000;

fn walk_bitmap(seed: u64) -> (Ewah, Vec<u64>) {
    let bits = random_walk_bits(seed, COUNT, 10_000);
    let mut bm = Ewah::new();
    for &b in &bits {
        bm.set(b).unwrap();
    }
    (bm, bits)
}

#[test]
fn every_walked_bit_reads_back() {
    let (bm, bits) = walk_bitmap(SEED);
    assert_eq!(bm.cardinality(), COUNT as u64);
    for &b in &bits {
        assert!(bm.get(b), "bit {b}");
    }
}

#[test]
fn backward_and_random_reads_match_fresh_cursor_reads() {
    let (bm, bits) = walk_bitmap(SEED);
    let fresh = bm.clone();

    // Backward sweep keeps invalidating the finger.
    for &b in bits.iter().rev().step_by(7) {
        assert!(bm.get(b), "bit {b}");
    }

    // Random probes, half of them just off a set bit.
    let mut rng = XorShift64::new(SEED ^ 0xff);
    for _ in 0..1_000 {
        let k = (rng.next() % COUNT as u64) as usize;
        let probe = if rng.next() % 2 == 0 { bits[k] } else { bits[k] + 1 };
        assert_eq!(bm.get(probe), fresh.clone().get(probe), "probe {probe}");
    }
}

#[test]
fn gaps_between_walked_bits_read_false() {
    let (bm, bits) = walk_bitmap(SEED);
    for w in bits.windows(2).take(2_000) {
        if w[1] > w[0] + 1 {
            assert!(!bm.get(w[0] + 1));
            assert!(!bm.get(w[1] - 1) || w[1] - 1 == w[0]);
        }
    }
}

#[test]
fn reencoding_the_read_back_vector_is_identical() {
    // A shorter walk keeps the full 0..size scan cheap.
    let bits = random_walk_bits(SEED, 2_000, 1_000);
    let mut bm = Ewah::new();
    for &b in &bits {
        bm.set(b).unwrap();
    }
    let mut rebuilt = Ewah::new();
    for i in 0..bm.size_in_bits() {
        if bm.get(i) {
            rebuilt.set(i).unwrap();
        }
    }
    assert!(rebuilt.equal(&bm));
}

#[test]
fn wire_round_trip_at_scale() {
    let (bm, bits) = walk_bitmap(SEED);
    let back = Ewah::from_bytes(&bm.to_bytes()).unwrap();
    assert!(back.equal(&bm));
    for &b in bits.iter().step_by(97) {
        assert!(back.get(b));
    }
}

#[test]
fn counter_sinks_agree_with_materialized_operators_at_scale() {
    let (a, _) = walk_bitmap(SEED);
    let (b, _) = walk_bitmap(SEED ^ 0x5bd1_e995);

    assert_eq!(a.and_cardinality(&b), a.and(&b).cardinality());
    assert_eq!(a.or_cardinality(&b), a.or(&b).cardinality());
    assert_eq!(a.xor_cardinality(&b), a.xor(&b).cardinality());
    assert_eq!(a.and_not_cardinality(&b), a.and_not(&b).cardinality());
    assert_eq!(
        a.and_cardinality(&b) + a.or_cardinality(&b),
        a.cardinality() + b.cardinality()
    );
}

#[test]
fn compressed_size_stays_bounded() {
    let (bm, bits) = walk_bitmap(SEED);
    // Worst case: every set bit costs one literal plus one marker, on top of
    // the initial marker.
    assert!(bm.size_in_words() as u64 <= 2 * bits.len() as u64 + 1);
    // And the encoding actually compresses the walk's empty stretches.
    let dense_words = bm.size_in_bits() / 64 + 1;
    assert!((bm.size_in_words() as u64) < dense_words);
}
