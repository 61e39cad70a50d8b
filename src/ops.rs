//! Boolean set algebra in the compressed domain.
//!
//! Every binary operator walks both operands with a pair of [`Cursor`]s in
//! lockstep and emits straight into a [`BitmapStorage`] sink, so nothing is
//! ever decompressed. The walk alternates two phases per round:
//!
//! 1. **Runs** — while either side sits on unconsumed empty words, the side
//!    with the longer remaining run (the *predator*) decides what the region
//!    looks like, and the other side (the *prey*) is consumed to match:
//!    either the region collapses to an empty run, or the prey's words pass
//!    through (possibly negated).
//! 2. **Literals** — the overlapping literal blocks are combined word by
//!    word with the operator's bitwise form.
//!
//! When one operand runs out, the tail of the other is drained according to
//! the operator (verbatim for OR/XOR, zeros for AND, operator-dependent for
//! AND-NOT), and the result size is adjusted to the longer operand.
//!
//! The same kernels drive the `*_cardinality` variants through a
//! [`BitCounter`], skipping the output allocation entirely.

use crate::bitmap::Ewah;
use crate::cursor::Cursor;
use crate::rlw::{self, WORD_IN_BITS};
use crate::storage::{BitCounter, BitmapStorage};

impl Ewah {
    // ── Public operator surface ───────────────────────────────────────────────

    /// Intersection with `other`, as a fresh bitmap.
    pub fn and(&self, other: &Ewah) -> Ewah {
        let mut ans = Ewah::new();
        ans.reserve_words(self.size_in_words().max(other.size_in_words()));
        self.and_to_container(other, &mut ans);
        ans
    }

    /// Union with `other`, as a fresh bitmap.
    pub fn or(&self, other: &Ewah) -> Ewah {
        let mut ans = Ewah::new();
        ans.reserve_words(self.size_in_words().max(other.size_in_words()));
        self.or_to_container(other, &mut ans);
        ans
    }

    /// Symmetric difference with `other`, as a fresh bitmap.
    pub fn xor(&self, other: &Ewah) -> Ewah {
        let mut ans = Ewah::new();
        ans.reserve_words(self.size_in_words().max(other.size_in_words()));
        self.xor_to_container(other, &mut ans);
        ans
    }

    /// Difference `self \ other`, as a fresh bitmap.
    pub fn and_not(&self, other: &Ewah) -> Ewah {
        let mut ans = Ewah::new();
        ans.reserve_words(self.size_in_words().max(other.size_in_words()));
        self.and_not_to_container(other, &mut ans);
        ans
    }

    /// Left fold of [`and`](Self::and) over `others`.
    ///
    /// An empty slice returns a clone of `self`. Intermediate results reuse
    /// one scratch bitmap via swap-and-reset, so the fold allocates exactly
    /// two bitmaps regardless of operand count.
    pub fn and_many(&self, others: &[&Ewah]) -> Ewah {
        self.fold(others, Ewah::and_to_container::<Ewah>)
    }

    /// Left fold of [`or`](Self::or) over `others`.
    pub fn or_many(&self, others: &[&Ewah]) -> Ewah {
        self.fold(others, Ewah::or_to_container::<Ewah>)
    }

    /// Left fold of [`xor`](Self::xor) over `others`.
    pub fn xor_many(&self, others: &[&Ewah]) -> Ewah {
        self.fold(others, Ewah::xor_to_container::<Ewah>)
    }

    /// Left fold of [`and_not`](Self::and_not) over `others`:
    /// `((self \ a) \ b) \ …`.
    pub fn and_not_many(&self, others: &[&Ewah]) -> Ewah {
        self.fold(others, Ewah::and_not_to_container::<Ewah>)
    }

    /// Cardinality of `self ∧ other` without materializing the result.
    pub fn and_cardinality(&self, other: &Ewah) -> u64 {
        let mut counter = BitCounter::new();
        self.and_to_container(other, &mut counter);
        counter.count()
    }

    /// Cardinality of `self ∨ other` without materializing the result.
    pub fn or_cardinality(&self, other: &Ewah) -> u64 {
        let mut counter = BitCounter::new();
        self.or_to_container(other, &mut counter);
        counter.count()
    }

    /// Cardinality of `self ⊕ other` without materializing the result.
    pub fn xor_cardinality(&self, other: &Ewah) -> u64 {
        let mut counter = BitCounter::new();
        self.xor_to_container(other, &mut counter);
        counter.count()
    }

    /// Cardinality of `self \ other` without materializing the result.
    pub fn and_not_cardinality(&self, other: &Ewah) -> u64 {
        let mut counter = BitCounter::new();
        self.and_not_to_container(other, &mut counter);
        counter.count()
    }

    /// Complement in place over `[0, size_in_bits)`.
    ///
    /// Flips every marker's run polarity and inverts every literal; the final
    /// word is masked so bits beyond the size stay zero. Returns `&mut Self`
    /// so calls chain.
    pub fn not(&mut self) -> &mut Self {
        let mut marker = 0usize;
        loop {
            let m = self.buffer[marker];
            let lits = rlw::literal_count(m) as usize;
            rlw::set_running_bit(&mut self.buffer[marker], !rlw::running_bit(m));
            for k in 1..=lits {
                self.buffer[marker + k] = !self.buffer[marker + k];
            }

            if marker + lits + 1 == self.buffer.len() {
                let last_bits = self.size_in_bits % WORD_IN_BITS;
                if last_bits == 0 {
                    break;
                }
                if lits == 0 {
                    // A literal-free ones run covering a partial last word:
                    // carve that word out as a masked literal so bits past
                    // the size stay zero.
                    let m = self.buffer[marker];
                    if rlw::running_length(m) > 0 && rlw::running_bit(m) {
                        rlw::set_running_length(
                            &mut self.buffer[marker],
                            rlw::running_length(m) - 1,
                        );
                        self.add_literal_word(!0u64 >> (WORD_IN_BITS - last_bits));
                    }
                    break;
                }
                self.buffer[marker + lits] &= !0u64 >> (WORD_IN_BITS - last_bits);
                break;
            }
            marker += lits + 1;
        }
        self
    }

    // ── Fold plumbing ─────────────────────────────────────────────────────────

    fn fold(&self, others: &[&Ewah], op: fn(&Ewah, &Ewah, &mut Ewah)) -> Ewah {
        let Some((first, rest)) = others.split_first() else {
            return self.clone();
        };
        let words = self.size_in_words().max(first.size_in_words());
        let mut ans = Ewah::new();
        let mut tmp = Ewah::new();
        ans.reserve_words(words);
        tmp.reserve_words(words);

        op(self, first, &mut ans);
        for b in rest {
            op(&ans, b, &mut tmp);
            tmp.swap(&mut ans);
            tmp.reset();
        }
        ans
    }

    // ── Kernels ───────────────────────────────────────────────────────────────

    /// AND kernel. A zero run on either side zeroes the region; a ones run
    /// passes the other side through.
    pub(crate) fn and_to_container<S: BitmapStorage>(&self, other: &Ewah, sink: &mut S) {
        let mut i = Cursor::new(&other.buffer);
        let mut j = Cursor::new(&self.buffer);

        while i.marker_remaining() > 0 && j.marker_remaining() > 0 {
            while i.empty_remaining() > 0 || j.empty_remaining() > 0 {
                let (prey, predator) = if i.empty_remaining() < j.empty_remaining() {
                    (&mut i, &mut j)
                } else {
                    (&mut j, &mut i)
                };
                let span = predator.empty_remaining();
                if !predator.running_bit() {
                    sink.add_stream_of_empty_words(false, span);
                    prey.move_forward(span);
                } else {
                    let copied = prey.copy_forward(sink, span, false);
                    sink.add_stream_of_empty_words(false, span - copied);
                }
                predator.move_forward(span);
            }

            let lits = i.literal_remaining().min(j.literal_remaining());
            if lits > 0 {
                for k in 0..lits {
                    sink.add(i.literal_word_at(k) & j.literal_word_at(k));
                }
                i.move_forward(lits);
                j.move_forward(lits);
            }
        }

        if self.adjust_on_aggregate {
            // Whatever the longer side still holds intersects with implicit
            // zeros; pad the result to its word count.
            let remaining = if !i.at_end() { &mut i } else { &mut j };
            remaining.copy_forward_empty(sink);
            // Within the sink's last word for canonically-sized operands; a
            // mismatch means a non-canonical operand, and the word-aligned
            // size stands.
            let _ = sink.set_size_in_bits(self.size_in_bits.max(other.size_in_bits));
        }
    }

    /// OR kernel. A ones run on either side saturates the region; a zero run
    /// passes the other side through.
    pub(crate) fn or_to_container<S: BitmapStorage>(&self, other: &Ewah, sink: &mut S) {
        let mut i = Cursor::new(&other.buffer);
        let mut j = Cursor::new(&self.buffer);

        while i.marker_remaining() > 0 && j.marker_remaining() > 0 {
            while i.empty_remaining() > 0 || j.empty_remaining() > 0 {
                let (prey, predator) = if i.empty_remaining() < j.empty_remaining() {
                    (&mut i, &mut j)
                } else {
                    (&mut j, &mut i)
                };
                let span = predator.empty_remaining();
                if predator.running_bit() {
                    sink.add_stream_of_empty_words(true, span);
                    prey.move_forward(span);
                } else {
                    let copied = prey.copy_forward(sink, span, false);
                    sink.add_stream_of_empty_words(false, span - copied);
                }
                predator.move_forward(span);
            }

            let lits = i.literal_remaining().min(j.literal_remaining());
            if lits > 0 {
                for k in 0..lits {
                    sink.add(i.literal_word_at(k) | j.literal_word_at(k));
                }
                i.move_forward(lits);
                j.move_forward(lits);
            }
        }

        let remaining = if !i.at_end() { &mut i } else { &mut j };
        remaining.copy_forward_remaining(sink);
        if self.adjust_on_aggregate {
            let _ = sink.set_size_in_bits(self.size_in_bits.max(other.size_in_bits));
        }
    }

    /// XOR kernel. A zero run passes the other side through; a ones run
    /// passes it through negated.
    pub(crate) fn xor_to_container<S: BitmapStorage>(&self, other: &Ewah, sink: &mut S) {
        let mut i = Cursor::new(&other.buffer);
        let mut j = Cursor::new(&self.buffer);

        while i.marker_remaining() > 0 && j.marker_remaining() > 0 {
            while i.empty_remaining() > 0 || j.empty_remaining() > 0 {
                let (prey, predator) = if i.empty_remaining() < j.empty_remaining() {
                    (&mut i, &mut j)
                } else {
                    (&mut j, &mut i)
                };
                let span = predator.empty_remaining();
                let negated = predator.running_bit();
                let copied = prey.copy_forward(sink, span, negated);
                sink.add_stream_of_empty_words(negated, span - copied);
                predator.move_forward(span);
            }

            let lits = i.literal_remaining().min(j.literal_remaining());
            if lits > 0 {
                for k in 0..lits {
                    sink.add(i.literal_word_at(k) ^ j.literal_word_at(k));
                }
                i.move_forward(lits);
                j.move_forward(lits);
            }
        }

        let remaining = if !i.at_end() { &mut i } else { &mut j };
        remaining.copy_forward_remaining(sink);
        if self.adjust_on_aggregate {
            let _ = sink.set_size_in_bits(self.size_in_bits.max(other.size_in_bits));
        }
    }

    /// AND-NOT kernel (`self \ other`). Regions resolve by which side the
    /// predator is: zeros on the self side or ones on the other side zero
    /// the region; zeros on the other side pass self through; ones on the
    /// self side pass other through negated.
    pub(crate) fn and_not_to_container<S: BitmapStorage>(&self, other: &Ewah, sink: &mut S) {
        let mut i = Cursor::new(&self.buffer);
        let mut j = Cursor::new(&other.buffer);

        while i.marker_remaining() > 0 && j.marker_remaining() > 0 {
            while i.empty_remaining() > 0 || j.empty_remaining() > 0 {
                let self_is_prey = i.empty_remaining() < j.empty_remaining();
                let (prey, predator) = if self_is_prey {
                    (&mut i, &mut j)
                } else {
                    (&mut j, &mut i)
                };
                let span = predator.empty_remaining();
                if predator.running_bit() == self_is_prey {
                    // other side all ones, or self side all zeros: nothing
                    // survives the difference here.
                    sink.add_stream_of_empty_words(false, span);
                    prey.move_forward(span);
                } else if self_is_prey {
                    // other side all zeros: self passes through.
                    let copied = prey.copy_forward(sink, span, false);
                    sink.add_stream_of_empty_words(false, span - copied);
                } else {
                    // self side all ones: the complement of other passes.
                    let copied = prey.copy_forward(sink, span, true);
                    sink.add_stream_of_empty_words(true, span - copied);
                }
                predator.move_forward(span);
            }

            let lits = i.literal_remaining().min(j.literal_remaining());
            if lits > 0 {
                for k in 0..lits {
                    sink.add(i.literal_word_at(k) & !j.literal_word_at(k));
                }
                i.move_forward(lits);
                j.move_forward(lits);
            }
        }

        if !i.at_end() {
            // Only self extends past other: its tail meets implicit zeros
            // and survives verbatim.
            i.copy_forward_remaining(sink);
        } else if self.adjust_on_aggregate {
            j.copy_forward_empty(sink);
        }
        if self.adjust_on_aggregate {
            let _ = sink.set_size_in_bits(self.size_in_bits.max(other.size_in_bits));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(bits: &[u64]) -> Ewah {
        let mut bm = Ewah::new();
        for &b in bits {
            bm.set(b).unwrap();
        }
        bm
    }

    #[test]
    fn and_keeps_the_intersection() {
        let a = bitmap(&[10, 70, 100]);
        let b = bitmap(&[100, 15_000]);
        let c = a.and(&b);
        assert_eq!(c.cardinality(), 1);
        assert!(c.get(100));
        assert!(!c.get(10) && !c.get(70) && !c.get(15_000));
        assert_eq!(c.size_in_bits(), 15_001);
    }

    #[test]
    fn or_keeps_the_union() {
        let a = bitmap(&[10, 70, 100]);
        let b = bitmap(&[100, 15_000]);
        let c = a.or(&b);
        assert_eq!(c.cardinality(), 4);
        for bit in [10, 70, 100, 15_000] {
            assert!(c.get(bit), "bit {bit}");
        }
    }

    #[test]
    fn xor_keeps_the_symmetric_difference() {
        let a = bitmap(&[10, 70, 100]);
        let b = bitmap(&[100, 15_000]);
        let c = a.xor(&b);
        assert_eq!(c.cardinality(), 3);
        assert!(c.get(10) && c.get(70) && c.get(15_000));
        assert!(!c.get(100));
    }

    #[test]
    fn and_not_keeps_the_difference() {
        let a = bitmap(&[10, 70, 100]);
        let b = bitmap(&[100, 15_000]);
        let c = a.and_not(&b);
        assert_eq!(c.cardinality(), 2);
        assert!(c.get(10) && c.get(70));
        assert!(!c.get(100) && !c.get(15_000));

        // Difference is not symmetric: the long tail of b survives b \ a.
        let d = b.and_not(&a);
        assert_eq!(d.cardinality(), 1);
        assert!(d.get(15_000));
    }

    #[test]
    fn operators_against_dense_runs() {
        // a: ones run (0..256); b: scattered literals.
        let mut a = Ewah::new();
        a.set_size_in_bits_with_default(256, true).unwrap();
        let b = bitmap(&[3, 64, 255, 300]);

        let and = a.and(&b);
        assert_eq!(and.cardinality(), 3);
        assert!(and.get(3) && and.get(64) && and.get(255));
        assert!(!and.get(300));

        let or = a.or(&b);
        assert_eq!(or.cardinality(), 257);

        let xor = a.xor(&b);
        assert_eq!(xor.cardinality(), 256 - 3 + 1);
        assert!(!xor.get(3));
        assert!(xor.get(4) && xor.get(300));

        let diff = a.and_not(&b);
        assert_eq!(diff.cardinality(), 253);
        assert!(!diff.get(3) && diff.get(4));

        let rdiff = b.and_not(&a);
        assert_eq!(rdiff.cardinality(), 1);
        assert!(rdiff.get(300));
    }

    #[test]
    fn operands_are_not_mutated() {
        let a = bitmap(&[1, 2, 3]);
        let b = bitmap(&[2, 3, 4]);
        let before_a = a.clone();
        let before_b = b.clone();
        let _ = a.and(&b);
        let _ = a.or(&b);
        let _ = a.xor(&b);
        let _ = a.and_not(&b);
        assert_eq!(a, before_a);
        assert_eq!(b, before_b);
    }

    #[test]
    fn folds_match_repeated_binary_ops() {
        let a = bitmap(&[1, 5, 9, 700]);
        let b = bitmap(&[5, 9, 700, 1000]);
        let c = bitmap(&[9, 700, 2000]);

        assert_eq!(a.and_many(&[&b, &c]), a.and(&b).and(&c));
        assert_eq!(a.or_many(&[&b, &c]), a.or(&b).or(&c));
        assert_eq!(a.xor_many(&[&b, &c]), a.xor(&b).xor(&c));
        assert_eq!(a.and_not_many(&[&b, &c]), a.and_not(&b).and_not(&c));
        assert_eq!(a.and_many(&[]), a);
    }

    #[test]
    fn counter_sink_matches_materialized_results() {
        let a = bitmap(&[10, 70, 100, 150, 15_000]);
        let b = bitmap(&[11, 13, 100, 15_000]);
        assert_eq!(a.and_cardinality(&b), a.and(&b).cardinality());
        assert_eq!(a.or_cardinality(&b), a.or(&b).cardinality());
        assert_eq!(a.xor_cardinality(&b), a.xor(&b).cardinality());
        assert_eq!(a.and_not_cardinality(&b), a.and_not(&b).cardinality());
    }

    #[test]
    fn not_complements_within_size() {
        let mut c = bitmap(&[10, 100, 10_000]);
        let size = c.size_in_bits();
        let ones_before = c.cardinality();
        c.not();
        let ones_after = c.cardinality();
        assert_eq!(ones_before + ones_after, size);
        assert!(!c.get(10) && !c.get(100) && !c.get(10_000));
        assert!(c.get(0) && c.get(11) && c.get(9_999));
        assert_eq!(c.size_in_bits(), size);
    }

    #[test]
    fn double_not_restores_the_encoding() {
        let mut c = bitmap(&[0, 3, 64, 500, 777]);
        let original = c.clone();
        c.not().not();
        assert_eq!(c, original);
    }

    #[test]
    fn not_masks_a_partial_ones_tail() {
        // Complementing an empty-suffixed bitmap must not leak bits past the
        // size: bits [0, 130) flip to ones only up to bit 129.
        let mut bm = Ewah::new();
        bm.set_size_in_bits_with_default(130, false).unwrap();
        bm.not();
        assert_eq!(bm.cardinality(), 130);
        assert!(bm.get(0) && bm.get(129));
        assert!(!bm.get(130));
    }

    #[test]
    fn not_on_a_pure_ones_run_with_partial_tail() {
        let mut bm = Ewah::new();
        bm.set_size_in_bits_with_default(100, true).unwrap();
        bm.not();
        assert_eq!(bm.cardinality(), 0);
        bm.not();
        assert_eq!(bm.cardinality(), 100);
        assert!(bm.get(99));
        assert!(!bm.get(100));
    }

    #[test]
    fn xor_crossing_negated_runs() {
        // b's zero run sits under a's ones run, so the negated bulk copy
        // crosses an empty run — the region must come out all ones.
        let mut a = Ewah::new();
        a.set_size_in_bits_with_default(64 * 6, true).unwrap();
        let b = bitmap(&[64 * 6 - 1]);

        let x = a.xor(&b);
        assert_eq!(x.cardinality(), 64 * 6 - 1);
        assert!(!x.get(64 * 6 - 1));
        assert!(x.get(0) && x.get(64 * 5));
    }
}
