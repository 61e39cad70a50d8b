//! The EWAH bitmap: buffer ownership, append path, read path, lifecycle.
//!
//! An [`Ewah`] owns one word buffer laid out as segments (marker word +
//! literal words, see [`crate::rlw`]), the bit length of the uncompressed
//! vector it stands for, a write head (index of the last marker, where every
//! append lands) and a read finger (last `get` position, so ascending reads
//! skip re-walking the buffer).
//!
//! Construction is append-only: bits are set in ascending order, whole words
//! arrive through the [`BitmapStorage`] impl. Nothing here decompresses; the
//! Boolean operators live in [`crate::ops`] and walk the segments directly.

use core::cell::Cell;
use core::fmt;

use crate::popcount::popcount;
use crate::rlw::{self, LITERAL_MAX, RUN_LEN_MAX, WORD_IN_BITS};
use crate::storage::BitmapStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Limits and sizing
// ─────────────────────────────────────────────────────────────────────────────

/// Highest bit index `set` accepts.
///
/// Capped below `i32::MAX` so word arithmetic never overflows 32-bit counts;
/// a bitmap sparser than that wants a different data structure anyway.
pub const SET_INDEX_MAX: u64 = i32::MAX as u64 - WORD_IN_BITS;

/// Initial buffer allocation, in words.
const DEFAULT_BUFFER_WORDS: usize = 4;

/// Buffer growth switches from doubling to 3/2 beyond this many words.
const GROWTH_DOUBLING_LIMIT: usize = 32_768;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by bitmap mutations.
///
/// Every variant is a contract violation by the caller or a malformed input
/// buffer; none arises from the environment. A failed call leaves the bitmap
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EwahError {
    /// Bit index beyond [`SET_INDEX_MAX`].
    IndexOutOfRange,
    /// `set` below the current size; bits must be set in ascending order.
    NonMonotonicSet,
    /// Size adjustment that would cross a 64-bit word boundary.
    ShrinkRejected,
    /// Serialized form failed structural validation.
    CorruptBuffer,
}

impl fmt::Display for EwahError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EwahError::IndexOutOfRange => "bit index out of range",
            EwahError::NonMonotonicSet => "bits must be set in ascending order",
            EwahError::ShrinkRejected => "size change crosses a word boundary",
            EwahError::CorruptBuffer => "malformed bitmap buffer",
        })
    }
}

impl std::error::Error for EwahError {}

// ─────────────────────────────────────────────────────────────────────────────
// Read finger
// ─────────────────────────────────────────────────────────────────────────────

/// Saved `get` position: the marker last inspected and the number of
/// uncompressed words before it. Backward reads reset to the start.
#[derive(Debug, Clone, Copy, Default)]
struct GetFinger {
    marker: usize,
    checked: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// The bitmap
// ─────────────────────────────────────────────────────────────────────────────

/// Compressed bitmap over 64-bit words.
///
/// `Ewah` is `Send` but not `Sync`: `get` updates the read finger through a
/// [`Cell`], so sharing one instance across threads requires external
/// synchronization even for reads.
#[derive(Clone)]
pub struct Ewah {
    /// Segment-structured word buffer; `len()` is the logical word count.
    pub(crate) buffer: Vec<u64>,
    /// Bit length of the uncompressed vector.
    pub(crate) size_in_bits: u64,
    /// Pad Boolean-operator output to the longer operand's size.
    pub(crate) adjust_on_aggregate: bool,
    /// Write head: index of the last segment's marker.
    pub(crate) rlw_marker: usize,
    finger: Cell<GetFinger>,
}

impl Ewah {
    /// Empty bitmap: one zero marker, size zero.
    pub fn new() -> Self {
        let mut buffer = Vec::with_capacity(DEFAULT_BUFFER_WORDS);
        buffer.push(0);
        Ewah {
            buffer,
            size_in_bits: 0,
            adjust_on_aggregate: true,
            rlw_marker: 0,
            finger: Cell::new(GetFinger::default()),
        }
    }

    /// Restore the freshly-constructed state, keeping the allocation.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffer.push(0);
        self.size_in_bits = 0;
        self.adjust_on_aggregate = true;
        self.rlw_marker = 0;
        self.finger.set(GetFinger::default());
    }

    // ── Sizes ─────────────────────────────────────────────────────────────────

    /// Bit length of the uncompressed vector this bitmap represents.
    pub fn size_in_bits(&self) -> u64 {
        self.size_in_bits
    }

    /// Compressed size in words.
    pub fn size_in_words(&self) -> usize {
        self.buffer.len()
    }

    /// Compressed size in bytes (buffer only, not the struct).
    pub fn size_in_bytes(&self) -> usize {
        self.buffer.len() * (WORD_IN_BITS as usize / 8)
    }

    // ── Append path ───────────────────────────────────────────────────────────

    /// Set bit `i` to true.
    ///
    /// Bits must be set in ascending order: `i` below the current
    /// [`size_in_bits`](Self::size_in_bits) is [`EwahError::NonMonotonicSet`],
    /// and `i` above [`SET_INDEX_MAX`] is [`EwahError::IndexOutOfRange`].
    /// Returns `&mut Self` so calls chain.
    pub fn set(&mut self, i: u64) -> Result<&mut Self, EwahError> {
        if i > SET_INDEX_MAX {
            return Err(EwahError::IndexOutOfRange);
        }
        if i < self.size_in_bits {
            return Err(EwahError::NonMonotonicSet);
        }

        // Whole words between the bit being set and the current active word.
        let dist = (i + WORD_IN_BITS) / WORD_IN_BITS
            - (self.size_in_bits + WORD_IN_BITS - 1) / WORD_IN_BITS;
        self.size_in_bits = i + 1;

        if dist > 0 {
            // Pad with zero words, then open a fresh literal for the bit.
            if dist > 1 {
                self.stream_empty_words(false, dist - 1);
            }
            self.add_literal_word(1 << (i % WORD_IN_BITS));
            return Ok(self);
        }

        if rlw::literal_count(self.head()) == 0 {
            // The active word sits inside the head marker's run: steal its
            // last empty word and re-emit it as a one-bit literal.
            let run = rlw::running_length(self.head());
            rlw::set_running_length(self.head_mut(), run - 1);
            self.add_literal_word(1 << (i % WORD_IN_BITS));
            return Ok(self);
        }

        // The active word is the last literal; fold it into a run of ones if
        // this bit completes it.
        let last = self.buffer.len() - 1;
        self.buffer[last] |= 1 << (i % WORD_IN_BITS);
        if self.buffer[last] == u64::MAX {
            self.buffer.pop();
            let lits = rlw::literal_count(self.head());
            rlw::set_literal_count(self.head_mut(), lits - 1);
            self.add_empty_word(true);
        }
        Ok(self)
    }

    /// Marker word at the write head.
    fn head(&self) -> u64 {
        self.buffer[self.rlw_marker]
    }

    fn head_mut(&mut self) -> &mut u64 {
        &mut self.buffer[self.rlw_marker]
    }

    /// Append a zero word and move the write head onto it.
    fn new_marker(&mut self) {
        self.push_word(0);
        self.rlw_marker = self.buffer.len() - 1;
    }

    /// Fold one empty word of polarity `v` into the head marker, opening a
    /// new marker when polarity or capacity forbids extension.
    pub(crate) fn add_empty_word(&mut self, v: bool) {
        let no_literals = rlw::literal_count(self.head()) == 0;
        let run = rlw::running_length(self.head());

        if no_literals && run == 0 {
            rlw::set_running_bit(self.head_mut(), v);
        }
        if no_literals && rlw::running_bit(self.head()) == v && run < RUN_LEN_MAX {
            rlw::set_running_length(self.head_mut(), run + 1);
            return;
        }

        self.new_marker();
        rlw::set_running_bit(self.head_mut(), v);
        rlw::set_running_length(self.head_mut(), 1);
    }

    /// Append one literal word after the head marker, splitting into a new
    /// marker at the literal-count maximum.
    pub(crate) fn add_literal_word(&mut self, word: u64) {
        let lits = rlw::literal_count(self.head());
        if lits == LITERAL_MAX {
            self.new_marker();
            rlw::set_literal_count(self.head_mut(), 1);
            self.push_word(word);
            return;
        }
        rlw::set_literal_count(self.head_mut(), lits + 1);
        self.push_word(word);
    }

    /// Fold `count` empty words of polarity `v` into markers, splitting at
    /// the per-marker run maximum. Does **not** touch `size_in_bits`; `set`
    /// has already accounted for the bits when it calls this.
    pub(crate) fn stream_empty_words(&mut self, v: bool, count: u64) {
        if count == 0 {
            return;
        }
        let mut count = count;

        let head = self.head();
        if rlw::running_bit(head) != v && rlw::marker_size(head) == 0 {
            // Fresh marker: adopt the requested polarity.
            rlw::set_running_bit(self.head_mut(), v);
        } else if rlw::literal_count(head) != 0 || rlw::running_bit(head) != v {
            self.new_marker();
            if v {
                rlw::set_running_bit(self.head_mut(), v);
            }
        }

        let run = rlw::running_length(self.head());
        let can = count.min(RUN_LEN_MAX - run);
        rlw::set_running_length(self.head_mut(), run + can);
        count -= can;

        while count >= RUN_LEN_MAX {
            self.new_marker();
            if v {
                rlw::set_running_bit(self.head_mut(), v);
            }
            rlw::set_running_length(self.head_mut(), RUN_LEN_MAX);
            count -= RUN_LEN_MAX;
        }
        if count > 0 {
            self.new_marker();
            if v {
                rlw::set_running_bit(self.head_mut(), v);
            }
            rlw::set_running_length(self.head_mut(), count);
        }
    }

    /// Append literal words (inverted when `negated`), splitting markers at
    /// the literal-count maximum. Accounts the bits into `size_in_bits`.
    pub(crate) fn stream_literal_words(&mut self, words: &[u64], negated: bool) {
        let mut rest = words;
        while !rest.is_empty() {
            let lits = rlw::literal_count(self.head());
            let can = (rest.len() as u64).min(LITERAL_MAX - lits) as usize;
            rlw::set_literal_count(self.head_mut(), lits + can as u64);

            let (chunk, tail) = rest.split_at(can);
            if negated {
                self.grow_for(chunk.len());
                self.buffer.extend(chunk.iter().map(|&w| !w));
            } else {
                self.push_words(chunk);
            }
            self.size_in_bits += can as u64 * WORD_IN_BITS;

            rest = tail;
            if !rest.is_empty() {
                self.new_marker();
            }
        }
    }

    // ── Buffer growth ─────────────────────────────────────────────────────────

    /// Growth policy: double below [`GROWTH_DOUBLING_LIMIT`] words, then 3/2.
    fn grow_for(&mut self, extra: usize) {
        let len = self.buffer.len();
        let needed = len + extra;
        if needed <= self.buffer.capacity() {
            return;
        }
        let target = if needed < GROWTH_DOUBLING_LIMIT {
            needed * 2
        } else {
            needed.saturating_add(needed / 2)
        };
        let target = target.min(i32::MAX as usize).max(needed);
        self.buffer.reserve_exact(target - len);
    }

    fn push_word(&mut self, word: u64) {
        self.grow_for(1);
        self.buffer.push(word);
    }

    fn push_words(&mut self, words: &[u64]) {
        self.grow_for(words.len());
        self.buffer.extend_from_slice(words);
    }

    /// Pre-size the buffer for operator output.
    pub(crate) fn reserve_words(&mut self, words: usize) {
        if words > self.buffer.capacity() {
            self.buffer.reserve_exact(words - self.buffer.len());
        }
    }

    // ── Read path ─────────────────────────────────────────────────────────────

    /// Read bit `i`. Anything at or beyond the current size reads as false.
    ///
    /// Ascending reads resume from the last position; a backward read resets
    /// the finger and walks from the front.
    pub fn get(&self, i: u64) -> bool {
        if i >= self.size_in_bits {
            return false;
        }
        let word = i / WORD_IN_BITS;
        let bit = i % WORD_IN_BITS;

        let f = self.finger.get();
        let (mut marker, mut checked) = if word < f.checked {
            (0, 0)
        } else {
            (f.marker, f.checked)
        };

        loop {
            let m = self.buffer[marker];
            let run = rlw::running_length(m);
            let lits = rlw::literal_count(m);

            if word < checked + run {
                self.finger.set(GetFinger { marker, checked });
                return rlw::running_bit(m);
            }
            if word < checked + run + lits {
                self.finger.set(GetFinger { marker, checked });
                let w = self.buffer[marker + 1 + (word - checked - run) as usize];
                return w & (1 << bit) != 0;
            }

            checked += run + lits;
            let next = marker + lits as usize + 1;
            if next >= self.buffer.len() {
                self.finger.set(GetFinger { marker, checked });
                return false;
            }
            marker = next;
        }
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> u64 {
        let mut count = 0u64;
        let mut marker = 0usize;
        while marker < self.buffer.len() {
            let m = self.buffer[marker];
            if rlw::running_bit(m) {
                count += WORD_IN_BITS * rlw::running_length(m);
            }
            let lits = rlw::literal_count(m) as usize;
            for j in 1..=lits {
                count += u64::from(popcount(self.buffer[marker + j]));
            }
            marker += lits + 1;
        }
        count
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Structural equality: same bit length, same encoded words.
    ///
    /// The append path is deterministic, so two equal bitmaps are
    /// representation-equal word for word.
    pub fn equal(&self, other: &Ewah) -> bool {
        self.size_in_bits == other.size_in_bits && self.buffer == other.buffer
    }

    /// Replace this bitmap's contents with a deep copy of `other`.
    pub fn copy_from(&mut self, other: &Ewah) {
        self.buffer.clear();
        self.buffer.extend_from_slice(&other.buffer);
        self.size_in_bits = other.size_in_bits;
        self.adjust_on_aggregate = other.adjust_on_aggregate;
        self.rlw_marker = other.rlw_marker;
        self.finger.set(GetFinger::default());
    }

    /// Exchange contents with `other`. Cursors travel with their buffers, so
    /// both bitmaps stay internally consistent.
    pub fn swap(&mut self, other: &mut Ewah) {
        core::mem::swap(self, other);
    }

    // ── Size adjustment ───────────────────────────────────────────────────────

    /// Adjust the bit length within the last word.
    ///
    /// Only sub-word changes are representable without re-encoding; a target
    /// in a different word is [`EwahError::ShrinkRejected`]. Growing past the
    /// word goes through
    /// [`set_size_in_bits_with_default`](Self::set_size_in_bits_with_default).
    pub fn set_size_in_bits(&mut self, bits: u64) -> Result<(), EwahError> {
        let target_words = (bits + WORD_IN_BITS - 1) / WORD_IN_BITS;
        let current_words = (self.size_in_bits + WORD_IN_BITS - 1) / WORD_IN_BITS;
        if target_words != current_words {
            return Err(EwahError::ShrinkRejected);
        }
        self.size_in_bits = bits;
        Ok(())
    }

    /// Extend the bitmap to `bits`, filling new positions with `default`.
    ///
    /// Shrinking is rejected. False extension pads whole words; true
    /// extension fills the partial word bit-by-bit, folds whole words into a
    /// ones run, then finishes the tail.
    pub fn set_size_in_bits_with_default(
        &mut self,
        bits: u64,
        default: bool,
    ) -> Result<&mut Self, EwahError> {
        if bits < self.size_in_bits {
            return Err(EwahError::ShrinkRejected);
        }
        if default {
            while self.size_in_bits % WORD_IN_BITS != 0 && self.size_in_bits < bits {
                self.set(self.size_in_bits)?;
            }
            let full_words = bits / WORD_IN_BITS - self.size_in_bits / WORD_IN_BITS;
            if full_words > 0 {
                self.size_in_bits += full_words * WORD_IN_BITS;
                self.stream_empty_words(true, full_words);
            }
            while self.size_in_bits < bits {
                self.set(self.size_in_bits)?;
            }
        } else {
            let current_words = (self.size_in_bits + WORD_IN_BITS - 1) / WORD_IN_BITS;
            let target_words = (bits + WORD_IN_BITS - 1) / WORD_IN_BITS;
            if target_words > current_words {
                self.stream_empty_words(false, target_words - current_words);
            }
        }
        self.size_in_bits = bits;
        Ok(self)
    }

    // ── Wire layout ───────────────────────────────────────────────────────────

    /// Serialize as `[size_in_bits: u64][size_in_words: u64][words…]`,
    /// host-native byte order. No cross-version stability promise.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.size_in_bytes());
        out.extend_from_slice(&self.size_in_bits.to_ne_bytes());
        out.extend_from_slice(&(self.buffer.len() as u64).to_ne_bytes());
        for &w in &self.buffer {
            out.extend_from_slice(&w.to_ne_bytes());
        }
        out
    }

    /// Rebuild a bitmap from [`to_bytes`](Self::to_bytes) output.
    ///
    /// Validates the header against the payload length, the size against the
    /// word count, and the segment structure (every marker's literal block
    /// must land inside the buffer, and the walk must end exactly on the last
    /// word). Anything inconsistent is [`EwahError::CorruptBuffer`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Ewah, EwahError> {
        fn word_at(bytes: &[u8], off: usize) -> u64 {
            let mut w = [0u8; 8];
            w.copy_from_slice(&bytes[off..off + 8]);
            u64::from_ne_bytes(w)
        }

        if bytes.len() < 16 {
            return Err(EwahError::CorruptBuffer);
        }
        let size_in_bits = word_at(bytes, 0);
        let words = word_at(bytes, 8);
        if words == 0 || words > i32::MAX as u64 {
            return Err(EwahError::CorruptBuffer);
        }
        let words = words as usize;
        if bytes.len() != 16 + words * 8 {
            return Err(EwahError::CorruptBuffer);
        }
        if size_in_bits > words as u64 * WORD_IN_BITS {
            return Err(EwahError::CorruptBuffer);
        }

        let mut buffer = Vec::with_capacity(words);
        for k in 0..words {
            buffer.push(word_at(bytes, 16 + k * 8));
        }

        // Walk the segments; the walk both validates the structure and
        // recovers the write head.
        let mut marker = 0usize;
        loop {
            let lits = rlw::literal_count(buffer[marker]) as usize;
            match (marker + lits + 1).cmp(&words) {
                core::cmp::Ordering::Equal => break,
                core::cmp::Ordering::Greater => return Err(EwahError::CorruptBuffer),
                core::cmp::Ordering::Less => marker += lits + 1,
            }
        }

        Ok(Ewah {
            buffer,
            size_in_bits,
            adjust_on_aggregate: true,
            rlw_marker: marker,
            finger: Cell::new(GetFinger::default()),
        })
    }
}

impl Default for Ewah {
    fn default() -> Self {
        Ewah::new()
    }
}

impl PartialEq for Ewah {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Eq for Ewah {}

impl fmt::Debug for Ewah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ewah")
            .field("size_in_bits", &self.size_in_bits)
            .field("size_in_words", &self.buffer.len())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sink: the bitmap materializes operator output
// ─────────────────────────────────────────────────────────────────────────────

impl BitmapStorage for Ewah {
    fn add(&mut self, word: u64) {
        self.size_in_bits += WORD_IN_BITS;
        if word == 0 {
            self.add_empty_word(false);
        } else if word == u64::MAX {
            self.add_empty_word(true);
        } else {
            self.add_literal_word(word);
        }
    }

    fn add_stream_of_literal_words(&mut self, words: &[u64]) {
        self.stream_literal_words(words, false);
    }

    fn add_stream_of_empty_words(&mut self, polarity: bool, count: u64) {
        self.size_in_bits += count * WORD_IN_BITS;
        self.stream_empty_words(polarity, count);
    }

    fn add_stream_of_negated_literal_words(&mut self, words: &[u64]) {
        self.stream_literal_words(words, true);
    }

    fn set_size_in_bits(&mut self, bits: u64) -> Result<(), EwahError> {
        Ewah::set_size_in_bits(self, bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_bitmap_is_one_empty_marker() {
        let bm = Ewah::new();
        assert_eq!(bm.size_in_words(), 1);
        assert_eq!(bm.size_in_bits(), 0);
        assert_eq!(bm.cardinality(), 0);
        assert!(!bm.get(0));
    }

    #[test]
    fn set_and_get_across_words() {
        let mut bm = Ewah::new();
        bm.set(10).unwrap().set(70).unwrap().set(100).unwrap();
        assert!(bm.get(10));
        assert!(bm.get(70));
        assert!(bm.get(100));
        assert!(!bm.get(99));
        assert!(!bm.get(0));
        assert_eq!(bm.cardinality(), 3);
        assert_eq!(bm.size_in_bits(), 101);
    }

    #[test]
    fn set_rejects_descending_and_out_of_range() {
        let mut bm = Ewah::new();
        bm.set(1000).unwrap();
        assert_eq!(bm.set(10), Err(EwahError::NonMonotonicSet));
        assert_eq!(bm.set(999), Err(EwahError::NonMonotonicSet));
        assert_eq!(bm.set(SET_INDEX_MAX + 1), Err(EwahError::IndexOutOfRange));
        // Failed calls leave the bitmap untouched.
        assert_eq!(bm.size_in_bits(), 1001);
        assert_eq!(bm.cardinality(), 1);
        // Re-setting the current top bit is a non-monotonic set too.
        assert_eq!(bm.set(999), Err(EwahError::NonMonotonicSet));
        bm.set(1000).unwrap_err();
        bm.set(1001).unwrap();
        assert_eq!(bm.cardinality(), 2);
    }

    #[test]
    fn dense_fill_folds_into_ones_run() {
        let mut bm = Ewah::new();
        for i in 0..256 {
            bm.set(i).unwrap();
        }
        assert_eq!(bm.cardinality(), 256);
        // Four all-ones words collapse into a run: one marker, no literals.
        assert_eq!(bm.size_in_words(), 1);
        assert!(rlw::running_bit(bm.buffer[0]));
        assert_eq!(rlw::running_length(bm.buffer[0]), 4);
        for i in 0..256 {
            assert!(bm.get(i));
        }
        assert!(!bm.get(256));
    }

    #[test]
    fn steal_from_run_when_setting_inside_trimmed_word() {
        let mut bm = Ewah::new();
        <Ewah as BitmapStorage>::add_stream_of_empty_words(&mut bm, false, 3);
        bm.set_size_in_bits(190).unwrap();
        bm.set(191).unwrap();
        assert!(bm.get(191));
        assert!(!bm.get(100));
        assert_eq!(bm.cardinality(), 1);
        assert_eq!(rlw::running_length(bm.buffer[0]), 2);
        assert_eq!(rlw::literal_count(bm.buffer[0]), 1);
    }

    #[test]
    fn empty_stream_splits_at_run_maximum() {
        let mut bm = Ewah::new();
        <Ewah as BitmapStorage>::add_stream_of_empty_words(&mut bm, true, RUN_LEN_MAX + 5);
        assert_eq!(bm.size_in_bits(), (RUN_LEN_MAX + 5) * 64);
        assert_eq!(bm.size_in_words(), 2);
        assert_eq!(rlw::running_length(bm.buffer[0]), RUN_LEN_MAX);
        assert_eq!(rlw::running_length(bm.buffer[1]), 5);
        assert!(rlw::running_bit(bm.buffer[1]));
        assert_eq!(bm.cardinality(), (RUN_LEN_MAX + 5) * 64);
    }

    #[test]
    fn empty_stream_extends_existing_run() {
        let mut bm = Ewah::new();
        <Ewah as BitmapStorage>::add_stream_of_empty_words(&mut bm, false, 10);
        <Ewah as BitmapStorage>::add_stream_of_empty_words(&mut bm, false, 7);
        assert_eq!(bm.size_in_words(), 1);
        assert_eq!(rlw::running_length(bm.buffer[0]), 17);
        // Opposite polarity needs a fresh marker.
        <Ewah as BitmapStorage>::add_stream_of_empty_words(&mut bm, true, 2);
        assert_eq!(bm.size_in_words(), 2);
        assert!(rlw::running_bit(bm.buffer[1]));
    }

    #[test]
    fn add_folds_uniform_words() {
        let mut bm = Ewah::new();
        bm.add(0);
        bm.add(u64::MAX);
        bm.add(u64::MAX);
        bm.add(0b1010);
        assert_eq!(bm.size_in_bits(), 256);
        assert_eq!(bm.cardinality(), 130);
        // zero run marker, ones run marker carrying one literal.
        assert_eq!(bm.size_in_words(), 3);
    }

    #[test]
    fn clone_is_deep_and_equal() {
        let mut bm = Ewah::new();
        bm.set(5).unwrap().set(300).unwrap();
        let mut c = bm.clone();
        assert!(c.equal(&bm));
        assert_eq!(c, bm);
        c.set(500).unwrap();
        assert!(!c.equal(&bm));
        assert_eq!(bm.cardinality(), 2);
        assert_eq!(c.cardinality(), 3);
    }

    #[test]
    fn copy_from_replaces_contents() {
        let mut a = Ewah::new();
        a.set(1).unwrap().set(2).unwrap();
        let mut b = Ewah::new();
        b.set(4000).unwrap();
        b.copy_from(&a);
        assert_eq!(b, a);
        assert_eq!(b.cardinality(), 2);
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a = Ewah::new();
        a.set(3).unwrap();
        let mut b = Ewah::new();
        b.set(64).unwrap().set(128).unwrap();
        a.swap(&mut b);
        assert_eq!(a.cardinality(), 2);
        assert_eq!(b.cardinality(), 1);
        assert!(a.get(64) && a.get(128));
        assert!(b.get(3));
    }

    #[test]
    fn backward_get_resets_the_finger() {
        let mut bm = Ewah::new();
        for i in (0..4096).step_by(67) {
            bm.set(i).unwrap();
        }
        // Forward pass warms the finger, backward pass invalidates it.
        for i in (0..4096).step_by(67) {
            assert!(bm.get(i));
        }
        for i in (0..4096).rev() {
            assert_eq!(bm.get(i), i % 67 == 0);
        }
    }

    #[test]
    fn set_size_in_bits_stays_within_last_word() {
        let mut bm = Ewah::new();
        bm.set(130).unwrap();
        assert_eq!(bm.size_in_bits(), 131);
        bm.set_size_in_bits(190).unwrap();
        assert_eq!(bm.size_in_bits(), 190);
        assert_eq!(bm.set_size_in_bits(64), Err(EwahError::ShrinkRejected));
        assert_eq!(bm.set_size_in_bits(500), Err(EwahError::ShrinkRejected));
        assert_eq!(bm.size_in_bits(), 190);
    }

    #[test]
    fn extend_with_false_pads_words() {
        let mut bm = Ewah::new();
        bm.set(10).unwrap();
        bm.set_size_in_bits_with_default(1000, false).unwrap();
        assert_eq!(bm.size_in_bits(), 1000);
        assert_eq!(bm.cardinality(), 1);
        assert!(!bm.get(999));
        // Monotonic contract now starts at the new size.
        assert_eq!(bm.set(500), Err(EwahError::NonMonotonicSet));
        bm.set(1000).unwrap();
        assert_eq!(bm.cardinality(), 2);
    }

    #[test]
    fn extend_with_true_fills_every_bit() {
        let mut bm = Ewah::new();
        bm.set(10).unwrap();
        bm.set_size_in_bits_with_default(200, true).unwrap();
        assert_eq!(bm.size_in_bits(), 200);
        assert_eq!(bm.cardinality(), 1 + (200 - 11));
        for i in 11..200 {
            assert!(bm.get(i), "bit {i}");
        }
        assert!(!bm.get(9));
        assert!(!bm.get(200));
    }

    #[test]
    fn extend_with_true_from_word_boundary() {
        let mut bm = Ewah::new();
        bm.set_size_in_bits_with_default(128, true).unwrap();
        assert_eq!(bm.cardinality(), 128);
        // Two full ones words fold into a run.
        assert_eq!(bm.size_in_words(), 1);
    }

    #[test]
    fn shrink_with_default_rejected() {
        let mut bm = Ewah::new();
        bm.set(100).unwrap();
        assert!(matches!(
            bm.set_size_in_bits_with_default(50, false),
            Err(EwahError::ShrinkRejected)
        ));
    }

    #[test]
    fn wire_round_trip() {
        let mut bm = Ewah::new();
        for i in [0u64, 70, 543, 8000, 8001] {
            bm.set(i).unwrap();
        }
        let bytes = bm.to_bytes();
        let back = Ewah::from_bytes(&bytes).unwrap();
        assert_eq!(back, bm);
        assert_eq!(back.cardinality(), 5);
        // The recovered write head still appends correctly.
        let mut back = back;
        back.set(9000).unwrap();
        assert!(back.get(9000));
    }

    #[test]
    fn from_bytes_rejects_malformed_input() {
        assert_eq!(Ewah::from_bytes(&[]), Err(EwahError::CorruptBuffer));
        assert_eq!(Ewah::from_bytes(&[0u8; 15]), Err(EwahError::CorruptBuffer));

        let mut bm = Ewah::new();
        bm.set(42).unwrap();
        let good = bm.to_bytes();

        // Truncated payload.
        assert_eq!(
            Ewah::from_bytes(&good[..good.len() - 8]),
            Err(EwahError::CorruptBuffer)
        );

        // Size claiming more bits than the words can hold.
        let mut bad = good.clone();
        bad[0..8].copy_from_slice(&(10_000u64).to_ne_bytes());
        assert_eq!(Ewah::from_bytes(&bad), Err(EwahError::CorruptBuffer));

        // Marker whose literal block runs past the buffer.
        let mut bad = good;
        let mut marker = 0u64;
        rlw::set_literal_count(&mut marker, 40);
        bad[16..24].copy_from_slice(&marker.to_ne_bytes());
        assert_eq!(Ewah::from_bytes(&bad), Err(EwahError::CorruptBuffer));
    }

    #[test]
    fn growth_policy_is_exact_below_the_doubling_limit() {
        let mut bm = Ewah::new();
        assert!(bm.buffer.capacity() >= DEFAULT_BUFFER_WORDS);
        for i in 0..64 {
            bm.set(i * 128).unwrap();
        }
        // Doubling growth: capacity is (len at overflow + 1) * 2 each time.
        assert!(bm.buffer.capacity() >= bm.buffer.len());
        assert!(bm.buffer.capacity() <= 4 * bm.buffer.len());
    }

    #[test]
    fn reset_reuses_the_allocation() {
        let mut bm = Ewah::new();
        for i in 0..32 {
            bm.set(i * 200).unwrap();
        }
        let cap = bm.buffer.capacity();
        bm.reset();
        assert_eq!(bm.size_in_words(), 1);
        assert_eq!(bm.size_in_bits(), 0);
        assert_eq!(bm.buffer.capacity(), cap);
        bm.set(7).unwrap();
        assert_eq!(bm.cardinality(), 1);
    }
}
