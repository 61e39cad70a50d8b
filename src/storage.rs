//! Output sinks for encoded word streams.
//!
//! The Boolean kernels and the cursor bulk-copy routines do not write into a
//! bitmap directly; they emit through [`BitmapStorage`], which has exactly two
//! implementors: [`Ewah`](crate::Ewah) itself (materializes the stream) and
//! [`BitCounter`] (discards the words and keeps only their popcount, for the
//! `*_cardinality` operators).

use crate::bitmap::EwahError;
use crate::popcount::popcount;
use crate::rlw::WORD_IN_BITS;

/// Receiver of an encoded word stream.
///
/// Words arrive in uncompressed order, as literal slices, negated literal
/// slices, or runs of empty (all-zero / all-one) words. `set_size_in_bits`
/// is the final sub-word trim of the last emitted word.
pub trait BitmapStorage {
    /// Append one word, folding all-zero / all-one words into runs.
    fn add(&mut self, word: u64);

    /// Append `words` verbatim as literals.
    fn add_stream_of_literal_words(&mut self, words: &[u64]);

    /// Append `count` empty words of the given polarity.
    fn add_stream_of_empty_words(&mut self, polarity: bool, count: u64);

    /// Append `words` with every bit inverted.
    fn add_stream_of_negated_literal_words(&mut self, words: &[u64]);

    /// Adjust the total bit size within the last word.
    fn set_size_in_bits(&mut self, bits: u64) -> Result<(), EwahError>;
}

/// Sink that tallies set bits and discards everything else.
///
/// Lets `a.and_cardinality(b)` run the AND kernel without allocating the
/// result bitmap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BitCounter {
    ones: u64,
}

impl BitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total set bits seen so far.
    pub fn count(&self) -> u64 {
        self.ones
    }
}

impl BitmapStorage for BitCounter {
    fn add(&mut self, word: u64) {
        self.ones += u64::from(popcount(word));
    }

    fn add_stream_of_literal_words(&mut self, words: &[u64]) {
        for &w in words {
            self.add(w);
        }
    }

    fn add_stream_of_empty_words(&mut self, polarity: bool, count: u64) {
        if polarity {
            self.ones += count * WORD_IN_BITS;
        }
    }

    fn add_stream_of_negated_literal_words(&mut self, words: &[u64]) {
        for &w in words {
            self.add(!w);
        }
    }

    fn set_size_in_bits(&mut self, _bits: u64) -> Result<(), EwahError> {
        Ok(())
    }
}
