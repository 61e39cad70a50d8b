//! EWAH compressed bitmaps.
//!
//! An [`Ewah`] represents a long bit vector by run-length encoding streams of
//! identical 64-bit words (all-zero or all-one) while keeping non-uniform
//! "literal" words verbatim, and performs Boolean set algebra — AND, OR, XOR,
//! AND-NOT, NOT — directly on that compressed form, never materializing the
//! uncompressed vector.
//!
//! Bits are set in ascending order only; reads are word-aligned with a
//! cursor finger so ascending `get`s amortize to O(1) marker transitions.
//!
//! ```
//! use ewah::Ewah;
//!
//! let mut a = Ewah::new();
//! a.set(10)?.set(70)?.set(100)?;
//! let mut b = Ewah::new();
//! b.set(100)?.set(15_000)?;
//!
//! assert_eq!(a.and(&b).cardinality(), 1);
//! assert_eq!(a.or(&b).cardinality(), 4);
//! assert_eq!(a.and_cardinality(&b), 1);
//! # Ok::<(), ewah::EwahError>(())
//! ```

pub mod bitmap;
pub mod popcount;
pub mod rlw;
pub mod storage;

mod cursor;
mod ops;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level re-exports for the common entry points
// ─────────────────────────────────────────────────────────────────────────────

/// The compressed bitmap.
pub use bitmap::Ewah;
/// Error type for bitmap mutations.
pub use bitmap::EwahError;
/// Highest bit index `set` accepts.
pub use bitmap::SET_INDEX_MAX;

/// Sink abstraction the Boolean kernels emit into.
pub use storage::BitmapStorage;
/// Popcount-only sink backing the `*_cardinality` operators.
pub use storage::BitCounter;

/// Branch-free 64-bit Hamming weight.
pub use popcount::popcount;
