//! Shared test support: a dense bit-vector oracle and a deterministic
//! pseudo-random walker. Pulled into the e2e suites by `mod` inclusion —
//! this file is not a test target itself.

// Each suite uses the slice of this module it needs.
#![allow(dead_code)]

/// Uncompressed bit vector with the same observable surface as the
/// compressed bitmap. Slow and simple on purpose: every compressed-domain
/// result is checked against the answer computed the obvious way.
pub struct DenseBitmap {
    words: Vec<u64>,
    bits: u64,
}

impl DenseBitmap {
    pub fn new() -> Self {
        DenseBitmap {
            words: Vec::new(),
            bits: 0,
        }
    }

    pub fn set(&mut self, i: u64) {
        let word = (i / 64) as usize;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (i % 64);
        if i + 1 > self.bits {
            self.bits = i + 1;
        }
    }

    pub fn get(&self, i: u64) -> bool {
        if i >= self.bits {
            return false;
        }
        let word = (i / 64) as usize;
        self.words[word] & (1 << (i % 64)) != 0
    }

    pub fn size_in_bits(&self) -> u64 {
        self.bits
    }

    pub fn cardinality(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    fn zip(&self, other: &DenseBitmap, f: impl Fn(u64, u64) -> u64) -> DenseBitmap {
        let bits = self.bits.max(other.bits);
        let len = self.words.len().max(other.words.len());
        let mut words = Vec::with_capacity(len);
        for k in 0..len {
            let a = self.words.get(k).copied().unwrap_or(0);
            let b = other.words.get(k).copied().unwrap_or(0);
            words.push(f(a, b));
        }
        DenseBitmap { words, bits }
    }

    pub fn and(&self, other: &DenseBitmap) -> DenseBitmap {
        self.zip(other, |a, b| a & b)
    }

    pub fn or(&self, other: &DenseBitmap) -> DenseBitmap {
        self.zip(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &DenseBitmap) -> DenseBitmap {
        self.zip(other, |a, b| a ^ b)
    }

    pub fn and_not(&self, other: &DenseBitmap) -> DenseBitmap {
        self.zip(other, |a, b| a & !b)
    }

    pub fn not(&mut self) {
        for w in &mut self.words {
            *w = !*w;
        }
        let tail = self.bits % 64;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= !0u64 >> (64 - tail);
            }
        }
    }
}

/// xorshift64 walker; deterministic across platforms, seeded per suite.
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        XorShift64 {
            state: if seed == 0 { 0x9e37_79b9 } else { seed },
        }
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Ascending bit positions: `count` strides of `1 + (next() mod max_stride)`.
pub fn random_walk_bits(seed: u64, count: usize, max_stride: u64) -> Vec<u64> {
    let mut rng = XorShift64::new(seed);
    let mut bit = 0u64;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        bit += 1 + rng.next() % max_stride;
        out.push(bit);
    }
    out
}
