// Seeded random source for puzzle and question generation.
//
// This is NOT cryptographically secure. It only has to make children's
// arithmetic drills look random and make every board reproducible from a seed.

/// Anything that can hand out uniformly distributed `u32`s.
///
/// Generators take `&mut impl RandomSource` so tests can substitute a
/// scripted source and assert exact board contents.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform integer in `[low, high]` (both inclusive).
    fn gen_range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = (high - low) as u64 + 1;
        low + (self.next_u32() as u64 % span) as u32
    }

    /// Index in `[0, len)`; `0` for an empty range.
    fn gen_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_u32() as usize) % len
    }

    fn coin(&mut self) -> bool {
        self.next_u32() & 1 == 0
    }

    /// Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_index(i + 1);
            items.swap(i, j);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}

impl RandomSource for Prng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

/// Replays a fixed list of raw values, cycling when exhausted.
///
/// Handy when a caller needs an exact board: with `gen_range_inclusive(1, m)`
/// a raw value `v` lands on `1 + v % m`.
#[derive(Debug, Clone)]
pub struct Scripted {
    values: Vec<u32>,
    idx: usize,
}

impl Scripted {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, idx: 0 }
    }
}

impl RandomSource for Scripted {
    fn next_u32(&mut self) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let v = self.values[self.idx % self.values.len()];
        self.idx = self.idx.wrapping_add(1);
        v
    }
}
