/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Four random u64 values, used when no seeds are supplied.
pub const DEFAULT_SEEDS: [u64; 4] = [
    0b1001000111000101101010110011110011101011111111010101101001110001,
    0b0000011010111010001001010011101110011101110110001001011111001101,
    0b1000000000010101101101011110010110011100110000100111010111101001,
    0b1111100011110100001001111111110001010100000100011101111001010011,
];

/// A pseudo-random number generator using the "xoshiro256**" algorithm.
///
/// Every step is a `const fn`, so tables built from it can be computed at compile time.
/// See <https://prng.di.unimi.it/xoshiro256starstar.c>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XoShiRo([u64; 4]);

impl XoShiRo {
    /// Construct a new pseudo-random number generator from [`DEFAULT_SEEDS`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self::from_seeds(DEFAULT_SEEDS)
    }

    /// Construct a new pseudo-random number generator from your own seeds.
    ///
    /// The seeds are expanded through SplitMix64 first, so small or repetitive seeds
    /// (and the all-zero seed, a fixed point of xoshiro) still give a well-mixed state.
    #[inline(always)]
    pub const fn from_seeds(seeds: [u64; 4]) -> Self {
        let mut state = 0;
        let mut s = [0; 4];

        let mut i = 0;
        while i < s.len() {
            let (mixed, next) = splitmix64(state ^ seeds[i]);
            s[i] = mixed;
            state = next;
            i += 1;
        }

        Self(s)
    }

    /// Returns the next number in the sequence along with the advanced generator.
    ///
    /// # Example
    /// ```
    /// # use rotor::XoShiRo;
    /// let (a, prng) = XoShiRo::new().get_next_const();
    /// let (b, _) = prng.get_next_const();
    /// assert_ne!(a, b);
    /// ```
    #[inline(always)]
    pub const fn get_next_const(self) -> (u64, Self) {
        let (result, s) = Self::xoshiro(self.0);
        (result, Self(s))
    }

    const fn xoshiro(mut s: [u64; 4]) -> (u64, [u64; 4]) {
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;

        s[3] = s[3].rotate_left(45);
        (result, s)
    }
}

/// One step of SplitMix64, returning the output and the advanced state.
///
/// See <https://prng.di.unimi.it/splitmix64.c>
const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    (z ^ (z >> 31), state)
}

impl Default for XoShiRo {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
