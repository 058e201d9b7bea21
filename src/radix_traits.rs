//! Digits and the per-sort digit layout.
//!
//! A radix sort is configured by two functions: Map turns an element into a scalar key, Radix
//! turns a projected key into its lowest digit. The width of that digit follows from the Radix
//! result type ([`Digit::WIDTH`]), and together with the width of the projected key it fixes how
//! many passes a sort needs. [`RadixTraits`] holds that layout and refuses layouts that would
//! silently drop key bits.

use std::marker::PhantomData;

use thiserror::Error;

use crate::key::{Ordered, RadixKey};

/// Widest digit a histogram is built for, `2^16` buckets.
pub const MAX_DIGIT_WIDTH: u32 = 16;

/// Value produced by a Radix function, the sort key of a single counting sort pass.
pub trait Digit: Copy {
    /// Number of significant bits. Every digit value is below `2^WIDTH`.
    const WIDTH: u32;

    /// The digit as a bucket index.
    fn index(self) -> usize;
}

impl Digit for u8 {
    const WIDTH: u32 = 8;

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl Digit for u16 {
    const WIDTH: u32 = 16;

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl Digit for bool {
    const WIDTH: u32 = 1;

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

/// A digit of `W` bits, for widths no primitive type has.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bits<const W: u32>(u32);

impl<const W: u32> Bits<W> {
    const MASK: u32 = if W >= u32::BITS {
        u32::MAX
    } else {
        (1 << W) - 1
    };

    /// Keeps the low `W` bits of `value`.
    #[inline(always)]
    pub const fn new(value: u32) -> Self {
        Self(value & Self::MASK)
    }

    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl<const W: u32> Digit for Bits<W> {
    const WIDTH: u32 = W;

    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The default Radix, the lowest 8 bits of the key.
#[inline(always)]
pub fn low_byte<U: RadixKey>(key: U) -> u8 {
    key.low_u32() as u8
}

/// The lowest `W` bits of the key.
#[inline(always)]
pub fn low_bits<const W: u32, U: RadixKey>(key: U) -> Bits<W> {
    Bits::new(key.low_u32())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("digit width must be at least one bit")]
    ZeroWidth,
    #[error("digit width of {width} bits exceeds the maximum of {max} bits")]
    TooWide { width: u32, max: u32 },
    #[error("digit width of {width} bits does not evenly divide a {key_bits} bit key")]
    UnevenSplit { key_bits: u32, width: u32 },
}

/// Digit layout of a radix sort.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RadixTraits {
    /// Width of the projected key.
    pub key_bits: u32,
    /// Width of one digit.
    pub digit_width: u32,
    /// Number of counting sort passes needed to cover the whole key.
    pub digit_count: u32,
    /// Number of distinct digit values, the histogram size of one pass.
    pub bucket_count: usize,
}

impl RadixTraits {
    pub const fn new(key_bits: u32, digit_width: u32) -> Result<Self, ConfigError> {
        if digit_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }

        if digit_width > MAX_DIGIT_WIDTH {
            return Err(ConfigError::TooWide {
                width: digit_width,
                max: MAX_DIGIT_WIDTH,
            });
        }

        if key_bits % digit_width != 0 {
            return Err(ConfigError::UnevenSplit {
                key_bits,
                width: digit_width,
            });
        }

        Ok(Self {
            key_bits,
            digit_width,
            digit_count: key_bits / digit_width,
            bucket_count: 1 << digit_width,
        })
    }

    /// Same as [`RadixTraits::new`], for constant evaluation where an invalid layout has to stop
    /// the build.
    pub const fn expect_valid(key_bits: u32, digit_width: u32) -> Self {
        match Self::new(key_bits, digit_width) {
            Ok(traits) => traits,
            Err(ConfigError::ZeroWidth) => panic!("digit width must be at least one bit"),
            Err(ConfigError::TooWide { .. }) => panic!("digit width exceeds MAX_DIGIT_WIDTH"),
            Err(ConfigError::UnevenSplit { .. }) => {
                panic!("digit width does not evenly divide the key width")
            }
        }
    }

    /// Shift that brings digit `digit_index` into the low bits of the key.
    #[inline(always)]
    pub const fn shift(&self, digit_index: u32) -> u32 {
        digit_index * self.digit_width
    }
}

/// Layout for a projected key type `U` and a digit type `D`, evaluated at compile time. Naming
/// `TraitsOf::<U, D>::TRAITS` for an invalid pair fails the build.
pub(crate) struct TraitsOf<U, D>(PhantomData<(U, D)>);

impl<U: RadixKey, D: Digit> TraitsOf<U, D> {
    pub(crate) const TRAITS: RadixTraits = RadixTraits::expect_valid(U::BITS, D::WIDTH);
}

/// Bucket index of `value` for the pass over digit `digit_index`.
#[inline(always)]
pub(crate) fn nth_digit<T, K, D, M, R>(
    traits: &RadixTraits,
    digit_index: u32,
    map: &M,
    radix: &R,
    value: &T,
) -> usize
where
    K: Ordered,
    D: Digit,
    M: Fn(&T) -> K,
    R: Fn(K::Unsigned) -> D,
{
    radix(map(value).to_ordered().shr(traits.shift(digit_index))).index()
}
