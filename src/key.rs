//! Order preserving projection of scalar keys onto unsigned integers.
//!
//! Every sort in this crate works on the unsigned bit pattern of a key. The projection keeps the
//! relative order of the original type, `a < b` holds exactly when
//! `a.to_ordered() < b.to_ordered()` under unsigned integer order.

/// Unsigned integer a key is projected onto. The digits of a sort are cut out of this value.
pub trait RadixKey: Copy + Send + Sync + 'static {
    /// Width of the key in bits.
    const BITS: u32;

    /// Logical right shift. Shifting by `BITS` or more yields zero.
    fn shr(self, bits: u32) -> Self;

    /// The low 32 bits of the key.
    fn low_u32(self) -> u32;
}

macro_rules! radix_key_impl {
    ($($t:ty)*) => ($(
        impl RadixKey for $t {
            const BITS: u32 = <$t>::BITS;

            #[inline(always)]
            fn shr(self, bits: u32) -> Self {
                self.checked_shr(bits).unwrap_or(0)
            }

            #[inline(always)]
            fn low_u32(self) -> u32 {
                self as u32
            }
        }
    )*)
}

radix_key_impl! { u8 u16 u32 u64 u128 }

/// Scalar types that can be sorted by their projected unsigned bit pattern.
pub trait Ordered: Copy {
    type Unsigned: RadixKey;

    /// Maps the value to an unsigned integer of the same width, preserving order.
    fn to_ordered(self) -> Self::Unsigned;
}

// Unsigned integers are already ordered by their bit pattern.
macro_rules! ordered_impl_unsigned {
    ($($t:ty)*) => ($( ordered_impl_unsigned!($t => $t); )*);
    ($t:ty => $unsigned:ty) => (
        impl Ordered for $t {
            type Unsigned = $unsigned;

            #[inline(always)]
            fn to_ordered(self) -> Self::Unsigned {
                self as $unsigned
            }
        }
    )
}

ordered_impl_unsigned! { u8 u16 u32 u64 u128 }

#[cfg(target_pointer_width = "16")]
ordered_impl_unsigned!(usize => u16);

#[cfg(target_pointer_width = "32")]
ordered_impl_unsigned!(usize => u32);

#[cfg(target_pointer_width = "64")]
ordered_impl_unsigned!(usize => u64);

ordered_impl_unsigned!(bool => u8);
ordered_impl_unsigned!(char => u32);

/// In two's complement negative values have the top bit set and end up after the positive ones
/// once reinterpreted as unsigned. Flipping the sign bit shifts `[-x, x)` onto `[0, 2x)`.
///
/// ```text
/// -128: 1000_0000    0000_0000
///   -1: 1111_1111    0111_1111
///    0: 0000_0000 -> 1000_0000
///    1: 0000_0001    1000_0001
///  127: 0111_1111    1111_1111
/// ```
macro_rules! ordered_impl_signed {
    ($($t:ty => $unsigned:ty),*) => ($(
        impl Ordered for $t {
            type Unsigned = $unsigned;

            #[inline(always)]
            fn to_ordered(self) -> Self::Unsigned {
                const SIGN_BIT: $unsigned = 1 << (<$unsigned>::BITS - 1);
                (self as $unsigned) ^ SIGN_BIT
            }
        }
    )*)
}

ordered_impl_signed! {
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
    i128 => u128
}

#[cfg(target_pointer_width = "16")]
ordered_impl_signed!(isize => u16);

#[cfg(target_pointer_width = "32")]
ordered_impl_signed!(isize => u32);

#[cfg(target_pointer_width = "64")]
ordered_impl_signed!(isize => u64);

/// IEEE 754 floats are sign-magnitude. Reinterpreted as unsigned, negative values come after the
/// positive ones and grow in the wrong direction. Complementing negative values and flipping the
/// sign bit of positive values turns this into one ascending unsigned order:
///
/// ```text
/// -inf < -1.0 < -0.0 < +0.0 < 1.0 < +inf
/// ```
///
/// `-0.0` lands right before `+0.0`. NaN values end up on the outside, after `+inf` when the sign
/// bit is clear and before `-inf` when it is set.
macro_rules! ordered_impl_float {
    ($($t:ty => $unsigned:ty),*) => ($(
        impl Ordered for $t {
            type Unsigned = $unsigned;

            #[inline(always)]
            fn to_ordered(self) -> Self::Unsigned {
                const SIGN_BIT: $unsigned = 1 << (<$unsigned>::BITS - 1);
                let bits = self.to_bits();

                if bits & SIGN_BIT != 0 {
                    !bits
                } else {
                    bits ^ SIGN_BIT
                }
            }
        }
    )*)
}

ordered_impl_float! {
    f32 => u32,
    f64 => u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_monotonic<T: Ordered + std::fmt::Debug>(ascending: &[T])
    where
        T::Unsigned: Ord + std::fmt::Debug,
    {
        for w in ascending.windows(2) {
            assert!(
                w[0].to_ordered() < w[1].to_ordered(),
                "{:?} -> {:?} is not below {:?} -> {:?}",
                w[0],
                w[0].to_ordered(),
                w[1],
                w[1].to_ordered()
            );
        }
    }

    #[test]
    fn unsigned_is_identity() {
        assert_eq!(0u8.to_ordered(), 0);
        assert_eq!(u32::MAX.to_ordered(), u32::MAX);
        assert_eq!(12345u64.to_ordered(), 12345);
        assert_eq!('a'.to_ordered(), 97);
        assert_eq!(true.to_ordered(), 1);
    }

    #[test]
    fn signed_flips_sign_bit() {
        assert_eq!(i8::MIN.to_ordered(), 0);
        assert_eq!((-1i8).to_ordered(), 0x7f);
        assert_eq!(0i8.to_ordered(), 0x80);
        assert_eq!(i8::MAX.to_ordered(), 0xff);

        assert_monotonic(&[i32::MIN, -100, -1, 0, 1, 100, i32::MAX]);
        assert_monotonic(&[i64::MIN, -1, 0, i64::MAX]);
        assert_monotonic(&[i128::MIN, -1, 0, i128::MAX]);
    }

    #[test]
    fn float_order() {
        assert_monotonic(&[
            f32::NEG_INFINITY,
            f32::MIN,
            -1.5,
            -f32::MIN_POSITIVE,
            -0.0,
            0.0,
            f32::MIN_POSITIVE,
            1.5,
            f32::MAX,
            f32::INFINITY,
        ]);
        assert_monotonic(&[f64::NEG_INFINITY, -2.0, -0.0, 0.0, 1e-300, f64::INFINITY]);

        // Adjacent, nothing fits in between.
        assert_eq!((-0.0f64).to_ordered() + 1, 0.0f64.to_ordered());
    }

    #[test]
    fn float_nan_outside() {
        let nan = f32::NAN;
        let neg_nan = -f32::NAN;

        assert!(nan.to_ordered() > f32::INFINITY.to_ordered());
        assert!(neg_nan.to_ordered() < f32::NEG_INFINITY.to_ordered());
    }

    #[test]
    fn shr_saturates_to_zero() {
        assert_eq!(0xabcdu16.shr(8), 0xab);
        assert_eq!(0xabcdu16.shr(16), 0);
        assert_eq!(u64::MAX.shr(200), 0);
        assert_eq!(0x1_0000_00ffu64.low_u32(), 0xff);
    }
}
