//! Bit tools for picking apart protocol words

use num_traits::{PrimInt, Unsigned};
use std::ops::{BitAndAssign, BitOrAssign};

/// Bitwise set/clear/check and field extraction for unsigned words
pub trait BitOps: PrimInt + BitAndAssign + BitOrAssign + Unsigned {
    fn set(&mut self, b: usize);
    fn clear(&mut self, b: usize);
    fn change(&mut self, b: usize, x: bool);
    fn check(self, b: usize) -> bool;
    /// Extract `width` bits starting at bit `lo`
    fn field(self, lo: usize, width: usize) -> Self;
}

macro_rules! impl_bitops {
    ($($t:ty),*) => {$(
        impl BitOps for $t {
            #[inline]
            fn set(&mut self, b: usize) {
                *self |= 1 << b;
            }

            #[inline]
            fn clear(&mut self, b: usize) {
                *self &= !(1 << b);
            }

            #[inline]
            fn change(&mut self, b: usize, x: bool) {
                *self = (*self & !(1 << b)) | ((x as $t) << b);
            }

            #[inline]
            fn check(self, b: usize) -> bool {
                self >> b & 1 == 1
            }

            #[inline]
            fn field(self, lo: usize, width: usize) -> Self {
                if width >= <$t>::BITS as usize {
                    self >> lo
                } else {
                    (self >> lo) & (((1 as $t) << width) - 1)
                }
            }
        }
    )*};
}

impl_bitops!(u8, u16, u32);

/// Sign-extend the low `width` bits of `raw` into an `i32`
#[inline]
pub fn sign_extend(raw: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((raw << shift) as i32) >> shift
}
