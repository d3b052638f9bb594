//! Float-to-integer conversion core (FCVT.W.S family)
//!
//! The conversion works on an exact 64-bit fixed-point image of the
//! significand: the implicit leading one at bit 63, the 23 explicit mantissa
//! bits directly below it. For an unbiased exponent `e` the represented value
//! is `significand64 * 2^(e - 63)`, so a single right shift by `63 - e`
//! yields the integer part, and the shifted-out low bits are exactly the
//! discarded fraction. Integer bits and fraction bits live in separately
//! typed fields of [`FixedSplit`]; exactness and tie decisions read only the
//! fraction side.

use std::cmp::Ordering;

use serde::{Serialize, Deserialize};

use crate::decode::{FloatBits, FloatClass};
use crate::fpu::{FFlags, RoundingMode};
use crate::target::IntTarget;

/// Result of one conversion: the register image of the integer and the
/// flags this conversion asserts. Flags are never cleared here; the caller
/// accumulates them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ConversionResult {
    /// 64-bit two's-complement image of the target-width result,
    /// sign-extended for 32-bit targets
    pub value: u64,
    pub flags: FFlags,
}

/// Fraction bits discarded by the truncating shift, in their own scale:
/// `width` bits, of which the top one is the halves place.
#[derive(Clone, Copy, Debug)]
struct Remainder {
    bits: u64,
    width: u32,
}

impl Remainder {
    fn is_zero(&self) -> bool {
        self.bits == 0
    }

    /// Three-way comparison against one half. Callers only reach this with
    /// a non-zero remainder, so `width >= 1` holds.
    fn cmp_half(&self) -> Ordering {
        let half = 1u64 << (self.width - 1);
        self.bits.cmp(&half)
    }
}

/// Integer/fraction split of the fixed-point significand. Produced by the
/// one shift-and-mask step in [`split_significand`]; everything downstream
/// consumes the named halves instead of re-deriving bit ranges.
#[derive(Clone, Copy, Debug)]
struct FixedSplit {
    truncated: u64,
    remainder: Remainder,
}

/// Fixed-point significand: implicit one at bit 63, mantissa at bits 62..40
fn significand64(mantissa: u32) -> u64 {
    (1u64 << 63) | ((mantissa as u64) << 40)
}

/// Truncate toward zero by `shift` (0..=63) bits. The integer part is the
/// shifted value; the remainder is the low `shift` bits of the unshifted
/// significand, i.e. exactly what the shift discarded.
fn split_significand(significand: u64, shift: u32) -> FixedSplit {
    debug_assert!(shift <= 63);
    let mask = (1u64 << shift) - 1;
    FixedSplit {
        truncated: significand >> shift,
        remainder: Remainder { bits: significand & mask, width: shift },
    }
}

/// Split for magnitudes below one (negative unbiased exponent, including
/// every subnormal): the integer part is zero and the whole value is
/// fraction. The fraction collapses to a two-bit guard/sticky remainder
/// that preserves the below/at/above-half distinction the rounding step
/// needs.
fn split_below_one(unbiased_exponent: i32, mantissa: u32) -> FixedSplit {
    let bits = if unbiased_exponent == -1 {
        // value in [0.5, 1): exactly half iff the mantissa is empty
        if mantissa == 0 { 0b10 } else { 0b11 }
    } else {
        // value in (0, 0.5): non-zero sticky below half
        0b01
    };
    FixedSplit {
        truncated: 0,
        remainder: Remainder { bits, width: 2 },
    }
}

/// Round the truncated magnitude per the mode, returning the rounded
/// magnitude and whether anything was discarded. A non-zero remainder
/// implies `shift >= 1`, so `truncated <= 2^63 - 1` and the increment
/// cannot wrap.
fn round_magnitude(mode: RoundingMode, negative: bool, split: FixedSplit) -> (u64, bool) {
    if split.remainder.is_zero() {
        return (split.truncated, false);
    }
    let t = split.truncated;
    let rounded = match mode {
        RoundingMode::RTZ => t,
        RoundingMode::RDN => if negative { t + 1 } else { t },
        RoundingMode::RUP => if negative { t } else { t + 1 },
        RoundingMode::RNE => match split.remainder.cmp_half() {
            Ordering::Less => t,
            Ordering::Greater => t + 1,
            // exact tie: choose the even neighbour
            Ordering::Equal => t + (t & 1),
        },
        RoundingMode::RMM => match split.remainder.cmp_half() {
            Ordering::Less => t,
            // ties go away from zero
            Ordering::Greater | Ordering::Equal => t + 1,
        },
    };
    (rounded, true)
}

/// Saturated result for a magnitude the target cannot hold. Overflow is
/// reported as invalid alone: the inexactness of a clamped conversion is
/// not additionally flagged.
fn overflow(negative: bool, target: IntTarget) -> ConversionResult {
    ConversionResult {
        value: if negative { target.min_bits() } else { target.max_bits() },
        flags: FFlags::invalid(),
    }
}

/// Range-check and sign the rounded magnitude
fn apply_sign(negative: bool, magnitude: u64, inexact: bool, target: IntTarget) -> ConversionResult {
    let limit = if negative { target.max_negative_magnitude() } else { target.max_magnitude() };
    if magnitude > limit {
        return overflow(negative, target);
    }
    let value = if negative { magnitude.wrapping_neg() } else { magnitude };
    let flags = if inexact { FFlags::inexact() } else { FFlags::default() };
    ConversionResult { value, flags }
}

/// Convert a decoded binary32 value to an integer under the given rounding
/// mode. Pure and total: every input pattern has a defined result, and
/// "errors" are expressed only through the returned flags.
///
/// NaN (quiet or signaling) saturates to the target maximum with the
/// invalid flag, matching the RISC-V FCVT convention; ±infinity saturates
/// by sign.
pub fn convert(bits: FloatBits, mode: RoundingMode, target: IntTarget) -> ConversionResult {
    let negative = bits.sign();
    match bits.classify() {
        FloatClass::Nan => ConversionResult {
            value: target.max_bits(),
            flags: FFlags::invalid(),
        },
        FloatClass::Infinity => overflow(negative, target),
        FloatClass::Zero => ConversionResult {
            value: 0,
            flags: FFlags::default(),
        },
        FloatClass::Subnormal => {
            // magnitude below 2^-126: integer part zero, sticky fraction
            let split = FixedSplit {
                truncated: 0,
                remainder: Remainder { bits: 0b01, width: 2 },
            };
            let (magnitude, inexact) = round_magnitude(mode, negative, split);
            apply_sign(negative, magnitude, inexact, target)
        }
        FloatClass::Normal => {
            let e = bits.unbiased_exponent();
            if e > 63 {
                // integral, but at least 2^64: cannot fit any target
                return overflow(negative, target);
            }
            let split = if e < 0 {
                split_below_one(e, bits.mantissa())
            } else {
                split_significand(significand64(bits.mantissa()), (63 - e) as u32)
            };
            let (magnitude, inexact) = round_magnitude(mode, negative, split);
            apply_sign(negative, magnitude, inexact, target)
        }
    }
}

/// f32 to i32 conversion (FCVT.W.S)
pub fn f32_to_i32(a: u32, rm: RoundingMode) -> (i32, FFlags) {
    let r = convert(FloatBits::decode(a), rm, IntTarget::I32);
    (r.value as i32, r.flags)
}

/// f32 to u32 conversion (FCVT.WU.S)
pub fn f32_to_u32(a: u32, rm: RoundingMode) -> (u32, FFlags) {
    let r = convert(FloatBits::decode(a), rm, IntTarget::U32);
    (r.value as u32, r.flags)
}

/// f32 to i64 conversion (FCVT.L.S)
pub fn f32_to_i64(a: u32, rm: RoundingMode) -> (i64, FFlags) {
    let r = convert(FloatBits::decode(a), rm, IntTarget::I64);
    (r.value as i64, r.flags)
}

/// f32 to u64 conversion (FCVT.LU.S)
pub fn f32_to_u64(a: u32, rm: RoundingMode) -> (u64, FFlags) {
    let r = convert(FloatBits::decode(a), rm, IntTarget::U64);
    (r.value, r.flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_discarded_bits_separate() {
        // -1.1: exponent field 127 (unbiased 0), mantissa 0x0CCCCD.
        // Shifting by 63 leaves integer part 1; the remainder must be the
        // mantissa image itself, not any slice of the integer bits.
        let sig = significand64(0x0CCCCD);
        let split = split_significand(sig, 63);
        assert_eq!(split.truncated, 1);
        assert_eq!(split.remainder.bits, (0x0CCCCD_u64) << 40);
        assert_eq!(split.remainder.width, 63);
        assert!(!split.remainder.is_zero());
    }

    #[test]
    fn test_split_reconstructs_significand() {
        let sig = significand64(0x5A5A5A);
        for shift in 0..=63 {
            let split = split_significand(sig, shift);
            assert_eq!((split.truncated << shift) | split.remainder.bits, sig);
            if shift > 0 {
                assert!(split.remainder.bits < (1u64 << shift));
            }
        }
    }

    #[test]
    fn test_split_zero_shift_is_exact() {
        let sig = significand64(0x7FFFFF);
        let split = split_significand(sig, 0);
        assert_eq!(split.truncated, sig);
        assert!(split.remainder.is_zero());
    }

    #[test]
    fn test_remainder_half_comparison() {
        // 1.5: mantissa 0x400000, shift 63 puts the half bit at the top of
        // the remainder
        let split = split_significand(significand64(0x400000), 63);
        assert_eq!(split.remainder.cmp_half(), Ordering::Equal);
        // 1.25 is below half, 1.75 above
        let below = split_significand(significand64(0x200000), 63);
        assert_eq!(below.remainder.cmp_half(), Ordering::Less);
        let above = split_significand(significand64(0x600000), 63);
        assert_eq!(above.remainder.cmp_half(), Ordering::Greater);
    }

    #[test]
    fn test_round_magnitude_ties() {
        let tie = split_significand(significand64(0x400000), 63); // 1.5
        assert_eq!(round_magnitude(RoundingMode::RNE, false, tie), (2, true));
        assert_eq!(round_magnitude(RoundingMode::RMM, false, tie), (2, true));
        assert_eq!(round_magnitude(RoundingMode::RTZ, false, tie), (1, true));
        assert_eq!(round_magnitude(RoundingMode::RUP, false, tie), (2, true));
        assert_eq!(round_magnitude(RoundingMode::RDN, false, tie), (1, true));
        assert_eq!(round_magnitude(RoundingMode::RDN, true, tie), (2, true));
    }

    #[test]
    fn test_round_magnitude_exact_passthrough() {
        let exact = split_significand(significand64(0), 62); // 2.0
        for mode in [
            RoundingMode::RNE,
            RoundingMode::RTZ,
            RoundingMode::RDN,
            RoundingMode::RUP,
            RoundingMode::RMM,
        ] {
            assert_eq!(round_magnitude(mode, false, exact), (2, false));
        }
    }

    #[test]
    fn test_split_below_one_guard_sticky() {
        // 0.5 exactly: at half
        let half = split_below_one(-1, 0);
        assert_eq!(half.remainder.cmp_half(), Ordering::Equal);
        // 0.75: above half
        let above = split_below_one(-1, 0x400000);
        assert_eq!(above.remainder.cmp_half(), Ordering::Greater);
        // 0.25: below half
        let below = split_below_one(-2, 0);
        assert_eq!(below.remainder.cmp_half(), Ordering::Less);
        assert!(!below.remainder.is_zero());
    }
}
