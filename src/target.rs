//! Destination integer types for conversions
//!
//! The four targets of the FCVT family: signed/unsigned, 32/64-bit.
//! Saturation values are kept as 64-bit two's-complement register images
//! (sign-extended for the 32-bit targets).

use serde::{Serialize, Deserialize};

/// Destination integer type and its representable range
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum IntTarget {
    I32,
    U32,
    I64,
    U64,
}

impl IntTarget {
    /// Build a target from a width/signedness pair. Panics on a width
    /// outside {32, 64}: that is a caller programming error, not an input
    /// condition, and must fail fast.
    pub fn new(width: u32, signed: bool) -> Self {
        match (width, signed) {
            (32, true) => IntTarget::I32,
            (32, false) => IntTarget::U32,
            (64, true) => IntTarget::I64,
            (64, false) => IntTarget::U64,
            _ => panic!("unsupported conversion target width: {}", width),
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            IntTarget::I32 | IntTarget::U32 => 32,
            IntTarget::I64 | IntTarget::U64 => 64,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, IntTarget::I32 | IntTarget::I64)
    }

    /// Largest representable magnitude for a non-negative result
    pub fn max_magnitude(&self) -> u64 {
        match self {
            IntTarget::I32 => i32::MAX as u64,
            IntTarget::U32 => u32::MAX as u64,
            IntTarget::I64 => i64::MAX as u64,
            IntTarget::U64 => u64::MAX,
        }
    }

    /// Largest representable magnitude for a negative result
    /// (0 for the unsigned targets)
    pub fn max_negative_magnitude(&self) -> u64 {
        match self {
            IntTarget::I32 => 1 << 31,
            IntTarget::I64 => 1 << 63,
            IntTarget::U32 | IntTarget::U64 => 0,
        }
    }

    /// Register image of the maximum value (positive saturation, and the
    /// NaN result by convention)
    pub fn max_bits(&self) -> u64 {
        match self {
            IntTarget::I32 => i32::MAX as i64 as u64,
            IntTarget::U32 => u32::MAX as u64,
            IntTarget::I64 => i64::MAX as u64,
            IntTarget::U64 => u64::MAX,
        }
    }

    /// Register image of the minimum value (negative saturation),
    /// sign-extended to 64 bits for the 32-bit targets
    pub fn min_bits(&self) -> u64 {
        match self {
            IntTarget::I32 => i32::MIN as i64 as u64,
            IntTarget::I64 => i64::MIN as u64,
            IntTarget::U32 | IntTarget::U64 => 0,
        }
    }
}
