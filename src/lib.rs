//! RISC-V single-precision float-to-integer conversion
//!
//! A software rendition of the FCVT.W.S instruction family with bit-exact
//! IEEE-754 flag semantics, usable from a simulator's execute stage or from
//! JavaScript through WebAssembly. The core is a pure function over a raw
//! binary32 pattern, a rounding mode and an integer target; the wasm-facing
//! [`FcvtUnit`] adds the sticky fflags accumulation an embedder expects.

use wasm_bindgen::prelude::*;

pub mod convert;
pub mod decode;
pub mod fpu;
pub mod target;

pub use convert::{convert, f32_to_i32, f32_to_i64, f32_to_u32, f32_to_u64, ConversionResult};
pub use decode::{f32_classify, f32_is_nan, f32_is_snan, FloatBits, FloatClass, F32_CANONICAL_NAN};
pub use fpu::{FFlags, FpStatus, RoundingMode, RM_DYNAMIC};
pub use target::IntTarget;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Log to browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(s: &str) {
    println!("LOG: {}", s);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn error(s: &str) {
    eprintln!("ERROR: {}", s);
}

/// Helper macro for console logging
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_error {
    ($($t:tt)*) => (crate::error(&format!($($t)*)))
}

/// Conversion unit with sticky flag state, exposed to JavaScript
///
/// Wraps [`FpStatus`] so repeated conversions OR their exception flags into
/// one fflags image, the way an F-extension CSR file accumulates them.
/// Rounding modes are passed as raw 3-bit `rm` fields; 0b111 selects the
/// dynamic mode held in frm.
#[wasm_bindgen]
pub struct FcvtUnit {
    status: FpStatus,
}

#[wasm_bindgen]
impl FcvtUnit {
    /// Create a unit with frm = RNE and no flags raised
    #[wasm_bindgen(constructor)]
    pub fn new() -> FcvtUnit {
        console_log!("Creating FCVT unit (frm=RNE)");
        FcvtUnit { status: FpStatus::new() }
    }

    /// FCVT.W.S: convert to signed 32-bit
    pub fn fcvt_w_s(&mut self, bits: u32, rm: u32) -> Result<i32, JsValue> {
        let mode = self.resolve_rm(rm)?;
        let (value, flags) = f32_to_i32(bits, mode);
        self.status.accumulate(flags);
        Ok(value)
    }

    /// FCVT.WU.S: convert to unsigned 32-bit
    pub fn fcvt_wu_s(&mut self, bits: u32, rm: u32) -> Result<u32, JsValue> {
        let mode = self.resolve_rm(rm)?;
        let (value, flags) = f32_to_u32(bits, mode);
        self.status.accumulate(flags);
        Ok(value)
    }

    /// FCVT.L.S: convert to signed 64-bit
    pub fn fcvt_l_s(&mut self, bits: u32, rm: u32) -> Result<i64, JsValue> {
        let mode = self.resolve_rm(rm)?;
        let (value, flags) = f32_to_i64(bits, mode);
        self.status.accumulate(flags);
        Ok(value)
    }

    /// FCVT.LU.S: convert to unsigned 64-bit
    pub fn fcvt_lu_s(&mut self, bits: u32, rm: u32) -> Result<u64, JsValue> {
        let mode = self.resolve_rm(rm)?;
        let (value, flags) = f32_to_u64(bits, mode);
        self.status.accumulate(flags);
        Ok(value)
    }

    /// FCLASS.S: 10-bit classification mask
    pub fn classify(&self, bits: u32) -> u32 {
        f32_classify(bits)
    }

    /// Accumulated fflags bits
    pub fn fflags(&self) -> u32 {
        self.status.fflags.to_bits()
    }

    pub fn read_fcsr(&self) -> u32 {
        self.status.read_fcsr()
    }

    pub fn write_fcsr(&mut self, value: u32) {
        self.status.write_fcsr(value);
    }

    pub fn reset(&mut self) {
        self.status.reset();
    }

    fn resolve_rm(&self, rm: u32) -> Result<RoundingMode, JsValue> {
        self.status
            .effective_rm(rm)
            .ok_or_else(|| JsValue::from_str("reserved rounding mode encoding"))
    }
}

impl Default for FcvtUnit {
    fn default() -> Self {
        FcvtUnit::new()
    }
}

/// One-shot conversion returning `{value, flags}` as a JS object
///
/// `width` must be 32 or 64; the rounding mode must be a concrete encoding
/// (the dynamic mode has no frm to resolve against here).
#[wasm_bindgen]
pub fn convert_detail(bits: u32, rm: u32, width: u32, signed: bool) -> Result<JsValue, JsValue> {
    let mode = RoundingMode::from_bits(rm)
        .ok_or_else(|| JsValue::from_str("reserved or dynamic rounding mode encoding"))?;
    if width != 32 && width != 64 {
        return Err(JsValue::from_str("conversion width must be 32 or 64"));
    }
    let result = convert(FloatBits::decode(bits), mode, IntTarget::new(width, signed));
    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
