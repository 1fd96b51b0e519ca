//! Q15.16 fixed-point encoding of floats into 32-bit words.
//!
//! The renderer consumes signed 16.16 fixed-point words. Conversion rounds
//! in 64-bit arithmetic before narrowing, so results do not depend on
//! single-precision intermediates.

/// Scale factor between float and Q15.16 (2^16).
const SCALE: f64 = 65536.0;

/// Encode a float as a signed Q15.16 word.
///
/// Values outside the representable range wrap modulo 2^32 (two's
/// complement reinterpretation of the rounded 64-bit value).
#[inline]
pub fn to_fixed(val: f32) -> u32 {
    ((val as f64 * SCALE).round() as i64) as u32
}

/// Decode a signed Q15.16 word back into a float.
#[inline]
pub fn from_fixed(word: u32) -> f32 {
    (word as i32) as f32 / SCALE as f32
}
