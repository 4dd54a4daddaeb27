use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for configuration, never in the tick loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Scale an integer amount of money by a fixed-point coefficient.
///
/// Works on the raw Q32.32 bits in 128-bit space so campaign-sized sums never
/// overflow the fixed-point range. Saturates at the `i64` bounds.
pub fn scale_money(amount: i64, coefficient: Fixed64) -> i64 {
    let scaled = (amount as i128 * coefficient.to_bits() as i128) >> 32;
    scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
