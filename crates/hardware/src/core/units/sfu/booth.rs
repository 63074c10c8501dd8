//! Radix-4 Booth multiplier emulation.
//!
//! The hardware evaluates `c1 * u` and `c2 * u^2` with truncated Booth
//! partial-product arrays. Each partial product is cut below a fixed column
//! before accumulation, and negative partial products receive the
//! hardware's compensation constant. The quirks are kept bit-exact because
//! the final rounding depends on them.

/// Number of Booth digits used for the `c1 * u` product.
pub const C1_DIGITS: usize = 12;

/// Number of Booth digits used for the `c2 * u^2` product.
pub const C2_DIGITS: usize = 19;

/// Maps a 3-bit Booth window onto its partial-product multiplier.
///
/// Window `0b111` encodes `-0` in hardware and is reported as `-3` so that
/// the sign survives; the multiplier treats it as zero.
const fn booth_digit(window: u64) -> i64 {
    match window & 0b111 {
        0 => 0,
        1 | 2 => 1,
        3 => 2,
        4 => -2,
        5 | 6 => -1,
        _ => -3,
    }
}

/// Recodes `m` into `n` radix-4 Booth digits, least significant first.
pub fn booth_digits(m: u64, n: usize) -> Vec<i64> {
    let mut out = Vec::with_capacity(n);
    out.push(booth_digit((m & 0b11) << 1));
    for i in 0..n.saturating_sub(1) {
        let window = (m & (0b1110 << (2 * i))) >> (2 * i + 1);
        out.push(booth_digit(window));
    }
    out
}

/// Clears the `n` low bits of `x`. Negative `n` leaves `x` untouched.
#[inline]
pub const fn cut_bit(x: i64, n: i32) -> i64 {
    if n >= 0 { x & (!0i64 << n) } else { x }
}

/// Squares `x` and drops the six low bits of the product.
#[inline]
pub const fn square_cut_6_bit(x: u64) -> u64 {
    (x.wrapping_mul(x) & !0x3f) >> 6
}

/// Accumulates the truncated partial products of `mul0 * digits`.
///
/// `weight` is the binary exponent of the coefficient, `coeff_negative`
/// its sign, and `second_order` selects the `c2` array geometry.
pub fn booth_mul(mul0: i64, digits: &[i64], weight: i32, coeff_negative: bool, second_order: bool) -> i64 {
    let (point, cut_num, rows) = if second_order {
        let wf = weight - 34;
        let point = -wf + 15 - 1 - 40;
        (point, 34 - point, C2_DIGITS - 1)
    } else {
        let wf = weight - 20;
        let point = -wf + 22 - 2 - 40;
        (point, 13 - point, C1_DIGITS - 1)
    };

    let mut result = 0i64;
    for (i, &digit) in digits.iter().take(rows).enumerate() {
        let digit_negative = digit < 0;
        let booth = if digit == -3 { 0 } else { digit };
        let position = point - 2 * i as i32;
        let position_com = position + cut_num;

        let t = (mul0 << (2 * i)).wrapping_mul(booth);
        let base = cut_bit(t, point);
        let base_neg = cut_bit(t.wrapping_neg(), point);

        let term = if coeff_negative == digit_negative {
            base
        } else if position > 0 || position_com > 0 {
            ((1i64 << point) + base_neg).wrapping_neg()
        } else {
            base_neg.wrapping_neg()
        };
        result = result.wrapping_add(term);
    }
    result
}

/// First-order product `c1 * u`.
pub fn booth_c1(c1: i64, u: u64, weight: i32) -> i64 {
    booth_mul(c1, &booth_digits(u, C1_DIGITS), weight, c1 < 0, false)
}

/// Second-order product `c2 * u^2`, using the truncated square of `u`.
pub fn booth_c2(c2: i64, u: u64, weight: i32) -> i64 {
    booth_mul(c2, &booth_digits(square_cut_6_bit(u), C2_DIGITS), weight, c2 <= 0, true)
}
