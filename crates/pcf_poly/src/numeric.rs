//! Exact-to-float bridges and decimal rounding for big rationals.
//!
//! Precision is always an explicit argument; nothing here keeps global state.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

const LOG10_2: f64 = std::f64::consts::LOG10_2;

// f64 covers magnitudes up to ~2^1023
const F64_SAFE_BITS: u64 = 1000;

/// GCD of two rationals: gcd of numerators over lcm of denominators.
///
/// Always non-negative; `gcd(0, x) = |x|`.
pub fn rational_gcd(a: &BigRational, b: &BigRational) -> BigRational {
    if a.is_zero() {
        return b.abs();
    }
    if b.is_zero() {
        return a.abs();
    }
    let num = a.numer().gcd(b.numer());
    let den = a.denom().lcm(b.denom());
    BigRational::new(num, den)
}

pub fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), exp as usize)
}

fn pow10_rational(exp: i64) -> BigRational {
    if exp >= 0 {
        BigRational::from_integer(pow10(exp as u32))
    } else {
        BigRational::new(BigInt::one(), pow10((-exp) as u32))
    }
}

/// `log10 |x|`; `-inf` for zero. Large values are shifted down before the
/// float conversion so the result stays finite.
pub fn log10_bigint(x: &BigInt) -> f64 {
    let magnitude = x.abs();
    if magnitude.is_zero() {
        return f64::NEG_INFINITY;
    }
    let bits = magnitude.bits();
    if bits < F64_SAFE_BITS {
        return magnitude.to_f64().unwrap_or(f64::INFINITY).log10();
    }
    let shift = bits - 64;
    let top = (&magnitude >> (shift as usize)).to_f64().unwrap_or(f64::INFINITY);
    top.log10() + shift as f64 * LOG10_2
}

/// `log10 |x|` for a rational.
pub fn log10_rational(x: &BigRational) -> f64 {
    log10_bigint(x.numer()) - log10_bigint(x.denom())
}

/// Exact `floor(log10 |x|)`. `x` must be non-zero.
pub fn floor_log10(x: &BigRational) -> i64 {
    let magnitude = x.abs();
    let mut e = log10_rational(&magnitude).floor() as i64;
    // the float estimate can be off by one near powers of ten
    loop {
        if pow10_rational(e) > magnitude {
            e -= 1;
        } else if pow10_rational(e + 1) <= magnitude {
            e += 1;
        } else {
            return e;
        }
    }
}

/// Round to `digits` significant decimal digits (at least one), half away from zero.
pub fn round_significant(x: &BigRational, digits: u32) -> BigRational {
    if x.is_zero() {
        return BigRational::zero();
    }
    let digits = digits.max(1) as i64;
    let scale = pow10_rational(digits - 1 - floor_log10(x));
    (x * &scale).round() / scale
}

/// Fixed-point decimal rendering carrying `digits` significant digits.
pub fn to_decimal_string(x: &BigRational, digits: u32) -> String {
    if x.is_zero() {
        return "0".to_string();
    }
    let digits = digits.max(1);
    let rounded = round_significant(x, digits);
    let frac = (digits as i64 - 1 - floor_log10(x)).max(0) as u32;
    let scaled = (rounded.abs() * BigRational::from_integer(pow10(frac)))
        .round()
        .to_integer();

    let mut body = scaled.to_string();
    if frac > 0 {
        let frac = frac as usize;
        if body.len() <= frac {
            body = format!("{}{}", "0".repeat(frac + 1 - body.len()), body);
        }
        body.insert(body.len() - frac, '.');
    }
    if x.is_negative() {
        format!("-{}", body)
    } else {
        body
    }
}

/// Nearest `f64`; saturates to ±inf or 0 outside the float range.
pub fn to_f64(x: &BigRational) -> f64 {
    let num_shift = x.numer().bits().saturating_sub(F64_SAFE_BITS - 100);
    let den_shift = x.denom().bits().saturating_sub(F64_SAFE_BITS - 100);
    let num = (x.numer() >> (num_shift as usize)).to_f64().unwrap_or(f64::NAN);
    let den = (x.denom() >> (den_shift as usize)).to_f64().unwrap_or(f64::NAN);
    let exponent = num_shift as i64 - den_shift as i64;
    let ratio = num / den;
    if exponent == 0 {
        ratio
    } else {
        ratio * 2f64.powf(exponent as f64)
    }
}

/// Round a float to `places` decimal places.
pub fn round_decimals(x: f64, places: i32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let factor = 10f64.powi(places);
    (x * factor).round() / factor
}
