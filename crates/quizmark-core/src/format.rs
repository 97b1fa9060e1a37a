//! Score rounding and zero-padded rendering.

use serde::{Deserialize, Serialize};

/// Decimal places past which an `f64` carries no further information.
pub const MAX_PRECISION: usize = 15;

/// Upper bound on the padded width of a rendered score.
pub const MAX_DIGITS: usize = 64;

/// Round `x` to `precision` decimal places, half away from zero.
///
/// `precision` is capped at [`MAX_PRECISION`].
pub fn to_precision(x: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    let scaled = x * factor;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round() / factor
}

/// Round `x` to `precision` decimals and left-pad its integer part with
/// zeros until integer digits plus decimal digits reach `digits`.
///
/// When `sign` is set, the minus sign of a negative value counts as one of
/// the `digits`. Values already at or past the floor are never truncated,
/// and a `digits` below 2 disables padding. `precision` is capped at
/// [`MAX_PRECISION`] and `digits` at [`MAX_DIGITS`].
pub fn round_and_pad(x: f64, precision: usize, digits: usize, sign: bool) -> String {
    let precision = precision.min(MAX_PRECISION);
    let digits = digits.min(MAX_DIGITS);
    let rounded = to_precision(x, precision);
    let negative = rounded < 0.0;
    let body = format!("{:.*}", precision, rounded.abs());
    let prefix = if negative { "-" } else { "" };

    if digits < 2 {
        return format!("{prefix}{body}");
    }

    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body.as_str(), None),
    };
    let decimals = frac_part.map_or(0, str::len);
    let discount = usize::from(sign && negative);
    let width = digits.saturating_sub(decimals + discount);

    match frac_part {
        Some(frac) => format!("{prefix}{int_part:0>width$}.{frac}"),
        None => format!("{prefix}{int_part:0>width$}"),
    }
}

/// Rendering parameters for scores, taken from a test's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rounding {
    pub digits: usize,
    pub precision: usize,
    pub sign: bool,
}

impl Default for Rounding {
    fn default() -> Self {
        Self {
            digits: 2,
            precision: 2,
            sign: false,
        }
    }
}

impl Rounding {
    pub fn round(&self, x: f64) -> f64 {
        to_precision(x, self.precision)
    }

    pub fn render(&self, x: f64) -> String {
        round_and_pad(x, self.precision, self.digits, self.sign)
    }
}
