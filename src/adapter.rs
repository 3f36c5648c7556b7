//! Adapter layer: converts between the f64 world of the dashboard/CLI and
//! the engine's Decimal types.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert f64 to Decimal (lossy but sufficient for slider input).
/// Non-finite input maps to zero; callers clamp before converting.
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Clamp a raw boundary value into `[min, max]` and quantize it to `dp`
/// decimal places. Returns `None` for NaN, which has no nearest boundary.
///
/// The boolean is `true` when the input lay outside the domain.
pub fn clamp_to_domain(value: f64, min: Decimal, max: Decimal, dp: u32) -> Option<(Decimal, bool)> {
    if value.is_nan() {
        return None;
    }
    let (lo, hi) = (from_decimal(min), from_decimal(max));
    let out_of_range = value < lo || value > hi;
    let quantized = to_decimal(value.clamp(lo, hi))
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .clamp(min, max);
    Some((quantized, out_of_range))
}

/// Round half toward +inf, matching how the dashboard rounds KPI values.
pub fn round_half_up(d: Decimal) -> Decimal {
    (d + Decimal::new(5, 1)).floor()
}

/// Milliseconds from a JS `performance.now()`-style timestamp.
pub fn millis(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 { now as u64 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn clamp_keeps_in_range_values() {
        let (v, clamped) = clamp_to_domain(60.0, dec!(0), dec!(100), 2).unwrap();
        assert_eq!(v, dec!(60));
        assert!(!clamped);
    }

    #[test]
    fn clamp_snaps_to_nearest_boundary() {
        assert_eq!(clamp_to_domain(-3.0, dec!(0), dec!(100), 2), Some((dec!(0), true)));
        assert_eq!(clamp_to_domain(250.0, dec!(0), dec!(100), 2), Some((dec!(100), true)));
        assert_eq!(clamp_to_domain(f64::INFINITY, dec!(0), dec!(5), 1), Some((dec!(5), true)));
        assert_eq!(clamp_to_domain(f64::NEG_INFINITY, dec!(0), dec!(5), 1), Some((dec!(0), true)));
    }

    #[test]
    fn clamp_rejects_nan() {
        assert_eq!(clamp_to_domain(f64::NAN, dec!(0), dec!(5), 1), None);
    }

    #[test]
    fn clamp_quantizes_to_one_decimal() {
        let (v, _) = clamp_to_domain(2.25, dec!(0), dec!(5), 1).unwrap();
        assert_eq!(v, dec!(2.3));
        let (v, _) = clamp_to_domain(4.96, dec!(0), dec!(5), 1).unwrap();
        assert_eq!(v, dec!(5.0));
    }

    #[test]
    fn round_half_up_goes_toward_positive_infinity() {
        assert_eq!(round_half_up(dec!(40.5)), dec!(41));
        assert_eq!(round_half_up(dec!(40.49)), dec!(40));
        assert_eq!(round_half_up(dec!(-2.5)), dec!(-2));
    }

    #[test]
    fn millis_floors_and_rejects_garbage() {
        assert_eq!(millis(1234.9), 1234);
        assert_eq!(millis(f64::NAN), 0);
        assert_eq!(millis(-5.0), 0);
    }
}
