//! Cent-precision rounding for money and percentages.
//!
//! Values too large to scale by 100 are returned unchanged; they carry no
//! fractional cents anyway.

pub fn round2(value: f64) -> f64 {
    to_cents(value, f64::round)
}

pub fn floor2(value: f64) -> f64 {
    to_cents(value, f64::floor)
}

fn to_cents(value: f64, op: fn(f64) -> f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        op(scaled) / 100.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(floor2(1.239), 1.23);
        assert_eq!(floor2(-0.001), -0.01);
    }

    #[test]
    fn test_huge_values_stay_finite() {
        let big = 0.8e308;
        assert!(floor2(big).is_finite());
        assert!(floor2(big) <= big);
        assert_eq!(round2(f64::MAX), f64::MAX);
    }
}
