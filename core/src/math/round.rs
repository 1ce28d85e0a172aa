/// Decimal rounding with ties going to the even neighbour, applied to the
/// value scaled by `10^dp`. Reported figures keep the precision of the
/// instrument software, so this must not be swapped for half-away-from-zero.
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 {
            return self.round_ties_even();
        }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round_ties_even() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_to_even() {
        assert_eq!(0.5_f64.round_to(0), 0.0);
        assert_eq!(1.5_f64.round_to(0), 2.0);
        assert_eq!(2.5_f64.round_to(0), 2.0);
        assert_eq!((-2.5_f64).round_to(0), -2.0);
    }

    #[test]
    fn decimals_are_kept() {
        assert_eq!(19.987_f64.round_to(2), 19.99);
        assert_eq!(0.123456_f64.round_to(5), 0.12346);
    }

    #[test]
    fn non_finite_values_pass_through() {
        assert!(f64::NAN.round_to(2).is_nan());
        assert_eq!(f64::INFINITY.round_to(0), f64::INFINITY);
    }
}
