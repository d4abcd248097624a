use rust_decimal::Decimal;

/// Render a monetary value the way downstream consumers expect it:
/// trailing zeros trimmed, but always at least one fraction digit.
///
/// `3.00` → `"3.0"`, `5.50` → `"5.5"`, `1234.56` → `"1234.56"`.
pub fn amount_string(value: Decimal) -> String {
    let n = value.normalize();
    if n.fract().is_zero() {
        format!("{}.0", n.trunc())
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn whole_amounts_keep_one_fraction_digit() {
        assert_eq!(amount_string(d("3.00")), "3.0");
        assert_eq!(amount_string(d("12.00")), "12.0");
        assert_eq!(amount_string(d("5")), "5.0");
    }

    #[test]
    fn trailing_zeros_trimmed() {
        assert_eq!(amount_string(d("5.50")), "5.5");
        assert_eq!(amount_string(d("0.10")), "0.1");
    }

    #[test]
    fn two_significant_fraction_digits_kept() {
        assert_eq!(amount_string(d("1234.56")), "1234.56");
        assert_eq!(amount_string(d("0.01")), "0.01");
    }
}
