use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format an amount with thousands separators: ₦1,234.56
pub fn money(val: Decimal, symbol: &str) -> String {
    let cents = format!("{:.2}", val.abs().round_dp(2));
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if val.is_sign_negative() && !val.round_dp(2).is_zero() { "-" } else { "" };
    format!("{sign}{symbol}{}.{dec_part}", group_thousands(int_part))
}

/// Format an amount rounded to whole units: ₦12,345
pub fn whole(val: Decimal, symbol: &str) -> String {
    let rounded = val.round();
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{symbol}{}", group_thousands(&digits))
}

/// Short form for annotations: $30k, $1.5k, $950
pub fn compact(val: Decimal, symbol: &str) -> String {
    let abs = val.abs();
    let sign = if val.is_sign_negative() && !val.is_zero() { "-" } else { "" };
    if abs >= Decimal::ONE_THOUSAND {
        let k = (abs / Decimal::ONE_THOUSAND).round_dp(1).normalize();
        format!("{sign}{symbol}{k}k")
    } else {
        format!("{sign}{symbol}{}", abs.round().normalize())
    }
}

/// Lossy conversion for chart coordinates.
pub fn to_f64(val: Decimal) -> f64 {
    val.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(dec!(1234.56), "$"), "$1,234.56");
        assert_eq!(money(dec!(-500.00), "$"), "-$500.00");
        assert_eq!(money(dec!(0), "$"), "$0.00");
        assert_eq!(money(dec!(1000000.99), "\u{20a6}"), "\u{20a6}1,000,000.99");
        assert_eq!(money(dec!(42.1), "$"), "$42.10");
    }

    #[test]
    fn test_whole_formatting() {
        assert_eq!(whole(dec!(12345.4), "\u{20a6}"), "\u{20a6}12,345");
        assert_eq!(whole(dec!(-999.6), "$"), "-$1,000");
        assert_eq!(whole(dec!(0.2), "$"), "$0");
    }

    #[test]
    fn test_compact_formatting() {
        assert_eq!(compact(dec!(30000), "$"), "$30k");
        assert_eq!(compact(dec!(1500), "$"), "$1.5k");
        assert_eq!(compact(dec!(950), "$"), "$950");
    }
}
