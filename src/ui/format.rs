//! Number formatting for display (en-US grouping)

const MAX_FRACTION_DIGITS: usize = 3;

/// Placeholder for values that cannot be shown as numbers
pub const NOT_AVAILABLE: &str = "—";

/// Thousands-grouped number with up to three fraction digits: `1234.5` -> `1,234.5`
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + 4);
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// `2500` -> `$2,500`
pub fn format_currency(value: f64) -> String {
    format!("${}", format_number(value))
}

/// Fractional yield as a percentage with two decimals: `0.0825` -> `8.25%`
pub fn format_yield(gross_yield: f64) -> String {
    if !gross_yield.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", gross_yield * 100.0)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(format_currency(2500.0), "$2,500");
        assert_eq!(format_currency(350_000.0), "$350,000");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn test_currency_fraction_digits() {
        assert_eq!(format_currency(2612.5), "$2,612.5");
        assert_eq!(format_currency(2612.3456), "$2,612.346");
        assert_eq!(format_currency(-1500.0), "$-1,500");
    }

    #[test]
    fn test_yield_two_decimals() {
        assert_eq!(format_yield(0.08), "8.00%");
        assert_eq!(format_yield(0.0975), "9.75%");
        assert_eq!(format_yield(0.1), "10.00%");
        assert_eq!(format_yield(0.0), "0.00%");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_number(f64::NAN), NOT_AVAILABLE);
        assert_eq!(format_yield(f64::INFINITY), NOT_AVAILABLE);
    }
}
