/// Groups thousands with commas and keeps at most three decimals,
/// e.g. `12345.5` becomes `12,345.5`.
pub fn format_miles(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if grouped.chars().all(|c| c == '0' || c == ',') && fraction.is_empty() {
        ""
    } else {
        sign
    };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Renders like a plain number would in the browser: `30` rather than `30.00`.
pub fn format_mpg(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_miles(0.0), "0");
        assert_eq!(format_miles(600.0), "600");
        assert_eq!(format_miles(1000.0), "1,000");
        assert_eq!(format_miles(1234567.25), "1,234,567.25");
        assert_eq!(format_miles(-4200.0), "-4,200");
    }

    #[test]
    fn mpg_drops_trailing_zeros() {
        assert_eq!(format_mpg(30.0), "30");
        assert_eq!(format_mpg(26.67), "26.67");
        assert_eq!(format_mpg(0.0), "0");
    }
}
