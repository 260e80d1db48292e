//! Parsing and rendering of provider amounts and dates.
//!
//! Providers encode amounts loosely: JSON numbers (`383285000000`),
//! comma-grouped strings (`"1,234,500"`), accounting negatives (`"(12,000)"`),
//! or placeholders (`"-"`, `"—"`, `"N/A"`, `"NaN"`) meaning "no value".
//! A placeholder or garbage string parses to `None`, never to zero.
//!
//! Dates arrive as `YYYY-MM-DD`, `YYYYMMDD`, `YYYY.MM.DD`, or DART period
//! ranges such as `2023.01.01 ~ 2023.12.31` and `2023.12.31 현재`.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

const PLACEHOLDERS: &[&str] = &["-", "—", "–", "n/a", "na", "nan", "null", "none"];

/// Parse a provider amount into an exact decimal.
///
/// Thousands separators and surrounding whitespace are ignored. A value
/// wrapped in parentheses is negative. Exponent notation is accepted.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let text = raw.trim();
    if text.is_empty() || PLACEHOLDERS.contains(&text.to_ascii_lowercase().as_str()) {
        return None;
    }

    let (negated, body) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, text),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = if cleaned.contains(['e', 'E']) {
        Decimal::from_scientific(&cleaned.replace("e+", "e").replace("E+", "E")).ok()?
    } else {
        Decimal::from_str(&cleaned).ok()?
    };

    Some(if negated { -value } else { value })
}

/// Normalise a provider date (or the end of a date range) to `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let end = raw.rsplit('~').next().unwrap_or(raw).trim();
    let cleaned = end.replace(['.', '/'], "-");

    if let Some(head) = cleaned.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d")
    {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    let digits = cleaned.get(..8)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Render an amount with comma thousands separators: `150000000000` → `150,000,000,000`.
pub fn format_amount(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn thousands_separators_are_ignored() {
        assert_eq!(parse_amount("1,234,500"), Some(dec("1234500")));
        assert_eq!(parse_amount("  302,231,360,000,000 "), Some(dec("302231360000000")));
    }

    #[test]
    fn placeholders_are_absent_not_zero() {
        for raw in ["—", "-", "N/A", "NaN", "nan", "", "   "] {
            assert_eq!(parse_amount(raw), None, "{raw:?} should be absent");
        }
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount("12abc"), None);
    }

    #[test]
    fn negative_forms() {
        assert_eq!(parse_amount("-4,500"), Some(dec("-4500")));
        assert_eq!(parse_amount("(12,000)"), Some(dec("-12000")));
    }

    #[test]
    fn json_number_renderings() {
        assert_eq!(parse_amount("383285000000"), Some(dec("383285000000")));
        assert_eq!(parse_amount("150000000000.0"), Some(dec("150000000000")));
        assert_eq!(parse_amount("1.5e11"), Some(dec("150000000000")));
        assert_eq!(parse_amount("1e+21"), Some(dec("1000000000000000000000")));
    }

    #[test]
    fn iso_dates_pass_through() {
        assert_eq!(normalize_date("2023-09-30").as_deref(), Some("2023-09-30"));
    }

    #[test]
    fn compact_and_dotted_dates() {
        assert_eq!(normalize_date("20240314").as_deref(), Some("2024-03-14"));
        assert_eq!(normalize_date("2023.12.31").as_deref(), Some("2023-12-31"));
        assert_eq!(normalize_date("2023/06/30").as_deref(), Some("2023-06-30"));
    }

    #[test]
    fn range_takes_end() {
        assert_eq!(
            normalize_date("2023.01.01 ~ 2023.12.31").as_deref(),
            Some("2023-12-31")
        );
        assert_eq!(normalize_date("2023.12.31 현재").as_deref(), Some("2023-12-31"));
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert_eq!(normalize_date("2023-13-45"), None);
        assert_eq!(normalize_date("soon"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn format_groups_thousands() {
        assert_eq!(format_amount(dec("150000000000")), "150,000,000,000");
        assert_eq!(format_amount(dec("999")), "999");
        assert_eq!(format_amount(dec("1000")), "1,000");
        assert_eq!(format_amount(dec("-1234567.50")), "-1,234,567.5");
        assert_eq!(format_amount(dec("0")), "0");
    }
}
