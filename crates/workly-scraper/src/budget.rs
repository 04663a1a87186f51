//! Budget text parsing.
//!
//! Budgets arrive as free text such as `"US$ 500 - 1.000"`, `"R$ 50 / hora"` or
//! `"Menos de USD 50"`. Numbers use Brazilian notation: `.` groups thousands and
//! `,` separates decimals.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;
use workly_core::Currency;

/// Result of [`parse_budget`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedBudget {
    /// Detected currency
    pub currency: Currency,
    /// First number in the text
    pub min: Option<Decimal>,
    /// Second number in the text
    pub max: Option<Decimal>,
    /// Uppercased text without hourly qualifiers
    pub normalized_text: String,
}

fn hourly_slash() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\s*HORA").expect("valid hourly regex"))
}

fn hourly_words() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*POR\s*HORA").expect("valid hourly regex"))
}

fn currency_markers() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(US\$|USD|R\$|BRL)").expect("valid currency regex"))
}

fn number_tokens() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d.,]+").expect("valid number regex"))
}

fn detect_currency(text: &str) -> Currency {
    if text.contains("US$") || text.starts_with("USD") || text.contains("USD ") {
        Currency::Usd
    } else if text.contains("R$") || text.starts_with("BRL") || text.contains("BRL ") {
        Currency::Brl
    } else {
        Currency::Unknown
    }
}

/// `"1.000,50"` → `1000.50`; `None` when nothing numeric remains.
fn parse_amount(token: &str) -> Option<Decimal> {
    let normalized = token.replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

/// Split raw budget text into currency, range and normalized text.
///
/// One number fills `min` only; two or more fill `min` and `max` from the first
/// two, in the order they appear. No ordering check is made.
#[must_use]
pub fn parse_budget(text: &str) -> ParsedBudget {
    if text.trim().is_empty() {
        return ParsedBudget::default();
    }

    let upper = text.to_uppercase();
    let without_slash = hourly_slash().replace_all(upper.trim(), "");
    let normalized_text = hourly_words()
        .replace_all(&without_slash, "")
        .trim()
        .to_string();

    let currency = detect_currency(&normalized_text);
    let figures = currency_markers().replace_all(&normalized_text, "");
    let numbers: Vec<Decimal> = number_tokens()
        .find_iter(&figures)
        .filter_map(|m| parse_amount(m.as_str()))
        .collect();

    ParsedBudget {
        currency,
        min: numbers.first().copied(),
        max: numbers.get(1).copied(),
        normalized_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_usd_range_with_brazilian_notation() {
        let parsed = parse_budget("US$ 500 - US$ 1.000,50");
        assert_eq!(parsed.currency, Currency::Usd);
        assert_eq!(parsed.min, Some(dec("500")));
        assert_eq!(parsed.max, Some(dec("1000.5")));
        assert_eq!(parsed.normalized_text, "US$ 500 - US$ 1.000,50");
    }

    #[test]
    fn test_hourly_brl() {
        let parsed = parse_budget("R$ 300 / hora");
        assert_eq!(parsed.currency, Currency::Brl);
        assert_eq!(parsed.min, Some(dec("300")));
        assert_eq!(parsed.max, None);
        assert_eq!(parsed.normalized_text, "R$ 300");
    }

    #[test]
    fn test_hourly_words() {
        let parsed = parse_budget("USD 15 - 25 por hora");
        assert_eq!(parsed.currency, Currency::Usd);
        assert_eq!(parsed.min, Some(dec("15")));
        assert_eq!(parsed.max, Some(dec("25")));
        assert_eq!(parsed.normalized_text, "USD 15 - 25");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(parse_budget(""), ParsedBudget::default());
        let blank = parse_budget("   ");
        assert_eq!(blank.currency, Currency::Unknown);
        assert_eq!(blank.min, None);
        assert_eq!(blank.normalized_text, "");
    }

    #[test]
    fn test_unknown_currency_still_extracts_numbers() {
        let parsed = parse_budget("Até 1.500");
        assert_eq!(parsed.currency, Currency::Unknown);
        assert_eq!(parsed.min, Some(dec("1500")));
        assert_eq!(parsed.normalized_text, "ATÉ 1.500");
    }

    #[test]
    fn test_usd_wins_when_both_markers_present() {
        assert_eq!(parse_budget("US$ 100 (R$ 560)").currency, Currency::Usd);
    }

    #[test]
    fn test_brl_code_prefix() {
        let parsed = parse_budget("BRL 2.000 - 4.000");
        assert_eq!(parsed.currency, Currency::Brl);
        assert_eq!(parsed.min, Some(dec("2000")));
        assert_eq!(parsed.max, Some(dec("4000")));
    }

    #[test]
    fn test_no_numbers() {
        let parsed = parse_budget("A combinar");
        assert_eq!(parsed.currency, Currency::Unknown);
        assert_eq!(parsed.min, None);
        assert_eq!(parsed.max, None);
    }

    #[test]
    fn test_unparsable_tokens_are_dropped_individually() {
        // The lone "." disappears entirely once thousands separators are removed
        let parsed = parse_budget("R$ . 250");
        assert_eq!(parsed.min, Some(dec("250")));
        assert_eq!(parsed.max, None);
    }

    #[test]
    fn test_reversed_range_is_kept_as_found() {
        let parsed = parse_budget("R$ 900 - 300");
        assert_eq!(parsed.min, Some(dec("900")));
        assert_eq!(parsed.max, Some(dec("300")));
    }

    #[test]
    fn test_more_than_two_numbers_uses_first_two() {
        let parsed = parse_budget("US$ 10 - 20 - 30");
        assert_eq!(parsed.min, Some(dec("10")));
        assert_eq!(parsed.max, Some(dec("20")));
    }
}
