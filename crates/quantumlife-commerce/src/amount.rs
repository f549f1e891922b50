//! Amount extraction.
//!
//! Ordered currency patterns, symbol-prefix before ISO-code-prefix. The
//! European-EUR and Anglo-EUR regexes intentionally overlap; European is
//! tried first and falls through to Anglo, and that order is load-bearing
//! and must be preserved verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_MAJOR_UNITS: f64 = 1_000_000.0;

/// A parsed monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub minor_units: i64,
}

struct CurrencyPattern {
    regex: &'static Lazy<Regex>,
    currency: &'static str,
    form: NumberForm,
}

#[derive(Clone, Copy)]
enum NumberForm {
    /// Dot decimal, comma thousands: `1,234.56`.
    Anglo,
    /// Comma decimal, dot thousands: `1.234,56`.
    European,
}

static GBP_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"£\s?([\d.,]+)").unwrap());
static USD_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\s?([\d.,]+)").unwrap());
static EUR_SYMBOL_EUROPEAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"€\s?(\d{1,3}(?:\.\d{3})*,\d{2})").unwrap());
static EUR_SYMBOL_ANGLO: Lazy<Regex> = Lazy::new(|| Regex::new(r"€\s?([\d.,]+)").unwrap());
static INR_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"₹\s?([\d.,]+)").unwrap());
static INR_RS_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Rs\.?\s?([\d.,]+)").unwrap());

static GBP_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bGBP\s?([\d.,]+)").unwrap());
static USD_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bUSD\s?([\d.,]+)").unwrap());
static EUR_ISO_EUROPEAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bEUR\s?(\d{1,3}(?:\.\d{3})*,\d{2})").unwrap());
static EUR_ISO_ANGLO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bEUR\s?([\d.,]+)").unwrap());
static INR_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bINR\s?([\d.,]+)").unwrap());

fn ordered_patterns() -> Vec<CurrencyPattern> {
    vec![
        CurrencyPattern { regex: &GBP_SYMBOL, currency: "GBP", form: NumberForm::Anglo },
        CurrencyPattern { regex: &USD_SYMBOL, currency: "USD", form: NumberForm::Anglo },
        CurrencyPattern { regex: &EUR_SYMBOL_EUROPEAN, currency: "EUR", form: NumberForm::European },
        CurrencyPattern { regex: &EUR_SYMBOL_ANGLO, currency: "EUR", form: NumberForm::Anglo },
        CurrencyPattern { regex: &INR_SYMBOL, currency: "INR", form: NumberForm::Anglo },
        CurrencyPattern { regex: &INR_RS_PREFIX, currency: "INR", form: NumberForm::Anglo },
        CurrencyPattern { regex: &GBP_ISO, currency: "GBP", form: NumberForm::Anglo },
        CurrencyPattern { regex: &USD_ISO, currency: "USD", form: NumberForm::Anglo },
        CurrencyPattern { regex: &EUR_ISO_EUROPEAN, currency: "EUR", form: NumberForm::European },
        CurrencyPattern { regex: &EUR_ISO_ANGLO, currency: "EUR", form: NumberForm::Anglo },
        CurrencyPattern { regex: &INR_ISO, currency: "INR", form: NumberForm::Anglo },
    ]
}

/// Extract the first matching amount and its ISO-4217 currency, in the
/// fixed pattern order above. Returns `None` on no match or on a value
/// outside `[0, 1_000_000]` major units.
pub fn extract_amount(text: &str) -> Option<(Amount, &'static str)> {
    for pattern in ordered_patterns() {
        if let Some(caps) = pattern.regex.captures(text) {
            let raw = caps.get(1)?.as_str();
            let value = match pattern.form {
                NumberForm::Anglo => parse_anglo(raw),
                NumberForm::European => parse_european(raw),
            }?;
            if !(0.0..=MAX_MAJOR_UNITS).contains(&value) {
                return None;
            }
            let minor_units = (value * 100.0 + 0.5).floor() as i64;
            return Some((Amount { minor_units }, pattern.currency));
        }
    }
    None
}

fn parse_anglo(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok()
}

fn parse_european(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '.').collect();
    cleaned.replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_anglo_form() {
        let (amount, currency) = extract_amount("Total: $1,234.56").unwrap();
        assert_eq!(amount.minor_units, 123_456);
        assert_eq!(currency, "USD");
    }

    #[test]
    fn gbp_symbol() {
        let (amount, currency) = extract_amount("Charged £42.00").unwrap();
        assert_eq!(amount.minor_units, 4_200);
        assert_eq!(currency, "GBP");
    }

    #[test]
    fn eur_european_form_preferred_over_anglo() {
        let (amount, currency) = extract_amount("Betrag: €1.234,56").unwrap();
        assert_eq!(amount.minor_units, 123_456);
        assert_eq!(currency, "EUR");
    }

    #[test]
    fn inr_rs_prefix() {
        let (amount, currency) = extract_amount("Amount: Rs. 500.00").unwrap();
        assert_eq!(amount.minor_units, 50_000);
        assert_eq!(currency, "INR");
    }

    #[test]
    fn iso_code_prefix() {
        let (amount, currency) = extract_amount("Total USD 99.99").unwrap();
        assert_eq!(amount.minor_units, 9_999);
        assert_eq!(currency, "USD");
    }

    #[test]
    fn rejects_amount_over_cap() {
        assert_eq!(extract_amount("Total: $2,000,000.00"), None);
    }

    #[test]
    fn rounds_half_up_to_minor_units() {
        let (amount, _) = extract_amount("Total: $10.005").unwrap();
        assert_eq!(amount.minor_units, 1_001);
    }
}
