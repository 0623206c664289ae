//! Amount parsing for Indian invoices.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::AMOUNT_TOKEN;
use super::{ExtractionMatch, FieldExtractor};

/// Amount field extractor. Finds every amount-shaped token in a text.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in AMOUNT_TOKEN.captures_iter(text) {
            let Some(token) = caps.get(1) else {
                continue;
            };
            if let Some(amount) = parse_amount(token.as_str()) {
                results.push(
                    ExtractionMatch::new(amount, "amount-token")
                        .with_position(token.start(), token.end()),
                );
            }
        }

        results
    }
}

/// Parse an Indian formatted amount ("₹1,18,000.50", "Rs. 236", "1180.00").
///
/// Currency markers, thousands separators, a trailing "/-" and whitespace
/// are ignored. The result is rounded half-up to two decimal places. Returns
/// `None` when anything else remains or the value is negative.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.starts_with('-') {
        return None;
    }

    let cleaned: String = trimmed
        .trim_start_matches('₹')
        .trim_start_matches("Rs.")
        .trim_start_matches("Rs")
        .trim_start_matches("INR")
        .trim_start_matches('$')
        .trim_end_matches("/-")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    Decimal::from_str(&cleaned).ok().map(round_amount)
}

/// Round to two decimal places, half away from zero, keeping the scale at 2.
pub fn round_amount(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Format an amount with exactly two decimals and no separators.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_amount(amount))
}

/// Every amount on a line, in reading order.
pub fn amounts_in(text: &str) -> Vec<Decimal> {
    AmountExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .collect()
}
