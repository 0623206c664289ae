//! Date parsing for airline invoices.

use chrono::NaiveDate;

use super::patterns::{DATE_ISO, DATE_MONTH_NAME, DATE_NUMERIC};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor. Understands "21/10/2025", "21-10-2025",
/// "21-Oct-2025", "21 October 2025" and "2025-10-21".
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();
        let mut push = |date: NaiveDate, start: usize, end: usize, landmark: &'static str| {
            if !results.iter().any(|r| r.value == date) {
                results.push(ExtractionMatch::new(date, landmark).with_position(start, end));
            }
        };

        for caps in DATE_NUMERIC.captures_iter(text) {
            let day = caps[1].parse().unwrap_or(0);
            let month = caps[2].parse().unwrap_or(0);
            let year = caps[3].parse().unwrap_or(0);

            if let (Some(date), Some(m)) = (NaiveDate::from_ymd_opt(year, month, day), caps.get(0)) {
                push(date, m.start(), m.end(), "date-dmy");
            }
        }

        for caps in DATE_MONTH_NAME.captures_iter(text) {
            let day = caps[1].parse().unwrap_or(0);
            let month = month_to_number(&caps[2]);
            let year = caps[3].parse().unwrap_or(0);

            if let (Some(date), Some(m)) = (NaiveDate::from_ymd_opt(year, month, day), caps.get(0)) {
                push(date, m.start(), m.end(), "date-month-name");
            }
        }

        for caps in DATE_ISO.captures_iter(text) {
            let year = caps[1].parse().unwrap_or(0);
            let month = caps[2].parse().unwrap_or(0);
            let day = caps[3].parse().unwrap_or(0);

            if let (Some(date), Some(m)) = (NaiveDate::from_ymd_opt(year, month, day), caps.get(0)) {
                push(date, m.start(), m.end(), "date-iso");
            }
        }

        results.sort_by_key(|r| r.position);
        results
    }
}

/// Parse a captured invoice date.
pub fn parse_invoice_date(raw: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(raw).map(|m| m.value)
}

/// Format a date for the ERP sheet ("21-Oct-2025" with the default format).
pub fn format_date(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

fn month_to_number(month: &str) -> u32 {
    let lower = month.to_lowercase();
    let months = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];

    months
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|i| i as u32 + 1)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 21);
        assert_eq!(parse_invoice_date("21/10/2025"), expected);
        assert_eq!(parse_invoice_date("21-10-2025"), expected);
        assert_eq!(parse_invoice_date("21.10.2025"), expected);
    }

    #[test]
    fn test_parse_month_name_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 21);
        assert_eq!(parse_invoice_date("21-Oct-2025"), expected);
        assert_eq!(parse_invoice_date("21 October 2025"), expected);
        assert_eq!(parse_invoice_date("21 OCT 2025"), expected);
        assert_eq!(parse_invoice_date("2025-10-21"), expected);
    }

    #[test]
    fn test_parse_invalid_date() {
        assert_eq!(parse_invoice_date("31/02/2025"), None);
        assert_eq!(parse_invoice_date("21-Foo-2025"), None);
        assert_eq!(parse_invoice_date("n/a"), None);
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        assert_eq!(format_date(date, "%d-%b-%Y"), "03-May-2025");
    }
}
