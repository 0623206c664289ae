//! Ordered landmark chains.
//!
//! A landmark is a textual anchor plus a rule for turning what it matches
//! into a raw value. Each field owns an ordered chain of landmarks; the
//! first landmark that matches decides the raw value, later ones are never
//! consulted.

use regex::Regex;
use tracing::trace;

use super::amounts::amounts_in;
use super::patterns::landmark;
use super::ExtractionMatch;
use crate::models::invoice::InvoiceField;

/// How a matched pattern turns into a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The text of a numbered capture group.
    Group(usize),
    /// The last amount-shaped token of the whole match.
    LastAmount,
    /// The sum of all amount-shaped tokens of a capture group.
    SumOfAmounts(usize),
}

/// A single anchor in a field's chain.
pub enum Landmark {
    /// A regex anchor.
    Pattern {
        name: &'static str,
        regex: Regex,
        capture: Capture,
    },
    /// A structural scan that cannot be expressed as one regex, such as a
    /// positional read of a table row.
    Derived {
        name: &'static str,
        derive: fn(&str) -> Option<String>,
    },
}

impl Landmark {
    /// A regex landmark reading one capture group.
    pub fn group(name: &'static str, pattern: &str, group: usize) -> Self {
        Self::Pattern {
            name,
            regex: landmark(pattern),
            capture: Capture::Group(group),
        }
    }

    /// A regex landmark reading the last amount of its match.
    pub fn last_amount(name: &'static str, pattern: &str) -> Self {
        Self::Pattern {
            name,
            regex: landmark(pattern),
            capture: Capture::LastAmount,
        }
    }

    /// A regex landmark summing every amount inside a capture group.
    pub fn sum_of_amounts(name: &'static str, pattern: &str, group: usize) -> Self {
        Self::Pattern {
            name,
            regex: landmark(pattern),
            capture: Capture::SumOfAmounts(group),
        }
    }

    /// A landmark computed by a function over the whole text.
    pub fn derived(name: &'static str, derive: fn(&str) -> Option<String>) -> Self {
        Self::Derived { name, derive }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Landmark::Pattern { name, .. } | Landmark::Derived { name, .. } => name,
        }
    }

    /// Try this landmark against the text.
    pub fn find(&self, text: &str) -> Option<ExtractionMatch<String>> {
        match self {
            Landmark::Pattern { name, regex, capture } => {
                let caps = regex.captures(text)?;
                let whole = caps.get(0)?;
                let raw = match capture {
                    Capture::Group(i) => caps.get(*i)?.as_str().trim().to_string(),
                    Capture::LastAmount => {
                        amounts_in(whole.as_str()).last()?.to_string()
                    }
                    Capture::SumOfAmounts(i) => {
                        let amounts = amounts_in(caps.get(*i)?.as_str());
                        if amounts.is_empty() {
                            return None;
                        }
                        amounts.iter().sum::<rust_decimal::Decimal>().to_string()
                    }
                };
                if raw.is_empty() {
                    return None;
                }
                Some(ExtractionMatch::new(raw, name).with_position(whole.start(), whole.end()))
            }
            Landmark::Derived { name, derive } => {
                derive(text).map(|raw| ExtractionMatch::new(raw, name))
            }
        }
    }
}

/// The ordered landmark chain of one field.
pub struct FieldLandmarks {
    pub field: InvoiceField,
    pub landmarks: Vec<Landmark>,
}

impl FieldLandmarks {
    pub fn new(field: InvoiceField, landmarks: Vec<Landmark>) -> Self {
        Self { field, landmarks }
    }

    /// A field with no landmarks for this layout.
    pub fn none(field: InvoiceField) -> Self {
        Self::new(field, Vec::new())
    }

    /// Walk the chain; the first structural match wins.
    pub fn resolve(&self, text: &str) -> Option<ExtractionMatch<String>> {
        for landmark in &self.landmarks {
            if let Some(found) = landmark.find(text) {
                trace!(
                    field = self.field.label(),
                    landmark = found.landmark,
                    raw = %found.value,
                    "Landmark matched"
                );
                return Some(found);
            }
        }
        None
    }
}
