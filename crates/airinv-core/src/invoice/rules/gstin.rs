//! GSTIN (Indian GST Identification Number) extraction and validation.

use super::patterns::GSTIN_STANDALONE;
use super::{ExtractionMatch, FieldExtractor};

const CHECK_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// GST state codes and the state names used for branch and file naming.
const STATES: &[(&str, &str)] = &[
    ("01", "JAMMU AND KASHMIR"),
    ("02", "HIMACHAL PRADESH"),
    ("03", "PUNJAB"),
    ("04", "CHANDIGARH"),
    ("05", "UTTARAKHAND"),
    ("06", "HARYANA"),
    ("07", "DELHI"),
    ("08", "RAJASTHAN"),
    ("09", "UTTAR PRADESH"),
    ("10", "BIHAR"),
    ("11", "SIKKIM"),
    ("12", "ARUNACHAL PRADESH"),
    ("13", "NAGALAND"),
    ("14", "MANIPUR"),
    ("15", "MIZORAM"),
    ("16", "TRIPURA"),
    ("17", "MEGHALAYA"),
    ("18", "ASSAM"),
    ("19", "WEST BENGAL"),
    ("20", "JHARKHAND"),
    ("21", "ODISHA"),
    ("22", "CHATTISGARH"),
    ("23", "MADHYA PRADESH"),
    ("24", "GUJARAT"),
    ("26", "DADRA AND NAGAR HAVELI AND DAMAN AND DIU"),
    ("27", "MAHARASHTRA"),
    ("28", "ANDHRA PRADESH (OLD)"),
    ("29", "KARNATAKA"),
    ("30", "GOA"),
    ("31", "LAKSHADWEEP"),
    ("32", "KERALA"),
    ("33", "TAMIL NADU"),
    ("34", "PUDUCHERRY"),
    ("35", "ANDAMAN AND NICOBAR ISLANDS"),
    ("36", "TELANGANA"),
    ("37", "ANDHRA PRADESH"),
    ("38", "LADAKH"),
];

/// GSTIN field extractor. Only tokens with a valid check character count.
pub struct GstinExtractor;

impl GstinExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GstinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for GstinExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Distinct GSTIN-shaped tokens in reading order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for caps in GSTIN_STANDALONE.captures_iter(text) {
            let Some(token) = caps.get(1) else {
                continue;
            };
            let gstin = token.as_str();

            if results.iter().any(|r| r.value == gstin) {
                continue;
            }

            if validate_gstin(gstin) {
                results.push(
                    ExtractionMatch::new(gstin.to_string(), "gstin-token")
                        .with_position(token.start(), token.end()),
                );
            }
        }

        results
    }
}

/// Validate a GSTIN: shape, known state code and mod-36 check character.
pub fn validate_gstin(gstin: &str) -> bool {
    let bytes = gstin.as_bytes();
    if bytes.len() != 15 || !bytes.iter().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()) {
        return false;
    }

    if state_name(&gstin[..2]).is_none() {
        return false;
    }

    let value = |b: u8| CHECK_ALPHABET.iter().position(|c| *c == b).map(|p| p as u32);

    let mut sum = 0;
    for (i, b) in bytes.iter().take(14).enumerate() {
        let Some(v) = value(*b) else {
            return false;
        };
        let product = v * if i % 2 == 0 { 1 } else { 2 };
        sum += product / 36 + product % 36;
    }

    let check = (36 - sum % 36) % 36;
    CHECK_ALPHABET[check as usize] == bytes[14]
}

/// Two-digit state code of a GSTIN, if it starts with two digits.
pub fn state_code(gstin: &str) -> Option<&str> {
    let code = gstin.get(..2)?;
    code.chars().all(|c| c.is_ascii_digit()).then_some(code)
}

/// State name for a two-digit GST state code.
pub fn state_name(code: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
