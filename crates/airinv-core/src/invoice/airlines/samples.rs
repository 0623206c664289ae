//! Sample invoice texts, one per airline.

use crate::models::invoice::Airline;

pub const AIR_INDIA: &str = include_str!("../../../tests/fixtures/air_india_tax_invoice.txt");
pub const AIR_INDIA_EXPRESS: &str =
    include_str!("../../../tests/fixtures/air_india_express_tax_invoice.txt");
pub const INDIGO: &str = include_str!("../../../tests/fixtures/indigo_tax_invoice.txt");
pub const AKASA: &str = include_str!("../../../tests/fixtures/akasa_tax_invoice.txt");
pub const GULF_AIR: &str = include_str!("../../../tests/fixtures/gulf_air_tax_invoice.txt");

/// `(airline, file name, text)` for every sample.
pub fn all() -> Vec<(Airline, &'static str, &'static str)> {
    vec![
        (Airline::AirIndia, "AI_0982504MH00012345.pdf", AIR_INDIA),
        (Airline::AirIndiaExpress, "IX_KL2510000123.pdf", AIR_INDIA_EXPRESS),
        (Airline::IndiGo, "6E_MH1252612AB12345.pdf", INDIGO),
        (Airline::Akasa, "QP_QP2510000456.pdf", AKASA),
        (Airline::GulfAir, "GF_TKMHP_2510_04496.pdf", GULF_AIR),
    ]
}
