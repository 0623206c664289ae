//! The Logisys purchase upload template.
//!
//! Column names and order are fixed by the ERP importer. Note the leading
//! space in " Charge Narration"; the importer expects it.

/// Header row, in template order.
pub const HEADERS: [&str; 41] = [
    "Entry Date",
    "Posting Date",
    "Organization",
    "Organization Branch",
    "Vendor Inv No",
    "Vendor Inv Date",
    "Currency",
    "ExchRate",
    "Narration",
    "Due Date",
    "Charge or GL",
    "Charge or GL Name",
    "Charge or GL Amount",
    "DR or CR",
    "Cost Center",
    "Branch",
    " Charge Narration",
    "TaxGroup",
    "Tax Type",
    "SAC or HSN",
    "Taxcode1",
    "Taxcode1 Amt",
    "Taxcode2",
    "Taxcode2 Amt",
    "Taxcode3",
    "Taxcode3 Amt",
    "Taxcode4",
    "Taxcode4 Amt",
    "Avail Tax Credit",
    "LOB",
    "Ref Type",
    "Ref No",
    "Amount",
    "Start Date",
    "End Date",
    "WH Tax Code",
    "WH Tax Percentage",
    "WH Tax Taxable",
    "WH Tax Amount",
    "Round Off",
    "CC Code",
];

/// Template columns. The discriminant is the column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Column {
    EntryDate,
    PostingDate,
    Organization,
    OrganizationBranch,
    VendorInvNo,
    VendorInvDate,
    Currency,
    ExchRate,
    Narration,
    DueDate,
    ChargeOrGl,
    ChargeOrGlName,
    ChargeOrGlAmount,
    DrOrCr,
    CostCenter,
    Branch,
    ChargeNarration,
    TaxGroup,
    TaxType,
    SacOrHsn,
    Taxcode1,
    Taxcode1Amt,
    Taxcode2,
    Taxcode2Amt,
    Taxcode3,
    Taxcode3Amt,
    Taxcode4,
    Taxcode4Amt,
    AvailTaxCredit,
    Lob,
    RefType,
    RefNo,
    Amount,
    StartDate,
    EndDate,
    WhTaxCode,
    WhTaxPercentage,
    WhTaxTaxable,
    WhTaxAmount,
    RoundOff,
    CcCode,
}

impl Column {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn header(self) -> &'static str {
        HEADERS[self.index()]
    }
}
