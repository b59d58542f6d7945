use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// UNTDID 1001 code of a commercial invoice.
pub const COMMERCIAL_INVOICE_CODE: &str = "380";

/// A decoded CII invoice. Built once per decode and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceModel {
    /// BT-1: Invoice number (non-empty).
    pub invoice_number: String,
    /// BT-2: Issue date. `None` when the date text was not `CCYYMMDD`.
    pub issue_date: Option<NaiveDate>,
    /// BT-9: Payment due date.
    pub due_date: Option<NaiveDate>,
    /// BT-3: Raw document type code (UNTDID 1001).
    pub type_code: String,
    /// BT-5: Invoice currency code (ISO 4217).
    pub currency: String,
    /// BT-24: Guideline the document claims to follow.
    pub profile: Option<CiiProfile>,
    /// BT-10: Buyer reference (Leitweg-ID for XRechnung).
    pub buyer_reference: Option<String>,
    /// BT-83: Payment reference (Verwendungszweck).
    pub payment_reference: Option<String>,
    /// BT-72: Actual delivery date.
    pub delivery_date: Option<NaiveDate>,
    /// BT-22: Free-text notes, in document order.
    pub notes: Vec<String>,
    /// BG-4: Seller.
    pub seller: Party,
    /// BG-7: Buyer.
    pub buyer: Party,
    /// BG-22: Declared document totals.
    pub monetary_summary: MonetarySummary,
    /// BG-23: Header VAT breakdown.
    pub tax: TaxDetail,
    /// BG-25: Invoice lines, in document order.
    pub line_items: Vec<LineItem>,
}

impl InvoiceModel {
    /// Interpret the raw type code.
    pub fn kind(&self) -> InvoiceKind {
        InvoiceKind::from_code(&self.type_code)
    }
}

/// Interpretation of the UNTDID 1001 type code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvoiceKind {
    /// 380: commercial invoice.
    Invoice,
    /// Any other code, passed through unmodified.
    Other(String),
}

impl InvoiceKind {
    pub fn from_code(code: &str) -> Self {
        if code == COMMERCIAL_INVOICE_CODE {
            Self::Invoice
        } else {
            Self::Other(code.to_string())
        }
    }
}

impl std::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invoice => f.write_str("Invoice"),
            Self::Other(code) => write!(f, "Type {code}"),
        }
    }
}

/// ZUGFeRD / Factur-X / XRechnung guideline, read from
/// `GuidelineSpecifiedDocumentContextParameter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CiiProfile {
    /// Minimal machine-readable data (no line items).
    Minimum,
    /// Basic data without line items.
    BasicWl,
    /// Basic with line items.
    Basic,
    /// Full EN 16931 European norm.
    EN16931,
    /// Extended profile (beyond EN 16931).
    Extended,
    /// XRechnung (German public sector).
    XRechnung,
    /// Any other guideline URN.
    Unknown(String),
}

impl CiiProfile {
    /// Minimum and BasicWL documents carry no line items.
    pub fn has_line_items(&self) -> bool {
        !matches!(self, Self::Minimum | Self::BasicWl)
    }
}

impl std::fmt::Display for CiiProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minimum => f.write_str("MINIMUM"),
            Self::BasicWl => f.write_str("BASIC WL"),
            Self::Basic => f.write_str("BASIC"),
            Self::EN16931 => f.write_str("EN 16931"),
            Self::Extended => f.write_str("EXTENDED"),
            Self::XRechnung => f.write_str("XRECHNUNG"),
            Self::Unknown(urn) => write!(f, "unknown ({urn})"),
        }
    }
}

/// BG-4 / BG-7: Party (seller or buyer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44: Name.
    pub name: String,
    /// Single-line address: street, "postcode city", country joined by ", ".
    pub address: String,
    /// Address parts `address` was built from.
    pub postal_address: PostalAddress,
    /// BT-31 / BT-48: VAT identifier (scheme "VA").
    pub vat_id: Option<String>,
    /// BT-32: Tax registration number (scheme "FC").
    pub tax_number: Option<String>,
}

/// BG-5 / BG-8: Postal address as found in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    /// BT-35: Street + house number.
    pub line_one: Option<String>,
    /// BT-36: Additional address line.
    pub line_two: Option<String>,
    /// BT-38: Postal code.
    pub postcode: Option<String>,
    /// BT-37: City.
    pub city: Option<String>,
    /// BT-40: Country code (ISO 3166-1 alpha-2).
    pub country: Option<String>,
}

impl PostalAddress {
    /// Render as one line: street, then "postcode city", then country.
    /// Empty parts are skipped.
    pub fn single_line(&self) -> String {
        let part = |v: &Option<String>| v.as_deref().unwrap_or("").trim().to_string();
        let locality = format!("{} {}", part(&self.postcode), part(&self.city))
            .trim()
            .to_string();
        [part(&self.line_one), locality, part(&self.country)]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// BG-22: Declared document totals, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetarySummary {
    /// BT-106: Sum of line net amounts.
    pub line_total: Decimal,
    /// BT-109: Total without VAT.
    pub tax_basis_total: Decimal,
    /// BT-110: Total VAT.
    pub tax_total: Decimal,
    /// BT-112: Total with VAT.
    pub grand_total: Decimal,
    /// BT-115: Amount due for payment.
    pub due_total: Decimal,
    /// BT-113: Paid amount.
    pub prepaid_total: Option<Decimal>,
    /// BT-107: Sum of document-level allowances.
    pub allowance_total: Option<Decimal>,
    /// BT-108: Sum of document-level charges.
    pub charge_total: Option<Decimal>,
}

/// BG-23: Header VAT breakdown (first `ApplicableTradeTax` of the settlement).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDetail {
    /// BT-119: VAT rate in percent.
    pub rate_percent: Decimal,
    /// BT-118: VAT category code (UNTDID 5305).
    pub category_code: String,
    /// BT-117: VAT amount of the category.
    pub calculated_amount: Decimal,
    /// BT-116: Taxable amount of the category.
    pub basis_amount: Option<Decimal>,
    /// Tax type, "VAT" in practice.
    pub type_code: Option<String>,
}

/// BG-25: Invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// BT-126: Line identifier; 1-based position when absent.
    pub id: String,
    /// BT-153: Item name.
    pub name: String,
    /// BT-129: Invoiced quantity.
    pub quantity: Decimal,
    /// BT-130: Raw unit code (UN/CEFACT Rec 20, e.g. "HUR").
    pub unit_code: String,
    /// BT-146: Net price per `price_basis_quantity` units.
    pub unit_price: Decimal,
    /// BT-149: Price base quantity.
    pub price_basis_quantity: Option<Decimal>,
    /// BT-148: Gross price before discount.
    pub gross_price: Option<Decimal>,
    /// BT-131: Declared line net amount.
    pub line_total: Decimal,
    /// BT-152: Line VAT rate.
    pub tax_rate: Option<Decimal>,
    /// BT-151: Line VAT category code.
    pub tax_category: Option<String>,
}
