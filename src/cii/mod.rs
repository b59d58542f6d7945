//! Decoding of UN/CEFACT Cross Industry Invoice (CII) XML.
//!
//! The pipeline is: raw bytes → [`Document`] (generic element tree) →
//! [`extract`] (typed [`InvoiceModel`](crate::core::InvoiceModel), using the
//! scoped lookups in [`resolve`]) → [`validate`](crate::core::validate).
//! [`decode`] runs all three.
//!
//! # Example
//!
//! ```no_run
//! let bytes = std::fs::read("factur-x.xml").unwrap();
//! let (invoice, report) = ciicheck::cii::decode(&bytes).unwrap();
//! if !report.is_valid() {
//!     for issue in report.errors() {
//!         eprintln!("{}: {issue}", invoice.invoice_number);
//!     }
//! }
//! ```

mod decode;
mod extract;
mod profile;
pub mod resolve;
mod tree;

pub use decode::*;
pub use extract::{extract, extract_with_warnings};
pub use tree::{Document, Node, NodeId};

/// CII namespace URIs.
pub mod cii_ns {
    pub const RSM: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
    pub const RAM: &str =
        "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";
    pub const QDT: &str = "urn:un:unece:uncefact:data:standard:QualifiedDataType:100";
    pub const UDT: &str = "urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100";
}

/// Prefixed element names, as written by ZUGFeRD / Factur-X / XRechnung producers.
pub mod tags {
    // Document header
    pub const DOCUMENT_CONTEXT: &str = "rsm:ExchangedDocumentContext";
    pub const GUIDELINE: &str = "ram:GuidelineSpecifiedDocumentContextParameter";
    pub const EXCHANGED_DOCUMENT: &str = "rsm:ExchangedDocument";
    pub const ID: &str = "ram:ID";
    pub const TYPE_CODE: &str = "ram:TypeCode";
    pub const ISSUE_DATE_TIME: &str = "ram:IssueDateTime";
    pub const DATE_TIME_STRING: &str = "udt:DateTimeString";
    pub const INCLUDED_NOTE: &str = "ram:IncludedNote";
    pub const CONTENT: &str = "ram:Content";

    // Agreement
    pub const HEADER_AGREEMENT: &str = "ram:ApplicableHeaderTradeAgreement";
    pub const BUYER_REFERENCE: &str = "ram:BuyerReference";
    pub const SELLER_PARTY: &str = "ram:SellerTradeParty";
    pub const BUYER_PARTY: &str = "ram:BuyerTradeParty";
    pub const NAME: &str = "ram:Name";
    pub const POSTAL_ADDRESS: &str = "ram:PostalTradeAddress";
    pub const LINE_ONE: &str = "ram:LineOne";
    pub const LINE_TWO: &str = "ram:LineTwo";
    pub const POSTCODE: &str = "ram:PostcodeCode";
    pub const CITY: &str = "ram:CityName";
    pub const COUNTRY: &str = "ram:CountryID";
    pub const TAX_REGISTRATION: &str = "ram:SpecifiedTaxRegistration";

    // Delivery
    pub const HEADER_DELIVERY: &str = "ram:ApplicableHeaderTradeDelivery";
    pub const ACTUAL_DELIVERY_EVENT: &str = "ram:ActualDeliverySupplyChainEvent";
    pub const OCCURRENCE_DATE_TIME: &str = "ram:OccurrenceDateTime";

    // Settlement
    pub const HEADER_SETTLEMENT: &str = "ram:ApplicableHeaderTradeSettlement";
    pub const PAYMENT_REFERENCE: &str = "ram:PaymentReference";
    pub const CURRENCY: &str = "ram:InvoiceCurrencyCode";
    pub const APPLICABLE_TRADE_TAX: &str = "ram:ApplicableTradeTax";
    pub const CALCULATED_AMOUNT: &str = "ram:CalculatedAmount";
    pub const BASIS_AMOUNT: &str = "ram:BasisAmount";
    pub const CATEGORY_CODE: &str = "ram:CategoryCode";
    pub const RATE_PERCENT: &str = "ram:RateApplicablePercent";
    pub const PAYMENT_TERMS: &str = "ram:SpecifiedTradePaymentTerms";
    pub const DUE_DATE_TIME: &str = "ram:DueDateDateTime";
    pub const HEADER_MONETARY_SUMMATION: &str =
        "ram:SpecifiedTradeSettlementHeaderMonetarySummation";
    pub const LINE_TOTAL_AMOUNT: &str = "ram:LineTotalAmount";
    pub const CHARGE_TOTAL_AMOUNT: &str = "ram:ChargeTotalAmount";
    pub const ALLOWANCE_TOTAL_AMOUNT: &str = "ram:AllowanceTotalAmount";
    pub const TAX_BASIS_TOTAL_AMOUNT: &str = "ram:TaxBasisTotalAmount";
    pub const TAX_TOTAL_AMOUNT: &str = "ram:TaxTotalAmount";
    pub const GRAND_TOTAL_AMOUNT: &str = "ram:GrandTotalAmount";
    pub const PREPAID_AMOUNT: &str = "ram:TotalPrepaidAmount";
    pub const DUE_PAYABLE_AMOUNT: &str = "ram:DuePayableAmount";

    // Line items
    pub const LINE_ITEM: &str = "ram:IncludedSupplyChainTradeLineItem";
    pub const LINE_ID: &str = "ram:LineID";
    pub const TRADE_PRODUCT: &str = "ram:SpecifiedTradeProduct";
    pub const LINE_AGREEMENT: &str = "ram:SpecifiedLineTradeAgreement";
    pub const GROSS_PRICE: &str = "ram:GrossPriceProductTradePrice";
    pub const NET_PRICE: &str = "ram:NetPriceProductTradePrice";
    pub const CHARGE_AMOUNT: &str = "ram:ChargeAmount";
    pub const BASIS_QUANTITY: &str = "ram:BasisQuantity";
    pub const BILLED_QUANTITY: &str = "ram:BilledQuantity";
    pub const LINE_SETTLEMENT: &str = "ram:SpecifiedLineTradeSettlement";
    pub const LINE_MONETARY_SUMMATION: &str = "ram:SpecifiedTradeSettlementLineMonetarySummation";
}
