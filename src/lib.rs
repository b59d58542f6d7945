//! # ciicheck
//!
//! Decoder and arithmetic validator for UN/CEFACT Cross Industry Invoice
//! (CII) XML, the syntax behind ZUGFeRD 2.x, Factur-X and XRechnung CII.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! The decoded model follows the [EN 16931](https://standards.cencenelec.eu/dyn/www/f?p=205:110:0::::FSP_PROJECT:60602)
//! business terms for the fields it carries.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "cii")] {
//! use ciicheck::decode;
//! use rust_decimal_macros::dec;
//!
//! let xml = br#"<rsm:CrossIndustryInvoice>
//!   <rsm:ExchangedDocument><ram:ID>RE-2024-001</ram:ID><ram:TypeCode>380</ram:TypeCode></rsm:ExchangedDocument>
//!   <ram:ApplicableHeaderTradeSettlement>
//!     <ram:InvoiceCurrencyCode>EUR</ram:InvoiceCurrencyCode>
//!     <ram:ApplicableTradeTax>
//!       <ram:CalculatedAmount>19.00</ram:CalculatedAmount>
//!       <ram:CategoryCode>S</ram:CategoryCode>
//!       <ram:RateApplicablePercent>19</ram:RateApplicablePercent>
//!     </ram:ApplicableTradeTax>
//!     <ram:SpecifiedTradeSettlementHeaderMonetarySummation>
//!       <ram:LineTotalAmount>0.00</ram:LineTotalAmount>
//!       <ram:TaxBasisTotalAmount>100.00</ram:TaxBasisTotalAmount>
//!       <ram:TaxTotalAmount>19.00</ram:TaxTotalAmount>
//!       <ram:GrandTotalAmount>100.00</ram:GrandTotalAmount>
//!       <ram:DuePayableAmount>100.00</ram:DuePayableAmount>
//!     </ram:SpecifiedTradeSettlementHeaderMonetarySummation>
//!   </ram:ApplicableHeaderTradeSettlement>
//! </rsm:CrossIndustryInvoice>"#;
//!
//! let (invoice, report) = decode(xml).unwrap();
//! assert_eq!(invoice.monetary_summary.tax_total, dec!(19.00));
//! assert!(!report.is_valid());
//! assert_eq!(report.errors().next().unwrap().field, "grandTotal");
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Invoice model, arithmetic validation, code lists |
//! | `cii` (default) | CII XML parsing and field extraction |
//! | `parallel` | `decode_batch` on the rayon thread pool |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "cii")]
pub mod cii;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

#[cfg(feature = "cii")]
pub use crate::cii::{DecodeOptions, Decoded, decode, decode_detailed, decode_with};

#[cfg(feature = "parallel")]
pub use crate::cii::decode_batch;
