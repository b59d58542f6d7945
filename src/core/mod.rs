//! Invoice model, error taxonomy and arithmetic validation.
//!
//! Everything here is independent of the XML syntax: an [`InvoiceModel`] can
//! be validated no matter how it was produced.

pub mod currencies;
mod error;
mod types;
pub mod units;
mod validation;

pub use currencies::is_known_currency_code;
pub use error::*;
pub use types::*;
pub use units::is_known_unit_code;
pub use validation::*;
