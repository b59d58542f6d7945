use serde::{Deserialize, Serialize};

use super::extract::extract_with_warnings;
use super::tree::Document;
use crate::core::{
    DecodeError, DecodeWarning, InvoiceModel, ValidationConfig, ValidationReport, validate_with,
};

/// Options for [`decode_with`] and [`decode_detailed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Tolerance used by the arithmetic checks.
    pub validation: ValidationConfig,
}

/// Everything a decode produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub invoice: InvoiceModel,
    pub report: ValidationReport,
    /// Recoverable problems met while building `invoice`, in the order raised.
    pub warnings: Vec<DecodeWarning>,
}

/// Decode a CII XML payload and validate its arithmetic with the default
/// one-cent tolerance.
///
/// An arithmetically inconsistent invoice is still `Ok`; look at
/// [`ValidationReport::is_valid`]. `Err` means the payload is not usable XML
/// or lacks a mandatory field.
pub fn decode(input: &[u8]) -> Result<(InvoiceModel, ValidationReport), DecodeError> {
    decode_with(input, &DecodeOptions::default())
}

/// [`decode`] with explicit options.
pub fn decode_with(
    input: &[u8],
    options: &DecodeOptions,
) -> Result<(InvoiceModel, ValidationReport), DecodeError> {
    let decoded = decode_detailed(input, options)?;
    Ok((decoded.invoice, decoded.report))
}

/// Decode and also return the decode warnings.
pub fn decode_detailed(input: &[u8], options: &DecodeOptions) -> Result<Decoded, DecodeError> {
    let doc = Document::parse(input)?;
    tracing::debug!(bytes = input.len(), elements = doc.len(), "parsed CII document");

    let (invoice, warnings) = extract_with_warnings(&doc)?;
    tracing::debug!(
        invoice = %invoice.invoice_number,
        lines = invoice.line_items.len(),
        warnings = warnings.len(),
        "extracted invoice model"
    );

    let report = validate_with(&invoice, &options.validation);
    Ok(Decoded {
        invoice,
        report,
        warnings,
    })
}

/// Decode many payloads on the rayon pool. Results keep the input order.
#[cfg(feature = "parallel")]
pub fn decode_batch(
    inputs: &[&[u8]],
    options: &DecodeOptions,
) -> Vec<Result<Decoded, DecodeError>> {
    use rayon::prelude::*;

    inputs
        .par_iter()
        .map(|input| decode_detailed(input, options))
        .collect()
}
