use thiserror::Error;

/// Fatal decode failure. No partial model is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The payload is not well-formed XML.
    #[error(transparent)]
    Malformed(#[from] MalformedXmlError),

    /// A mandatory field is absent or unusable.
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
}

/// The input bytes could not be parsed as XML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed XML at line {line}, column {column} (byte {offset}): {message}")]
pub struct MalformedXmlError {
    /// Byte offset into the input where the problem was detected.
    pub offset: u64,
    /// 1-based line number of `offset`.
    pub line: usize,
    /// 1-based column (in characters) of `offset`.
    pub column: usize,
    /// Human-readable description.
    pub message: String,
}

impl MalformedXmlError {
    /// Build an error for `offset`, deriving line and column from `input`.
    ///
    /// `input` is the raw payload; offsets past the end are clamped.
    pub fn at(input: &[u8], offset: u64, message: impl Into<String>) -> Self {
        let end = usize::try_from(offset).unwrap_or(usize::MAX).min(input.len());
        let before = &input[..end];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |p| p + 1);
        let column = String::from_utf8_lossy(&before[line_start..]).chars().count() + 1;
        Self {
            offset,
            line,
            column,
            message: message.into(),
        }
    }
}

/// One of the mandatory fields (invoice number, currency, the five summary
/// amounts) is absent, or present with a value that is not a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFieldError {
    /// Model name of the field (e.g. "monetarySummary.grandTotal").
    pub field: String,
    /// Raw text when the element exists but could not be interpreted.
    pub found: Option<String>,
}

impl MissingFieldError {
    /// The element does not exist in its scope.
    pub fn absent(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            found: None,
        }
    }

    /// The element exists but its text is unusable.
    pub fn unparseable(field: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            found: Some(raw.into()),
        }
    }
}

impl std::fmt::Display for MissingFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.found {
            Some(raw) => write!(
                f,
                "mandatory field {} has unparseable value '{}'",
                self.field, raw
            ),
            None => write!(f, "missing mandatory field {}", self.field),
        }
    }
}

impl std::error::Error for MissingFieldError {}

/// Recoverable decoding problem. The affected field is left empty or passed
/// through raw and decoding continues.
///
/// Warnings describe the document's structure, not its arithmetic, so they
/// are never part of a [`ValidationReport`](super::ValidationReport).
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub enum DecodeWarning {
    /// A date was not in `CCYYMMDD` (format 102) form.
    #[error("unparseable date in {field}: '{value}'")]
    UnparseableDate { field: String, value: String },

    /// A line item uses a unit code outside the known UN/CEFACT Rec 20 subset.
    #[error("line {line}: unknown unit code '{code}'")]
    UnknownUnitCode { line: String, code: String },

    /// The document type code is not 380 (commercial invoice).
    #[error("unknown invoice type code '{code}'")]
    UnknownTypeCode { code: String },

    /// The currency is not a known ISO 4217 code.
    #[error("unknown currency code '{code}'")]
    UnknownCurrencyCode { code: String },

    /// An optional or per-line number was absent or unparseable and defaulted.
    #[error("unparseable number in {field}: '{value}'")]
    UnparseableNumber { field: String, value: String },

    /// An amount carried more than two fractional digits and was rounded.
    #[error("{field} has more than two decimal places: '{value}'")]
    ExcessPrecision { field: String, value: String },
}
