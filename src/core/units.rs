//! UN/CEFACT Recommendation 20 unit codes seen on CII line items.
//!
//! Unknown codes are not an error: the raw code is kept on the line item and
//! a [`DecodeWarning::UnknownUnitCode`](super::DecodeWarning) is raised.

/// Whether `code` belongs to the recognised Rec 20 subset.
pub fn is_known_unit_code(code: &str) -> bool {
    UNIT_CODES.binary_search(&code).is_ok()
}

// Sorted for binary search.
static UNIT_CODES: &[&str] = &[
    "ANN", // year
    "C62", // one (piece)
    "CMT", // centimetre
    "DAY", // day
    "DZN", // dozen
    "GRM", // gram
    "H87", // piece
    "HUR", // hour
    "KGM", // kilogram
    "KMT", // kilometre
    "KWH", // kilowatt-hour
    "LS",  // lump sum
    "LTR", // litre
    "MIN", // minute
    "MLT", // millilitre
    "MMT", // millimetre
    "MON", // month
    "MTK", // square metre
    "MTQ", // cubic metre
    "MTR", // metre
    "P1",  // percent
    "PCE", // piece (legacy ZUGFeRD 1.0)
    "PR",  // pair
    "SET", // set
    "TNE", // tonne
    "WEE", // week
    "XPK", // package
    "XPX", // pallet
];
