//! ISO 4217 codes accepted as invoice currency without a warning.

/// Whether `code` is a recognised ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

// Sorted for binary search. European currencies plus the major trading ones.
static CURRENCY_CODES: &[&str] = &[
    "AUD", "BGN", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HUF", "ISK", "JPY",
    "NOK", "PLN", "RON", "RSD", "SEK", "TRY", "UAH", "USD",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert!(is_known_currency_code("EUR"));
        assert!(is_known_currency_code("CHF"));
        assert!(!is_known_currency_code("EURO"));
        assert!(!is_known_currency_code("eur"));
        assert!(!is_known_currency_code("XXX"));
    }

    #[test]
    fn table_is_sorted() {
        assert!(CURRENCY_CODES.windows(2).all(|w| w[0] < w[1]));
    }
}
