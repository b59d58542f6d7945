#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are bugs.
    let Ok((invoice, report)) = ciicheck::decode(data) else {
        return;
    };
    // A decoded model always carries the mandatory header fields.
    assert!(!invoice.invoice_number.is_empty());
    assert!(!invoice.currency.is_empty());
    let _ = report.to_string();
});
