//! Decode CII files given on the command line and print the validation result.
//!
//! ```text
//! cargo run --example decode_invoice -- factur-x.xml xrechnung.xml
//! ```

use ciicheck::cii::{DecodeOptions, decode_detailed};
use ciicheck::core::*;

fn main() {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: decode_invoice <file.xml>...");
        std::process::exit(2);
    }

    let mut failed = false;
    for path in &paths {
        println!("=== {path} ===");
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                println!("  cannot read: {e}");
                failed = true;
                continue;
            }
        };

        match decode_detailed(&bytes, &DecodeOptions::default()) {
            Ok(decoded) => {
                let inv = &decoded.invoice;
                println!("  {} {} ({})", inv.kind(), inv.invoice_number, inv.currency);
                if let Some(profile) = &inv.profile {
                    println!("  Profile: {profile}");
                }
                if let Some(date) = inv.issue_date {
                    println!("  Issued:  {date}");
                }
                if let Some(date) = inv.due_date {
                    println!("  Due:     {date}");
                }
                println!("  Seller:  {} / {}", inv.seller.name, inv.seller.address);
                println!("  Buyer:   {} / {}", inv.buyer.name, inv.buyer.address);
                for line in &inv.line_items {
                    println!(
                        "    [{}] {} {} {} × {} = {}",
                        line.id, line.name, line.quantity, line.unit_code, line.unit_price, line.line_total
                    );
                }
                let totals = &inv.monetary_summary;
                println!(
                    "  Net {}  VAT {}  Gross {}  Due {}",
                    totals.tax_basis_total, totals.tax_total, totals.grand_total, totals.due_total
                );
                for warning in &decoded.warnings {
                    println!("  warning: {warning}");
                }
                println!("  {}", decoded.report);
                failed |= !decoded.report.is_valid();
            }
            Err(e) => {
                println!("  {e}");
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
