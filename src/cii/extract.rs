use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::resolve::{all_descendants, child, first_descendant, first_path, narrow, text_at};
use super::tags::*;
use super::tree::{Document, Node};
use crate::core::*;

/// Build the invoice model from a parsed CII document.
///
/// Recoverable problems are logged and dropped; use
/// [`extract_with_warnings`] to keep them.
pub fn extract(doc: &Document) -> Result<InvoiceModel, MissingFieldError> {
    extract_with_warnings(doc).map(|(invoice, _)| invoice)
}

/// Build the invoice model and return the recoverable problems met on the way.
///
/// Fails only when the invoice number, the currency or one of the five
/// summary amounts is absent or not a number.
pub fn extract_with_warnings(
    doc: &Document,
) -> Result<(InvoiceModel, Vec<DecodeWarning>), MissingFieldError> {
    let mut x = Extractor::default();
    let invoice = x.invoice(doc.root())?;
    Ok((invoice, x.warnings))
}

#[derive(Default)]
struct Extractor {
    warnings: Vec<DecodeWarning>,
}

impl Extractor {
    fn warn(&mut self, warning: DecodeWarning) {
        tracing::warn!(%warning, "recoverable CII decode problem");
        self.warnings.push(warning);
    }

    fn invoice(&mut self, root: Node<'_>) -> Result<InvoiceModel, MissingFieldError> {
        let header = first_descendant(root, EXCHANGED_DOCUMENT);
        let agreement = narrow(root, HEADER_AGREEMENT);
        let settlement = first_descendant(root, HEADER_SETTLEMENT);
        let settlement_or_root = settlement.unwrap_or(root);

        let invoice_number = header
            .and_then(|h| text_at(h, &[ID]))
            .ok_or_else(|| MissingFieldError::absent("invoiceNumber"))?
            .to_string();
        let currency = text_at(settlement_or_root, &[CURRENCY])
            .ok_or_else(|| MissingFieldError::absent("currency"))?
            .to_string();
        if currency.len() != 3 || !is_known_currency_code(&currency) {
            self.warn(DecodeWarning::UnknownCurrencyCode {
                code: currency.clone(),
            });
        }

        // Mandatory summary amounts come before the warning-only fields.
        let summation = first_descendant(settlement_or_root, HEADER_MONETARY_SUMMATION);
        let monetary_summary = self.monetary_summary(summation, &currency)?;

        let type_code = header
            .and_then(|h| text_at(h, &[TYPE_CODE]))
            .unwrap_or_default()
            .to_string();
        if type_code != COMMERCIAL_INVOICE_CODE {
            self.warn(DecodeWarning::UnknownTypeCode {
                code: type_code.clone(),
            });
        }

        let issue_date = header
            .and_then(|h| first_path(h, &[ISSUE_DATE_TIME, DATE_TIME_STRING]))
            .and_then(|n| self.date(n, "issueDate"));
        // Several terms blocks may exist; the due date sits in any one of them.
        let due_date = all_descendants(settlement_or_root, PAYMENT_TERMS)
            .into_iter()
            .find_map(|t| first_path(t, &[DUE_DATE_TIME, DATE_TIME_STRING]))
            .and_then(|n| self.date(n, "dueDate"));
        let delivery_date = first_descendant(root, HEADER_DELIVERY)
            .and_then(|d| {
                first_path(d, &[ACTUAL_DELIVERY_EVENT, OCCURRENCE_DATE_TIME, DATE_TIME_STRING])
            })
            .and_then(|n| self.date(n, "deliveryDate"));

        let profile = first_descendant(root, DOCUMENT_CONTEXT)
            .and_then(|c| text_at(c, &[GUIDELINE, ID]))
            .map(CiiProfile::from_urn);

        let notes: Vec<String> = header
            .map(|h| {
                all_descendants(h, INCLUDED_NOTE)
                    .into_iter()
                    .filter_map(|n| text_at(n, &[CONTENT]))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let seller = first_descendant(agreement, SELLER_PARTY)
            .map(party)
            .unwrap_or_default();
        let buyer = first_descendant(agreement, BUYER_PARTY)
            .map(party)
            .unwrap_or_default();

        // Without the settlement wrapper the line-level tax blocks are in scope too.
        let line_containers = all_descendants(root, LINE_ITEM);
        let header_tax = all_descendants(settlement_or_root, APPLICABLE_TRADE_TAX)
            .into_iter()
            .find(|t| !line_containers.iter().any(|l| l.contains(t)));
        let tax = self.tax_detail(header_tax);

        let line_items: Vec<LineItem> = line_containers
            .into_iter()
            .enumerate()
            .map(|(i, container)| self.line_item(i, container))
            .collect();

        Ok(InvoiceModel {
            invoice_number,
            issue_date,
            due_date,
            type_code,
            currency,
            profile,
            buyer_reference: text_at(agreement, &[BUYER_REFERENCE]).map(str::to_string),
            payment_reference: settlement
                .and_then(|s| text_at(s, &[PAYMENT_REFERENCE]))
                .map(str::to_string),
            delivery_date,
            notes,
            seller,
            buyer,
            monetary_summary,
            tax,
            line_items,
        })
    }

    fn monetary_summary(
        &mut self,
        summation: Option<Node<'_>>,
        currency: &str,
    ) -> Result<MonetarySummary, MissingFieldError> {
        let at = |tag: &str| summation.and_then(|s| first_descendant(s, tag));

        // A second TaxTotalAmount may state the VAT in the tax currency.
        let tax_total = summation.and_then(|s| {
            let candidates = all_descendants(s, TAX_TOTAL_AMOUNT);
            candidates
                .iter()
                .copied()
                .find(|n| n.attribute("currencyID").is_none_or(|c| c == currency))
                .or_else(|| candidates.first().copied())
        });

        Ok(MonetarySummary {
            line_total: self.required_amount(at(LINE_TOTAL_AMOUNT), "monetarySummary.lineTotal")?,
            tax_basis_total: self
                .required_amount(at(TAX_BASIS_TOTAL_AMOUNT), "monetarySummary.taxBasisTotal")?,
            tax_total: self.required_amount(tax_total, "monetarySummary.taxTotal")?,
            grand_total: self
                .required_amount(at(GRAND_TOTAL_AMOUNT), "monetarySummary.grandTotal")?,
            due_total: self.required_amount(at(DUE_PAYABLE_AMOUNT), "monetarySummary.dueTotal")?,
            prepaid_total: self.optional_amount(at(PREPAID_AMOUNT), "monetarySummary.prepaidTotal"),
            allowance_total: self
                .optional_amount(at(ALLOWANCE_TOTAL_AMOUNT), "monetarySummary.allowanceTotal"),
            charge_total: self
                .optional_amount(at(CHARGE_TOTAL_AMOUNT), "monetarySummary.chargeTotal"),
        })
    }

    fn tax_detail(&mut self, tax: Option<Node<'_>>) -> TaxDetail {
        let Some(tax) = tax else {
            return TaxDetail::default();
        };
        TaxDetail {
            rate_percent: self.number_or_zero(first_descendant(tax, RATE_PERCENT), "tax.ratePercent"),
            category_code: text_at(tax, &[CATEGORY_CODE])
                .unwrap_or_default()
                .to_string(),
            calculated_amount: match first_descendant(tax, CALCULATED_AMOUNT) {
                Some(n) => self
                    .optional_amount(Some(n), "tax.calculatedAmount")
                    .unwrap_or_default(),
                None => {
                    self.defaulted("tax.calculatedAmount", "");
                    Decimal::ZERO
                }
            },
            basis_amount: self.optional_amount(first_descendant(tax, BASIS_AMOUNT), "tax.basisAmount"),
            type_code: child(tax, TYPE_CODE)
                .map(|n| n.text())
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    fn line_item(&mut self, index: usize, container: Node<'_>) -> LineItem {
        let field = |name: &str| format!("lineItems[{index}].{name}");

        let id = text_at(container, &[LINE_ID])
            .map(str::to_string)
            .unwrap_or_else(|| (index + 1).to_string());
        let name = text_at(container, &[TRADE_PRODUCT, NAME])
            .unwrap_or_default()
            .to_string();

        let billed = first_descendant(container, BILLED_QUANTITY);
        let quantity = self.number_or_zero(billed, &field("quantity"));
        let unit_code = billed
            .and_then(|n| n.attribute("unitCode"))
            .unwrap_or_default()
            .trim()
            .to_string();
        if !is_known_unit_code(&unit_code) {
            self.warn(DecodeWarning::UnknownUnitCode {
                line: id.clone(),
                code: unit_code.clone(),
            });
        }

        let net_price = first_descendant(container, NET_PRICE);
        let unit_price = self.number_or_zero(
            net_price.and_then(|p| first_descendant(p, CHARGE_AMOUNT)),
            &field("unitPrice"),
        );
        let price_basis_quantity = self.optional_number(
            net_price.and_then(|p| first_descendant(p, BASIS_QUANTITY)),
            &field("priceBasisQuantity"),
        );
        let gross_price = self.optional_number(
            first_path(container, &[GROSS_PRICE, CHARGE_AMOUNT]),
            &field("grossPrice"),
        );

        let line_total_node = first_path(container, &[LINE_MONETARY_SUMMATION, LINE_TOTAL_AMOUNT]);
        let line_total = match line_total_node {
            Some(_) => self
                .optional_amount(line_total_node, &field("lineTotal"))
                .unwrap_or_default(),
            None => {
                self.defaulted(&field("lineTotal"), "");
                Decimal::ZERO
            }
        };

        let line_tax = first_path(container, &[LINE_SETTLEMENT, APPLICABLE_TRADE_TAX]);
        let tax_rate = self.optional_number(
            line_tax.and_then(|t| first_descendant(t, RATE_PERCENT)),
            &field("taxRate"),
        );
        let tax_category = line_tax
            .and_then(|t| text_at(t, &[CATEGORY_CODE]))
            .map(str::to_string);

        LineItem {
            id,
            name,
            quantity,
            unit_code,
            unit_price,
            price_basis_quantity,
            gross_price,
            line_total,
            tax_rate,
            tax_category,
        }
    }

    /// Mandatory amount: absent or unparseable aborts the decode.
    fn required_amount(
        &mut self,
        node: Option<Node<'_>>,
        field: &str,
    ) -> Result<Decimal, MissingFieldError> {
        let raw = node
            .map(|n| n.text())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MissingFieldError::absent(field))?;
        let value = parse_decimal(raw).ok_or_else(|| MissingFieldError::unparseable(field, raw))?;
        Ok(self.to_cents(value, field, raw))
    }

    /// Optional amount: absent is `None`, unparseable is `None` plus a warning.
    fn optional_amount(&mut self, node: Option<Node<'_>>, field: &str) -> Option<Decimal> {
        let raw = node?.text();
        match parse_decimal(raw) {
            Some(value) => Some(self.to_cents(value, field, raw)),
            None => {
                self.defaulted(field, raw);
                None
            }
        }
    }

    /// Optional number kept at full precision (prices, quantities, rates).
    fn optional_number(&mut self, node: Option<Node<'_>>, field: &str) -> Option<Decimal> {
        let raw = node?.text();
        let value = parse_decimal(raw);
        if value.is_none() {
            self.defaulted(field, raw);
        }
        value
    }

    /// Expected number that falls back to zero with a warning.
    fn number_or_zero(&mut self, node: Option<Node<'_>>, field: &str) -> Decimal {
        match node {
            Some(_) => self.optional_number(node, field).unwrap_or_default(),
            None => {
                self.defaulted(field, "");
                Decimal::ZERO
            }
        }
    }

    fn defaulted(&mut self, field: &str, raw: &str) {
        self.warn(DecodeWarning::UnparseableNumber {
            field: field.to_string(),
            value: raw.to_string(),
        });
    }

    /// Round an amount half-up to two decimals and fix its scale at 2.
    fn to_cents(&mut self, value: Decimal, field: &str, raw: &str) -> Decimal {
        let mut cents = round_half_up(value, 2);
        if cents != value {
            self.warn(DecodeWarning::ExcessPrecision {
                field: field.to_string(),
                value: raw.to_string(),
            });
        }
        cents.rescale(2);
        cents
    }

    /// `udt:DateTimeString` in format 102 (`CCYYMMDD`).
    fn date(&mut self, node: Node<'_>, field: &str) -> Option<NaiveDate> {
        let raw = node.text();
        let format_ok = node.attribute("format").is_none_or(|f| f.trim() == "102");
        let parsed = if format_ok { parse_ccyymmdd(raw) } else { None };
        if parsed.is_none() {
            self.warn(DecodeWarning::UnparseableDate {
                field: field.to_string(),
                value: raw.to_string(),
            });
        }
        parsed
    }
}

fn party(node: Node<'_>) -> Party {
    let address_node = first_descendant(node, POSTAL_ADDRESS);
    let part = |tag: &str| {
        address_node
            .and_then(|a| text_at(a, &[tag]))
            .map(str::to_string)
    };
    let postal_address = PostalAddress {
        line_one: part(LINE_ONE),
        line_two: part(LINE_TWO),
        postcode: part(POSTCODE),
        city: part(CITY),
        country: part(COUNTRY),
    };

    let mut vat_id = None;
    let mut tax_number = None;
    let mut unqualified = None;
    for registration in all_descendants(node, TAX_REGISTRATION) {
        let Some(id) = first_descendant(registration, ID) else {
            continue;
        };
        if id.text().is_empty() {
            continue;
        }
        match id.attribute("schemeID").map(str::trim) {
            Some("VA") => {
                vat_id.get_or_insert_with(|| id.text().to_string());
            }
            Some("FC") => {
                tax_number.get_or_insert_with(|| id.text().to_string());
            }
            _ => {
                unqualified.get_or_insert_with(|| id.text().to_string());
            }
        }
    }

    Party {
        name: child(node, NAME)
            .map(|n| n.text().to_string())
            .unwrap_or_default(),
        address: postal_address.single_line(),
        postal_address,
        vat_id: vat_id.or(unqualified),
        tax_number,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// Strict 8-digit `CCYYMMDD`.
fn parse_ccyymmdd(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = raw[0..4].parse().ok()?;
    let month = raw[4..6].parse().ok()?;
    let day = raw[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
