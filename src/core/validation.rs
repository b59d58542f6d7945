use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::types::*;

/// Default tolerance between declared and recomputed amounts (one cent).
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.01);

/// Tunables for [`validate_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Largest accepted absolute difference after rounding both sides.
    pub tolerance: Decimal,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// How serious a [`ValidationIssue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Breach of an arithmetic invariant; makes the report invalid.
    Error,
    /// Drift within tolerance or a supplementary cross-check.
    Warning,
}

/// Overall verdict of a [`ValidationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

/// A declared figure that disagrees with its recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Model name of the declared field (e.g. "grandTotal", "lineItems[0].lineTotal").
    pub field: String,
    /// Recomputed value.
    pub expected: Decimal,
    /// Declared value.
    pub actual: Decimal,
    /// Whether the difference is larger than the configured tolerance.
    pub delta_exceeds_tolerance: bool,
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "[{level}] {}: expected {}, found {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Result of [`validate`]: every issue found, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let status = if issues.iter().any(|i| i.severity == Severity::Error) {
            ValidationStatus::Invalid
        } else {
            ValidationStatus::Valid
        };
        Self { status, issues }
    }

    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }

    /// Issues with [`Severity::Error`].
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Issues with [`Severity::Warning`].
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self.status {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
        };
        write!(f, "{status} ({} issues)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

/// Recompute the invoice totals and compare them with the declared ones,
/// using the default one-cent tolerance.
///
/// Never short-circuits: every breach is reported.
pub fn validate(invoice: &InvoiceModel) -> ValidationReport {
    validate_with(invoice, &ValidationConfig::default())
}

/// [`validate`] with explicit configuration.
pub fn validate_with(invoice: &InvoiceModel, config: &ValidationConfig) -> ValidationReport {
    let mut checker = Checker {
        tolerance: config.tolerance,
        issues: Vec::new(),
    };
    let totals = &invoice.monetary_summary;

    // Sum of line net amounts. Minimum and BasicWL documents have no lines.
    let lineless_profile = invoice
        .profile
        .as_ref()
        .is_some_and(|p| !p.has_line_items());
    if !(lineless_profile && invoice.line_items.is_empty()) {
        let expected_line_total = invoice
            .line_items
            .iter()
            .try_fold(Decimal::ZERO, |sum, l| sum.checked_add(l.line_total));
        checker.compare("lineTotal", expected_line_total, totals.line_total, Severity::Error);
    }

    // Line net amount = quantity × price / base quantity
    for (i, line) in invoice.line_items.iter().enumerate() {
        checker.compare(
            &format!("lineItems[{i}].lineTotal"),
            expected_line_amount(line),
            line.line_total,
            Severity::Error,
        );
    }

    // VAT total = tax basis × rate / 100
    let expected_tax = totals
        .tax_basis_total
        .checked_mul(invoice.tax.rate_percent)
        .and_then(|v| v.checked_div(dec!(100)));
    checker.compare("taxTotal", expected_tax, totals.tax_total, Severity::Error);

    // Grand total = tax basis + VAT
    let expected_grand = totals.tax_basis_total.checked_add(totals.tax_total);
    checker.compare("grandTotal", expected_grand, totals.grand_total, Severity::Error);

    // Due amount may be lower than the grand total (prepayments), never higher.
    // Measured against the recomputed grand total; skipped when that overflowed.
    if let Some(grand) = expected_grand.map(|g| round_half_up(g, 2)) {
        let due = round_half_up(totals.due_total, 2);
        let above = due
            .checked_sub(grand)
            .map_or(due > grand, |d| d > checker.tolerance);
        if above {
            checker.push("dueTotal", grand, due, true, Severity::Error);
        }
    }

    // Supplementary cross-checks
    checker.compare(
        "tax.calculatedAmount",
        Some(totals.tax_total),
        invoice.tax.calculated_amount,
        Severity::Warning,
    );
    if let Some(basis) = invoice.tax.basis_amount {
        checker.compare(
            "tax.basisAmount",
            Some(totals.tax_basis_total),
            basis,
            Severity::Warning,
        );
    }
    if totals.allowance_total.is_some() || totals.charge_total.is_some() {
        let expected_basis = totals
            .line_total
            .checked_sub(totals.allowance_total.unwrap_or_default())
            .and_then(|v| v.checked_add(totals.charge_total.unwrap_or_default()));
        checker.compare(
            "taxBasisTotal",
            expected_basis,
            totals.tax_basis_total,
            Severity::Warning,
        );
    }
    if let Some(prepaid) = totals.prepaid_total {
        checker.compare(
            "dueTotal",
            totals.grand_total.checked_sub(prepaid),
            totals.due_total,
            Severity::Warning,
        );
    }

    let report = ValidationReport::from_issues(checker.issues);
    tracing::debug!(
        invoice = %invoice.invoice_number,
        status = ?report.status,
        issues = report.issues.len(),
        "arithmetic validation finished"
    );
    report
}

/// Net amount a line should carry: quantity × unit price, divided by the
/// price base quantity when one is given, rounded half-up to cents.
///
/// `None` when the result does not fit in a [`Decimal`].
pub fn expected_line_amount(line: &LineItem) -> Option<Decimal> {
    let basis = line
        .price_basis_quantity
        .filter(|b| !b.is_zero())
        .unwrap_or(Decimal::ONE);
    let amount = line.quantity.checked_mul(line.unit_price)?.checked_div(basis)?;
    Some(round_half_up(amount, 2))
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

struct Checker {
    tolerance: Decimal,
    issues: Vec<ValidationIssue>,
}

impl Checker {
    /// Compare after rounding both sides to cents. Differences beyond the
    /// tolerance get `breach`; smaller non-zero drift is a warning.
    ///
    /// `expected` is `None` when recomputing it overflowed. That is always a
    /// breach, recorded with [`Decimal::MAX`] as the expected value.
    fn compare(
        &mut self,
        field: &str,
        expected: Option<Decimal>,
        actual: Decimal,
        breach: Severity,
    ) {
        let actual = round_half_up(actual, 2);
        let Some(expected) = expected.map(|e| round_half_up(e, 2)) else {
            tracing::warn!(field, %actual, "recomputed amount out of range");
            self.push(field, Decimal::MAX, actual, true, breach);
            return;
        };
        match expected.checked_sub(actual).map(|d| d.abs()) {
            Some(delta) if delta <= self.tolerance => {
                if !delta.is_zero() {
                    self.push(field, expected, actual, false, Severity::Warning);
                }
            }
            _ => self.push(field, expected, actual, true, breach),
        }
    }

    fn push(
        &mut self,
        field: &str,
        expected: Decimal,
        actual: Decimal,
        exceeds: bool,
        severity: Severity,
    ) {
        tracing::debug!(field, %expected, %actual, ?severity, "arithmetic mismatch");
        self.issues.push(ValidationIssue {
            field: field.to_string(),
            expected,
            actual,
            delta_exceeds_tolerance: exceeds,
            severity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: Decimal, price: Decimal, total: Decimal) -> LineItem {
        LineItem {
            id: "1".into(),
            name: "Beratung".into(),
            quantity: qty,
            unit_code: "HUR".into(),
            unit_price: price,
            price_basis_quantity: None,
            gross_price: None,
            line_total: total,
            tax_rate: Some(dec!(19)),
            tax_category: Some("S".into()),
        }
    }

    /// Scenario A: 2 × 50.00 at 19 %.
    fn scenario_a() -> InvoiceModel {
        InvoiceModel {
            invoice_number: "R-2024-001".into(),
            issue_date: None,
            due_date: None,
            type_code: "380".into(),
            currency: "EUR".into(),
            profile: None,
            buyer_reference: None,
            payment_reference: None,
            delivery_date: None,
            notes: Vec::new(),
            seller: Party::default(),
            buyer: Party::default(),
            monetary_summary: MonetarySummary {
                line_total: dec!(100.00),
                tax_basis_total: dec!(100.00),
                tax_total: dec!(19.00),
                grand_total: dec!(119.00),
                due_total: dec!(119.00),
                prepaid_total: None,
                allowance_total: None,
                charge_total: None,
            },
            tax: TaxDetail {
                rate_percent: dec!(19),
                category_code: "S".into(),
                calculated_amount: dec!(19.00),
                basis_amount: Some(dec!(100.00)),
                type_code: Some("VAT".into()),
            },
            line_items: vec![line(dec!(2), dec!(50.00), dec!(100.00))],
        }
    }

    #[test]
    fn consistent_invoice_is_valid() {
        let report = validate(&scenario_a());
        assert_eq!(report.status, ValidationStatus::Valid);
        assert!(report.issues.is_empty());
    }

    /// Scenario B: grand total declared without the VAT.
    #[test]
    fn grand_total_without_tax_is_invalid() {
        let mut inv = scenario_a();
        inv.monetary_summary.grand_total = dec!(100.00);

        let report = validate(&inv);
        assert_eq!(report.status, ValidationStatus::Invalid);
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "grandTotal");
        assert_eq!(errors[0].expected, dec!(119.00));
        assert_eq!(errors[0].actual, dec!(100.00));
        assert!(errors[0].delta_exceeds_tolerance);
    }

    #[test]
    fn one_cent_drift_passes_with_warning() {
        let mut inv = scenario_a();
        inv.monetary_summary.grand_total = dec!(119.01);

        let report = validate(&inv);
        assert!(report.is_valid());
        assert_eq!(report.errors().count(), 0);
        let warning = report.warnings().next().unwrap();
        assert_eq!(warning.field, "grandTotal");
        assert!(!warning.delta_exceeds_tolerance);
    }

    #[test]
    fn two_cent_drift_fails() {
        let mut inv = scenario_a();
        inv.monetary_summary.grand_total = dec!(119.02);

        let report = validate(&inv);
        assert!(!report.is_valid());
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "grandTotal");
    }

    #[test]
    fn all_breaches_are_collected() {
        let mut inv = scenario_a();
        inv.line_items[0].line_total = dec!(90.00);
        inv.monetary_summary.tax_total = dec!(20.00);
        inv.monetary_summary.due_total = dec!(200.00);

        let report = validate(&inv);
        // Five errors plus the tax.calculatedAmount cross-check.
        assert_eq!(report.issues.len(), 6);
        let fields: Vec<_> = report.errors().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "lineTotal",
                "lineItems[0].lineTotal",
                "taxTotal",
                "grandTotal",
                "dueTotal"
            ]
        );
    }

    #[test]
    fn due_above_grand_total_is_invalid() {
        let mut inv = scenario_a();
        inv.monetary_summary.due_total = dec!(119.02);
        let report = validate(&inv);
        let error = report.errors().next().unwrap();
        assert_eq!(error.field, "dueTotal");
        assert_eq!(error.expected, dec!(119.00));
        assert_eq!(error.actual, dec!(119.02));
    }

    #[test]
    fn partial_payment_is_allowed() {
        let mut inv = scenario_a();
        inv.monetary_summary.due_total = dec!(19.00);
        assert!(validate(&inv).is_valid());
    }

    #[test]
    fn prepaid_mismatch_is_a_warning() {
        let mut inv = scenario_a();
        inv.monetary_summary.prepaid_total = Some(dec!(50.00));

        let report = validate(&inv);
        assert!(report.is_valid());
        let warning = report.warnings().next().unwrap();
        assert_eq!(warning.field, "dueTotal");
        assert_eq!(warning.expected, dec!(69.00));
        assert!(warning.delta_exceeds_tolerance);
    }

    #[test]
    fn price_basis_quantity_divides_price() {
        let mut l = line(dec!(250), dec!(12.50), dec!(31.25));
        l.price_basis_quantity = Some(dec!(100));
        assert_eq!(expected_line_amount(&l), Some(dec!(31.25)));

        l.price_basis_quantity = Some(Decimal::ZERO);
        assert_eq!(expected_line_amount(&l), Some(dec!(3125.00)));
    }

    #[test]
    fn line_amount_rounds_half_up() {
        let l = line(dec!(3), dec!(0.335), dec!(1.01));
        assert_eq!(expected_line_amount(&l), Some(dec!(1.01)));
        assert_eq!(round_half_up(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_half_up(dec!(-2.345), 2), dec!(-2.35));
    }

    #[test]
    fn line_amount_beyond_decimal_range_is_an_error() {
        let l = line(Decimal::MAX, dec!(2), dec!(100.00));
        assert_eq!(expected_line_amount(&l), None);

        let mut inv = scenario_a();
        inv.line_items = vec![l];
        let report = validate(&inv);
        assert!(!report.is_valid());
        let issue = report
            .errors()
            .find(|i| i.field == "lineItems[0].lineTotal")
            .unwrap();
        assert_eq!(issue.expected, Decimal::MAX);
        assert_eq!(issue.actual, dec!(100.00));
        assert!(issue.delta_exceeds_tolerance);
    }

    #[test]
    fn overflowing_totals_are_errors() {
        let mut inv = scenario_a();
        inv.line_items = vec![
            line(Decimal::ONE, Decimal::MAX, Decimal::MAX),
            line(Decimal::ONE, Decimal::MAX, Decimal::MAX),
        ];
        inv.monetary_summary.tax_basis_total = Decimal::MAX;
        inv.monetary_summary.tax_total = Decimal::MAX;

        let report = validate(&inv);
        let fields: Vec<&str> = report.errors().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, ["lineTotal", "taxTotal", "grandTotal"]);
        assert!(report.errors().all(|i| i.expected == Decimal::MAX));
    }

    #[test]
    fn due_total_far_below_grand_total_does_not_overflow() {
        let mut inv = scenario_a();
        inv.monetary_summary.due_total = Decimal::MIN;
        inv.monetary_summary.prepaid_total = Some(Decimal::MIN);
        let report = validate(&inv);
        assert!(report.errors().all(|i| i.field != "dueTotal"));
        let prepaid = report.warnings().find(|i| i.field == "dueTotal").unwrap();
        assert_eq!(prepaid.expected, Decimal::MAX);
    }

    #[test]
    fn minimum_profile_without_lines_skips_line_sum() {
        let mut inv = scenario_a();
        inv.line_items.clear();
        assert!(!validate(&inv).is_valid());

        inv.profile = Some(CiiProfile::Minimum);
        assert!(validate(&inv).is_valid());
    }

    #[test]
    fn custom_tolerance() {
        let mut inv = scenario_a();
        inv.monetary_summary.grand_total = dec!(119.02);
        let config = ValidationConfig {
            tolerance: dec!(0.02),
        };
        assert!(validate_with(&inv, &config).is_valid());
    }

    #[test]
    fn rendered_report() {
        let mut inv = scenario_a();
        inv.monetary_summary.grand_total = dec!(100.00);
        insta::assert_snapshot!(validate(&inv).to_string(), @r"
        invalid (1 issues)
          [error] grandTotal: expected 119.00, found 100.00
        ");
    }
}
