//! Cross-check of the calculation engine against reference spreadsheet
//! formulas, field by field.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::FinancialConstants;
use crate::engine::calculation::{CalculationEngine, CalculationError};
use crate::engine::types::CalculationResult;

pub const MAX_ALLOWED_DIFFERENCE: f64 = 0.01;
pub const MAX_ALLOWED_RELATIVE_DIFFERENCE: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceCase {
    pub name: String,
    pub description: String,
    pub house_price: f64,
    pub monthly_rent: f64,
    pub expected: CalculationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCheck {
    pub field: &'static str,
    pub expected: f64,
    pub actual: f64,
    pub absolute_difference: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub fields: Vec<FieldCheck>,
    pub passed: bool,
}

impl CaseReport {
    pub fn failed_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.passed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParityReport {
    pub cases: Vec<CaseReport>,
    pub overall_passed: bool,
}

impl ParityReport {
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }
}

/// Expected figures written out the way the spreadsheet computes them,
/// independent of the engine's helpers.
pub fn reference_case(
    name: &str,
    description: &str,
    house_price: f64,
    monthly_rent: f64,
    constants: &FinancialConstants,
) -> ReferenceCase {
    let purchase_expenses = house_price * constants.purchase_expense_rate;
    let loan_amount = house_price * constants.loan_usage_ratio;
    let down_payment = house_price - loan_amount;

    let r = constants.monthly_interest_rate;
    let n = constants.loan_term_months as f64;
    let compound_factor = (1.0 + r).powf(n);
    let monthly_installment = loan_amount * (r * compound_factor) / (compound_factor - 1.0);
    let total_loan_repayment = monthly_installment * n;

    let real_total_cost = down_payment + total_loan_repayment + purchase_expenses;

    let gross_annual_rent = monthly_rent * 12.0;
    let taxable_income = (gross_annual_rent - constants.annual_rent_tax_exemption).max(0.0);
    let annual_tax = taxable_income * constants.income_tax_rate;
    let net_annual_rent = gross_annual_rent - annual_tax;

    ReferenceCase {
        name: name.to_string(),
        description: description.to_string(),
        house_price,
        monthly_rent,
        expected: CalculationResult {
            house_price,
            monthly_rent,
            purchase_expenses,
            loan_amount,
            down_payment,
            monthly_installment,
            total_loan_repayment,
            real_total_cost,
            gross_annual_rent,
            annual_tax,
            net_annual_rent,
            amortization_years: real_total_cost / net_annual_rent,
        },
    }
}

/// Typical market, tax-exemption boundary, and high-value listings.
pub fn standard_cases(constants: &FinancialConstants) -> Vec<ReferenceCase> {
    vec![
        reference_case(
            "A: typical market",
            "5M TL property, 25K TL/month rent",
            5_000_000.0,
            25_000.0,
            constants,
        ),
        reference_case(
            "B: tax exemption boundary",
            "Annual rent just under the exemption, no tax owed",
            1_500_000.0,
            4_833.33,
            constants,
        ),
        reference_case(
            "C: high value",
            "10M TL property, 50K TL/month rent",
            10_000_000.0,
            50_000.0,
            constants,
        ),
    ]
}

pub fn validate_case(engine: &CalculationEngine, case: &ReferenceCase) -> Result<CaseReport, CalculationError> {
    let actual = engine.calculate(case.house_price, case.monthly_rent)?;
    let expected = &case.expected;

    let fields = vec![
        compare("purchase_expenses", expected.purchase_expenses, actual.purchase_expenses),
        compare("loan_amount", expected.loan_amount, actual.loan_amount),
        compare("down_payment", expected.down_payment, actual.down_payment),
        compare("monthly_installment", expected.monthly_installment, actual.monthly_installment),
        compare("total_loan_repayment", expected.total_loan_repayment, actual.total_loan_repayment),
        compare("real_total_cost", expected.real_total_cost, actual.real_total_cost),
        compare("gross_annual_rent", expected.gross_annual_rent, actual.gross_annual_rent),
        compare("annual_tax", expected.annual_tax, actual.annual_tax),
        compare("net_annual_rent", expected.net_annual_rent, actual.net_annual_rent),
        compare("amortization_years", expected.amortization_years, actual.amortization_years),
    ];

    let passed = fields.iter().all(|f| f.passed);
    if passed {
        info!("Parity case {} passed", case.name);
    } else {
        warn!("Parity case {} failed on {} field(s)", case.name, fields.iter().filter(|f| !f.passed).count());
    }

    Ok(CaseReport {
        name: case.name.clone(),
        fields,
        passed,
    })
}

pub fn validate_all(engine: &CalculationEngine, cases: &[ReferenceCase]) -> Result<ParityReport, CalculationError> {
    let cases = cases
        .iter()
        .map(|case| validate_case(engine, case))
        .collect::<Result<Vec<_>, _>>()?;
    let overall_passed = cases.iter().all(|c| c.passed);

    Ok(ParityReport { cases, overall_passed })
}

/// Passes on either the absolute or the relative tolerance.
fn compare(field: &'static str, expected: f64, actual: f64) -> FieldCheck {
    let absolute_difference = (expected - actual).abs();
    let passed_absolute = absolute_difference <= MAX_ALLOWED_DIFFERENCE;
    let passed_relative = if expected != 0.0 {
        absolute_difference / expected.abs() <= MAX_ALLOWED_RELATIVE_DIFFERENCE
    } else {
        absolute_difference == 0.0
    };

    FieldCheck {
        field,
        expected,
        actual,
        absolute_difference,
        passed: passed_absolute || passed_relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_matches_reference_cases() {
        let constants = FinancialConstants::default();
        let engine = CalculationEngine::new(constants);
        let report = validate_all(&engine, &standard_cases(&constants)).unwrap();

        assert!(report.overall_passed);
        assert_eq!(report.passed_count(), 3);
        assert!(report.cases.iter().all(|c| c.fields.len() == 10));
    }

    #[test]
    fn test_boundary_case_has_no_tax() {
        let constants = FinancialConstants::default();
        let cases = standard_cases(&constants);
        assert_eq!(cases[1].expected.annual_tax, 0.0);
    }

    #[test]
    fn test_detects_mismatch() {
        let constants = FinancialConstants::default();
        let engine = CalculationEngine::new(constants);
        let mut case = reference_case("tampered", "", 5_000_000.0, 25_000.0, &constants);
        case.expected.monthly_installment += 50.0;

        let report = validate_case(&engine, &case).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.fields[3].field, "monthly_installment");
    }

    #[test]
    fn test_relative_tolerance_on_large_values() {
        // 0.5 TL on ~7.7M is well within 0.01%
        assert!(compare("real_total_cost", 7_691_958.0, 7_691_958.5).passed);
        assert!(!compare("annual_tax", 0.0, 0.5).passed);
    }

    #[test]
    fn test_invalid_case_is_an_error() {
        let constants = FinancialConstants::default();
        let engine = CalculationEngine::new(constants);
        let case = reference_case("bad", "", 0.0, 25_000.0, &constants);
        assert!(validate_case(&engine, &case).is_err());
    }
}
