use tracing::debug;

use crate::config::FinancialConstants;
use crate::engine::types::CalculationResult;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalculationError {
    #[error("Invalid argument: {field} must be greater than zero, got {value}")]
    InvalidArgument { field: &'static str, value: f64 },

    #[error("Projection must cover at least one year, got {0}")]
    InvalidProjectionYears(u32),

    #[error("Loan term must be at least one month, got {0}")]
    InvalidLoanTerm(u32),

    #[error("Calculation produced a non-finite {field}")]
    NonFinite { field: &'static str },
}

/// Reject anything that would turn into NaN or infinity downstream.
pub fn require_positive(field: &'static str, value: f64) -> Result<(), CalculationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CalculationError::InvalidArgument { field, value })
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), CalculationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalculationError::NonFinite { field })
    }
}

/// Fixed periodic payment amortizing `present_value` over `periods` at `rate`.
/// Formula: P * r(1+r)^n / ((1+r)^n - 1), or P / n at a zero rate.
pub fn pmt(rate: f64, periods: u32, present_value: f64) -> f64 {
    if rate == 0.0 {
        return present_value / periods as f64;
    }
    let compound_factor = (1.0 + rate).powi(periods as i32);
    present_value * (rate * compound_factor) / (compound_factor - 1.0)
}

/// Purchase cost structure and loan figures shared by the single-point and
/// scenario engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financing {
    pub purchase_expenses: f64,
    pub loan_amount: f64,
    pub down_payment: f64,
    pub monthly_installment: f64,
    pub total_loan_repayment: f64,
    pub real_total_cost: f64,
}

impl Financing {
    pub fn new(
        house_price: f64,
        monthly_interest_rate: f64,
        constants: &FinancialConstants,
    ) -> Result<Self, CalculationError> {
        if constants.loan_term_months == 0 {
            return Err(CalculationError::InvalidLoanTerm(constants.loan_term_months));
        }

        let purchase_expenses = house_price * constants.purchase_expense_rate;
        let loan_amount = house_price * constants.loan_usage_ratio;
        let down_payment = house_price - loan_amount;

        let monthly_installment = pmt(monthly_interest_rate, constants.loan_term_months, loan_amount);
        let total_loan_repayment = monthly_installment * constants.loan_term_months as f64;

        let real_total_cost = down_payment + total_loan_repayment + purchase_expenses;
        ensure_finite("monthly_installment", monthly_installment)?;
        ensure_finite("real_total_cost", real_total_cost)?;

        Ok(Self {
            purchase_expenses,
            loan_amount,
            down_payment,
            monthly_installment,
            total_loan_repayment,
            real_total_cost,
        })
    }

    /// Cash out of pocket on day one.
    pub fn initial_investment(&self) -> f64 {
        self.down_payment + self.purchase_expenses
    }
}

/// Single-point amortization calculation under the baseline constants.
#[derive(Debug, Clone, Default)]
pub struct CalculationEngine {
    constants: FinancialConstants,
}

impl CalculationEngine {
    pub fn new(constants: FinancialConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &FinancialConstants {
        &self.constants
    }

    pub fn calculate(&self, house_price: f64, monthly_rent: f64) -> Result<CalculationResult, CalculationError> {
        require_positive("house_price", house_price)?;
        require_positive("monthly_rent", monthly_rent)?;

        let financing = Financing::new(house_price, self.constants.monthly_interest_rate, &self.constants)?;

        let gross_annual_rent = monthly_rent * 12.0;
        let annual_tax = self.constants.annual_rent_tax(gross_annual_rent);
        let net_annual_rent = gross_annual_rent - annual_tax;

        let amortization_years = financing.real_total_cost / net_annual_rent;
        ensure_finite("amortization_years", amortization_years)?;

        debug!(
            "Calculated: price={:.0}, rent={:.0}, installment={:.2}, amortization={:.2}y",
            house_price, monthly_rent, financing.monthly_installment, amortization_years
        );

        Ok(CalculationResult {
            house_price,
            monthly_rent,
            purchase_expenses: financing.purchase_expenses,
            loan_amount: financing.loan_amount,
            down_payment: financing.down_payment,
            monthly_installment: financing.monthly_installment,
            total_loan_repayment: financing.total_loan_repayment,
            real_total_cost: financing.real_total_cost,
            gross_annual_rent,
            annual_tax,
            net_annual_rent,
            amortization_years,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_listing() {
        // 5M price, 25K rent:
        // loan = 2.5M, PMT(0.0249, 60, 2.5M) ≈ 80,699.32
        // gross = 300,000, tax = (300,000 - 58,000) * 0.20 = 48,400
        let result = CalculationEngine::default().calculate(5_000_000.0, 25_000.0).unwrap();

        assert!((result.purchase_expenses - 350_000.0).abs() < 1e-6);
        assert!((result.loan_amount - 2_500_000.0).abs() < 1e-6);
        assert!((result.monthly_installment - 80_699.32).abs() < 0.01);
        assert!((result.total_loan_repayment - result.monthly_installment * 60.0).abs() < 1e-6);
        assert!((result.gross_annual_rent - 300_000.0).abs() < 1e-9);
        assert!((result.annual_tax - 48_400.0).abs() < 1e-6);
        assert!((result.net_annual_rent - 251_600.0).abs() < 1e-6);

        let expected_cost = 2_500_000.0 + result.total_loan_repayment + 350_000.0;
        assert!((result.real_total_cost - expected_cost).abs() < 1e-6);
        assert!((result.amortization_years - expected_cost / 251_600.0).abs() < 1e-9);
    }

    #[test]
    fn test_down_payment_plus_loan_is_price() {
        let engine = CalculationEngine::default();
        for price in [100_000.0, 1_234_567.0, 5_000_000.0, 99_999_999.0] {
            let result = engine.calculate(price, 10_000.0).unwrap();
            assert_eq!(result.down_payment + result.loan_amount, price);
        }
    }

    #[test]
    fn test_deterministic() {
        let engine = CalculationEngine::default();
        let first = engine.calculate(3_750_000.0, 17_500.0).unwrap();
        let second = engine.calculate(3_750_000.0, 17_500.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_tax_below_exemption() {
        let result = CalculationEngine::default().calculate(1_500_000.0, 4_000.0).unwrap();
        assert_eq!(result.annual_tax, 0.0);
        assert_eq!(result.net_annual_rent, result.gross_annual_rent);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let engine = CalculationEngine::default();
        assert_eq!(
            engine.calculate(0.0, 25_000.0),
            Err(CalculationError::InvalidArgument { field: "house_price", value: 0.0 })
        );
        assert!(engine.calculate(5_000_000.0, -1.0).is_err());
        assert!(engine.calculate(f64::NAN, 25_000.0).is_err());
        assert!(engine.calculate(5_000_000.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_pmt_zero_rate() {
        assert_eq!(pmt(0.0, 60, 600_000.0), 10_000.0);
    }

    #[test]
    fn test_pmt_reference_value() {
        assert!((pmt(0.0249, 60, 2_500_000.0) - 80_699.32).abs() < 0.01);
    }

    #[test]
    fn test_zero_loan_term_fails_loudly() {
        let constants = FinancialConstants {
            loan_term_months: 0,
            ..FinancialConstants::default()
        };
        assert_eq!(
            CalculationEngine::new(constants).calculate(5_000_000.0, 25_000.0),
            Err(CalculationError::InvalidLoanTerm(0))
        );
    }

    #[test]
    fn test_non_finite_amortization_rejected() {
        // Full tax with no exemption leaves no net rent
        let constants = FinancialConstants {
            income_tax_rate: 1.0,
            annual_rent_tax_exemption: 0.0,
            ..FinancialConstants::default()
        };
        assert_eq!(
            CalculationEngine::new(constants).calculate(5_000_000.0, 25_000.0),
            Err(CalculationError::NonFinite { field: "amortization_years" })
        );
    }
}
