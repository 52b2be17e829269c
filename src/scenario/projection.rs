use tracing::debug;

use crate::config::FinancialConstants;
use crate::engine::calculation::{require_positive, CalculationError, Financing};
use crate::scenario::types::{InvestmentScenario, RiskMetrics, ScenarioResult, YearlyProjection};

pub const DEFAULT_PROJECTION_YEARS: u32 = 10;

/// Installments are charged in the first five projection years only,
/// independent of `loan_term_months`.
const LOAN_PAYMENT_YEARS: u32 = 5;

/// Multi-year cash-flow projection under one economic scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioEngine {
    constants: FinancialConstants,
}

impl ScenarioEngine {
    pub fn new(constants: FinancialConstants) -> Self {
        Self { constants }
    }

    pub fn calculate(
        &self,
        house_price: f64,
        monthly_rent: f64,
        scenario: &InvestmentScenario,
        years: u32,
    ) -> Result<ScenarioResult, CalculationError> {
        require_positive("house_price", house_price)?;
        require_positive("monthly_rent", monthly_rent)?;
        if years == 0 {
            return Err(CalculationError::InvalidProjectionYears(years));
        }

        let financing = Financing::new(house_price, scenario.monthly_interest_rate, &self.constants)?;
        let initial_investment = financing.initial_investment();
        let annual_installments = financing.monthly_installment * 12.0;

        let mut projections = Vec::with_capacity(years as usize);
        let mut cumulative_cash_flow = -initial_investment;
        let mut property_value = house_price;
        let mut rent = monthly_rent;

        for year in 1..=years {
            if year > 1 {
                rent *= 1.0 + scenario.annual_rent_growth;
            }

            let gross_rent = rent * 12.0;
            let vacancy_loss = gross_rent * scenario.vacancy_rate;
            let maintenance_cost = gross_rent * scenario.maintenance_cost_rate;
            let net_operating_income = gross_rent - vacancy_loss - maintenance_cost;
            // Tax is on gross rent, before vacancy and maintenance
            let annual_tax = self.constants.annual_rent_tax(gross_rent);
            let loan_payment = if year <= LOAN_PAYMENT_YEARS { annual_installments } else { 0.0 };

            let net_cash_flow = net_operating_income - annual_tax - loan_payment;
            cumulative_cash_flow += net_cash_flow;
            property_value *= 1.0 + scenario.annual_property_appreciation;

            projections.push(YearlyProjection {
                year,
                gross_rent,
                vacancy_loss,
                maintenance_cost,
                net_operating_income,
                annual_tax,
                loan_payment,
                net_cash_flow,
                cumulative_cash_flow,
                property_value,
            });
        }

        let risk_metrics = risk_metrics(
            initial_investment,
            &projections,
            property_value,
            scenario.annual_inflation_rate,
        );

        debug!(
            "Scenario {}: npv={:.0}, irr={:.4}, payback={:?}",
            scenario.name, risk_metrics.npv, risk_metrics.irr, risk_metrics.payback_period_years
        );

        Ok(ScenarioResult {
            scenario: *scenario,
            monthly_installment: financing.monthly_installment,
            total_loan_repayment: financing.total_loan_repayment,
            real_total_cost: financing.real_total_cost,
            initial_investment,
            yearly_projections: projections,
            risk_metrics,
            final_property_value: property_value,
        })
    }
}

/// `projections` is non-empty: the engine rejects a zero-year horizon.
fn risk_metrics(
    initial_investment: f64,
    projections: &[YearlyProjection],
    final_property_value: f64,
    discount_rate: f64,
) -> RiskMetrics {
    let horizon = projections.len() as i32;

    let payback_period_years = projections
        .iter()
        .find(|p| p.cumulative_cash_flow >= 0.0)
        .map(|p| p.year);

    let discounted_flows: f64 = projections
        .iter()
        .map(|p| p.net_cash_flow / (1.0 + discount_rate).powi(p.year as i32))
        .sum();
    let discounted_sale = final_property_value / (1.0 + discount_rate).powi(horizon);
    let npv = -initial_investment + discounted_flows + discounted_sale;

    let total_return = projections.iter().map(|p| p.net_cash_flow).sum::<f64>() + final_property_value;
    let irr = (total_return / initial_investment).powf(1.0 / horizon as f64) - 1.0;

    let first_year_cash_flow = projections.first().map(|p| p.net_cash_flow).unwrap_or(0.0);
    let cash_on_cash_return = first_year_cash_flow / initial_investment;

    let worst_drawdown = projections
        .iter()
        .map(|p| p.cumulative_cash_flow)
        .fold(f64::INFINITY, f64::min);

    RiskMetrics {
        payback_period_years,
        npv,
        irr,
        cash_on_cash_return,
        worst_drawdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::types::{ALL_SCENARIOS, EXTREME_STRESS, OPTIMISTIC, PESSIMISTIC, REALISTIC};

    fn run(scenario: &InvestmentScenario) -> ScenarioResult {
        ScenarioEngine::default()
            .calculate(5_000_000.0, 25_000.0, scenario, DEFAULT_PROJECTION_YEARS)
            .unwrap()
    }

    #[test]
    fn test_projection_shape() {
        let result = run(&REALISTIC);
        assert_eq!(result.yearly_projections.len(), 10);
        let years: Vec<u32> = result.yearly_projections.iter().map(|p| p.year).collect();
        assert_eq!(years, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_first_year_figures() {
        let result = run(&REALISTIC);
        let first = result.yearly_projections[0];

        assert!((first.gross_rent - 300_000.0).abs() < 1e-9);
        assert!((first.vacancy_loss - 15_000.0).abs() < 1e-9);
        assert!((first.maintenance_cost - 15_000.0).abs() < 1e-9);
        assert!((first.net_operating_income - 270_000.0).abs() < 1e-9);
        assert!((first.annual_tax - 48_400.0).abs() < 1e-6);
        assert!((first.loan_payment - result.monthly_installment * 12.0).abs() < 1e-9);
        assert!((first.property_value - 5_000_000.0 * 1.35).abs() < 1e-6);

        let expected_cumulative = -(2_500_000.0 + 350_000.0) + first.net_cash_flow;
        assert!((first.cumulative_cash_flow - expected_cumulative).abs() < 1e-6);
    }

    #[test]
    fn test_rent_grows_from_year_two() {
        let result = run(&REALISTIC);
        let p = &result.yearly_projections;
        assert!((p[1].gross_rent - p[0].gross_rent * 1.30).abs() < 1e-6);
        assert!((p[2].gross_rent - p[1].gross_rent * 1.30).abs() < 1e-6);
    }

    #[test]
    fn test_loan_paid_only_first_five_years() {
        let result = run(&REALISTIC);
        for p in &result.yearly_projections {
            if p.year <= 5 {
                assert!(p.loan_payment > 0.0);
            } else {
                assert_eq!(p.loan_payment, 0.0);
            }
        }
    }

    #[test]
    fn test_stress_keeps_property_value_flat() {
        let result = run(&EXTREME_STRESS);
        assert_eq!(EXTREME_STRESS.annual_property_appreciation, 0.0);
        assert_eq!(result.final_property_value, 5_000_000.0);
        assert!(result.yearly_projections.iter().all(|p| p.property_value == 5_000_000.0));
    }

    #[test]
    fn test_risk_metrics_formulas() {
        let result = run(&OPTIMISTIC);
        let metrics = result.risk_metrics;
        let initial = result.initial_investment;
        let d = OPTIMISTIC.annual_inflation_rate;

        let mut npv = -initial;
        for p in &result.yearly_projections {
            npv += p.net_cash_flow / (1.0 + d).powi(p.year as i32);
        }
        npv += result.final_property_value / (1.0 + d).powi(10);
        assert!((metrics.npv - npv).abs() < 1e-6);

        let total: f64 = result.yearly_projections.iter().map(|p| p.net_cash_flow).sum::<f64>()
            + result.final_property_value;
        assert!((metrics.irr - ((total / initial).powf(0.1) - 1.0)).abs() < 1e-12);

        let first = result.yearly_projections[0].net_cash_flow;
        assert!((metrics.cash_on_cash_return - first / initial).abs() < 1e-12);

        let worst = result
            .yearly_projections
            .iter()
            .map(|p| p.cumulative_cash_flow)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(metrics.worst_drawdown, worst);
    }

    #[test]
    fn test_payback_is_first_non_negative_year() {
        for scenario in &ALL_SCENARIOS {
            let result = run(scenario);
            let expected = result
                .yearly_projections
                .iter()
                .find(|p| p.cumulative_cash_flow >= 0.0)
                .map(|p| p.year);
            assert_eq!(result.risk_metrics.payback_period_years, expected);
        }
    }

    #[test]
    fn test_payback_unbounded_when_never_recovered() {
        // Rent barely covers anything while installments run
        let result = ScenarioEngine::default()
            .calculate(5_000_000.0, 1_000.0, &EXTREME_STRESS, 3)
            .unwrap();
        assert_eq!(result.risk_metrics.payback_period_years, None);
        assert!(!result.risk_metrics.is_payback_achieved());
    }

    #[test]
    fn test_higher_rate_means_higher_installment() {
        let low = run(&OPTIMISTIC);
        let high = run(&EXTREME_STRESS);
        assert!(high.monthly_installment > low.monthly_installment);
        assert!(high.real_total_cost > low.real_total_cost);
    }

    #[test]
    fn test_invalid_inputs() {
        let engine = ScenarioEngine::default();
        assert!(engine.calculate(0.0, 25_000.0, &REALISTIC, 10).is_err());
        assert!(engine.calculate(5_000_000.0, 0.0, &REALISTIC, 10).is_err());
        assert_eq!(
            engine.calculate(5_000_000.0, 25_000.0, &REALISTIC, 0),
            Err(CalculationError::InvalidProjectionYears(0))
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(run(&PESSIMISTIC), run(&PESSIMISTIC));
    }

    #[test]
    fn test_zero_loan_term_rejected() {
        let constants = FinancialConstants {
            loan_term_months: 0,
            ..FinancialConstants::default()
        };
        assert_eq!(
            ScenarioEngine::new(constants).calculate(5_000_000.0, 25_000.0, &REALISTIC, 10),
            Err(CalculationError::InvalidLoanTerm(0))
        );
    }
}
