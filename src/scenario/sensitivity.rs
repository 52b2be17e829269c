use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::FinancialConstants;
use crate::engine::calculation::CalculationError;
use crate::scenario::projection::{ScenarioEngine, DEFAULT_PROJECTION_YEARS};
use crate::scenario::types::{InvestmentScenario, ScenarioResult, REALISTIC};

/// Annual interest changes, converted to monthly before applying.
const INTEREST_DELTAS: [f64; 7] = [-0.05, -0.03, -0.01, 0.0, 0.01, 0.03, 0.05];
/// Relative changes applied to price and rent.
const RELATIVE_DELTAS: [f64; 7] = [-0.20, -0.10, -0.05, 0.0, 0.05, 0.10, 0.20];

const RENT_BREAK_EVEN_MULTIPLIERS: [f64; 6] = [0.5, 0.6, 0.7, 0.8, 0.9, 1.0];
const PRICE_BREAK_EVEN_MULTIPLIERS: [f64; 6] = [1.5, 1.4, 1.3, 1.2, 1.1, 1.0];
/// The rent scan reports a point slightly above the first losing rent.
const RENT_BREAK_EVEN_MARGIN: f64 = 1.1;
const MAX_INTEREST_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensitivityPoint {
    pub change_percent: f64,
    /// Real total cost over first-year NOI; a single-year approximation.
    pub amortization_years_approx: f64,
    pub npv: f64,
    pub irr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensitivityVariable {
    InterestRate,
    HousePrice,
    Rent,
}

impl fmt::Display for SensitivityVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityVariable::InterestRate => write!(f, "Interest rate"),
            SensitivityVariable::HousePrice => write!(f, "House price"),
            SensitivityVariable::Rent => write!(f, "Rent"),
        }
    }
}

/// Coarse multiplier-scan estimates, not exact NPV roots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakEvenPoints {
    pub minimum_rent: f64,
    pub maximum_price: f64,
    /// Flat heuristic on the base monthly rate.
    pub max_acceptable_interest_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityAnalysisResult {
    pub base_result: ScenarioResult,
    pub interest_rate_sensitivity: Vec<SensitivityPoint>,
    pub price_sensitivity: Vec<SensitivityPoint>,
    pub rent_sensitivity: Vec<SensitivityPoint>,
    pub most_impactful_variable: SensitivityVariable,
    pub break_even_points: BreakEvenPoints,
}

#[derive(Debug, Clone)]
pub struct SensitivityAnalyzer {
    engine: ScenarioEngine,
    years: u32,
}

impl Default for SensitivityAnalyzer {
    fn default() -> Self {
        Self::new(FinancialConstants::default(), DEFAULT_PROJECTION_YEARS)
    }
}

impl SensitivityAnalyzer {
    pub fn new(constants: FinancialConstants, years: u32) -> Self {
        Self {
            engine: ScenarioEngine::new(constants),
            years,
        }
    }

    /// Sweep around the realistic scenario.
    pub fn analyze(&self, house_price: f64, monthly_rent: f64) -> Result<SensitivityAnalysisResult, CalculationError> {
        self.analyze_with(house_price, monthly_rent, &REALISTIC)
    }

    pub fn analyze_with(
        &self,
        house_price: f64,
        monthly_rent: f64,
        base: &InvestmentScenario,
    ) -> Result<SensitivityAnalysisResult, CalculationError> {
        let base_result = self.engine.calculate(house_price, monthly_rent, base, self.years)?;

        let interest_rate_sensitivity = self.interest_sweep(house_price, monthly_rent, base)?;
        let price_sensitivity = RELATIVE_DELTAS
            .iter()
            .map(|delta| self.point(house_price * (1.0 + delta), monthly_rent, base, *delta))
            .collect::<Result<Vec<_>, _>>()?;
        let rent_sensitivity = RELATIVE_DELTAS
            .iter()
            .map(|delta| self.point(house_price, monthly_rent * (1.0 + delta), base, *delta))
            .collect::<Result<Vec<_>, _>>()?;

        let most_impactful_variable =
            most_impactful(&interest_rate_sensitivity, &price_sensitivity, &rent_sensitivity);
        let break_even_points = self.break_even_points(house_price, monthly_rent, base)?;

        debug!(
            "Sensitivity: most impactful={}, break-even rent={:.0}, price={:.0}",
            most_impactful_variable, break_even_points.minimum_rent, break_even_points.maximum_price
        );

        Ok(SensitivityAnalysisResult {
            base_result,
            interest_rate_sensitivity,
            price_sensitivity,
            rent_sensitivity,
            most_impactful_variable,
            break_even_points,
        })
    }

    fn interest_sweep(
        &self,
        house_price: f64,
        monthly_rent: f64,
        base: &InvestmentScenario,
    ) -> Result<Vec<SensitivityPoint>, CalculationError> {
        let mut points = Vec::with_capacity(INTEREST_DELTAS.len());
        for delta in INTEREST_DELTAS {
            let rate = base.monthly_interest_rate + delta / 12.0;
            if rate <= 0.0 {
                continue;
            }
            let scenario = base.with_interest_rate(rate);
            points.push(self.point(house_price, monthly_rent, &scenario, delta)?);
        }
        Ok(points)
    }

    fn point(
        &self,
        house_price: f64,
        monthly_rent: f64,
        scenario: &InvestmentScenario,
        delta: f64,
    ) -> Result<SensitivityPoint, CalculationError> {
        let result = self.engine.calculate(house_price, monthly_rent, scenario, self.years)?;
        let first_year_noi = result
            .yearly_projections
            .first()
            .map(|p| p.net_operating_income)
            .unwrap_or(1.0);

        Ok(SensitivityPoint {
            change_percent: delta * 100.0,
            amortization_years_approx: result.real_total_cost / first_year_noi,
            npv: result.risk_metrics.npv,
            irr: result.risk_metrics.irr,
        })
    }

    fn break_even_points(
        &self,
        house_price: f64,
        monthly_rent: f64,
        base: &InvestmentScenario,
    ) -> Result<BreakEvenPoints, CalculationError> {
        let mut minimum_rent = monthly_rent;
        for multiplier in RENT_BREAK_EVEN_MULTIPLIERS {
            let test_rent = monthly_rent * multiplier;
            let result = self.engine.calculate(house_price, test_rent, base, self.years)?;
            if result.risk_metrics.npv <= 0.0 {
                minimum_rent = test_rent * RENT_BREAK_EVEN_MARGIN;
                break;
            }
        }

        let mut maximum_price = house_price;
        for multiplier in PRICE_BREAK_EVEN_MULTIPLIERS {
            let test_price = house_price * multiplier;
            let result = self.engine.calculate(test_price, monthly_rent, base, self.years)?;
            if result.risk_metrics.npv >= 0.0 {
                maximum_price = test_price;
                break;
            }
        }

        Ok(BreakEvenPoints {
            minimum_rent,
            maximum_price,
            max_acceptable_interest_rate: base.monthly_interest_rate * MAX_INTEREST_FACTOR,
        })
    }
}

fn npv_spread(points: &[SensitivityPoint]) -> f64 {
    let max = points.iter().map(|p| p.npv).fold(f64::NEG_INFINITY, f64::max);
    let min = points.iter().map(|p| p.npv).fold(f64::INFINITY, f64::min);
    if points.is_empty() {
        0.0
    } else {
        max - min
    }
}

/// Largest NPV spread wins; ties go to interest, then price, then rent.
fn most_impactful(
    interest: &[SensitivityPoint],
    price: &[SensitivityPoint],
    rent: &[SensitivityPoint],
) -> SensitivityVariable {
    let interest_spread = npv_spread(interest);
    let price_spread = npv_spread(price);
    let rent_spread = npv_spread(rent);

    if interest_spread >= price_spread && interest_spread >= rent_spread {
        SensitivityVariable::InterestRate
    } else if price_spread >= rent_spread {
        SensitivityVariable::HousePrice
    } else {
        SensitivityVariable::Rent
    }
}
