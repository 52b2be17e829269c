use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScenarioType {
    Optimistic,
    Realistic,
    Pessimistic,
    ExtremeStress,
}

/// Economic assumptions for one projection run. Rates are fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvestmentScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub scenario_type: ScenarioType,
    pub monthly_interest_rate: f64,
    /// Also used as the NPV discount rate.
    pub annual_inflation_rate: f64,
    pub annual_property_appreciation: f64,
    pub annual_rent_growth: f64,
    pub vacancy_rate: f64,
    /// Share of gross rent lost to upkeep and surprises.
    pub maintenance_cost_rate: f64,
}

impl InvestmentScenario {
    pub fn with_interest_rate(self, monthly_interest_rate: f64) -> Self {
        Self {
            monthly_interest_rate,
            ..self
        }
    }
}

pub const OPTIMISTIC: InvestmentScenario = InvestmentScenario {
    name: "Optimistic",
    description: "Strong growth, low rates, high housing demand",
    scenario_type: ScenarioType::Optimistic,
    monthly_interest_rate: 0.0199,
    annual_inflation_rate: 0.15,
    annual_property_appreciation: 0.25,
    annual_rent_growth: 0.20,
    vacancy_rate: 0.02,
    maintenance_cost_rate: 0.03,
};

pub const REALISTIC: InvestmentScenario = InvestmentScenario {
    name: "Realistic",
    description: "Current economic conditions persist",
    scenario_type: ScenarioType::Realistic,
    monthly_interest_rate: 0.0249,
    annual_inflation_rate: 0.45,
    annual_property_appreciation: 0.35,
    annual_rent_growth: 0.30,
    vacancy_rate: 0.05,
    maintenance_cost_rate: 0.05,
};

pub const PESSIMISTIC: InvestmentScenario = InvestmentScenario {
    name: "Pessimistic",
    description: "Recession, high rates, weak demand",
    scenario_type: ScenarioType::Pessimistic,
    monthly_interest_rate: 0.0349,
    annual_inflation_rate: 0.60,
    annual_property_appreciation: 0.15,
    annual_rent_growth: 0.15,
    vacancy_rate: 0.10,
    maintenance_cost_rate: 0.08,
};

pub const EXTREME_STRESS: InvestmentScenario = InvestmentScenario {
    name: "Extreme stress",
    description: "Crisis, very high rates, flat property values",
    scenario_type: ScenarioType::ExtremeStress,
    monthly_interest_rate: 0.0499,
    annual_inflation_rate: 0.80,
    annual_property_appreciation: 0.0,
    annual_rent_growth: 0.10,
    vacancy_rate: 0.20,
    maintenance_cost_rate: 0.12,
};

pub const ALL_SCENARIOS: [InvestmentScenario; 4] = [OPTIMISTIC, REALISTIC, PESSIMISTIC, EXTREME_STRESS];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyProjection {
    pub year: u32,
    pub gross_rent: f64,
    pub vacancy_loss: f64,
    pub maintenance_cost: f64,
    pub net_operating_income: f64,
    pub annual_tax: f64,
    pub loan_payment: f64,
    pub net_cash_flow: f64,
    pub cumulative_cash_flow: f64,
    pub property_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// First year the cumulative cash flow turns non-negative; `None` when
    /// that never happens within the horizon.
    pub payback_period_years: Option<u32>,
    pub npv: f64,
    /// Geometric-mean total return, not a cash-flow-timed IRR.
    pub irr: f64,
    /// Year-one net cash flow over the initial investment.
    pub cash_on_cash_return: f64,
    /// Lowest cumulative cash flow over the horizon.
    pub worst_drawdown: f64,
}

impl RiskMetrics {
    pub fn irr_percentage(&self) -> f64 {
        self.irr * 100.0
    }

    pub fn cash_on_cash_percentage(&self) -> f64 {
        self.cash_on_cash_return * 100.0
    }

    pub fn is_payback_achieved(&self) -> bool {
        self.payback_period_years.is_some()
    }

    pub fn is_npv_positive(&self) -> bool {
        self.npv > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub scenario: InvestmentScenario,
    pub monthly_installment: f64,
    pub total_loan_repayment: f64,
    pub real_total_cost: f64,
    pub initial_investment: f64,
    pub yearly_projections: Vec<YearlyProjection>,
    pub risk_metrics: RiskMetrics,
    pub final_property_value: f64,
}
