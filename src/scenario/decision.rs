use serde::Serialize;
use tracing::info;

use crate::config::FinancialConstants;
use crate::engine::calculation::CalculationError;
use crate::engine::types::format_currency;
use crate::scenario::projection::{ScenarioEngine, DEFAULT_PROJECTION_YEARS};
use crate::scenario::sensitivity::{SensitivityAnalysisResult, SensitivityAnalyzer, SensitivityVariable};
use crate::scenario::types::{ScenarioResult, ScenarioType, ALL_SCENARIOS};

/// Stress-scenario loss still tolerated for a conditional buy.
const MAX_TOLERATED_STRESS_LOSS: f64 = -500_000.0;
const REASONABLE_PAYBACK_YEARS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvestmentDecision {
    StrongBuy,
    ConditionalBuy,
    NeutralWait,
    HighRiskAvoid,
}

impl InvestmentDecision {
    pub fn text(&self) -> &'static str {
        match self {
            InvestmentDecision::StrongBuy => "STRONG BUY - profitable in all scenarios",
            InvestmentDecision::ConditionalBuy => "CONDITIONAL BUY - risks exist but the outlook is positive",
            InvestmentDecision::NeutralWait => "NEUTRAL / WAIT - uncertainty is high",
            InvestmentDecision::HighRiskAvoid => "HIGH RISK - AVOID",
        }
    }
}

/// Plain-language risk narrative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskExplanation {
    pub biggest_risk: String,
    pub success_condition: String,
    pub failure_condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentDecisionReport {
    pub decision: InvestmentDecision,
    /// One result per canonical scenario, mildest first.
    pub scenario_results: Vec<ScenarioResult>,
    pub sensitivity_analysis: SensitivityAnalysisResult,
    pub reasons: Vec<String>,
    pub risk_explanation: RiskExplanation,
}

impl InvestmentDecisionReport {
    pub fn scenario(&self, scenario_type: ScenarioType) -> Option<&ScenarioResult> {
        find(&self.scenario_results, scenario_type)
    }
}

/// Runs every canonical scenario plus a sensitivity sweep and folds them
/// into one recommendation.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    scenarios: ScenarioEngine,
    sensitivity: SensitivityAnalyzer,
    years: u32,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(FinancialConstants::default(), DEFAULT_PROJECTION_YEARS)
    }
}

impl DecisionEngine {
    pub fn new(constants: FinancialConstants, years: u32) -> Self {
        Self {
            scenarios: ScenarioEngine::new(constants),
            sensitivity: SensitivityAnalyzer::new(constants, years),
            years,
        }
    }

    pub fn generate_decision(
        &self,
        house_price: f64,
        monthly_rent: f64,
    ) -> Result<InvestmentDecisionReport, CalculationError> {
        let scenario_results = ALL_SCENARIOS
            .iter()
            .map(|scenario| self.scenarios.calculate(house_price, monthly_rent, scenario, self.years))
            .collect::<Result<Vec<_>, _>>()?;
        let sensitivity_analysis = self.sensitivity.analyze(house_price, monthly_rent)?;

        let npv = |scenario_type| npv_of(&scenario_results, scenario_type);
        let decision = decide(
            npv(ScenarioType::Optimistic),
            npv(ScenarioType::Realistic),
            npv(ScenarioType::Pessimistic),
            npv(ScenarioType::ExtremeStress),
        );

        let reasons = reasons(&scenario_results, &sensitivity_analysis, self.years);
        let risk_explanation = risk_explanation(&scenario_results, &sensitivity_analysis);

        info!(
            "Decision for price={:.0} rent={:.0}: {:?}",
            house_price, monthly_rent, decision
        );

        Ok(InvestmentDecisionReport {
            decision,
            scenario_results,
            sensitivity_analysis,
            reasons,
            risk_explanation,
        })
    }
}

fn find(results: &[ScenarioResult], scenario_type: ScenarioType) -> Option<&ScenarioResult> {
    results.iter().find(|r| r.scenario.scenario_type == scenario_type)
}

/// A missing scenario counts as a zero NPV, which is never positive.
fn npv_of(results: &[ScenarioResult], scenario_type: ScenarioType) -> f64 {
    find(results, scenario_type).map(|r| r.risk_metrics.npv).unwrap_or(0.0)
}

fn decide(optimistic: f64, realistic: f64, pessimistic: f64, stress: f64) -> InvestmentDecision {
    let all_positive = [optimistic, realistic, pessimistic, stress].iter().all(|npv| *npv > 0.0);

    if all_positive && stress > 0.0 {
        InvestmentDecision::StrongBuy
    } else if realistic > 0.0 && optimistic > 0.0 && stress > MAX_TOLERATED_STRESS_LOSS {
        InvestmentDecision::ConditionalBuy
    } else if realistic > 0.0 {
        InvestmentDecision::NeutralWait
    } else {
        InvestmentDecision::HighRiskAvoid
    }
}

fn reasons(results: &[ScenarioResult], sensitivity: &SensitivityAnalysisResult, years: u32) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(realistic) = find(results, ScenarioType::Realistic) {
        let metrics = &realistic.risk_metrics;
        if metrics.is_npv_positive() {
            reasons.push(format!("Realistic scenario NPV is positive: {}", format_currency(metrics.npv)));
        } else {
            reasons.push(format!("Realistic scenario NPV is negative: {}", format_currency(metrics.npv)));
        }

        match metrics.payback_period_years {
            Some(payback) if payback < REASONABLE_PAYBACK_YEARS => {
                reasons.push(format!("Payback period is reasonable: {} years", payback))
            }
            Some(payback) => reasons.push(format!("Payback period is long: {} years", payback)),
            None => reasons.push(format!("Payback period is long: not reached within {} years", years)),
        }
    }

    if let Some(stress) = find(results, ScenarioType::ExtremeStress) {
        if stress.risk_metrics.is_npv_positive() {
            reasons.push("Profitable even in the stress scenario".to_string());
        } else {
            reasons.push(format!(
                "Loss in the stress scenario: {}",
                format_currency(stress.risk_metrics.npv)
            ));
        }
    }

    reasons.push(format!("Most impactful variable: {}", sensitivity.most_impactful_variable));
    reasons
}

fn risk_explanation(results: &[ScenarioResult], sensitivity: &SensitivityAnalysisResult) -> RiskExplanation {
    let biggest_risk = match sensitivity.most_impactful_variable {
        SensitivityVariable::InterestRate => {
            "Rising interest rates are the biggest risk for this investment. If loan rates go up, \
             the monthly installment grows and profitability drops."
        }
        SensitivityVariable::HousePrice => {
            "The purchase price is the factor that moves this investment most. Buying at a higher \
             price stretches the amortization period."
        }
        SensitivityVariable::Rent => {
            "Rental income is the most critical variable of this investment. If the expected rent \
             cannot be collected, the investment may lose money."
        }
    };

    let break_even = &sensitivity.break_even_points;
    let success_condition = format!(
        "For this investment to succeed:\n\
         - rent should be at least {}\n\
         - the price should not rise above {}\n\
         - vacancy between tenants should be kept short",
        format_currency(break_even.minimum_rent),
        format_currency(break_even.maximum_price)
    );

    let stress_positive = find(results, ScenarioType::ExtremeStress)
        .map(|r| r.risk_metrics.is_npv_positive())
        .unwrap_or(false);
    let failure_condition = if stress_positive {
        "This investment looks fairly resilient, but stay careful under extreme conditions.".to_string()
    } else {
        "This investment fails when:\n\
         - an economic crisis brings very high interest rates\n\
         - no tenant is found or rent payments stall\n\
         - large unexpected maintenance costs come up"
            .to_string()
    };

    RiskExplanation {
        biggest_risk: biggest_risk.to_string(),
        success_condition,
        failure_condition,
    }
}
