use crate::config::VerdictThresholds;
use crate::engine::types::{CalculationResult, ColorHint, InvestmentCategory, InvestmentVerdict};

/// Interprets a calculation; never recomputes it. The only input is
/// `amortization_years` against a single threshold.
#[derive(Debug, Clone, Default)]
pub struct VerdictEngine {
    thresholds: VerdictThresholds,
}

impl VerdictEngine {
    pub fn new(thresholds: VerdictThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, calculation: &CalculationResult) -> InvestmentVerdict {
        let years = calculation.amortization_years;
        let threshold = self.thresholds.max_acceptable_amortization_years;

        if years < threshold {
            InvestmentVerdict {
                amortization_years: years,
                status_text: "LOGICAL INVESTMENT".to_string(),
                category: InvestmentCategory::Logical,
                color_hint: ColorHint::Green,
                summary: format!(
                    "Including the loan and purchase costs, this property pays itself back from rent \
                     in about {:.1} years.\n\nThat is within the acceptable range (under {:.0} years), \
                     so the investment is considered logical.",
                    years, threshold
                ),
            }
        } else {
            InvestmentVerdict {
                amortization_years: years,
                status_text: "OVERPRICED".to_string(),
                category: InvestmentCategory::Overpriced,
                color_hint: ColorHint::Red,
                summary: format!(
                    "Including the loan and purchase costs, this property pays itself back from rent \
                     in about {:.1} years.\n\nThat exceeds the acceptable range ({:.0} years), so the \
                     investment is considered overpriced. Look for better-priced alternatives.",
                    years, threshold
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calculation::CalculationEngine;

    fn with_years(years: f64) -> CalculationResult {
        CalculationResult {
            amortization_years: years,
            ..CalculationResult::neutral()
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let engine = VerdictEngine::default();

        assert_eq!(engine.evaluate(&with_years(13.99)).category, InvestmentCategory::Logical);
        assert_eq!(engine.evaluate(&with_years(14.0)).category, InvestmentCategory::Overpriced);
        assert_eq!(engine.evaluate(&with_years(25.0)).color_hint, ColorHint::Red);
        assert_eq!(engine.evaluate(&with_years(8.0)).color_hint, ColorHint::Green);
    }

    #[test]
    fn test_category_follows_amortization() {
        let calc = CalculationEngine::default();
        let verdicts = VerdictEngine::default();

        for (price, rent) in [
            (5_000_000.0, 25_000.0),
            (1_000_000.0, 20_000.0),
            (2_000_000.0, 50_000.0),
            (10_000_000.0, 50_000.0),
        ] {
            let result = calc.calculate(price, rent).unwrap();
            let verdict = verdicts.evaluate(&result);
            assert_eq!(
                result.amortization_years < 14.0,
                verdict.category == InvestmentCategory::Logical
            );
            assert_eq!(verdict.amortization_years, result.amortization_years);
        }
    }

    #[test]
    fn test_summary_mentions_years_and_threshold() {
        let verdict = VerdictEngine::default().evaluate(&with_years(30.57));
        assert!(verdict.summary.contains("30.6"));
        assert!(verdict.summary.contains("14"));
    }
}
