//! End-to-end pipeline from an extraction batch to a presentable result.
//!
//! raw texts -> discrimination -> calculation -> verdict, plus the optional
//! multi-scenario decision for listings with a price/rent pair.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::calculation::{CalculationEngine, CalculationError};
use crate::engine::types::{format_currency, CalculationResult, InvestmentVerdict};
use crate::engine::verdict::VerdictEngine;
use crate::extraction::discriminator::PriceRentDiscriminator;
use crate::extraction::types::{ParseError, ParseResult, ParsedListingData, RawObservation};
use crate::integration::errors::{calculation_failed, to_app_error};
use crate::scenario::decision::{DecisionEngine, InvestmentDecisionReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IntegrationResult {
    Success {
        parsed_data: ParsedListingData,
        calculation_result: CalculationResult,
        verdict: InvestmentVerdict,
    },
    PartialSuccess {
        parsed_data: ParsedListingData,
        message: String,
    },
    Error {
        error: ParseError,
        raw_texts: Vec<String>,
        user_message: String,
    },
}

impl IntegrationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, IntegrationResult::Success { .. })
    }

    pub fn parsed_data(&self) -> Option<&ParsedListingData> {
        match self {
            IntegrationResult::Success { parsed_data, .. } | IntegrationResult::PartialSuccess { parsed_data, .. } => {
                Some(parsed_data)
            }
            IntegrationResult::Error { .. } => None,
        }
    }
}

pub struct AnalysisPipeline {
    discriminator: PriceRentDiscriminator,
    calculator: CalculationEngine,
    verdicts: VerdictEngine,
    decisions: DecisionEngine,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AnalysisPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            discriminator: PriceRentDiscriminator::new(config.discrimination),
            calculator: CalculationEngine::new(config.financial),
            verdicts: VerdictEngine::new(config.verdict),
            decisions: DecisionEngine::new(config.financial, config.projection.years),
        }
    }

    pub fn process(&self, observation: &RawObservation) -> IntegrationResult {
        let data = match self.discriminator.discriminate(observation) {
            ParseResult::Success(data) => data,
            ParseResult::Failure { error, raw_texts } => {
                warn!("Discrimination failed: {}", error);
                let user_message = to_app_error(&error).user_message;
                return IntegrationResult::Error {
                    error,
                    raw_texts,
                    user_message,
                };
            }
        };

        if !data.is_complete() {
            let message = partial_message(&data);
            info!("Partial result: {}", message);
            return IntegrationResult::PartialSuccess {
                parsed_data: data,
                message,
            };
        }

        let (calculation_result, verdict) = match data.price_and_rent() {
            Some((price, rent)) => match self.calculator.calculate(price, rent) {
                Ok(result) => {
                    let verdict = self.verdicts.evaluate(&result);
                    (result, verdict)
                }
                Err(e) => {
                    let app_error = calculation_failed(&e.to_string());
                    warn!("{}", app_error);
                    return IntegrationResult::Error {
                        error: ParseError::UnexpectedError(e.to_string()),
                        raw_texts: observation.texts.clone(),
                        user_message: app_error.user_message,
                    };
                }
            },
            None => {
                // Location only: neutral placeholders, the engine is not invoked
                debug!("Coordinate-only listing, using neutral verdict");
                (CalculationResult::neutral(), InvestmentVerdict::neutral())
            }
        };

        info!(
            "Verdict: {} ({:.1} years)",
            verdict.status_text, verdict.amortization_years
        );

        IntegrationResult::Success {
            parsed_data: data,
            calculation_result,
            verdict,
        }
    }

    /// Multi-scenario decision; `None` when the listing has no price/rent pair.
    pub fn analyze_deep(
        &self,
        data: &ParsedListingData,
    ) -> Result<Option<InvestmentDecisionReport>, CalculationError> {
        match data.price_and_rent() {
            Some((price, rent)) => self.decisions.generate_decision(price, rent).map(Some),
            None => Ok(None),
        }
    }
}

fn partial_message(data: &ParsedListingData) -> String {
    match (data.house_price, data.monthly_rent) {
        (Some(price), None) => format!("House price found: {}. Rent not found.", format_currency(price)),
        (None, Some(rent)) => format!("Rent found: {}. House price not found.", format_currency(rent)),
        _ => "Not enough data found.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::InvestmentCategory;
    use crate::extraction::types::Coordinate;
    use crate::scenario::decision::InvestmentDecision;
    use chrono::{TimeZone, Utc};

    fn observation(texts: &[&str]) -> RawObservation {
        RawObservation::new(
            texts.iter().map(|t| t.to_string()).collect(),
            "com.example.listings",
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_full_listing_succeeds() {
        let pipeline = AnalysisPipeline::default();
        let result = pipeline.process(&observation(&["Fiyat", "5.000.000 TL", "Kira", "25.000 TL"]));

        match result {
            IntegrationResult::Success {
                parsed_data,
                calculation_result,
                verdict,
            } => {
                assert_eq!(parsed_data.house_price, Some(5_000_000.0));
                assert!((calculation_result.monthly_installment - 80_699.32).abs() < 0.01);
                assert_eq!(
                    calculation_result.down_payment + calculation_result.loan_amount,
                    5_000_000.0
                );
                assert_eq!(verdict.category, InvestmentCategory::Overpriced);
                assert_eq!(verdict.amortization_years, calculation_result.amortization_years);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_coordinate_only_uses_neutral_placeholders() {
        let pipeline = AnalysisPipeline::default();
        let result = pipeline.process(&observation(&["Konum", "@40.8736,29.3064"]));

        match result {
            IntegrationResult::Success {
                parsed_data,
                calculation_result,
                verdict,
            } => {
                assert_eq!(parsed_data.coordinate, Some(Coordinate { lat: 40.8736, lon: 29.3064 }));
                assert_eq!(calculation_result, CalculationResult::neutral());
                assert_eq!(verdict, InvestmentVerdict::neutral());
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_maps_to_error_with_raw_texts() {
        let pipeline = AnalysisPipeline::default();
        let result = pipeline.process(&observation(&["5.000.000 TL"]));

        match result {
            IntegrationResult::Error {
                error,
                raw_texts,
                user_message,
            } => {
                assert_eq!(error, ParseError::InsufficientData);
                assert_eq!(raw_texts, vec!["5.000.000 TL".to_string()]);
                assert_eq!(user_message, to_app_error(&ParseError::InsufficientData).user_message);
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_extraction_failure_message() {
        let obs = RawObservation::failed(
            "com.example.listings",
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            "window closed",
        );
        let result = AnalysisPipeline::default().process(&obs);
        assert!(!result.is_success());
        assert!(result.parsed_data().is_none());
        match result {
            IntegrationResult::Error { error, user_message, .. } => {
                assert_eq!(error, ParseError::UnexpectedError("window closed".to_string()));
                assert_eq!(user_message, to_app_error(&error).user_message);
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_messages() {
        let mut data = ParsedListingData::empty("test");
        data.house_price = Some(3_500_000.0);
        assert_eq!(partial_message(&data), "House price found: 3,500,000 TL. Rent not found.");

        data.house_price = None;
        data.monthly_rent = Some(18_000.0);
        assert_eq!(partial_message(&data), "Rent found: 18,000 TL. House price not found.");

        data.monthly_rent = None;
        assert_eq!(partial_message(&data), "Not enough data found.");
    }

    #[test]
    fn test_deep_analysis() {
        let pipeline = AnalysisPipeline::default();
        let result = pipeline.process(&observation(&["Fiyat", "5.000.000 TL", "Kira", "25.000 TL"]));
        let data = result.parsed_data().unwrap();

        let report = pipeline.analyze_deep(data).unwrap().unwrap();
        assert_eq!(report.decision, InvestmentDecision::HighRiskAvoid);
        assert_eq!(report.scenario_results.len(), 4);

        let location_only = ParsedListingData {
            coordinate: Some(Coordinate { lat: 41.0, lon: 29.0 }),
            ..ParsedListingData::empty("test")
        };
        assert_eq!(pipeline.analyze_deep(&location_only).unwrap(), None);
    }

    #[test]
    fn test_custom_threshold_changes_verdict() {
        let config = Config::from_toml("[verdict]\nmax_acceptable_amortization_years = 40.0\n").unwrap();
        let pipeline = AnalysisPipeline::new(&config);
        let result = pipeline.process(&observation(&["Fiyat", "5.000.000 TL", "Kira", "25.000 TL"]));

        match result {
            IntegrationResult::Success { verdict, .. } => assert_eq!(verdict.category, InvestmentCategory::Logical),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_calculation_failure_is_reported() {
        let mut config = Config::default();
        config.financial.loan_term_months = 0;
        let result = AnalysisPipeline::new(&config).process(&observation(&["Fiyat", "5.000.000 TL", "Kira", "25.000 TL"]));

        match result {
            IntegrationResult::Error { error, user_message, .. } => {
                assert!(matches!(error, ParseError::UnexpectedError(_)));
                assert_eq!(user_message, calculation_failed("").user_message);
            }
            other => panic!("expected error, got {:?}", other),
        }
    }
}
