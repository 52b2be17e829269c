use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use listing_analyzer::config::{Config, EnvConfig};
use listing_analyzer::engine::calculation::CalculationEngine;
use listing_analyzer::engine::parity;
use listing_analyzer::extraction::text_filter;
use listing_analyzer::extraction::types::RawObservation;
use listing_analyzer::integration::bridge::{AnalysisPipeline, IntegrationResult};
use listing_analyzer::integration::errors::{calculation_failed, to_app_error};
use listing_analyzer::monitoring::report::{self, CsvLogger};

const USAGE: &str = "usage: listing-analyzer [--parity] [FILE]\n\
                     FILE is a JSON extraction batch or plain text with one screen string per line; \
                     stdin when omitted.";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut run_parity = false;
    let mut input_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--parity" => run_parity = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => input_path = Some(arg),
        }
    }

    let env_config = EnvConfig::load()?;
    let config = Config::resolve(env_config.config_path.as_deref())?;
    info!(
        "Loaded config: interest {:.4}/month, threshold {:.0} years, {} projection years",
        config.financial.monthly_interest_rate,
        config.verdict.max_acceptable_amortization_years,
        config.projection.years
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if run_parity {
        let engine = CalculationEngine::new(config.financial);
        let cases = parity::standard_cases(&config.financial);
        let parity_report = parity::validate_all(&engine, &cases)?;
        report::write_parity(&mut out, &parity_report)?;
        if input_path.is_none() {
            return Ok(());
        }
    }

    let observation = read_observation(input_path.as_deref(), &env_config.source_app_id)?;
    info!(
        "Processing {} strings from {}",
        observation.count(),
        observation.source_app_id
    );

    let pipeline = AnalysisPipeline::new(&config);
    let result = pipeline.process(&observation);
    report::write_integration_result(&mut out, &result)?;

    match &result {
        IntegrationResult::Success { parsed_data, .. } => match pipeline.analyze_deep(parsed_data) {
            Ok(Some(decision)) => {
                writeln!(out)?;
                report::write_decision(&mut out, &decision)?;

                if let Some(path) = &env_config.projection_log_path {
                    let logger = CsvLogger::new(path.clone())?;
                    for scenario in &decision.scenario_results {
                        logger.log_scenario(scenario, &observation.source_app_id, observation.extracted_at)?;
                    }
                    info!("Projections appended to {}", path);
                }
            }
            Ok(None) => debug!("No price/rent pair, skipping scenario analysis"),
            Err(e) => warn!("{}", calculation_failed(&e.to_string())),
        },
        IntegrationResult::Error { error, .. } => {
            let app_error = to_app_error(error);
            debug!(
                "{} (category {:?}, retryable: {})",
                app_error, app_error.category, app_error.is_retryable
            );
        }
        IntegrationResult::PartialSuccess { .. } => {}
    }

    Ok(())
}

/// JSON batches are taken as-is; anything else is treated as a raw screen
/// dump and passed through the candidate filter first.
fn read_observation(path: Option<&str>, source_app_id: &str) -> Result<RawObservation> {
    let input = match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read input: {}", path))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    if input.trim_start().starts_with('{') {
        return serde_json::from_str(&input).context("Failed to parse extraction batch JSON");
    }

    let texts = text_filter::select_candidates(&input.lines().collect::<Vec<_>>());
    for text in &texts {
        debug!("Candidate: {}", text_filter::normalize_number_format(text));
    }

    Ok(RawObservation::new(texts, source_app_id, Utc::now()))
}
