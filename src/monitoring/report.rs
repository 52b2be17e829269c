use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;

use crate::engine::parity::ParityReport;
use crate::engine::types::format_currency;
use crate::integration::bridge::IntegrationResult;
use crate::scenario::decision::InvestmentDecisionReport;
use crate::scenario::types::ScenarioResult;

const PROJECTION_HEADER: &str = "timestamp,source,scenario,year,gross_rent,vacancy_loss,maintenance_cost,\
                                 net_operating_income,annual_tax,loan_payment,net_cash_flow,\
                                 cumulative_cash_flow,property_value";

/// Appends yearly projection rows to a CSV file.
pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Header only for a fresh file
        if !std::path::Path::new(&log_path).exists() {
            let mut file = OpenOptions::new().create(true).write(true).open(&log_path)?;
            writeln!(file, "{}", PROJECTION_HEADER)?;
        }

        Ok(Self { log_path })
    }

    pub fn log_scenario(&self, result: &ScenarioResult, source: &str, at: DateTime<Utc>) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;
        write_projection_rows(&mut file, result, source, at)
    }
}

pub fn write_projection_rows<W: Write>(
    out: &mut W,
    result: &ScenarioResult,
    source: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    for p in &result.yearly_projections {
        writeln!(
            out,
            "{},{},{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            at.to_rfc3339(),
            source,
            result.scenario.name,
            p.year,
            p.gross_rent,
            p.vacancy_loss,
            p.maintenance_cost,
            p.net_operating_income,
            p.annual_tax,
            p.loan_payment,
            p.net_cash_flow,
            p.cumulative_cash_flow,
            p.property_value
        )?;
    }
    Ok(())
}

pub fn write_integration_result<W: Write>(out: &mut W, result: &IntegrationResult) -> Result<()> {
    match result {
        IntegrationResult::Success {
            parsed_data,
            calculation_result,
            verdict,
        } => {
            writeln!(out, "== {} ==", verdict.status_text)?;
            if let Some((price, rent)) = parsed_data.price_and_rent() {
                writeln!(out, "House price:        {}", format_currency(price))?;
                writeln!(out, "Monthly rent:       {}", format_currency(rent))?;
                writeln!(
                    out,
                    "Monthly installment: {}",
                    format_currency(calculation_result.monthly_installment)
                )?;
                writeln!(out, "Real total cost:    {}", format_currency(calculation_result.real_total_cost))?;
                writeln!(out, "Net annual rent:    {}", format_currency(calculation_result.net_annual_rent))?;
                writeln!(out, "Amortization:       {:.1} years", calculation_result.amortization_years)?;
            }
            if let Some(coordinate) = parsed_data.coordinate {
                writeln!(out, "Location:           {:.6}, {:.6}", coordinate.lat, coordinate.lon)?;
            }
            writeln!(out)?;
            writeln!(out, "{}", verdict.summary)?;
        }
        IntegrationResult::PartialSuccess { message, .. } => {
            writeln!(out, "== PARTIAL ==")?;
            writeln!(out, "{}", message)?;
        }
        IntegrationResult::Error {
            error, user_message, ..
        } => {
            writeln!(out, "== ERROR: {} ==", error)?;
            writeln!(out, "{}", user_message)?;
        }
    }
    Ok(())
}

pub fn write_decision<W: Write>(out: &mut W, report: &InvestmentDecisionReport) -> Result<()> {
    writeln!(out, "== {} ==", report.decision.text())?;
    writeln!(out, "{:<16} {:>18} {:>9} {:>10}", "scenario", "npv", "irr", "payback")?;
    for result in &report.scenario_results {
        let metrics = &result.risk_metrics;
        let payback = match metrics.payback_period_years {
            Some(years) => format!("{} y", years),
            None => "never".to_string(),
        };
        writeln!(
            out,
            "{:<16} {:>18} {:>8.1}% {:>10}",
            result.scenario.name,
            format_currency(metrics.npv),
            metrics.irr_percentage(),
            payback
        )?;
    }

    writeln!(out)?;
    for reason in &report.reasons {
        writeln!(out, "* {}", reason)?;
    }

    let risk = &report.risk_explanation;
    writeln!(out)?;
    writeln!(out, "{}", risk.biggest_risk)?;
    writeln!(out)?;
    writeln!(out, "{}", risk.success_condition)?;
    writeln!(out)?;
    writeln!(out, "{}", risk.failure_condition)?;
    Ok(())
}

pub fn write_parity<W: Write>(out: &mut W, report: &ParityReport) -> Result<()> {
    writeln!(
        out,
        "== Parity: {}/{} cases passed ==",
        report.passed_count(),
        report.cases.len()
    )?;
    for case in &report.cases {
        let status = if case.passed { "PASS" } else { "FAIL" };
        writeln!(out, "[{}] {}", status, case.name)?;
        for field in case.fields.iter().filter(|f| !f.passed) {
            writeln!(
                out,
                "    {}: expected {:.2}, got {:.2}",
                field.field, field.expected, field.actual
            )?;
        }
    }
    Ok(())
}
