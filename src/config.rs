use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub financial: FinancialConstants,
    #[serde(default)]
    pub discrimination: DiscriminationLimits,
    #[serde(default)]
    pub verdict: VerdictThresholds,
    #[serde(default)]
    pub projection: ProjectionConfig,
}

/// Purchase, loan and tax parameters of the Turkish residential model.
/// Read-only once loaded; engines take a copy at construction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FinancialConstants {
    /// Title-deed fee plus agent commission, as a share of the price.
    #[serde(default = "default_purchase_expense_rate")]
    pub purchase_expense_rate: f64,
    #[serde(default = "default_loan_usage_ratio")]
    pub loan_usage_ratio: f64,
    /// Monthly, not annual.
    #[serde(default = "default_monthly_interest_rate")]
    pub monthly_interest_rate: f64,
    #[serde(default = "default_loan_term_months")]
    pub loan_term_months: u32,
    #[serde(default = "default_annual_rent_tax_exemption")]
    pub annual_rent_tax_exemption: f64,
    #[serde(default = "default_income_tax_rate")]
    pub income_tax_rate: f64,
}

fn default_purchase_expense_rate() -> f64 { 0.07 }
fn default_loan_usage_ratio() -> f64 { 0.50 }
fn default_monthly_interest_rate() -> f64 { 0.0249 }
fn default_loan_term_months() -> u32 { 60 }
fn default_annual_rent_tax_exemption() -> f64 { 58_000.0 }
fn default_income_tax_rate() -> f64 { 0.20 }

impl Default for FinancialConstants {
    fn default() -> Self {
        Self {
            purchase_expense_rate: default_purchase_expense_rate(),
            loan_usage_ratio: default_loan_usage_ratio(),
            monthly_interest_rate: default_monthly_interest_rate(),
            loan_term_months: default_loan_term_months(),
            annual_rent_tax_exemption: default_annual_rent_tax_exemption(),
            income_tax_rate: default_income_tax_rate(),
        }
    }
}

impl FinancialConstants {
    /// Tax owed on a gross annual rent after the exemption.
    pub fn annual_rent_tax(&self, gross_annual_rent: f64) -> f64 {
        let taxable_income = gross_annual_rent - self.annual_rent_tax_exemption;
        if taxable_income > 0.0 {
            taxable_income * self.income_tax_rate
        } else {
            0.0
        }
    }
}

/// Plausibility ranges used when assigning price and rent roles to numbers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DiscriminationLimits {
    #[serde(default = "default_min_house_price")]
    pub min_house_price: f64,
    #[serde(default = "default_max_house_price")]
    pub max_house_price: f64,
    #[serde(default = "default_min_rent")]
    pub min_rent: f64,
    #[serde(default = "default_max_rent")]
    pub max_rent: f64,
    /// Monthly rent above 5% of the price (60% yearly yield) is not believable.
    #[serde(default = "default_max_rent_to_price_ratio")]
    pub max_rent_to_price_ratio: f64,
}

fn default_min_house_price() -> f64 { 100_000.0 }
fn default_max_house_price() -> f64 { 100_000_000.0 }
fn default_min_rent() -> f64 { 1_000.0 }
fn default_max_rent() -> f64 { 500_000.0 }
fn default_max_rent_to_price_ratio() -> f64 { 0.05 }

impl Default for DiscriminationLimits {
    fn default() -> Self {
        Self {
            min_house_price: default_min_house_price(),
            max_house_price: default_max_house_price(),
            min_rent: default_min_rent(),
            max_rent: default_max_rent(),
            max_rent_to_price_ratio: default_max_rent_to_price_ratio(),
        }
    }
}

impl DiscriminationLimits {
    pub fn is_price_candidate(&self, value: f64) -> bool {
        (self.min_house_price..=self.max_house_price).contains(&value)
    }

    pub fn is_rent_candidate(&self, value: f64) -> bool {
        (self.min_rent..=self.max_rent).contains(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VerdictThresholds {
    #[serde(default = "default_max_amortization_years")]
    pub max_acceptable_amortization_years: f64,
}

fn default_max_amortization_years() -> f64 { 14.0 }

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            max_acceptable_amortization_years: default_max_amortization_years(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_projection_years")]
    pub years: u32,
}

fn default_projection_years() -> u32 { 10 }

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            years: default_projection_years(),
        }
    }
}

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Set only when `LISTING_ANALYZER_CONFIG` is present.
    pub config_path: Option<String>,
    pub source_app_id: String,
    /// Projection rows are appended here when set.
    pub projection_log_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// An explicitly named file must exist; otherwise `config.toml` is
    /// optional.
    pub fn resolve(explicit_path: Option<&str>) -> Result<Self> {
        match explicit_path {
            Some(path) => Self::load(path),
            None => Self::load_or_default(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let f = &self.financial;
        for (name, value) in [
            ("purchase_expense_rate", f.purchase_expense_rate),
            ("loan_usage_ratio", f.loan_usage_ratio),
            ("monthly_interest_rate", f.monthly_interest_rate),
            ("annual_rent_tax_exemption", f.annual_rent_tax_exemption),
            ("income_tax_rate", f.income_tax_rate),
        ] {
            ensure!(value.is_finite() && value >= 0.0, "financial.{} must be non-negative, got {}", name, value);
        }
        ensure!(f.loan_usage_ratio <= 1.0, "financial.loan_usage_ratio must be at most 1, got {}", f.loan_usage_ratio);
        ensure!(f.loan_term_months >= 1, "financial.loan_term_months must be at least 1");

        let d = &self.discrimination;
        ensure!(
            d.min_house_price >= 0.0 && d.min_house_price <= d.max_house_price,
            "discrimination house price range is empty: {}..{}",
            d.min_house_price,
            d.max_house_price
        );
        ensure!(
            d.min_rent >= 0.0 && d.min_rent <= d.max_rent,
            "discrimination rent range is empty: {}..{}",
            d.min_rent,
            d.max_rent
        );
        ensure!(
            d.max_rent_to_price_ratio.is_finite() && d.max_rent_to_price_ratio > 0.0,
            "discrimination.max_rent_to_price_ratio must be positive"
        );

        let threshold = self.verdict.max_acceptable_amortization_years;
        ensure!(
            threshold.is_finite() && threshold > 0.0,
            "verdict.max_acceptable_amortization_years must be positive, got {}",
            threshold
        );
        ensure!(self.projection.years >= 1, "projection.years must be at least 1");
        Ok(())
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::info!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            config_path: std::env::var("LISTING_ANALYZER_CONFIG").ok(),
            source_app_id: std::env::var("LISTING_ANALYZER_SOURCE")
                .unwrap_or_else(|_| "unknown".to_string()),
            projection_log_path: std::env::var("LISTING_ANALYZER_CSV").ok(),
        })
    }
}
