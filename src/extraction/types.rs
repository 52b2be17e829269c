use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One batch of strings read off the screen by the extraction collaborator.
/// Order matters: label adjacency and first-match rules depend on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    pub texts: Vec<String>,
    pub source_app_id: String,
    pub extracted_at: DateTime<Utc>,
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl RawObservation {
    pub fn new(texts: Vec<String>, source_app_id: impl Into<String>, extracted_at: DateTime<Utc>) -> Self {
        Self {
            texts,
            source_app_id: source_app_id.into(),
            extracted_at,
            success: true,
            error_message: None,
        }
    }

    pub fn failed(
        source_app_id: impl Into<String>,
        extracted_at: DateTime<Utc>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            texts: Vec::new(),
            source_app_id: source_app_id.into(),
            extracted_at,
            success: false,
            error_message: Some(error_message.into()),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.texts.is_empty()
    }

    pub fn count(&self) -> usize {
        self.texts.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedListingData {
    pub house_price: Option<f64>,
    pub monthly_rent: Option<f64>,
    /// Every positive number found, largest first.
    pub all_values: Vec<f64>,
    pub coordinate: Option<Coordinate>,
    pub source_id: String,
}

impl ParsedListingData {
    pub fn empty(source_id: impl Into<String>) -> Self {
        Self {
            house_price: None,
            monthly_rent: None,
            all_values: Vec::new(),
            coordinate: None,
            source_id: source_id.into(),
        }
    }

    /// A listing is usable with a price/rent pair, a coordinate, or both.
    pub fn is_complete(&self) -> bool {
        self.price_and_rent().is_some() || self.coordinate.is_some()
    }

    pub fn price_and_rent(&self) -> Option<(f64, f64)> {
        match (self.house_price, self.monthly_rent) {
            (Some(price), Some(rent)) => Some((price, rent)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ParseError {
    #[error("No usable text found")]
    NoDataFound,

    #[error("Neither a price/rent pair nor a coordinate could be identified")]
    InsufficientData,

    #[error("Text parsed but produced no usable positive values")]
    InvalidFormat,

    #[error("Extraction failed: {0}")]
    UnexpectedError(String),
}

/// Failure carries the raw texts so the caller can show what was seen.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Success(ParsedListingData),
    Failure { error: ParseError, raw_texts: Vec<String> },
}
