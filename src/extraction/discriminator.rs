use tracing::{debug, info, trace, warn};

use crate::config::DiscriminationLimits;
use crate::extraction::number_parser;
use crate::extraction::types::{Coordinate, ParseError, ParseResult, ParsedListingData, RawObservation};

/// Assigns price, rent and coordinate roles to a batch of on-screen strings.
#[derive(Debug, Clone, Default)]
pub struct PriceRentDiscriminator {
    limits: DiscriminationLimits,
}

impl PriceRentDiscriminator {
    pub fn new(limits: DiscriminationLimits) -> Self {
        Self { limits }
    }

    pub fn discriminate(&self, observation: &RawObservation) -> ParseResult {
        debug!("discriminate() start - source: {}", observation.source_app_id);

        if !observation.success {
            let message = observation
                .error_message
                .clone()
                .unwrap_or_else(|| "Unknown extraction error".to_string());
            warn!("Extraction failed: {}", message);
            return failure(ParseError::UnexpectedError(message), &observation.texts);
        }

        let texts = &observation.texts;
        debug!("Extracted texts count: {}", texts.len());
        for (index, text) in texts.iter().enumerate() {
            trace!("Text[{}]: {}", index, text);
        }

        if texts.is_empty() {
            return failure(ParseError::NoDataFound, texts);
        }

        // 1. First full coordinate wins
        let coordinate = find_coordinate(texts);

        // 2. Price directly after a "Fiyat" label
        let labeled_price = self.find_labeled_price(texts);

        // 3. Every positive number, largest first
        let parsed = number_parser::parse_all(texts);
        let mut all_values: Vec<f64> = parsed.iter().copied().filter(|v| *v > 0.0).collect();
        all_values.sort_by(|a, b| b.total_cmp(a));

        if all_values.is_empty() && coordinate.is_none() {
            let error = if parsed.is_empty() {
                ParseError::NoDataFound
            } else {
                ParseError::InvalidFormat
            };
            warn!("No usable values: {}", error);
            return failure(error, texts);
        }

        let (house_price, monthly_rent) = self.assign_roles(&all_values, labeled_price);

        let data = ParsedListingData {
            house_price,
            monthly_rent,
            all_values,
            coordinate,
            source_id: observation.source_app_id.clone(),
        };

        if data.is_complete() {
            info!(
                "Discrimination succeeded: price={:?}, rent={:?}, coordinate={:?}",
                data.house_price, data.monthly_rent, data.coordinate
            );
            ParseResult::Success(data)
        } else {
            warn!(
                "Insufficient data: price={:?}, rent={:?}",
                data.house_price, data.monthly_rent
            );
            failure(ParseError::InsufficientData, texts)
        }
    }

    fn find_labeled_price(&self, texts: &[String]) -> Option<f64> {
        for pair in texts.windows(2) {
            if !is_price_label(&pair[0]) {
                continue;
            }

            if let Some(value) = number_parser::parse(&pair[1]) {
                if value >= self.limits.min_house_price {
                    info!("Labeled price found: {}", value);
                    return Some(value);
                }
            }
        }
        None
    }

    /// Pair price and rent from `all_values` (sorted descending).
    fn assign_roles(&self, all_values: &[f64], labeled_price: Option<f64>) -> (Option<f64>, Option<f64>) {
        let price_candidates: Vec<f64> = all_values
            .iter()
            .copied()
            .filter(|v| self.limits.is_price_candidate(*v))
            .collect();
        let rent_candidates: Vec<f64> = all_values
            .iter()
            .copied()
            .filter(|v| self.limits.is_rent_candidate(*v))
            .collect();

        let mut best_price = labeled_price;
        let mut best_rent = None;

        'pairing: for &price in &price_candidates {
            if labeled_price.is_some_and(|labeled| price != labeled) {
                continue;
            }
            for &rent in &rent_candidates {
                if rent == price || rent >= price {
                    continue;
                }
                if rent / price > self.limits.max_rent_to_price_ratio {
                    continue;
                }
                best_price = Some(price);
                best_rent = Some(rent);
                break 'pairing;
            }
        }

        if best_price.is_none() {
            if let Some(&largest) = price_candidates.first() {
                debug!("No valid pair, falling back to largest price candidate {}", largest);
                best_price = Some(largest);
            }
        }

        if best_rent.is_none() && all_values.len() > 1 {
            best_rent = all_values
                .iter()
                .copied()
                .find(|v| Some(*v) != best_price && self.limits.is_rent_candidate(*v));
            if let Some(rent) = best_rent {
                debug!("Rent taken from first remaining in-range value {}", rent);
            }
        }

        (best_price, best_rent)
    }
}

fn find_coordinate(texts: &[String]) -> Option<Coordinate> {
    let found = texts
        .iter()
        .find_map(|text| number_parser::parse_coordinates(text).map(|c| (c, text)));

    found.map(|(coordinate, text)| {
        info!("Coordinate found: {}, {} in text: {:?}", coordinate.lat, coordinate.lon, text);
        coordinate
    })
}

/// `Fiyat`, in any case, including the Turkish dotted capital `FİYAT`.
fn is_price_label(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.eq_ignore_ascii_case("fiyat") || trimmed.to_lowercase().replace("i\u{307}", "i") == "fiyat"
}

fn failure(error: ParseError, texts: &[String]) -> ParseResult {
    ParseResult::Failure {
        error,
        raw_texts: texts.to_vec(),
    }
}
