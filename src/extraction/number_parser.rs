//! Locale-ambiguous number and coordinate parsing.
//!
//! Listing sites mix Turkish (`3.500.000,50`) and Western (`3,500,000.50`)
//! conventions, often within one screen. The separator rules below are
//! order-dependent and intentionally lossy for ambiguous input such as
//! `1.234`; the price/rent range filters downstream rely on that behavior.

use std::sync::LazyLock;

use regex::Regex;

use crate::extraction::types::Coordinate;

const CURRENCY_MARKERS: [&str; 2] = ["TL", "₺"];

/// Plausible latitude/longitude window for a bare `lat, lon` pair.
const REGION_LAT: (f64, f64) = (35.0, 43.0);
const REGION_LON: (f64, f64) = (25.0, 46.0);

static URL_COORDINATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(-?\d{1,3}(?:\.\d+)?),\s*(-?\d{1,3}(?:\.\d+)?)").unwrap());

static DECIMAL_DEGREES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*°\s*([NS])[\s,]*(\d{1,3}(?:\.\d+)?)\s*°\s*([EW])").unwrap()
});

static PLAIN_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d{1,3}\.\d+)\s*,\s*(-?\d{1,3}\.\d+)\s*$").unwrap());

static DMS_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\d{1,3})\s*°\s*(\d{1,2})\s*['′]\s*(\d{1,2}(?:\.\d+)?)\s*(?:"|″|'')?\s*([NSEW])"#)
        .unwrap()
});

/// Parse a single currency or number string, e.g. `"3.500.000 TL"` or `"₺25.000"`.
pub fn parse(text: &str) -> Option<f64> {
    if text.trim().is_empty() {
        return None;
    }

    let mut stripped = text.to_string();
    for marker in CURRENCY_MARKERS {
        stripped = stripped.replace(marker, "");
    }

    let cleaned: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    normalize_separators(&cleaned)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse every string, dropping failures and keeping the order of successes.
pub fn parse_all<S: AsRef<str>>(texts: &[S]) -> Vec<f64> {
    texts.iter().filter_map(|t| parse(t.as_ref())).collect()
}

/// Resolve `.` and `,` into at most one decimal point.
fn normalize_separators(cleaned: &str) -> String {
    let dot_count = cleaned.matches('.').count();
    let comma_count = cleaned.matches(',').count();
    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    if dot_count > 1 && comma_count == 0 {
        // 3.500.000
        cleaned.replace('.', "")
    } else if comma_count > 0 && dot_count == 1 && last_dot > last_comma {
        // 25,000.50 (checked ahead of the Turkish rule so a single trailing
        // dot after a comma reads as a decimal point)
        cleaned.replace(',', "")
    } else if dot_count > 0 && comma_count == 1 {
        // 3.500.000,50
        cleaned.replace('.', "").replace(',', ".")
    } else if comma_count > 1 && dot_count == 0 {
        // 3,500,000
        cleaned.replace(',', "")
    } else if dot_count == 1 && comma_count == 0 {
        let after_dot = cleaned.rsplit('.').next().unwrap_or_default();
        if after_dot.len() == 3 {
            cleaned.replace('.', "")
        } else {
            cleaned.to_string()
        }
    } else if comma_count == 1 && dot_count == 0 {
        let after_comma = cleaned.rsplit(',').next().unwrap_or_default();
        if after_comma.len() <= 2 {
            cleaned.replace(',', ".")
        } else {
            cleaned.replace(',', "")
        }
    } else {
        cleaned.to_string()
    }
}

/// Parse geocoordinate text. Tried in order: map-URL `@lat,lon`, decimal
/// degrees with hemispheres, a bare decimal pair inside the supported region,
/// then degrees-minutes-seconds.
pub fn parse_coordinates(text: &str) -> Option<Coordinate> {
    parse_url_coordinate(text)
        .or_else(|| parse_decimal_degrees(text))
        .or_else(|| parse_plain_pair(text))
        .or_else(|| parse_dms(text))
}

/// True when any coordinate form is present.
pub fn looks_like_coordinate(text: &str) -> bool {
    parse_coordinates(text).is_some()
}

fn parse_url_coordinate(text: &str) -> Option<Coordinate> {
    let cap = URL_COORDINATE.captures(text)?;
    let lat = cap[1].parse::<f64>().ok()?;
    let lon = cap[2].parse::<f64>().ok()?;
    valid_coordinate(lat, lon)
}

fn parse_decimal_degrees(text: &str) -> Option<Coordinate> {
    let cap = DECIMAL_DEGREES.captures(text)?;
    let lat = signed(cap[1].parse::<f64>().ok()?, &cap[2]);
    let lon = signed(cap[3].parse::<f64>().ok()?, &cap[4]);
    valid_coordinate(lat, lon)
}

fn parse_plain_pair(text: &str) -> Option<Coordinate> {
    let cap = PLAIN_PAIR.captures(text)?;
    let lat = cap[1].parse::<f64>().ok()?;
    let lon = cap[2].parse::<f64>().ok()?;

    let in_region = (REGION_LAT.0..=REGION_LAT.1).contains(&lat)
        && (REGION_LON.0..=REGION_LON.1).contains(&lon);
    if !in_region {
        return None;
    }

    Some(Coordinate { lat, lon })
}

fn parse_dms(text: &str) -> Option<Coordinate> {
    let mut lat = None;
    let mut lon = None;

    for cap in DMS_PART.captures_iter(text) {
        let degrees = cap[1].parse::<f64>().ok()?;
        let minutes = cap[2].parse::<f64>().ok()?;
        let seconds = cap[3].parse::<f64>().ok()?;
        let hemisphere = &cap[4];
        let value = signed(degrees + minutes / 60.0 + seconds / 3600.0, hemisphere);

        match hemisphere {
            "N" | "S" if lat.is_none() => lat = Some(value),
            "E" | "W" if lon.is_none() => lon = Some(value),
            _ => {}
        }
    }

    valid_coordinate(lat?, lon?)
}

fn signed(value: f64, hemisphere: &str) -> f64 {
    match hemisphere {
        "S" | "W" => -value,
        _ => value,
    }
}

fn valid_coordinate(lat: f64, lon: f64) -> Option<Coordinate> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Some(Coordinate { lat, lon })
    } else {
        None
    }
}
