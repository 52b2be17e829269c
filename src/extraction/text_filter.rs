//! Cheap pre-filter deciding which on-screen strings are worth parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::extraction::number_parser;

const CURRENCY_INDICATORS: [&str; 4] = ["TL", "₺", "tl", "Tl"];
const IMPORTANT_LABELS: [&str; 2] = ["fiyat", "price"];
const MIN_DIGIT_COUNT: usize = 4;
const MIN_LENGTH: usize = 3;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn is_candidate(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_LENGTH {
        return false;
    }

    contains_important_label(trimmed)
        || number_parser::looks_like_coordinate(trimmed)
        || contains_currency(trimmed)
        || contains_large_number(trimmed)
}

/// Case-insensitive; also catches the Turkish dotted capital in `FİYAT`.
pub fn contains_important_label(text: &str) -> bool {
    let lower = text.to_lowercase().replace("i\u{307}", "i");
    IMPORTANT_LABELS.iter().any(|label| lower.contains(label))
}

pub fn contains_currency(text: &str) -> bool {
    CURRENCY_INDICATORS.iter().any(|indicator| text.contains(indicator))
}

pub fn contains_large_number(text: &str) -> bool {
    text.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_DIGIT_COUNT
}

/// Normalize spacing only. No numeric conversion happens here.
pub fn clean_text(text: &str) -> String {
    let spaced = text.replace('\u{00A0}', " ");
    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
}

/// Clean every string and keep the candidates, preserving screen order.
pub fn select_candidates<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    texts
        .iter()
        .map(|text| clean_text(text.as_ref()))
        .filter(|text| is_candidate(text))
        .collect()
}

/// Display helper: drop `.` thousands separators inside digit-bearing tokens,
/// e.g. `"3.500.000 TL"` becomes `"3500000 TL"`.
pub fn normalize_number_format(text: &str) -> String {
    text.split(' ')
        .map(|part| {
            if part.chars().any(|c| c.is_ascii_digit()) {
                part.replace('.', "")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
