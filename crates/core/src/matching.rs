//! Text matching between reported tokens and knowledge-base phrases.
//!
//! Both sides are normalised (lowercase, punctuation to space, collapsed whitespace) and
//! compared as whole-word phrases, so `"fever"` matches `"Fever with neck stiffness"` but
//! `"ache"` does not match `"headache"`.

use crate::input::Sex;
use regex::Regex;
use std::sync::LazyLock;

/// Lowercase, replace every non-alphanumeric character with a space and collapse runs of
/// whitespace.
pub fn normalise(text: &str) -> String {
    let mut lowered = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            lowered.extend(c.to_lowercase());
        } else {
            lowered.push(' ');
        }
    }
    lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalise to identifier form: `"Thunderclap onset!"` becomes `"thunderclap-onset"`.
pub fn slug(text: &str) -> String {
    normalise(text).replace(' ', "-")
}

/// True when every word of `needle` appears contiguously, as whole words, in `haystack`.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let haystack = normalise(haystack);
    let needle = normalise(needle);
    if needle.is_empty() {
        return false;
    }

    let words: Vec<&str> = haystack.split(' ').collect();
    let wanted: Vec<&str> = needle.split(' ').collect();
    words.windows(wanted.len()).any(|w| w == wanted.as_slice())
}

/// True when either phrase textually implies the other.
pub fn implies(token: &str, phrase: &str) -> bool {
    contains_phrase(phrase, token) || contains_phrase(token, phrase)
}

static AGE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bage\s*(\d{1,3})\s*-\s*(\d{1,3})\b").expect("valid age range regex")
});
static AGE_AT_LEAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bage\s*(?:(?:>=|≥)\s*(\d{1,3})|(\d{1,3})\s*\+)")
        .expect("valid age minimum regex")
});
static AGE_OVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bage\s*(?:>\s*|over\s+)(\d{1,3})\b").expect("valid age over regex")
});
static AGE_UNDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bage\s*(?:<\s*|under\s+)(\d{1,3})\b").expect("valid age under regex")
});
static FEMALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:female|women|woman)\b").expect("valid sex regex"));
static MALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:male|men|man)\b").expect("valid sex regex"));

fn capture_number(caps: &regex::Captures<'_>, group: usize) -> Option<u16> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

/// True when `risk_factor` describes an age band that contains `age`.
///
/// Recognised forms: `age 10-30`, `age >50` / `age over 50`, `age >=65` / `age 65+`,
/// `age <5` / `age under 5`.
pub fn age_band_matches(risk_factor: &str, age: u8) -> bool {
    let age = u16::from(age);

    if let Some(caps) = AGE_RANGE.captures(risk_factor) {
        if let (Some(lo), Some(hi)) = (capture_number(&caps, 1), capture_number(&caps, 2)) {
            return (lo..=hi).contains(&age);
        }
    }
    if let Some(caps) = AGE_AT_LEAST.captures(risk_factor) {
        if let Some(min) = capture_number(&caps, 1).or_else(|| capture_number(&caps, 2)) {
            return age >= min;
        }
    }
    if let Some(caps) = AGE_OVER.captures(risk_factor) {
        if let Some(min) = capture_number(&caps, 1) {
            return age > min;
        }
    }
    if let Some(caps) = AGE_UNDER.captures(risk_factor) {
        if let Some(max) = capture_number(&caps, 1) {
            return age < max;
        }
    }
    false
}

/// True when `risk_factor` names the given sex.
pub fn sex_matches(risk_factor: &str, sex: Sex) -> bool {
    match sex {
        Sex::Female => FEMALE.is_match(risk_factor),
        Sex::Male => MALE.is_match(risk_factor),
        Sex::Other => false,
    }
}
