//! Heuristic resource matching
//!
//! Scores a resource against a free-text term using a fixed ladder of rules.
//! All scores are in [0.0, 1.0] and all comparisons are case-insensitive.
//!
//! | rule                                         | score |
//! |----------------------------------------------|-------|
//! | name == term and type == type filter         | 1.0   |
//! | type filter given and type != filter         | 0.0   |
//! | name == term                                 | 0.9   |
//! | name starts with term                        | 0.8   |
//! | term is a whole word of name                 | 0.7   |
//! | term is a substring of name                  | 0.6   |
//! | term is a substring of type                  | 0.5   |
//! | term is a substring of location              | 0.4   |
//! | share of term characters found in name × 0.3 | ≤ 0.3 |
//!
//! Below the exact-name rules the result is the maximum of every rule that
//! applies.

use crate::ResourceRecord;
use ahash::AHashSet;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

pub const EXACT_NAME_AND_TYPE: f32 = 1.0;
pub const EXACT_NAME: f32 = 0.9;
pub const NAME_PREFIX: f32 = 0.8;
pub const NAME_WORD: f32 = 0.7;
pub const NAME_SUBSTRING: f32 = 0.6;
pub const TYPE_SUBSTRING: f32 = 0.5;
pub const LOCATION_SUBSTRING: f32 = 0.4;
pub const CHAR_OVERLAP_SCALE: f32 = 0.3;

/// Threshold used when the caller does not pick one
pub const DEFAULT_THRESHOLD: f32 = 0.3;

/// Clamp a caller-supplied threshold into [0, 1]
pub fn clamp_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        DEFAULT_THRESHOLD
    } else {
        threshold.clamp(0.0, 1.0)
    }
}

/// A search term (and optional type filter) prepared for scoring many records
#[derive(Debug, Clone)]
pub struct Matcher {
    term: String,
    type_filter: Option<String>,
    word: Option<Regex>,
}

impl Matcher {
    /// An empty type filter is the same as no filter
    pub fn new(term: &str, type_filter: Option<&str>) -> Self {
        let term = term.to_lowercase();
        let word = if term.is_empty() {
            None
        } else {
            match Regex::new(&format!(r"\b{}\b", regex::escape(&term))) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Word matcher for {:?} unavailable, using plain scan: {}", term, e);
                    None
                }
            }
        };
        Self {
            term,
            type_filter: type_filter
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase),
            word,
        }
    }

    pub fn score(&self, record: &ResourceRecord) -> f32 {
        if self.term.is_empty() {
            return 0.0;
        }

        let term = self.term.as_str();
        let name = record.name.to_lowercase();
        let resource_type = record.resource_type.to_lowercase();

        // Checked ahead of the filter so a perfect match always surfaces
        if name == term && self.type_filter.as_deref() == Some(resource_type.as_str()) {
            return EXACT_NAME_AND_TYPE;
        }

        if let Some(filter) = &self.type_filter {
            if *filter != resource_type {
                return 0.0;
            }
        }

        if name == term {
            return EXACT_NAME;
        }

        let location = record.location.to_lowercase();
        let mut score = 0.0f32;

        if name.starts_with(term) {
            score = score.max(NAME_PREFIX);
        }
        let is_word = match &self.word {
            Some(re) => re.is_match(&name),
            None => contains_word(&name, term),
        };
        if is_word {
            score = score.max(NAME_WORD);
        }
        if name.contains(term) {
            score = score.max(NAME_SUBSTRING);
        }
        if resource_type.contains(term) {
            score = score.max(TYPE_SUBSTRING);
        }
        if location.contains(term) {
            score = score.max(LOCATION_SUBSTRING);
        }

        score.max(char_overlap(term, &name) * CHAR_OVERLAP_SCALE)
    }
}

/// `term` occurs in `haystack` with a word boundary on both ends, where a
/// boundary sits between a word character and a non-word character (or
/// the start/end of the text), the same rule as regex `\b`
fn contains_word(haystack: &str, term: &str) -> bool {
    let (Some(first), Some(last)) = (term.chars().next(), term.chars().next_back()) else {
        return false;
    };
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let mut from = 0;
    while let Some(offset) = haystack[from..].find(term) {
        let start = from + offset;
        let end = start + term.len();
        let before = haystack[..start].chars().next_back().is_some_and(is_word);
        let after = haystack[end..].chars().next().is_some_and(is_word);
        if before != is_word(first) && after != is_word(last) {
            return true;
        }
        // Occurrences may overlap
        from = start + first.len_utf8();
    }
    false
}

/// Share of the term's characters (with repetition) that occur anywhere in `name`
fn char_overlap(term: &str, name: &str) -> f32 {
    let total = term.chars().count();
    if total == 0 {
        return 0.0;
    }
    let present: AHashSet<char> = name.chars().collect();
    let common = term.chars().filter(|c| present.contains(c)).count();
    common as f32 / total as f32
}

/// Score a single record
pub fn score(record: &ResourceRecord, term: &str, type_filter: Option<&str>) -> f32 {
    Matcher::new(term, type_filter).score(record)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResource {
    #[serde(flatten)]
    pub record: ResourceRecord,
    #[serde(rename = "similarity")]
    pub score: f32,
}

/// Every record scored against one term, best first
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    term: String,
    type_filter: Option<String>,
    threshold: f32,
    ranked: Vec<ScoredResource>,
}

impl Ranking {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn type_filter(&self) -> Option<&str> {
        self.type_filter.as_deref()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// All records, sorted by descending score
    pub fn ranked(&self) -> &[ScoredResource] {
        &self.ranked
    }

    pub fn total(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_match(&self, scored: &ScoredResource) -> bool {
        scored.score >= self.threshold
    }

    /// Records at or above the threshold, best first
    pub fn matches(&self) -> impl Iterator<Item = &ScoredResource> {
        self.ranked.iter().filter(move |r| self.is_match(r))
    }

    pub fn match_count(&self) -> usize {
        self.matches().count()
    }

    /// Highest-scoring record above the threshold
    pub fn best(&self) -> Option<&ScoredResource> {
        self.matches().next()
    }
}

/// Score every record and sort by descending score.
///
/// The sort is stable: records with equal scores keep their input order.
pub fn rank(
    records: &[ResourceRecord],
    term: &str,
    type_filter: Option<&str>,
    threshold: f32,
) -> Ranking {
    let matcher = Matcher::new(term, type_filter);
    let mut ranked: Vec<ScoredResource> = records
        .iter()
        .map(|record| ScoredResource {
            score: matcher.score(record),
            record: record.clone(),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    Ranking {
        term: term.to_string(),
        type_filter: type_filter.filter(|t| !t.is_empty()).map(str::to_string),
        threshold: clamp_threshold(threshold),
        ranked,
    }
}

/// Records sharing the term as their exact name, when they span more than
/// one type. Empty when the term is unambiguous.
pub fn ambiguous_names(records: &[ResourceRecord], term: &str) -> Vec<ResourceRecord> {
    let term = term.to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    let same_name: Vec<ResourceRecord> = records
        .iter()
        .filter(|r| r.name.to_lowercase() == term)
        .cloned()
        .collect();

    if distinct_types(&same_name).len() > 1 {
        same_name
    } else {
        Vec::new()
    }
}

/// Distinct types (case-insensitive) in first-seen order
pub fn distinct_types(records: &[ResourceRecord]) -> Vec<String> {
    let mut seen = AHashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.resource_type.to_lowercase()))
        .map(|r| r.resource_type.clone())
        .collect()
}
