//! Query/filter engine.
//!
//! Every operation is a single linear scan over the loaded dataset. Results
//! borrow from the dataset and keep its row order; nothing is sorted.
//!
//! Matching rules:
//! - `model` compares case-insensitively (both sides lower-cased).
//! - every other field compares by exact string equality.
//! - a record without the field never matches.

use super::types::{
    FeedbackDataset, FeedbackRecord, SummaryParams, FIELD_BRAND, FIELD_DATE, FIELD_FACT,
    FIELD_FEATURE,
};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Missing required parameters")]
    MissingParameters,

    #[error("Feedback not found")]
    FeedbackNotFound,

    #[error("Feedback index not found")]
    IndexNotFound,

    #[error("No data found for the specified criteria")]
    NoMatchingCriteria,
}

/// Validated parameters of the detailed summary query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCriteria {
    pub category: String,
    pub models: HashSet<String>,
    pub date: String,
    pub brand: String,
}

impl SummaryCriteria {
    /// Fails with [`QueryError::MissingParameters`] if any parameter is absent
    /// or empty. `models` is split on commas with empty entries dropped;
    /// entries are not trimmed.
    pub fn from_params(params: SummaryParams) -> Result<Self, QueryError> {
        let (Some(category), Some(models), Some(date), Some(brand)) = (
            non_empty(params.category),
            non_empty(params.models),
            non_empty(params.date),
            non_empty(params.brand),
        ) else {
            return Err(QueryError::MissingParameters);
        };

        Ok(Self {
            category,
            models: parse_models(&models),
            date,
            brand,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn parse_models(models: &str) -> HashSet<String> {
    models
        .split(',')
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive `model` predicate with the needle lower-cased once.
struct ModelMatcher {
    needle: String,
}

impl ModelMatcher {
    fn new(model: &str) -> Self {
        Self {
            needle: model.to_lowercase(),
        }
    }

    fn matches(&self, record: &FeedbackRecord) -> bool {
        record
            .model()
            .is_some_and(|model| model.to_lowercase() == self.needle)
    }
}

fn field_equals(record: &FeedbackRecord, field: &str, expected: &str) -> bool {
    record.get(field) == Some(expected)
}

pub fn list_all(dataset: &FeedbackDataset) -> &[FeedbackRecord] {
    dataset.records()
}

/// Records of one model. An empty result is not an error.
pub fn by_model<'a>(dataset: &'a FeedbackDataset, model: &str) -> Vec<&'a FeedbackRecord> {
    let matcher = ModelMatcher::new(model);
    dataset.iter().filter(|r| matcher.matches(r)).collect()
}

/// Records of one model on one date, in dataset order.
///
/// `date` is compared verbatim against the stored value.
pub fn by_model_date<'a>(
    dataset: &'a FeedbackDataset,
    model: &str,
    date: &str,
) -> Vec<&'a FeedbackRecord> {
    let matcher = ModelMatcher::new(model);
    dataset
        .iter()
        .filter(|r| matcher.matches(r) && field_equals(r, FIELD_DATE, date))
        .collect()
}

/// The `index`-th (0-based) record of [`by_model_date`].
///
/// `index` is the raw path segment; it is only parsed once the model/date
/// filter has matched something, so an empty match set always reports
/// [`QueryError::FeedbackNotFound`].
pub fn by_model_index_date<'a>(
    dataset: &'a FeedbackDataset,
    model: &str,
    index: &str,
    date: &str,
) -> Result<&'a FeedbackRecord, QueryError> {
    let matches = by_model_date(dataset, model, date);
    if matches.is_empty() {
        return Err(QueryError::FeedbackNotFound);
    }

    let index = parse_index(index)?;
    matches
        .get(index)
        .copied()
        .ok_or(QueryError::IndexNotFound)
}

/// Records whose model is one of `criteria.models` and whose date, brand and
/// fact equal the criteria exactly. Zero matches is an error.
pub fn by_criteria<'a>(
    dataset: &'a FeedbackDataset,
    criteria: &SummaryCriteria,
) -> Result<Vec<&'a FeedbackRecord>, QueryError> {
    let results: Vec<&FeedbackRecord> = dataset
        .iter()
        .filter(|r| {
            r.model().is_some_and(|m| criteria.models.contains(m))
                && field_equals(r, FIELD_DATE, &criteria.date)
                && field_equals(r, FIELD_BRAND, &criteria.brand)
                && field_equals(r, FIELD_FACT, &criteria.category)
        })
        .collect();

    if results.is_empty() {
        return Err(QueryError::NoMatchingCriteria);
    }
    Ok(results)
}

pub fn by_model_feature_sentiment<'a>(
    dataset: &'a FeedbackDataset,
    model: &str,
    feature: &str,
    sentiment: &str,
) -> Result<Vec<&'a FeedbackRecord>, QueryError> {
    let matcher = ModelMatcher::new(model);
    let results: Vec<&FeedbackRecord> = dataset
        .iter()
        .filter(|r| {
            matcher.matches(r)
                && field_equals(r, FIELD_FEATURE, feature)
                && field_equals(r, FIELD_FACT, sentiment)
        })
        .collect();

    if results.is_empty() {
        return Err(QueryError::FeedbackNotFound);
    }
    Ok(results)
}

/// Parses the `:index` path segment the way a lenient integer prefix parse
/// does: leading whitespace, an optional sign, then the leading digit run
/// (`0x`/`0X` switches to hex). Trailing characters are ignored, so `"1abc"`
/// and `"1.5"` both give 1.
///
/// No digits, a negative value other than zero, or a value that does not
/// fit `usize` is [`QueryError::IndexNotFound`].
pub fn parse_index(raw: &str) -> Result<usize, QueryError> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, body) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };

    let digits_len = body
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(body.len());
    let digits = &body[..digits_len];
    if digits.is_empty() {
        return Err(QueryError::IndexNotFound);
    }

    let value = usize::from_str_radix(digits, radix).map_err(|_| QueryError::IndexNotFound)?;
    if negative && value != 0 {
        return Err(QueryError::IndexNotFound);
    }
    Ok(value)
}
