use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::sync::Arc;

pub const FIELD_MODEL: &str = "model";
pub const FIELD_BRAND: &str = "brand";
pub const FIELD_DATE: &str = "date";
pub const FIELD_FACT: &str = "fact";
pub const FIELD_FEATURE: &str = "Feature";

/// One row of the feedback file.
///
/// Fields are kept in column order so that the JSON object written back to
/// clients lists them exactly as the header did. Field names are shared
/// between rows (`Arc<str>`), values are owned per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    fields: Vec<(Arc<str>, String)>,
}

impl FeedbackRecord {
    pub fn new(fields: Vec<(Arc<str>, String)>) -> Self {
        Self { fields }
    }

    /// Builds a record from plain name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| (Arc::from(name.as_ref()), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_ref() == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn model(&self) -> Option<&str> {
        self.get(FIELD_MODEL)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_ref(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for FeedbackRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

/// The whole feedback file, in row order.
///
/// Built once at startup and shared read-only (behind an `Arc`) with every
/// handler. There is no way to mutate it after construction.
#[derive(Debug, Default)]
pub struct FeedbackDataset {
    records: Vec<FeedbackRecord>,
}

impl FeedbackDataset {
    pub fn new(records: Vec<FeedbackRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeedbackRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Query string of `GET /detailed-summary`.
///
/// Every field is optional at the extractor level; presence is checked when
/// the params are turned into a [`SummaryCriteria`](super::engine::SummaryCriteria).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SummaryParams {
    pub category: Option<String>,
    pub models: Option<String>,
    pub date: Option<String>,
    pub brand: Option<String>,
}
