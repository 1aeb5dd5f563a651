use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("record field `{field}` must be non-empty")]
    EmptyField { field: &'static str },
}

/// One structured item extracted from a source document.
///
/// Records are immutable once built. Two records are the same item exactly
/// when all four fields are equal, which is what `Eq`/`Hash` compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    source_name: String,
    title: String,
    description: String,
    published_at: String,
}

impl Record {
    pub fn new(
        source_name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            source_name: source_name.into(),
            title: title.into(),
            description: description.into(),
            published_at: published_at.into(),
        };

        for (field, value) in [
            ("source_name", &record.source_name),
            ("title", &record.title),
            ("description", &record.description),
            ("published_at", &record.published_at),
        ] {
            if value.is_empty() {
                return Err(ValidationError::EmptyField { field });
            }
        }

        Ok(record)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Timestamp exactly as the source published it; never reparsed.
    pub fn published_at(&self) -> &str {
        &self.published_at
    }
}

/// Turns one raw document into records for a single source kind.
///
/// Implementations must not fail at the top level: a broken candidate item is
/// skipped and the rest of the batch is still returned. Extractors keep no
/// state between calls.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, raw_content: &str) -> Vec<Record>;
}

/// Receives every record the first time it is seen.
///
/// Called on the aggregator's task; a slow sink stalls the whole pipeline.
pub trait RecordSink: Send {
    fn emit(&mut self, record: &Record);
}
