use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys probed (in order) when a record is displayed.
const TITLE_KEYS: &[&str] = &["title", "name", "titleTxt"];

/// One recipe document.
///
/// Records are opaque: the pipeline stores and returns them exactly as they
/// were fetched. Serialization is transparent, so a `Vec<Record>` round-trips
/// as a plain JSON array of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON document
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Best-effort display title.
    ///
    /// Looks at `title`, `name` and `titleTxt` in that order and returns the
    /// first non-empty string. Used for display only, never for storage.
    pub fn display_title(&self) -> Option<&str> {
        let object = self.0.as_object()?;
        TITLE_KEYS
            .iter()
            .filter_map(|key| object.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|title| !title.is_empty())
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
