use serde_json::Value;
use std::collections::HashMap;

/// Index column name pandas uses when it writes an unnamed row index.
pub const PANDAS_INDEX_COLUMN: &str = "__index_level_0__";

/// Schema metadata key holding pandas' own description of the table.
pub const PANDAS_METADATA_KEY: &str = "pandas";

/// Whether the pandas metadata describes a `RangeIndex`.
///
/// A range index has no column of its own; it is rebuilt from
/// `start`/`stop`/`step`, so it only stays valid while the row count does.
pub fn has_range_index(metadata: &HashMap<String, String>) -> bool {
    let Some(raw) = metadata.get(PANDAS_METADATA_KEY) else {
        return false;
    };
    let Ok(doc) = serde_json::from_str::<Value>(raw) else {
        return false;
    };
    doc.get("index_columns")
        .and_then(Value::as_array)
        .is_some_and(|cols| {
            cols.iter()
                .any(|c| c.get("kind").and_then(Value::as_str) == Some("range"))
        })
}
