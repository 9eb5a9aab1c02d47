use arrow::{
    array::{Array, AsArray},
    compute::{cast_with_options, CastOptions},
    datatypes::{DataType, Float64Type, Int64Type},
    error::ArrowError,
};
use std::fmt;

/// A join key value normalised so that equal keys hash equally across
/// differently typed columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    Int(i64),
    /// Bit pattern of a non-NaN f64 with -0.0 folded into 0.0.
    Float(u64),
    Text(String),
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKey::Int(v) => write!(f, "{v}"),
            JoinKey::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            JoinKey::Text(s) => f.write_str(s),
        }
    }
}

/// Type both key columns are compared as.
///
/// - both integer            → Int64
/// - both numeric, any float → Float64
/// - anything else           → Utf8
pub fn comparison_type(left: &DataType, right: &DataType) -> DataType {
    if left.is_integer() && right.is_integer() {
        DataType::Int64
    } else if left.is_numeric() && right.is_numeric() {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

fn float_key(v: f64) -> Option<JoinKey> {
    if v.is_nan() {
        None
    } else if v == 0.0 {
        Some(JoinKey::Float(0f64.to_bits()))
    } else {
        Some(JoinKey::Float(v.to_bits()))
    }
}

/// Trim whitespace and one pair of surrounding quotes.
fn clean_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Per-row keys of `array` compared as `target`. Nulls and NaNs become `None`
/// and never match anything; a value that does not fit `target` is an error.
pub fn extract_keys(
    array: &dyn Array,
    target: &DataType,
) -> Result<Vec<Option<JoinKey>>, ArrowError> {
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    let values = cast_with_options(array, target, &options)?;
    let keys = match target {
        DataType::Int64 => values
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map(JoinKey::Int))
            .collect(),
        DataType::Float64 => values
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.and_then(float_key))
            .collect(),
        _ => values
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(|s| JoinKey::Text(clean_key(s))))
            .collect(),
    };
    Ok(keys)
}
