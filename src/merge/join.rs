use super::key::{comparison_type, extract_keys, JoinKey};
use crate::{
    config::DuplicateKeyPolicy,
    error::{MergeError, Result, Step},
    table::{column_index, has_range_index, PANDAS_METADATA_KEY},
};
use arrow::{
    array::{Array, ArrayRef, UInt64Array},
    compute::take,
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, instrument, warn};

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Row accounting for one left join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub primary_rows: usize,
    pub supplementary_rows: usize,
    pub output_rows: usize,
    /// Primary rows that found no supplementary match.
    pub unmatched_rows: usize,
    /// Extra rows created because a key matched more than once.
    pub fanned_out_rows: usize,
}

#[derive(Debug)]
pub struct Joined {
    pub batch: RecordBatch,
    pub stats: JoinStats,
}

/// Left-join `primary` with `supplementary` on the column `key`.
///
/// Output rows follow primary order; a primary row matching several
/// supplementary rows is repeated once per match, in supplementary order.
/// Columns are all primary columns followed by the supplementary non-key
/// columns; a name present on both sides gets `_x` / `_y` suffixes.
/// The primary schema metadata is kept, so a pandas index designation
/// survives, unless fan-out has invalidated a stored `RangeIndex`.
#[instrument(level = "debug", skip(primary, supplementary))]
pub fn left_join(
    primary: &RecordBatch,
    supplementary: &RecordBatch,
    key: &str,
    on_duplicate_key: DuplicateKeyPolicy,
) -> Result<Joined> {
    let left_key = column_index(primary, key, Step::Join)?;
    let right_key = column_index(supplementary, key, Step::Join)?;

    // 1) normalise both key columns to a shared representation
    let left_col = primary.column(left_key);
    let right_col = supplementary.column(right_key);
    let target = comparison_type(left_col.data_type(), right_col.data_type());
    debug!(
        left = %left_col.data_type(),
        right = %right_col.data_type(),
        compare_as = %target,
        "join key types"
    );
    let left_keys =
        extract_keys(left_col.as_ref(), &target).map_err(MergeError::compute(Step::Join))?;
    let right_keys =
        extract_keys(right_col.as_ref(), &target).map_err(MergeError::compute(Step::Join))?;

    // 2) key → supplementary rows, in file order
    let mut lookup: HashMap<&JoinKey, Vec<u64>> = HashMap::new();
    for (row, k) in right_keys.iter().enumerate() {
        if let Some(k) = k {
            lookup.entry(k).or_default().push(row as u64);
        }
    }

    if on_duplicate_key == DuplicateKeyPolicy::Reject {
        let first_dup = right_keys
            .iter()
            .flatten()
            .find_map(|k| {
                lookup
                    .get(k)
                    .filter(|rows| rows.len() > 1)
                    .map(|rows| (k, rows.len()))
            });
        if let Some((k, count)) = first_dup {
            return Err(MergeError::DuplicateKey {
                key: k.to_string(),
                count,
            });
        }
    }

    // 3) take indices for both sides
    let mut left_idx: Vec<u64> = Vec::with_capacity(primary.num_rows());
    let mut right_idx: Vec<Option<u64>> = Vec::with_capacity(primary.num_rows());
    let mut stats = JoinStats {
        primary_rows: primary.num_rows(),
        supplementary_rows: supplementary.num_rows(),
        ..JoinStats::default()
    };

    for (row, k) in left_keys.iter().enumerate() {
        match k.as_ref().and_then(|k| lookup.get(k)) {
            Some(matches) => {
                stats.fanned_out_rows += matches.len() - 1;
                for &m in matches {
                    left_idx.push(row as u64);
                    right_idx.push(Some(m));
                }
            }
            None => {
                stats.unmatched_rows += 1;
                left_idx.push(row as u64);
                right_idx.push(None);
            }
        }
    }
    stats.output_rows = left_idx.len();

    // 4) gather columns
    let mut columns: Vec<ArrayRef> =
        Vec::with_capacity(primary.num_columns() + supplementary.num_columns() - 1);
    if stats.fanned_out_rows == 0 {
        // one output row per primary row, in order
        columns.extend(primary.columns().iter().cloned());
    } else {
        let indices = UInt64Array::from(left_idx);
        for col in primary.columns() {
            let taken = take(col.as_ref(), &indices, None)
                .map_err(MergeError::compute(Step::Join))?;
            columns.push(taken);
        }
    }
    let indices = UInt64Array::from(right_idx);
    for (i, col) in supplementary.columns().iter().enumerate() {
        if i == right_key {
            continue;
        }
        let taken =
            take(col.as_ref(), &indices, None).map_err(MergeError::compute(Step::Join))?;
        columns.push(taken);
    }

    // 5) output schema
    let primary_schema = primary.schema();
    let supplementary_schema = supplementary.schema();
    let left_names: HashSet<&str> = primary_schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != left_key)
        .map(|(_, f)| f.name().as_str())
        .collect();
    let overlap: HashSet<&str> = supplementary_schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, f)| *i != right_key && left_names.contains(f.name().as_str()))
        .map(|(_, f)| f.name().as_str())
        .collect();

    let mut fields: Vec<Field> = Vec::with_capacity(columns.len());
    for f in primary_schema.fields() {
        let f = f.as_ref().clone();
        if overlap.contains(f.name().as_str()) {
            let name = format!("{}{}", f.name(), LEFT_SUFFIX);
            fields.push(f.with_name(name));
        } else {
            fields.push(f);
        }
    }
    for (i, f) in supplementary_schema.fields().iter().enumerate() {
        if i == right_key {
            continue;
        }
        let mut f = f.as_ref().clone().with_nullable(true);
        if overlap.contains(f.name().as_str()) {
            let name = format!("{}{}", f.name(), RIGHT_SUFFIX);
            f = f.with_name(name);
        }
        fields.push(f);
    }

    let mut metadata = primary_schema.metadata().clone();
    if stats.fanned_out_rows > 0 && has_range_index(&metadata) {
        warn!(
            extra_rows = stats.fanned_out_rows,
            "fan-out no longer fits the stored range index; dropping pandas metadata"
        );
        metadata.remove(PANDAS_METADATA_KEY);
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
    let batch = RecordBatch::try_new(schema, columns).map_err(MergeError::compute(Step::Join))?;
    Ok(Joined { batch, stats })
}
