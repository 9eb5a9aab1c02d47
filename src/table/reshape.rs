use crate::error::{MergeError, Result, Step};
use arrow::{
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// Position of `name` in `batch`, or `MissingColumn` labelled with `step`.
pub fn column_index(batch: &RecordBatch, name: &str, step: Step) -> Result<usize> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| MergeError::missing(step, name))
}

/// Remove the column called `name`.
pub fn drop_column(batch: &RecordBatch, name: &str) -> Result<RecordBatch> {
    let idx = column_index(batch, name, Step::Drop)?;
    let mut out = batch.clone();
    out.remove_column(idx);
    Ok(out)
}

/// Rename `from` to `to`, refusing to create a second column called `to`.
pub fn rename_column(batch: &RecordBatch, from: &str, to: &str) -> Result<RecordBatch> {
    let idx = column_index(batch, from, Step::Rename)?;
    if from == to {
        return Ok(batch.clone());
    }
    let schema = batch.schema();
    if schema.index_of(to).is_ok() {
        return Err(MergeError::DuplicateColumn {
            step: Step::Rename,
            column: to.to_string(),
        });
    }

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let f = f.as_ref().clone();
            if i == idx {
                f.with_name(to)
            } else {
                f
            }
        })
        .collect();
    let renamed = Schema::new_with_metadata(fields, schema.metadata().clone());

    RecordBatch::try_new(Arc::new(renamed), batch.columns().to_vec())
        .map_err(MergeError::compute(Step::Rename))
}
