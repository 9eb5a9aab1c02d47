use crate::error::{MergeError, Result, Step};
use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::{io::Seek, path::Path, sync::Arc};
use tracing::debug;

const BATCH_SIZE: usize = 8_192;

/// Read a delimited text file with a header row into a single batch.
///
/// Column types are inferred from the whole file: integers become Int64,
/// decimals Float64, anything else Utf8. Empty fields are nulls.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<RecordBatch> {
    let parse_err = |source: ArrowError| MergeError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut file = super::open_input(path, Step::LoadSupplementary)?;

    // 1) infer the schema, then rewind for the real read
    let format = Format::default().with_header(true).with_delimiter(delimiter);
    let (schema, records) = format.infer_schema(&mut file, None).map_err(parse_err)?;
    file.rewind()
        .map_err(|e| MergeError::io(Step::LoadSupplementary, path, e))?;
    debug!(
        columns = schema.fields().len(),
        records, "inferred delimited schema"
    );

    // 2) decode every batch and stitch them together
    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(BATCH_SIZE)
        .build(file)
        .map_err(parse_err)?;
    let batches = reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .map_err(parse_err)?;

    concat_batches(&schema, &batches).map_err(parse_err)
}
