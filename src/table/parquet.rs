use crate::error::{MergeError, Result, Step};
use arrow::{compute::concat_batches, error::ArrowError, record_batch::RecordBatch};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    error::Error,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

const BATCH_SIZE: usize = 8_192;

fn decode_err<E>(path: &Path) -> impl FnOnce(E) -> MergeError + '_
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    move |e| MergeError::Deserialization {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

/// Read a whole Parquet file into one batch, keeping the file's Arrow schema.
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file = super::open_input(path, Step::LoadPrimary)?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(decode_err(path))?;
    let schema = builder.schema().clone();
    debug!(
        rows = builder.metadata().file_metadata().num_rows(),
        row_groups = builder.metadata().num_row_groups(),
        "opened parquet"
    );

    let reader = builder
        .with_batch_size(BATCH_SIZE)
        .build()
        .map_err(decode_err(path))?;
    let batches = reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .map_err(decode_err(path))?;

    concat_batches(&schema, &batches).map_err(decode_err(path))
}

/// `<name>.tmp` next to `path`.
fn tmp_path_for(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        MergeError::io(
            Step::Write,
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;
    let mut tmp = name.to_os_string();
    tmp.push(".tmp");
    Ok(path.with_file_name(tmp))
}

/// Write `batch` to `path` as Snappy-compressed Parquet, returning the file size.
///
/// Data goes to a temporary sibling first and is renamed over `path` only
/// after the writer has flushed its footer; the temporary is removed on
/// failure so no partial output is left behind.
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<u64> {
    let tmp_path = tmp_path_for(path)?;

    let result = write_tmp(batch, &tmp_path, path).and_then(|bytes| {
        fs::rename(&tmp_path, path).map_err(|e| MergeError::io(Step::Write, path, e))?;
        Ok(bytes)
    });

    if result.is_err() && tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!("failed to remove {}: {}", tmp_path.display(), e);
        }
    }
    result
}

fn write_tmp(batch: &RecordBatch, tmp_path: &Path, path: &Path) -> Result<u64> {
    let encode_err = |source| MergeError::Serialization {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(tmp_path).map_err(|e| MergeError::io(Step::Write, path, e))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(encode_err)?;
    writer.write(batch).map_err(encode_err)?;
    writer.close().map_err(encode_err)?;

    let bytes = fs::metadata(tmp_path)
        .map_err(|e| MergeError::io(Step::Write, path, e))?
        .len();
    debug!(rows = batch.num_rows(), bytes, "parquet written");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use arrow::{
        array::{ArrayRef, Float64Array, Int64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use std::sync::Arc;
    use tempfile::tempdir;

    fn agents() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("county_id", DataType::Int64, false),
            Field::new("cap_cost_multiplier", DataType::Float64, true),
            Field::new("sector", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![53, 61])) as ArrayRef,
                Arc::new(Float64Array::from(vec![1.0, 1.1])),
                Arc::new(StringArray::from(vec!["res", "com"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn written_file_reads_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("agents.parquet");
        let batch = agents();

        let bytes = write_parquet(&batch, &path)?;
        assert!(bytes > 0);
        assert!(!dir.path().join("agents.parquet.tmp").exists());

        let back = read_parquet(&path)?;
        assert_eq!(back.schema().fields(), batch.schema().fields());
        assert_eq!(back.columns(), batch.columns());
        Ok(())
    }

    #[test]
    fn garbage_is_a_deserialization_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("agents.parquet");
        fs::write(&path, b"\x80\x04\x95 definitely not parquet")?;

        let err = read_parquet(&path).unwrap_err();
        assert!(matches!(err, MergeError::Deserialization { .. }), "{err}");
        Ok(())
    }

    #[test]
    fn directory_input_is_io_error() -> Result<()> {
        let dir = tempdir()?;

        let err = read_parquet(dir.path()).unwrap_err();
        match err {
            MergeError::Io { step, source, .. } => {
                assert_eq!(step, Step::LoadPrimary);
                assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn schema_metadata_survives_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("agents.parquet");
        let batch = agents();
        let metadata = std::collections::HashMap::from([(
            "pandas".to_string(),
            r#"{"index_columns": ["agent_id"]}"#.to_string(),
        )]);
        let schema = Arc::new(batch.schema().as_ref().clone().with_metadata(metadata.clone()));
        let batch = batch.with_schema(schema)?;

        write_parquet(&batch, &path)?;
        let back = read_parquet(&path)?;
        assert_eq!(back.schema().metadata(), &metadata);
        Ok(())
    }

    #[test]
    fn missing_directory_is_io_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("no-such-dir").join("out.parquet");

        let err = write_parquet(&agents(), &path).unwrap_err();
        assert!(
            matches!(err, MergeError::Io { step: Step::Write, .. }),
            "{err}"
        );
        assert!(!path.exists());
        Ok(())
    }
}
