pub mod csv;
pub mod pandas;
pub mod parquet;
pub mod reshape;

pub use self::csv::read_delimited;
pub use self::parquet::{read_parquet, write_parquet};
pub use pandas::{has_range_index, PANDAS_INDEX_COLUMN, PANDAS_METADATA_KEY};
pub use reshape::{column_index, drop_column, rename_column};

use crate::error::{MergeError, Result, Step};
use std::{fs::File, io, path::Path};

/// Open an input file, rejecting anything that is not a regular file.
///
/// Directories open fine on Unix and would otherwise fail later as a
/// decode error.
pub(crate) fn open_input(path: &Path, step: Step) -> Result<File> {
    let file = File::open(path).map_err(|e| MergeError::io(step, path, e))?;
    let meta = file.metadata().map_err(|e| MergeError::io(step, path, e))?;
    if !meta.is_file() {
        return Err(MergeError::io(
            step,
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok(file)
}
