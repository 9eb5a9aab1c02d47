use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::{
    fmt, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Pipeline stage an error was raised in, used to label messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LoadSupplementary,
    LoadPrimary,
    Join,
    Drop,
    Rename,
    Write,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::LoadSupplementary => "load supplementary table",
            Step::LoadPrimary => "load primary table",
            Step::Join => "join",
            Step::Drop => "drop column",
            Step::Rename => "rename column",
            Step::Write => "write output",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{step}: cannot access {}: {source}", .path.display())]
    Io {
        step: Step,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: malformed delimited text in {}: {source}", Step::LoadSupplementary, .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ArrowError,
    },

    #[error("{}: cannot decode {}: {source}", Step::LoadPrimary, .path.display())]
    Deserialization {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{}: cannot encode {}: {source}", Step::Write, .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    #[error("{step}: column `{column}` not found{}", located(.table))]
    MissingColumn {
        step: Step,
        column: String,
        /// Input file the column was expected in, once known.
        table: Option<PathBuf>,
    },

    #[error("{step}: column `{column}` already exists")]
    DuplicateColumn { step: Step, column: String },

    #[error("{}: key `{key}` occurs {count} times in the supplementary table", Step::Join)]
    DuplicateKey { key: String, count: usize },

    #[error("{step}: {source}")]
    Compute {
        step: Step,
        #[source]
        source: ArrowError,
    },
}

impl MergeError {
    pub(crate) fn io(step: Step, path: impl Into<PathBuf>, source: io::Error) -> Self {
        MergeError::Io {
            step,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing(step: Step, column: &str) -> Self {
        MergeError::MissingColumn {
            step,
            column: column.to_string(),
            table: None,
        }
    }

    /// Name the input file a missing column was expected in.
    pub(crate) fn in_table(self, path: &Path) -> Self {
        match self {
            MergeError::MissingColumn {
                step,
                column,
                table: None,
            } => MergeError::MissingColumn {
                step,
                column,
                table: Some(path.to_path_buf()),
            },
            other => other,
        }
    }

    pub(crate) fn compute(step: Step) -> impl FnOnce(ArrowError) -> Self {
        move |source| MergeError::Compute { step, source }
    }
}

fn located(table: &Option<PathBuf>) -> String {
    match table {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

pub type Result<T, E = MergeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_step_and_path() {
        let err = MergeError::io(
            Step::Write,
            "/nowhere/out.parquet",
            io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("write output:"), "{msg}");
        assert!(msg.contains("/nowhere/out.parquet"), "{msg}");

        let err = MergeError::missing(Step::Drop, "cap_cost_multiplier");
        assert_eq!(
            err.to_string(),
            "drop column: column `cap_cost_multiplier` not found"
        );
        assert_eq!(
            err.in_table(Path::new("/data/agents.parquet")).to_string(),
            "drop column: column `cap_cost_multiplier` not found in /data/agents.parquet"
        );
    }
}
