use crate::{
    config::MergeConfig,
    error::Result,
    merge::{left_join, JoinStats},
    table,
};
use arrow::record_batch::RecordBatch;
use tracing::{info, instrument, warn};

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub join: JoinStats,
    pub output_columns: usize,
    pub output_bytes: u64,
}

/// Join, drop and rename, all in memory.
pub fn transform(
    primary: &RecordBatch,
    supplementary: &RecordBatch,
    config: &MergeConfig,
) -> Result<(RecordBatch, JoinStats)> {
    let joined =
        left_join(primary, supplementary, &config.key, config.on_duplicate_key).map_err(|e| {
            if primary.schema().index_of(&config.key).is_err() {
                e.in_table(&config.primary_input_path)
            } else {
                e.in_table(&config.supplementary_input_path)
            }
        })?;
    let stats = joined.stats;
    if stats.unmatched_rows > 0 {
        warn!(
            unmatched = stats.unmatched_rows,
            key = %config.key,
            "primary rows without a supplementary match"
        );
    }
    if stats.fanned_out_rows > 0 {
        warn!(
            extra_rows = stats.fanned_out_rows,
            key = %config.key,
            "duplicate supplementary keys fanned out primary rows"
        );
    }

    let dropped = table::drop_column(&joined.batch, &config.replace_column)
        .map_err(|e| e.in_table(&config.primary_input_path))?;
    let out = table::rename_column(&dropped, &config.override_column, &config.replace_column)
        .map_err(|e| e.in_table(&config.supplementary_input_path))?;
    Ok((out, stats))
}

/// Load both inputs, merge them and write the output file.
///
/// Nothing is written unless every earlier step succeeded.
#[instrument(level = "info", skip(config), fields(output = %config.output_path.display()))]
pub fn run(config: &MergeConfig) -> Result<MergeReport> {
    // ─── 1) supplementary table ─────────────────────────────────────
    let supplementary =
        table::read_delimited(&config.supplementary_input_path, config.delimiter)?;
    info!(
        path = %config.supplementary_input_path.display(),
        rows = supplementary.num_rows(),
        columns = supplementary.num_columns(),
        "loaded supplementary table"
    );

    // ─── 2) primary table ───────────────────────────────────────────
    let primary = table::read_parquet(&config.primary_input_path)?;
    info!(
        path = %config.primary_input_path.display(),
        rows = primary.num_rows(),
        columns = primary.num_columns(),
        "loaded primary table"
    );

    // ─── 3–5) join, drop, rename ────────────────────────────────────
    let (out, stats) = transform(&primary, &supplementary, config)?;
    info!(
        rows = stats.output_rows,
        unmatched = stats.unmatched_rows,
        "merged on {}",
        config.key
    );

    // ─── 6) persist ─────────────────────────────────────────────────
    let output_bytes = table::write_parquet(&out, &config.output_path)?;
    info!(
        path = %config.output_path.display(),
        rows = out.num_rows(),
        bytes = output_bytes,
        "wrote output"
    );

    Ok(MergeReport {
        join: stats,
        output_columns: out.num_columns(),
        output_bytes,
    })
}
