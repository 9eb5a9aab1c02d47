use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) configuration from flags / environment ───────────────────
    let config = cli::Cli::parse().into_config();
    info!(
        primary = %config.primary_input_path.display(),
        supplementary = %config.supplementary_input_path.display(),
        output = %config.output_path.display(),
        "startup"
    );

    // ─── 3) merge ────────────────────────────────────────────────────
    let report = capex_merge::run(&config).with_context(|| {
        format!(
            "merging {} into {}",
            config.supplementary_input_path.display(),
            config.output_path.display()
        )
    })?;

    info!(
        rows = report.join.output_rows,
        unmatched = report.join.unmatched_rows,
        fanned_out = report.join.fanned_out_rows,
        columns = report.output_columns,
        bytes = report.output_bytes,
        "all done"
    );
    Ok(())
}
