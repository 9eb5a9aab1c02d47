//! Command-line and environment configuration for the `capex-merge` binary.

use capex_merge::{
    config::{DEFAULT_KEY, DEFAULT_OVERRIDE, DEFAULT_REPLACE},
    DuplicateKeyPolicy, MergeConfig,
};
use clap::Parser;
use std::path::PathBuf;

/// Replace the capital cost multiplier of every agent with a per-county override.
#[derive(Parser, Debug)]
#[command(name = "capex-merge", version, about)]
pub struct Cli {
    /// Agent table to update (Parquet)
    #[arg(long, env = "CAPEX_MERGE_PRIMARY")]
    pub primary: PathBuf,

    /// Per-county overrides (delimited text with a header row)
    #[arg(long, env = "CAPEX_MERGE_SUPPLEMENTARY")]
    pub supplementary: PathBuf,

    /// Where to write the merged agent table (Parquet)
    #[arg(long, short = 'o', env = "CAPEX_MERGE_OUTPUT")]
    pub output: PathBuf,

    /// Column both tables are joined on
    #[arg(long, env = "CAPEX_MERGE_KEY", default_value = DEFAULT_KEY)]
    pub key: String,

    /// Agent column that gets replaced
    #[arg(long, env = "CAPEX_MERGE_REPLACE", default_value = DEFAULT_REPLACE)]
    pub replace: String,

    /// Override column that takes its place
    #[arg(long = "override-with", env = "CAPEX_MERGE_OVERRIDE", default_value = DEFAULT_OVERRIDE)]
    pub override_with: String,

    /// What to do when a key repeats in the override table
    #[arg(long, env = "CAPEX_MERGE_ON_DUPLICATE_KEY", value_enum, default_value_t = DuplicateKeyPolicy::FanOut)]
    pub on_duplicate_key: DuplicateKeyPolicy,

    /// Field delimiter of the override table (a single character, or `tab`)
    #[arg(long, env = "CAPEX_MERGE_DELIMITER", default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        s => Err(format!("expected a single ASCII character, got {s:?}")),
    }
}

impl Cli {
    pub fn into_config(self) -> MergeConfig {
        MergeConfig {
            key: self.key,
            replace_column: self.replace,
            override_column: self.override_with,
            ..MergeConfig::new(self.primary, self.supplementary, self.output)
                .with_duplicate_key_policy(self.on_duplicate_key)
                .with_delimiter(self.delimiter)
        }
    }
}
