use std::path::PathBuf;

pub const DEFAULT_KEY: &str = "county_id";
pub const DEFAULT_REPLACE: &str = "cap_cost_multiplier";
pub const DEFAULT_OVERRIDE: &str = "capex_multiplier";

/// What to do when the join key repeats in the supplementary table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DuplicateKeyPolicy {
    /// Emit one output row per matching supplementary row.
    #[default]
    FanOut,
    /// Fail before anything is written.
    Reject,
}

/// Everything one merge run needs. Built by the binary from flags and
/// environment, or directly by library callers.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub primary_input_path: PathBuf,
    pub supplementary_input_path: PathBuf,
    pub output_path: PathBuf,
    pub key: String,
    /// Primary column dropped after the join.
    pub replace_column: String,
    /// Supplementary column renamed into `replace_column`'s place.
    pub override_column: String,
    pub on_duplicate_key: DuplicateKeyPolicy,
    pub delimiter: u8,
}

impl MergeConfig {
    pub fn new(
        primary_input_path: impl Into<PathBuf>,
        supplementary_input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            primary_input_path: primary_input_path.into(),
            supplementary_input_path: supplementary_input_path.into(),
            output_path: output_path.into(),
            key: DEFAULT_KEY.to_string(),
            replace_column: DEFAULT_REPLACE.to_string(),
            override_column: DEFAULT_OVERRIDE.to_string(),
            on_duplicate_key: DuplicateKeyPolicy::default(),
            delimiter: b',',
        }
    }

    pub fn with_duplicate_key_policy(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.on_duplicate_key = policy;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}
