pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod table;

pub use config::{DuplicateKeyPolicy, MergeConfig};
pub use error::{MergeError, Step};
pub use pipeline::{run, MergeReport};
