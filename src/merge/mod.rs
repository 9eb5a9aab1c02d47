pub mod join;
pub mod key;

pub use join::{left_join, JoinStats, Joined};
pub use key::JoinKey;
