//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod collect;
pub mod decode;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use collect::{execute_collect, execute_collect_with, validate_args};
pub use decode::execute_decode;
pub use models::{CollectArgs, DecodeArgs};
pub use utils::{display_samplers, display_version, format_ratio, print_summary};
