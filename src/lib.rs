//! powermetrics-rs
//!
//! Collects samples from the macOS `powermetrics` tool and decodes its
//! plist output into typed records.
//!
//! powermetrics writes one XML plist document per sample, concatenated on
//! stdout. The [`parser`] module splits that stream and decodes every
//! document; [`collector`] runs the tool; [`output`] writes JSON reports.
//!
//! ```ignore
//! use powermetrics_rs::collector::{Config, Powermetrics};
//!
//! let config = Config { sample_count: 5, ..Default::default() }.gpu();
//! let collection = Powermetrics::new().collect(&config)?;
//! for sample in collection.samples().into_iter().flatten() {
//!     println!("{}", sample.timestamp());
//! }
//! ```

pub mod collector;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
