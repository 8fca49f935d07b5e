//! Topic classification backfill
//!
//! Resolves where the database lives, assigns `type = "topic"` to every
//! topic that has no classification, and reports what changed.

pub mod config;
pub mod report;
pub mod runner;

pub use config::{ConfigSources, Settings, UrlSource, DEFAULT_DATABASE_NAME};
pub use report::{write_config_help, Report, TypeStats};
pub use runner::{execute, BackfillOutcome, BackfillRunner, BACKFILL_TYPE, SAMPLE_LIMIT};
