//! Command-line subcommands other than the long-running service.

pub mod dry_run;

pub use dry_run::{DryRunArgs, DryRunError};
