//! Command-line interface for `platine-dump`

pub mod commands;
pub mod error;

pub use error::CliError;
