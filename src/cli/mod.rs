pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, ServeArgs, ServiceArgs};
pub use output::{OutputFormat, OutputFormatter};
