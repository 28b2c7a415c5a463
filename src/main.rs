use ag_kaizen::cli::commands::{CliArgs, Commands};
use ag_kaizen::cli::handlers::{handle_analyze, handle_serve};
use ag_kaizen::util::logging::{init_logging, json_from_env, parse_level, LoggingConfig};
use ag_kaizen::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("ag-kaizen v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Serve(serve_args) => handle_serve(serve_args).await,
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("KAIZEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    init_logging(LoggingConfig {
        use_json: json_from_env(),
        ..LoggingConfig::with_level(level)
    });
}
