use crate::llm::Provider;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Kaizen-style diagnosis for farm operations problems
#[derive(Parser, Debug)]
#[command(
    name = "ag-kaizen",
    about = "Kaizen-style diagnosis for farm operations problems",
    version,
    author,
    long_about = "ag-kaizen turns a free-text description of a farm operations problem into a \
                  structured Kaizen diagnosis: value-stream flow, lean wastes, root causes, \
                  recommendations, a quick experiment, KPIs and a check-in interval. It asks an \
                  LLM when one is configured and falls back to keyword rules otherwise."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the HTTP service",
        long_about = "Serves GET / (status) and POST /chat (diagnosis).\n\n\
                      Examples:\n  \
                      ag-kaizen serve\n  \
                      ag-kaizen serve --bind 0.0.0.0:8000\n  \
                      ag-kaizen serve --no-llm --taxonomy configs/taxonomy.yaml"
    )]
    Serve(ServeArgs),

    #[command(
        about = "Diagnose one problem description",
        long_about = "Runs the same pipeline as POST /chat once and prints the result.\n\n\
                      Examples:\n  \
                      ag-kaizen analyze \"Lettuce browns before delivery\"\n  \
                      ag-kaizen analyze --format json --no-llm \"Cows wait at the gate\""
    )]
    Analyze(AnalyzeArgs),
}

/// Options shared by every command that builds a diagnosis service
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    #[arg(
        short = 't',
        long,
        value_name = "PATH",
        help = "Taxonomy YAML file (default: KAIZEN_TAXONOMY_PATH or configs/taxonomy.yaml)"
    )]
    pub taxonomy: Option<PathBuf>,

    #[arg(long, help = "Disable the LLM and use keyword rules only")]
    pub no_llm: bool,

    #[arg(
        short = 'p',
        long,
        value_enum,
        help = "LLM provider (default: KAIZEN_PROVIDER or openai)"
    )]
    pub provider: Option<Provider>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model name (provider-specific)")]
    pub model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "LLM request timeout in seconds")]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[arg(
        short = 'b',
        long,
        value_name = "ADDR",
        help = "Listen address (default: KAIZEN_BIND_ADDR or 127.0.0.1:8000)"
    )]
    pub bind: Option<String>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "TEXT", help = "Problem description")]
    pub text: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
