//! Command handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 when the
//! service cannot start (configuration or taxonomy), 2 for empty input.

use crate::cli::commands::{AnalyzeArgs, ServeArgs, ServiceArgs};
use crate::cli::output::OutputFormatter;
use crate::config::{ConfigError, KaizenConfig};
use crate::server::{self, AppState};
use crate::service::{KaizenService, ServiceError};
use crate::taxonomy::Taxonomy;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_EMPTY_INPUT: i32 = 2;

/// Loads configuration from the environment and applies command-line overrides
pub fn resolve_config(args: &ServiceArgs) -> Result<KaizenConfig, ConfigError> {
    let mut config = KaizenConfig::from_env()?;

    if let Some(ref path) = args.taxonomy {
        config.taxonomy_path = path.clone();
    }
    if args.no_llm {
        config.llm_enabled = false;
    }
    if let Some(provider) = args.provider {
        config = config.with_provider(provider);
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

/// Loads the taxonomy and wires the LLM client (if any) into a service
pub fn build_service(config: &KaizenConfig) -> Result<(Arc<Taxonomy>, KaizenService)> {
    let taxonomy = Arc::new(Taxonomy::load(&config.taxonomy_path).with_context(|| {
        format!(
            "Failed to load taxonomy from {}",
            config.taxonomy_path.display()
        )
    })?);

    let client = config.create_llm_client()?;
    let service = KaizenService::new(taxonomy.clone(), client);
    Ok((taxonomy, service))
}

pub async fn handle_serve(args: &ServeArgs) -> i32 {
    match run_serve(args).await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_FATAL
        }
    }
}

async fn run_serve(args: &ServeArgs) -> Result<()> {
    let mut config = resolve_config(&args.service)?;
    if let Some(ref bind) = args.bind {
        config.bind_addr = bind.clone();
        config.validate()?;
    }
    debug!("{}", config);

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_addr))?;

    let (taxonomy, service) = build_service(&config)?;
    server::run(
        addr,
        AppState::new(taxonomy, service),
        config.request_timeout(),
    )
    .await
}

pub async fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    let formatter = OutputFormatter::new(args.format.into());

    let service = match resolve_config(&args.service)
        .map_err(anyhow::Error::from)
        .and_then(|config| build_service(&config))
    {
        Ok((_, service)) => service,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            return EXIT_FATAL;
        }
    };

    match service.diagnose(&args.text).await {
        Ok(diagnosis) => match formatter.format(&diagnosis) {
            Ok(output) => {
                println!("{}", output);
                EXIT_OK
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_FATAL
            }
        },
        Err(e @ ServiceError::EmptyInput) => {
            match formatter.format_error(&e.to_string()) {
                Ok(output) => println!("{}", output),
                Err(fmt_err) => eprintln!("Error: {:#}", fmt_err),
            }
            EXIT_EMPTY_INPUT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormatArg;
    use crate::llm::Provider;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn taxonomy_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "flows: [field_ops, post_harvest]\nwastes: [waiting, motion]\nsynonyms:\n  post_harvest: [lettuce]\n"
        )
        .unwrap();
        file
    }

    fn service_args(taxonomy: &NamedTempFile) -> ServiceArgs {
        ServiceArgs {
            taxonomy: Some(taxonomy.path().to_path_buf()),
            no_llm: true,
            ..Default::default()
        }
    }

    #[test]
    #[serial]
    fn test_resolve_config_overrides() {
        let file = taxonomy_file();
        let mut args = service_args(&file);
        args.model = Some("tiny".to_string());
        args.timeout = Some(5);

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.taxonomy_path, file.path());
        assert!(!config.llm_enabled);
        assert_eq!(config.model, "tiny");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn test_resolve_config_provider_picks_its_default_model() {
        let saved: Vec<_> = ["KAIZEN_MODEL", "KAIZEN_PROVIDER"]
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect();
        for (key, _) in &saved {
            std::env::remove_var(key);
        }

        let file = taxonomy_file();
        let mut args = service_args(&file);
        args.provider = Some(Provider::Ollama);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.model, "llama3.1:8b");

        args.model = Some("qwen2.5:7b".to_string());
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.model, "qwen2.5:7b");

        for (key, value) in saved {
            if let Some(value) = value {
                std::env::set_var(key, value);
            }
        }
    }

    #[test]
    #[serial]
    fn test_resolve_config_rejects_zero_timeout() {
        let file = taxonomy_file();
        let mut args = service_args(&file);
        args.timeout = Some(0);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    #[serial]
    fn test_build_service_rules_only() {
        let file = taxonomy_file();
        let config = resolve_config(&service_args(&file)).unwrap();
        let (taxonomy, service) = build_service(&config).unwrap();

        assert!(taxonomy.is_flow("post_harvest"));
        assert!(!service.assist_enabled());
    }

    #[test]
    #[serial]
    fn test_build_service_missing_taxonomy() {
        let args = ServiceArgs {
            taxonomy: Some("/nonexistent/taxonomy.yaml".into()),
            no_llm: true,
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        let err = build_service(&config).unwrap_err();
        assert!(err.to_string().contains("Failed to load taxonomy"));
    }

    #[tokio::test]
    #[serial]
    async fn test_analyze_exit_codes() {
        let file = taxonomy_file();
        let analyze = |text: &str| AnalyzeArgs {
            text: text.to_string(),
            format: OutputFormatArg::Json,
            service: service_args(&file),
        };

        assert_eq!(handle_analyze(&analyze("Lettuce browns")).await, EXIT_OK);
        assert_eq!(handle_analyze(&analyze("   ")).await, EXIT_EMPTY_INPUT);
    }

    #[tokio::test]
    #[serial]
    async fn test_analyze_bad_taxonomy_is_fatal() {
        let args = AnalyzeArgs {
            text: "cows".to_string(),
            format: OutputFormatArg::Human,
            service: ServiceArgs {
                taxonomy: Some("/nonexistent/taxonomy.yaml".into()),
                no_llm: true,
                ..Default::default()
            },
        };
        assert_eq!(handle_analyze(&args).await, EXIT_FATAL);
    }
}
