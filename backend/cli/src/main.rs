mod session;
mod terminal_output;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::info;

use platelog_config::{
    apply_all_defaults, config_dir, config_file_path, load_and_prepare, log_report, redacted_view,
    write_config, PlateLogConfig, ValidationReport,
};
use platelog_core::PlateError;
use platelog_gateway::{start_server, GatewayState};
use platelog_logging::init_logger;
use platelog_understanding::provider_from_config;

use session::{run_interactive, DetectionSession};
use terminal_output::{note_error, note_info, note_success, note_warn};

#[derive(Parser)]
#[command(name = "platelog")]
#[command(about = "PlateLog: read license plates with a hosted vision model and log them")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.platelog/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Detect plates in image files within one session
    Detect {
        /// Image files, processed in order
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Write the session log as XLSX to this path
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Interactive session reading commands from stdin
    Session,
    /// Print the effective configuration with secrets masked
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let (config, report) = load_and_prepare(&config_path).await?;

    init_logger(
        config.log_level(),
        config.log_dir().as_deref(),
        matches!(cli.command, Commands::Serve { .. }),
    );
    log_report(&report);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }

    match cli.command {
        Commands::Serve { port, bind } => {
            ensure_valid(&report)?;
            run_server(&config, port, bind).await?;
        }
        Commands::Detect { images, export } => {
            ensure_valid(&report)?;
            run_detect(&config, &images, export.as_deref()).await?;
        }
        Commands::Session => {
            ensure_valid(&report)?;
            let provider = provider_from_config(&config)?;
            let mut session = DetectionSession::new(provider);
            let stdin = BufReader::new(tokio::io::stdin());
            run_interactive(&mut session, stdin).await?;
            session.end();
        }
        Commands::Config { init } => {
            if init {
                init_config(&config_path).await?;
            }
            let view = redacted_view(&config)?;
            println!("# {}", config_path.display());
            print!("{}", serde_yaml::to_string(&view)?);
        }
    }

    Ok(())
}

/// Refuse to run when the config has validation errors.
fn ensure_valid(report: &ValidationReport) -> Result<()> {
    if report.is_valid() {
        return Ok(());
    }
    for error in &report.errors {
        note_error(&error.to_string());
    }
    Err(PlateError::Config(format!("{} config error(s)", report.errors.len())).into())
}

async fn run_server(config: &PlateLogConfig, port: Option<u16>, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.bind().to_string());
    let port = port.unwrap_or(config.port());
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;

    info!(
        %addr,
        provider = config.provider().as_str(),
        model = config.model(),
        max_upload_bytes = config.max_upload_bytes(),
        "Starting PlateLog gateway"
    );

    let provider = provider_from_config(config)?;
    let state = GatewayState::new(provider, config.max_upload_bytes());
    start_server(addr, state, config.session_idle_timeout()).await
}

async fn run_detect(config: &PlateLogConfig, images: &[PathBuf], export: Option<&Path>) -> Result<()> {
    let provider = provider_from_config(config)?;
    let mut session = DetectionSession::new(provider);

    for image in images {
        session.detect_and_report(image).await;
    }

    if let Some(path) = export {
        session.export_and_report(path).await;
    }
    session.end();
    Ok(())
}

async fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        note_info(&format!("Config already exists at {}", path.display()));
        return Ok(());
    }
    let mut config = apply_all_defaults(PlateLogConfig::default());
    if let Some(vision) = config.vision.as_mut() {
        vision.api_key = Some("${GOOGLE_API_KEY}".to_string());
    }
    write_config(&config, path).await?;
    note_success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_detect_requires_images() {
        assert!(Cli::try_parse_from(["platelog", "detect"]).is_err());
        let cli = Cli::try_parse_from(["platelog", "detect", "a.jpg", "b.png", "-e", "out.xlsx"])
            .unwrap();
        match cli.command {
            Commands::Detect { images, export } => {
                assert_eq!(images.len(), 2);
                assert_eq!(export, Some(PathBuf::from("out.xlsx")));
            }
            _ => panic!("expected detect"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["platelog", "serve", "--config", "/tmp/p.yaml", "-p", "9000"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.yaml")));
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), .. }));
    }

    #[tokio::test]
    async fn test_init_config_writes_env_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        init_config(&path).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("${GOOGLE_API_KEY}"));
        assert!(written.contains("gemini-2.0-flash"));
    }

    #[test]
    fn test_ensure_valid_rejects_missing_key() {
        let report = platelog_config::validate(&PlateLogConfig::default());
        assert!(ensure_valid(&report).is_err());
    }

    #[test]
    fn test_ensure_valid_allows_warnings() {
        let config = PlateLogConfig {
            vision: Some(platelog_config::VisionConfig {
                provider: Some(platelog_config::ProviderKind::Mock),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = platelog_config::validate(&config);
        assert!(!report.warnings.is_empty());
        assert!(ensure_valid(&report).is_ok());
    }
}
