// # kuma-sync - Monitor Sync CLI
//
// Thin integration layer only: reads configuration, wires the sources
// and the REST adapter into the engine, runs one reconciliation pass,
// and prints the run summary. All sync logic lives in kuma-core.
//
// ## Configuration
//
// Environment variables (optionally loaded from an env file first):
//
// - `UPTIME_KUMA_URL`: Base URL of the monitor service
// - `UPTIME_KUMA_USERNAME` / `UPTIME_KUMA_PASSWORD`: Login credentials
// - `TRAEFIK_{N}_URL` / `TRAEFIK_{N}_GROUP`: Traefik sources, N = 1..
// - `DOCKER_{N}_URL` / `DOCKER_{N}_GROUP`: Docker sources, N = 1..
// - `IGNORE_PATTERNS`: Comma-separated wildcard patterns
// - `RESET_TAGS`: true/1/yes to strip stray tags
// - `KUMA_SYNC_LOG_LEVEL`: trace|debug|info|warn|error (default info)
//
// Command-line flags override the service URL and credentials.
//
// ## Example
//
// ```bash
// export UPTIME_KUMA_URL=https://uptime.example.com
// export UPTIME_KUMA_USERNAME=admin
// export UPTIME_KUMA_PASSWORD=secret
// export TRAEFIK_1_URL=http://traefik:8080
// export TRAEFIK_1_GROUP=edge
// export DOCKER_1_URL=tcp://docker.internal:2375
// export DOCKER_1_GROUP=lab
//
// kuma-sync
// ```

use anyhow::Result;
use clap::Parser;
use kuma_core::traits::DesiredSource;
use kuma_core::{KumaConfig, Session, SourceConfig, SyncConfig, SyncEngine};
use kuma_service_rest::RestMonitorService;
use kuma_source_docker::DockerSource;
use kuma_source_traefik::TraefikSource;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (individual item failures are reported, not fatal)
/// - 1: Configuration error
/// - 2: Fatal startup error (cannot connect/authenticate) or runtime error
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Sync Traefik hosts and Docker containers into Uptime Kuma monitors
#[derive(Debug, Parser)]
#[command(name = "kuma-sync", version, about)]
struct Cli {
    /// Path to the env file to load before reading the environment
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Monitor service URL (overrides UPTIME_KUMA_URL)
    #[arg(long)]
    url: Option<String>,

    /// Monitor service username (overrides UPTIME_KUMA_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Monitor service password (overrides UPTIME_KUMA_PASSWORD)
    #[arg(long)]
    password: Option<String>,
}

/// Assemble the configuration from the environment plus CLI overrides
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    if cli.env_file.exists() {
        dotenvy::from_path(&cli.env_file)?;
    }

    let pick = |flag: &Option<String>, var: &str| {
        flag.clone()
            .or_else(|| env::var(var).ok())
            .unwrap_or_default()
    };

    let kuma = KumaConfig {
        url: pick(&cli.url, "UPTIME_KUMA_URL"),
        username: pick(&cli.username, "UPTIME_KUMA_USERNAME"),
        password: pick(&cli.password, "UPTIME_KUMA_PASSWORD"),
    };

    let ignore_patterns = env::var("IGNORE_PATTERNS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let reset_tags = matches!(
        env::var("RESET_TAGS").unwrap_or_default().to_lowercase().as_str(),
        "true" | "1" | "yes"
    );

    Ok(SyncConfig {
        kuma,
        traefik: indexed_sources("TRAEFIK", "Traefik"),
        docker: indexed_sources("DOCKER", "Docker"),
        ignore_patterns,
        reset_tags,
        write_delay_ms: kuma_core::config::DEFAULT_WRITE_DELAY_MS,
    })
}

/// Collect `{PREFIX}_{N}_URL` / `{PREFIX}_{N}_GROUP` pairs for N = 1..
///
/// The group defaults to "{Label} {N}" when unset, matching the
/// numbering the operator sees in their env file.
fn indexed_sources(prefix: &str, label: &str) -> Vec<SourceConfig> {
    let mut sources = Vec::new();
    for n in 1.. {
        let Ok(url) = env::var(format!("{prefix}_{n}_URL")) else {
            break;
        };
        let group =
            env::var(format!("{prefix}_{n}_GROUP")).unwrap_or_else(|_| format!("{label} {n}"));
        sources.push(SourceConfig { url, group });
    }
    sources
}

fn init_tracing() -> Result<()> {
    let level = match env::var("KUMA_SYNC_LOG_LEVEL")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return SyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return SyncExitCode::ConfigError.into();
    }

    if let Err(e) = init_tracing() {
        eprintln!("Failed to set tracing subscriber: {e}");
        return SyncExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_sync(&config).await {
            Ok(()) => SyncExitCode::Success,
            Err(e) => {
                error!("Sync failed: {}", e);
                SyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run one reconciliation pass
async fn run_sync(config: &SyncConfig) -> Result<()> {
    info!("Connecting to monitor service at {}", config.kuma.url);
    info!(
        "Configured sources: {} Traefik, {} Docker",
        config.traefik.len(),
        config.docker.len()
    );

    let mut sources: Vec<Box<dyn DesiredSource>> = Vec::new();
    for source in &config.traefik {
        sources.push(Box::new(TraefikSource::new(&source.url, &source.group)));
    }
    for source in &config.docker {
        sources.push(Box::new(DockerSource::new(&source.url, &source.group)));
    }

    let service = RestMonitorService::new(&config.kuma.url)?;

    // A failed initial login aborts before any reconciliation work.
    let session = Session::connect(service, &config.kuma.username, &config.kuma.password).await?;

    let engine = SyncEngine::new(session, sources, config)?;
    let report = engine.run().await?;

    info!("Run summary: {}", report);
    Ok(())
}
