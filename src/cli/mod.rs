//! Command-line interface for the relay.
//!
//! Reads decoded JMX samples from a file or stdin, normalizes them and
//! forwards the batch to the configured sink.

use crate::core::config::ConfigBuilder;
use crate::core::{Config, Result, RelayError, SinkKind};
use crate::metrics::{create_sink, MetricAdapter, RawSample, Whitelist};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Normalize JMX samples and forward them to a timeline collector
#[derive(Parser, Debug)]
#[command(name = "jmx-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/jmx-relay/config.yaml)
    #[arg(short, long, env = "JMX_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Samples to forward: JSON array or JSON lines, `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub samples: PathBuf,

    /// Timeline collector URL
    #[arg(long, env = "JMX_RELAY_COLLECTOR")]
    pub collector: Option<String>,

    /// Host id reported with every metric
    #[arg(long, env = "JMX_RELAY_HOST_ID")]
    pub host_id: Option<String>,

    /// App id reported with every metric
    #[arg(long, env = "JMX_RELAY_APP_ID")]
    pub app_id: Option<String>,

    /// Print the timeline payload instead of posting it
    #[arg(long)]
    pub dry_run: bool,

    /// Send three synthetic metrics to check the sink
    #[arg(long)]
    pub probe: bool,

    /// Enable debug logging
    #[arg(short, long, env = "JMX_RELAY_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Config file to read: `--config`, else the default location if it exists.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir()
                .map(|d| d.join("jmx-relay").join("config.yaml"))
                .filter(|path| path.exists()),
        }
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    ///
    /// Runs before logging is initialized, so it reports through its result
    /// rather than through `tracing`.
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        if let Some(config_path) = self.config_path() {
            let content = tokio::fs::read_to_string(&config_path).await.map_err(|e| {
                RelayError::config(format!("Failed to read config file {:?}: {}", config_path, e))
            })?;
            builder = builder.from_yaml(&content)?;
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(url) = &self.collector {
            builder = builder.collector_url(url.clone());
        }
        if let Some(host_id) = &self.host_id {
            builder = builder.host_id(host_id.clone());
        }
        if let Some(app_id) = &self.app_id {
            builder = builder.app_id(app_id.clone());
        }
        if self.dry_run {
            builder = builder.sink_kind(SinkKind::Stdout);
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let env_log_level = std::env::var("JMX_RELAY_LOG_LEVEL")
            .unwrap_or_else(|_| config.logging.level.as_str().to_string());
        let log_level = if self.debug {
            "debug"
        } else {
            env_log_level.as_str()
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        // Logs go to stderr so the stdout sink stays machine readable
        let fmt_layer = if config.logging.structured {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| RelayError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Parse samples from a JSON array or JSON lines.
pub fn parse_samples(content: &str) -> Result<Vec<RawSample>> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| RelayError::parse(format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}

async fn read_samples(path: &Path) -> Result<Vec<RawSample>> {
    let content = if path == Path::new("-") {
        use tokio::io::AsyncReadExt;

        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(path).await.map_err(|e| {
            RelayError::config(format!("Failed to read samples file {:?}: {}", path, e))
        })?
    };

    parse_samples(&content)
}

/// Build the adapter described by `config`.
pub fn build_adapter(config: &Config) -> Result<MetricAdapter> {
    let sink = create_sink(&config.sink)?;
    let adapter = MetricAdapter::from_config(config, sink);

    match (&config.filter.whitelist_file, config.filter.enabled) {
        (Some(path), true) => Ok(adapter.with_filter(Arc::new(Whitelist::load(path)?))),
        _ => Ok(adapter),
    }
}

/// Execute the relay.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;

    cli.init_logging(&config)?;

    match cli.config_path() {
        Some(path) => tracing::info!("Loaded configuration from: {:?}", path),
        None => tracing::debug!("No config file found, using defaults"),
    }

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Key priority: {}", config.naming.key_priority.join(", "));
        println!("  Host id: {}", config.context.host_id);
        println!("  App id: {}", config.context.app_id);
        println!("  Sink: {:?} ({})", config.sink.kind, config.sink.collector_url);
        println!("  Whitelist: {}", if config.filter.enabled { "enabled" } else { "disabled" });
        return Ok(());
    }

    let adapter = build_adapter(&config)?;

    let accepted = if cli.probe {
        adapter.probe().await?
    } else {
        let samples = read_samples(&cli.samples).await?;
        tracing::info!("Read {} samples", samples.len());
        adapter.handle(&samples).await?
    };

    if accepted {
        Ok(())
    } else {
        Err(RelayError::sink("sink did not accept the batch"))
    }
}
