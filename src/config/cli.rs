use std::path::PathBuf;

use clap::{Args, Parser, builder::BoolishValueParser};

/// Command-line arguments for the Rostrum binary.
#[derive(Debug, Parser)]
#[command(name = "rostrum", version, about = "Rostrum campaign site server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "ROSTRUM_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "port", env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the Directus base URL.
    #[arg(long = "backend-url", env = "DIRECTUS_URL", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Override the per-request backend timeout.
    #[arg(long = "backend-timeout-seconds", value_name = "SECONDS")]
    pub backend_timeout_seconds: Option<u64>,

    /// Override the content freshness window.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the maximum number of cached article slugs.
    #[arg(long = "cache-article-capacity", value_name = "COUNT")]
    pub cache_article_capacity: Option<usize>,

    /// Override the idle time after which an article slug is forgotten (0 disables).
    #[arg(long = "cache-article-idle-seconds", value_name = "SECONDS")]
    pub cache_article_idle_seconds: Option<u64>,

    /// Override the interval between idle sweeps.
    #[arg(long = "cache-sweep-interval-seconds", value_name = "SECONDS")]
    pub cache_sweep_interval_seconds: Option<u64>,
}
