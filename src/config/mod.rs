//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, num::NonZeroUsize, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{CliArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "rostrum";
const ENV_PREFIX: &str = "ROSTRUM";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "https://admin.osterbergschmalzle.com";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub(crate) const DEFAULT_ARTICLE_CAPACITY: usize = 1024;
pub(crate) const DEFAULT_ARTICLE_IDLE_SECS: u64 = 3600;
pub(crate) const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub backend: BackendSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Directus base URL without a trailing slash.
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub article_capacity: NonZeroUsize,
    /// `Duration::ZERO` disables idle eviction.
    pub article_idle: Duration,
    pub sweep_interval: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw = build_raw(builder)?;
    raw.apply_serve_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

fn build_raw(builder: ConfigBuilder<DefaultState>) -> Result<RawSettings, LoadError> {
    Ok(builder.build()?.try_deserialize()?)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    backend: RawBackendSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.backend_url.as_ref() {
            self.backend.url = Some(url.clone());
        }
        if let Some(seconds) = overrides.backend_timeout_seconds {
            self.backend.timeout_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(seconds);
        }
        if let Some(capacity) = overrides.cache_article_capacity {
            self.cache.article_capacity = Some(capacity);
        }
        if let Some(seconds) = overrides.cache_article_idle_seconds {
            self.cache.article_idle_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.cache_sweep_interval_seconds {
            self.cache.sweep_interval_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            backend,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            backend: build_backend_settings(backend)?,
            cache: build_cache_settings(cache)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_backend_settings(backend: RawBackendSettings) -> Result<BackendSettings, LoadError> {
    let url = backend
        .url
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    let parsed = Url::parse(&url)
        .map_err(|err| LoadError::invalid("backend.url", format!("invalid url `{url}`: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "backend.url",
            format!("unsupported scheme `{}`", parsed.scheme()),
        ));
    }

    let timeout_seconds = backend
        .timeout_seconds
        .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "backend.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(BackendSettings {
        url,
        timeout: Duration::from_secs(timeout_seconds),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let ttl = Duration::from_secs(cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS));

    let article_capacity =
        NonZeroUsize::new(cache.article_capacity.unwrap_or(DEFAULT_ARTICLE_CAPACITY))
            .ok_or_else(|| {
                LoadError::invalid("cache.article_capacity", "must be greater than zero")
            })?;

    let article_idle = Duration::from_secs(
        cache
            .article_idle_seconds
            .unwrap_or(DEFAULT_ARTICLE_IDLE_SECS),
    );
    // Zero disables idle eviction; otherwise an entry must outlive its TTL window.
    if !article_idle.is_zero() && article_idle < ttl {
        return Err(LoadError::invalid(
            "cache.article_idle_seconds",
            "must be zero or at least cache.ttl_seconds",
        ));
    }

    let sweep_seconds = cache
        .sweep_interval_seconds
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
    if sweep_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.sweep_interval_seconds",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        ttl,
        article_capacity,
        article_idle,
        sweep_interval: Duration::from_secs(sweep_seconds),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    ttl_seconds: Option<u64>,
    article_capacity: Option<usize>,
    article_idle_seconds: Option<u64>,
    sweep_interval_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

#[cfg(test)]
mod tests;
