use config::{FileFormat, Map};

use super::*;

fn raw_from_toml(contents: &str) -> RawSettings {
    build_raw(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
        .expect("toml should deserialize")
}

#[test]
fn defaults_match_legacy_behaviour() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 8080);
    assert_eq!(settings.backend.url, "https://admin.osterbergschmalzle.com");
    assert_eq!(settings.backend.timeout, Duration::from_secs(10));
    assert_eq!(settings.cache.ttl, Duration::from_secs(600));
    assert_eq!(settings.cache.article_capacity.get(), 1024);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn file_values_are_read() {
    let raw = raw_from_toml(
        r#"
        [server]
        port = 9000

        [backend]
        url = "https://cms.example.com/"
        timeout_seconds = 3

        [cache]
        ttl_seconds = 30
        article_capacity = 16
        "#,
    );
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 9000);
    assert_eq!(settings.backend.url, "https://cms.example.com");
    assert_eq!(settings.backend.timeout, Duration::from_secs(3));
    assert_eq!(settings.cache.ttl, Duration::from_secs(30));
    assert_eq!(settings.cache.article_capacity.get(), 16);
}

#[test]
fn environment_overrides_file() {
    let mut env = Map::new();
    env.insert(
        "ROSTRUM__BACKEND__URL".to_string(),
        "https://env.example.com".to_string(),
    );

    let builder = Config::builder()
        .add_source(File::from_str(
            "[backend]\nurl = \"https://file.example.com\"\n",
            FileFormat::Toml,
        ))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(env)),
        );
    let settings = Settings::from_raw(build_raw(builder).expect("valid sources"))
        .expect("valid settings");

    assert_eq!(settings.backend.url, "https://env.example.com");
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw_from_toml("[server]\nport = 4000\n[logging]\nlevel = \"info\"\n");

    let overrides = ServeOverrides {
        port: Some(4321),
        log_level: Some("debug".to_string()),
        backend_url: Some("http://localhost:8055".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.backend.url, "http://localhost:8055");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_ttl_is_allowed() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(0);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.cache.ttl, Duration::ZERO);
}

#[test]
fn rejects_zero_port() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    let err = Settings::from_raw(raw).expect_err("port 0 rejected");
    assert!(matches!(err, LoadError::Invalid { key: "server.port", .. }));
}

#[test]
fn rejects_non_http_backend() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("ftp://cms.example.com".to_string());
    let err = Settings::from_raw(raw).expect_err("ftp rejected");
    assert!(matches!(err, LoadError::Invalid { key: "backend.url", .. }));
}

#[test]
fn rejects_zero_article_capacity() {
    let mut raw = RawSettings::default();
    raw.cache.article_capacity = Some(0);
    let err = Settings::from_raw(raw).expect_err("capacity 0 rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.article_capacity",
            ..
        }
    ));
}

#[test]
fn rejects_invalid_log_level() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level rejected");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn parses_cli_flags() {
    let args = CliArgs::parse_from([
        "rostrum",
        "--config-file",
        "site.toml",
        "--cache-ttl-seconds",
        "60",
        "--log-json",
        "true",
    ]);

    assert_eq!(
        args.config_file.as_deref(),
        Some(std::path::Path::new("site.toml"))
    );
    assert_eq!(args.overrides.cache_ttl_seconds, Some(60));
    assert_eq!(args.overrides.log_json, Some(true));
}

#[test]
fn rejects_article_idle_below_ttl() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(600);
    raw.cache.article_idle_seconds = Some(60);
    let err = Settings::from_raw(raw).expect_err("idle below ttl rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.article_idle_seconds",
            ..
        }
    ));
}

#[test]
fn zero_article_idle_is_allowed_with_any_ttl() {
    let mut raw = RawSettings::default();
    raw.cache.article_idle_seconds = Some(0);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.cache.article_idle, Duration::ZERO);
}
