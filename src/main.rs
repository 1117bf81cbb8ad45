use std::{process, sync::Arc, time::Duration};

use rostrum::{
    application::{error::AppError, repos::ContentRepo, site::SiteService},
    cache::CacheConfig,
    config,
    infra::{
        backend::BackendClient,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Dispatch, Level, debug, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let backend = BackendClient::new(&settings.backend.url, settings.backend.timeout)?;
    let assets_base = backend.base_url().to_string();
    let repo: Arc<dyn ContentRepo> = Arc::new(backend);

    let cache_config = CacheConfig::from(&settings.cache);
    let site = Arc::new(SiteService::new(repo, &cache_config));

    let (stop_tx, stop_rx) = watch::channel(false);
    let sweeper = spawn_article_sweeper(site.clone(), cache_config.sweep_interval(), stop_rx);

    let router = http::build_router(HttpState::new(site, assets_base));
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        addr = %settings.server.addr,
        backend = %settings.backend.url,
        ttl_secs = cache_config.ttl_seconds,
        "starting server"
    );

    let served = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")));

    let _ = stop_tx.send(true);
    if let Err(err) = sweeper.await {
        warn!(error = %err, "article sweeper task ended abnormally");
    }

    info!("server stopped");
    served
}

fn spawn_article_sweeper(
    site: Arc<SiteService>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = site.sweep_articles();
                    if removed > 0 {
                        debug!(removed, "swept idle article memoizers");
                    }
                }
                _ = stop.changed() => break,
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received; draining in-flight requests");
}
