use std::{future::IntoFuture, process, sync::Arc};

use postline::{
    application::error::AppError,
    cache::{CacheConfig, ListingCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        memory::MemoryRepositories,
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
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
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    info!(target = "postline::migrate", "migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let cache = settings.cache.enabled.then(|| {
        let config = CacheConfig::from(&settings.cache);
        info!(
            target = "postline::startup",
            ttl_secs = config.ttl.as_secs(),
            capacity = config.capacity,
            "listing cache enabled"
        );
        Arc::new(ListingCache::new(&config))
    });
    let page_size = settings.feed.page_size.get();

    let state = match settings.database.url.as_deref() {
        Some(url) => {
            let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
                .await
                .map_err(|err| InfraError::database(err.to_string()))?;
            PostgresRepositories::run_migrations(&pool)
                .await
                .map_err(|err| InfraError::database(err.to_string()))?;
            ApiState::from_repositories(Arc::new(PostgresRepositories::new(pool)), cache, page_size)
        }
        None => {
            warn!(
                target = "postline::startup",
                "database url is not configured; serving from in-memory storage"
            );
            ApiState::from_repositories(Arc::new(MemoryRepositories::new()), cache, page_size)
        }
    };

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "postline::startup",
        addr = %settings.server.addr,
        "http server listening"
    );

    let (notify_tx, notify_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = notify_tx.send(());
        })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        _ = notify_rx => {
            info!(target = "postline::shutdown", "shutdown signal received, draining connections");
        }
    }

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(result) => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
            info!(target = "postline::shutdown", "server stopped");
        }
        Err(_) => warn!(
            target = "postline::shutdown",
            grace_secs = settings.server.graceful_shutdown.as_secs(),
            "graceful shutdown timed out; dropping open connections"
        ),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
