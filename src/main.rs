mod canvas;
mod config;
mod routes;
mod services;
mod state;
mod walker;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::process::ExitCode;

use services::ingress;
use services::persistence::{PersistError, SnapshotStore};
use services::scheduler::{self, SchedulerError};

/// Conditions that end the process.
#[derive(Debug, thiserror::Error)]
enum FatalError {
    #[error("snapshot load failed: {0}")]
    Load(#[from] PersistError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("scheduler task aborted: {0}")]
    SchedulerAborted(#[source] tokio::task::JoinError),
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run(config::Config::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: config::Config) -> Result<(), FatalError> {
    tracing::info!(
        port = config.port,
        refresh_secs = config.refresh.as_secs(),
        auto_randomize_ticks = config.auto_randomize_ticks,
        click_queue_capacity = config.click_queue_capacity,
        "configuration loaded"
    );

    let store = SnapshotStore::new(&config.data_path, &config.pic_path);
    tracing::info!(
        data_path = %store.data_path().display(),
        pic_path = %store.pic_path().display(),
        "loading snapshot"
    );
    let canvas = canvas::shared(store.load().await?);

    let (clicks_tx, clicks_rx) = ingress::channel(config.click_queue_capacity);
    let scheduler = scheduler::spawn_scheduler(canvas.clone(), clicks_rx, store, config.schedule());

    let app = routes::app(state::AppState::new(canvas, clicks_tx), &config);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| FatalError::Bind { port, source })?;

    tracing::info!(%port, "pixelwalk listening");
    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>());

    tokio::select! {
        served = server.into_future() => served.map_err(FatalError::Serve),
        joined = scheduler => match joined {
            Ok(Ok(never)) => match never {},
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(FatalError::SchedulerAborted(e)),
        },
    }
}
