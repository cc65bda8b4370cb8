pub mod utils;

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::http_server::{self, session};
use crate::service_state::{session_key, StateSetupError};
use crate::{ServiceConfig, ServiceState};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
const SESSION_PURGE_PERIOD: Duration = Duration::from_secs(60);
const LOG_FILE_PREFIX: &str = "quire.log";

/// Running service tasks and the channel that stops them.
pub struct ShutdownHandle {
    graceful_waiter: JoinHandle<()>,
    tasks: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<()>,
}

impl ShutdownHandle {
    /// Block until the service shuts down (via signal or explicit shutdown).
    pub async fn wait(self) {
        let _ = self.graceful_waiter.await;

        if timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(self.tasks))
            .await
            .is_err()
        {
            tracing::error!(
                "Failed to shut down within {} seconds",
                FINAL_SHUTDOWN_TIMEOUT.as_secs()
            );
            std::process::exit(4);
        }
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn env_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Compact stdout logging, plus a daily log file when `log_dir` is set.
/// The returned guards flush the writers and must outlive the service.
fn init_logging(service_config: &ServiceConfig) -> Vec<WorkerGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;

    let level = service_config.log_level;
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut guards = vec![stdout_guard];

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(env_filter(level));

    let file_layer = service_config.log_dir.as_ref().map(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: Failed to create log directory {:?}: {}", log_dir, e);
        }
        let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);

        tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter(level))
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

async fn prepare(
    service_config: &ServiceConfig,
) -> Result<(ServiceState, http_server::Config), StateSetupError> {
    let state = ServiceState::from_config(service_config).await?;
    let key = session_key(service_config)?;
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, service_config.app_port));
    Ok((state, http_server::Config::new(addr, key)))
}

/// Open the stores, then spawn the HTTP server and the session sweeper.
///
/// Exits the process if the stores or the session key cannot be set up.
/// The returned `ShutdownHandle` must be kept alive; dropping it does not stop the service.
pub async fn start_service(service_config: &ServiceConfig) -> (ServiceState, ShutdownHandle) {
    let (graceful_waiter, shutdown_tx, shutdown_rx) = utils::graceful_shutdown_blocker();

    let (state, app_config) = match prepare(service_config).await {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("error creating server state: {}", e);
            std::process::exit(3);
        }
    };

    let app_state = state.clone();
    let app_rx = shutdown_rx.clone();
    let app_task = tokio::spawn(async move {
        if let Err(e) = http_server::run_app(app_config, app_state, app_rx).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    let purge_task = tokio::spawn(session::purge_expired(
        state.sessions().clone(),
        SESSION_PURGE_PERIOD,
        shutdown_rx,
    ));

    tracing::info!("Running: HTTP server on port {}", service_config.app_port);

    let handle = ShutdownHandle {
        graceful_waiter,
        tasks: vec![app_task, purge_task],
        shutdown_tx,
    };

    (state, handle)
}

/// Spawns the service and blocks until a shutdown signal is received.
pub async fn spawn_service(service_config: &ServiceConfig) {
    let _guards = init_logging(service_config);
    let (_, handle) = start_service(service_config).await;
    handle.wait().await;
}
