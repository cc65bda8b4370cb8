use clap::Args;

use quire_daemon::state::{AppState, Environment};
use quire_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Override HTTP server port (default from config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("state error: {0}")]
    StateError(#[from] quire_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.quire)
        let state = AppState::load(ctx.config_path.clone())?;

        // The document root is fixed for the lifetime of the process
        let environment = Environment::from_env();

        let config = ServiceConfig {
            app_port: self.port.unwrap_or(state.config.app_port),
            session_secret: state.config.session_secret.clone(),
            data_dir: state.data_dir(environment),
            users_path: state.users_path(),
            sessions_path: state.sessions_path(),
            environment,
            log_level: tracing::Level::DEBUG,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("quire stopped".to_string())
    }
}
