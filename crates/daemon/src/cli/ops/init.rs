use std::path::PathBuf;

use clap::Args;

use quire_daemon::http_server::SessionKey;
use quire_daemon::state::{AppConfig, AppState, Environment};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// HTTP server port
    #[arg(long, default_value_t = 4567)]
    pub app_port: u16,

    /// Document directory (defaults to <config-path>/public/data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Document directory used when QUIRE_ENV=test (defaults to <config-path>/test/data)
    #[arg(long)]
    pub test_data_dir: Option<PathBuf>,

    /// Credential file (defaults to <config-path>/users.txt)
    #[arg(long)]
    pub users_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] quire_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            app_port: self.app_port,
            data_dir: self.data_dir.clone(),
            test_data_dir: self.test_data_dir.clone(),
            users_file: self.users_file.clone(),
            sessions_db: None,
            session_secret: Some(SessionKey::generate_secret()),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized quire directory at: {}\n\
             - Config: {}\n\
             - Documents: {}\n\
             - Test documents: {}\n\
             - Users: {}\n\
             - Port: {}\n\
             Add accounts with `quire hash-password <username> <password> >> {}`",
            state.quire_dir.display(),
            state.config_path.display(),
            state.data_dir(Environment::Production).display(),
            state.data_dir(Environment::Test).display(),
            state.users_path().display(),
            state.config.app_port,
            state.users_path().display(),
        );

        Ok(output)
    }
}
