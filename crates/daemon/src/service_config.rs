use std::path::PathBuf;

use crate::state::Environment;

#[derive(Debug)]
pub struct Config {
    // http server configuration
    /// Port for the HTTP server
    pub app_port: u16,
    /// Secret used to sign session cookies,
    ///  if not set then a random key is generated on start
    pub session_secret: Option<String>,

    // storage configuration
    /// Document directory served by this process
    pub data_dir: PathBuf,
    /// Credential file consulted on every sign-in
    pub users_path: PathBuf,
    /// SQLite database holding session records
    pub sessions_path: PathBuf,
    /// Which document directory `data_dir` was chosen for
    pub environment: Environment,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
