use std::net::SocketAddr;

use super::session::{SessionKey, SessionLifetime};

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // signs the session cookie
    pub session_key: SessionKey,
    // idle timeouts for session records
    pub session_lifetime: SessionLifetime,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, session_key: SessionKey) -> Self {
        tracing::info!("Creating HTTP server Config: listen_addr={}", listen_addr);
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            session_key,
            session_lifetime: SessionLifetime::default(),
        }
    }
}
