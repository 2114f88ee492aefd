use std::net::SocketAddrV4;
use std::time::Duration;
use crate::server::database::pool_config::PoolConfig;
use crate::server::model::summary::SummaryDefaults;

/// Server configs
#[derive(Debug)]
pub struct ServerConfig {
    pub addr: SocketAddrV4,
    /// actix workers, each one single-threaded
    pub workers: usize,
    pub pool: PoolConfig,
    pub kot: KotSettings,
}

impl ServerConfig {
    pub fn new(addr: SocketAddrV4, workers: usize, pool: PoolConfig, kot: KotSettings) -> Self {
        Self {
            addr,
            workers,
            pool,
            kot,
        }
    }
}

/// Settings of the ticket workflow.
#[derive(Debug, Clone)]
pub struct KotSettings {
    pub summary: SummaryDefaults,
    /// attempts of one submission when concurrent writers conflict
    pub max_submit_attempts: u32,
    /// upper bound of a single submission attempt
    pub submit_timeout: Duration,
}

impl Default for KotSettings {
    fn default() -> Self {
        Self {
            summary: SummaryDefaults::default(),
            max_submit_attempts: 3,
            submit_timeout: Duration::from_millis(10_000),
        }
    }
}
