use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// pool name, shows up in logs
    pub name: String,
    /// connection pool size
    pub size: usize,
    /// connection string
    pub conn_str: String,
    /// how long a request waits for a free connection
    pub acquire_timeout: Duration,
    /// server side bound of every statement inside a submission
    pub statement_timeout: Duration,
}

impl PoolConfig {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(conn_str: impl Into<String>) -> Self {
        Self {
            name: "kot".to_string(),
            size: Self::DEFAULT_SIZE,
            conn_str: conn_str.into(),
            acquire_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_millis(5_000),
        }
    }
}
