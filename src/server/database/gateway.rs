use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};
use log::{debug, error, info, warn};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time;
use crate::server::database::pool_config::PoolConfig;
use crate::server::database::store::StoreError;

/// Opens raw store clients for the gateway.
pub(crate) trait Connector: Send + Sync + 'static {
    type Client: Send + 'static;

    async fn connect(&self) -> Result<Self::Client, StoreError>;

    fn is_closed(client: &Self::Client) -> bool;
}

struct Shared<C: Connector> {
    /// pool name
    name: String,
    connector: C,
    /// idle clients, accessed in a FIFO manner
    idle: Mutex<VecDeque<C::Client>>,
    /// one permit per client that may exist at any time
    permits: Arc<Semaphore>,
    acquire_timeout: time::Duration,
}

/// Owned handle on the relational store, cloned into every component.
///
/// Clients are created lazily on first use and kept for reuse. A client whose
/// connection dropped is reconnected before being handed out again.
pub(crate) struct StoreGateway<C: Connector>(Arc<Shared<C>>);

impl<C: Connector> Clone for StoreGateway<C> {
    fn clone(&self) -> Self {
        StoreGateway(self.0.clone())
    }
}

impl<C: Connector> StoreGateway<C> {
    pub fn new(connector: C, config: &PoolConfig) -> Self {
        Self(Arc::new(Shared {
            name: config.name.clone(),
            connector,
            idle: Mutex::new(VecDeque::with_capacity(config.size)),
            permits: Arc::new(Semaphore::new(config.size)),
            acquire_timeout: config.acquire_timeout,
        }))
    }

    /// acquire a connection, bail out if no slot frees up within the acquire timeout.
    pub async fn acquire(&self) -> Result<Connection<C>, StoreError> {
        let permit = match time::timeout(self.0.acquire_timeout, self.0.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(StoreError::Unavailable {
                    reason: format!("{} gateway is closed", self.0.name),
                })
            }
            Err(_) => {
                error!(
                    "{}: timed out to acquire a connection after {:?}",
                    self.0.name, self.0.acquire_timeout
                );
                return Err(StoreError::Busy);
            }
        };

        let mut conn = match self.take_idle() {
            Some(client) => Connection::new(client, self.0.clone(), permit),
            None => {
                let client = self.0.connector.connect().await?;
                info!("{}: connection created", self.0.name);
                Connection::new(client, self.0.clone(), permit)
            }
        };
        conn.ensure_connected().await?;
        Ok(conn)
    }

    fn take_idle(&self) -> Option<C::Client> {
        self.0
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    #[cfg(test)]
    pub fn idle_count(&self) -> usize {
        self.0.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Refuse new acquisitions and drop idle clients. Checked out connections
    /// are dropped when released.
    pub fn close(&self) {
        self.0.permits.close();
        let dropped = {
            let mut idle = self.0.idle.lock().unwrap_or_else(PoisonError::into_inner);
            let n = idle.len();
            idle.clear();
            n
        };
        info!("{}: gateway closed, {} idle connections dropped", self.0.name, dropped);
    }
}

/// A client checked out of the gateway, returned on drop.
pub(crate) struct Connection<C: Connector> {
    client: Option<C::Client>,
    shared: Arc<Shared<C>>,
    discard: bool,
    _permit: OwnedSemaphorePermit,
}

impl<C: Connector> Connection<C> {
    fn new(client: C::Client, shared: Arc<Shared<C>>, permit: OwnedSemaphorePermit) -> Self {
        Self {
            client: Some(client),
            shared,
            discard: false,
            _permit: permit,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client.as_ref().map_or(true, C::is_closed)
    }

    /// Replace a dropped client with a fresh one. On failure the dead client
    /// stays in place and is discarded on release.
    pub async fn ensure_connected(&mut self) -> Result<(), StoreError> {
        if !self.is_closed() {
            return Ok(());
        }
        warn!("{}: connection dropped, reconnecting", self.shared.name);
        let client = self.shared.connector.connect().await?;
        self.client = Some(client);
        info!("{}: connection re-established", self.shared.name);
        Ok(())
    }

    /// Do not return this client to the pool.
    pub fn discard(&mut self) {
        self.discard = true;
    }
}

impl<C: Connector> Deref for Connection<C> {
    type Target = C::Client;

    fn deref(&self) -> &Self::Target {
        // only taken in drop
        self.client.as_ref().expect("connection used after release")
    }
}

impl<C: Connector> Drop for Connection<C> {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        if self.discard || C::is_closed(&client) {
            debug!("{}: discarding connection", self.shared.name);
            return;
        }
        if self.shared.permits.is_closed() {
            return;
        }
        self.shared
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(client);
    }
}
