use crate::server::auth::AuthGate;
use crate::server::database::store::KotStore;
use crate::server::kot::cancellation::CancellationManager;
use crate::server::kot::coordinator::OrderCoordinator;
use crate::server::kot::retrieval::RetrievalService;
use crate::server::model::config::KotSettings;

/// Components shared by every worker, all backed by the same store.
pub(crate) struct AppState<S: KotStore> {
    coordinator: OrderCoordinator<S>,
    cancellations: CancellationManager<S>,
    retrieval: RetrievalService<S>,
    auth: AuthGate<S>,
    store: S,
}

impl<S: KotStore> AppState<S> {
    pub fn new(store: S, settings: &KotSettings) -> Self {
        Self {
            coordinator: OrderCoordinator::new(store.clone(), settings.clone()),
            cancellations: CancellationManager::new(store.clone()),
            retrieval: RetrievalService::new(store.clone()),
            auth: AuthGate::new(store.clone()),
            store,
        }
    }

    pub fn coordinator(&self) -> &OrderCoordinator<S> {
        &self.coordinator
    }

    pub fn cancellations(&self) -> &CancellationManager<S> {
        &self.cancellations
    }

    pub fn retrieval(&self) -> &RetrievalService<S> {
        &self.retrieval
    }

    pub fn auth(&self) -> &AuthGate<S> {
        &self.auth
    }

    /// reference data is read straight from the store
    pub fn store(&self) -> &S {
        &self.store
    }
}
