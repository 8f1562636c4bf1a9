use mcda::config::StorageConfig;
use mcda::scoring::{
    InMemoryResultStore, JsonLinesResultStore, NewRecord, ResultStore, StoreError, StoredRecord,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) results: Arc<dyn ResultStore>,
}

/// Result store chosen at startup from `MCDA_RESULTS_PATH`.
#[derive(Debug)]
pub(crate) enum ResultBackend {
    Memory(InMemoryResultStore),
    File(JsonLinesResultStore),
}

impl ResultBackend {
    pub(crate) fn open(storage: &StorageConfig) -> Result<Self, StoreError> {
        match &storage.results_path {
            Some(path) => {
                let store = JsonLinesResultStore::open(path.clone())?;
                info!(path = %store.path().display(), "persisting scoring results to file");
                Ok(Self::File(store))
            }
            None => {
                info!("persisting scoring results in memory");
                Ok(Self::Memory(InMemoryResultStore::default()))
            }
        }
    }
}

impl ResultStore for ResultBackend {
    fn add(&self, record: NewRecord) -> Result<StoredRecord, StoreError> {
        match self {
            ResultBackend::Memory(store) => store.add(record),
            ResultBackend::File(store) => store.add(record),
        }
    }

    fn stream(&self) -> Result<Vec<StoredRecord>, StoreError> {
        match self {
            ResultBackend::Memory(store) => store.stream(),
            ResultBackend::File(store) => store.stream(),
        }
    }
}
