use crate::config::HubConfig;
use crate::http::{BlobStore, DiskBlobStore, UploadSettings};
use crate::hub::Hub;
use crate::signaling::Gateway;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
    pub gateway: Gateway,
    pub blobs: Arc<dyn BlobStore>,
    pub uploads: UploadSettings,
}

impl AppState {
    /// Wires a hub that delivers through a fresh gateway, with in-memory
    /// history and uploads written to disk.
    pub fn new(config: HubConfig, uploads: UploadSettings) -> Self {
        let gateway = Gateway::new();
        let hub = Hub::with_memory_history(config, Arc::new(gateway.clone()));
        let blobs = Arc::new(DiskBlobStore::new(uploads.dir.clone(), uploads.max_bytes));

        Self {
            hub,
            gateway,
            blobs,
            uploads,
        }
    }
}
