use mediagate_core::Config;
use mediagate_storage::{PathCodec, RetrievalGateway, StorageDriver};
use std::sync::Arc;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: RetrievalGateway,
}

impl AppState {
    pub fn new(config: Config, codec: Arc<PathCodec>, driver: Arc<dyn StorageDriver>) -> Self {
        AppState {
            config,
            gateway: RetrievalGateway::new(codec, driver),
        }
    }

    pub fn codec(&self) -> &PathCodec {
        self.gateway.codec()
    }

    pub fn driver(&self) -> &dyn StorageDriver {
        self.gateway.driver().as_ref()
    }
}
