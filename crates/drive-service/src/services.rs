//! All Drive services wired over one store and one blob store.

use std::sync::Arc;

use drive_core::traits::BlobStore;
use drive_database::DriveStore;

use crate::identity::IdentityService;
use crate::item::ItemService;
use crate::share::ShareService;

/// The service bundle a transport needs.
#[derive(Debug, Clone)]
pub struct DriveServices {
    /// Identity mapping.
    pub identity: IdentityService,
    /// Item façade.
    pub items: ItemService,
    /// Root sharing.
    pub shares: ShareService,
}

impl DriveServices {
    /// Wires every service over the given stores.
    pub fn new(store: Arc<dyn DriveStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            identity: IdentityService::new(Arc::clone(&store)),
            items: ItemService::new(Arc::clone(&store), blobs),
            shares: ShareService::new(store),
        }
    }
}
