//! Stable per-install device identity

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use handoff_shared::constants::DEVICE_ID_STORAGE_KEY;

use crate::storage::{KeyValueStore, StorageError};

/// Loads or generates the opaque device identifier used as the
/// pending-session lookup key. Generated once and kept for the install
/// lifetime.
pub struct DeviceIdentity {
    store: Arc<dyn KeyValueStore>,
}

impl DeviceIdentity {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn device_id(&self) -> Result<String, StorageError> {
        if let Some(existing) = self.store.get(DEVICE_ID_STORAGE_KEY)? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }

        let generated = Uuid::new_v4().to_string();
        self.store.set(DEVICE_ID_STORAGE_KEY, &generated)?;
        info!("Generated device identity");
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn test_device_id_is_stable_across_calls() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let identity = DeviceIdentity::new(store);

        let first = identity.device_id().unwrap();
        let second = identity.device_id().unwrap();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_device_id_survives_new_instance_on_same_store() {
        let store = Arc::new(MemoryKeyValueStore::new());

        let first = DeviceIdentity::new(Arc::clone(&store) as Arc<dyn KeyValueStore>)
            .device_id()
            .unwrap();
        let second = DeviceIdentity::new(store).device_id().unwrap();

        assert_eq!(first, second);
    }
}
