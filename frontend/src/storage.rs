use shared::{KeyValueStore, StorageError};
use web_sys::Storage;

/// Vote guard backing in `window.localStorage`.
#[derive(Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn local() -> Result<Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError(format!("{e:?}")))?
            .ok_or_else(|| StorageError("localStorage disabled".into()))
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::local()?.get_item(key).map_err(|e| StorageError(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::local()?.set_item(key, value).map_err(|e| StorageError(format!("{e:?}")))
    }
}
