//! Store registry
//!
//! Holds the single active audit store. The registry is an explicit value:
//! create one at startup, share it via `Arc`, and hand it to the
//! [`AuditRecorder`](crate::AuditRecorder) and the request middleware.

use crate::{AuditStore, BackendKind, QuillError, Result, StoreConfig};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Holder of the active audit store
///
/// `initialize` builds the new store completely before swapping it in under
/// the write lock, so `current` never observes a half-constructed store and a
/// failed initialization leaves the previous store active.
#[derive(Default)]
pub struct AuditRegistry {
    active: RwLock<Option<Arc<AuditStore>>>,
}

impl AuditRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the named backend from a flat settings map and make it active
    ///
    /// `backend` is `file` or `relational` (`db` and `sqlite` are accepted as
    /// aliases). See [`StoreConfig::from_settings`] for the recognized keys.
    pub fn initialize(&self, backend: &str, settings: &HashMap<String, String>) -> Result<()> {
        let kind: BackendKind = backend.parse()?;
        let config = StoreConfig::from_settings(kind, settings)?;
        self.initialize_with(config)
    }

    /// Open a backend from an already validated config and make it active
    pub fn initialize_with(&self, config: StoreConfig) -> Result<()> {
        let store = AuditStore::open(config)?;
        self.install(store);
        Ok(())
    }

    /// Make an opened store active, replacing any previous one
    ///
    /// The replaced store is released once every outstanding handle to it is
    /// dropped.
    pub fn install(&self, store: AuditStore) {
        let kind = store.kind();
        let previous = self.active.write().replace(Arc::new(store));

        match previous {
            Some(old) => tracing::info!(
                from = %old.kind(),
                to = %kind,
                "Replaced active audit store"
            ),
            None => tracing::info!(backend = %kind, "Initialized audit store"),
        }
    }

    /// Handle to the active store
    pub fn current(&self) -> Result<Arc<AuditStore>> {
        self.active
            .read()
            .as_ref()
            .cloned()
            .ok_or(QuillError::NotInitialized)
    }

    /// Kind of the active store, if any
    pub fn backend(&self) -> Option<BackendKind> {
        self.active.read().as_ref().map(|store| store.kind())
    }

    pub fn is_initialized(&self) -> bool {
        self.active.read().is_some()
    }

    /// Deactivate the current store
    ///
    /// Closes it right away when no other handle is outstanding; otherwise it
    /// is released with the last handle.
    pub fn shutdown(&self) -> Result<()> {
        let Some(store) = self.active.write().take() else {
            return Ok(());
        };

        match Arc::try_unwrap(store) {
            Ok(store) => store.close(),
            Err(shared) => {
                tracing::debug!(
                    backend = %shared.kind(),
                    handles = Arc::strong_count(&shared),
                    "Audit store still in use, deferring close"
                );
                Ok(())
            }
        }
    }
}
