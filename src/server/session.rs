//! Pin sessions: one `PinRegistry` per session id, owned by the app state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::data::catalog::Catalog;
use crate::ehp::Scorer;
use crate::pins::{PinRegistry, RescoreReport};

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, PinRegistry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PinRegistry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, scorer: Scorer) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, PinRegistry::new(scorer));
        tracing::debug!(session = %id, "session created");
        id
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run `f` against the session's registry; `None` when the id is unknown.
    pub fn with_session<R>(&self, id: &Uuid, f: impl FnOnce(&mut PinRegistry) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    /// Run `install` and rescore every session against the catalog it
    /// returns, all under the session lock. Callers that resolve selections
    /// inside `with_session` therefore never see a catalog their registry has
    /// not been rescored against.
    pub fn rescore_all(
        &self,
        install: impl FnOnce() -> Arc<Catalog>,
    ) -> (Arc<Catalog>, Vec<(Uuid, RescoreReport)>) {
        let mut sessions = self.lock();
        let catalog = install();
        let reports = sessions
            .iter_mut()
            .map(|(id, registry)| (*id, registry.rescore(&catalog)))
            .collect();
        (catalog, reports)
    }
}
