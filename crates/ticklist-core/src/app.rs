use crate::datastore::{KeyValueBackend, PersistentStore};
use crate::preferences::PreferenceStore;
use crate::todos::TaskStore;

/// Both stores, loaded from one backend.
#[derive(Debug)]
pub struct App<B> {
    pub todos: TaskStore<B>,
    pub prefs: PreferenceStore<B>,
}

impl<B: KeyValueBackend + Clone> App<B> {
    #[tracing::instrument(skip(backend))]
    pub fn open(backend: B) -> Self {
        Self {
            todos: TaskStore::open(PersistentStore::new(backend.clone())),
            prefs: PreferenceStore::open(PersistentStore::new(backend)),
        }
    }
}
