use tracing::{debug, instrument};

use crate::datastore::{KeyValueBackend, PersistentStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug)]
pub struct PreferenceStore<B> {
    dark_mode: bool,
    store: PersistentStore<B>,
}

impl<B: KeyValueBackend> PreferenceStore<B> {
    #[instrument(skip(store))]
    pub fn open(store: PersistentStore<B>) -> Self {
        let dark_mode = store.load(THEME_KEY).unwrap_or(false);
        debug!(dark_mode, "loaded theme preference");
        Self { dark_mode, store }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Flips the flag, saves it, and returns the new value.
    #[instrument(skip(self))]
    pub fn toggle(&mut self) -> anyhow::Result<bool> {
        self.dark_mode = !self.dark_mode;
        self.store.save(THEME_KEY, &self.dark_mode)?;
        debug!(dark_mode = self.dark_mode, "theme toggled");
        Ok(self.dark_mode)
    }
}
