use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::datastore::{KeyValueBackend, PersistentStore, TASKS_KEY};
use crate::filter::{FilterMode, filter_tasks};
use crate::task::{Task, next_id};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Owns the ordered task list and writes it back after every mutation.
#[derive(Debug)]
pub struct TaskStore<B> {
    tasks: Vec<Task>,
    filter: FilterMode,
    high_water: u64,
    store: PersistentStore<B>,
}

impl<B: KeyValueBackend> TaskStore<B> {
    #[instrument(skip(store))]
    pub fn open(store: PersistentStore<B>) -> Self {
        let tasks: Vec<Task> = store.load(TASKS_KEY).unwrap_or_default();
        let high_water = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        info!(count = tasks.len(), high_water, "loaded tasks");

        Self {
            tasks,
            filter: FilterMode::default(),
            high_water,
            store,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        debug!(mode = %mode, "filter changed");
        self.filter = mode;
    }

    pub fn filtered_view(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, self.filter)
    }

    pub fn stats(&self) -> TaskStats {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        TaskStats {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    pub fn create(&mut self, raw_text: &str) -> anyhow::Result<Option<u64>> {
        self.create_at(raw_text, Utc::now())
    }

    /// Returns the new id, or `None` when the trimmed text is empty.
    #[instrument(skip(self, raw_text, now))]
    pub fn create_at(&mut self, raw_text: &str, now: DateTime<Utc>) -> anyhow::Result<Option<u64>> {
        let text = raw_text.trim();
        if text.is_empty() {
            debug!("ignoring empty task text");
            return Ok(None);
        }

        let id = next_id(self.high_water, now)
            .ok_or_else(|| anyhow!("task id space exhausted (highest id {})", self.high_water))?;
        let before = self.tasks.clone();
        self.tasks.push(Task::new(id, text.to_string(), now));
        self.persist_or_restore(before)?;
        self.high_water = id;

        debug!(id, count = self.tasks.len(), "task created");
        Ok(Some(id))
    }

    #[instrument(skip(self))]
    pub fn toggle(&mut self, id: u64) -> anyhow::Result<bool> {
        let before = self.tasks.clone();
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("toggle on unknown id");
            return Ok(false);
        };
        task.completed = !task.completed;
        debug!(completed = task.completed, "task toggled");
        self.persist_or_restore(before)?;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub fn delete(&mut self, id: u64) -> anyhow::Result<bool> {
        let Some(idx) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("delete on unknown id");
            return Ok(false);
        };
        let before = self.tasks.clone();
        self.tasks.remove(idx);
        self.persist_or_restore(before)?;
        Ok(true)
    }

    /// Unlike `create`, an edit that trims to nothing is stored as-is.
    #[instrument(skip(self, raw_text))]
    pub fn edit(&mut self, id: u64, raw_text: &str) -> anyhow::Result<bool> {
        let before = self.tasks.clone();
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("edit on unknown id");
            return Ok(false);
        };
        task.text = raw_text.trim().to_string();
        self.persist_or_restore(before)?;
        Ok(true)
    }

    /// Returns how many tasks were removed.
    #[instrument(skip(self))]
    pub fn clear_completed(&mut self) -> anyhow::Result<usize> {
        let before = self.tasks.clone();
        self.tasks.retain(Task::is_active);
        let removed = before.len() - self.tasks.len();
        info!(before = before.len(), after = self.tasks.len(), "cleared completed tasks");
        self.persist_or_restore(before)?;
        Ok(removed)
    }

    pub fn into_store(self) -> PersistentStore<B> {
        self.store
    }

    /// Saves the current list; on failure the list goes back to `before`
    /// so memory never runs ahead of what is stored.
    fn persist_or_restore(&mut self, before: Vec<Task>) -> anyhow::Result<()> {
        if let Err(err) = self.store.save(TASKS_KEY, &self.tasks) {
            warn!(error = %format!("{err:#}"), "save failed; reverting in-memory change");
            self.tasks = before;
            return Err(err);
        }
        Ok(())
    }
}
