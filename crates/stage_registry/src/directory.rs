//! # Entry Directory
//!
//! Maps registry ids to entries of one kind. Owns entry lifetimes: entries
//! are created the first time their id is seen and dropped (node detached)
//! when the unit disappears from the registry.

use crate::entry::VisualRegistryEntry;
use crate::error::SyncResult;
use parking_lot::RwLock;
use stage_rendering::RenderContext;
use stage_shared::{EntityConfig, EntityId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Factory<E> = Box<dyn Fn() -> E + Send + Sync>;

/// Id to entry map for one entry kind.
pub struct EntryDirectory<E> {
    entries: RwLock<HashMap<EntityId, Arc<E>>>,
    factory: Factory<E>,
    render: RenderContext,
}

impl<E: VisualRegistryEntry> EntryDirectory<E> {
    /// Creates an empty directory. `factory` builds a fresh entry (and its
    /// node) for every new id.
    pub fn new<F>(render: RenderContext, factory: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self {
            entries: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
            render,
        }
    }

    /// Routes an update to the unit's entry, creating it on first sight.
    ///
    /// A new entry whose first apply fails stays in the directory with its
    /// node hidden, so the next update for the id reuses it.
    ///
    /// # Errors
    ///
    /// Whatever [`VisualRegistryEntry::apply_config_update`] reports.
    pub async fn apply(&self, config: EntityConfig) -> SyncResult<EntityConfig> {
        let entry = self.entry_for(&config.id);
        entry.apply_config_update(config).await
    }

    fn entry_for(&self, id: &EntityId) -> Arc<E> {
        if let Some(entry) = self.entries.read().get(id) {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write();
        let entry = entries.entry(id.clone()).or_insert_with(|| {
            tracing::info!(%id, "tracking unit");
            Arc::new((self.factory)())
        });
        Arc::clone(entry)
    }

    /// Drops the unit's entry and detaches its node.
    pub fn remove(&self, id: &EntityId) -> Option<Arc<E>> {
        let entry = self.entries.write().remove(id)?;
        self.render.detach_node(entry.node());
        tracing::info!(%id, node = entry.node().raw(), "stopped tracking unit");
        Some(entry)
    }

    /// Entry for an id.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<Arc<E>> {
        self.entries.read().get(id).cloned()
    }

    /// True when the id has an entry.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when the directory tracks nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Tracked ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entries.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

impl<E> fmt::Debug for EntryDirectory<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryDirectory")
            .field("entries", &self.entries.read().len())
            .finish_non_exhaustive()
    }
}
