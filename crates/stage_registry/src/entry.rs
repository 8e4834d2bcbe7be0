//! # Visual Registry Entry
//!
//! One entry mirrors one registry unit into one scene node.
//!
//! ## Apply protocol
//!
//! ```text
//! apply_config_update(config)
//!   │
//!   ├─ lock the entry (async mutex, FIFO)       ← concurrent applies queue here
//!   ├─ bounded registry lookups                 ← may time out / fail / be cancelled
//!   │     └─ any error: log, return ApplyFailed, nothing else changes
//!   ├─ compute the node's target state (pure)
//!   ├─ enqueue ONE mutation on the render thread
//!   └─ commit config as the current snapshot, unlock
//! ```
//!
//! Enqueue and commit happen without an await point in between, so dropping
//! an apply future at any point either changes nothing or changes both.

use crate::client::BoundedRegistry;
use crate::error::{LookupError, SyncError, SyncResult};
use parking_lot::RwLock;
use stage_rendering::{NodeId, NodeState, RenderContext};
use stage_shared::{EntityConfig, EntityId};
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use tokio::sync::{Mutex, MutexGuard};

/// Contract between the entry directory and a concrete entry kind.
///
/// Equality and hashing of implementors compare the last successfully
/// applied snapshot only; node identity is ignored.
pub trait VisualRegistryEntry: Send + Sync {
    /// Brings the node in line with `config`.
    ///
    /// Applies on one entry are serialized. On success the node mutation has
    /// been enqueued (not necessarily run) and `config` is returned as the
    /// committed snapshot.
    ///
    /// # Errors
    ///
    /// [`SyncError::ApplyFailed`] when a registry lookup timed out, failed or
    /// was cancelled. The entry keeps its previous snapshot and its node is
    /// not touched.
    fn apply_config_update(
        &self,
        config: EntityConfig,
    ) -> impl Future<Output = SyncResult<EntityConfig>> + Send;

    /// Last successfully applied snapshot, `None` before the first one.
    fn current_config(&self) -> Option<EntityConfig>;

    /// The entry's node. Stable for the entry's whole life.
    fn node(&self) -> NodeId;

    /// Last successfully applied snapshot.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotAvailable`] before the first successful apply.
    fn config(&self) -> SyncResult<EntityConfig> {
        self.current_config().ok_or(SyncError::NotAvailable("Config"))
    }

    /// Identifier of the last successfully applied snapshot.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotAvailable`] before the first successful apply.
    fn id(&self) -> SyncResult<EntityId> {
        self.current_config()
            .map(|config| config.id)
            .ok_or(SyncError::NotAvailable("Id"))
    }
}

/// State every entry kind shares: the node, the handles it needs to update
/// it and the committed snapshot.
pub struct EntryCore {
    kind: &'static str,
    node: NodeId,
    render: RenderContext,
    registry: BoundedRegistry,
    apply_lock: Mutex<()>,
    current: RwLock<Option<EntityConfig>>,
}

impl EntryCore {
    /// Creates the node (invisible, in `initial` state) and an empty entry.
    #[must_use]
    pub fn new(
        kind: &'static str,
        render: RenderContext,
        registry: BoundedRegistry,
        initial: NodeState,
    ) -> Self {
        let node = render.create_node(initial);
        Self {
            kind,
            node,
            render,
            registry,
            apply_lock: Mutex::new(()),
            current: RwLock::new(None),
        }
    }

    /// Waits for exclusive use of the entry. Hold the guard for the whole
    /// lookup, mutate and commit sequence.
    pub async fn serialize(&self) -> MutexGuard<'_, ()> {
        self.apply_lock.lock().await
    }

    /// Registry the entry's lookups go through.
    #[must_use]
    pub fn registry(&self) -> &BoundedRegistry {
        &self.registry
    }

    /// Render context the entry's mutations go through.
    #[must_use]
    pub fn render(&self) -> &RenderContext {
        &self.render
    }

    /// The entry's node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Last committed snapshot.
    #[must_use]
    pub fn current(&self) -> Option<EntityConfig> {
        self.current.read().clone()
    }

    /// Records `config` as the current snapshot and returns it.
    pub fn commit(&self, config: EntityConfig) -> EntityConfig {
        tracing::debug!(
            id = %config.id,
            kind = self.kind,
            node = self.node.raw(),
            "applied update"
        );
        *self.current.write() = Some(config.clone());
        config
    }

    /// Turns a lookup failure into the error the entry reports.
    #[must_use]
    pub fn fail(&self, config: &EntityConfig, source: LookupError) -> SyncError {
        tracing::warn!(id = %config.id, kind = self.kind, cause = %source, "update not applied");
        SyncError::ApplyFailed {
            id: config.id.clone(),
            source,
        }
    }
}

impl PartialEq for EntryCore {
    fn eq(&self, other: &Self) -> bool {
        // Snapshot first: never hold two read guards on the same lock.
        let mine = self.current();
        mine == other.current()
    }
}

impl Eq for EntryCore {}

impl Hash for EntryCore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.current().hash(state);
    }
}

impl fmt::Debug for EntryCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryCore")
            .field("kind", &self.kind)
            .field("node", &self.node)
            .field("current", &self.current.read().as_ref().map(|c| c.id.clone()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalRegistry;
    use stage_rendering::RenderThread;
    use std::sync::Arc;
    use std::time::Duration;

    fn core(render: &RenderThread) -> EntryCore {
        let registry =
            BoundedRegistry::new(Arc::new(LocalRegistry::new()), Duration::from_secs(1));
        EntryCore::new("test", render.context(), registry, NodeState::hidden_box())
    }

    #[test]
    fn test_node_exists_before_first_commit() {
        let render = RenderThread::spawn(None).unwrap();
        let core = core(&render);
        assert!(core.current().is_none());

        let snapshot = render.context().snapshot(core.node()).unwrap().unwrap();
        assert!(!snapshot.visible);
    }

    #[test]
    fn test_commit_and_equality() {
        let render = RenderThread::spawn(None).unwrap();
        let a = core(&render);
        let b = core(&render);
        assert_ne!(a.node(), b.node());
        assert_eq!(a, b);

        let config = EntityConfig::object("shelf");
        assert_eq!(a.commit(config.clone()), config);
        assert_ne!(a, b);
        b.commit(config);
        assert_eq!(a, b);
        let same = &a;
        assert_eq!(&a, same);
    }
}
