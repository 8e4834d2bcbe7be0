//! # Stage
//!
//! Owns the render thread, the visibility switches and one entry directory
//! per entry kind, and routes events to them.

use crate::config::StageConfig;
use crate::error::StageResult;
use crate::events::{EventBus, EventReceiver, EventSender, StageEvent};
use stage_registry::{
    BoundedRegistry, EntryDirectory, ObjectEntry, RegistryClient, RoomEntry, SyncResult,
};
use stage_rendering::{RenderContext, RenderThread, VisibilityToggles};
use stage_shared::{EntityConfig, EntityId, UnitClass};
use std::sync::Arc;

/// What handling one event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// An update was applied.
    Applied,
    /// A unit's entry was dropped.
    Removed,
    /// An object was highlighted.
    Highlighted,
    /// Nothing to do (registry disabled, unknown unit, ...).
    Ignored,
}

/// Tally of one [`Stage::pump`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Updates applied
    pub applied: usize,
    /// Entries removed
    pub removed: usize,
    /// Objects highlighted
    pub highlighted: usize,
    /// Events with no effect
    pub ignored: usize,
    /// Updates that failed
    pub failed: usize,
}

impl PumpReport {
    fn record(&mut self, result: &SyncResult<Outcome>) {
        match result {
            Ok(Outcome::Applied) => self.applied += 1,
            Ok(Outcome::Removed) => self.removed += 1,
            Ok(Outcome::Highlighted) => self.highlighted += 1,
            Ok(Outcome::Ignored) => self.ignored += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Events handled in total.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.applied + self.removed + self.highlighted + self.ignored + self.failed
    }
}

/// A registry-driven scene.
pub struct Stage {
    config: StageConfig,
    render: RenderThread,
    toggles: VisibilityToggles,
    objects: EntryDirectory<ObjectEntry>,
    rooms: EntryDirectory<RoomEntry>,
    events: EventBus,
    inbox: EventReceiver,
}

impl Stage {
    /// Starts the render thread and sets up empty directories.
    ///
    /// # Errors
    ///
    /// [`crate::StageError::Config`] for an invalid configuration,
    /// [`crate::StageError::Render`] when the render thread cannot start.
    pub fn new(config: StageConfig, registry: Arc<dyn RegistryClient>) -> StageResult<Self> {
        config.validate()?;

        let render = RenderThread::spawn(config.render.capacity())?;
        let context = render.context();
        let toggles = VisibilityToggles::new(context.clone(), config.visibility.as_array());
        let registry = BoundedRegistry::new(registry, config.registry.lookup_timeout());

        let objects = EntryDirectory::new(context.clone(), {
            let (context, registry) = (context.clone(), registry.clone());
            move || ObjectEntry::new(context.clone(), registry.clone())
        });
        let rooms = EntryDirectory::new(context.clone(), {
            let context = context.clone();
            move || RoomEntry::new(context.clone(), registry.clone())
        });

        let events = EventBus::new(config.events.capacity);
        let inbox = events.receiver();

        tracing::info!(
            registry_disabled = config.registry.disabled,
            lookup_timeout_ms = config.registry.lookup_timeout_ms,
            selection_scope = %config.selection.unit_scope,
            "stage started"
        );

        Ok(Self {
            config,
            render,
            toggles,
            objects,
            rooms,
            events,
            inbox,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Scope selections are expected on.
    #[must_use]
    pub fn selection_scope(&self) -> &str {
        &self.config.selection.unit_scope
    }

    /// Submission handle for the render thread.
    #[must_use]
    pub fn render_context(&self) -> RenderContext {
        self.render.context()
    }

    /// The zone, tile and region switches.
    #[must_use]
    pub fn toggles(&self) -> &VisibilityToggles {
        &self.toggles
    }

    /// Object entries.
    #[must_use]
    pub fn objects(&self) -> &EntryDirectory<ObjectEntry> {
        &self.objects
    }

    /// Room entries.
    #[must_use]
    pub fn rooms(&self) -> &EntryDirectory<RoomEntry> {
        &self.rooms
    }

    /// Handle for pushing events to [`Stage::pump`].
    #[must_use]
    pub fn event_sender(&self) -> EventSender {
        self.events.sender()
    }

    /// Handles one event.
    ///
    /// # Errors
    ///
    /// The entry's [`stage_registry::SyncError`] when an update could not be
    /// applied.
    pub async fn handle(&self, event: StageEvent) -> SyncResult<Outcome> {
        match event {
            StageEvent::ConfigUpdated(config) => self.apply(config).await,
            StageEvent::Removed(id) => Ok(self.remove(&id)),
            StageEvent::Selected {
                unit_id,
                probability,
            } => Ok(self.select(&unit_id, probability)),
        }
    }

    /// Handles every pending event in arrival order. Failed updates are
    /// counted and logged by their entry; they do not stop the pump.
    pub async fn pump(&self) -> PumpReport {
        let mut report = PumpReport::default();
        for event in self.inbox.drain() {
            let result = self.handle(event).await;
            report.record(&result);
        }
        report
    }

    async fn apply(&self, config: EntityConfig) -> SyncResult<Outcome> {
        if self.config.registry.disabled {
            tracing::info!(id = %config.id, "registry disabled, ignoring update");
            return Ok(Outcome::Ignored);
        }
        // A unit may change class between revisions. The old kind's entry
        // goes only once the new one has applied.
        let id = config.id.clone();
        match config.class {
            UnitClass::Object => {
                self.objects.apply(config).await?;
                if self.rooms.remove(&id).is_some() {
                    tracing::info!(%id, "location became an object");
                }
            }
            UnitClass::Location(_) => {
                self.rooms.apply(config).await?;
                if self.objects.remove(&id).is_some() {
                    tracing::info!(%id, "object became a location");
                }
            }
        }
        Ok(Outcome::Applied)
    }

    fn remove(&self, id: &EntityId) -> Outcome {
        let object = self.objects.remove(id).is_some();
        let room = self.rooms.remove(id).is_some();
        if object || room {
            Outcome::Removed
        } else {
            tracing::debug!(%id, "removal of untracked unit");
            Outcome::Ignored
        }
    }

    fn select(&self, id: &EntityId, probability: f64) -> Outcome {
        match self.objects.get(id) {
            Some(entry) => {
                entry.highlight(probability);
                Outcome::Highlighted
            }
            None => {
                tracing::debug!(%id, probability, "selected unit is not a tracked object");
                Outcome::Ignored
            }
        }
    }

    /// Drains the render queue and stops the render thread.
    ///
    /// # Errors
    ///
    /// [`crate::StageError::Render`] when the render thread panicked.
    pub fn shutdown(self) -> StageResult<()> {
        let Self {
            render,
            objects,
            rooms,
            ..
        } = self;
        tracing::info!(objects = objects.len(), rooms = rooms.len(), "stage stopping");
        render.shutdown()?;
        Ok(())
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("objects", &self.objects.len())
            .field("rooms", &self.rooms.len())
            .field("toggles", &self.toggles)
            .field("pending_events", &self.inbox.pending_count())
            .finish_non_exhaustive()
    }
}
