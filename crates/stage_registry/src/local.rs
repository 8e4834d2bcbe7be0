//! # Local Registry
//!
//! An in-process [`RegistryClient`] that answers from the snapshots it has
//! been given. Positions and rotations are relative to the parent location,
//! so global answers walk the parent chain up to the root.
//!
//! Each lookup kind can be scripted to answer late, fail, be cancelled or
//! never answer at all, which is what the timeout and fail-closed paths of
//! the entries are exercised with.

use crate::client::{LookupFuture, RegistryClient};
use crate::error::{Lookup, LookupError, LookupResult};
use parking_lot::{Mutex, RwLock};
use stage_shared::{
    AxisAngle, BoundingBox, EntityConfig, EntityId, Quaternion, Transform3D, Vec3,
};
use std::collections::HashMap;
use std::time::Duration;

/// How the local registry answers one lookup kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LookupBehavior {
    /// Answer immediately.
    #[default]
    Answer,
    /// Answer after a delay.
    Delay(Duration),
    /// Report the lookup as cancelled.
    Cancel,
    /// Report a registry-side failure.
    Fail(String),
    /// Never answer.
    Hang,
}

/// Call counters for one lookup kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupStats {
    /// Lookups started
    pub calls: usize,
    /// Lookups currently running
    pub in_flight: usize,
    /// Highest number of lookups that ran at the same time
    pub peak_in_flight: usize,
}

/// In-process registry computing answers from unit placements.
#[derive(Debug, Default)]
pub struct LocalRegistry {
    units: RwLock<HashMap<EntityId, EntityConfig>>,
    behaviors: Mutex<HashMap<Lookup, LookupBehavior>>,
    stats: Mutex<HashMap<Lookup, LookupStats>>,
}

impl LocalRegistry {
    /// Creates an empty registry that answers every lookup immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a unit. Only needed for units other units name as
    /// their parent.
    pub fn insert(&self, config: EntityConfig) {
        self.units.write().insert(config.id.clone(), config);
    }

    /// Forgets a unit.
    pub fn remove(&self, id: &EntityId) -> Option<EntityConfig> {
        self.units.write().remove(id)
    }

    /// Scripts how future lookups of one kind behave.
    pub fn set_behavior(&self, lookup: Lookup, behavior: LookupBehavior) {
        self.behaviors.lock().insert(lookup, behavior);
    }

    /// Restores immediate answers for every lookup kind.
    pub fn reset_behaviors(&self) {
        self.behaviors.lock().clear();
    }

    /// Counters for one lookup kind.
    #[must_use]
    pub fn stats(&self, lookup: Lookup) -> LookupStats {
        self.stats.lock().get(&lookup).copied().unwrap_or_default()
    }

    fn run<'a, T, F>(&'a self, lookup: Lookup, compute: F) -> LookupFuture<'a, T>
    where
        T: Send + 'a,
        F: FnOnce() -> LookupResult<T> + Send + 'a,
    {
        let behavior = self.behaviors.lock().get(&lookup).cloned().unwrap_or_default();
        Box::pin(async move {
            let _in_flight = InFlight::enter(&self.stats, lookup);
            match behavior {
                LookupBehavior::Answer => {}
                LookupBehavior::Delay(delay) => tokio::time::sleep(delay).await,
                LookupBehavior::Hang => std::future::pending::<()>().await,
                LookupBehavior::Cancel => return Err(LookupError::Cancelled { lookup }),
                LookupBehavior::Fail(reason) => {
                    return Err(LookupError::Failed { lookup, reason });
                }
            }
            compute()
        })
    }

    /// Unit-to-root transform and rotation of a snapshot.
    fn to_root(
        &self,
        config: &EntityConfig,
        lookup: Lookup,
    ) -> LookupResult<(Transform3D, Quaternion)> {
        let units = self.units.read();
        let mut transform = frame_of(config);
        let mut rotation = config.placement.rotation.normalized();
        let mut parent = config.placement.parent.as_ref();
        let mut hops = 0;

        while let Some(id) = parent {
            hops += 1;
            if hops > units.len() {
                return Err(LookupError::Failed {
                    lookup,
                    reason: format!("parent chain of {} has a cycle", config.id),
                });
            }
            let Some(unit) = units.get(id) else {
                return Err(LookupError::Failed {
                    lookup,
                    reason: format!("unknown parent {id} of {}", config.id),
                });
            };
            transform = transform.then(&frame_of(unit));
            rotation = unit.placement.rotation.normalized() * rotation;
            parent = unit.placement.parent.as_ref();
        }

        Ok((transform, rotation))
    }
}

fn frame_of(config: &EntityConfig) -> Transform3D {
    Transform3D::from_rotation_translation(config.placement.rotation, config.placement.position)
}

impl RegistryClient for LocalRegistry {
    fn bounding_box<'a>(&'a self, config: &'a EntityConfig) -> LookupFuture<'a, BoundingBox> {
        self.run(Lookup::BoundingBox, move || {
            Ok(config.placement.shape.bounding_box)
        })
    }

    fn global_center<'a>(&'a self, config: &'a EntityConfig) -> LookupFuture<'a, Vec3> {
        self.run(Lookup::GlobalCenter, move || {
            let (transform, _) = self.to_root(config, Lookup::GlobalCenter)?;
            Ok(transform.transform_point(config.placement.shape.bounding_box.center()))
        })
    }

    fn global_rotation<'a>(&'a self, config: &'a EntityConfig) -> LookupFuture<'a, AxisAngle> {
        self.run(Lookup::GlobalRotation, move || {
            let (_, rotation) = self.to_root(config, Lookup::GlobalRotation)?;
            Ok(AxisAngle::from_quaternion(rotation))
        })
    }

    fn local_to_global_transform<'a>(
        &'a self,
        config: &'a EntityConfig,
    ) -> LookupFuture<'a, Transform3D> {
        self.run(Lookup::LocalToGlobalTransform, move || {
            let (transform, _) = self.to_root(config, Lookup::LocalToGlobalTransform)?;
            Ok(transform)
        })
    }
}

/// Counts a running lookup until dropped, including when the lookup's
/// future is abandoned half-way.
struct InFlight<'a> {
    stats: &'a Mutex<HashMap<Lookup, LookupStats>>,
    lookup: Lookup,
}

impl<'a> InFlight<'a> {
    fn enter(stats: &'a Mutex<HashMap<Lookup, LookupStats>>, lookup: Lookup) -> Self {
        {
            let mut stats = stats.lock();
            let entry = stats.entry(lookup).or_default();
            entry.calls += 1;
            entry.in_flight += 1;
            entry.peak_in_flight = entry.peak_in_flight.max(entry.in_flight);
        }
        Self { stats, lookup }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(entry) = self.stats.lock().get_mut(&self.lookup) {
            entry.in_flight = entry.in_flight.saturating_sub(1);
        }
    }
}
