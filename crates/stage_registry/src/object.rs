//! # Object Entry
//!
//! Draws a physical unit as a box: centered on the unit's global center,
//! rotated by its global rotation and sized by its bounding box.
//!
//! The registry and the scene disagree on which axis is up:
//!
//! ```text
//!   registry box          scene box
//!   width  (x)   ──────▶  width  (x)
//!   depth  (y)   ──────▶  height (y, up)
//!   height (z)   ──────▶  depth  (z)
//! ```

use crate::client::BoundedRegistry;
use crate::entry::{EntryCore, VisualRegistryEntry};
use crate::error::{LookupResult, SyncResult};
use stage_rendering::{
    BoxGeometry, Material, NodeId, NodeShape, NodeState, RenderContext, Scene, Visibility,
};
use stage_shared::{AxisAngle, BoundingBox, EntityConfig, Vec3, DEGENERATE_BOX_HEIGHT};
use std::hash::{Hash, Hasher};

/// Registry answers needed to place one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectSample {
    /// Bounding box in registry axes
    pub bounding_box: BoundingBox,
    /// Global center of the bounding box
    pub center: Vec3,
    /// Global rotation
    pub rotation: AxisAngle,
}

impl ObjectSample {
    /// Runs the three lookups concurrently. The first failure wins and the
    /// other lookups are dropped.
    ///
    /// # Errors
    ///
    /// The first [`crate::LookupError`] any of the lookups reports.
    pub async fn lookup(registry: &BoundedRegistry, config: &EntityConfig) -> LookupResult<Self> {
        let (bounding_box, center, rotation) = tokio::try_join!(
            registry.bounding_box(config),
            registry.global_center(config),
            registry.global_rotation(config),
        )?;
        Ok(Self {
            bounding_box,
            center,
            rotation,
        })
    }
}

/// Box state an object's node is brought to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectTarget {
    /// Node translation
    pub translate: Vec3,
    /// Node rotation axis
    pub rotation_axis: Vec3,
    /// Node rotation in degrees
    pub rotate: f64,
    /// Box extents in scene axes
    pub geometry: BoxGeometry,
}

impl ObjectTarget {
    /// Pure mapping from registry answers to node state.
    #[must_use]
    pub fn from_sample(sample: &ObjectSample) -> Self {
        Self {
            translate: sample.center,
            rotation_axis: sample.rotation.axis,
            rotate: sample.rotation.degrees(),
            geometry: box_geometry(&sample.bounding_box),
        }
    }

    /// Writes the target into a node and shows it. The material is kept.
    pub fn apply_to(&self, scene: &mut Scene, node: NodeId) {
        let Some(state) = scene.node_mut(node) else {
            tracing::debug!(node = node.raw(), "object node already detached");
            return;
        };
        state.translate = self.translate;
        state.rotation_axis = self.rotation_axis;
        state.rotate = self.rotate;
        state.shape = NodeShape::Box(self.geometry);
        state.visibility = Visibility::Manual(true);
    }
}

/// Registry box to scene box, swapping depth and height.
///
/// A box carrying the registry's placeholder extent on every axis is a
/// perfect cube the box primitive cannot draw, so its height is nudged down.
#[must_use]
pub fn box_geometry(bounding_box: &BoundingBox) -> BoxGeometry {
    let height = if bounding_box.is_placeholder() {
        DEGENERATE_BOX_HEIGHT
    } else {
        bounding_box.depth
    };
    BoxGeometry {
        width: bounding_box.width,
        height,
        depth: bounding_box.height,
    }
}

/// Material for a detection strength.
///
/// Upper bucket wins at every threshold. Values below 0 fall into alert,
/// values above 1 into best.
#[must_use]
pub fn highlight_material(strength: f64) -> Material {
    if strength < 0.5 {
        Material::Alert
    } else if strength < 0.65 {
        Material::WarnHigh
    } else if strength < 0.8 {
        Material::WarnMid
    } else if strength < 0.9 {
        Material::OkHigh
    } else if strength < 0.95 {
        Material::OkVeryHigh
    } else {
        Material::Best
    }
}

/// Entry for a physical object.
#[derive(Debug)]
pub struct ObjectEntry {
    core: EntryCore,
}

impl ObjectEntry {
    /// Creates the entry and its (hidden) box node.
    #[must_use]
    pub fn new(render: RenderContext, registry: BoundedRegistry) -> Self {
        Self {
            core: EntryCore::new("object", render, registry, NodeState::hidden_box()),
        }
    }

    /// Colors the node by detection strength.
    ///
    /// Does not wait for the entry's apply lock or for the render thread.
    /// The material stays until the next call.
    pub fn highlight(&self, strength: f64) {
        let material = highlight_material(strength);
        let node = self.core.node();
        if let Some(config) = self.core.current() {
            tracing::trace!(
                label = %config.label,
                id = %config.id,
                material = material.name(),
                "highlight"
            );
        }
        self.core.render().run_on_render_thread(move |scene| {
            if let Some(state) = scene.node_mut(node) {
                state.material = material;
            }
        });
    }
}

impl VisualRegistryEntry for ObjectEntry {
    async fn apply_config_update(&self, config: EntityConfig) -> SyncResult<EntityConfig> {
        let _exclusive = self.core.serialize().await;

        let sample = match ObjectSample::lookup(self.core.registry(), &config).await {
            Ok(sample) => sample,
            Err(source) => return Err(self.core.fail(&config, source)),
        };

        let target = ObjectTarget::from_sample(&sample);
        let node = self.core.node();
        self.core
            .render()
            .run_on_render_thread(move |scene| target.apply_to(scene, node));
        Ok(self.core.commit(config))
    }

    fn current_config(&self) -> Option<EntityConfig> {
        self.core.current()
    }

    fn node(&self) -> NodeId {
        self.core.node()
    }
}

impl PartialEq for ObjectEntry {
    fn eq(&self, other: &Self) -> bool {
        self.core == other.core
    }
}

impl Eq for ObjectEntry {}

impl Hash for ObjectEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Lookup, LookupError, SyncError};
    use crate::local::{LocalRegistry, LookupBehavior};
    use stage_rendering::RenderThread;
    use stage_shared::{Placement, Quaternion, Shape};
    use std::collections::HashSet;
    use std::f64::consts::FRAC_PI_2;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup(timeout: Duration) -> (RenderThread, Arc<LocalRegistry>, ObjectEntry) {
        let render = RenderThread::spawn(None).unwrap();
        let local = Arc::new(LocalRegistry::new());
        let registry = BoundedRegistry::new(local.clone(), timeout);
        let entry = ObjectEntry::new(render.context(), registry);
        (render, local, entry)
    }

    fn object(id: &str, bounding_box: BoundingBox, position: Vec3) -> EntityConfig {
        EntityConfig::object(id).with_placement(Placement {
            position,
            rotation: Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2),
            shape: Shape {
                bounding_box,
                ..Shape::default()
            },
            parent: None,
        })
    }

    #[test]
    fn test_axis_remap() {
        let geometry = box_geometry(&BoundingBox::new(Vec3::ZERO, 2.0, 3.0, 4.0));
        assert_eq!(geometry, BoxGeometry { width: 2.0, height: 4.0, depth: 3.0 });

        for (w, h, d) in [(0.5, 7.0, 1.25), (10.0, 0.1, 0.1), (1e-3, 1e3, 42.0)] {
            let g = box_geometry(&BoundingBox::new(Vec3::ZERO, w, h, d));
            assert_eq!((g.width, g.depth, g.height), (w, h, d));
        }
    }

    #[test]
    fn test_placeholder_box_is_nudged() {
        let g = box_geometry(&BoundingBox::PLACEHOLDER);
        assert_eq!(g.width, 0.1);
        assert_eq!(g.depth, 0.1);
        assert_eq!(g.height, 0.09999);

        for (w, h, d) in [(0.1, 0.1, 0.0), (0.1, 0.1, 0.2), (0.0, 0.1, 0.1), (0.1, 0.10001, 0.1)] {
            let g = box_geometry(&BoundingBox::new(Vec3::ZERO, w, h, d));
            assert_eq!(g.height, d);
        }
    }

    #[test]
    fn test_highlight_thresholds() {
        let table = [
            (-0.2, Material::Alert),
            (0.0, Material::Alert),
            (0.49, Material::Alert),
            (0.5, Material::WarnHigh),
            (0.64, Material::WarnHigh),
            (0.65, Material::WarnMid),
            (0.8, Material::OkHigh),
            (0.9, Material::OkVeryHigh),
            (0.95, Material::Best),
            (1.0, Material::Best),
            (3.0, Material::Best),
        ];
        for (strength, expected) in table {
            assert_eq!(highlight_material(strength), expected, "strength {strength}");
        }
    }

    #[test]
    fn test_target_from_sample() {
        let sample = ObjectSample {
            bounding_box: BoundingBox::new(Vec3::ZERO, 1.0, 2.0, 3.0),
            center: Vec3::new(4.0, 5.0, 6.0),
            rotation: AxisAngle::new(Vec3::X, std::f64::consts::PI),
        };
        let target = ObjectTarget::from_sample(&sample);
        assert_eq!(target.translate, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(target.rotation_axis, Vec3::X);
        assert_eq!(target.rotate, 180.0);
        assert_eq!(target.geometry, BoxGeometry { width: 1.0, height: 3.0, depth: 2.0 });
    }

    #[tokio::test]
    async fn test_apply_shows_node() {
        let (render, _local, entry) = setup(Duration::from_secs(1));
        let config = object("crate", BoundingBox::new(Vec3::ZERO, 2.0, 3.0, 4.0), Vec3::X);

        assert_eq!(entry.config(), Err(SyncError::NotAvailable("Config")));
        assert_eq!(entry.id(), Err(SyncError::NotAvailable("Id")));

        let committed = entry.apply_config_update(config.clone()).await.unwrap();
        assert_eq!(committed, config);
        assert_eq!(entry.id().unwrap().as_str(), "crate");

        let snapshot = render.context().snapshot(entry.node()).unwrap().unwrap();
        assert!(snapshot.visible);
        assert_eq!(
            snapshot.state.box_geometry(),
            Some(BoxGeometry { width: 2.0, height: 4.0, depth: 3.0 })
        );
        assert!((snapshot.state.rotate - 90.0).abs() < 1e-9);
        assert_eq!(snapshot.state.material, Material::Default);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_apply_keeps_previous_state() {
        let (render, local, entry) = setup(Duration::from_millis(100));
        let first = object("crate", BoundingBox::new(Vec3::ZERO, 1.0, 1.0, 1.0), Vec3::ZERO);
        let second = object("crate", BoundingBox::new(Vec3::ZERO, 9.0, 9.0, 9.0), Vec3::Y);

        // First apply fails: nothing available, node still hidden.
        local.set_behavior(Lookup::GlobalRotation, LookupBehavior::Cancel);
        let err = entry.apply_config_update(first.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::ApplyFailed { source: LookupError::Cancelled { .. }, .. }
        ));
        assert_eq!(entry.config(), Err(SyncError::NotAvailable("Config")));
        assert!(!render.context().snapshot(entry.node()).unwrap().unwrap().visible);

        local.reset_behaviors();
        entry.apply_config_update(first.clone()).await.unwrap();
        let shown = render.context().snapshot(entry.node()).unwrap().unwrap();

        // Later apply times out: previous snapshot and node state survive.
        local.set_behavior(Lookup::GlobalCenter, LookupBehavior::Hang);
        let err = entry.apply_config_update(second).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::ApplyFailed { source: LookupError::TimedOut { .. }, .. }
        ));
        assert_eq!(entry.config().unwrap(), first);
        assert_eq!(render.context().snapshot(entry.node()).unwrap().unwrap(), shown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_apply_changes_nothing() {
        let (render, local, entry) = setup(Duration::from_secs(10));
        let first = object("crate", BoundingBox::new(Vec3::ZERO, 1.0, 1.0, 1.0), Vec3::ZERO);
        let second = object("crate", BoundingBox::new(Vec3::ZERO, 5.0, 5.0, 5.0), Vec3::Y);
        entry.apply_config_update(first.clone()).await.unwrap();
        let shown = render.context().snapshot(entry.node()).unwrap().unwrap();

        // The caller gives up long before the registry would time out.
        local.set_behavior(Lookup::GlobalCenter, LookupBehavior::Hang);
        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            entry.apply_config_update(second.clone()),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(entry.config().unwrap(), first);
        assert_eq!(render.context().snapshot(entry.node()).unwrap().unwrap(), shown);

        // The dropped apply released the entry lock.
        local.reset_behaviors();
        let next = tokio::time::timeout(
            Duration::from_millis(50),
            entry.apply_config_update(second.clone()),
        )
        .await
        .expect("entry lock still held");
        assert_eq!(next.unwrap(), second);
        let moved = render.context().snapshot(entry.node()).unwrap().unwrap();
        assert!(moved.state.translate.distance(Vec3::Y) < 1e-9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_applies_do_not_interleave() {
        let (render, local, entry) = setup(Duration::from_secs(5));
        local.set_behavior(
            Lookup::BoundingBox,
            LookupBehavior::Delay(Duration::from_millis(30)),
        );
        let entry = Arc::new(entry);

        let small = object("crate", BoundingBox::new(Vec3::ZERO, 1.0, 1.0, 1.0), Vec3::ZERO);
        let large = object("crate", BoundingBox::new(Vec3::ZERO, 8.0, 8.0, 8.0), Vec3::Z);

        let a = tokio::spawn({
            let entry = Arc::clone(&entry);
            let config = small.clone();
            async move { entry.apply_config_update(config).await }
        });
        let b = tokio::spawn({
            let entry = Arc::clone(&entry);
            let config = large.clone();
            async move { entry.apply_config_update(config).await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(local.stats(Lookup::BoundingBox).peak_in_flight, 1);
        assert_eq!(local.stats(Lookup::BoundingBox).calls, 2);

        let committed = entry.config().unwrap();
        assert!(committed == small || committed == large);

        let sample = ObjectSample::lookup(
            &BoundedRegistry::new(Arc::new(LocalRegistry::new()), Duration::from_secs(1)),
            &committed,
        )
        .await
        .unwrap();
        let expected = ObjectTarget::from_sample(&sample);
        let state = render.context().snapshot(entry.node()).unwrap().unwrap().state;
        assert_eq!(state.translate, expected.translate);
        assert_eq!(state.box_geometry(), Some(expected.geometry));
    }

    #[tokio::test]
    async fn test_highlight_persists_across_applies() {
        let (render, _local, entry) = setup(Duration::from_secs(1));
        entry.highlight(0.7);
        let config = object("crate", BoundingBox::PLACEHOLDER, Vec3::ZERO);
        entry.apply_config_update(config).await.unwrap();

        let state = render.context().snapshot(entry.node()).unwrap().unwrap().state;
        assert_eq!(state.material, Material::WarnMid);
        assert_eq!(state.box_geometry().map(|g| g.height), Some(0.09999));
    }

    #[tokio::test]
    async fn test_equality_by_config() {
        let (render, local, a) = setup(Duration::from_secs(1));
        let b = ObjectEntry::new(
            render.context(),
            BoundedRegistry::new(local, Duration::from_secs(1)),
        );
        assert_ne!(a.node(), b.node());
        assert_eq!(a, b);

        let config = object("crate", BoundingBox::PLACEHOLDER, Vec3::ZERO);
        a.apply_config_update(config.clone()).await.unwrap();
        assert_ne!(a, b);
        b.apply_config_update(config).await.unwrap();
        assert_eq!(a, b);

        let set: HashSet<&ObjectEntry> = [&a, &b].into_iter().collect();
        assert_eq!(set.len(), 1);

        a.apply_config_update(object("crate", BoundingBox::PLACEHOLDER, Vec3::X))
            .await
            .unwrap();
        assert_ne!(a, b);
    }
}
