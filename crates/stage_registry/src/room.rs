//! # Room Entry
//!
//! Draws a location as a wireframe: the floor outline, the ceiling outline
//! and the vertical edges between them, all in the root frame.
//!
//! ```text
//!   ceiling[0] ─── ceiling[1]
//!       │              │          loops:  floor[i] → floor[i+1]
//!       │              │                  ceiling[i] → ceiling[i+1]
//!   floor[0] ───── floor[1]       edges:  floor[e.floor] → ceiling[e.ceiling]
//! ```
//!
//! Zones, tiles and regions follow their visibility switch. Other locations
//! keep whatever visibility they currently show.

use crate::client::BoundedRegistry;
use crate::entry::{EntryCore, VisualRegistryEntry};
use crate::error::SyncResult;
use stage_rendering::{
    NodeId, NodeShape, NodeState, RenderContext, Scene, Segment, VisibilityCategory,
};
use stage_shared::{EntityConfig, FloorCeilingEdge, LocationKind, Shape, Transform3D, Vec3};
use std::hash::{Hash, Hasher};

/// Visibility switch a location kind follows, `None` for unbound kinds.
#[must_use]
pub const fn visibility_category(kind: LocationKind) -> Option<VisibilityCategory> {
    match kind {
        LocationKind::Zone => Some(VisibilityCategory::Zones),
        LocationKind::Tile => Some(VisibilityCategory::Tiles),
        LocationKind::Region => Some(VisibilityCategory::Regions),
        LocationKind::Other => None,
    }
}

/// A location's outline in the root frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomOutline {
    /// Floor points, same order and count as the shape's floor
    pub floor: Vec<Vec3>,
    /// Ceiling points, same order and count as the shape's ceiling
    pub ceiling: Vec<Vec3>,
    /// Floor to ceiling edges, copied unchanged
    pub edges: Vec<FloorCeilingEdge>,
}

impl RoomOutline {
    /// Maps a shape's outline through a unit-to-root transform.
    #[must_use]
    pub fn from_shape(shape: &Shape, transform: &Transform3D) -> Self {
        Self {
            floor: transform.transform_points(&shape.floor),
            ceiling: transform.transform_points(&shape.ceiling),
            edges: shape.floor_ceiling_edges.clone(),
        }
    }

    /// Rebuilds every wireframe segment from scratch.
    ///
    /// Edges pointing past either outline are skipped.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments =
            Vec::with_capacity(self.floor.len() + self.ceiling.len() + self.edges.len());
        push_loop(&mut segments, &self.floor);
        push_loop(&mut segments, &self.ceiling);

        for edge in &self.edges {
            match (self.floor.get(edge.floor_index), self.ceiling.get(edge.ceiling_index)) {
                (Some(&from), Some(&to)) => segments.push(Segment::new(from, to)),
                _ => tracing::warn!(
                    floor_index = edge.floor_index,
                    ceiling_index = edge.ceiling_index,
                    floor_points = self.floor.len(),
                    ceiling_points = self.ceiling.len(),
                    "floor-ceiling edge references a missing point"
                ),
            }
        }
        segments
    }
}

fn push_loop(segments: &mut Vec<Segment>, points: &[Vec3]) {
    if points.len() < 2 {
        return;
    }
    let next = points.iter().cycle().skip(1);
    segments.extend(points.iter().zip(next).map(|(&from, &to)| Segment::new(from, to)));
}

/// Wireframe state a location's node is brought to.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomTarget {
    /// Switch to follow, `None` to keep the current visibility
    pub category: Option<VisibilityCategory>,
    /// Full segment set
    pub segments: Vec<Segment>,
}

impl RoomTarget {
    /// Pure mapping from a snapshot and its unit-to-root transform.
    #[must_use]
    pub fn build(config: &EntityConfig, transform: &Transform3D) -> Self {
        let category = config.location_kind().and_then(visibility_category);
        let outline = RoomOutline::from_shape(&config.placement.shape, transform);
        Self {
            category,
            segments: outline.segments(),
        }
    }

    /// Writes the target into a node.
    pub fn apply_to(self, scene: &mut Scene, node: NodeId) {
        match self.category {
            Some(category) => scene.bind_visibility(node, category),
            None => scene.unbind_visibility(node),
        }
        let Some(state) = scene.node_mut(node) else {
            tracing::debug!(node = node.raw(), "room node already detached");
            return;
        };
        state.shape = NodeShape::Wireframe(self.segments);
    }
}

/// Entry for a location.
#[derive(Debug)]
pub struct RoomEntry {
    core: EntryCore,
}

impl RoomEntry {
    /// Creates the entry and its (hidden, empty) wireframe node.
    #[must_use]
    pub fn new(render: RenderContext, registry: BoundedRegistry) -> Self {
        Self {
            core: EntryCore::new("room", render, registry, NodeState::hidden_wireframe()),
        }
    }
}

impl VisualRegistryEntry for RoomEntry {
    async fn apply_config_update(&self, config: EntityConfig) -> SyncResult<EntityConfig> {
        let _exclusive = self.core.serialize().await;

        let transform = match self.core.registry().local_to_global_transform(&config).await {
            Ok(transform) => transform,
            Err(source) => return Err(self.core.fail(&config, source)),
        };

        let target = RoomTarget::build(&config, &transform);
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

impl PartialEq for RoomEntry {
    fn eq(&self, other: &Self) -> bool {
        self.core == other.core
    }
}

impl Eq for RoomEntry {}

impl Hash for RoomEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core.hash(state);
    }
}
