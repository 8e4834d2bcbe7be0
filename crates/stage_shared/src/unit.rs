//! Entity snapshots as the registry publishes them.
//!
//! An [`EntityConfig`] is immutable: every registry revision of a unit is a
//! new value. Equality and hashing cover the whole snapshot (not just the
//! id), so two snapshots are equal only when they are bit-identical.

use crate::math::{BoundingBox, Quaternion, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable registry identifier of a unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps a registry identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of spatial boundary a location describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Large area grouping several tiles
    Zone,
    /// Walkable room-like area
    Tile,
    /// Sub-area inside a tile
    Region,
    /// Anything the scene has no visibility toggle for
    Other,
}

/// Classification of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    /// Physical object, drawn as a box
    Object,
    /// Spatial boundary, drawn as a wireframe outline
    Location(LocationKind),
}

/// Link between a floor outline point and a ceiling outline point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorCeilingEdge {
    /// Index into [`Shape::floor`]
    pub floor_index: usize,
    /// Index into [`Shape::ceiling`]
    pub ceiling_index: usize,
}

impl FloorCeilingEdge {
    /// Creates an edge.
    #[must_use]
    pub const fn new(floor_index: usize, ceiling_index: usize) -> Self {
        Self { floor_index, ceiling_index }
    }
}

/// Shape of a unit in its own (local) frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Bounding box of the unit
    pub bounding_box: BoundingBox,
    /// Floor outline, in drawing order
    #[serde(default)]
    pub floor: Vec<Vec3>,
    /// Ceiling outline, in drawing order
    #[serde(default)]
    pub ceiling: Vec<Vec3>,
    /// Vertical edges between floor and ceiling outlines
    #[serde(default)]
    pub floor_ceiling_edges: Vec<FloorCeilingEdge>,
}

/// Where a unit sits relative to its parent location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Offset from the parent frame
    pub position: Vec3,
    /// Rotation relative to the parent frame
    pub rotation: Quaternion,
    /// Shape in the unit's own frame
    pub shape: Shape,
    /// Parent location, `None` for the root
    #[serde(default)]
    pub parent: Option<EntityId>,
}

/// Immutable snapshot of one unit's registry state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Stable identifier
    pub id: EntityId,
    /// Human readable label
    pub label: String,
    /// Object or location classification
    pub class: UnitClass,
    /// Position, rotation and shape
    pub placement: Placement,
}

impl EntityConfig {
    /// Snapshot of a physical object with default placement.
    #[must_use]
    pub fn object(id: impl Into<EntityId>) -> Self {
        Self::with_class(id.into(), UnitClass::Object)
    }

    /// Snapshot of a location with default placement.
    #[must_use]
    pub fn location(id: impl Into<EntityId>, kind: LocationKind) -> Self {
        Self::with_class(id.into(), UnitClass::Location(kind))
    }

    fn with_class(id: EntityId, class: UnitClass) -> Self {
        Self {
            label: id.as_str().to_owned(),
            id,
            class,
            placement: Placement::default(),
        }
    }

    /// Replaces the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replaces the placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Location kind, `None` for objects.
    #[must_use]
    pub fn location_kind(&self) -> Option<LocationKind> {
        match self.class {
            UnitClass::Object => None,
            UnitClass::Location(kind) => Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_snapshot_equality_covers_content() {
        let a = EntityConfig::object("lamp").with_label("Lamp");
        let b = EntityConfig::object("lamp").with_label("Lamp");
        let c = EntityConfig::object("lamp").with_label("Desk lamp");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_location_kind() {
        assert_eq!(EntityConfig::object("o").location_kind(), None);
        assert_eq!(
            EntityConfig::location("kitchen", LocationKind::Tile).location_kind(),
            Some(LocationKind::Tile)
        );
    }

    #[test]
    fn test_placement_point_changes_break_equality() {
        let mut placement = Placement::default();
        let a = EntityConfig::object("o").with_placement(placement.clone());
        placement.position = Vec3::new(0.0, 0.0, 1e-12);
        let b = EntityConfig::object("o").with_placement(placement);
        assert_ne!(a, b);
    }
}
