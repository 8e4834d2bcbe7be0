//! Scene graph owned by the render thread.
//!
//! A [`Scene`] value only ever exists on the render thread. Everything else
//! refers to nodes through their [`NodeId`].

use crate::palette::Material;
use crate::visibility::VisibilityCategory;
use stage_shared::Vec3;
use std::collections::HashMap;

/// Stable identity of a scene node.
///
/// Ids are handed out by the render context on the submitting thread, so an
/// owner knows its node's id before the node exists on the render thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a node id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Where a node's visible flag comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Set directly on the node.
    Manual(bool),
    /// Follows one of the scene's visibility switches.
    Bound(VisibilityCategory),
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Manual(false)
    }
}

/// Extents of a box primitive in scene axes (y is up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    /// Extent along x
    pub width: f64,
    /// Extent along y
    pub height: f64,
    /// Extent along z
    pub depth: f64,
}

impl BoxGeometry {
    /// Size of a freshly created box primitive.
    pub const UNIT: Self = Self { width: 2.0, height: 2.0, depth: 2.0 };
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self::UNIT
    }
}

/// One line of a wireframe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Start point
    pub from: Vec3,
    /// End point
    pub to: Vec3,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub const fn new(from: Vec3, to: Vec3) -> Self {
        Self { from, to }
    }
}

/// Geometry of a node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeShape {
    /// Solid box
    Box(BoxGeometry),
    /// Set of line segments
    Wireframe(Vec<Segment>),
}

/// Full mutable state of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    /// Visible flag or its binding
    pub visibility: Visibility,
    /// Translation
    pub translate: Vec3,
    /// Axis used by `rotate`
    pub rotation_axis: Vec3,
    /// Rotation around `rotation_axis`, in degrees
    pub rotate: f64,
    /// Geometry
    pub shape: NodeShape,
    /// Surface material
    pub material: Material,
}

impl NodeState {
    /// Invisible box with default size and material.
    #[must_use]
    pub fn hidden_box() -> Self {
        Self::hidden(NodeShape::Box(BoxGeometry::UNIT))
    }

    /// Invisible, empty wireframe.
    #[must_use]
    pub fn hidden_wireframe() -> Self {
        Self::hidden(NodeShape::Wireframe(Vec::new()))
    }

    fn hidden(shape: NodeShape) -> Self {
        Self {
            visibility: Visibility::Manual(false),
            translate: Vec3::ZERO,
            rotation_axis: Vec3::Z,
            rotate: 0.0,
            shape,
            material: Material::Default,
        }
    }

    /// Box extents, `None` for wireframes.
    #[must_use]
    pub fn box_geometry(&self) -> Option<BoxGeometry> {
        match &self.shape {
            NodeShape::Box(geometry) => Some(*geometry),
            NodeShape::Wireframe(_) => None,
        }
    }

    /// Wireframe segments, empty for boxes.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        match &self.shape {
            NodeShape::Box(_) => &[],
            NodeShape::Wireframe(segments) => segments,
        }
    }
}

/// Copy of a node's state with its visibility resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    /// Node state at the time of the snapshot
    pub state: NodeState,
    /// Effective visible flag
    pub visible: bool,
}

/// All nodes plus the visibility switches they may be bound to.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, NodeState>,
    switches: [bool; VisibilityCategory::COUNT],
}

impl Scene {
    /// Creates an empty scene with every switch off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::with_capacity(256),
            switches: [false; VisibilityCategory::COUNT],
        }
    }

    /// Attaches a node. An existing node with the same id is replaced.
    pub fn insert(&mut self, id: NodeId, state: NodeState) {
        self.nodes.insert(id, state);
    }

    /// Detaches a node and returns its last state.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeState> {
        self.nodes.remove(&id)
    }

    /// Returns a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.get(&id)
    }

    /// Returns a node for mutation.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeState> {
        self.nodes.get_mut(&id)
    }

    /// Number of attached nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current value of a visibility switch.
    #[must_use]
    pub fn switch(&self, category: VisibilityCategory) -> bool {
        self.switches[category.index()]
    }

    pub(crate) fn set_switch(&mut self, category: VisibilityCategory, on: bool) {
        self.switches[category.index()] = on;
    }

    /// Effective visibility of a node; detached nodes are invisible.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| self.resolve(node.visibility))
    }

    fn resolve(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Manual(on) => on,
            Visibility::Bound(category) => self.switch(category),
        }
    }

    /// Sets the visible flag directly, dropping any binding.
    pub fn set_visible(&mut self, id: NodeId, on: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visibility = Visibility::Manual(on);
        }
    }

    /// Makes a node follow a visibility switch.
    pub fn bind_visibility(&mut self, id: NodeId, category: VisibilityCategory) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visibility = Visibility::Bound(category);
        }
    }

    /// Stops following a switch. The node keeps the value it currently shows.
    pub fn unbind_visibility(&mut self, id: NodeId) {
        let Some(visibility) = self.nodes.get(&id).map(|node| node.visibility) else {
            return;
        };
        let current = self.resolve(visibility);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visibility = Visibility::Manual(current);
        }
    }

    /// Clone of a node with its visibility resolved.
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        self.nodes.get(&id).map(|node| NodeSnapshot {
            state: node.clone(),
            visible: self.resolve(node.visibility),
        })
    }
}
