//! # Registry & Scene Constants
//!
//! Values shared by every entry kind. Changing them changes how every node
//! in the scene is derived from its snapshot.

/// Shared bound for every registry lookup (bounding box, center, rotation,
/// unit-to-root transform), in milliseconds.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 15_000;

/// Extent the registry reports for every axis when no shape is known.
pub const PLACEHOLDER_EXTENT: f64 = 0.1;

/// Node height used instead of [`PLACEHOLDER_EXTENT`] when all three extents
/// carry the placeholder. A perfect 0.1 cube collapses in the box primitive.
pub const DEGENERATE_BOX_HEIGHT: f64 = 0.09999;

/// Scope on which selected units and their probabilities arrive.
pub const DEFAULT_SELECTED_UNIT_SCOPE: &str = "/selected_units";
