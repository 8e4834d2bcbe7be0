//! # STAGE Shared
//!
//! Common types used by both the registry synchronization layer and the
//! scene.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - the render thread or anything that owns scene nodes
//! - an async runtime
//!
//! If you need scene types, put them in `stage_rendering`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;
pub mod unit;

pub use constants::{
    DEFAULT_LOOKUP_TIMEOUT_MS, DEFAULT_SELECTED_UNIT_SCOPE, DEGENERATE_BOX_HEIGHT,
    PLACEHOLDER_EXTENT,
};
pub use math::{AxisAngle, BoundingBox, Quaternion, Transform3D, Vec3};
pub use unit::{
    EntityConfig, EntityId, FloorCeilingEdge, LocationKind, Placement, Shape, UnitClass,
};
