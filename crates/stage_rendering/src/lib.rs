//! # STAGE Rendering
//!
//! The scene graph and the single thread that is allowed to mutate it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   run_on_render_thread   ┌───────────────────────────┐
//! │ any thread   │ ───────────────────────▶ │ mutation queue (FIFO)     │
//! │ (entries,    │                          └─────────────┬─────────────┘
//! │  toggles)    │                                        ▼
//! └──────────────┘                          ┌───────────────────────────┐
//!                                           │ render thread owns Scene  │
//!                                           │  • nodes                  │
//!                                           │  • visibility switches    │
//!                                           └───────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. `Scene` is only reachable from inside a submitted closure
//! 2. Submissions run in the order they were enqueued
//! 3. Nobody waits for a mutation, except explicit fences (`flush`, `snapshot`)

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod palette;
pub mod scene;
pub mod visibility;

pub use context::{RenderContext, RenderThread};
pub use error::{RenderError, RenderResult};
pub use palette::Material;
pub use scene::{
    BoxGeometry, NodeId, NodeShape, NodeSnapshot, NodeState, Scene, Segment, Visibility,
};
pub use visibility::{VisibilityCategory, VisibilityToggles};
