//! # STAGE Registry
//!
//! Keeps scene nodes in sync with the units of an external registry.
//!
//! ## Architecture
//!
//! ```text
//!  registry update ──▶ EntryDirectory ──▶ ObjectEntry / RoomEntry
//!                                              │
//!                         ┌────────────────────┼───────────────────┐
//!                         ▼                    ▼                   ▼
//!                  per-entry lock      BoundedRegistry       RenderContext
//!                  (one apply at a     (lookups with one     (single mutation
//!                   time)               shared timeout)       per apply)
//! ```
//!
//! ## Guarantees
//!
//! 1. Applies on the same entry never interleave
//! 2. A failed apply changes neither the entry's snapshot nor its node
//! 3. Nodes are only mutated on the render thread

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod directory;
pub mod entry;
pub mod error;
pub mod local;
pub mod object;
pub mod room;

pub use client::{BoundedRegistry, LookupFuture, RegistryClient};
pub use directory::EntryDirectory;
pub use entry::{EntryCore, VisualRegistryEntry};
pub use error::{Lookup, LookupError, LookupResult, SyncError, SyncResult};
pub use local::{LocalRegistry, LookupBehavior, LookupStats};
pub use object::{highlight_material, ObjectEntry, ObjectSample, ObjectTarget};
pub use room::{visibility_category, RoomEntry, RoomOutline, RoomTarget};
