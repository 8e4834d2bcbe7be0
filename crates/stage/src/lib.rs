//! # STAGE
//!
//! A 3D scene kept in sync with a unit registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                STAGE                                │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │   EventSender ──▶ EventBus ──▶ Stage::pump / Stage::handle          │
//! │                                   │                                 │
//! │              ┌────────────────────┼────────────────────┐            │
//! │              ▼                    ▼                    ▼            │
//! │     EntryDirectory<Object> EntryDirectory<Room>  VisibilityToggles  │
//! │              │                    │                    │            │
//! │              └─────────┬──────────┘                    │            │
//! │                        ▼                               │            │
//! │              BoundedRegistry (lookups)                 │            │
//! │                        │                               │            │
//! │                        ▼                               ▼            │
//! │              RenderThread ◀── one mutation per apply / toggle       │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `events`: Update, removal and selection events
//! - `stage`: The façade wiring everything together

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod stage;

// Re-export the layers
pub use stage_registry as registry;
pub use stage_rendering as rendering;
pub use stage_shared as shared;

pub use config::{
    EventsSection, RegistrySection, RenderSection, SelectionSection, StageConfig,
    VisibilitySection,
};
pub use error::{ConfigError, ConfigResult, StageError, StageResult};
pub use events::{EventBus, EventReceiver, EventSender, StageEvent};
pub use stage::{Outcome, PumpReport, Stage};
