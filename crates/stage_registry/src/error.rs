//! # Registry Error Types
//!
//! Two layers: [`LookupError`] describes why a single registry query did not
//! produce a value, [`SyncError`] is what an entry reports to its owner.

use stage_shared::EntityId;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The registry queries an entry issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// Bounding box of a unit
    BoundingBox,
    /// Center of a unit in the root frame
    GlobalCenter,
    /// Rotation of a unit relative to the root frame
    GlobalRotation,
    /// Transform from a unit's frame to the root frame
    LocalToGlobalTransform,
}

impl Lookup {
    /// Short name for logs and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BoundingBox => "bounding box",
            Self::GlobalCenter => "global center",
            Self::GlobalRotation => "global rotation",
            Self::LocalToGlobalTransform => "local-to-global transform",
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a registry lookup produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The lookup did not finish within the shared timeout.
    #[error("{lookup} lookup timed out after {timeout:?}")]
    TimedOut {
        /// Query that timed out.
        lookup: Lookup,
        /// Bound that was exceeded.
        timeout: Duration,
    },

    /// The lookup was cancelled before producing a value.
    #[error("{lookup} lookup was cancelled")]
    Cancelled {
        /// Query that was cancelled.
        lookup: Lookup,
    },

    /// The registry raised an error while computing the value.
    #[error("{lookup} lookup failed: {reason}")]
    Failed {
        /// Query that failed.
        lookup: Lookup,
        /// Registry-side description.
        reason: String,
    },
}

impl LookupError {
    /// Query the error belongs to.
    #[must_use]
    pub const fn lookup(&self) -> Lookup {
        match self {
            Self::TimedOut { lookup, .. }
            | Self::Cancelled { lookup }
            | Self::Failed { lookup, .. } => *lookup,
        }
    }
}

/// Errors reported by a visual registry entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A field was requested before the first successful apply.
    #[error("{0} not available before the first successful update")]
    NotAvailable(&'static str),

    /// An apply failed; the entry still holds its previous state.
    #[error("applying update for {id} failed: {source}")]
    ApplyFailed {
        /// Unit whose update failed.
        id: EntityId,
        /// Lookup that caused the failure.
        #[source]
        source: LookupError,
    },
}

/// Result type for single registry lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Result type for entry operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_lookup() {
        let err = SyncError::ApplyFailed {
            id: EntityId::new("chair"),
            source: LookupError::TimedOut {
                lookup: Lookup::GlobalRotation,
                timeout: Duration::from_millis(20),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("chair"), "{msg}");
        assert!(msg.contains("global rotation"), "{msg}");

        assert_eq!(
            SyncError::NotAvailable("Config").to_string(),
            "Config not available before the first successful update"
        );
    }

    #[test]
    fn test_lookup_accessor() {
        let err = LookupError::Cancelled {
            lookup: Lookup::BoundingBox,
        };
        assert_eq!(err.lookup(), Lookup::BoundingBox);
    }
}
