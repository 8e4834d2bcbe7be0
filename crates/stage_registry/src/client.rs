//! # Registry Client
//!
//! The registry answers geometry questions about a unit snapshot. Every
//! answer is asynchronous and may time out, fail or be cancelled.
//!
//! [`RegistryClient`] is the raw, object-safe query surface.
//! [`BoundedRegistry`] wraps a shared client and puts the same timeout on
//! every query, which is how entries talk to the registry.

use crate::error::{Lookup, LookupError, LookupResult};
use stage_shared::{AxisAngle, BoundingBox, EntityConfig, Transform3D, Vec3};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Future returned by a registry lookup.
pub type LookupFuture<'a, T> = Pin<Box<dyn Future<Output = LookupResult<T>> + Send + 'a>>;

/// Geometry queries against the registry.
///
/// Implementations are shared read-only between every entry. A future that
/// is dropped before completion must not leave anything behind.
pub trait RegistryClient: Send + Sync {
    /// Bounding box of the unit, in registry axes (depth is y, height is z).
    fn bounding_box<'a>(&'a self, config: &'a EntityConfig) -> LookupFuture<'a, BoundingBox>;

    /// Center of the unit's bounding box in the root frame.
    fn global_center<'a>(&'a self, config: &'a EntityConfig) -> LookupFuture<'a, Vec3>;

    /// Rotation of the unit relative to the root frame.
    fn global_rotation<'a>(&'a self, config: &'a EntityConfig) -> LookupFuture<'a, AxisAngle>;

    /// Transform from the unit's own frame to the root frame.
    fn local_to_global_transform<'a>(
        &'a self,
        config: &'a EntityConfig,
    ) -> LookupFuture<'a, Transform3D>;
}

/// A shared registry client whose every query is bounded by one timeout.
#[derive(Clone)]
pub struct BoundedRegistry {
    client: Arc<dyn RegistryClient>,
    timeout: Duration,
}

impl BoundedRegistry {
    /// Wraps a client.
    #[must_use]
    pub fn new(client: Arc<dyn RegistryClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Bound applied to each lookup.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bounded [`RegistryClient::bounding_box`].
    ///
    /// # Errors
    ///
    /// Any [`LookupError`]; exceeding the timeout yields
    /// [`LookupError::TimedOut`].
    pub async fn bounding_box(&self, config: &EntityConfig) -> LookupResult<BoundingBox> {
        self.bounded(Lookup::BoundingBox, self.client.bounding_box(config))
            .await
    }

    /// Bounded [`RegistryClient::global_center`].
    ///
    /// # Errors
    ///
    /// See [`BoundedRegistry::bounding_box`].
    pub async fn global_center(&self, config: &EntityConfig) -> LookupResult<Vec3> {
        self.bounded(Lookup::GlobalCenter, self.client.global_center(config))
            .await
    }

    /// Bounded [`RegistryClient::global_rotation`].
    ///
    /// # Errors
    ///
    /// See [`BoundedRegistry::bounding_box`].
    pub async fn global_rotation(&self, config: &EntityConfig) -> LookupResult<AxisAngle> {
        self.bounded(Lookup::GlobalRotation, self.client.global_rotation(config))
            .await
    }

    /// Bounded [`RegistryClient::local_to_global_transform`].
    ///
    /// # Errors
    ///
    /// See [`BoundedRegistry::bounding_box`].
    pub async fn local_to_global_transform(
        &self,
        config: &EntityConfig,
    ) -> LookupResult<Transform3D> {
        self.bounded(
            Lookup::LocalToGlobalTransform,
            self.client.local_to_global_transform(config),
        )
        .await
    }

    async fn bounded<T>(&self, lookup: Lookup, future: LookupFuture<'_, T>) -> LookupResult<T> {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result,
            Err(_elapsed) => Err(LookupError::TimedOut {
                lookup,
                timeout: self.timeout,
            }),
        }
    }
}

impl fmt::Debug for BoundedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedRegistry")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{LocalRegistry, LookupBehavior};

    fn registry(local: LocalRegistry, timeout_ms: u64) -> BoundedRegistry {
        BoundedRegistry::new(Arc::new(local), Duration::from_millis(timeout_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out() {
        let local = LocalRegistry::new();
        local.set_behavior(
            Lookup::BoundingBox,
            LookupBehavior::Delay(Duration::from_secs(60)),
        );
        let bounded = registry(local, 50);

        let err = bounded
            .bounding_box(&EntityConfig::object("crate"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LookupError::TimedOut {
                lookup: Lookup::BoundingBox,
                timeout: Duration::from_millis(50),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_within_bound_succeeds() {
        let local = LocalRegistry::new();
        local.set_behavior(
            Lookup::GlobalCenter,
            LookupBehavior::Delay(Duration::from_millis(10)),
        );
        let bounded = registry(local, 50);

        let center = bounded
            .global_center(&EntityConfig::object("crate"))
            .await
            .unwrap();
        assert_eq!(center, stage_shared::BoundingBox::default().center());
    }

    #[tokio::test]
    async fn test_cancel_and_failure_pass_through() {
        let local = LocalRegistry::new();
        local.set_behavior(Lookup::GlobalRotation, LookupBehavior::Cancel);
        local.set_behavior(
            Lookup::LocalToGlobalTransform,
            LookupBehavior::Fail("no parent".into()),
        );
        let bounded = registry(local, 1_000);
        let config = EntityConfig::object("crate");

        assert!(matches!(
            bounded.global_rotation(&config).await,
            Err(LookupError::Cancelled { .. })
        ));
        assert!(matches!(
            bounded.local_to_global_transform(&config).await,
            Err(LookupError::Failed { reason, .. }) if reason == "no parent"
        ));
    }
}
