//! Visibility switches driven by the UI.
//!
//! Three switches exist, one per location category. Nodes subscribe to a
//! switch by binding their visibility to it (see [`crate::Scene`]); the
//! switches themselves live on the render thread, with an atomic mirror for
//! readers on other threads.

use crate::context::RenderContext;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Category a location node can be shown or hidden by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityCategory {
    /// Zone outlines
    Zones,
    /// Tile outlines
    Tiles,
    /// Region outlines
    Regions,
}

impl VisibilityCategory {
    /// Number of categories.
    pub const COUNT: usize = 3;

    /// Every category, in switch order.
    pub const ALL: [Self; Self::COUNT] = [Self::Zones, Self::Tiles, Self::Regions];

    /// Position of the category's switch.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Zones => 0,
            Self::Tiles => 1,
            Self::Regions => 2,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zones => "zones",
            Self::Tiles => "tiles",
            Self::Regions => "regions",
        }
    }
}

/// Handle to the three visibility switches.
///
/// Cloning is cheap; every clone controls the same switches.
#[derive(Clone)]
pub struct VisibilityToggles {
    context: RenderContext,
    mirror: Arc<[AtomicBool; VisibilityCategory::COUNT]>,
}

impl VisibilityToggles {
    /// Creates the switches with their initial values (zones, tiles, regions).
    #[must_use]
    pub fn new(context: RenderContext, initial: [bool; VisibilityCategory::COUNT]) -> Self {
        let toggles = Self {
            context,
            mirror: Arc::new(initial.map(AtomicBool::new)),
        };
        for category in VisibilityCategory::ALL {
            toggles.publish(category);
        }
        toggles
    }

    /// Flips a switch. Every node bound to it follows on the render thread.
    pub fn set(&self, category: VisibilityCategory, on: bool) {
        self.mirror[category.index()].store(on, Ordering::Release);
        self.publish(category);
    }

    /// Last value set for a switch.
    #[must_use]
    pub fn get(&self, category: VisibilityCategory) -> bool {
        self.mirror[category.index()].load(Ordering::Acquire)
    }

    // The render thread reads the mirror when the job runs, so racing `set`
    // calls converge on the last stored value.
    fn publish(&self, category: VisibilityCategory) {
        let mirror = Arc::clone(&self.mirror);
        self.context.run_on_render_thread(move |scene| {
            scene.set_switch(category, mirror[category.index()].load(Ordering::Acquire));
        });
    }
}

impl fmt::Debug for VisibilityToggles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityToggles")
            .field("zones", &self.get(VisibilityCategory::Zones))
            .field("tiles", &self.get(VisibilityCategory::Tiles))
            .field("regions", &self.get(VisibilityCategory::Regions))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderThread;
    use crate::scene::NodeState;

    #[test]
    fn test_initial_values_reach_the_scene() {
        let render = RenderThread::spawn(None).unwrap();
        let toggles = VisibilityToggles::new(render.context(), [true, false, true]);

        assert!(toggles.get(VisibilityCategory::Zones));
        assert!(!toggles.get(VisibilityCategory::Tiles));

        let switches = render
            .context()
            .with_scene(|scene| VisibilityCategory::ALL.map(|c| scene.switch(c)))
            .unwrap();
        assert_eq!(switches, [true, false, true]);
    }

    #[test]
    fn test_bound_node_follows_toggle() {
        let render = RenderThread::spawn(None).unwrap();
        let ctx = render.context();
        let toggles = VisibilityToggles::new(ctx.clone(), [false; 3]);

        let node = ctx.create_node(NodeState::hidden_wireframe());
        ctx.run_on_render_thread(move |scene| {
            scene.bind_visibility(node, VisibilityCategory::Tiles);
        });
        assert!(!ctx.snapshot(node).unwrap().unwrap().visible);

        toggles.set(VisibilityCategory::Tiles, true);
        assert!(ctx.snapshot(node).unwrap().unwrap().visible);

        toggles.set(VisibilityCategory::Tiles, false);
        assert!(!ctx.snapshot(node).unwrap().unwrap().visible);
    }
}
