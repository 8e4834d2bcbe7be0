//! The exclusive rendering context.
//!
//! One OS thread owns the [`Scene`]. Every mutation is a closure sent through
//! a FIFO channel and executed on that thread, in submission order.
//!
//! ```text
//! entry A ──┐
//! entry B ──┼──▶ [Run(job) | Run(job) | ... | Shutdown] ──▶ render thread
//! toggles ──┘
//! ```

use crate::error::{RenderError, RenderResult};
use crate::scene::{NodeId, NodeSnapshot, NodeState, Scene};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{JoinHandle, ThreadId};

/// A mutation (or query) executed on the render thread.
pub type RenderJob = Box<dyn FnOnce(&mut Scene) + Send + 'static>;

enum Command {
    Run(RenderJob),
    Shutdown,
}

/// Submission handle for the render thread.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Clone)]
pub struct RenderContext {
    sender: Sender<Command>,
    next_node: Arc<AtomicU64>,
    render_thread: ThreadId,
}

impl RenderContext {
    /// Schedules a mutation. Fire-and-forget: the caller never learns when
    /// (or whether) it ran.
    ///
    /// With a bounded queue this blocks while the queue is full.
    pub fn run_on_render_thread<F>(&self, mutation: F)
    where
        F: FnOnce(&mut Scene) + Send + 'static,
    {
        if self.sender.send(Command::Run(Box::new(mutation))).is_err() {
            tracing::warn!("render thread has stopped, dropping scene mutation");
        }
    }

    /// Allocates a node id and schedules the node's creation.
    ///
    /// The id is valid immediately; mutations submitted afterwards are
    /// guaranteed to see the node.
    #[must_use]
    pub fn create_node(&self, initial: NodeState) -> NodeId {
        let id = NodeId::new(self.next_node.fetch_add(1, Ordering::Relaxed));
        self.run_on_render_thread(move |scene| scene.insert(id, initial));
        id
    }

    /// Schedules the removal of a node from the scene.
    pub fn detach_node(&self, node: NodeId) {
        self.run_on_render_thread(move |scene| {
            scene.detach(node);
        });
    }

    /// True when called from the render thread.
    #[must_use]
    pub fn is_render_thread(&self) -> bool {
        std::thread::current().id() == self.render_thread
    }

    /// Runs a read-only query on the render thread and waits for its result.
    ///
    /// Every mutation submitted before this call has run when `query` runs.
    ///
    /// # Errors
    ///
    /// [`RenderError::OnRenderThread`] when called from the render thread
    /// (it would wait on itself), [`RenderError::Stopped`] when the render
    /// thread is gone.
    pub fn with_scene<R, F>(&self, query: F) -> RenderResult<R>
    where
        F: FnOnce(&Scene) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_render_thread() {
            return Err(RenderError::OnRenderThread);
        }
        let (reply, result) = bounded(1);
        let job: RenderJob = Box::new(move |scene| {
            let _ = reply.send(query(scene));
        });
        self.sender
            .send(Command::Run(job))
            .map_err(|_| RenderError::Stopped)?;
        result.recv().map_err(|_| RenderError::Stopped)
    }

    /// Copy of a node once every earlier mutation has run.
    ///
    /// # Errors
    ///
    /// See [`RenderContext::with_scene`].
    pub fn snapshot(&self, node: NodeId) -> RenderResult<Option<NodeSnapshot>> {
        self.with_scene(move |scene| scene.snapshot(node))
    }

    /// Waits until every mutation submitted so far has run.
    ///
    /// # Errors
    ///
    /// See [`RenderContext::with_scene`].
    pub fn flush(&self) -> RenderResult<()> {
        self.with_scene(|_| ())
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("render_thread", &self.render_thread)
            .field("queued", &self.sender.len())
            .finish_non_exhaustive()
    }
}

/// Owner of the render thread.
///
/// Dropping it shuts the thread down after the queue has drained.
pub struct RenderThread {
    context: RenderContext,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Starts the render thread.
    ///
    /// `queue_capacity` bounds the mutation queue; `None` means unbounded.
    ///
    /// # Errors
    ///
    /// [`RenderError::Spawn`] when the OS refuses to start the thread.
    pub fn spawn(queue_capacity: Option<usize>) -> RenderResult<Self> {
        let (sender, receiver) = match queue_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let handle = std::thread::Builder::new()
            .name("stage-render".to_owned())
            .spawn(move || run(&receiver))?;

        let context = RenderContext {
            sender,
            next_node: Arc::new(AtomicU64::new(1)),
            render_thread: handle.thread().id(),
        };
        Ok(Self {
            context,
            handle: Some(handle),
        })
    }

    /// Returns a submission handle.
    #[must_use]
    pub fn context(&self) -> RenderContext {
        self.context.clone()
    }

    /// Drains the queue and joins the render thread.
    ///
    /// # Errors
    ///
    /// [`RenderError::Stopped`] when the render thread panicked.
    pub fn shutdown(mut self) -> RenderResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> RenderResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.context.sender.send(Command::Shutdown);
        handle.join().map_err(|_| RenderError::Stopped)
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if self.stop().is_err() {
            tracing::warn!("render thread panicked before shutdown");
        }
    }
}

impl fmt::Debug for RenderThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderThread")
            .field("context", &self.context)
            .field("running", &self.handle.is_some())
            .finish()
    }
}

fn run(receiver: &Receiver<Command>) {
    let mut scene = Scene::new();
    tracing::debug!("render thread started");

    for command in receiver {
        match command {
            Command::Run(job) => job(&mut scene),
            Command::Shutdown => break,
        }
    }

    tracing::debug!(nodes = scene.len(), "render thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Material;

    #[test]
    fn test_mutations_run_in_submission_order() {
        let render = RenderThread::spawn(None).unwrap();
        let ctx = render.context();
        let node = ctx.create_node(NodeState::hidden_box());

        for material in Material::HIGHLIGHTS {
            ctx.run_on_render_thread(move |scene| {
                if let Some(state) = scene.node_mut(node) {
                    state.material = material;
                }
            });
        }

        let snapshot = ctx.snapshot(node).unwrap().unwrap();
        assert_eq!(snapshot.state.material, Material::Best);
    }

    #[test]
    fn test_node_ids_are_unique() {
        let render = RenderThread::spawn(None).unwrap();
        let ctx = render.context();
        let a = ctx.create_node(NodeState::hidden_box());
        let b = ctx.create_node(NodeState::hidden_wireframe());
        assert_ne!(a, b);
        assert_eq!(ctx.with_scene(Scene::len).unwrap(), 2);
    }

    #[test]
    fn test_fence_from_render_thread_is_rejected() {
        let render = RenderThread::spawn(None).unwrap();
        let ctx = render.context();
        let inner = ctx.clone();
        let (tx, rx) = bounded(1);
        ctx.run_on_render_thread(move |_| {
            let _ = tx.send(inner.flush());
        });
        assert!(matches!(rx.recv().unwrap(), Err(RenderError::OnRenderThread)));
    }

    #[test]
    fn test_stopped_thread_rejects_fences() {
        let render = RenderThread::spawn(Some(8)).unwrap();
        let ctx = render.context();
        let node = ctx.create_node(NodeState::hidden_box());
        render.shutdown().unwrap();

        assert!(matches!(ctx.snapshot(node), Err(RenderError::Stopped)));
        // Fire-and-forget submissions are dropped silently.
        ctx.detach_node(node);
    }

    #[test]
    fn test_detach_removes_node() {
        let render = RenderThread::spawn(None).unwrap();
        let ctx = render.context();
        let node = ctx.create_node(NodeState::hidden_box());
        ctx.detach_node(node);
        assert_eq!(ctx.snapshot(node).unwrap(), None);
    }
}
