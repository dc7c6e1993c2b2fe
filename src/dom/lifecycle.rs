//! Element lifecycle: connect and disconnect bookkeeping.
//!
//! The `LifecycleTracker` records which upgraded elements have had their
//! connect callback delivered, so each connect is matched by exactly one
//! disconnect. It keeps no history.

use std::collections::HashSet;

use super::node::NodeId;

/// Lifecycle state shared by every element kind.
///
/// `Unattached → Attached → Detached`; attaching a detached element again
/// starts a fresh lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementState {
    #[default]
    Unattached,
    Attached,
    Detached,
}

// ---------------------------------------------------------------------------
// LifecycleTracker
// ---------------------------------------------------------------------------

/// Tracks which elements are currently connected.
///
/// The document consults the tracker before delivering callbacks so that a
/// node moved around during another element's connect callback is never
/// connected twice.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    connected: HashSet<NodeId>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a node has been connected.
    ///
    /// Returns `false` if it already was.
    pub fn on_connect(&mut self, id: NodeId) -> bool {
        self.connected.insert(id)
    }

    /// Record that a node has been disconnected.
    ///
    /// Returns `false` if it was not connected.
    pub fn on_disconnect(&mut self, id: NodeId) -> bool {
        self.connected.remove(&id)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.connected.contains(&id)
    }

    /// The number of currently connected elements.
    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    /// Forget a destroyed node.
    pub fn forget(&mut self, id: NodeId) {
        self.connected.remove(&id);
    }
}
