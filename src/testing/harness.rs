//! Harness: drive a headless [`Document`] the way a user and a host would.
//!
//! The harness bundles the steps tests repeat: mounting markup under the
//! root, simulating typing into inputs, firing events, delivering queued
//! mutation records, and letting debounce windows elapse.

use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::{Error, MarkupError};
use crate::event::{Event, InputDetail, INPUT};
use crate::parts::property_input::write_input;
use crate::registry;

/// A document with every built-in part defined.
///
/// # Examples
///
/// ```ignore
/// use cards_ui::testing::Harness;
///
/// let harness = Harness::new();
/// let item = harness.mount(r#"<count-view count="1"></count-view>"#)?;
/// harness.set_attribute(item, "count", "2");
/// assert_eq!(harness.attribute(item, "count").as_deref(), Some("2"));
/// ```
pub struct Harness {
    doc: Document,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let doc = Document::with_config(config);
        registry::register_parts(&doc);
        Self { doc }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    // ── Tree ─────────────────────────────────────────────────────────

    /// Append `markup` to the root and return the first top-level node.
    pub fn mount(&self, markup: &str) -> Result<NodeId, MarkupError> {
        let nodes = self.doc.append_markup(self.doc.body(), markup)?;
        self.doc.flush();
        nodes
            .into_iter()
            .next()
            .ok_or_else(|| MarkupError::UnexpectedEof("no element in mounted markup".into()))
    }

    /// Detach `node` from its parent, keeping it alive for re-attachment.
    pub fn remove(&self, node: NodeId) -> bool {
        let removed = self.doc.remove_child(node);
        self.doc.flush();
        removed
    }

    /// Re-attach a removed node under `parent`.
    pub fn attach(&self, parent: NodeId, node: NodeId) {
        self.doc.append_child(parent, node);
        self.doc.flush();
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.doc.set_attribute(node, name, value);
        self.doc.flush();
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Set an input's value and fire the `input` event a user edit would.
    pub fn type_into(&self, input: NodeId, value: &str) {
        write_input(&self.doc, input, value);
        self.doc.dispatch_event(&Event::bubbling(INPUT, input).with_detail(InputDetail {
            value: value.to_owned(),
        }));
    }

    /// Fire a bubbling event with no detail at `target`.
    pub fn dispatch(&self, name: &str, target: NodeId) -> usize {
        self.doc.dispatch_event(&Event::bubbling(name, target))
    }

    // ── Delivery ─────────────────────────────────────────────────────

    /// Deliver queued mutation records. Returns how many were delivered.
    pub fn flush(&self) -> usize {
        self.doc.flush()
    }

    /// Let one debounce window elapse on the document's scheduler, then
    /// deliver queued records. With paused time the sleep completes instantly.
    pub async fn settle(&self) {
        let window = self.doc.config().debounce_window + Duration::from_millis(1);
        self.doc
            .run_until(async move { tokio::time::sleep(window).await })
            .await;
        self.doc.flush();
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// First match of `selector` under the root, or `None` on a miss or a
    /// malformed selector.
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.doc.query_selector(self.doc.body(), selector).ok().flatten()
    }

    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.doc
            .query_selector_all(self.doc.body(), selector)
            .unwrap_or_default()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.doc.attribute(node, name)
    }

    pub fn text(&self, node: NodeId) -> String {
        self.doc.text_content(node)
    }

    pub fn markup(&self, node: NodeId) -> String {
        self.doc.inner_markup(node)
    }

    /// Drain faults reported by behaviors.
    pub fn errors(&self) -> Vec<Error> {
        self.doc.take_errors()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
