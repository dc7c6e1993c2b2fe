//! Runtime configuration for a [`Document`](crate::dom::Document).

use std::time::Duration;

/// Default quiescence window for debounced behaviors.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Configuration shared by every element living in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Quiescence window used by `property-input` and `on-event`.
    pub debounce_window: Duration,
    /// Tag of the document root. Upward searches stop here.
    pub root_tag: String,
    /// Slot name given to component-rendered markup.
    pub content_slot: String,
    /// Slot name given to pre-existing child markup of a component.
    pub parts_slot: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE,
            root_tag: "body".to_owned(),
            content_slot: "content".to_owned(),
            parts_slot: "parts".to_owned(),
        }
    }
}

impl RuntimeConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce window (builder).
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Set the root tag (builder).
    pub fn with_root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = tag.into();
        self
    }

    /// Set both slot names (builder).
    pub fn with_slots(mut self, content: impl Into<String>, parts: impl Into<String>) -> Self {
        self.content_slot = content.into();
        self.parts_slot = parts.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::new();
        assert_eq!(config.debounce_window, Duration::from_millis(100));
        assert_eq!(config.root_tag, "body");
        assert_eq!(config.content_slot, "content");
        assert_eq!(config.parts_slot, "parts");
    }

    #[test]
    fn builder_chain() {
        let config = RuntimeConfig::new()
            .with_debounce_window(Duration::from_millis(20))
            .with_root_tag("main")
            .with_slots("body", "extras");
        assert_eq!(config.debounce_window, Duration::from_millis(20));
        assert_eq!(config.root_tag, "main");
        assert_eq!(config.content_slot, "body");
        assert_eq!(config.parts_slot, "extras");
    }
}
