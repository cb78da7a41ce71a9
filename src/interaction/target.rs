//! Event targets: the element an input event landed on, plus its ancestors.
//!
//! Targets are what [`Selector`](super::Selector)s match against. The editor's
//! hit tester produces them from pointer positions; keyboard events usually
//! target the canvas.

use serde::{Deserialize, Serialize};

/// One element in a target path: a tag, an optional id and a set of classes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl TargetElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// The element an event was dispatched to.
///
/// `ancestors` is ordered nearest-first. `node_id` / `connection_id` carry the
/// graph identity of the element when it represents one, so payload mappers do
/// not have to parse element ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventTarget {
    pub element: TargetElement,
    pub ancestors: Vec<TargetElement>,
    pub node_id: Option<i32>,
    pub connection_id: Option<i32>,
}

impl EventTarget {
    pub fn new(element: TargetElement) -> Self {
        Self {
            element,
            ..Default::default()
        }
    }

    /// The editor background.
    pub fn canvas() -> Self {
        Self::new(TargetElement::new("canvas").with_id("canvas"))
    }

    /// A node on the canvas.
    pub fn node(id: i32) -> Self {
        Self {
            element: TargetElement::new("node")
                .with_id(format!("node-{id}"))
                .with_class("node"),
            ancestors: vec![TargetElement::new("canvas").with_id("canvas")],
            node_id: Some(id),
            connection_id: None,
        }
    }

    /// A connection between two nodes.
    pub fn connection(id: i32) -> Self {
        Self {
            element: TargetElement::new("connection")
                .with_id(format!("connection-{id}"))
                .with_class("connection"),
            ancestors: vec![TargetElement::new("canvas").with_id("canvas")],
            node_id: None,
            connection_id: Some(id),
        }
    }

    /// A named side panel, e.g. `"inspector"`.
    pub fn panel(name: &str) -> Self {
        Self::new(TargetElement::new("panel").with_id(name).with_class("panel"))
    }

    /// Push `ancestor` as the outermost ancestor.
    pub fn within(mut self, ancestor: TargetElement) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.element = self.element.with_class(class);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_target_carries_identity() {
        let target = EventTarget::node(4);
        assert_eq!(target.node_id, Some(4));
        assert_eq!(target.element.tag, "node");
        assert_eq!(target.element.id.as_deref(), Some("node-4"));
        assert_eq!(target.ancestors[0].tag, "canvas");
    }

    #[test]
    fn test_with_class_does_not_duplicate() {
        let target = EventTarget::node(1).with_class("node").with_class("selected");
        assert_eq!(target.element.classes, vec!["node", "selected"]);
    }
}
