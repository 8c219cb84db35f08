//! Platform abstraction traits for region normalization.
//!
//! These traits define the interface between the normalizer logic and the
//! platform that owns the live document (browser DOM, in-memory test DOM).
//! The same state machine runs against either.

use std::fmt;

use crate::error::{CursorError, DomError};

/// Mutation and query surface over a DOM-like tree.
///
/// Node handles are cheap to clone and compare by identity. Methods take
/// `&self` because live DOM handles mutate through shared references.
/// Text offsets are UTF-16 code units.
pub trait RegionDom {
    type Node: Clone + PartialEq + fmt::Debug;

    fn is_element(&self, node: &Self::Node) -> bool;

    fn is_text(&self, node: &Self::Node) -> bool;

    /// Lowercase tag name, or `None` for non-elements.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    /// Concatenated text of the node and its descendants.
    fn text_content(&self, node: &Self::Node) -> String;

    /// Replace all children with a single text node (or the text of a text node).
    fn set_text_content(&self, node: &Self::Node, text: &str) -> Result<(), DomError>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// All child nodes, text included.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Element children only.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
        self.child_nodes(node)
            .into_iter()
            .filter(|n| self.is_element(n))
            .collect()
    }

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.child_nodes(node).into_iter().next()
    }

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. Moves `child` if it is already attached.
    fn insert_before(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), DomError>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Detach `node` from its parent. No-op when already detached.
    fn remove(&self, node: &Self::Node) -> Result<(), DomError>;

    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    fn create_text(&self, text: &str) -> Result<Self::Node, DomError>;

    /// Copy a node without its children.
    fn clone_shallow(&self, node: &Self::Node) -> Result<Self::Node, DomError>;

    /// Split a text node at `offset`, returning the new node holding the tail.
    /// The tail is inserted right after the original when it has a parent.
    fn split_text(&self, node: &Self::Node, offset: usize) -> Result<Self::Node, DomError>;

    /// Merge adjacent text nodes and drop empty ones, recursively.
    fn normalize(&self, node: &Self::Node) -> Result<(), DomError>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&self, node: &Self::Node, name: &str) -> Result<(), DomError>;
}

/// A collapsed caret position: a container node and an offset into it.
///
/// For text containers the offset counts UTF-16 units; for elements it
/// counts child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caret<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> Caret<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Text-cursor capability: reads and moves the document selection.
///
/// The browser implementation uses the Selection API; tests use the
/// in-memory DOM's selection.
pub trait TextCursor<N> {
    /// Collapse the selection onto the start of `node`'s contents.
    fn collapse_to_start(&self, node: &N) -> Result<(), CursorError>;

    /// Collapse the selection onto the end of `node`'s contents.
    fn collapse_to_end(&self, node: &N) -> Result<(), CursorError>;

    /// Current caret (focus) position, if there is a selection.
    fn caret(&self) -> Result<Option<Caret<N>>, CursorError>;

    /// Delete the contents of a non-collapsed selection. No-op when collapsed.
    fn delete_selection(&self) -> Result<(), CursorError>;
}

/// Schedules work for the next rendering frame.
pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>);
}
