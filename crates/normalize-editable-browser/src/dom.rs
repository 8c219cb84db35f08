//! `RegionDom` over the live browser DOM.

use normalize_editable_core::{DomError, RegionDom};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node, Text};

use crate::error::{BindError, platform_error};

/// The document a region lives in.
#[derive(Debug, Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The current window's document.
    pub fn current() -> Result<Self, BindError> {
        let window = web_sys::window().ok_or(BindError::NoWindow)?;
        let document = window.document().ok_or(BindError::NoDocument)?;
        Ok(Self::new(document))
    }
}

fn element(node: &Node) -> Result<&Element, DomError> {
    node.dyn_ref::<Element>().ok_or(DomError::NotAnElement)
}

impl RegionDom for BrowserDom {
    type Node = Node;

    fn is_element(&self, node: &Node) -> bool {
        node.node_type() == Node::ELEMENT_NODE
    }

    fn is_text(&self, node: &Node) -> bool {
        node.node_type() == Node::TEXT_NODE
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>()
            .map(|e| e.tag_name().to_ascii_lowercase())
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, node: &Node, text: &str) -> Result<(), DomError> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn child_nodes(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn insert_before(
        &self,
        parent: &Node,
        child: &Node,
        reference: Option<&Node>,
    ) -> Result<(), DomError> {
        parent
            .insert_before(child, reference)
            .map(|_| ())
            .map_err(platform_error)
    }

    fn remove(&self, node: &Node) -> Result<(), DomError> {
        match node.parent_node() {
            Some(parent) => parent
                .remove_child(node)
                .map(|_| ())
                .map_err(platform_error),
            None => Ok(()),
        }
    }

    fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(platform_error)
    }

    fn create_text(&self, text: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn clone_shallow(&self, node: &Node) -> Result<Node, DomError> {
        node.clone_node().map_err(platform_error)
    }

    fn split_text(&self, node: &Node, offset: usize) -> Result<Node, DomError> {
        let text = node.dyn_ref::<Text>().ok_or(DomError::NotText)?;
        let offset = u32::try_from(offset).map_err(|_| DomError::IndexSize {
            offset,
            len: text.length() as usize,
        })?;
        text.split_text(offset)
            .map(Node::from)
            .map_err(platform_error)
    }

    fn normalize(&self, node: &Node) -> Result<(), DomError> {
        node.normalize();
        Ok(())
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        element(node)?
            .set_attribute(name, value)
            .map_err(platform_error)
    }

    fn remove_attribute(&self, node: &Node, name: &str) -> Result<(), DomError> {
        element(node)?
            .remove_attribute(name)
            .map_err(platform_error)
    }
}
