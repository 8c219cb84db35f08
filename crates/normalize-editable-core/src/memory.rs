//! In-memory DOM, selection and frame scheduler.
//!
//! Implements the platform traits without a browser so the normalizer can
//! run headless: in unit and integration tests, and in hosts that mirror a
//! remote document. Nodes live in an arena addressed by [`NodeId`]; the whole
//! arena sits behind one `Rc<RefCell<..>>`, so cloned `MemoryDom` handles
//! share the same tree.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{CursorError, DomError, NormalizeError};
use crate::markup::parse_markup;
use crate::platform::{Caret, FrameScheduler, RegionDom, TextCursor};
use crate::text::{utf16_len, utf16_to_byte};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "wbr"];

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Anchor and focus of the in-memory selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySelection {
    pub anchor: Caret<NodeId>,
    pub focus: Caret<NodeId>,
}

impl MemorySelection {
    pub fn collapsed(node: NodeId, offset: usize) -> Self {
        Self {
            anchor: Caret::new(node, offset),
            focus: Caret::new(node, offset),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<NodeData>,
    selection: Option<MemorySelection>,
    selection_unavailable: bool,
    mutations: usize,
}

impl Arena {
    fn get(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode)
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.kind), Ok(NodeKind::Element { .. }))
    }

    fn text_len(&self, id: NodeId) -> usize {
        match self.get(id).map(|n| &n.kind) {
            Ok(NodeKind::Text(t)) => utf16_len(t),
            Ok(NodeKind::Element { .. }) => self.nodes[id.0].children.len(),
            Err(_) => 0,
        }
    }

    /// Detach from the parent. Returns whether the node was attached.
    fn detach(&mut self, id: NodeId) -> Result<bool, DomError> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(false);
        };
        self.get_mut(parent)?.children.retain(|c| *c != id);
        self.get_mut(id)?.parent = None;
        Ok(true)
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.get(id).ok()?.parent?;
        let idx = self.get(parent).ok()?.children.iter().position(|c| *c == id)?;
        Some((parent, idx))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.get(n).ok().and_then(|d| d.parent);
        }
        false
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.get(id) else { return };
        match &node.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element { .. } => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Move any selection endpoint sitting in `from` into `to` shifted by `delta`.
    fn retarget_selection(&mut self, from: NodeId, to: NodeId, delta: usize) {
        if let Some(sel) = &mut self.selection {
            for caret in [&mut sel.anchor, &mut sel.focus] {
                if caret.node == from {
                    caret.node = to;
                    caret.offset += delta;
                }
            }
        }
    }

    fn normalize(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = self.get(id)?.children.clone();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            let text = match &self.get(child)?.kind {
                NodeKind::Text(t) => Some(t.clone()),
                NodeKind::Element { .. } => None,
            };
            match text {
                Some(t) if t.is_empty() => {
                    if let Some((parent, idx)) = self.index_in_parent(child) {
                        self.retarget_selection(child, parent, idx);
                    }
                    self.detach(child)?;
                    self.mutations += 1;
                }
                Some(t) => match previous_text {
                    Some(prev) => {
                        let delta = self.text_len(prev);
                        if let NodeKind::Text(p) = &mut self.get_mut(prev)?.kind {
                            p.push_str(&t);
                        }
                        self.retarget_selection(child, prev, delta);
                        self.detach(child)?;
                        self.mutations += 1;
                    }
                    None => previous_text = Some(child),
                },
                None => {
                    previous_text = None;
                    self.normalize(child)?;
                }
            }
        }
        Ok(())
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.get(id) else { return };
        match &node.kind {
            NodeKind::Text(t) => {
                for ch in t.chars() {
                    match ch {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        _ => out.push(ch),
                    }
                }
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.replace('&', "&amp;").replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Shared in-memory document.
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    arena: Rc<RefCell<Arena>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element.
    pub fn element(&self, tag: &str) -> NodeId {
        self.arena.borrow_mut().push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn text(&self, text: &str) -> NodeId {
        self.arena.borrow_mut().push(NodeKind::Text(text.to_string()))
    }

    /// Replace `node`'s children with parsed markup.
    pub fn set_inner_html(&self, node: &NodeId, html: &str) -> Result<(), NormalizeError> {
        let nodes = parse_markup(html)?;
        for child in self.child_nodes(node) {
            self.remove(&child)?;
        }
        for markup in &nodes {
            let built = markup.build(self)?;
            self.append_child(node, &built)?;
        }
        Ok(())
    }

    /// Create a detached `tag` element filled with parsed markup.
    pub fn parse_into_new(&self, tag: &str, html: &str) -> Result<NodeId, NormalizeError> {
        let node = self.element(tag);
        self.set_inner_html(&node, html)?;
        Ok(node)
    }

    /// Serialize a node and its subtree.
    pub fn to_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.arena.borrow().write_html(*node, &mut out);
        out
    }

    /// Serialize only the children of a node.
    pub fn inner_html(&self, node: &NodeId) -> String {
        let arena = self.arena.borrow();
        let mut out = String::new();
        if let Ok(data) = arena.get(*node) {
            for child in &data.children {
                arena.write_html(*child, &mut out);
            }
        }
        out
    }

    /// Number of tree mutations applied so far.
    pub fn mutation_count(&self) -> usize {
        self.arena.borrow().mutations
    }

    pub fn selection(&self) -> Option<MemorySelection> {
        self.arena.borrow().selection.clone()
    }

    pub fn set_caret(&self, node: NodeId, offset: usize) {
        self.arena.borrow_mut().selection = Some(MemorySelection::collapsed(node, offset));
    }

    pub fn select(&self, anchor: Caret<NodeId>, focus: Caret<NodeId>) {
        self.arena.borrow_mut().selection = Some(MemorySelection { anchor, focus });
    }

    pub fn clear_selection(&self) {
        self.arena.borrow_mut().selection = None;
    }

    /// Simulate a host without a selection API.
    pub fn set_selection_available(&self, available: bool) {
        self.arena.borrow_mut().selection_unavailable = !available;
    }

    /// Insert text at the caret the way native typing does, advancing the caret.
    pub fn type_text(&self, text: &str) -> Result<(), DomError> {
        let caret = self
            .selection()
            .map(|s| s.focus)
            .ok_or(DomError::NotFound)?;

        if self.is_text(&caret.node) {
            let mut arena = self.arena.borrow_mut();
            let NodeKind::Text(existing) = &mut arena.get_mut(caret.node)?.kind else {
                return Err(DomError::NotText);
            };
            let byte = utf16_to_byte(existing, caret.offset).ok_or(DomError::IndexSize {
                offset: caret.offset,
                len: utf16_len(existing),
            })?;
            existing.insert_str(byte, text);
            arena.mutations += 1;
            arena.selection = Some(MemorySelection::collapsed(
                caret.node,
                caret.offset + utf16_len(text),
            ));
            return Ok(());
        }

        let new_text = self.text(text);
        let reference = self.child_nodes(&caret.node).into_iter().nth(caret.offset);
        self.insert_before(&caret.node, &new_text, reference.as_ref())?;
        self.set_caret(new_text, utf16_len(text));
        Ok(())
    }

    fn check_selection(&self) -> Result<(), CursorError> {
        if self.arena.borrow().selection_unavailable {
            return Err(CursorError::Unavailable("no selection in this host".into()));
        }
        Ok(())
    }
}

impl RegionDom for MemoryDom {
    type Node = NodeId;

    fn is_element(&self, node: &NodeId) -> bool {
        self.arena.borrow().is_element(*node)
    }

    fn is_text(&self, node: &NodeId) -> bool {
        matches!(
            self.arena.borrow().get(*node).map(|n| &n.kind),
            Ok(NodeKind::Text(_))
        )
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match &self.arena.borrow().get(*node).ok()?.kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.arena.borrow().collect_text(*node, &mut out);
        out
    }

    fn set_text_content(&self, node: &NodeId, text: &str) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        if let NodeKind::Text(t) = &mut arena.get_mut(*node)?.kind {
            *t = text.to_string();
            arena.mutations += 1;
            return Ok(());
        }

        for child in arena.get(*node)?.children.clone() {
            arena.detach(child)?;
        }
        if !text.is_empty() {
            let child = arena.push(NodeKind::Text(text.to_string()));
            arena.get_mut(child)?.parent = Some(*node);
            arena.get_mut(*node)?.children.push(child);
        }
        arena.mutations += 1;
        Ok(())
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.arena.borrow().get(*node).ok()?.parent
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.arena
            .borrow()
            .get(*node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let (parent, idx) = arena.index_in_parent(*node)?;
        arena.get(parent).ok()?.children.get(idx + 1).copied()
    }

    fn insert_before(
        &self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        if !arena.is_element(*parent) {
            return Err(DomError::NotAnElement);
        }
        arena.get(*child)?;
        if arena.contains(*child, *parent) {
            return Err(DomError::Hierarchy);
        }

        let mut reference = reference.copied();
        if let Some(r) = reference {
            if arena.get(r)?.parent != Some(*parent) {
                return Err(DomError::NotFound);
            }
            if r == *child {
                let (_, idx) = arena.index_in_parent(r).ok_or(DomError::NotFound)?;
                reference = arena.get(*parent)?.children.get(idx + 1).copied();
            }
        }

        arena.detach(*child)?;
        let siblings = &mut arena.get_mut(*parent)?.children;
        let idx = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(idx, *child);
        arena.get_mut(*child)?.parent = Some(*parent);
        arena.mutations += 1;
        Ok(())
    }

    fn remove(&self, node: &NodeId) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        if arena.detach(*node)? {
            arena.mutations += 1;
        }
        Ok(())
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.element(tag))
    }

    fn create_text(&self, text: &str) -> Result<NodeId, DomError> {
        Ok(self.text(text))
    }

    fn clone_shallow(&self, node: &NodeId) -> Result<NodeId, DomError> {
        let mut arena = self.arena.borrow_mut();
        let kind = arena.get(*node)?.kind.clone();
        Ok(arena.push(kind))
    }

    fn split_text(&self, node: &NodeId, offset: usize) -> Result<NodeId, DomError> {
        let mut arena = self.arena.borrow_mut();
        let NodeKind::Text(text) = &mut arena.get_mut(*node)?.kind else {
            return Err(DomError::NotText);
        };
        let byte = utf16_to_byte(text, offset).ok_or(DomError::IndexSize {
            offset,
            len: utf16_len(text),
        })?;
        let tail_text = text.split_off(byte);
        let tail = arena.push(NodeKind::Text(tail_text));

        if let Some((parent, idx)) = arena.index_in_parent(*node) {
            arena.get_mut(parent)?.children.insert(idx + 1, tail);
            arena.get_mut(tail)?.parent = Some(parent);
        }
        arena.mutations += 1;
        Ok(tail)
    }

    fn normalize(&self, node: &NodeId) -> Result<(), DomError> {
        self.arena.borrow_mut().normalize(*node)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match &self.arena.borrow().get(*node).ok()?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            NodeKind::Text(_) => None,
        }
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        let NodeKind::Element { attrs, .. } = &mut arena.get_mut(*node)?.kind else {
            return Err(DomError::NotAnElement);
        };
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
        arena.mutations += 1;
        Ok(())
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        let NodeKind::Element { attrs, .. } = &mut arena.get_mut(*node)?.kind else {
            return Err(DomError::NotAnElement);
        };
        let before = attrs.len();
        attrs.retain(|(n, _)| n != name);
        if attrs.len() != before {
            arena.mutations += 1;
        }
        Ok(())
    }
}

impl TextCursor<NodeId> for MemoryDom {
    fn collapse_to_start(&self, node: &NodeId) -> Result<(), CursorError> {
        self.check_selection()?;
        self.set_caret(*node, 0);
        Ok(())
    }

    fn collapse_to_end(&self, node: &NodeId) -> Result<(), CursorError> {
        self.check_selection()?;
        let end = self.arena.borrow().text_len(*node);
        self.set_caret(*node, end);
        Ok(())
    }

    fn caret(&self) -> Result<Option<Caret<NodeId>>, CursorError> {
        self.check_selection()?;
        Ok(self.selection().map(|s| s.focus))
    }

    fn delete_selection(&self) -> Result<(), CursorError> {
        self.check_selection()?;
        let Some(sel) = self.selection() else {
            return Ok(());
        };
        if sel.is_collapsed() {
            return Ok(());
        }
        if sel.anchor.node != sel.focus.node {
            return Err(CursorError::Range("selection spans several containers".into()));
        }

        let node = sel.anchor.node;
        let start = sel.anchor.offset.min(sel.focus.offset);
        let end = sel.anchor.offset.max(sel.focus.offset);

        if self.is_text(&node) {
            let mut arena = self.arena.borrow_mut();
            if let Ok(NodeData {
                kind: NodeKind::Text(text),
                ..
            }) = arena.get_mut(node)
            {
                let (Some(a), Some(b)) = (utf16_to_byte(text, start), utf16_to_byte(text, end))
                else {
                    return Err(CursorError::Range("offset out of bounds".into()));
                };
                text.replace_range(a..b, "");
            }
            arena.mutations += 1;
        } else {
            let doomed: Vec<NodeId> = self
                .child_nodes(&node)
                .into_iter()
                .skip(start)
                .take(end - start)
                .collect();
            for child in doomed {
                self.remove(&child)
                    .map_err(|e| CursorError::Range(e.to_string()))?;
            }
        }
        self.set_caret(node, start);
        Ok(())
    }
}

/// Frame scheduler driven by hand: callbacks queue until [`ManualFrames::run`].
#[derive(Clone, Default)]
pub struct ManualFrames {
    queue: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback requested so far, as one frame. Callbacks requested
    /// while running wait for the next call. Returns how many ran.
    pub fn run(&self) -> usize {
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push(callback);
    }
}
