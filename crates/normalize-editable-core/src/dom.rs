//! Generic DOM helpers built on [`RegionDom`]: class lists, selector
//! matching, ancestor lookup, and the block-splitting used by Enter.

use crate::error::DomError;
use crate::platform::{Caret, RegionDom};

/// Class-list view over one element's `class` attribute.
pub struct ClassList<'a, D: RegionDom> {
    dom: &'a D,
    node: &'a D::Node,
}

impl<'a, D: RegionDom> ClassList<'a, D> {
    pub fn new(dom: &'a D, node: &'a D::Node) -> Self {
        Self { dom, node }
    }

    fn names(&self) -> Vec<String> {
        self.dom
            .attribute(self.node, "class")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn write(&self, names: &[String]) -> Result<(), DomError> {
        if names.is_empty() {
            self.dom.remove_attribute(self.node, "class")
        } else {
            self.dom.set_attribute(self.node, "class", &names.join(" "))
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.names().iter().any(|n| n == name)
    }

    /// Add `name` if not already present.
    pub fn add(&self, name: &str) -> Result<(), DomError> {
        let mut names = self.names();
        if names.iter().any(|n| n == name) {
            return Ok(());
        }
        names.push(name.to_string());
        self.write(&names)
    }

    /// Remove `name` when present.
    pub fn remove(&self, name: &str) -> Result<(), DomError> {
        let mut names = self.names();
        let before = names.len();
        names.retain(|n| n != name);
        if names.len() == before {
            return Ok(());
        }
        self.write(&names)
    }

    /// Toggle `name`, or force it on/off. Returns whether it is now present.
    pub fn toggle(&self, name: &str, force: Option<bool>) -> Result<bool, DomError> {
        let on = force.unwrap_or(!self.has(name));
        if on {
            self.add(name)?;
        } else {
            self.remove(name)?;
        }
        Ok(on)
    }
}

/// Minimal element selector: `tag`, `.class`, `tag.class`, or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(selector: &str) -> Self {
        let mut parts = selector.trim().split('.');
        let tag = parts
            .next()
            .filter(|t| !t.is_empty() && *t != "*")
            .map(str::to_ascii_lowercase);
        let classes = parts.filter(|c| !c.is_empty()).map(str::to_string).collect();
        Self { tag, classes }
    }

    pub fn matches<D: RegionDom>(&self, dom: &D, node: &D::Node) -> bool {
        let Some(tag) = dom.tag_name(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        let list = ClassList::new(dom, node);
        self.classes.iter().all(|c| list.has(c))
    }
}

/// Closest ancestor of `node` matching `selector`.
///
/// Considers `node` itself when `include_self` is set. The walk stops at
/// `root`, which is never returned.
pub fn closest<D: RegionDom>(
    dom: &D,
    node: &D::Node,
    selector: &Selector,
    include_self: bool,
    root: Option<&D::Node>,
) -> Option<D::Node> {
    let mut current = if include_self {
        Some(node.clone())
    } else {
        dom.parent(node)
    };
    while let Some(n) = current {
        if root == Some(&n) {
            return None;
        }
        if selector.matches(dom, &n) {
            return Some(n);
        }
        current = dom.parent(&n);
    }
    None
}

/// Whether `node` is `ancestor` or lies somewhere below it.
pub fn contains<D: RegionDom>(dom: &D, ancestor: &D::Node, node: &D::Node) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if n == *ancestor {
            return true;
        }
        current = dom.parent(&n);
    }
    false
}

/// The direct child of `root` that contains `node` (or is `node`).
pub fn top_level_block<D: RegionDom>(dom: &D, node: &D::Node, root: &D::Node) -> Option<D::Node> {
    let mut current = node.clone();
    loop {
        let parent = dom.parent(&current)?;
        if parent == *root {
            return Some(current);
        }
        current = parent;
    }
}

/// First descendant (or `node` itself) with the given tag, depth-first.
pub fn find_descendant<D: RegionDom>(dom: &D, node: &D::Node, tag: &str) -> Option<D::Node> {
    if dom.tag_name(node).as_deref() == Some(tag) {
        return Some(node.clone());
    }
    dom.children(node)
        .iter()
        .find_map(|child| find_descendant(dom, child, tag))
}

/// Last non-empty text node under `node`, depth-first from the end.
pub fn last_text_descendant<D: RegionDom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    if dom.is_text(node) {
        return (!dom.text_content(node).is_empty()).then(|| node.clone());
    }
    dom.child_nodes(node)
        .iter()
        .rev()
        .find_map(|child| last_text_descendant(dom, child))
}

/// Remove a trailing `suffix` from the text under `node`.
///
/// Trims the last text node when it carries the whole suffix, which keeps
/// inline markup intact. When the suffix spans several nodes the node's whole
/// text is rewritten instead. Returns whether anything was stripped.
pub fn strip_trailing_text<D: RegionDom>(
    dom: &D,
    node: &D::Node,
    suffix: &str,
) -> Result<bool, DomError> {
    if suffix.is_empty() {
        return Ok(false);
    }
    let text = dom.text_content(node);
    let Some(rest) = text.strip_suffix(suffix) else {
        return Ok(false);
    };

    if let Some(last) = last_text_descendant(dom, node) {
        let last_text = dom.text_content(&last);
        if let Some(kept) = last_text.strip_suffix(suffix) {
            dom.set_text_content(&last, kept)?;
            return Ok(true);
        }
    }

    dom.set_text_content(node, rest)?;
    Ok(true)
}

/// Move everything after `caret` inside `paragraph` into `target`.
///
/// Inline ancestors between the caret and the paragraph are shallow-cloned
/// so the moved content keeps its formatting. The caret must lie inside
/// `paragraph`.
pub fn split_paragraph_at<D: RegionDom>(
    dom: &D,
    paragraph: &D::Node,
    caret: &Caret<D::Node>,
    target: &D::Node,
) -> Result<(), DomError> {
    let (mut parent, mut next) = if dom.is_text(&caret.node) {
        let parent = dom.parent(&caret.node).ok_or(DomError::Detached)?;
        let tail = dom.split_text(&caret.node, caret.offset)?;
        (parent, Some(tail))
    } else {
        let next = dom.child_nodes(&caret.node).into_iter().nth(caret.offset);
        (caret.node.clone(), next)
    };

    let mut carried: Option<D::Node> = None;
    loop {
        let at_paragraph = parent == *paragraph;
        let holder = if at_paragraph {
            target.clone()
        } else {
            dom.clone_shallow(&parent)?
        };

        if let Some(inner) = carried.take() {
            dom.append_child(&holder, &inner)?;
        }
        let mut moving = next.take();
        while let Some(node) = moving {
            moving = dom.next_sibling(&node);
            dom.append_child(&holder, &node)?;
        }

        if at_paragraph {
            return Ok(());
        }
        next = dom.next_sibling(&parent);
        carried = Some(holder);
        parent = dom.parent(&parent).ok_or(DomError::Detached)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn test_class_list() {
        let dom = MemoryDom::new();
        let p = dom.element("p");
        let list = ClassList::new(&dom, &p);

        list.add("placeholder").unwrap();
        list.add("placeholder").unwrap();
        list.add("x").unwrap();
        assert_eq!(dom.attribute(&p, "class").as_deref(), Some("placeholder x"));
        assert!(list.has("placeholder"));

        list.remove("placeholder").unwrap();
        assert!(!list.has("placeholder"));
        assert!(!list.toggle("x", None).unwrap());
        assert_eq!(dom.attribute(&p, "class"), None);
        assert!(list.toggle("x", Some(true)).unwrap());
    }

    #[test]
    fn test_closest_stops_at_root() {
        let dom = MemoryDom::new();
        let region = dom.parse_into_new("div", "<div class=\"block\"><p><b>hi</b></p></div>").unwrap();
        let block = dom.children(&region)[0];
        let p = dom.children(&block)[0];
        let b = dom.children(&p)[0];
        let text = dom.child_nodes(&b)[0];

        assert_eq!(closest(&dom, &text, &Selector::parse("p"), true, Some(&region)), Some(p));
        assert_eq!(closest(&dom, &text, &Selector::parse(".block"), true, Some(&region)), Some(block));
        assert_eq!(closest(&dom, &b, &Selector::parse("b"), false, Some(&region)), None);
        assert_eq!(closest(&dom, &text, &Selector::parse("div"), true, Some(&block)), None);
        assert_eq!(top_level_block(&dom, &text, &region), Some(block));
    }

    #[test]
    fn test_strip_trailing_keeps_markup() {
        let dom = MemoryDom::new();
        let p = dom.parse_into_new("p", "<b>hello</b>\u{200B}").unwrap();
        assert!(strip_trailing_text(&dom, &p, "\u{200B}").unwrap());
        assert_eq!(dom.to_html(&p), "<p><b>hello</b></p>");

        // Leading occurrence is not stripped.
        let q = dom.parse_into_new("p", "\u{200B}hi").unwrap();
        assert!(!strip_trailing_text(&dom, &q, "\u{200B}").unwrap());
        assert_eq!(dom.text_content(&q), "\u{200B}hi");
    }

    #[test]
    fn test_split_paragraph_clones_inline_ancestors() {
        let dom = MemoryDom::new();
        let p = dom.parse_into_new("p", "ab<b>cd<i>ef</i></b>gh").unwrap();
        let b = dom.children(&p)[0];
        let cd = dom.child_nodes(&b)[0];
        let target = dom.element("p");

        split_paragraph_at(&dom, &p, &Caret::new(cd, 1), &target).unwrap();
        assert_eq!(dom.to_html(&p), "<p>ab<b>c</b></p>");
        assert_eq!(dom.to_html(&target), "<p><b>d<i>ef</i></b>gh</p>");
    }

    #[test]
    fn test_split_paragraph_at_element_offset() {
        let dom = MemoryDom::new();
        let p = dom.parse_into_new("p", "one<br>two").unwrap();
        let target = dom.element("p");

        split_paragraph_at(&dom, &p, &Caret::new(p, 1), &target).unwrap();
        assert_eq!(dom.to_html(&p), "<p>one</p>");
        assert_eq!(dom.to_html(&target), "<p><br>two</p>");
    }
}
