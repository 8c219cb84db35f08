//! Block templates and the placeholder block they produce.
//!
//! A template is parsed once into a [`Markup`] value and instantiated into
//! fresh nodes on demand, so no node is ever shared between instances.

use crate::error::{DomError, NormalizeError};
use crate::markup::{Markup, parse_markup};
use crate::platform::RegionDom;

/// Default template: one wrapper block holding one paragraph.
pub const DEFAULT_TEMPLATE: &str = "<div><p></p></div>";

/// A top-level block and the paragraph inside it that carries text and the
/// placeholder marker. When the template root is itself a `p`, both handles
/// are the same node.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderBlock<N> {
    pub wrapper: N,
    pub paragraph: N,
}

/// A validated block template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    root: Markup,
}

impl Template {
    /// Parse and validate. The markup must have exactly one root element
    /// (surrounding whitespace aside) and exactly one `p` inside it.
    pub fn parse(markup: &str) -> Result<Self, NormalizeError> {
        let mut roots: Vec<Markup> = parse_markup(markup)?
            .into_iter()
            .filter(|n| !n.is_blank_text())
            .collect();

        if roots.len() != 1 || roots[0].tag().is_none() {
            return Err(NormalizeError::Template(
                "template must have a single root element".into(),
            ));
        }
        let root = roots.remove(0);

        match count_paragraphs(&root) {
            1 => Ok(Self { root }),
            0 => Err(NormalizeError::Template("template has no <p> element".into())),
            n => Err(NormalizeError::Template(format!(
                "template has {n} <p> elements, expected one"
            ))),
        }
    }

    pub fn root(&self) -> &Markup {
        &self.root
    }

    /// Build a fresh, detached block.
    pub fn instantiate<D: RegionDom>(&self, dom: &D) -> Result<PlaceholderBlock<D::Node>, DomError> {
        let wrapper = self.root.build(dom)?;
        let paragraph = crate::dom::find_descendant(dom, &wrapper, "p").ok_or(DomError::NotFound)?;
        Ok(PlaceholderBlock { wrapper, paragraph })
    }
}

impl Default for Template {
    fn default() -> Self {
        Self {
            root: Markup::element("div", vec![Markup::element("p", Vec::new())]),
        }
    }
}

fn count_paragraphs(node: &Markup) -> usize {
    match node {
        Markup::Text(_) => 0,
        Markup::Element { tag, children, .. } => {
            usize::from(tag == "p") + children.iter().map(count_paragraphs).sum::<usize>()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn test_default_matches_constant() {
        assert_eq!(Template::parse(DEFAULT_TEMPLATE).unwrap(), Template::default());
    }

    #[test]
    fn test_validation() {
        assert!(Template::parse("  <p class=\"line\"></p>\n").is_ok());
        assert!(matches!(Template::parse("<div></div>"), Err(NormalizeError::Template(_))));
        assert!(matches!(
            Template::parse("<div><p></p><p></p></div>"),
            Err(NormalizeError::Template(_))
        ));
        assert!(matches!(Template::parse("<p></p><p></p>"), Err(NormalizeError::Template(_))));
        assert!(matches!(Template::parse("<div>"), Err(NormalizeError::Markup(_))));
    }

    #[test]
    fn test_instances_are_independent() {
        let dom = MemoryDom::new();
        let template = Template::parse("<section class=\"b\"><p></p></section>").unwrap();

        let a = template.instantiate(&dom).unwrap();
        let b = template.instantiate(&dom).unwrap();
        assert_ne!(a.wrapper, b.wrapper);
        assert_ne!(a.paragraph, b.paragraph);

        dom.set_text_content(&a.paragraph, "x").unwrap();
        assert_eq!(dom.to_html(&a.wrapper), "<section class=\"b\"><p>x</p></section>");
        assert_eq!(dom.to_html(&b.wrapper), "<section class=\"b\"><p></p></section>");
    }

    #[test]
    fn test_paragraph_root() {
        let dom = MemoryDom::new();
        let block = Template::parse("<p></p>").unwrap().instantiate(&dom).unwrap();
        assert_eq!(block.wrapper, block.paragraph);
    }
}
