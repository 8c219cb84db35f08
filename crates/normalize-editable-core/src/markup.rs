//! Element-from-markup: a small HTML fragment parser.
//!
//! Handles what block templates need: nested elements, quoted, unquoted and
//! boolean attributes, void and self-closing elements, comments, and the
//! common character references. Parsed fragments are plain values and are
//! instantiated into a concrete DOM by [`Markup::build`].

use crate::error::{DomError, MarkupError};
use crate::platform::RegionDom;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A parsed markup node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Markup>,
    },
    Text(String),
}

impl Markup {
    pub fn element(tag: impl Into<String>, children: Vec<Markup>) -> Self {
        Markup::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Markup::Element { tag, .. } => Some(tag),
            Markup::Text(_) => None,
        }
    }

    /// Whether this is a text node holding only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Markup::Text(t) if t.trim().is_empty())
    }

    /// Create fresh DOM nodes for this fragment.
    pub fn build<D: RegionDom>(&self, dom: &D) -> Result<D::Node, DomError> {
        match self {
            Markup::Text(text) => dom.create_text(text),
            Markup::Element {
                tag,
                attrs,
                children,
            } => {
                let node = dom.create_element(tag)?;
                for (name, value) in attrs {
                    dom.set_attribute(&node, name, value)?;
                }
                for child in children {
                    let built = child.build(dom)?;
                    dom.append_child(&node, &built)?;
                }
                Ok(node)
            }
        }
    }
}

/// Parse an HTML fragment into its top-level nodes.
pub fn parse_markup(html: &str) -> Result<Vec<Markup>, MarkupError> {
    let mut parser = Parser { src: html, pos: 0 };
    let (nodes, closing) = parser.parse_children(None)?;
    match closing {
        Some(found) => Err(MarkupError::UnexpectedClose(found)),
        None => Ok(nodes),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Parse nodes until EOF or a closing tag. Returns the closing tag name
    /// when one ended the run.
    fn parse_children(
        &mut self,
        open: Option<&str>,
    ) -> Result<(Vec<Markup>, Option<String>), MarkupError> {
        let mut nodes = Vec::new();
        loop {
            if self.rest().is_empty() {
                return match open {
                    Some(tag) => Err(MarkupError::UnexpectedEof(tag.to_string())),
                    None => Ok((nodes, None)),
                };
            }

            if self.eat("<!--") {
                match self.rest().find("-->") {
                    Some(end) => self.pos += end + 3,
                    None => self.pos = self.src.len(),
                }
                continue;
            }

            if self.rest().starts_with("</") {
                self.pos += 2;
                let name = self.parse_name();
                self.skip_whitespace();
                if name.is_empty() || !self.eat(">") {
                    return Err(MarkupError::InvalidTag(self.pos));
                }
                return Ok((nodes, Some(name)));
            }

            if self.rest().starts_with("<!") {
                // Doctype and other declarations carry no content.
                match self.rest().find('>') {
                    Some(end) => self.pos += end + 1,
                    None => self.pos = self.src.len(),
                }
                continue;
            }

            if self.peek() == Some('<') {
                nodes.push(self.parse_element()?);
                continue;
            }

            let text = self.parse_text();
            nodes.push(Markup::Text(text));
        }
    }

    fn parse_text(&mut self) -> String {
        let end = self.rest().find('<').unwrap_or(self.rest().len());
        let raw = &self.rest()[..end];
        self.pos += end;
        decode_entities(raw)
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
        {
            self.bump();
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn parse_element(&mut self) -> Result<Markup, MarkupError> {
        let tag_start = self.pos;
        self.bump(); // '<'
        let tag = self.parse_name();
        if tag.is_empty() {
            return Err(MarkupError::InvalidTag(tag_start));
        }

        let mut attrs = Vec::new();
        let self_closing = loop {
            self.skip_whitespace();
            if self.eat("/>") {
                break true;
            }
            if self.eat(">") {
                break false;
            }
            if self.rest().is_empty() {
                return Err(MarkupError::UnexpectedEof(tag));
            }

            let name = self.parse_name();
            if name.is_empty() {
                return Err(MarkupError::InvalidTag(self.pos));
            }
            self.skip_whitespace();
            let value = if self.eat("=") {
                self.skip_whitespace();
                self.parse_attr_value()
                    .ok_or_else(|| MarkupError::UnexpectedEof(tag.clone()))?
            } else {
                String::new()
            };
            attrs.push((name, value));
        };

        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            return Ok(Markup::Element {
                tag,
                attrs,
                children: Vec::new(),
            });
        }

        let (children, closing) = self.parse_children(Some(&tag))?;
        match closing {
            Some(found) if found == tag => Ok(Markup::Element {
                tag,
                attrs,
                children,
            }),
            Some(found) => Err(MarkupError::MismatchedTag {
                expected: tag,
                found,
            }),
            None => Err(MarkupError::UnexpectedEof(tag)),
        }
    }

    fn parse_attr_value(&mut self) -> Option<String> {
        match self.peek()? {
            quote @ ('"' | '\'') => {
                self.bump();
                let end = self.rest().find(quote)?;
                let raw = &self.rest()[..end];
                self.pos += end + 1;
                Some(decode_entities(raw))
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '/')
                {
                    self.bump();
                }
                Some(decode_entities(&self.src[start..self.pos]))
            }
        }
    }
}

/// Decode the character references templates realistically use.
/// Unknown references are kept verbatim.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => name.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_with_attrs() {
        let nodes = parse_markup(r#"<div class="block" data-x=1 hidden><p>a &amp; b</p></div>"#).unwrap();
        assert_eq!(
            nodes,
            vec![Markup::Element {
                tag: "div".into(),
                attrs: vec![
                    ("class".into(), "block".into()),
                    ("data-x".into(), "1".into()),
                    ("hidden".into(), String::new()),
                ],
                children: vec![Markup::element("p", vec![Markup::Text("a & b".into())])],
            }]
        );
    }

    #[test]
    fn test_void_and_self_closing() {
        let nodes = parse_markup("<P>x<BR>y<span/></P>").unwrap();
        assert_eq!(
            nodes,
            vec![Markup::element(
                "p",
                vec![
                    Markup::Text("x".into()),
                    Markup::element("br", vec![]),
                    Markup::Text("y".into()),
                    Markup::element("span", vec![]),
                ]
            )]
        );
    }

    #[test]
    fn test_comments_and_numeric_refs() {
        let nodes = parse_markup("<!-- note --><p>&#8203;&#x41;&bogus;</p>").unwrap();
        assert_eq!(
            nodes,
            vec![Markup::element("p", vec![Markup::Text("\u{200B}A&bogus;".into())])]
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_markup("<div><p></div>"),
            Err(MarkupError::MismatchedTag {
                expected: "p".into(),
                found: "div".into()
            })
        );
        assert_eq!(parse_markup("<div>"), Err(MarkupError::UnexpectedEof("div".into())));
        assert_eq!(parse_markup("</p>"), Err(MarkupError::UnexpectedClose("p".into())));
        assert!(matches!(parse_markup("< p>"), Err(MarkupError::InvalidTag(_))));
    }
}
