//! Error types for normalizer construction and DOM operations.

use thiserror::Error;

/// Errors that can occur while binding a normalizer to a region.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NormalizeError {
    /// The region handle does not refer to an element.
    #[error("region must be an element")]
    InvalidRegion,

    /// The block template is structurally unusable.
    #[error("invalid block template: {0}")]
    Template(String),

    /// The block template markup could not be parsed.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// A key binding could not be installed.
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),

    /// A DOM mutation failed.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Errors produced by the markup parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// Input ended inside a tag or with elements still open.
    #[error("unexpected end of markup inside <{0}>")]
    UnexpectedEof(String),

    /// A closing tag did not match the innermost open element.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },

    /// A closing tag appeared with no element open.
    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    /// A `<` was followed by something that is not a tag name.
    #[error("invalid tag at byte {0}")]
    InvalidTag(usize),
}

/// Errors produced while parsing key-combination strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutError {
    /// The combination string is empty or malformed.
    #[error("invalid key combination: {0:?}")]
    InvalidCombo(String),

    /// A chord names a modifier that does not exist.
    #[error("unknown modifier {modifier:?} in {combo:?}")]
    UnknownModifier { combo: String, modifier: String },
}

/// Errors raised by a `RegionDom` implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node handle is not known to this DOM.
    #[error("unknown node")]
    UnknownNode,

    /// The operation needs an element but got another node kind.
    #[error("node is not an element")]
    NotAnElement,

    /// The operation needs a text node but got another node kind.
    #[error("node is not a text node")]
    NotText,

    /// A node has no parent where one is required.
    #[error("node is detached")]
    Detached,

    /// The insertion would put a node inside itself.
    #[error("hierarchy request: node cannot be inserted there")]
    Hierarchy,

    /// The reference node is not a child of the target parent.
    #[error("reference node is not a child of the parent")]
    NotFound,

    /// An offset lies outside the node's content.
    #[error("offset {offset} out of bounds (length {len})")]
    IndexSize { offset: usize, len: usize },

    /// A platform DOM call failed.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Errors raised by a `TextCursor` implementation.
///
/// A cursor failure never aborts a content transition; callers log it and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// No selection API is available.
    #[error("selection unavailable: {0}")]
    Unavailable(String),

    /// The range could not be built or applied.
    #[error("range error: {0}")]
    Range(String),
}

impl From<&str> for CursorError {
    fn from(s: &str) -> Self {
        CursorError::Unavailable(s.to_string())
    }
}
