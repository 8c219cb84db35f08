//! Browser implementation of the text cursor.
//!
//! Uses the DOM Selection API to place and read the caret.

use normalize_editable_core::{Caret, CursorError, TextCursor};
use web_sys::{Document, Node, Selection, Window};

/// Selection-API cursor for one window.
#[derive(Debug, Clone)]
pub struct BrowserCursor {
    window: Window,
    document: Document,
}

impl BrowserCursor {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn selection(&self) -> Result<Selection, CursorError> {
        self.window
            .get_selection()
            .map_err(|e| CursorError::Unavailable(format!("get_selection failed: {:?}", e)))?
            .ok_or_else(|| "no selection object".into())
    }

    /// Collapse a range over `node`'s contents onto one boundary and make it
    /// the only selected range.
    fn collapse_onto(&self, node: &Node, to_start: bool) -> Result<(), CursorError> {
        let selection = self.selection()?;
        let range = self
            .document
            .create_range()
            .map_err(|e| CursorError::Range(format!("create_range failed: {:?}", e)))?;
        range
            .select_node_contents(node)
            .map_err(|e| CursorError::Range(format!("select_node_contents failed: {:?}", e)))?;
        range.collapse_with_to_start(to_start);

        selection
            .remove_all_ranges()
            .map_err(|e| CursorError::Range(format!("remove_all_ranges failed: {:?}", e)))?;
        selection
            .add_range(&range)
            .map_err(|e| CursorError::Range(format!("add_range failed: {:?}", e)))?;

        tracing::trace!(to_start, "caret collapsed");
        Ok(())
    }
}

impl TextCursor<Node> for BrowserCursor {
    fn collapse_to_start(&self, node: &Node) -> Result<(), CursorError> {
        self.collapse_onto(node, true)
    }

    fn collapse_to_end(&self, node: &Node) -> Result<(), CursorError> {
        self.collapse_onto(node, false)
    }

    fn caret(&self) -> Result<Option<Caret<Node>>, CursorError> {
        let selection = self.selection()?;
        if selection.range_count() == 0 {
            return Ok(None);
        }
        Ok(selection
            .focus_node()
            .map(|node| Caret::new(node, selection.focus_offset() as usize)))
    }

    fn delete_selection(&self) -> Result<(), CursorError> {
        let selection = self.selection()?;
        if selection.range_count() == 0 || selection.is_collapsed() {
            return Ok(());
        }
        selection
            .delete_from_document()
            .map_err(|e| CursorError::Range(format!("delete_from_document failed: {:?}", e)))
    }
}
