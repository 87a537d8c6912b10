//! CaretTracker: live selection ↔ linear caret offset
//!
//! Captures the caret as a linear UTF-16 offset before the surface's
//! children are replaced, and resolves that offset back into a collapsed
//! selection afterwards. Text nodes may sit directly under the surface or
//! one level down inside styling spans.

use wasm_bindgen::JsValue;
use web_sys::{Document, Node, Selection};

use crate::runs::TextRuns;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CaretError {
    /// The document has no selection object
    NoSelection,
    /// A Range / Selection call threw
    Dom(String),
}

impl std::fmt::Display for CaretError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "Document has no selection"),
            Self::Dom(e) => write!(f, "Selection update failed: {}", e),
        }
    }
}

impl std::error::Error for CaretError {}

impl From<JsValue> for CaretError {
    fn from(value: JsValue) -> Self {
        Self::Dom(format!("{:?}", value))
    }
}

// =============================================================================
// Traversal
// =============================================================================

fn is_text(node: &Node) -> bool {
    node.node_type() == Node::TEXT_NODE
}

/// Length of a node's text in UTF-16 code units
pub fn text_len(node: &Node) -> usize {
    node.text_content()
        .map(|text| text.encode_utf16().count())
        .unwrap_or(0)
}

fn children(node: &Node) -> Vec<Node> {
    let list = node.child_nodes();
    (0..list.length()).filter_map(|i| list.item(i)).collect()
}

/// Text nodes of the surface in document order, down to one level of
/// element nesting
pub fn surface_text_nodes(root: &Node) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in children(root) {
        if is_text(&child) {
            nodes.push(child);
        } else {
            nodes.extend(children(&child).into_iter().filter(is_text));
        }
    }
    nodes
}

// =============================================================================
// Capture
// =============================================================================

/// Linear offset of the selection anchor inside `root`.
///
/// Returns `None` when there is no selection or its anchor lies outside the
/// surface; the caller keeps its previous offset in that case.
pub fn capture_offset(root: &Node, selection: &Selection) -> Option<usize> {
    if selection.range_count() == 0 {
        return None;
    }
    let anchor = selection.anchor_node()?;
    if !root.contains(Some(&anchor)) {
        return None;
    }
    let anchor_offset = selection.anchor_offset() as usize;

    let mut total = 0;
    for (index, child) in children(root).into_iter().enumerate() {
        if anchor.is_same_node(Some(root)) && index == anchor_offset {
            return Some(total);
        }

        if anchor.is_same_node(Some(&child)) {
            if is_text(&child) {
                return Some(total + anchor_offset);
            }
            // Anchor on the wrapper: offset counts its child nodes
            let prefix: usize = children(&child).iter().take(anchor_offset).map(text_len).sum();
            return Some(total + prefix);
        }

        if !is_text(&child) && child.contains(Some(&anchor)) {
            for grandchild in children(&child) {
                if anchor.is_same_node(Some(&grandchild)) {
                    return Some(total + anchor_offset.min(text_len(&grandchild)));
                }
                if grandchild.contains(Some(&anchor)) {
                    // Deeper than one level: settle on the start of this node
                    return Some(total);
                }
                total += text_len(&grandchild);
            }
            return Some(total);
        }

        total += text_len(&child);
    }

    // Anchor on the surface after its last child
    Some(total)
}

/// Capture from the document's current selection
pub fn capture_from_document(document: &Document, root: &Node) -> Option<usize> {
    let selection = document.get_selection().ok().flatten()?;
    capture_offset(root, &selection)
}

// =============================================================================
// Restore
// =============================================================================

fn document_selection(document: &Document) -> Result<Selection, CaretError> {
    document.get_selection()?.ok_or(CaretError::NoSelection)
}

/// Place a collapsed selection at linear `offset` inside `root`.
///
/// Creates an empty text node first when the surface has none, and clamps
/// offsets past the end to the end of the last text node.
pub fn restore_offset(document: &Document, root: &Node, offset: usize) -> Result<(), CaretError> {
    let mut nodes = surface_text_nodes(root);
    if nodes.is_empty() {
        let empty = document.create_text_node("");
        root.append_child(&empty)?;
        nodes.push(empty.into());
    }

    let runs = TextRuns::from_lengths(nodes.iter().map(text_len));
    let position = runs
        .locate(offset)
        .ok_or_else(|| CaretError::Dom("surface has no text runs".to_string()))?;

    let range = document.create_range()?;
    range.set_start(&nodes[position.run], position.offset as u32)?;
    range.collapse_with_to_start(true);

    let selection = document_selection(document)?;
    selection.remove_all_ranges()?;
    selection.add_range(&range)?;
    Ok(())
}

/// Collapse the selection to the end of the surface's content
pub fn collapse_to_end(document: &Document, root: &Node) -> Result<(), CaretError> {
    let range = document.create_range()?;
    range.select_node_contents(root)?;
    range.collapse_with_to_start(false);

    let selection = document_selection(document)?;
    selection.remove_all_ranges()?;
    selection.add_range(&range)?;
    Ok(())
}

/// Restore with the two-level fallback: collapse to end on failure, then
/// give up quietly. A misplaced caret is degraded, not broken.
pub fn restore_or_fallback(document: &Document, root: &Node, offset: usize) {
    if let Err(e) = restore_offset(document, root, offset) {
        web_sys::console::warn_1(
            &format!("[CaretTracker] Restore to {} failed, collapsing to end: {}", offset, e).into(),
        );
        if let Err(e) = collapse_to_end(document, root) {
            web_sys::console::error_1(&format!("[CaretTracker] Fallback failed: {}", e).into());
        }
    }
}
