//! Plugins for the editor node types a tiptap starter kit produces beyond the
//! ones lowering handles natively.

use super::Plugin;
use crate::editor::{
    BLOCKQUOTE, BULLET_LIST, EditorNode, HARD_BREAK, HEADING, HORIZONTAL_RULE, IMAGE, LIST_ITEM,
    ORDERED_LIST,
};
use crate::lower::{LowerError, Lowering, image_node};
use crate::mdast::Node;

pub fn default_plugins() -> Vec<Plugin> {
    vec![
        Plugin::for_node_type(HEADING, heading),
        Plugin::for_node_type(BULLET_LIST, |node, lowering| list(node, lowering, false)),
        Plugin::for_node_type(ORDERED_LIST, |node, lowering| list(node, lowering, true)),
        Plugin::for_node_type(LIST_ITEM, list_item),
        Plugin::for_node_type(BLOCKQUOTE, blockquote),
        Plugin::for_node_type(HORIZONTAL_RULE, |_, _| Ok(Node::ThematicBreak)),
        Plugin::for_node_type(HARD_BREAK, |_, _| Ok(Node::Break)),
        Plugin::for_node_type(IMAGE, |node, _| Ok(image_node(node))),
        Plugin::mark(
            "strike",
            |mark| mark.is("strike") || mark.is("strikethrough"),
            |_, lowered| {
                Ok(Node::Delete {
                    children: vec![lowered.clone()],
                })
            },
        ),
    ]
}

fn heading(node: &EditorNode, lowering: &Lowering<'_>) -> Result<Node, LowerError> {
    let depth = node.attr_u64("level").unwrap_or(1).clamp(1, 6) as u8;
    Ok(Node::Heading {
        depth,
        children: lowering.lower_inlines(&node.content)?,
    })
}

fn list(node: &EditorNode, lowering: &Lowering<'_>, ordered: bool) -> Result<Node, LowerError> {
    require_content(node)?;
    Ok(Node::List {
        ordered,
        start: ordered.then(|| node.attr_u64("start").unwrap_or(1)),
        spread: false,
        children: lowering.lower_blocks(&node.content)?,
    })
}

fn list_item(node: &EditorNode, lowering: &Lowering<'_>) -> Result<Node, LowerError> {
    require_content(node)?;
    Ok(Node::ListItem {
        spread: false,
        children: lowering.lower_blocks(&node.content)?,
    })
}

fn blockquote(node: &EditorNode, lowering: &Lowering<'_>) -> Result<Node, LowerError> {
    require_content(node)?;
    Ok(Node::Blockquote {
        children: lowering.lower_blocks(&node.content)?,
    })
}

fn require_content(node: &EditorNode) -> Result<(), LowerError> {
    if node.content.is_empty() {
        return Err(LowerError::MissingChildren {
            node_type: node.node_type.clone(),
        });
    }
    Ok(())
}
