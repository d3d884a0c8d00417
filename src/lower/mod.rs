//! Editor tree → mdast lowering.
//!
//! A recursive-descent walk with no mutable state. Block and inline context
//! are separate entry points ([`Lowering::lower_blocks`],
//! [`Lowering::lower_inlines`]); plugins call back into them to lower their own
//! children.
//!
//! # Mark folding
//!
//! Editor text carries a flat mark list; mdast nests wrappers. Marks are folded
//! right to left so the first declared mark ends up outermost:
//! `[bold, italic]` becomes `strong > emphasis > text`.
//!
//! mdast has no underline node, so `underline` emits an `<u>`/`</u>` html pair
//! around the folded run instead of wrapping it. Compaction later cancels the
//! `</u><u>` seams between neighbouring underlined runs.

use crate::editor::{
    BLOCKQUOTE, BULLET_LIST, CODE_BLOCK, DOC, EditorNode, HEADING, IMAGE, Mark, ORDERED_LIST,
    PARAGRAPH, TEXT,
};
use crate::mdast::compact::parse_tags;
use crate::mdast::{Node, Root, compact_root};
use crate::plugin::{self, Plugin};
use std::iter;

pub const UNDERLINE_OPEN: &str = "<u>";
pub const UNDERLINE_CLOSE: &str = "</u>";

/// Editor node types that frame a paragraph as a block boundary.
const BLOCK_LIKE: &[&str] = &[
    HEADING,
    BLOCKQUOTE,
    BULLET_LIST,
    ORDERED_LIST,
    "list",
    "table",
    CODE_BLOCK,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    #[error("expected a `doc` root, found `{found}`")]
    MalformedRoot { found: String },
    #[error("no conversion for node type `{node_type}`")]
    UnknownNode { node_type: String },
    #[error("`{node_type}` node is missing required children")]
    MissingChildren { node_type: String },
    #[error("`{node_type}` produced block node `{produced}` in inline context")]
    PhrasingExpected { node_type: String, produced: String },
    #[error("`{node_type}` produced phrasing node `{produced}` in block context")]
    BlockExpected { node_type: String, produced: String },
    #[error("plugin failed on `{node_type}`: {message}")]
    Plugin { node_type: String, message: String },
}

/// Lowers `doc` with the given plugin list. Shorthand for
/// [`Lowering::lower_document`].
pub fn lower(doc: &EditorNode, plugins: &[Plugin]) -> Result<Root, LowerError> {
    Lowering::new(plugins).lower_document(doc)
}

#[derive(Debug, Clone, Copy)]
pub struct Lowering<'a> {
    plugins: &'a [Plugin],
}

impl<'a> Lowering<'a> {
    pub fn new(plugins: &'a [Plugin]) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &'a [Plugin] {
        self.plugins
    }

    pub fn lower_document(&self, doc: &EditorNode) -> Result<Root, LowerError> {
        if !doc.is(DOC) {
            return Err(LowerError::MalformedRoot {
                found: doc.node_type.clone(),
            });
        }

        let mut root = Root::new(Vec::with_capacity(doc.content.len()));
        for (index, node) in doc.content.iter().enumerate() {
            let (prev, next) = siblings(&doc.content, index);
            let lowered = match self.lower_builtin_block(node, prev, next) {
                Some(result) => result?,
                None => {
                    let produced = self.dispatch(node)?;
                    // A lone phrasing node at the root gets a synthetic paragraph.
                    if produced.is_flow() {
                        produced
                    } else if produced.is_phrasing() {
                        Node::paragraph(vec![produced])
                    } else {
                        return Err(LowerError::BlockExpected {
                            node_type: node.node_type.clone(),
                            produced: produced.kind().to_string(),
                        });
                    }
                }
            };
            root.children.push(lowered);
        }

        compact_root(&mut root);
        Ok(root)
    }

    /// Lowers nested block content. Plugin output must be flow content.
    pub fn lower_blocks(&self, nodes: &[EditorNode]) -> Result<Vec<Node>, LowerError> {
        let mut out = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            let (prev, next) = siblings(nodes, index);
            let lowered = match self.lower_builtin_block(node, prev, next) {
                Some(result) => result?,
                None => {
                    let produced = self.dispatch(node)?;
                    if !produced.is_flow() {
                        return Err(LowerError::BlockExpected {
                            node_type: node.node_type.clone(),
                            produced: produced.kind().to_string(),
                        });
                    }
                    produced
                }
            };
            out.push(lowered);
        }
        Ok(out)
    }

    /// Lowers inline content. Plugin output must be phrasing content.
    pub fn lower_inlines(&self, nodes: &[EditorNode]) -> Result<Vec<Node>, LowerError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node.is(TEXT) {
                out.extend(self.fold_marks(node)?);
                continue;
            }
            let produced = self.dispatch(node)?;
            if !produced.is_phrasing() {
                return Err(LowerError::PhrasingExpected {
                    node_type: node.node_type.clone(),
                    produced: produced.kind().to_string(),
                });
            }
            out.push(produced);
        }
        Ok(out)
    }

    fn lower_builtin_block(
        &self,
        node: &EditorNode,
        prev: Option<&EditorNode>,
        next: Option<&EditorNode>,
    ) -> Option<Result<Node, LowerError>> {
        match node.node_type.as_str() {
            PARAGRAPH => Some(self.lower_paragraph(node, prev, next)),
            CODE_BLOCK => Some(Ok(code_node(node))),
            IMAGE => Some(Ok(image_node(node))),
            _ => None,
        }
    }

    fn dispatch(&self, node: &EditorNode) -> Result<Node, LowerError> {
        plugin::dispatch_node(self.plugins, node, self).unwrap_or_else(|| {
            Err(LowerError::UnknownNode {
                node_type: node.node_type.clone(),
            })
        })
    }

    fn lower_paragraph(
        &self,
        node: &EditorNode,
        prev: Option<&EditorNode>,
        next: Option<&EditorNode>,
    ) -> Result<Node, LowerError> {
        let mut children = self.lower_inlines(&node.content)?;

        if prev.is_some_and(is_block_like) {
            trim_edge(&mut children, Edge::Start);
        }
        if next.is_some_and(is_block_like) {
            trim_edge(&mut children, Edge::End);
        }
        children.retain(|child| !matches!(child, Node::Text { value } if value.is_empty()));

        Ok(Node::paragraph(children))
    }

    fn fold_marks(&self, node: &EditorNode) -> Result<Vec<Node>, LowerError> {
        let Some(text) = node.text.as_deref() else {
            return Err(LowerError::MissingChildren {
                node_type: TEXT.to_string(),
            });
        };

        let mut folded = Node::text(text);
        let mut underlines = 0usize;
        let mut seen: Vec<&str> = Vec::with_capacity(node.marks.len());
        for mark in node.marks.iter().rev() {
            if seen.contains(&mark.mark_type.as_str()) {
                tracing::warn!(mark_type = %mark.mark_type, "skipping duplicate mark");
                continue;
            }
            seen.push(&mark.mark_type);

            folded = match mark.mark_type.as_str() {
                "bold" => Node::strong(vec![folded]),
                "italic" => Node::emphasis(vec![folded]),
                "code" => Node::InlineCode {
                    value: text.to_string(),
                },
                "underline" => {
                    underlines += 1;
                    folded
                }
                "link" => link_node(mark, folded),
                _ => self.fold_unknown_mark(mark, folded)?,
            };
        }

        let mut out = Vec::with_capacity(1 + underlines * 2);
        out.extend(iter::repeat_with(|| Node::html(UNDERLINE_OPEN)).take(underlines));
        out.push(folded);
        out.extend(iter::repeat_with(|| Node::html(UNDERLINE_CLOSE)).take(underlines));
        Ok(out)
    }

    fn fold_unknown_mark(&self, mark: &Mark, folded: Node) -> Result<Node, LowerError> {
        match plugin::dispatch_mark(self.plugins, mark, &folded) {
            Some(result) => {
                let produced = result?;
                if !produced.is_phrasing() {
                    return Err(LowerError::PhrasingExpected {
                        node_type: mark.mark_type.clone(),
                        produced: produced.kind().to_string(),
                    });
                }
                Ok(produced)
            }
            None => {
                tracing::warn!(mark_type = %mark.mark_type, "no conversion for mark, text kept unmarked");
                Ok(folded)
            }
        }
    }
}

fn siblings(nodes: &[EditorNode], index: usize) -> (Option<&EditorNode>, Option<&EditorNode>) {
    let prev = index.checked_sub(1).and_then(|i| nodes.get(i));
    (prev, nodes.get(index + 1))
}

fn is_block_like(node: &EditorNode) -> bool {
    BLOCK_LIKE.contains(&node.node_type.as_str())
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Start,
    End,
}

/// Strips whitespace from one edge of a phrasing run.
///
/// Walks inward from the edge: tag-only html is skipped, wrappers are entered,
/// and text emptied by the trim is dropped so the next leaf is trimmed too.
/// Stops at the first leaf that keeps visible content or is not text.
/// Returns `true` once such a leaf was reached.
fn trim_edge(nodes: &mut Vec<Node>, edge: Edge) -> bool {
    let mut skipped = 0;
    while skipped < nodes.len() {
        let index = match edge {
            Edge::Start => skipped,
            Edge::End => nodes.len() - 1 - skipped,
        };
        match &mut nodes[index] {
            Node::Text { value } => {
                let trimmed = match edge {
                    Edge::Start => value.trim_start(),
                    Edge::End => value.trim_end(),
                }
                .to_string();
                if trimmed.is_empty() {
                    nodes.remove(index);
                    continue;
                }
                *value = trimmed;
                return true;
            }
            Node::Html { value } if parse_tags(value.as_str()).is_some() => skipped += 1,
            other => match other.children_mut() {
                Some(children) => {
                    if trim_edge(children, edge) {
                        return true;
                    }
                    skipped += 1;
                }
                None => return true,
            },
        }
    }
    false
}

fn link_node(mark: &Mark, folded: Node) -> Node {
    Node::Link {
        url: mark.attr_str("href").unwrap_or_default().to_string(),
        title: mark.attr_str("title").map(str::to_string),
        children: vec![folded],
    }
}

fn code_node(node: &EditorNode) -> Node {
    let value = node
        .content
        .first()
        .and_then(|child| child.text.clone())
        .unwrap_or_default();
    Node::Code {
        lang: node.attr_str("language").map(str::to_string),
        value,
    }
}

/// `image` editor node → mdast image. Non-string title/alt become `None`.
pub fn image_node(node: &EditorNode) -> Node {
    Node::Image {
        url: node.attr_str("src").unwrap_or_default().to_string(),
        title: node.attr_str("title").map(str::to_string),
        alt: node.attr_str("alt").map(str::to_string),
    }
}
