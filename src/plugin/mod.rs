//! Extension plugins for editor node and mark types the core does not know.
//!
//! A plugin is one of two closed variants: a node plugin (predicate over
//! editor nodes plus a converter producing an mdast node) or a mark plugin
//! (predicate over marks plus a converter that wraps the already-lowered
//! node). Dispatch is a linear scan over the caller's ordered list; the first
//! matching predicate wins and later plugins are never consulted.

use crate::editor::{EditorNode, Mark};
use crate::lower::{LowerError, Lowering};
use crate::mdast::Node;
use std::fmt;
use std::sync::Arc;

pub mod defaults;

pub use defaults::default_plugins;

pub type NodePredicate = dyn Fn(&EditorNode) -> bool + Send + Sync;
pub type NodeConverter =
    dyn Fn(&EditorNode, &Lowering<'_>) -> Result<Node, LowerError> + Send + Sync;
pub type MarkPredicate = dyn Fn(&Mark) -> bool + Send + Sync;
pub type MarkConverter = dyn Fn(&Mark, &Node) -> Result<Node, LowerError> + Send + Sync;

#[derive(Clone)]
pub struct NodePlugin {
    pub name: String,
    pub matches: Arc<NodePredicate>,
    pub convert: Arc<NodeConverter>,
}

#[derive(Clone)]
pub struct MarkPlugin {
    pub name: String,
    pub matches: Arc<MarkPredicate>,
    pub convert: Arc<MarkConverter>,
}

#[derive(Clone)]
pub enum Plugin {
    Node(NodePlugin),
    Mark(MarkPlugin),
}

impl Plugin {
    pub fn node<P, C>(name: impl Into<String>, matches: P, convert: C) -> Self
    where
        P: Fn(&EditorNode) -> bool + Send + Sync + 'static,
        C: Fn(&EditorNode, &Lowering<'_>) -> Result<Node, LowerError> + Send + Sync + 'static,
    {
        Plugin::Node(NodePlugin {
            name: name.into(),
            matches: Arc::new(matches),
            convert: Arc::new(convert),
        })
    }

    /// Node plugin matching on the editor node type.
    pub fn for_node_type<C>(node_type: &str, convert: C) -> Self
    where
        C: Fn(&EditorNode, &Lowering<'_>) -> Result<Node, LowerError> + Send + Sync + 'static,
    {
        let expected = node_type.to_string();
        Self::node(node_type, move |node| node.node_type == expected, convert)
    }

    pub fn mark<P, C>(name: impl Into<String>, matches: P, convert: C) -> Self
    where
        P: Fn(&Mark) -> bool + Send + Sync + 'static,
        C: Fn(&Mark, &Node) -> Result<Node, LowerError> + Send + Sync + 'static,
    {
        Plugin::Mark(MarkPlugin {
            name: name.into(),
            matches: Arc::new(matches),
            convert: Arc::new(convert),
        })
    }

    /// Mark plugin matching on the mark type.
    pub fn for_mark_type<C>(mark_type: &str, convert: C) -> Self
    where
        C: Fn(&Mark, &Node) -> Result<Node, LowerError> + Send + Sync + 'static,
    {
        let expected = mark_type.to_string();
        Self::mark(mark_type, move |mark| mark.mark_type == expected, convert)
    }

    pub fn name(&self) -> &str {
        match self {
            Plugin::Node(plugin) => &plugin.name,
            Plugin::Mark(plugin) => &plugin.name,
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plugin::Node(plugin) => f.debug_tuple("Node").field(&plugin.name).finish(),
            Plugin::Mark(plugin) => f.debug_tuple("Mark").field(&plugin.name).finish(),
        }
    }
}

/// Runs the first node plugin whose predicate accepts `node`.
///
/// Returns `None` when nothing matched; the caller decides whether that is
/// fatal.
pub fn dispatch_node(
    plugins: &[Plugin],
    node: &EditorNode,
    lowering: &Lowering<'_>,
) -> Option<Result<Node, LowerError>> {
    let plugin = plugins.iter().find_map(|plugin| match plugin {
        Plugin::Node(plugin) if (plugin.matches)(node) => Some(plugin),
        _ => None,
    })?;
    tracing::debug!(plugin = %plugin.name, node_type = %node.node_type, "node plugin matched");
    Some((plugin.convert)(node, lowering))
}

/// Runs the first mark plugin whose predicate accepts `mark`, handing it the
/// node lowered so far.
pub fn dispatch_mark(
    plugins: &[Plugin],
    mark: &Mark,
    lowered: &Node,
) -> Option<Result<Node, LowerError>> {
    let plugin = plugins.iter().find_map(|plugin| match plugin {
        Plugin::Mark(plugin) if (plugin.matches)(mark) => Some(plugin),
        _ => None,
    })?;
    tracing::debug!(plugin = %plugin.name, mark_type = %mark.mark_type, "mark plugin matched");
    Some((plugin.convert)(mark, lowered))
}
