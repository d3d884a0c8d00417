//! Pre/post transform pipeline around lowering.
//!
//! ```text
//! doc ─► pre₁ ─► pre₂ ─► … ─► [doc…] ─► lower each ─► [root…] ─► post₁ ─► …
//! ```
//!
//! Pre-phase transforms see editor documents and may fan one document out
//! into several (thread splitting). Post-phase transforms see the whole array
//! of lowered trees at once. Both chain in declaration order. The caller's
//! document is cloned once on entry; a clone is a full structural copy, so
//! fanned-out trees never share nodes.

use crate::editor::EditorNode;
use crate::lower::{LowerError, Lowering};
use crate::mdast::{Node, Root, compact};
use crate::plugin::Plugin;
use std::fmt;
use std::sync::Arc;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type PreTransform =
    dyn Fn(Vec<EditorNode>) -> Result<Vec<EditorNode>, BoxError> + Send + Sync;
pub type PostTransform = dyn Fn(Vec<Root>) -> Result<Vec<Root>, BoxError> + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pre,
    Post,
}

#[derive(Clone)]
pub enum TransformPlugin {
    Pre {
        name: String,
        transform: Arc<PreTransform>,
    },
    Post {
        name: String,
        transform: Arc<PostTransform>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Lower(#[from] LowerError),
    #[error("transform `{plugin}` failed: {source}")]
    Transform {
        plugin: String,
        #[source]
        source: BoxError,
    },
}

impl TransformPlugin {
    pub fn pre<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Vec<EditorNode>) -> Result<Vec<EditorNode>, BoxError> + Send + Sync + 'static,
    {
        TransformPlugin::Pre {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    /// Pre-phase transform applied to each document independently; the
    /// results are concatenated in order.
    pub fn pre_each<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(EditorNode) -> Result<Vec<EditorNode>, BoxError> + Send + Sync + 'static,
    {
        Self::pre(name, move |docs: Vec<EditorNode>| {
            let mut out = Vec::with_capacity(docs.len());
            for doc in docs {
                out.extend(transform(doc)?);
            }
            Ok(out)
        })
    }

    pub fn post<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Vec<Root>) -> Result<Vec<Root>, BoxError> + Send + Sync + 'static,
    {
        TransformPlugin::Post {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            TransformPlugin::Pre { .. } => Phase::Pre,
            TransformPlugin::Post { .. } => Phase::Post,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TransformPlugin::Pre { name, .. } | TransformPlugin::Post { name, .. } => name,
        }
    }
}

impl fmt::Debug for TransformPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPlugin")
            .field("name", &self.name())
            .field("phase", &self.phase())
            .finish()
    }
}

/// Runs pre transforms, lowers every resulting document, then runs post
/// transforms.
pub fn run(
    doc: &EditorNode,
    plugins: &[Plugin],
    transforms: &[TransformPlugin],
) -> Result<Vec<Root>, PipelineError> {
    let mut docs = vec![doc.clone()];
    for transform in transforms {
        if let TransformPlugin::Pre { name, transform } = transform {
            docs = transform(docs).map_err(|source| PipelineError::Transform {
                plugin: name.clone(),
                source,
            })?;
            tracing::debug!(transform = %name, documents = docs.len(), "pre transform applied");
        }
    }

    let lowering = Lowering::new(plugins);
    let mut trees = docs
        .iter()
        .map(|doc| lowering.lower_document(doc))
        .collect::<Result<Vec<_>, _>>()?;

    for transform in transforms {
        if let TransformPlugin::Post { name, transform } = transform {
            trees = transform(trees).map_err(|source| PipelineError::Transform {
                plugin: name.clone(),
                source,
            })?;
            tracing::debug!(transform = %name, trees = trees.len(), "post transform applied");
        }
    }

    Ok(trees)
}

/// Splits each document at top-level nodes of `delimiter` type.
///
/// Delimiters are dropped, as are slices with no content. A document without
/// a delimiter passes through untouched.
pub fn split_at(delimiter: impl Into<String>) -> TransformPlugin {
    let delimiter = delimiter.into();
    let name = format!("split_at:{delimiter}");
    TransformPlugin::pre_each(name, move |doc: EditorNode| {
        if !doc.content.iter().any(|node| node.is(&delimiter)) {
            return Ok(vec![doc]);
        }

        let EditorNode {
            node_type,
            attrs,
            content,
            ..
        } = doc;
        let mut out = Vec::new();
        let mut current = Vec::new();
        for node in content {
            if node.is(&delimiter) {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            } else {
                current.push(node);
            }
        }
        if !current.is_empty() {
            out.push(current);
        }

        Ok(out
            .into_iter()
            .map(|content| EditorNode {
                attrs: attrs.clone(),
                ..EditorNode::new(node_type.clone()).with_content(content)
            })
            .collect())
    })
}

/// Appends ` (i/n)` to the last paragraph of every tree when there is more
/// than one tree. Trees without a paragraph get a new one.
pub fn number_thread() -> TransformPlugin {
    TransformPlugin::post("number_thread", |mut trees: Vec<Root>| {
        let total = trees.len();
        if total < 2 {
            return Ok(trees);
        }
        for (index, tree) in trees.iter_mut().enumerate() {
            let marker = format!(" ({}/{total})", index + 1);
            let paragraph = tree
                .children
                .iter_mut()
                .rev()
                .find(|node| matches!(node, Node::Paragraph { .. }));
            match paragraph {
                Some(paragraph) => {
                    if let Some(children) = paragraph.children_mut() {
                        children.push(Node::text(marker));
                    }
                    compact(paragraph);
                }
                None => tree
                    .children
                    .push(Node::paragraph(vec![Node::text(marker.trim_start())])),
            }
        }
        Ok(trees)
    })
}

/// Editor node type used by [`split_at`] callers that have no custom
/// delimiter of their own.
pub const THREAD_BREAK: &str = "threadBreak";
