//! richtext-bridge: converts rich text between an editor document tree,
//! mdast, and social-platform records.
//!
//! - **Lowering** - editor JSON (ProseMirror-style, flat mark sets) to a
//!   compacted mdast tree, extensible through node and mark plugins
//! - **Pipeline** - pre/post transforms around lowering, including thread
//!   splitting
//! - **Bluesky** - flattened text with non-overlapping link facets, and the
//!   inverse reconstruction from UTF-8 byte offsets
//! - **Leaflet** - typed blocks with overlapping style facets, both ways
//!
//! # Quick Start
//!
//! ```rust
//! use richtext_bridge::{EditorNode, Options, convert};
//! use serde_json::json;
//!
//! let doc = EditorNode::from_json(json!({
//!     "type": "doc",
//!     "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "Hello, fujin." }] }]
//! }))?;
//!
//! let records = convert::editor_to_bluesky(&doc, &Options::default())?;
//! assert_eq!(records[0].text, "Hello, fujin.");
//! # Ok::<(), richtext_bridge::Error>(())
//! ```
//!
//! # Features
//!
//! - `cli` (default) - builds the `richtext-bridge` binary

// Input and intermediate trees
pub mod editor;
pub mod mdast;

// Editor → mdast
pub mod lower;
pub mod pipeline;
pub mod plugin;

// Platform formats
pub mod facet;
pub mod flatten;
pub mod leaflet;
pub mod reconstruct;

pub mod config;
pub mod convert;

pub use config::{ConvertConfig, FacetDetector, Options};
pub use editor::{EditorNode, Mark};
pub use mdast::{Node, Root, compact, compact_children, compact_root};

pub use lower::{LowerError, Lowering, lower};
pub use pipeline::{PipelineError, TransformPlugin, number_thread, split_at};
pub use plugin::{MarkPlugin, NodePlugin, Plugin, default_plugins};

pub use facet::{BlueskyRecord, BskyFacet, BskyFeature, ByteSlice, Facet, Feature};
pub use flatten::{SerializeError, to_bluesky_record, to_plain_text};
pub use leaflet::{LeafletBlock, LeafletFacet, LeafletFeature, leaflet_to_editor, to_leaflet_blocks};
pub use reconstruct::{RecordError, bluesky_to_editor, reconstruct};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<LowerError> for Error {
    fn from(err: LowerError) -> Self {
        Error::Pipeline(PipelineError::Lower(err))
    }
}
