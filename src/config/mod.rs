//! Conversion options.
//!
//! [`ConvertConfig`] holds the data options and loads from JSON
//! (`{"bracketFirstHeading": false}`); [`Options`] adds the injected
//! collaborators that cannot be expressed as data.

use crate::facet::BskyFacet;
use crate::pipeline::{BoxError, TransformPlugin};
use crate::plugin::{Plugin, default_plugins};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConvertConfig {
    /// Render a leading H1 as `[Title]`.
    pub bracket_first_heading: bool,
    /// Join a bracketed leading H1 to the following paragraph with a space.
    pub merge_paragraph_with_heading: bool,
}

impl ConvertConfig {
    /// Social-platform defaults.
    pub fn social() -> Self {
        Self {
            bracket_first_heading: true,
            merge_paragraph_with_heading: true,
        }
    }

    /// No heading rewriting.
    pub fn plain() -> Self {
        Self {
            bracket_first_heading: false,
            merge_paragraph_with_heading: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::social()
    }
}

/// Auto-detection of implicit facets (bare URLs, handles) over flattened text.
///
/// Called once per record with the final text; results that overlap an
/// explicit facet are dropped.
pub trait FacetDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<Vec<BskyFacet>, BoxError>;
}

pub type MentionResolver = dyn Fn(&str) -> Option<String> + Send + Sync;

#[derive(Clone)]
pub struct Options {
    pub config: ConvertConfig,
    /// Consulted in order during lowering.
    pub json_doc_plugins: Vec<Plugin>,
    pub transforms: Vec<TransformPlugin>,
    /// Maps a mention DID to a link href when reading records.
    pub resolve_mention_url: Option<Arc<MentionResolver>>,
    pub detector: Option<Arc<dyn FacetDetector>>,
}

impl Options {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            json_doc_plugins: default_plugins(),
            transforms: Vec::new(),
            resolve_mention_url: None,
            detector: None,
        }
    }

    pub fn with_plugins(mut self, plugins: Vec<Plugin>) -> Self {
        self.json_doc_plugins = plugins;
        self
    }

    /// Puts `plugin` ahead of the current list so it shadows later matches.
    pub fn prepend_plugin(mut self, plugin: Plugin) -> Self {
        self.json_doc_plugins.insert(0, plugin);
        self
    }

    pub fn with_transform(mut self, transform: TransformPlugin) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn with_mention_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_mention_url = Some(Arc::new(resolver));
        self
    }

    pub fn with_detector(mut self, detector: impl FacetDetector + 'static) -> Self {
        self.detector = Some(Arc::new(detector));
        self
    }

    pub fn resolve_mention(&self, did: &str) -> String {
        self.resolve_mention_url
            .as_ref()
            .and_then(|resolve| resolve(did))
            .unwrap_or_else(|| format!("#{did}"))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("config", &self.config)
            .field("json_doc_plugins", &self.json_doc_plugins)
            .field("transforms", &self.transforms)
            .field("resolve_mention_url", &self.resolve_mention_url.is_some())
            .field("detector", &self.detector.is_some())
            .finish()
    }
}
