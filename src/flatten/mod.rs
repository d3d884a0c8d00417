//! Segment-style flattening: mdast → plain text (+ Bluesky facets).
//!
//! Bluesky facets may not overlap, and the platform has no styling, so the
//! only structure that survives is links. Everything else degrades to text:
//!
//! - inline and fenced code go through the mathematical-monospace alphabet
//! - list items become `- item` lines (`N. item` for ordered lists)
//! - blocks are separated by a blank line, a thematic break is `---`
//! - a leading H1 can be rendered as `[Title]` and glued to the next
//!   paragraph
//!
//! Every block type must be handled explicitly; an unknown one is an error.
//! Byte offsets come from the UTF-8 length of the text built so far.

use crate::config::{ConvertConfig, FacetDetector};
use crate::facet::{BlueskyRecord, BskyFacet, BskyFeature, ByteSlice};
use crate::mdast::compact::parse_tags;
use crate::mdast::{Node, Root};
use crate::pipeline::BoxError;
use std::ops::Range;

pub mod monospace;

pub use monospace::monospace;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("no plain-text rendering for `{node_type}` node")]
    UnsupportedBlock { node_type: String },
    #[error("facet detection failed: {0}")]
    Detection(#[source] BoxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// Link text stays as-is and gets a `#link` facet.
    Facet,
    /// Link becomes `text (url)`.
    Inline,
}

/// Link-expanded plain text of `root`.
pub fn to_plain_text(root: &Root, config: &ConvertConfig) -> Result<String, SerializeError> {
    let flat = Flattener::new(*config, LinkStyle::Inline).root(root)?;
    Ok(flat.text)
}

/// Bluesky post text and facets for `root`.
///
/// `detector` runs once on the finished text; detected facets that overlap
/// an explicit link are discarded.
pub fn to_bluesky_record(
    root: &Root,
    config: &ConvertConfig,
    detector: Option<&dyn FacetDetector>,
) -> Result<BlueskyRecord, SerializeError> {
    let flat = Flattener::new(*config, LinkStyle::Facet).root(root)?;
    let mut record = flat.into_record();

    if let Some(detector) = detector {
        let detected = detector
            .detect(&record.text)
            .map_err(SerializeError::Detection)?;
        for facet in detected {
            if facet.index.is_empty() || facet.index.byte_end > record.text.len() {
                tracing::warn!(
                    byte_start = facet.index.byte_start,
                    byte_end = facet.index.byte_end,
                    "dropping detected facet outside the text"
                );
                continue;
            }
            if record
                .facets
                .iter()
                .any(|existing| existing.index.overlaps(&facet.index))
            {
                continue;
            }
            record.facets.push(facet);
        }
        record.facets.sort_by_key(|facet| facet.index.byte_start);
    }

    Ok(record)
}

/// Text under construction with byte-addressed link ranges.
#[derive(Debug, Clone, Default, PartialEq)]
struct Flat {
    text: String,
    links: Vec<(Range<usize>, String)>,
}

impl Flat {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            links: Vec::new(),
        }
    }

    fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push_flat(&mut self, other: Flat) {
        let offset = self.text.len();
        self.text.push_str(&other.text);
        for (range, uri) in other.links {
            let shifted = range.start + offset..range.end + offset;
            match self.links.last_mut() {
                Some((last, last_uri)) if last.end == shifted.start && *last_uri == uri => {
                    last.end = shifted.end;
                }
                _ => self.links.push((shifted, uri)),
            }
        }
    }

    /// Links the whole text to `uri`, replacing inner links.
    fn linked(self, uri: &str) -> Self {
        if self.text.is_empty() || uri.is_empty() {
            return self;
        }
        let len = self.text.len();
        Self {
            text: self.text,
            links: vec![(0..len, uri.to_string())],
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn join(parts: Vec<Flat>, separator: &str) -> Flat {
        let mut out = Flat::default();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            out.push_flat(part);
        }
        out
    }

    fn into_record(self) -> BlueskyRecord {
        BlueskyRecord {
            text: self.text,
            facets: self
                .links
                .into_iter()
                .map(|(range, uri)| {
                    BskyFacet::new(
                        ByteSlice::new(range.start, range.end),
                        vec![BskyFeature::Link { uri }],
                    )
                })
                .collect(),
        }
    }
}

struct Flattener {
    config: ConvertConfig,
    links: LinkStyle,
}

impl Flattener {
    fn new(config: ConvertConfig, links: LinkStyle) -> Self {
        Self { config, links }
    }

    fn root(&self, root: &Root) -> Result<Flat, SerializeError> {
        let mut out = Flat::default();
        let mut emitted = 0usize;
        let mut glue_to_paragraph = false;

        for block in &root.children {
            let mut part = self.block(block)?;
            if part.text.is_empty() {
                continue;
            }

            let separator = if glue_to_paragraph && matches!(block, Node::Paragraph { .. }) {
                " "
            } else {
                "\n\n"
            };
            glue_to_paragraph = false;

            if emitted == 0
                && self.config.bracket_first_heading
                && matches!(block, Node::Heading { depth: 1, .. })
            {
                let mut bracketed = Flat::plain("[");
                bracketed.push_flat(part);
                bracketed.push_str("]");
                part = bracketed;
                glue_to_paragraph = self.config.merge_paragraph_with_heading;
            }

            if emitted > 0 {
                out.push_str(separator);
            }
            out.push_flat(part);
            emitted += 1;
        }

        Ok(out)
    }

    fn block(&self, node: &Node) -> Result<Flat, SerializeError> {
        match node {
            Node::Paragraph { children } | Node::Heading { children, .. } => {
                let mut out = Flat::default();
                self.phrasing(children, &mut out)?;
                Ok(out)
            }
            Node::Code { value, .. } => Ok(Flat::plain(monospace(value))),
            Node::List {
                ordered,
                start,
                children,
                ..
            } => {
                let first = start.unwrap_or(1);
                let mut lines = Vec::with_capacity(children.len());
                for (index, item) in children.iter().enumerate() {
                    let Node::ListItem { children, .. } = item else {
                        return Err(unsupported(item));
                    };
                    let marker = if *ordered {
                        format!("{}. ", first + index as u64)
                    } else {
                        "- ".to_string()
                    };
                    let mut line = Flat::plain(marker);
                    line.push_flat(self.blocks(children, "\n")?);
                    lines.push(line);
                }
                Ok(Flat::join(lines, "\n"))
            }
            Node::Blockquote { children } => self.blocks(children, "\n\n"),
            Node::ThematicBreak => Ok(Flat::plain("---")),
            Node::Html { value } => Ok(if parse_tags(value).is_some() {
                Flat::default()
            } else {
                Flat::plain(value.clone())
            }),
            Node::Image { url, .. } => Ok(Flat::plain(url.clone())),
            other => Err(unsupported(other)),
        }
    }

    /// Flattens sibling blocks, dropping the blank ones.
    fn blocks(&self, nodes: &[Node], separator: &str) -> Result<Flat, SerializeError> {
        let mut parts = Vec::with_capacity(nodes.len());
        for node in nodes {
            let part = self.block(node)?;
            if !part.is_blank() {
                parts.push(part);
            }
        }
        Ok(Flat::join(parts, separator))
    }

    fn phrasing(&self, nodes: &[Node], out: &mut Flat) -> Result<(), SerializeError> {
        for node in nodes {
            match node {
                Node::Text { value } => out.push_str(value),
                Node::Strong { children }
                | Node::Emphasis { children }
                | Node::Delete { children }
                | Node::LinkReference { children, .. } => self.phrasing(children, out)?,
                Node::InlineCode { value } => out.push_str(&monospace(value)),
                Node::Link { url, children, .. } => {
                    let mut inner = Flat::default();
                    self.phrasing(children, &mut inner)?;
                    match self.links {
                        LinkStyle::Facet => out.push_flat(inner.linked(url)),
                        LinkStyle::Inline => out.push_str(&inline_link(&inner.text, url)),
                    }
                }
                Node::Break => out.push_str("\n"),
                // Tag-only html is a styling sentinel with no plain-text form.
                Node::Html { value } => {
                    if parse_tags(value).is_none() {
                        out.push_str(value);
                    }
                }
                Node::Image { alt, .. } | Node::ImageReference { alt, .. } => {
                    if let Some(alt) = alt {
                        out.push_str(alt);
                    }
                }
                Node::FootnoteReference { identifier, label } => {
                    out.push_str(&format!("[^{}]", label.as_deref().unwrap_or(identifier)));
                }
                other => return Err(unsupported(other)),
            }
        }
        Ok(())
    }
}

fn inline_link(text: &str, url: &str) -> String {
    if url.is_empty() {
        text.to_string()
    } else if text.is_empty() || text == url {
        url.to_string()
    } else {
        format!("{text} ({url})")
    }
}

fn unsupported(node: &Node) -> SerializeError {
    SerializeError::UnsupportedBlock {
        node_type: node.kind().to_string(),
    }
}
