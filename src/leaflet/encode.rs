//! mdast → Leaflet blocks.
//!
//! Phrasing content is walked with a stack of active features. Each text leaf
//! records its byte range against every active feature; [`render_spans`]
//! then cuts the block text into runs and one facet is emitted per marked
//! run. Underline has no mdast node, so the `<u>`/`</u>` html sentinels push
//! and pop it on the stack.

use super::spans::render_spans;
use super::{LeafletBlock, LeafletFacet, LeafletFeature, ListItem};
use crate::facet::ByteSlice;
use crate::flatten::SerializeError;
use crate::mdast::compact::parse_tags;
use crate::mdast::{Node, Root};
use std::ops::Range;

const UNDERLINE_TAG: &str = "u";

pub fn to_leaflet_blocks(root: &Root) -> Result<Vec<LeafletBlock>, SerializeError> {
    let mut blocks = Vec::with_capacity(root.children.len());
    for node in &root.children {
        encode_block(node, &mut blocks)?;
    }
    Ok(blocks)
}

fn encode_block(node: &Node, out: &mut Vec<LeafletBlock>) -> Result<(), SerializeError> {
    match node {
        Node::Paragraph { children } => {
            let (plaintext, facets) = RichText::encode(children)?;
            out.push(LeafletBlock::Text { plaintext, facets });
        }
        Node::Heading { depth, children } => {
            let (plaintext, facets) = RichText::encode(children)?;
            out.push(LeafletBlock::Header {
                level: *depth,
                plaintext,
                facets,
            });
        }
        Node::Code { lang, value } => out.push(LeafletBlock::Code {
            plaintext: value.clone(),
            language: lang.clone(),
        }),
        Node::Blockquote { children } => {
            let mut text = RichText::default();
            text.lines(children)?;
            let (plaintext, facets) = text.finish();
            out.push(LeafletBlock::Blockquote { plaintext, facets });
        }
        Node::List { children, .. } => out.push(LeafletBlock::UnorderedList {
            children: list_items(children)?,
        }),
        Node::ThematicBreak => out.push(LeafletBlock::HorizontalRule),
        Node::Html { value } => {
            if parse_tags(value).is_none() {
                out.push(LeafletBlock::text(value.clone(), Vec::new()));
            }
        }
        Node::Image { url, alt, .. } => {
            let label = alt.as_deref().filter(|alt| !alt.is_empty()).unwrap_or(url.as_str());
            let facets = if url.is_empty() {
                Vec::new()
            } else {
                vec![LeafletFacet::new(
                    ByteSlice::new(0, label.len()),
                    vec![LeafletFeature::Link { uri: url.clone() }],
                )]
            };
            out.push(LeafletBlock::text(label, facets));
        }
        other => {
            return Err(SerializeError::UnsupportedBlock {
                node_type: other.kind().to_string(),
            });
        }
    }
    Ok(())
}

/// Ordered lists come out unordered; Leaflet has a single list type.
fn list_items(items: &[Node]) -> Result<Vec<ListItem>, SerializeError> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Node::ListItem { children, .. } = item else {
            return Err(SerializeError::UnsupportedBlock {
                node_type: item.kind().to_string(),
            });
        };

        let mut text = RichText::default();
        let mut nested = Vec::new();
        let mut lines = Vec::new();
        for child in children {
            match child {
                Node::List { children, .. } => nested.extend(list_items(children)?),
                other => lines.push(other),
            }
        }
        for (index, line) in lines.into_iter().enumerate() {
            if index > 0 {
                text.leaf("\n");
            }
            text.line(line)?;
        }

        let (plaintext, facets) = text.finish();
        out.push(ListItem {
            content: Box::new(LeafletBlock::Text { plaintext, facets }),
            children: nested,
        });
    }
    Ok(out)
}

#[derive(Debug, Default)]
struct RichText {
    text: String,
    marked: Vec<(Range<usize>, LeafletFeature)>,
    active: Vec<LeafletFeature>,
}

impl RichText {
    fn encode(nodes: &[Node]) -> Result<(String, Vec<LeafletFacet>), SerializeError> {
        let mut text = RichText::default();
        text.phrasing(nodes)?;
        Ok(text.finish())
    }

    fn finish(self) -> (String, Vec<LeafletFacet>) {
        let facets = render_spans(self.text.len(), self.marked)
            .into_iter()
            .filter(|span| !span.marks.is_empty())
            .map(|span| LeafletFacet::new(ByteSlice::new(span.start, span.end), span.marks))
            .collect();
        (self.text, facets)
    }

    fn leaf(&mut self, value: &str) {
        let start = self.text.len();
        self.text.push_str(value);
        let end = self.text.len();
        if start == end {
            return;
        }
        for feature in &self.active {
            self.marked.push((start..end, feature.clone()));
        }
    }

    /// Sentinels inside `children` may open or close features of their own,
    /// so the pushed feature is removed by value rather than popped.
    fn with(&mut self, feature: LeafletFeature, children: &[Node]) -> Result<(), SerializeError> {
        self.active.push(feature.clone());
        let result = self.phrasing(children);
        self.release(&feature);
        result
    }

    fn release(&mut self, feature: &LeafletFeature) {
        if let Some(index) = self.active.iter().rposition(|active| active == feature) {
            self.active.remove(index);
        }
    }

    /// Paragraph-like children of a container, one per line.
    fn lines(&mut self, nodes: &[Node]) -> Result<(), SerializeError> {
        for (index, node) in nodes.iter().enumerate() {
            if index > 0 {
                self.leaf("\n");
            }
            self.line(node)?;
        }
        Ok(())
    }

    fn line(&mut self, node: &Node) -> Result<(), SerializeError> {
        match node {
            Node::Paragraph { children } | Node::Heading { children, .. } => {
                self.phrasing(children)
            }
            Node::Code { value, .. } => {
                self.active.push(LeafletFeature::Code);
                self.leaf(value);
                self.active.pop();
                Ok(())
            }
            Node::Html { value } => {
                self.html(value);
                Ok(())
            }
            Node::Blockquote { children } => self.lines(children),
            Node::List {
                ordered,
                start,
                children,
                ..
            } => {
                let first = start.unwrap_or(1);
                for (index, item) in children.iter().enumerate() {
                    let Node::ListItem { children, .. } = item else {
                        return Err(SerializeError::UnsupportedBlock {
                            node_type: item.kind().to_string(),
                        });
                    };
                    if index > 0 {
                        self.leaf("\n");
                    }
                    if *ordered {
                        self.leaf(&format!("{}. ", first + index as u64));
                    } else {
                        self.leaf("- ");
                    }
                    self.lines(children)?;
                }
                Ok(())
            }
            Node::Image { url, alt, .. } => {
                let label = alt.as_deref().filter(|alt| !alt.is_empty()).unwrap_or(url.as_str());
                if url.is_empty() {
                    self.leaf(label);
                } else {
                    let link = LeafletFeature::Link { uri: url.clone() };
                    self.active.push(link.clone());
                    self.leaf(label);
                    self.release(&link);
                }
                Ok(())
            }
            Node::ThematicBreak => {
                self.leaf("---");
                Ok(())
            }
            other => Err(SerializeError::UnsupportedBlock {
                node_type: other.kind().to_string(),
            }),
        }
    }

    fn phrasing(&mut self, nodes: &[Node]) -> Result<(), SerializeError> {
        for node in nodes {
            match node {
                Node::Text { value } => self.leaf(value),
                Node::Strong { children } => self.with(LeafletFeature::Bold, children)?,
                Node::Emphasis { children } => self.with(LeafletFeature::Italic, children)?,
                Node::Delete { children } => {
                    self.with(LeafletFeature::Strikethrough, children)?
                }
                Node::Link { url, children, .. } => self.with(
                    LeafletFeature::Link { uri: url.clone() },
                    children,
                )?,
                Node::LinkReference { children, .. } => self.phrasing(children)?,
                Node::InlineCode { value } => {
                    self.active.push(LeafletFeature::Code);
                    self.leaf(value);
                    self.active.pop();
                }
                Node::Break => self.leaf("\n"),
                Node::Html { value } => self.html(value),
                Node::Image { alt, .. } | Node::ImageReference { alt, .. } => {
                    if let Some(alt) = alt {
                        self.leaf(alt);
                    }
                }
                Node::FootnoteReference { identifier, label } => {
                    self.leaf(&format!("[^{}]", label.as_deref().unwrap_or(identifier)));
                }
                other => {
                    return Err(SerializeError::UnsupportedBlock {
                        node_type: other.kind().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn html(&mut self, value: &str) {
        let Some(tags) = parse_tags(value) else {
            self.leaf(value);
            return;
        };
        for tag in tags {
            if !tag.name.eq_ignore_ascii_case(UNDERLINE_TAG) {
                continue;
            }
            if tag.closing {
                self.release(&LeafletFeature::Underline);
            } else {
                self.active.push(LeafletFeature::Underline);
            }
        }
    }
}
