//! Leaflet documents: typed blocks whose text carries overlapping facets.
//!
//! Unlike Bluesky, a Leaflet facet may stack several style features on one
//! byte range, and ranges may overlap. Both directions therefore go through
//! [`spans::render_spans`], which rebuilds disjoint runs from a per-byte mark
//! map.

use crate::facet::Facet;
use serde::{Deserialize, Serialize};

pub mod decode;
pub mod encode;
pub mod spans;

pub use decode::leaflet_to_editor;
pub use encode::to_leaflet_blocks;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum LeafletFeature {
    #[serde(rename = "pub.leaflet.richtext.facet#bold")]
    Bold,
    #[serde(rename = "pub.leaflet.richtext.facet#italic")]
    Italic,
    #[serde(rename = "pub.leaflet.richtext.facet#code")]
    Code,
    #[serde(rename = "pub.leaflet.richtext.facet#underline")]
    Underline,
    #[serde(rename = "pub.leaflet.richtext.facet#strikethrough")]
    Strikethrough,
    #[serde(rename = "pub.leaflet.richtext.facet#link")]
    Link { uri: String },
}

pub type LeafletFacet = Facet<LeafletFeature>;

fn default_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum LeafletBlock {
    #[serde(rename = "pub.leaflet.blocks.text")]
    Text {
        plaintext: String,
        #[serde(default)]
        facets: Vec<LeafletFacet>,
    },
    #[serde(rename = "pub.leaflet.blocks.header")]
    Header {
        #[serde(default = "default_level")]
        level: u8,
        plaintext: String,
        #[serde(default)]
        facets: Vec<LeafletFacet>,
    },
    #[serde(rename = "pub.leaflet.blocks.unorderedList")]
    UnorderedList { children: Vec<ListItem> },
    #[serde(rename = "pub.leaflet.blocks.code")]
    Code {
        plaintext: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    #[serde(rename = "pub.leaflet.blocks.blockquote")]
    Blockquote {
        plaintext: String,
        #[serde(default)]
        facets: Vec<LeafletFacet>,
    },
    #[serde(rename = "pub.leaflet.blocks.horizontalRule")]
    HorizontalRule,
    #[serde(rename = "pub.leaflet.blocks.website")]
    Website {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    #[serde(rename = "pub.leaflet.blocks.iframe")]
    Iframe { url: String },
}

impl LeafletBlock {
    pub fn text(plaintext: impl Into<String>, facets: Vec<LeafletFacet>) -> Self {
        LeafletBlock::Text {
            plaintext: plaintext.into(),
            facets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type", rename = "pub.leaflet.blocks.unorderedList#listItem")]
pub struct ListItem {
    pub content: Box<LeafletBlock>,
    #[serde(default)]
    pub children: Vec<ListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::ByteSlice;
    use serde_json::json;

    #[test]
    fn text_block_wire_shape() {
        let block = LeafletBlock::text(
            "hi",
            vec![LeafletFacet::new(
                ByteSlice::new(0, 2),
                vec![
                    LeafletFeature::Bold,
                    LeafletFeature::Link { uri: "u".into() },
                ],
            )],
        );
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "$type": "pub.leaflet.blocks.text",
                "plaintext": "hi",
                "facets": [{
                    "index": { "byteStart": 0, "byteEnd": 2 },
                    "features": [
                        { "$type": "pub.leaflet.richtext.facet#bold" },
                        { "$type": "pub.leaflet.richtext.facet#link", "uri": "u" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn nested_list_reads() {
        let block: LeafletBlock = serde_json::from_value(json!({
            "$type": "pub.leaflet.blocks.unorderedList",
            "children": [{
                "$type": "pub.leaflet.blocks.unorderedList#listItem",
                "content": { "$type": "pub.leaflet.blocks.text", "plaintext": "a" },
                "children": [{
                    "$type": "pub.leaflet.blocks.unorderedList#listItem",
                    "content": { "$type": "pub.leaflet.blocks.text", "plaintext": "b" }
                }]
            }]
        }))
        .unwrap();
        let LeafletBlock::UnorderedList { children } = block else {
            panic!("expected list");
        };
        assert_eq!(children[0].children.len(), 1);
        assert_eq!(
            *children[0].children[0].content,
            LeafletBlock::text("b", vec![])
        );
    }

    #[test]
    fn header_level_defaults_to_one() {
        let block: LeafletBlock = serde_json::from_value(json!({
            "$type": "pub.leaflet.blocks.header",
            "plaintext": "T"
        }))
        .unwrap();
        assert_eq!(
            block,
            LeafletBlock::Header {
                level: 1,
                plaintext: "T".into(),
                facets: vec![]
            }
        );
    }
}
