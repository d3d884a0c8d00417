//! Facet wire types shared by the Bluesky and Leaflet records.
//!
//! A facet addresses a byte range of the record's UTF-8 text. Offsets are
//! always UTF-8 byte counts: a Rust `str::len` is exactly that, and slicing
//! goes through [`slice_utf8`] so a range that splits a code point decodes
//! lossily instead of panicking.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

impl ByteSlice {
    pub fn new(byte_start: usize, byte_end: usize) -> Self {
        Self {
            byte_start,
            byte_end,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }

    pub fn is_empty(&self) -> bool {
        self.byte_end <= self.byte_start
    }

    pub fn overlaps(&self, other: &ByteSlice) -> bool {
        self.byte_start < other.byte_end && other.byte_start < self.byte_end
    }
}

/// A feature as it appears on the wire: either one this crate understands or
/// the raw JSON of one it does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Feature<K> {
    Known(K),
    Unknown(Value),
}

impl<K> Feature<K> {
    pub fn known(&self) -> Option<&K> {
        match self {
            Feature::Known(kind) => Some(kind),
            Feature::Unknown(_) => None,
        }
    }

    /// `$type` of an unrecognized feature, for logging.
    pub fn unknown_type(&self) -> Option<&str> {
        match self {
            Feature::Known(_) => None,
            Feature::Unknown(value) => value.get("$type").and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet<K> {
    pub index: ByteSlice,
    pub features: Vec<Feature<K>>,
}

impl<K> Facet<K> {
    pub fn new(index: ByteSlice, features: Vec<K>) -> Self {
        Self {
            index,
            features: features.into_iter().map(Feature::Known).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum BskyFeature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

pub type BskyFacet = Facet<BskyFeature>;

/// `app.bsky.feed.post`-shaped text: flat text plus non-overlapping facets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueskyRecord {
    pub text: String,
    #[serde(default)]
    pub facets: Vec<BskyFacet>,
}

/// Decodes `bytes[start..end]`, clamping the range to the buffer.
pub fn slice_utf8(bytes: &[u8], start: usize, end: usize) -> String {
    let end = end.min(bytes.len());
    let start = start.min(end);
    String::from_utf8_lossy(&bytes[start..end]).into_owned()
}

/// Removes a repository-record envelope: `{ "value": { ... } }` → `{ ... }`.
pub fn unwrap_record(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("value").is_some_and(Value::is_object) => {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    }
}
