//! Editor document tree (ProseMirror-style JSON).
//!
//! The tree is a plain owned structure: every node owns its children, so a
//! `clone()` is a full structural copy. Conversions never mutate a caller's
//! tree; they clone what they need.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DOC: &str = "doc";
pub const PARAGRAPH: &str = "paragraph";
pub const TEXT: &str = "text";
pub const HEADING: &str = "heading";
pub const BULLET_LIST: &str = "bulletList";
pub const ORDERED_LIST: &str = "orderedList";
pub const LIST_ITEM: &str = "listItem";
pub const BLOCKQUOTE: &str = "blockquote";
pub const CODE_BLOCK: &str = "codeBlock";
pub const IMAGE: &str = "image";
pub const HORIZONTAL_RULE: &str = "horizontalRule";
pub const HARD_BREAK: &str = "hardBreak";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Map::is_empty"
    )]
    pub attrs: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub content: Vec<EditorNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Map::is_empty"
    )]
    pub attrs: Map<String, Value>,
}

impl EditorNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attrs: Map::new(),
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn doc(content: Vec<EditorNode>) -> Self {
        Self::new(DOC).with_content(content)
    }

    pub fn paragraph(content: Vec<EditorNode>) -> Self {
        Self::new(PARAGRAPH).with_content(content)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(TEXT)
        }
    }

    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            marks,
            ..Self::text(text)
        }
    }

    pub fn hard_break() -> Self {
        Self::new(HARD_BREAK)
    }

    pub fn with_content(mut self, content: Vec<EditorNode>) -> Self {
        self.content = content;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn is(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }

    /// String attribute, `None` when absent or not a string.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attrs.get(key).and_then(Value::as_u64)
    }

    /// Concatenated text of every text node below this one.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn collect_text(node: &EditorNode, out: &mut String) {
    if let Some(text) = &node.text {
        out.push_str(text);
    }
    for child in &node.content {
        collect_text(child, out);
    }
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs: Map::new(),
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::new("link").with_attr("href", href.into())
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn is(&self, mark_type: &str) -> bool {
        self.mark_type == mark_type
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }
}

// ProseMirror emits `"attrs": null` and `"marks": null` in some serializers.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_prosemirror_json() {
        let doc = EditorNode::from_json(json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "attrs": null,
                "content": [
                    { "type": "text", "text": "Hi ", "marks": [{ "type": "bold" }] },
                    { "type": "text", "text": "there", "marks": [{ "type": "link", "attrs": { "href": "https://x.y" } }] }
                ]
            }]
        }))
        .unwrap();

        assert!(doc.is(DOC));
        let paragraph = &doc.content[0];
        assert!(paragraph.attrs.is_empty());
        assert_eq!(paragraph.content[1].marks[0].attr_str("href"), Some("https://x.y"));
        assert_eq!(doc.text_content(), "Hi there");
    }

    #[test]
    fn serializes_without_empty_fields() {
        let doc = EditorNode::doc(vec![EditorNode::paragraph(vec![EditorNode::text("a")])]);
        let value = doc.to_json().unwrap();
        assert_eq!(
            value,
            json!({ "type": "doc", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "a" }] }] })
        );
    }

    #[test]
    fn non_string_attr_reads_as_none() {
        let node = EditorNode::new(IMAGE).with_attr("title", 7);
        assert_eq!(node.attr_str("title"), None);
    }
}
