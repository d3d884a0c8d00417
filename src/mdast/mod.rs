//! Intermediate document AST ("mdast").
//!
//! Unlike the editor tree, phrasing content nests: emphasis is a wrapper node
//! around its children rather than a mark on a text run. The serde shape
//! matches mdast JSON (`{"type": "strong", "children": [...]}`) so trees can
//! be handed to external mdast consumers unchanged.
//!
//! - [`Root`] - the document root produced by lowering
//! - [`Node`] - every block and phrasing node
//! - [`compact`] - mandatory merge pass over adjacent siblings

use serde::{Deserialize, Serialize};

pub mod compact;

pub use compact::{compact, compact_children, compact_root};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "root")]
pub struct Root {
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        depth: u8,
        children: Vec<Node>,
    },
    List {
        ordered: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        #[serde(default)]
        spread: bool,
        children: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        spread: bool,
        children: Vec<Node>,
    },
    Blockquote {
        children: Vec<Node>,
    },
    Code {
        #[serde(default)]
        lang: Option<String>,
        value: String,
    },
    ThematicBreak,
    Html {
        value: String,
    },
    Text {
        value: String,
    },
    Strong {
        children: Vec<Node>,
    },
    Emphasis {
        children: Vec<Node>,
    },
    Delete {
        children: Vec<Node>,
    },
    InlineCode {
        value: String,
    },
    Link {
        url: String,
        #[serde(default)]
        title: Option<String>,
        children: Vec<Node>,
    },
    Break,
    Image {
        url: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        alt: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    LinkReference {
        identifier: String,
        #[serde(default)]
        label: Option<String>,
        reference_type: ReferenceType,
        children: Vec<Node>,
    },
    #[serde(rename_all = "camelCase")]
    ImageReference {
        identifier: String,
        #[serde(default)]
        label: Option<String>,
        reference_type: ReferenceType,
        #[serde(default)]
        alt: Option<String>,
    },
    FootnoteReference {
        identifier: String,
        #[serde(default)]
        label: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Shortcut,
    Collapsed,
    Full,
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn html(value: impl Into<String>) -> Self {
        Node::Html {
            value: value.into(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    pub fn strong(children: Vec<Node>) -> Self {
        Node::Strong { children }
    }

    pub fn emphasis(children: Vec<Node>) -> Self {
        Node::Emphasis { children }
    }

    /// The mdast `type` tag of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::List { .. } => "list",
            Node::ListItem { .. } => "listItem",
            Node::Blockquote { .. } => "blockquote",
            Node::Code { .. } => "code",
            Node::ThematicBreak => "thematicBreak",
            Node::Html { .. } => "html",
            Node::Text { .. } => "text",
            Node::Strong { .. } => "strong",
            Node::Emphasis { .. } => "emphasis",
            Node::Delete { .. } => "delete",
            Node::InlineCode { .. } => "inlineCode",
            Node::Link { .. } => "link",
            Node::Break => "break",
            Node::Image { .. } => "image",
            Node::LinkReference { .. } => "linkReference",
            Node::ImageReference { .. } => "imageReference",
            Node::FootnoteReference { .. } => "footnoteReference",
        }
    }

    /// Whether the node may appear inside a paragraph or heading.
    pub fn is_phrasing(&self) -> bool {
        matches!(
            self,
            Node::Text { .. }
                | Node::Strong { .. }
                | Node::Emphasis { .. }
                | Node::Delete { .. }
                | Node::InlineCode { .. }
                | Node::Link { .. }
                | Node::Break
                | Node::Html { .. }
                | Node::Image { .. }
                | Node::LinkReference { .. }
                | Node::ImageReference { .. }
                | Node::FootnoteReference { .. }
        )
    }

    /// Whether the node may appear as a child of the root, a blockquote or a
    /// list item. `html` is both flow and phrasing.
    pub fn is_flow(&self) -> bool {
        matches!(
            self,
            Node::Paragraph { .. }
                | Node::Heading { .. }
                | Node::List { .. }
                | Node::ListItem { .. }
                | Node::Blockquote { .. }
                | Node::Code { .. }
                | Node::ThematicBreak
                | Node::Html { .. }
        )
    }

    /// String payload (`value`) for literal nodes.
    pub fn value(&self) -> Option<&str> {
        match self {
            Node::Text { value }
            | Node::Html { value }
            | Node::InlineCode { value }
            | Node::Code { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut String> {
        match self {
            Node::Text { value }
            | Node::Html { value }
            | Node::InlineCode { value }
            | Node::Code { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Blockquote { children }
            | Node::Strong { children }
            | Node::Emphasis { children }
            | Node::Delete { children }
            | Node::Link { children, .. }
            | Node::LinkReference { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Blockquote { children }
            | Node::Strong { children }
            | Node::Emphasis { children }
            | Node::Delete { children }
            | Node::Link { children, .. }
            | Node::LinkReference { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Same type and same attributes, ignoring `value` and `children`.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (
                Node::Link { url, title, .. },
                Node::Link {
                    url: other_url,
                    title: other_title,
                    ..
                },
            ) => url == other_url && title == other_title,
            (
                Node::LinkReference {
                    identifier,
                    label,
                    reference_type,
                    ..
                },
                Node::LinkReference {
                    identifier: other_identifier,
                    label: other_label,
                    reference_type: other_reference_type,
                    ..
                },
            ) => {
                identifier == other_identifier
                    && label == other_label
                    && reference_type == other_reference_type
            }
            (Node::Heading { depth, .. }, Node::Heading { depth: other, .. }) => depth == other,
            (Node::Code { lang, .. }, Node::Code { lang: other, .. }) => lang == other,
            _ => self.kind() == other.kind(),
        }
    }

    /// Concatenated literal text below this node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Html { .. } => {}
        Node::Image { alt, .. } | Node::ImageReference { alt, .. } => {
            if let Some(alt) = alt {
                out.push_str(alt);
            }
        }
        _ => {
            if let Some(value) = node.value() {
                out.push_str(value);
            }
            for child in node.children().unwrap_or_default() {
                collect_text(child, out);
            }
        }
    }
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            collect_text(child, &mut out);
        }
        out
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
