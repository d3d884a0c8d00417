//! One-call conversions.
//!
//! Forward conversions run the full pipeline, so one editor document can yield
//! several outputs when a fan-out transform (such as [`split_at`]) is
//! configured; results come back in document order.
//!
//! [`split_at`]: crate::pipeline::split_at

use crate::Error;
use crate::config::Options;
use crate::editor::EditorNode;
use crate::facet::BlueskyRecord;
use crate::flatten::{to_bluesky_record, to_plain_text};
use crate::leaflet::{LeafletBlock, to_leaflet_blocks};
use crate::mdast::Root;
use crate::pipeline::{self, PipelineError};
use serde_json::Value;

pub use crate::leaflet::leaflet_to_editor;
pub use crate::reconstruct::bluesky_to_editor;

pub fn editor_to_mdast(doc: &EditorNode, options: &Options) -> Result<Vec<Root>, PipelineError> {
    pipeline::run(doc, &options.json_doc_plugins, &options.transforms)
}

/// Link-expanded plain text, one string per output tree.
pub fn editor_to_plain_text(doc: &EditorNode, options: &Options) -> Result<Vec<String>, Error> {
    let mut out = Vec::new();
    for root in editor_to_mdast(doc, options)? {
        out.push(to_plain_text(&root, &options.config)?);
    }
    Ok(out)
}

pub fn editor_to_bluesky(
    doc: &EditorNode,
    options: &Options,
) -> Result<Vec<BlueskyRecord>, Error> {
    let detector = options.detector.as_deref();
    let mut out = Vec::new();
    for root in editor_to_mdast(doc, options)? {
        out.push(to_bluesky_record(&root, &options.config, detector)?);
    }
    Ok(out)
}

pub fn editor_to_leaflet(
    doc: &EditorNode,
    options: &Options,
) -> Result<Vec<Vec<LeafletBlock>>, Error> {
    let mut out = Vec::new();
    for root in editor_to_mdast(doc, options)? {
        out.push(to_leaflet_blocks(&root)?);
    }
    Ok(out)
}

/// Parses editor JSON; accepts the document under a `doc` key as well.
pub fn parse_editor(value: Value) -> Result<EditorNode, Error> {
    let value = match value {
        Value::Object(mut map) if map.get("doc").is_some_and(Value::is_object) => {
            map.remove("doc").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(EditorNode::from_json(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertConfig;
    use crate::pipeline::split_at;
    use serde_json::json;

    fn sample() -> EditorNode {
        EditorNode::from_json(json!({
            "type": "doc",
            "content": [
                { "type": "heading", "attrs": { "level": 1 }, "content": [{ "type": "text", "text": "Notes" }] },
                { "type": "paragraph", "content": [
                    { "type": "text", "text": "read " },
                    { "type": "text", "text": "this", "marks": [{ "type": "link", "attrs": { "href": "https://x.y" } }] }
                ] },
                { "type": "threadBreak" },
                { "type": "paragraph", "content": [{ "type": "text", "text": "second" }] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn social_text_brackets_the_title() {
        let options = Options::default().with_transform(split_at("threadBreak"));
        let texts = editor_to_plain_text(&sample(), &options).unwrap();
        assert_eq!(texts, vec!["[Notes] read this (https://x.y)", "second"]);
    }

    #[test]
    fn bluesky_records_per_split() {
        let options = Options::default().with_transform(split_at("threadBreak"));
        let records = editor_to_bluesky(&sample(), &options).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "[Notes] read this");
        assert_eq!(records[0].facets[0].index.range(), 13..17);
    }

    #[test]
    fn unsplit_unknown_node_is_an_error() {
        let err = editor_to_bluesky(&sample(), &Options::new(ConvertConfig::plain())).unwrap_err();
        assert!(err.to_string().contains("threadBreak"), "{err}");
    }

    #[test]
    fn parse_accepts_wrapped_doc() {
        let doc = parse_editor(json!({ "doc": { "type": "doc", "content": [] } })).unwrap();
        assert!(doc.is("doc"));
    }
}
