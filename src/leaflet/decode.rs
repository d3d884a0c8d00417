//! Leaflet document → editor tree.
//!
//! Accepts a bare block list, `{ "blocks": [...] }`, or
//! `{ "pages": [{ "blocks": [...] }] }`, each optionally under a `value`
//! envelope. Block entries may be bare or wrapped as `{ "block": {...} }`.
//! A block that does not parse is logged and dropped; the rest of the
//! document still converts.

use super::spans::render_spans;
use super::{LeafletBlock, LeafletFacet, LeafletFeature, ListItem};
use crate::editor::{
    BLOCKQUOTE, BULLET_LIST, CODE_BLOCK, EditorNode, HEADING, HORIZONTAL_RULE, LIST_ITEM, Mark,
};
use crate::facet::{slice_utf8, unwrap_record};
use crate::reconstruct::{ParagraphBuilder, RecordError, push_inline};
use serde_json::Value;
use std::ops::Range;

pub fn leaflet_to_editor(document: Value) -> Result<EditorNode, RecordError> {
    let mut content = Vec::new();
    for entry in block_entries(unwrap_record(document))? {
        let entry = unwrap_block(entry);
        let block_type = entry
            .get("$type")
            .and_then(Value::as_str)
            .unwrap_or("<untyped>")
            .to_string();
        match serde_json::from_value::<LeafletBlock>(entry) {
            Ok(block) => content.extend(decode_block(&block)),
            Err(err) => {
                tracing::warn!(block_type = %block_type, error = %err, "dropping unreadable block");
            }
        }
    }

    if content.is_empty() {
        content.push(EditorNode::paragraph(Vec::new()));
    }
    Ok(EditorNode::doc(content))
}

fn block_entries(document: Value) -> Result<Vec<Value>, RecordError> {
    let mut map = match document {
        Value::Array(blocks) => return Ok(blocks),
        Value::Object(map) => map,
        _ => {
            return Err(RecordError::InvalidShape {
                expected: "a Leaflet document or block list",
            });
        }
    };

    if let Some(Value::Array(blocks)) = map.remove("blocks") {
        return Ok(blocks);
    }
    let Some(Value::Array(pages)) = map.remove("pages") else {
        return Err(RecordError::MissingField { field: "blocks" });
    };
    let mut blocks = Vec::new();
    for page in pages {
        match page {
            Value::Object(mut page) => match page.remove("blocks") {
                Some(Value::Array(page_blocks)) => blocks.extend(page_blocks),
                _ => tracing::warn!("page without a block list, skipped"),
            },
            _ => tracing::warn!("page is not an object, skipped"),
        }
    }
    Ok(blocks)
}

fn unwrap_block(entry: Value) -> Value {
    match entry {
        Value::Object(mut map) if map.get("block").is_some_and(Value::is_object) => {
            map.remove("block").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode_block(block: &LeafletBlock) -> Vec<EditorNode> {
    match block {
        LeafletBlock::Text { plaintext, facets } => paragraphs(plaintext, facets),
        LeafletBlock::Header {
            level,
            plaintext,
            facets,
        } => {
            let mut content = Vec::new();
            for (text, marks) in segments(plaintext, facets) {
                push_inline(&mut content, &text, &marks);
            }
            vec![
                EditorNode::new(HEADING)
                    .with_attr("level", (*level).clamp(1, 6))
                    .with_content(content),
            ]
        }
        LeafletBlock::Blockquote { plaintext, facets } => {
            vec![EditorNode::new(BLOCKQUOTE).with_content(paragraphs(plaintext, facets))]
        }
        LeafletBlock::Code {
            plaintext,
            language,
        } => {
            let mut node = EditorNode::new(CODE_BLOCK);
            if let Some(language) = language {
                node = node.with_attr("language", language.as_str());
            }
            if !plaintext.is_empty() {
                node = node.with_content(vec![EditorNode::text(plaintext.as_str())]);
            }
            vec![node]
        }
        LeafletBlock::HorizontalRule => vec![EditorNode::new(HORIZONTAL_RULE)],
        LeafletBlock::UnorderedList { children } => vec![bullet_list(children)],
        LeafletBlock::Website { src, title } => {
            let label = title.as_deref().filter(|title| !title.is_empty()).unwrap_or(src.as_str());
            vec![link_paragraph(label, src)]
        }
        LeafletBlock::Iframe { url } => vec![link_paragraph(url, url)],
    }
}

fn bullet_list(items: &[ListItem]) -> EditorNode {
    let items = items
        .iter()
        .map(|item| {
            let mut content = decode_block(&item.content);
            if !item.children.is_empty() {
                content.push(bullet_list(&item.children));
            }
            EditorNode::new(LIST_ITEM).with_content(content)
        })
        .collect();
    EditorNode::new(BULLET_LIST).with_content(items)
}

fn link_paragraph(label: &str, href: &str) -> EditorNode {
    if label.is_empty() {
        return EditorNode::paragraph(Vec::new());
    }
    EditorNode::paragraph(vec![EditorNode::marked_text(
        label,
        vec![Mark::link(href)],
    )])
}

fn paragraphs(plaintext: &str, facets: &[LeafletFacet]) -> Vec<EditorNode> {
    let mut builder = ParagraphBuilder::default();
    for (text, marks) in segments(plaintext, facets) {
        builder.push(&text, &marks);
    }
    builder.finish()
}

/// Cuts `plaintext` wherever the set of covering features changes.
fn segments(plaintext: &str, facets: &[LeafletFacet]) -> Vec<(String, Vec<Mark>)> {
    let bytes = plaintext.as_bytes();
    let mut marked: Vec<(Range<usize>, LeafletFeature)> = Vec::new();
    for facet in facets {
        if facet.index.byte_end > bytes.len() {
            tracing::warn!(
                byte_end = facet.index.byte_end,
                len = bytes.len(),
                "facet runs past the end of the text, clamped"
            );
        }
        for feature in &facet.features {
            match feature.known() {
                Some(known) => marked.push((facet.index.range(), known.clone())),
                None => tracing::warn!(
                    feature_type = feature.unknown_type().unwrap_or("<untyped>"),
                    "unrecognized facet feature, skipped"
                ),
            }
        }
    }

    render_spans(bytes.len(), marked)
        .into_iter()
        .map(|span| {
            let marks = span.marks.iter().map(editor_mark).collect();
            (slice_utf8(bytes, span.start, span.end), marks)
        })
        .collect()
}

fn editor_mark(feature: &LeafletFeature) -> Mark {
    match feature {
        LeafletFeature::Bold => Mark::new("bold"),
        LeafletFeature::Italic => Mark::new("italic"),
        LeafletFeature::Code => Mark::new("code"),
        LeafletFeature::Underline => Mark::new("underline"),
        LeafletFeature::Strikethrough => Mark::new("strike"),
        LeafletFeature::Link { uri } => Mark::link(uri.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::HARD_BREAK;
    use serde_json::json;

    fn text_block(plaintext: &str, facets: Value) -> Value {
        json!({ "$type": "pub.leaflet.blocks.text", "plaintext": plaintext, "facets": facets })
    }

    #[test]
    fn overlapping_facets_split_into_runs() {
        let doc = leaflet_to_editor(json!({
            "blocks": [text_block("bold both italic", json!([
                { "index": { "byteStart": 0, "byteEnd": 9 },
                  "features": [{ "$type": "pub.leaflet.richtext.facet#bold" }] },
                { "index": { "byteStart": 5, "byteEnd": 16 },
                  "features": [{ "$type": "pub.leaflet.richtext.facet#italic" }] }
            ]))]
        }))
        .unwrap();

        let runs: Vec<(String, Vec<Mark>)> = doc.content[0]
            .content
            .iter()
            .map(|node| (node.text.clone().unwrap_or_default(), node.marks.clone()))
            .collect();
        assert_eq!(
            runs,
            vec![
                ("bold ".to_string(), vec![Mark::new("bold")]),
                (
                    "both".to_string(),
                    vec![Mark::new("bold"), Mark::new("italic")]
                ),
                (" italic".to_string(), vec![Mark::new("italic")]),
            ]
        );
    }

    #[test]
    fn pages_and_wrapped_entries() {
        let doc = leaflet_to_editor(json!({
            "value": {
                "pages": [{
                    "blocks": [
                        { "$type": "pub.leaflet.pages.linearDocument#block",
                          "block": text_block("one", json!([])) },
                        text_block("two", json!([]))
                    ]
                }]
            }
        }))
        .unwrap();
        assert_eq!(doc.content.len(), 2);
        assert_eq!(doc.content[1].text_content(), "two");
    }

    #[test]
    fn unknown_block_is_dropped_alone() {
        let doc = leaflet_to_editor(json!([
            { "$type": "pub.leaflet.blocks.poll", "options": [] },
            text_block("kept", json!([]))
        ]))
        .unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].text_content(), "kept");
    }

    #[test]
    fn header_keeps_level_and_breaks() {
        let doc = leaflet_to_editor(json!([
            { "$type": "pub.leaflet.blocks.header", "level": 2, "plaintext": "a\n\nb" }
        ]))
        .unwrap();
        let heading = &doc.content[0];
        assert!(heading.is(HEADING));
        assert_eq!(heading.attr_u64("level"), Some(2));
        assert_eq!(heading.content.len(), 4);
        assert!(heading.content[1].is(HARD_BREAK));
    }

    #[test]
    fn list_items_recurse() {
        let doc = leaflet_to_editor(json!([{
            "$type": "pub.leaflet.blocks.unorderedList",
            "children": [{
                "$type": "pub.leaflet.blocks.unorderedList#listItem",
                "content": text_block("outer", json!([])),
                "children": [{
                    "$type": "pub.leaflet.blocks.unorderedList#listItem",
                    "content": text_block("inner", json!([]))
                }]
            }]
        }]))
        .unwrap();
        let list = &doc.content[0];
        assert!(list.is(BULLET_LIST));
        let item = &list.content[0];
        assert!(item.is(LIST_ITEM));
        assert_eq!(item.content[0].text_content(), "outer");
        assert!(item.content[1].is(BULLET_LIST));
        assert_eq!(item.content[1].text_content(), "inner");
    }

    #[test]
    fn website_degrades_to_link() {
        let doc = leaflet_to_editor(json!([
            { "$type": "pub.leaflet.blocks.website", "src": "https://a.b", "title": "A" }
        ]))
        .unwrap();
        let text = &doc.content[0].content[0];
        assert_eq!(text.text.as_deref(), Some("A"));
        assert_eq!(text.marks, vec![Mark::link("https://a.b")]);
    }

    #[test]
    fn not_a_document() {
        let err = leaflet_to_editor(json!("blocks")).unwrap_err();
        assert!(matches!(err, RecordError::InvalidShape { .. }));
        let err = leaflet_to_editor(json!({ "title": "x" })).unwrap_err();
        assert!(matches!(err, RecordError::MissingField { field: "blocks" }));
    }
}
