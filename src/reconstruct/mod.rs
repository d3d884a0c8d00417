//! Bluesky record → editor tree.
//!
//! The record text is walked as a UTF-8 byte buffer. Facets, sorted by start,
//! cut it into marked segments with unmarked gaps between them; each segment
//! is decoded from its byte slice and then regrouped into paragraphs.

use crate::config::Options;
use crate::editor::{EditorNode, Mark};
use crate::facet::{BlueskyRecord, BskyFacet, BskyFeature, slice_utf8, unwrap_record};
use serde_json::Value;

pub(crate) mod paragraphs;

pub(crate) use paragraphs::{ParagraphBuilder, push_inline};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record is missing `{field}`")]
    MissingField { field: &'static str },
    #[error("expected {expected}")]
    InvalidShape { expected: &'static str },
}

/// Reads a Bluesky record given bare or under a `value` envelope.
pub fn bluesky_to_editor(record: Value, options: &Options) -> Result<EditorNode, RecordError> {
    let record = unwrap_record(record);
    if !record.is_object() {
        return Err(RecordError::InvalidShape {
            expected: "a record object",
        });
    }
    if record.get("text").is_none() {
        return Err(RecordError::MissingField { field: "text" });
    }
    let record: BlueskyRecord = serde_json::from_value(record)?;
    Ok(reconstruct(&record, options))
}

pub fn reconstruct(record: &BlueskyRecord, options: &Options) -> EditorNode {
    let bytes = record.text.as_bytes();
    let mut facets: Vec<&BskyFacet> = record.facets.iter().collect();
    facets.sort_by_key(|facet| facet.index.byte_start);

    let mut paragraphs = ParagraphBuilder::default();
    let mut cursor = 0usize;
    for facet in facets {
        let start = facet.index.byte_start;
        let end = facet.index.byte_end.min(bytes.len());
        if facet.index.byte_end > bytes.len() {
            tracing::warn!(
                byte_end = facet.index.byte_end,
                len = bytes.len(),
                "facet runs past the end of the text, clamped"
            );
        }
        if start < cursor || end <= start {
            tracing::warn!(start, end, "skipping empty or overlapping facet");
            continue;
        }

        if start > cursor {
            paragraphs.push(&slice_utf8(bytes, cursor, start), &[]);
        }
        paragraphs.push(&slice_utf8(bytes, start, end), &facet_marks(facet, options));
        cursor = end;
    }
    if cursor < bytes.len() {
        paragraphs.push(&slice_utf8(bytes, cursor, bytes.len()), &[]);
    }

    EditorNode::doc(paragraphs.finish())
}

fn facet_marks(facet: &BskyFacet, options: &Options) -> Vec<Mark> {
    let mut marks: Vec<Mark> = Vec::with_capacity(facet.features.len());
    for feature in &facet.features {
        let mark = match feature.known() {
            Some(BskyFeature::Link { uri }) => Mark::link(uri.as_str()),
            Some(BskyFeature::Mention { did }) => Mark::link(options.resolve_mention(did)),
            Some(BskyFeature::Tag { tag }) => {
                tracing::warn!(tag = %tag, "no editor mark for tag facets, skipped");
                continue;
            }
            None => {
                tracing::warn!(
                    feature_type = feature.unknown_type().unwrap_or("<untyped>"),
                    "unrecognized facet feature, skipped"
                );
                continue;
            }
        };
        if marks.iter().any(|existing| existing.mark_type == mark.mark_type) {
            continue;
        }
        marks.push(mark);
    }
    marks
}
