//! A naive, simple oracle implementation for differential testing.
//!
//! Everything here walks text one character at a time and looks up the
//! covering facets by linear scan. No segmenting, no span merging.
use richtext_bridge::{
    BlueskyRecord, BskyFeature, EditorNode, LeafletFacet, LeafletFeature, Mark,
};

/// Each non-newline character of `record.text` with the link target of the
/// first facet covering its first byte.
pub fn bluesky_chars(
    record: &BlueskyRecord,
    resolve_mention: impl Fn(&str) -> String,
) -> Vec<(char, Option<String>)> {
    let mut out = Vec::new();
    for (offset, ch) in record.text.char_indices() {
        if ch == '\n' {
            continue;
        }
        let href = record
            .facets
            .iter()
            .find(|facet| facet.index.byte_start <= offset && offset < facet.index.byte_end)
            .and_then(|facet| {
                facet.features.iter().find_map(|feature| match feature.known()? {
                    BskyFeature::Link { uri } => Some(uri.clone()),
                    BskyFeature::Mention { did } => Some(resolve_mention(did)),
                    BskyFeature::Tag { .. } => None,
                })
            });
        out.push((ch, href));
    }
    out
}

/// Each non-newline character of `plaintext` with every known feature of every
/// facet covering it, sorted and deduplicated.
pub fn leaflet_chars(plaintext: &str, facets: &[LeafletFacet]) -> Vec<(char, Vec<LeafletFeature>)> {
    let mut out = Vec::new();
    for (offset, ch) in plaintext.char_indices() {
        if ch == '\n' {
            continue;
        }
        let mut features = Vec::new();
        for facet in facets {
            if facet.index.byte_start <= offset && offset < facet.index.byte_end {
                for feature in &facet.features {
                    if let Some(known) = feature.known()
                        && !features.contains(known)
                    {
                        features.push(known.clone());
                    }
                }
            }
        }
        features.sort();
        out.push((ch, features));
    }
    out
}

/// Each character of every text node below `node`, in document order, with
/// the marks of the node it came from.
pub fn editor_chars(node: &EditorNode) -> Vec<(char, Vec<Mark>)> {
    let mut out = Vec::new();
    collect(node, &mut out);
    out
}

fn collect(node: &EditorNode, out: &mut Vec<(char, Vec<Mark>)>) {
    if let Some(text) = &node.text {
        for ch in text.chars() {
            out.push((ch, node.marks.clone()));
        }
    }
    for child in &node.content {
        collect(child, out);
    }
}

/// `href` of the link mark on each character of `node`.
pub fn editor_links(node: &EditorNode) -> Vec<(char, Option<String>)> {
    editor_chars(node)
        .into_iter()
        .map(|(ch, marks)| {
            let href = marks
                .iter()
                .find(|mark| mark.is("link"))
                .and_then(|mark| mark.attr_str("href"))
                .map(str::to_string);
            (ch, href)
        })
        .collect()
}
