//! Record → editor reconstruction, round trips, and the naive oracle

use proptest::collection::vec;
use proptest::prelude::*;
use richtext_bridge::{
    BlueskyRecord, BskyFacet, BskyFeature, ByteSlice, ConvertConfig, EditorNode, Mark, Options,
    bluesky_to_editor, convert, reconstruct,
};
use richtext_bridge_naive_oracle::{bluesky_chars, editor_links};
use serde_json::json;

fn text_strategy() -> impl Strategy<Value = String> {
    vec(
        prop_oneof![
            Just("a"),
            Just("z"),
            Just(" "),
            Just("ñ"),
            Just("🐈"),
            Just("👩‍💻"),
            Just("中"),
        ],
        1..8,
    )
    .prop_map(|parts| parts.concat())
}

fn editor_doc_strategy() -> impl Strategy<Value = EditorNode> {
    let run = (
        text_strategy(),
        prop_oneof![
            Just(Vec::new()),
            Just(vec![Mark::new("bold")]),
            Just(vec![Mark::link("https://fujocoded.com")]),
            Just(vec![Mark::new("code")]),
        ],
    )
        .prop_map(|(text, marks)| EditorNode::marked_text(text, marks));
    vec(vec(run, 1..4).prop_map(EditorNode::paragraph), 1..4).prop_map(EditorNode::doc)
}

/// Record text with newlines, and facets cut at sorted char boundaries.
fn record_strategy() -> impl Strategy<Value = BlueskyRecord> {
    let text = vec(
        prop_oneof![Just("x"), Just("é"), Just("💖"), Just(" "), Just("\n"), Just("\n\n")],
        0..12,
    )
    .prop_map(|parts| parts.concat());
    (text, vec(any::<usize>(), 0..8), vec(any::<bool>(), 4)).prop_map(
        |(text, picks, mentions)| {
            let boundaries: Vec<usize> = text
                .char_indices()
                .map(|(offset, _)| offset)
                .chain([text.len()])
                .collect();
            let mut cuts: Vec<usize> = picks
                .iter()
                .map(|pick| boundaries[pick % boundaries.len()])
                .collect();
            cuts.sort_unstable();
            cuts.dedup();
            let facets = cuts
                .chunks_exact(2)
                .enumerate()
                .map(|(index, pair)| {
                    let feature = if mentions[index % mentions.len()] {
                        BskyFeature::Mention {
                            did: format!("did:plc:{index}"),
                        }
                    } else {
                        BskyFeature::Link {
                            uri: format!("https://example.com/{index}"),
                        }
                    };
                    BskyFacet::new(ByteSlice::new(pair[0], pair[1]), vec![feature])
                })
                .collect();
            BlueskyRecord { text, facets }
        },
    )
}

fn plain_options() -> Options {
    Options::new(ConvertConfig::plain())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]

    /// Property: lower → flatten → reconstruct keeps every character and
    /// every link target, including multi-byte sequences
    #[test]
    fn prop_bluesky_round_trip_keeps_text(doc in editor_doc_strategy()) {
        let options = plain_options();
        let records = convert::editor_to_bluesky(&doc, &options).unwrap();
        prop_assert_eq!(records.len(), 1);
        let rebuilt = reconstruct(&records[0], &options);

        // Code comes back in the monospace alphabet, one char for one char.
        prop_assert_eq!(
            rebuilt.text_content().chars().count(),
            doc.text_content().chars().count()
        );

        let has_code = doc
            .content
            .iter()
            .flat_map(|paragraph| &paragraph.content)
            .any(|run| run.marks.iter().any(|mark| mark.is("code")));
        if !has_code {
            prop_assert_eq!(rebuilt.text_content(), doc.text_content());
            prop_assert_eq!(editor_links(&rebuilt), editor_links(&doc));
        }
    }

    /// Property: segment reconstruction agrees with a char-by-char byte walk
    #[test]
    fn prop_matches_naive_oracle(record in record_strategy()) {
        let options = Options::default();
        let rebuilt = reconstruct(&record, &options);
        let expected = bluesky_chars(&record, |did| options.resolve_mention(did));
        prop_assert_eq!(editor_links(&rebuilt), expected);
    }

    /// Property: reconstruction never loses a non-newline byte
    #[test]
    fn prop_text_survives_reconstruction(record in record_strategy()) {
        let rebuilt = reconstruct(&record, &Options::default());
        prop_assert_eq!(rebuilt.text_content(), record.text.replace('\n', ""));
    }
}

#[test]
fn test_link_inverse_scenario() {
    let doc = bluesky_to_editor(
        json!({
            "text": "Check out https://fujocoded.com for more info",
            "facets": [{
                "index": { "byteStart": 10, "byteEnd": 31 },
                "features": [{ "$type": "app.bsky.richtext.facet#link", "uri": "https://fujocoded.com" }]
            }]
        }),
        &Options::default(),
    )
    .unwrap();

    assert_eq!(
        doc.to_json().unwrap(),
        json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    { "type": "text", "text": "Check out " },
                    { "type": "text", "text": "https://fujocoded.com",
                      "marks": [{ "type": "link", "attrs": { "href": "https://fujocoded.com" } }] },
                    { "type": "text", "text": " for more info" }
                ]
            }]
        })
    );
}

#[test]
fn test_paragraphs_and_hard_breaks() {
    let doc = bluesky_to_editor(
        json!({ "text": "line one\nline two\n\n\nnext" }),
        &Options::default(),
    )
    .unwrap();
    assert_eq!(doc.content.len(), 2);
    let first: Vec<&str> = doc.content[0]
        .content
        .iter()
        .map(|node| node.text.as_deref().unwrap_or(node.node_type.as_str()))
        .collect();
    assert_eq!(first, vec!["line one", "hardBreak", "line two"]);
    assert_eq!(doc.content[1].text_content(), "next");
}

#[test]
fn test_unsorted_and_overlapping_facets() {
    let link = |start, end, uri: &str| {
        BskyFacet::new(
            ByteSlice::new(start, end),
            vec![BskyFeature::Link { uri: uri.into() }],
        )
    };
    let record = BlueskyRecord {
        text: "abcdef".into(),
        facets: vec![link(4, 6, "late"), link(0, 3, "early"), link(2, 5, "clash")],
    };
    let doc = reconstruct(&record, &Options::default());
    assert_eq!(doc.text_content(), "abcdef");
    let hrefs: Vec<Option<String>> = editor_links(&doc).into_iter().map(|(_, href)| href).collect();
    assert_eq!(
        hrefs,
        vec![
            Some("early".into()),
            Some("early".into()),
            Some("early".into()),
            None,
            Some("late".into()),
            Some("late".into()),
        ]
    );
}

#[test]
fn test_facet_past_the_end_is_clamped() {
    let doc = bluesky_to_editor(
        json!({
            "text": "hey",
            "facets": [{
                "index": { "byteStart": 1, "byteEnd": 40 },
                "features": [{ "$type": "app.bsky.richtext.facet#link", "uri": "u" }]
            }]
        }),
        &Options::default(),
    )
    .unwrap();
    let content = &doc.content[0].content;
    assert_eq!(content.len(), 2);
    assert_eq!(content[1].text.as_deref(), Some("ey"));
}
