//! Segment-style flattening to Bluesky records

use proptest::collection::vec;
use proptest::prelude::*;
use richtext_bridge::pipeline::BoxError;
use richtext_bridge::{
    BskyFacet, BskyFeature, ByteSlice, ConvertConfig, EditorNode, FacetDetector, Mark, Options,
    convert, default_plugins, lower, to_bluesky_record, to_plain_text,
};
use serde_json::json;

fn run_strategy() -> impl Strategy<Value = EditorNode> {
    let text = vec(
        prop_oneof![
            Just("a"),
            Just("b"),
            Just(" "),
            Just("é"),
            Just("💖"),
            Just("日本")
        ],
        1..6,
    )
    .prop_map(|parts| parts.concat());
    let marks = prop_oneof![
        2 => Just(Vec::new()),
        1 => Just(vec![Mark::new("bold")]),
        1 => Just(vec![Mark::link("https://one.example")]),
        1 => Just(vec![Mark::new("italic"), Mark::link("https://two.example")]),
        1 => Just(vec![Mark::new("underline")]),
    ];
    (text, marks).prop_map(|(text, marks)| EditorNode::marked_text(text, marks))
}

fn doc_strategy() -> impl Strategy<Value = EditorNode> {
    vec(vec(run_strategy(), 1..5).prop_map(EditorNode::paragraph), 1..4)
        .prop_map(EditorNode::doc)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]

    /// Property: facets are sorted, disjoint, and never touch another facet
    /// with the same uri; gaps plus facet slices rebuild the text exactly
    #[test]
    fn prop_facets_do_not_overlap(doc in doc_strategy()) {
        let root = lower(&doc, &default_plugins()).unwrap();
        let record = to_bluesky_record(&root, &ConvertConfig::plain(), None).unwrap();

        let mut rebuilt = String::new();
        let mut cursor = 0usize;
        for facet in &record.facets {
            let ByteSlice { byte_start, byte_end } = facet.index;
            prop_assert!(byte_start >= cursor, "facet starts inside the previous one");
            prop_assert!(byte_start < byte_end);
            prop_assert!(byte_end <= record.text.len());
            prop_assert!(record.text.is_char_boundary(byte_start));
            prop_assert!(record.text.is_char_boundary(byte_end));
            rebuilt.push_str(&record.text[cursor..byte_start]);
            rebuilt.push_str(&record.text[byte_start..byte_end]);
            cursor = byte_end;
        }
        rebuilt.push_str(&record.text[cursor..]);
        prop_assert_eq!(&rebuilt, &record.text);

        for pair in record.facets.windows(2) {
            let touching = pair[0].index.byte_end == pair[1].index.byte_start;
            prop_assert!(!(touching && pair[0].features == pair[1].features));
        }
    }

    /// Property: the record text is the inline-link-free plain text
    #[test]
    fn prop_record_text_drops_only_urls(doc in doc_strategy()) {
        let root = lower(&doc, &default_plugins()).unwrap();
        let record = to_bluesky_record(&root, &ConvertConfig::plain(), None).unwrap();
        let expanded = to_plain_text(&root, &ConvertConfig::plain()).unwrap();
        let stripped = expanded
            .replace(" (https://one.example)", "")
            .replace(" (https://two.example)", "");
        prop_assert_eq!(record.text, stripped);
    }
}

#[test]
fn test_emoji_offsets_are_bytes() {
    let doc = EditorNode::from_json(json!({
        "type": "doc",
        "content": [{ "type": "paragraph", "content": [
            { "type": "text", "text": "💖💖 " },
            { "type": "text", "text": "fujocoded", "marks": [{ "type": "link", "attrs": { "href": "https://fujocoded.com" } }] }
        ] }]
    }))
    .unwrap();
    let records = convert::editor_to_bluesky(&doc, &Options::default()).unwrap();
    assert_eq!(records[0].text, "💖💖 fujocoded");
    assert_eq!(records[0].facets[0].index, ByteSlice::new(9, 18));
}

#[test]
fn test_code_block_goes_monospace() {
    let doc = EditorNode::from_json(json!({
        "type": "doc",
        "content": [
            { "type": "paragraph", "content": [{ "type": "text", "text": "run " }] },
            { "type": "codeBlock", "content": [{ "type": "text", "text": "ls -a" }] }
        ]
    }))
    .unwrap();
    let texts = convert::editor_to_plain_text(&doc, &Options::default()).unwrap();
    assert_eq!(texts, vec!["run\n\n𝚕𝚜 -𝚊"]);
}

#[test]
fn test_wire_shape() {
    let doc = EditorNode::from_json(json!({
        "type": "doc",
        "content": [{ "type": "paragraph", "content": [
            { "type": "text", "text": "hi", "marks": [{ "type": "link", "attrs": { "href": "https://x.y" } }] }
        ] }]
    }))
    .unwrap();
    let records = convert::editor_to_bluesky(&doc, &Options::default()).unwrap();
    assert_eq!(
        serde_json::to_value(&records[0]).unwrap(),
        json!({
            "text": "hi",
            "facets": [{
                "index": { "byteStart": 0, "byteEnd": 2 },
                "features": [{ "$type": "app.bsky.richtext.facet#link", "uri": "https://x.y" }]
            }]
        })
    );
}

struct HandleDetector;

impl FacetDetector for HandleDetector {
    fn detect(&self, text: &str) -> Result<Vec<BskyFacet>, BoxError> {
        Ok(text
            .match_indices("@fujin")
            .map(|(start, handle)| {
                BskyFacet::new(
                    ByteSlice::new(start, start + handle.len()),
                    vec![BskyFeature::Mention {
                        did: "did:plc:fujin".into(),
                    }],
                )
            })
            .collect())
    }
}

#[test]
fn test_detected_facets_yield_to_explicit_links() {
    let doc = EditorNode::from_json(json!({
        "type": "doc",
        "content": [{ "type": "paragraph", "content": [
            { "type": "text", "text": "@fujin", "marks": [{ "type": "link", "attrs": { "href": "https://x.y" } }] },
            { "type": "text", "text": " and @fujin" }
        ] }]
    }))
    .unwrap();
    let options = Options::default().with_detector(HandleDetector);
    let record = &convert::editor_to_bluesky(&doc, &options).unwrap()[0];

    assert_eq!(record.facets.len(), 2);
    assert_eq!(record.facets[0].index, ByteSlice::new(0, 6));
    assert_eq!(
        record.facets[0].features[0].known(),
        Some(&BskyFeature::Link {
            uri: "https://x.y".into()
        })
    );
    assert_eq!(record.facets[1].index, ByteSlice::new(11, 17));
}

struct FailingDetector;

impl FacetDetector for FailingDetector {
    fn detect(&self, _text: &str) -> Result<Vec<BskyFacet>, BoxError> {
        Err("service unavailable".into())
    }
}

#[test]
fn test_detector_failure_propagates() {
    let doc = EditorNode::doc(vec![EditorNode::paragraph(vec![EditorNode::text("x")])]);
    let options = Options::default().with_detector(FailingDetector);
    let err = convert::editor_to_bluesky(&doc, &options).unwrap_err();
    assert!(err.to_string().contains("service unavailable"));
}
