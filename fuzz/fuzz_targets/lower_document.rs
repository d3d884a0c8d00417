#![no_main]

use libfuzzer_sys::fuzz_target;
use richtext_bridge::{ConvertConfig, EditorNode, Options, convert};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(doc) = EditorNode::from_json(value) else {
        return;
    };
    let options = Options::new(ConvertConfig::default());
    let _ = convert::editor_to_bluesky(&doc, &options);
    let _ = convert::editor_to_leaflet(&doc, &options);
});
