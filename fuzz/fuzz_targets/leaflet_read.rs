#![no_main]

use libfuzzer_sys::fuzz_target;
use richtext_bridge::leaflet_to_editor;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = leaflet_to_editor(value);
    }
});
