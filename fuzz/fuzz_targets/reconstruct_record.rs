#![no_main]

use libfuzzer_sys::fuzz_target;
use richtext_bridge::{BlueskyRecord, BskyFacet, BskyFeature, ByteSlice, Options, reconstruct};

// Byte 0 is the text length; every byte pair after the text is a facet range.
fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = (split as usize).min(rest.len());
    let (text, ranges) = rest.split_at(split);
    let facets = ranges
        .chunks_exact(2)
        .map(|pair| {
            BskyFacet::new(
                ByteSlice::new(pair[0] as usize, pair[1] as usize),
                vec![BskyFeature::Link { uri: "u".into() }],
            )
        })
        .collect();
    let record = BlueskyRecord {
        text: String::from_utf8_lossy(text).into_owned(),
        facets,
    };
    let _ = reconstruct(&record, &Options::default());
});
