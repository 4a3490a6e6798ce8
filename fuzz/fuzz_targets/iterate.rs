#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::{json, RawDocument};

fuzz_target!(|buf: &[u8]| {
    let doc = RawDocument::from_bytes_unchecked(buf);
    for element in doc {
        assert!(element.next_offset() < buf.len());
        let _ = element.value();
    }
    let _ = json::to_json(doc);
});
