#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::RawDocument;

fuzz_target!(|buf: &[u8]| {
    if buf.len() >= 4 {
        // Focus on document length field manipulation
        if let Ok(doc) = RawDocument::from_bytes(buf) {
            assert_eq!(doc.as_bytes().len(), buf.len());
            for _ in doc {}
        }
    }
});
