#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::{builder::Builder, raw::RawBsonRef, RawDocument};

fuzz_target!(|buf: &[u8]| {
    let doc = RawDocument::from_bytes_unchecked(buf);
    if doc.validate().is_ok() {
        // anything that validates can be copied element by element
        let mut builder = Builder::new_document();
        for element in doc {
            let value: RawBsonRef = element.value().unwrap();
            builder.key(element.key()).unwrap();
            builder.append(value).unwrap();
        }
        assert_eq!(builder.extract_document().unwrap().as_bytes(), buf);
    }
});
