#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::{
    binary::{Float32, Int8, PackedBit, Vector, VectorView},
    Binary,
};

fuzz_target!(|buf: &[u8]| {
    let _ = VectorView::<Int8>::from_bytes(buf).map(|v| v.iter().count());
    let _ = VectorView::<Float32>::from_bytes(buf).map(|v| v.iter().count());
    let _ = VectorView::<PackedBit>::from_bytes(buf).map(|v| v.iter().count());

    if let Ok(vector) = Vector::from_bytes(buf) {
        // NaN payloads compare unequal, so compare the encoding instead
        assert_eq!(Binary::from(&vector).bytes, buf);
    }
});
