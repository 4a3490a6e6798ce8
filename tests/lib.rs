use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rawbson::{
    binary::{Int8, PackedBit, PackedBitVector, Vector, VectorView},
    builder::{Builder, DocumentStream},
    error::{BuilderErrorKind, ErrorKind},
    json,
    raw::{ElementAccess, RawBsonRef, RawDocument},
    spec::BinarySubtype,
    Binary,
};

#[test]
fn nested_document_lookup() {
    let doc = DocumentStream::new()
        .key("a")
        .append(1)
        .key("b")
        .open_document()
        .key("c")
        .append("x")
        .close_document()
        .extract()
        .unwrap();

    let nested = doc.find("b").unwrap().get_document().unwrap();
    let elements: Vec<_> = nested
        .iter()
        .map(|e| (e.key(), e.value().unwrap()))
        .collect();
    assert_eq!(elements, [("c", RawBsonRef::String("x"))]);

    assert_eq!(json::to_json(&doc), r#"{"a":1,"b":{"c":"x"}}"#);
}

#[test]
fn int8_vector_payload() {
    let mut builder = Builder::new_document();
    builder.key("v").unwrap();
    let mut vector = builder.append_vector::<Int8>(3).unwrap();
    for (i, n) in [1, 2, 3].into_iter().enumerate() {
        vector.set(i, n).unwrap();
    }
    let doc = builder.extract_document().unwrap();

    let binary = doc.get_binary("v").unwrap();
    assert_eq!(binary.subtype, BinarySubtype::Vector);
    assert_eq!(binary.bytes, [0x03, 0x00, 0x01, 0x02, 0x03]);

    let view = VectorView::<Int8>::new(binary).unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(view.iter().collect::<Vec<_>>(), [1, 2, 3]);
}

#[test]
fn packed_bit_padding() {
    let vector = Vector::PackedBit(PackedBitVector::from_bits([true; 5]));
    let binary = Binary::from(&vector);
    assert_eq!(binary.bytes, [0x10, 0x03, 0b1111_1000]);

    let view = VectorView::<PackedBit>::from_bytes(&binary.bytes).unwrap();
    assert_eq!(view.len(), 5);
    assert_eq!(view.header().padding, 3);
    assert!(view.iter().all(|bit| bit));
}

#[test]
fn untrusted_bytes() {
    // the length prefix claims more bytes than there are
    let bytes = [0x10, 0x00, 0x00, 0x00, 0x0a, b'a', 0x00, 0x00];
    assert_matches!(
        RawDocument::from_bytes(&bytes).unwrap_err().kind,
        ErrorKind::MalformedValue { .. }
    );

    let view = RawDocument::from_bytes_unchecked(&bytes);
    assert_eq!(view.iter().count(), 0);
    assert!(view.validate().is_err());
}

#[test]
fn builder_misuse() {
    let mut builder = Builder::new_document();
    assert_matches!(
        builder.close_document().unwrap_err().kind,
        ErrorKind::Builder { kind: BuilderErrorKind::NoDocumentToClose, .. }
    );
    builder.key("a").unwrap();
    assert_matches!(
        builder.view_document().unwrap_err().kind,
        ErrorKind::Builder { kind: BuilderErrorKind::UnmatchedKeyInBuilder, .. }
    );
}
