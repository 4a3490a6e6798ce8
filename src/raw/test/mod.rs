mod props;

use std::borrow::Cow;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use super::*;
use crate::{
    builder::{ArrayStream, DocumentStream},
    error::ValueAccessErrorKind,
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
};

fn sample() -> RawDocumentBuf {
    DocumentStream::new()
        .key("apples")
        .append("oranges")
        .key("peanut butter")
        .append("chocolate")
        .key("easy as")
        .open_document()
        .key("do")
        .append(1)
        .key("re")
        .append(2)
        .key("mi")
        .append(3)
        .close_document()
        .extract()
        .unwrap()
}

#[test]
fn string_from_document() {
    let rawdoc = sample();
    assert_eq!(
        rawdoc.get("peanut butter").unwrap().unwrap().as_str().unwrap(),
        "chocolate",
    );
}

#[test]
fn nested_document() {
    let rawdoc = DocumentStream::new()
        .key("outer")
        .open_document()
        .key("inner")
        .append("surprise")
        .key("i64")
        .append(6_i64)
        .close_document()
        .extract()
        .unwrap();
    let subdoc = rawdoc
        .get("outer")
        .expect("get doc result")
        .expect("get doc option")
        .as_document()
        .expect("as doc");
    assert_eq!(subdoc.get_str("inner").expect("get str"), "surprise");
    assert_eq!(subdoc.get_i64("i64").expect("get i64"), 6);
}

#[test]
fn iterate() {
    let rawdoc = sample();
    let mut dociter = rawdoc.iter();

    let next = dociter.next().expect("no result");
    assert_eq!(next.key(), "apples");
    assert_eq!(next.element_type(), ElementType::String);
    assert_eq!(next.value().unwrap().as_str(), Some("oranges"));

    let next = dociter.next().expect("no result");
    assert_eq!(next.key(), "peanut butter");

    let next = dociter.next().expect("no result");
    assert_eq!(next.key(), "easy as");
    let inner = next.get_document().expect("result was not a document");
    let keys: Vec<_> = inner.iter().map(|e| e.key()).collect();
    assert_eq!(keys, ["do", "re", "mi"]);

    assert!(dociter.next().is_none());
    assert!(dociter.next().is_none());
    assert!(dociter.error().is_none());
}

#[test]
fn iteration_restarts() {
    let rawdoc = sample();
    let first: Vec<_> = rawdoc.iter().map(|e| e.key()).collect();
    let second: Vec<_> = rawdoc.iter().map(|e| e.key()).collect();
    assert_eq!(first, second);
    assert_eq!(rawdoc.iter().count(), 3);
}

#[test]
fn cursor_offsets() {
    let rawdoc = DocumentStream::new()
        .key("a")
        .append(1)
        .key("bb")
        .append("x")
        .extract()
        .unwrap();

    let first = rawdoc.iter().next().unwrap();
    assert_eq!(first.offset(), 4);
    assert_eq!(first.key_bytes(), b"a");
    assert_eq!(first.value_offset(), 7);
    assert_eq!(first.value_len(), 4);
    assert_eq!(first.value_bytes(), 1_i32.to_le_bytes());
    assert_eq!(first.next_offset(), 11);

    let second = first.next().unwrap().unwrap();
    assert_eq!(second.key(), "bb");
    assert_eq!(second.value_len(), 4 + 2);
    assert_eq!(second.next_offset(), rawdoc.as_bytes().len() - 1);
    assert!(second.next().unwrap().is_none());
}

#[test]
fn element_equality_is_by_position() {
    let rawdoc = sample();
    let copy = rawdoc.clone();

    let a = rawdoc.find("apples").unwrap();
    assert_eq!(a, rawdoc.iter().next().unwrap());
    assert_ne!(a, rawdoc.find("easy as").unwrap());
    // same bytes, different buffer
    assert_ne!(a, copy.find("apples").unwrap());
}

#[test]
fn find() {
    let rawdoc = sample();
    for key in ["apples", "peanut butter", "easy as"] {
        assert_eq!(rawdoc.find(key).unwrap().key(), key);
    }
    assert!(rawdoc.find("do").is_none());
    assert!(rawdoc.find("").is_none());
    assert!(rawdoc.get("missing").unwrap().is_none());
}

#[test]
fn typed_getters() {
    let oid = ObjectId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    let rawdoc = DocumentStream::new()
        .key("f64")
        .append(2.5)
        .key("bool")
        .append(true)
        .key("oid")
        .append(oid)
        .key("datetime")
        .append(RawBsonRef::DateTime(1_600_000_000_000))
        .key("regex")
        .append(RawRegexRef {
            pattern: r"end\s*$",
            options: "i",
        })
        .key("timestamp")
        .append(Timestamp {
            time: 3542578,
            increment: 7,
        })
        .key("binary")
        .append(RawBinaryRef {
            subtype: BinarySubtype::Generic,
            bytes: &[1, 2, 3],
        })
        .key("int32")
        .append(23)
        .key("int64")
        .append(46_i64)
        .key("array")
        .open_array()
        .append("binary")
        .append("serialized")
        .close_array()
        .extract()
        .unwrap();

    assert_eq!(rawdoc.get_f64("f64").unwrap(), 2.5);
    assert!(rawdoc.get_bool("bool").unwrap());
    assert_eq!(rawdoc.get_object_id("oid").unwrap(), oid);
    assert_eq!(rawdoc.get_datetime("datetime").unwrap(), 1_600_000_000_000);
    let regex = rawdoc.get_regex("regex").unwrap();
    assert_eq!(regex.pattern, r"end\s*$");
    assert_eq!(regex.options, "i");
    assert_eq!(
        rawdoc.get_timestamp("timestamp").unwrap(),
        Timestamp {
            time: 3542578,
            increment: 7
        }
    );
    let binary = rawdoc.get_binary("binary").unwrap();
    assert_eq!(binary.subtype, BinarySubtype::Generic);
    assert_eq!(binary.bytes, [1, 2, 3]);
    assert_eq!(rawdoc.get_i32("int32").unwrap(), 23);
    assert_eq!(rawdoc.get_i64("int64").unwrap(), 46);
    assert_eq!(rawdoc.get_array("array").unwrap().get_str(1).unwrap(), "serialized");

    let element = rawdoc.find("int32").unwrap();
    assert_eq!(element.get_i32().unwrap(), 23);
    assert_eq!(element.key_string(), "int32");
}

#[test]
fn getter_errors() {
    let rawdoc = sample();

    let error = rawdoc.get_str("missing").unwrap_err();
    assert!(error.is_value_access_not_present());
    assert_eq!(error.key.as_deref(), Some("missing"));

    let error = rawdoc.get_i32("apples").unwrap_err();
    assert!(error.is_value_access_unexpected_type());
    assert_matches!(
        error.kind,
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType {
                actual: ElementType::String,
                expected: ElementType::Int32,
            },
        }
    );

    let element = rawdoc.find("apples").unwrap();
    let error = element.get_document().unwrap_err();
    assert!(error.is_value_access_unexpected_type());
    assert_eq!(error.key.as_deref(), Some("apples"));
}

#[test]
fn array() {
    let rawdoc = DocumentStream::new()
        .key("array")
        .open_array()
        .append("binary")
        .append("serialized")
        .append("object")
        .append("notation")
        .close_array()
        .extract()
        .unwrap();
    let array = rawdoc.get_array("array").unwrap();

    assert_eq!(array.get_str(0).unwrap(), "binary");
    assert_eq!(array.get_str(3).unwrap(), "notation");
    let error = array.get_str(4).unwrap_err();
    assert!(error.is_value_access_not_present());
    assert_eq!(error.index, Some(4));

    let element = array.find(2).unwrap();
    assert_eq!(element.index(), 2);
    assert_eq!(element.key(), "2");
    assert_eq!(element.get_str().unwrap(), "object");

    let error = element.get_i64().unwrap_err();
    assert_eq!(error.index, Some(2));
    assert!(array.iter().error().is_none());
}

#[test]
fn array_keys_are_not_checked() {
    let mut doc = RawDocumentBuf::new();
    doc.append("x", "first").unwrap();
    doc.append("y", "second").unwrap();
    let array = RawArray::from_bytes(doc.as_bytes()).unwrap();

    assert_eq!(array.get_str(1).unwrap(), "second");
    let keys: Vec<_> = array.iter().map(|e| e.key().into_owned()).collect();
    assert_eq!(keys, ["0", "1"]);
    assert_eq!(array.find(0).unwrap().raw().key(), "x");
}

#[test]
fn code_with_scope() {
    let scope = DocumentStream::new()
        .key("ok")
        .append(true)
        .extract()
        .unwrap();
    let rawdoc = DocumentStream::new()
        .key("js")
        .append(RawJavaScriptCodeWithScopeRef {
            code: "console.log(msg);",
            scope: &scope,
        })
        .key("code")
        .append(RawBsonRef::JavaScriptCode("1 + 1"))
        .key("symbol")
        .append(RawBsonRef::Symbol("artist-formerly-known-as"))
        .extract()
        .unwrap();

    assert_matches!(
        rawdoc.get("js").unwrap(),
        Some(RawBsonRef::JavaScriptCodeWithScope(cws))
            if cws.code == "console.log(msg);" && cws.scope == &*scope
    );
    assert_eq!(
        rawdoc.get("code").unwrap().unwrap().as_javascript(),
        Some("1 + 1")
    );
    assert_eq!(
        rawdoc.get("symbol").unwrap().unwrap().as_symbol(),
        Some("artist-formerly-known-as")
    );
    rawdoc.validate().unwrap();
}

#[test]
fn decimal128() {
    let bytes = [
        0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x40, 0x30,
    ];
    let rawdoc = DocumentStream::new()
        .key("d")
        .append(Decimal128::from_bytes(bytes))
        .extract()
        .unwrap();
    let value = rawdoc.get("d").unwrap().unwrap().as_decimal128().unwrap();
    assert_eq!(value.bytes(), bytes);
    assert_eq!(value.to_string(), "1");
}

#[test]
fn bad_framing() {
    assert!(RawDocument::from_bytes(&[5u8, 0, 0, 0]).unwrap_err().is_malformed_value());
    assert!(RawDocument::from_bytes(&[6u8, 0, 0, 0, 0]).unwrap_err().is_malformed_value());
    assert!(RawDocument::from_bytes(&[5u8, 0, 0, 0, 1]).unwrap_err().is_malformed_value());

    // an unchecked view with bad framing iterates as empty
    let doc = RawDocument::from_bytes_unchecked(&[0xffu8, 0, 0, 0, 0]);
    let mut iter = doc.iter();
    assert!(iter.next().is_none());
    assert!(iter.take_error().unwrap().is_malformed_value());
    assert!(doc.find("a").is_none());
    assert!(doc.validate().is_err());
}

#[test]
fn unknown_tag_ends_iteration() {
    let mut bytes = DocumentStream::new()
        .key("a")
        .append(1)
        .key("b")
        .append(2)
        .extract()
        .unwrap()
        .into_bytes();
    // the tag of "b"
    bytes[11] = 0x42;
    let doc = RawDocument::from_bytes(&bytes).unwrap();

    let mut iter = doc.iter();
    assert_eq!(iter.next().unwrap().key(), "a");
    assert!(iter.next().is_none());
    let error = iter.take_error().unwrap();
    assert!(error.is_malformed_value());
    assert_eq!(error.key.as_deref(), Some("b"));

    assert_eq!(doc.get_i32("a").unwrap(), 1);
    assert!(doc.find("b").is_none());
    assert!(doc.validate().is_err());
}

#[test]
fn key_without_terminator() {
    // the key runs into the document terminator
    let bytes = b"\x08\x00\x00\x00\x10ab\x00";
    let doc = RawDocument::from_bytes(bytes).unwrap();
    let mut iter = doc.iter();
    assert!(iter.next().is_none());
    assert!(iter.error().is_some());
}

#[test]
fn non_utf8_key() {
    let bytes = b"\x0c\x00\x00\x00\x0a\xff\xfe\x00\x0a\x61\x00\x00";
    let doc = RawDocument::from_bytes(bytes).unwrap();
    assert_eq!(doc.iter().count(), 0);
    assert_matches!(doc.validate().unwrap_err().kind, ErrorKind::Utf8Encoding);
}

#[test]
fn validate_nested() {
    let inner = DocumentStream::new()
        .key("s")
        .append("ok")
        .extract()
        .unwrap();
    let mut bytes = DocumentStream::new()
        .key("outer")
        .open_array()
        .append(&inner)
        .close_array()
        .extract()
        .unwrap()
        .into_bytes();
    let doc = RawDocument::from_bytes(&bytes).unwrap();
    doc.validate().unwrap();

    // corrupt the innermost string's terminator; the outer framing stays intact
    let last = bytes.len() - 4;
    assert_eq!(bytes[last], 0);
    bytes[last] = b'!';
    let doc = RawDocument::from_bytes(&bytes).unwrap();
    assert_eq!(doc.iter().count(), 1);
    assert!(doc.validate().unwrap_err().is_malformed_value());
}

#[test]
fn owned_and_borrowed() {
    let rawdoc = sample();
    let borrowed: &RawDocument = &rawdoc;
    assert_eq!(borrowed, &rawdoc);
    assert_eq!(borrowed.to_owned(), rawdoc);
    assert_eq!(borrowed.to_raw_document_buf(), rawdoc);

    let cow: Cow<'_, RawDocument> = borrowed.into();
    assert_matches!(cow, Cow::Borrowed(_));
    let cow: Cow<'_, RawDocument> = rawdoc.clone().into();
    assert_eq!(cow.as_bytes(), rawdoc.as_bytes());

    let from_vec = RawDocumentBuf::from_bytes(rawdoc.as_bytes().to_vec()).unwrap();
    assert_eq!(from_vec, rawdoc);
    assert!(RawDocumentBuf::from_bytes(vec![1, 2, 3]).is_err());
}

#[test]
fn equality_is_bytewise() {
    let ab = DocumentStream::new()
        .key("a")
        .append(1)
        .key("b")
        .append(2)
        .extract()
        .unwrap();
    let ba = DocumentStream::new()
        .key("b")
        .append(2)
        .key("a")
        .append(1)
        .extract()
        .unwrap();
    assert_ne!(ab, ba);
    assert_eq!(&*ab, &*ab.clone());
}

#[test]
fn string_length_prefix_limit() {
    assert_eq!(string_len_prefix(0).unwrap(), 1);
    assert_eq!(string_len_prefix(i32::MAX as usize - 1).unwrap(), i32::MAX);
    for len in [i32::MAX as usize, usize::MAX] {
        assert_eq!(
            string_len_prefix(len).unwrap_err().builder_kind(),
            Some(crate::error::BuilderErrorKind::ValueTooLarge)
        );
    }

    let mut buf = Vec::new();
    write_string(&mut buf, "ab").unwrap();
    assert_eq!(buf, [3, 0, 0, 0, b'a', b'b', 0]);
}

#[test]
fn append_to_buf() {
    let mut doc = RawDocumentBuf::new();
    doc.append("a", 1).unwrap();
    let before = doc.clone();

    assert!(doc.append("b\0", 2).unwrap_err().is_malformed_value());
    assert!(doc
        .append(
            "c",
            RawRegexRef {
                pattern: "\0",
                options: ""
            }
        )
        .is_err());
    assert_eq!(doc, before);

    doc.append("d", "x").unwrap();
    assert_eq!(doc.get_str("d").unwrap(), "x");
    doc.validate().unwrap();
}

#[test]
fn array_buf() {
    let mut array = RawArrayBuf::new();
    array.push("a").unwrap();
    array.push(2).unwrap();
    let nested = ArrayStream::new().append(true).extract().unwrap();
    array.push(&nested).unwrap();

    assert_eq!(array.get_str(0).unwrap(), "a");
    assert_eq!(array.get_i32(1).unwrap(), 2);
    assert!(array.get_array(2).unwrap().get_bool(0).unwrap());

    // a parsed array picks up indexing where the bytes left off
    let mut copy = RawArrayBuf::from_bytes(array.clone().into_bytes()).unwrap();
    assert_eq!(copy, array);
    copy.push("next").unwrap();
    assert_eq!(copy.as_doc().find("3").unwrap().key(), "3");
    assert_eq!(copy.get_str(3).unwrap(), "next");
}

#[test]
fn debug_is_hex() {
    let rawdoc = DocumentStream::new()
        .key("a")
        .append(1)
        .extract()
        .unwrap();
    let debug = format!("{:?}", rawdoc);
    assert!(debug.contains("0c0000001061000100000000"), "{}", debug);
}
