use std::collections::HashMap;

use proptest::prelude::*;

use super::*;
use crate::{builder::Builder, oid::ObjectId, spec::BinarySubtype};

/// An owned value tree for driving a [`Builder`].
#[derive(Clone, Debug)]
enum Value {
    Null,
    String(String),
    Boolean(bool),
    Double(f64),
    Int32(i32),
    Int64(i64),
    RegularExpression(String, String),
    ObjectId([u8; 12]),
    Binary(BinarySubtype, Vec<u8>),
    JavaScriptCode(String),
    Document(Vec<(String, Value)>),
    Array(Vec<Value>),
}

fn arbitrary_binary_subtype() -> impl Strategy<Value = BinarySubtype> {
    prop_oneof![
        Just(BinarySubtype::Generic),
        Just(BinarySubtype::Function),
        Just(BinarySubtype::BinaryOld),
        Just(BinarySubtype::UuidOld),
        Just(BinarySubtype::Uuid),
        Just(BinarySubtype::Md5),
    ]
}

fn arbitrary_value(depth: u32, desired_size: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<String>().prop_map(Value::String),
        any::<bool>().prop_map(Value::Boolean),
        any::<f64>().prop_map(Value::Double),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        ("[^\0]*", "[^\0]*")
            .prop_map(|(pattern, options)| Value::RegularExpression(pattern, options)),
        any::<[u8; 12]>().prop_map(Value::ObjectId),
        (arbitrary_binary_subtype(), any::<Vec<u8>>())
            .prop_map(|(subtype, bytes)| Value::Binary(subtype, bytes)),
        any::<String>().prop_map(Value::JavaScriptCode),
    ];

    leaf.prop_recursive(depth, desired_size, 10, |inner| {
        prop_oneof![
            arbitrary_fields(inner.clone()).prop_map(Value::Document),
            prop::collection::vec(inner, 0..12).prop_map(Value::Array),
        ]
    })
}

fn arbitrary_fields(
    value: impl Strategy<Value = Value>,
) -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::hash_map("[^\0]*", value, 0..12)
        .prop_map(|map: HashMap<String, Value>| map.into_iter().collect())
}

fn arbitrary_document() -> impl Strategy<Value = Vec<(String, Value)>> {
    arbitrary_fields(arbitrary_value(4, 256))
}

/// Documents small enough to cut at every offset.
fn small_document() -> impl Strategy<Value = Vec<(String, Value)>> {
    arbitrary_fields(arbitrary_value(2, 16))
}

fn append_value(builder: &mut Builder, value: &Value) -> Result<()> {
    match value {
        Value::Null => builder.append(RawBsonRef::Null),
        Value::String(s) => builder.append(s.as_str()),
        Value::Boolean(b) => builder.append(*b),
        Value::Double(d) => builder.append(*d),
        Value::Int32(i) => builder.append(*i),
        Value::Int64(i) => builder.append(*i),
        Value::RegularExpression(pattern, options) => builder.append(RawRegexRef {
            pattern,
            options,
        }),
        Value::ObjectId(bytes) => builder.append(ObjectId::from_bytes(*bytes)),
        Value::Binary(subtype, bytes) => builder.append(RawBinaryRef {
            subtype: *subtype,
            bytes,
        }),
        Value::JavaScriptCode(code) => builder.append(RawBsonRef::JavaScriptCode(code)),
        Value::Document(fields) => {
            builder.open_document()?;
            append_fields(builder, fields)?;
            builder.close_document()
        }
        Value::Array(values) => {
            builder.open_array()?;
            for value in values {
                append_value(builder, value)?;
            }
            builder.close_array()
        }
    }
}

fn append_fields(builder: &mut Builder, fields: &[(String, Value)]) -> Result<()> {
    for (key, value) in fields {
        builder.key(key.as_str())?;
        append_value(builder, value)?;
    }
    Ok(())
}

fn build(fields: &[(String, Value)]) -> RawDocumentBuf {
    let mut builder = Builder::new_document();
    append_fields(&mut builder, fields).unwrap();
    builder.extract_document().unwrap()
}

/// Appends the value of `element`, descending into documents and arrays frame by frame rather
/// than copying their bytes.
fn rebuild_value(builder: &mut Builder, value: RawBsonRef<'_>) -> Result<()> {
    match value {
        RawBsonRef::Document(doc) => {
            builder.open_document()?;
            rebuild_fields(builder, doc)?;
            builder.close_document()
        }
        RawBsonRef::Array(array) => {
            builder.open_array()?;
            for element in array {
                rebuild_value(builder, element.value()?)?;
            }
            builder.close_array()
        }
        other => builder.append(other),
    }
}

fn rebuild_fields(builder: &mut Builder, doc: &RawDocument) -> Result<()> {
    for element in doc {
        builder.key(element.key())?;
        rebuild_value(builder, element.value()?)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn rebuild_is_byte_identical(fields in arbitrary_document()) {
        let doc = build(&fields);
        doc.validate().unwrap();

        let mut builder = Builder::new_document();
        rebuild_fields(&mut builder, &doc).unwrap();
        prop_assert_eq!(builder.extract_document().unwrap(), doc);
    }

    #[test]
    fn iteration_is_total(fields in arbitrary_document()) {
        let doc = build(&fields);

        let mut iter = doc.iter();
        let keys: Vec<_> = iter.by_ref().map(|e| e.key()).collect();
        prop_assert!(iter.error().is_none());
        let expected: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
        prop_assert_eq!(&keys, &expected);

        let again: Vec<_> = doc.iter().map(|e| e.key()).collect();
        prop_assert_eq!(keys, again);
    }

    #[test]
    fn lookup(fields in arbitrary_document(), missing in "[^\0]*") {
        let doc = build(&fields);
        for (key, _) in &fields {
            prop_assert_eq!(doc.find(key).unwrap().key(), key.as_str());
        }
        if !fields.iter().any(|(k, _)| *k == missing) {
            prop_assert!(doc.find(&missing).is_none());
        }
    }

    #[test]
    fn truncation_is_safe(fields in small_document()) {
        let doc = build(&fields);
        let bytes = doc.as_bytes();

        for len in 0..bytes.len() {
            let truncated = &bytes[..len];
            // the original length prefix now overstates the buffer
            let view = RawDocument::from_bytes_unchecked(truncated);
            prop_assert_eq!(view.iter().count(), 0);
            prop_assert!(view.validate().is_err());

            // with a consistent prefix the framing check passes and iteration has to stop on its
            // own before the end of the buffer
            if len >= 5 {
                let mut patched = truncated.to_vec();
                patched[..4].copy_from_slice(&(len as i32).to_le_bytes());
                let view = RawDocument::from_bytes_unchecked(&patched);
                for element in view {
                    prop_assert!(element.next_offset() < len);
                    let _ = element.value();
                }
                let _ = view.validate();
            }
        }
    }

    #[test]
    fn corruption_is_safe(
        fields in arbitrary_document(),
        index in any::<prop::sample::Index>(),
        byte in any::<u8>(),
    ) {
        let mut bytes = build(&fields).into_bytes();
        let at = index.index(bytes.len());
        bytes[at] = byte;

        let view = RawDocument::from_bytes_unchecked(&bytes);
        for element in view {
            prop_assert!(element.next_offset() < bytes.len());
            if let Ok(RawBsonRef::Document(d)) = element.value() {
                let _ = d.iter().count();
            }
        }
        let _ = view.validate();
        let _ = crate::json::to_json(view);
    }
}
