use rawbson::{
    binary::{PackedBitVector, Vector},
    builder::{ArrayStream, DocumentStream},
    oid::ObjectId,
    raw::{Decimal128, RawBinaryRef, RawBsonRef, RawRegexRef, Timestamp},
    spec::BinarySubtype,
    Binary,
};
use std::{
    fs,
    io::{Error, ErrorKind},
    path::Path,
};

fn main() -> std::io::Result<()> {
    let corpus_dir = Path::new("fuzz/corpus");
    fs::create_dir_all(corpus_dir)?;

    // Generate edge cases for each fuzz target
    generate_length_edge_cases(corpus_dir)?;
    generate_document_cases(corpus_dir)?;
    generate_vector_cases(corpus_dir)?;
    Ok(())
}

fn to_io(e: rawbson::error::Error) -> Error {
    Error::new(ErrorKind::Other, e.to_string())
}

fn generate_length_edge_cases(dir: &Path) -> std::io::Result<()> {
    let target_dir = dir.join("malformed_length");
    fs::create_dir_all(&target_dir)?;

    // Invalid length
    fs::write(target_dir.join("invalid_len"), vec![4, 5])?;

    // Minimal valid document
    let min_doc = DocumentStream::new().extract().map_err(to_io)?;
    fs::write(target_dir.join("min_doc"), min_doc.as_bytes())?;

    // Length prefix larger than the buffer
    let mut overstated = DocumentStream::new()
        .key("a")
        .append("b")
        .extract()
        .map_err(to_io)?
        .into_bytes();
    overstated[0] = 0xff;
    fs::write(target_dir.join("overstated_len"), overstated)?;

    Ok(())
}

fn generate_document_cases(dir: &Path) -> std::io::Result<()> {
    let oid = ObjectId::from_bytes([1; 12]);

    // Document with all BSON types
    let all_types = DocumentStream::new()
        .key("double")
        .append(1.0f64)
        .key("double_nan")
        .append(f64::NAN)
        .key("double_infinity")
        .append(f64::INFINITY)
        .key("string")
        .append("test")
        .key("document")
        .open_document()
        .close_document()
        .key("array")
        .open_array()
        .append(1)
        .append("x")
        .close_array()
        .key("binary")
        .append(RawBinaryRef { subtype: BinarySubtype::Generic, bytes: &[1, 2, 3] })
        .key("binary_old")
        .append(RawBinaryRef { subtype: BinarySubtype::BinaryOld, bytes: &[1] })
        .key("undefined")
        .append(RawBsonRef::Undefined)
        .key("object_id")
        .append(oid)
        .key("bool")
        .append(true)
        .key("datetime")
        .append(RawBsonRef::DateTime(0))
        .key("null")
        .append(RawBsonRef::Null)
        .key("regex")
        .append(RawRegexRef { pattern: "a*", options: "i" })
        .key("code")
        .append(RawBsonRef::JavaScriptCode("x"))
        .key("symbol")
        .append(RawBsonRef::Symbol("s"))
        .key("int32")
        .append(1i32)
        .key("timestamp")
        .append(Timestamp { time: 1, increment: 2 })
        .key("int64")
        .append(1i64)
        .key("decimal128")
        .append(Decimal128::from_bytes([0; 16]))
        .key("min_key")
        .append(RawBsonRef::MinKey)
        .key("max_key")
        .append(RawBsonRef::MaxKey)
        .extract()
        .map_err(to_io)?;

    let nested = ArrayStream::new()
        .open_array()
        .open_array()
        .open_document()
        .key("deep")
        .append(1)
        .close_document()
        .close_array()
        .close_array()
        .extract()
        .map_err(to_io)?;

    for target in ["iterate", "validate"] {
        let target_dir = dir.join(target);
        fs::create_dir_all(&target_dir)?;
        fs::write(target_dir.join("all_types"), all_types.as_bytes())?;
        fs::write(target_dir.join("nested"), nested.as_bytes())?;
    }

    Ok(())
}

fn generate_vector_cases(dir: &Path) -> std::io::Result<()> {
    let target_dir = dir.join("vector");
    fs::create_dir_all(&target_dir)?;

    let vectors = [
        ("int8", Vector::Int8(vec![-128, 0, 127])),
        ("float32", Vector::Float32(vec![1.5, f32::NAN, -0.0])),
        ("packed_bit", Vector::PackedBit(PackedBitVector::from_bits([true, false, true]))),
        ("empty", Vector::Int8(Vec::new())),
    ];
    for (name, vector) in &vectors {
        fs::write(target_dir.join(name), Binary::from(vector).bytes)?;
    }

    // headers alone
    fs::write(target_dir.join("int8_header"), [0x03, 0x00])?;
    fs::write(target_dir.join("float32_bad_len"), [0x27, 0x00, 0x00])?;

    Ok(())
}
