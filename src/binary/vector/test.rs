use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::error::ErrorKind;

fn vector_binary(bytes: &[u8]) -> RawBinaryRef<'_> {
    RawBinaryRef {
        subtype: BinarySubtype::Vector,
        bytes,
    }
}

#[test]
fn int8_encoding() {
    let binary = Binary::from(Vector::Int8(vec![1, 2, 3]));
    assert_eq!(binary.subtype, BinarySubtype::Vector);
    assert_eq!(binary.bytes, [0x03, 0x00, 0x01, 0x02, 0x03]);

    let view = VectorView::<Int8>::new(binary.as_raw_binary()).unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(
        view.header(),
        VectorHeader {
            element_type: VectorElementType::SignedInteger,
            element_size: VectorElementSize::Bits8,
            padding: 0,
        }
    );
    assert_eq!(view.iter().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(view.get(3), None);
}

#[test]
fn float32_encoding() {
    let binary = Binary::from(Vector::Float32(vec![127.0, 7.0]));
    assert_eq!(
        binary.bytes,
        [0x27, 0x00, 0x00, 0x00, 0xFE, 0x42, 0x00, 0x00, 0xE0, 0x40]
    );
    let view = VectorView::<Float32>::new(binary.as_raw_binary()).unwrap();
    assert_eq!(view.iter().collect::<Vec<_>>(), [127.0, 7.0]);
}

#[test]
fn packed_bit_encoding() {
    let vector = PackedBitVector::from_bits([true; 5]);
    let binary = Binary::from(Vector::PackedBit(vector));
    assert_eq!(binary.bytes, [0x10, 0x03, 0b1111_1000]);

    let view = VectorView::<PackedBit>::new(binary.as_raw_binary()).unwrap();
    assert_eq!(view.len(), 5);
    assert_eq!(view.header().padding, 3);
    assert!(view.iter().all(|bit| bit));
}

#[test]
fn data_type_bytes() {
    assert_eq!(Int8::header(0).data_type(), 0x03);
    assert_eq!(Float32::header(0).data_type(), 0x27);
    assert_eq!(PackedBit::header(0).data_type(), 0x10);
}

#[test]
fn length_for_append() {
    assert_eq!(Int8::length_for_append(3).unwrap(), 5);
    assert_eq!(Float32::length_for_append(3).unwrap(), 14);
    assert_eq!(PackedBit::length_for_append(0).unwrap(), 2);
    assert_eq!(PackedBit::length_for_append(8).unwrap(), 3);
    assert_eq!(PackedBit::length_for_append(9).unwrap(), 4);

    assert_matches!(
        Float32::length_for_append(usize::MAX / 2).unwrap_err().kind,
        ErrorKind::VectorTooLarge { .. }
    );
    assert_matches!(
        Int8::length_for_append(usize::MAX).unwrap_err().kind,
        ErrorKind::VectorTooLarge { .. }
    );
    assert_matches!(
        Int8::length_for_append(i32::MAX as usize).unwrap_err().kind,
        ErrorKind::VectorTooLarge { .. }
    );
}

#[test]
fn write_frame_requires_exact_length() {
    let mut bytes = [0u8; 4];
    assert!(Int8::write_frame(&mut bytes, 3).unwrap_err().is_vector());
    assert_eq!(Int8::write_frame(&mut bytes, 2).unwrap().padding, 0);
    assert_eq!(bytes[..2], [0x03, 0x00]);
}

#[test]
fn write_frame_clears_final_packed_byte() {
    let mut bytes = [0xffu8; 4];
    let header = PackedBit::write_frame(&mut bytes, 9).unwrap();
    assert_eq!(header.padding, 7);
    assert_eq!(bytes, [0x10, 0x07, 0xff, 0x00]);
}

#[test]
fn packed_bit_set_byte_masks_padding() {
    let mut bytes = vec![0u8; PackedBit::length_for_append(9).unwrap() as usize];
    let mut view = VectorViewMut::<PackedBit>::from_frame(&mut bytes, 9).unwrap();
    for i in 0..9 {
        view.set(i, true).unwrap();
    }
    assert_eq!(view.as_bytes(), [0xff, 0x80]);

    view.set_byte(1, 0x7f).unwrap();
    assert_eq!(view.as_bytes(), [0xff, 0x00]);
    assert_eq!(view.get(8), Some(false));

    view.set_byte(0, 0xaa).unwrap();
    view.set_byte(1, 0xff).unwrap();
    assert!(view.set_byte(2, 0).is_err());
    assert!(view.set(9, true).is_err());

    assert_eq!(bytes, [0x10, 0x07, 0xaa, 0x80]);
}

#[test]
fn int8_view_mut() {
    let mut bytes = vec![0u8; Int8::length_for_append(3).unwrap() as usize];
    let mut view = VectorViewMut::<Int8>::from_frame(&mut bytes, 3).unwrap();
    view.set(0, -1).unwrap();
    view.set(2, 127).unwrap();
    assert_eq!(view.as_view().iter().collect::<Vec<_>>(), [-1, 0, 127]);
    assert_eq!(bytes, [0x03, 0x00, 0xff, 0x00, 0x7f]);
}

#[test]
fn rejects_invalid_vectors() {
    let cases: &[(&str, &[u8])] = &[
        ("too short", &[0x03]),
        ("unknown data type", &[0x04, 0x00]),
        ("wrong format", &[0x27, 0x00, 0x01]),
        ("padding on int8", &[0x03, 0x01, 0x01]),
    ];
    for (name, bytes) in cases {
        assert!(
            Int8::validate(vector_binary(bytes)).unwrap_err().is_vector(),
            "{}",
            name
        );
    }

    let cases: &[(&str, &[u8])] = &[
        ("padding on float32", &[0x27, 0x01, 0, 0, 0, 0]),
        ("partial float", &[0x27, 0x00, 0, 0, 0]),
    ];
    for (name, bytes) in cases {
        assert!(
            Float32::validate(vector_binary(bytes)).unwrap_err().is_vector(),
            "{}",
            name
        );
    }

    let cases: &[(&str, &[u8])] = &[
        ("padding too large", &[0x10, 0x08, 0x00]),
        ("padding without payload", &[0x10, 0x01]),
        ("nonzero padding bits", &[0x10, 0x03, 0b1111_1100]),
    ];
    for (name, bytes) in cases {
        assert!(
            PackedBit::validate(vector_binary(bytes)).unwrap_err().is_vector(),
            "{}",
            name
        );
    }
}

#[test]
fn rejects_wrong_subtype() {
    let binary = RawBinaryRef {
        subtype: BinarySubtype::Generic,
        bytes: &[0x03, 0x00, 0x01],
    };
    assert!(Int8::validate(binary).unwrap_err().is_vector());
    assert!(Vector::try_from(binary).unwrap_err().is_vector());
    assert!(VectorView::<Int8>::new(binary).unwrap_err().is_vector());
}

#[test]
fn view_from_binary() {
    let bytes = [0x10, 0x03, 0b1010_1000];
    let view = VectorView::<PackedBit>::new(vector_binary(&bytes)).unwrap();
    assert_eq!(view, VectorView::<PackedBit>::from_bytes(&bytes).unwrap());
    assert_eq!(view.header().padding, 3);
    assert_eq!(view.len(), 5);
    assert_eq!(
        view.iter().collect::<Vec<_>>(),
        [true, false, true, false, true]
    );
    assert_eq!(view.as_bytes(), [0b1010_1000]);
}

#[test]
fn empty_vectors() {
    for vector in [
        Vector::Int8(Vec::new()),
        Vector::Float32(Vec::new()),
        Vector::PackedBit(PackedBitVector::from_bits(std::iter::empty())),
    ] {
        let binary = Binary::from(&vector);
        assert_eq!(binary.bytes.len(), HEADER_SIZE);
        assert_eq!(Vector::try_from(&binary).unwrap(), vector);
    }
}

#[test]
fn packed_bit_vector_new() {
    let vector = PackedBitVector::new(vec![238, 224], 4).unwrap();
    assert_eq!(vector.len(), 12);
    assert_eq!(
        vector.iter().map(u8::from).collect::<Vec<_>>(),
        [1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0]
    );

    assert!(PackedBitVector::new(vec![0xff], 8).is_err());
    assert!(PackedBitVector::new(Vec::new(), 1).is_err());
    assert!(PackedBitVector::new(vec![0xff], 1).is_err());
}

#[test]
fn owned_vector_round_trip() {
    let vectors = [
        Vector::Int8(vec![-128, 0, 127]),
        Vector::Float32(vec![f32::MIN, -0.5, 0.0, f32::MAX]),
        Vector::PackedBit(PackedBitVector::from_bits([true, false, true])),
    ];
    for vector in vectors {
        let binary = Binary::from(&vector);
        assert_eq!(Vector::try_from(binary).unwrap(), vector);
    }
}

proptest! {
    #[test]
    fn packed_bit_round_trip(bits in proptest::collection::vec(any::<bool>(), 0..=64)) {
        let vector = PackedBitVector::from_bits(bits.iter().copied());
        let binary = Binary::from(Vector::PackedBit(vector));

        let view = VectorView::<PackedBit>::new(binary.as_raw_binary()).unwrap();
        prop_assert_eq!(view.len(), bits.len());
        prop_assert_eq!(view.iter().collect::<Vec<_>>(), bits.clone());

        let padding = view.header().padding;
        prop_assert_eq!(padding as usize, (8 - bits.len() % 8) % 8);
        if let Some(last) = view.as_bytes().last() {
            prop_assert_eq!(last & padding_mask(padding), 0);
        }
    }

    #[test]
    fn packed_bit_view_mut_matches_owned(bits in proptest::collection::vec(any::<bool>(), 0..=64)) {
        let mut bytes = vec![0xffu8; PackedBit::length_for_append(bits.len()).unwrap() as usize];
        let mut view = VectorViewMut::<PackedBit>::from_frame(&mut bytes, bits.len()).unwrap();
        // bytes before the last one are not cleared by the frame
        for byte in 0..view.as_bytes().len() {
            view.set_byte(byte, 0).unwrap();
        }
        for (i, bit) in bits.iter().enumerate() {
            view.set(i, *bit).unwrap();
        }

        let expected = Binary::from(Vector::PackedBit(PackedBitVector::from_bits(
            bits.iter().copied(),
        )));
        prop_assert_eq!(bytes, expected.bytes);
    }
}
