use posocc_bits::{BigEndian, BitOrder, LittleEndian};

use super::{PREFIX, encode_documents, random_documents};
use crate::{
    CodeProfile, CollectionType, DecodeContext, DocumentFeatures, FieldParams, FieldsParams,
};

fn cooked_matches_generic<E: BitOrder>(field: FieldParams, profile: CodeProfile, seed: u64) {
    let fields = FieldsParams::single(field);
    let docs = random_documents(seed, &fields.fields()[0], 300);
    let (header, encoded, _) = encode_documents::<E>(&fields, 0, profile, &docs);

    let mut generic = DecodeContext::from_encoded(&fields, 0, profile, &encoded).unwrap();
    generic.read_header(&header, PREFIX).unwrap();
    let mut cooked =
        DecodeContext::<E>::cooked(&fields, profile, &encoded.words, 0, encoded.bit_len).unwrap();
    cooked.read_header(&header, PREFIX).unwrap();

    let mut from_generic = DocumentFeatures::default();
    let mut from_cooked = DocumentFeatures::default();
    for doc in &docs {
        generic.read_features_into(&mut from_generic).unwrap();
        cooked.read_features_into(&mut from_cooked).unwrap();
        assert_eq!(from_cooked, from_generic);
        assert_eq!(&from_cooked, doc);
        assert_eq!(cooked.bit_position(), generic.bit_position());
    }
    assert!(cooked.is_at_end());
}

#[test]
fn test_cooked_matches_generic() {
    for profile in [CodeProfile::DualK, CodeProfile::SingleK] {
        cooked_matches_generic::<BigEndian>(
            FieldParams::new("title", CollectionType::Single),
            profile,
            11,
        );
        cooked_matches_generic::<LittleEndian>(
            FieldParams::new("body", CollectionType::Single).with_avg_elem_len(2),
            profile,
            12,
        );
        cooked_matches_generic::<BigEndian>(
            FieldParams::new("flags", CollectionType::Single).with_positions(false),
            profile,
            13,
        );
    }
}

#[test]
fn test_cooked_truncated_stream() {
    let fields = FieldsParams::single(FieldParams::new("title", CollectionType::Single));
    let docs = random_documents(21, &fields.fields()[0], 10);
    let (header, encoded, _) =
        encode_documents::<LittleEndian>(&fields, 0, CodeProfile::DualK, &docs);
    let mut cooked = DecodeContext::<LittleEndian>::cooked(
        &fields,
        CodeProfile::DualK,
        &encoded.words,
        0,
        encoded.bit_len - 1,
    )
    .unwrap();
    cooked.read_header(&header, PREFIX).unwrap();
    for _ in 0..docs.len() - 1 {
        cooked.read_features().unwrap();
    }
    assert!(cooked.read_features().unwrap_err().is_bounds_exceeded());
}
