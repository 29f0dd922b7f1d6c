use posocc_bits::{BigEndian, LittleEndian};

use super::{all_field_kinds, encode_documents, open_decoder, random_documents};
use crate::{
    CodeProfile, DocumentFeatures, EncodeContext, FeatureHeader, FieldsParams,
    RawFeaturesCollector,
};

#[test]
fn test_skip_then_read() {
    let fields = FieldsParams::new(all_field_kinds()).unwrap();
    for profile in [CodeProfile::DualK, CodeProfile::SingleK] {
        for (field_id, field) in fields.fields().iter().enumerate() {
            let docs = random_documents(field_id as u64 + 100, field, 60);
            let (header, encoded, offsets) =
                encode_documents::<LittleEndian>(&fields, field_id, profile, &docs);
            for n in [0, 1, 2, 17, 59] {
                let mut decoder = open_decoder(&fields, field_id, profile, &header, &encoded);
                decoder.skip_features(n).unwrap();
                assert_eq!(decoder.bit_position(), offsets[n]);
                assert_eq!(decoder.read_features().unwrap(), docs[n]);
            }
            let mut decoder = open_decoder(&fields, field_id, profile, &header, &encoded);
            decoder.skip_features(docs.len()).unwrap();
            assert!(decoder.is_at_end());
            assert!(decoder.skip_features(1).unwrap_err().is_bounds_exceeded());
        }
    }
}

#[test]
fn test_checkpoints_and_open_at() {
    let fields = FieldsParams::new(all_field_kinds()).unwrap();
    let field_id = 2;
    let docs = random_documents(3, &fields.fields()[field_id], 40);

    let mut header = FeatureHeader::new();
    let mut encoder =
        EncodeContext::<BigEndian>::new(&fields, field_id, CodeProfile::SingleK).unwrap();
    encoder.write_header(&mut header, super::PREFIX).unwrap();
    let mut checkpoints = Vec::new();
    for (i, doc) in docs.iter().enumerate() {
        if i % 8 == 0 {
            encoder.align(64).unwrap();
            checkpoints.push((i, encoder.bit_position()));
        }
        encoder.write_features(doc).unwrap();
    }
    let encoded = encoder.finish();

    let decoder = open_decoder(&fields, field_id, CodeProfile::SingleK, &header, &encoded);
    for &(first_doc, offset) in &checkpoints {
        assert_eq!(offset % 64, 0);
        let mut resumed = decoder.open_at(offset, encoded.bit_len - offset).unwrap();
        for (i, doc) in docs.iter().enumerate().skip(first_doc) {
            if i % 8 == 0 {
                resumed.align(64).unwrap();
            }
            assert_eq!(&resumed.read_features().unwrap(), doc);
        }
        assert!(resumed.is_at_end());
    }
}

#[test]
fn test_raw_copy_between_streams() {
    let fields = FieldsParams::new(all_field_kinds()).unwrap();
    for (field_id, field) in fields.fields().iter().enumerate() {
        let docs = random_documents(field_id as u64 + 40, field, 30);
        let (header, encoded, _) =
            encode_documents::<BigEndian>(&fields, field_id, CodeProfile::DualK, &docs);
        let mut source = open_decoder(&fields, field_id, CodeProfile::DualK, &header, &encoded);

        // Copy every other document, re-encoding the rest.
        let mut target =
            EncodeContext::<BigEndian>::new(&fields, field_id, CodeProfile::DualK).unwrap();
        target.read_header(&header, super::PREFIX).unwrap();
        for (i, doc) in docs.iter().enumerate() {
            if i % 2 == 0 {
                let raw = RawFeaturesCollector::start(&source).finish(&mut source).unwrap();
                target.write_raw_features(&raw).unwrap();
            } else {
                let features: DocumentFeatures = source.read_features().unwrap();
                assert_eq!(&features, doc);
                target.write_features(&features).unwrap();
            }
        }
        assert!(source.is_at_end());
        let copied = target.finish();
        assert_eq!(copied.bit_len, encoded.bit_len);
        assert_eq!(copied.words, encoded.words);

        let mut decoder = open_decoder(&fields, field_id, CodeProfile::DualK, &header, &copied);
        for doc in &docs {
            assert_eq!(&decoder.read_features().unwrap(), doc);
        }
    }
}
