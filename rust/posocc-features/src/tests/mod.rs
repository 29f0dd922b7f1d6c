mod cooked_tests;
mod skip_tests;

use posocc_bits::BitOrder;

use crate::{
    CodeProfile, CollectionType, DecodeContext, DocumentFeatures, ElementFeature, EncodeContext,
    EncodedFeatures, FeatureHeader, FieldParams, FieldsParams,
};

pub(crate) const PREFIX: &str = "index.features.";

pub(crate) fn random_document(rng: &mut fastrand::Rng, field: &FieldParams) -> DocumentFeatures {
    let num_elements = if field.collection.has_elements() {
        rng.usize(1..6)
    } else {
        1
    };
    let mut element_id = 0u32;
    let mut elements = Vec::with_capacity(num_elements);
    for i in 0..num_elements {
        if field.collection.has_elements() {
            element_id += if i == 0 { rng.u32(0..4) } else { rng.u32(1..20) };
        }
        let weight = if field.collection.has_element_weights() {
            rng.i32(-1000..1000)
        } else {
            1
        };
        let length = match rng.u8(0..10) {
            0 => rng.u32(1..4),
            1 => rng.u32(1000..100_000),
            _ => rng.u32(1..300),
        };
        let mut element = ElementFeature::new(element_id, weight, length);
        if field.has_positions {
            let mut positions: Vec<u32> = (0..rng.usize(1..8))
                .map(|_| rng.u32(0..length))
                .collect();
            positions.sort_unstable();
            positions.dedup();
            element = element.with_positions(positions);
        }
        elements.push(element);
    }
    DocumentFeatures::new(elements)
}

pub(crate) fn random_documents(
    seed: u64,
    field: &FieldParams,
    count: usize,
) -> Vec<DocumentFeatures> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count).map(|_| random_document(&mut rng, field)).collect()
}

pub(crate) fn encode_documents<E: BitOrder>(
    fields: &FieldsParams,
    field_id: usize,
    profile: CodeProfile,
    docs: &[DocumentFeatures],
) -> (FeatureHeader, EncodedFeatures<E>, Vec<u64>) {
    let mut header = FeatureHeader::new();
    let mut encoder = EncodeContext::<E>::new(fields, field_id, profile).unwrap();
    encoder.write_header(&mut header, PREFIX).unwrap();
    let mut offsets = Vec::with_capacity(docs.len());
    for doc in docs {
        offsets.push(encoder.bit_position());
        encoder.write_features(doc).unwrap();
    }
    (header, encoder.finish(), offsets)
}

pub(crate) fn open_decoder<'a, E: BitOrder>(
    fields: &'a FieldsParams,
    field_id: usize,
    profile: CodeProfile,
    header: &FeatureHeader,
    encoded: &'a EncodedFeatures<E>,
) -> DecodeContext<'a, E> {
    let mut decoder = DecodeContext::from_encoded(fields, field_id, profile, encoded).unwrap();
    decoder.read_header(header, PREFIX).unwrap();
    decoder
}

pub(crate) fn all_field_kinds() -> Vec<FieldParams> {
    vec![
        FieldParams::new("title", CollectionType::Single),
        FieldParams::new("flags", CollectionType::Single).with_positions(false),
        FieldParams::new("authors", CollectionType::Array).with_avg_elem_len(3),
        FieldParams::new("keywords", CollectionType::Array).with_positions(false),
        FieldParams::new("tags", CollectionType::WeightedSet).with_avg_elem_len(20),
        FieldParams::new("labels", CollectionType::WeightedSet).with_positions(false),
    ]
}
