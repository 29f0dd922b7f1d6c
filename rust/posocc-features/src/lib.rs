//! Position occurrence feature codec.
//!
//! Encodes and decodes the per-document occurrence features of an inverted index
//! posting list (element ids, element weights, element lengths and word
//! positions) as a compact bit stream of Exponential-Golomb codes. Every value
//! kind has its own code order K; the K values are tuned per field and stored in
//! the stream header so that decoders use exactly what the encoder used.
//!
//! # Key Types
//!
//! - [`FieldsParams`]: immutable field descriptors shared by every context.
//! - [`CodeParams`] and [`CodeProfile`]: K values and the rules deriving them.
//! - [`EncodeContext`]: writes documents to an append-only bit stream.
//! - [`DecodeContext`]: reads, skips, or unpacks documents into
//!   [`TermFieldMatchData`]. [`DecodeContext::cooked`] creates the specialized
//!   single-value variant.
//! - [`RawFeaturesCollector`]: copies encoded documents verbatim between streams.
//! - [`FeatureHeader`] and [`ParamBag`]: stream description and tuning parameters.
//!
//! # Usage Examples
//!
//! ```rust
//! use posocc_bits::BigEndian;
//! use posocc_features::{
//!     CodeProfile, CollectionType, DecodeContext, DocumentFeatures, EncodeContext,
//!     FeatureHeader, FieldParams, FieldsParams,
//! };
//!
//! let fields = FieldsParams::single(FieldParams::new("title", CollectionType::Single));
//! let mut header = FeatureHeader::new();
//!
//! let mut encoder = EncodeContext::<BigEndian>::new(&fields, 0, CodeProfile::DualK).unwrap();
//! encoder.write_header(&mut header, "features.").unwrap();
//! encoder.write_features(&DocumentFeatures::single(12, [0, 5, 11])).unwrap();
//! let encoded = encoder.finish();
//!
//! let mut decoder =
//!     DecodeContext::from_encoded(&fields, 0, CodeProfile::DualK, &encoded).unwrap();
//! decoder.read_header(&header, "features.").unwrap();
//! assert_eq!(decoder.read_features().unwrap(), DocumentFeatures::single(12, [0, 5, 11]));
//! assert!(decoder.is_at_end());
//! ```

pub mod code_params;
pub mod cooked;
pub mod decode;
pub mod encode;
pub mod features;
pub mod fields_params;
pub mod header;
pub mod match_data;
pub mod param_bag;
pub mod raw_features;
pub mod state;

pub use code_params::{CodeParamKey, CodeParams, CodeProfile, element_len_k, word_pos_k};
pub use cooked::CookedDecodeContext;
pub use decode::DecodeContext;
pub use encode::{EncodeContext, EncodedFeatures};
pub use features::{DocumentFeatures, ElementFeature};
pub use fields_params::{CollectionType, FieldParams, FieldsParams};
pub use header::{FeatureHeader, HeaderTag};
pub use match_data::{TermFieldMatchData, TermFieldMatchPosition};
pub use param_bag::{ParamBag, ParamValue};
pub use raw_features::{RawFeatures, RawFeaturesCollector};
pub use state::ContextState;

#[cfg(test)]
mod tests;
