//! Decoded per-document occurrence features.

use itertools::Itertools;
use posocc_common::{Result, verify_arg};

use crate::fields_params::FieldParams;

/// Features of one element (one occurrence of the field value, e.g. one array
/// entry or one weighted-set key) within a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementFeature {
    /// Index of the element within the field value. Strictly increasing within a
    /// document.
    pub element_id: u32,
    /// Element weight. Only stored for weighted-set fields; other fields decode as 1.
    pub weight: i32,
    /// Element length in words. At least 1.
    pub length: u32,
    /// Word positions of the term within the element, strictly increasing and
    /// below `length`. Empty for fields without positions.
    pub positions: Vec<u32>,
}

impl ElementFeature {
    pub fn new(element_id: u32, weight: i32, length: u32) -> ElementFeature {
        ElementFeature {
            element_id,
            weight,
            length,
            positions: Vec::new(),
        }
    }

    pub fn with_positions(mut self, positions: impl Into<Vec<u32>>) -> ElementFeature {
        self.positions = positions.into();
        self
    }

    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }
}

/// Occurrence features of one document for a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFeatures {
    pub elements: Vec<ElementFeature>,
}

impl DocumentFeatures {
    pub fn new(elements: Vec<ElementFeature>) -> DocumentFeatures {
        DocumentFeatures { elements }
    }

    /// Features of a single-value field: one element with id 0 and weight 1.
    pub fn single(length: u32, positions: impl Into<Vec<u32>>) -> DocumentFeatures {
        DocumentFeatures {
            elements: vec![ElementFeature::new(0, 1, length).with_positions(positions)],
        }
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Total number of positions over all elements.
    pub fn num_positions(&self) -> usize {
        self.elements.iter().map(ElementFeature::num_positions).sum()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Checks that the features can be stored for `field`: at least one element,
    /// strictly increasing element ids, non-zero lengths, and positions that are
    /// strictly increasing, below the element length, and present exactly when the
    /// field carries positions. Single-value fields take exactly one element with
    /// id 0 and weight 1; non-weighted fields take weight 1.
    pub fn validate(&self, field: &FieldParams) -> Result<()> {
        verify_arg!(elements, !self.elements.is_empty());
        if !field.collection.has_elements() {
            verify_arg!(elements, self.elements.len() == 1);
            verify_arg!(element_id, self.elements[0].element_id == 0);
        }
        verify_arg!(
            element_id,
            self.elements
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.element_id < b.element_id)
        );
        for element in &self.elements {
            verify_arg!(length, element.length > 0);
            if !field.collection.has_element_weights() {
                verify_arg!(weight, element.weight == 1);
            }
            if field.has_positions {
                verify_arg!(positions, !element.positions.is_empty());
                verify_arg!(
                    positions,
                    element.positions.iter().tuple_windows().all(|(a, b)| a < b)
                );
                verify_arg!(
                    positions,
                    element.positions.last().is_some_and(|&p| p < element.length)
                );
            } else {
                verify_arg!(positions, element.positions.is_empty());
            }
        }
        Ok(())
    }
}
