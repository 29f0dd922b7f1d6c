//! Caller-owned scoring structures the decoder can unpack features into.

/// One term occurrence as seen by ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermFieldMatchPosition {
    pub element_id: u32,
    pub position: u32,
    pub element_weight: i32,
    pub element_len: u32,
}

/// Match data for one term in one field of the current document.
///
/// Which parts are filled depends on what ranking asked for: normal features are
/// the occurrence positions, interleaved features are the occurrence count and
/// field length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFieldMatchData {
    doc_id: u32,
    positions: Vec<TermFieldMatchPosition>,
    num_occs: u32,
    field_length: u32,
    needs_normal_features: bool,
    needs_interleaved_features: bool,
}

impl TermFieldMatchData {
    /// Match data wanting normal features only.
    pub fn new() -> TermFieldMatchData {
        Self::with_needs(true, false)
    }

    pub fn with_needs(normal: bool, interleaved: bool) -> TermFieldMatchData {
        TermFieldMatchData {
            doc_id: 0,
            positions: Vec::new(),
            num_occs: 0,
            field_length: 0,
            needs_normal_features: normal,
            needs_interleaved_features: interleaved,
        }
    }

    /// Starts a new document, dropping previous positions and counters.
    pub fn reset(&mut self, doc_id: u32) {
        self.doc_id = doc_id;
        self.positions.clear();
        self.num_occs = 0;
        self.field_length = 0;
    }

    #[inline]
    pub fn doc_id(&self) -> u32 {
        self.doc_id
    }

    pub fn positions(&self) -> &[TermFieldMatchPosition] {
        &self.positions
    }

    #[inline]
    pub fn append_position(&mut self, position: TermFieldMatchPosition) {
        self.positions.push(position);
    }

    #[inline]
    pub fn num_occs(&self) -> u32 {
        self.num_occs
    }

    #[inline]
    pub fn field_length(&self) -> u32 {
        self.field_length
    }

    pub fn set_num_occs(&mut self, num_occs: u32) {
        self.num_occs = num_occs;
    }

    pub fn set_field_length(&mut self, field_length: u32) {
        self.field_length = field_length;
    }

    /// Counts one more element of `len` words with `occs` occurrences.
    #[inline]
    pub(crate) fn add_interleaved(&mut self, occs: u32, len: u32) {
        self.num_occs = self.num_occs.saturating_add(occs);
        self.field_length = self.field_length.saturating_add(len);
    }

    #[inline]
    pub fn needs_normal_features(&self) -> bool {
        self.needs_normal_features
    }

    #[inline]
    pub fn needs_interleaved_features(&self) -> bool {
        self.needs_interleaved_features
    }
}

impl Default for TermFieldMatchData {
    fn default() -> Self {
        Self::new()
    }
}
