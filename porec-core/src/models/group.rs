use crate::errors::ModelError;
use crate::models::AlignedSegment;

///
/// All alignments of one read, in query order.
///
/// Segments are kept sorted by `(query_start, query_end)`; the sort is stable so
/// input order breaks any remaining ties.
///
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReadAlignmentGroup {
    pub read_id: String,
    segments: Vec<AlignedSegment>,
}

impl ReadAlignmentGroup {
    ///
    /// Create a group, validating every segment and sorting them into query order.
    ///
    /// # Arguments
    /// - read_id: the read every segment must belong to
    /// - segments: the alignments of the read, in any order
    ///
    pub fn new(read_id: &str, mut segments: Vec<AlignedSegment>) -> Result<ReadAlignmentGroup, ModelError> {
        for segment in &segments {
            if segment.read_id != read_id {
                return Err(ModelError::MalformedSegment {
                    read_id: read_id.to_string(),
                    reason: format!("segment belongs to read {}", segment.read_id),
                });
            }
            segment.validate()?;
        }

        segments.sort_by_key(|s| (s.query_start, s.query_end));

        Ok(ReadAlignmentGroup {
            read_id: read_id.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[AlignedSegment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<AlignedSegment> {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Keep only the segments for which `keep` returns true, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&AlignedSegment) -> bool,
    {
        self.segments.retain(keep);
    }
}
