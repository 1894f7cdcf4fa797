use porec_core::models::{AlignedSegment, FragmentAssignment, MappingType};
use porec_overlaprs::{FragmentIndex, Overlap};

use crate::errors::{Result, WalkError};

///
/// Pick the fragment for an alignment from the overlaps it has with the index.
///
/// Overlaps of `min_overlap` bases or fewer are ignored. A single remaining overlap
/// is a `simple` match; with several, the longest wins (lowest fragment id on ties)
/// and the match is `multi_frag`.
///
pub fn assign_overlaps(overlaps: &[Overlap<'_>], min_overlap: u64) -> FragmentAssignment {
    let mut qualifying = 0usize;
    let mut best: Option<&Overlap<'_>> = None;

    for overlap in overlaps.iter().filter(|o| o.length > min_overlap) {
        qualifying += 1;
        best = match best {
            Some(current)
                if overlap.length > current.length
                    || (overlap.length == current.length && overlap.frag_id() < current.frag_id()) =>
            {
                Some(overlap)
            }
            None => Some(overlap),
            keep => keep,
        };
    }

    match best {
        None => FragmentAssignment::unassigned(),
        Some(best) => FragmentAssignment {
            frag_id: Some(best.frag_id()),
            mapping_type: if qualifying == 1 {
                MappingType::Simple
            } else {
                MappingType::MultiFrag
            },
        },
    }
}

///
/// Assign one aligned segment to a fragment of the index.
///
/// # Arguments
/// - segment: the alignment to assign
/// - index: fragments to assign against
/// - min_overlap: overlaps must be strictly longer than this to count
///
/// # Errors
/// [`WalkError::UnknownFragmentReference`] when the segment's chromosome has no fragments.
///
pub fn assign(
    segment: &AlignedSegment,
    index: &FragmentIndex,
    min_overlap: u64,
) -> Result<FragmentAssignment> {
    let overlaps: Vec<Overlap<'_>> = index
        .query(&segment.chrom, segment.start, segment.end)
        .collect();

    assign_queried(segment, index, &overlaps, min_overlap)
}

/// [`assign`] for a segment whose overlaps were already looked up, e.g. by a batch query.
pub(crate) fn assign_queried(
    segment: &AlignedSegment,
    index: &FragmentIndex,
    overlaps: &[Overlap<'_>],
    min_overlap: u64,
) -> Result<FragmentAssignment> {
    if !index.contains_chrom(&segment.chrom) {
        return Err(WalkError::UnknownFragmentReference {
            read_id: segment.read_id.clone(),
            chrom: segment.chrom.clone(),
        });
    }
    Ok(assign_overlaps(overlaps, min_overlap))
}
