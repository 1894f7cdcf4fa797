//! Removal of redundant alignments within a read.
//!
//! Aligners often report several alignments for the same stretch of a read: a long
//! alignment plus a shorter one nested inside it, or two alignments that share a few
//! bases at their junction. Before fragments are assigned, each read is reduced to a
//! set of alignments that tile the read without redundancy. All comparisons happen in
//! query (read) coordinates.

use serde::{Deserialize, Serialize};

use porec_core::models::{AlignedSegment, ReadAlignmentGroup};

/// How redundant alignments are detected.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// Neighbouring alignments that still overlap after trimming lose the weaker one.
    #[default]
    Overlap,
    /// Alignments nested inside another alignment are dropped.
    Containment,
}

/// Counters collected while resolving reads.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub reads_seen: u64,
    pub reads_kept: u64,
    pub segments_seen: u64,
    pub segments_kept: u64,
    pub segments_low_quality: u64,
}

impl ResolverStats {
    pub fn merge(&mut self, other: &ResolverStats) {
        self.reads_seen += other.reads_seen;
        self.reads_kept += other.reads_kept;
        self.segments_seen += other.segments_seen;
        self.segments_kept += other.segments_kept;
        self.segments_low_quality += other.segments_low_quality;
    }
}

/// One pair of alignments of a read and the number of query bases they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentOverlap {
    pub read_id: String,
    pub i: usize,
    pub j: usize,
    pub overlap: u32,
}

impl std::fmt::Display for SegmentOverlap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.read_id, self.i, self.j, self.overlap)
    }
}

///
/// Query overlap of every pair of alignments in a read, in query order.
///
/// Pairs are reported as indices into the group's sorted segments, `i < j`.
///
pub fn measure_overlaps(group: &ReadAlignmentGroup) -> Vec<SegmentOverlap> {
    let segments = group.segments();
    let mut overlaps = Vec::new();
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            overlaps.push(SegmentOverlap {
                read_id: group.read_id.clone(),
                i,
                j,
                overlap: segments[i].query_overlap(&segments[j]),
            });
        }
    }
    overlaps
}

/// Query span with `trim` bases removed from both ends, or the full span if that
/// would leave nothing.
fn trimmed_span(segment: &AlignedSegment, trim: u32) -> (u32, u32) {
    let start = segment.query_start.saturating_add(trim);
    let end = segment.query_end.saturating_sub(trim);
    if start < end {
        (start, end)
    } else {
        (segment.query_start, segment.query_end)
    }
}

fn is_contained(inner: &AlignedSegment, outer: &AlignedSegment, trim: u32) -> bool {
    let (start, end) = trimmed_span(inner, trim);
    outer.query_start <= start && end <= outer.query_end
}

/// Overlap of two neighbours once `trim` bases come off the boundaries facing each
/// other. Negative when a gap remains.
fn trimmed_overlap(prev: &AlignedSegment, next: &AlignedSegment, trim: u32) -> i64 {
    let trim = i64::from(trim);
    let end = std::cmp::min(i64::from(prev.query_end) - trim, i64::from(next.query_end));
    let start = std::cmp::max(i64::from(prev.query_start), i64::from(next.query_start) + trim);
    end - start
}

/// Whether `challenger` beats `incumbent`: higher mapping quality, then longer query span.
/// A full tie keeps the incumbent.
fn outranks(challenger: &AlignedSegment, incumbent: &AlignedSegment) -> bool {
    (challenger.mapping_quality, challenger.query_len())
        > (incumbent.mapping_quality, incumbent.query_len())
}

///
/// Reduces the alignments of a read to a non-redundant subset.
///
/// Alignments below the mapping-quality cutoff are always dropped first.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentResolver {
    pub mode: ResolveMode,
    pub trim: u32,
    pub mapping_quality_cutoff: u8,
}

impl Default for ContainmentResolver {
    fn default() -> Self {
        ContainmentResolver {
            mode: ResolveMode::Overlap,
            trim: 20,
            mapping_quality_cutoff: 1,
        }
    }
}

impl ContainmentResolver {
    pub fn new(mode: ResolveMode, trim: u32, mapping_quality_cutoff: u8) -> ContainmentResolver {
        ContainmentResolver {
            mode,
            trim,
            mapping_quality_cutoff,
        }
    }

    ///
    /// Resolve one read. The surviving segments keep their query order.
    ///
    /// # Arguments
    /// - group: every alignment of the read
    ///
    pub fn resolve(&self, group: ReadAlignmentGroup) -> (ReadAlignmentGroup, ResolverStats) {
        let mut stats = ResolverStats {
            reads_seen: 1,
            segments_seen: group.len() as u64,
            ..Default::default()
        };

        let read_id = group.read_id.clone();
        let cutoff = self.mapping_quality_cutoff;
        let passing: Vec<AlignedSegment> = group
            .into_segments()
            .into_iter()
            .filter(|s| s.mapping_quality >= cutoff)
            .collect();
        stats.segments_low_quality = stats.segments_seen - passing.len() as u64;

        let survivors = match self.mode {
            ResolveMode::Containment => self.drop_contained(passing),
            ResolveMode::Overlap => self.drop_overlapping(passing),
        };

        stats.segments_kept = survivors.len() as u64;
        stats.reads_kept = u64::from(!survivors.is_empty());

        // survivors are a subset of an already sorted, validated group
        let resolved = ReadAlignmentGroup::new(&read_id, survivors).unwrap_or_default();
        (resolved, stats)
    }

    fn drop_contained(&self, segments: Vec<AlignedSegment>) -> Vec<AlignedSegment> {
        let n = segments.len();
        let mut discard = vec![false; n];

        for i in 0..n {
            for j in 0..n {
                if i == j || !is_contained(&segments[i], &segments[j], self.trim) {
                    continue;
                }

                if is_contained(&segments[j], &segments[i], self.trim) {
                    // mutual: lower quality goes, then the earlier one
                    let loser = match segments[i]
                        .mapping_quality
                        .cmp(&segments[j].mapping_quality)
                    {
                        std::cmp::Ordering::Less => i,
                        std::cmp::Ordering::Greater => j,
                        std::cmp::Ordering::Equal => i.min(j),
                    };
                    if loser != i {
                        continue;
                    }
                }

                discard[i] = true;
                break;
            }
        }

        segments
            .into_iter()
            .zip(discard)
            .filter_map(|(segment, discard)| (!discard).then_some(segment))
            .collect()
    }

    fn drop_overlapping(&self, segments: Vec<AlignedSegment>) -> Vec<AlignedSegment> {
        let mut kept: Vec<AlignedSegment> = Vec::with_capacity(segments.len());

        for current in segments {
            let mut survives = true;
            while let Some(prev) = kept.last() {
                if trimmed_overlap(prev, &current, self.trim) <= 0 {
                    break;
                }
                if outranks(&current, prev) {
                    kept.pop();
                } else {
                    survives = false;
                    break;
                }
            }
            if survives {
                kept.push(current);
            }
        }

        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn segment(query_start: u32, query_end: u32, mapping_quality: u8) -> AlignedSegment {
        AlignedSegment {
            chrom: "chr1".to_string(),
            start: u64::from(query_start) * 10,
            end: u64::from(query_start) * 10 + 100,
            is_reverse: false,
            read_id: "read1".to_string(),
            query_start,
            query_end,
            mapping_quality,
        }
    }

    fn group(segments: Vec<AlignedSegment>) -> ReadAlignmentGroup {
        ReadAlignmentGroup::new("read1", segments).unwrap()
    }

    fn spans(group: &ReadAlignmentGroup) -> Vec<(u32, u32)> {
        group
            .segments()
            .iter()
            .map(|s| (s.query_start, s.query_end))
            .collect()
    }

    #[rstest]
    fn test_containment_end_to_end() {
        let resolver = ContainmentResolver::new(ResolveMode::Containment, 2, 0);
        let (resolved, stats) =
            resolver.resolve(group(vec![segment(0, 50, 60), segment(45, 100, 60), segment(40, 48, 60)]));

        assert_eq!(spans(&resolved), vec![(0, 50), (45, 100)]);
        assert_eq!(
            stats,
            ResolverStats {
                reads_seen: 1,
                reads_kept: 1,
                segments_seen: 3,
                segments_kept: 2,
                segments_low_quality: 0,
            }
        );
    }

    #[rstest]
    fn test_segment_contained_in_two_is_dropped_once() {
        let resolver = ContainmentResolver::new(ResolveMode::Containment, 0, 0);
        let (resolved, stats) =
            resolver.resolve(group(vec![segment(0, 100, 60), segment(10, 90, 60), segment(20, 30, 60)]));
        assert_eq!(spans(&resolved), vec![(0, 100)]);
        assert_eq!(stats.segments_kept, 1);
    }

    #[rstest]
    #[case(30, 60, (10, 80))]
    #[case(60, 30, (0, 90))]
    #[case(60, 60, (10, 80))]
    fn test_mutual_containment(#[case] mapq_first: u8, #[case] mapq_second: u8, #[case] kept: (u32, u32)) {
        // each span, trimmed by 10, lies inside the other
        let resolver = ContainmentResolver::new(ResolveMode::Containment, 10, 0);
        let (resolved, _) =
            resolver.resolve(group(vec![segment(0, 90, mapq_first), segment(10, 80, mapq_second)]));
        assert_eq!(spans(&resolved), vec![kept]);
    }

    #[rstest]
    fn test_overlap_mode_trims_junctions() {
        let resolver = ContainmentResolver::new(ResolveMode::Overlap, 20, 0);

        // 50 shared bases, more than the two trims can absorb
        let (resolved, _) = resolver.resolve(group(vec![segment(0, 100, 60), segment(50, 200, 20)]));
        assert_eq!(spans(&resolved), vec![(0, 100)]);

        // 15 shared bases vanish after trimming
        let (resolved, _) = resolver.resolve(group(vec![segment(0, 100, 60), segment(85, 200, 20)]));
        assert_eq!(spans(&resolved), vec![(0, 100), (85, 200)]);
    }

    #[rstest]
    fn test_overlap_mode_prefers_quality_then_length() {
        let resolver = ContainmentResolver::new(ResolveMode::Overlap, 0, 0);

        let (resolved, _) = resolver.resolve(group(vec![segment(0, 100, 20), segment(50, 120, 60)]));
        assert_eq!(spans(&resolved), vec![(50, 120)]);

        let (resolved, _) = resolver.resolve(group(vec![segment(0, 100, 60), segment(50, 300, 60)]));
        assert_eq!(spans(&resolved), vec![(50, 300)]);

        // full tie keeps the earlier alignment
        let (resolved, _) = resolver.resolve(group(vec![segment(0, 100, 60), segment(50, 150, 60)]));
        assert_eq!(spans(&resolved), vec![(0, 100)]);
    }

    #[rstest]
    fn test_overlap_mode_chain_of_winners() {
        let resolver = ContainmentResolver::new(ResolveMode::Overlap, 0, 0);
        let (resolved, _) = resolver.resolve(group(vec![
            segment(0, 100, 10),
            segment(50, 200, 20),
            segment(150, 300, 60),
        ]));
        assert_eq!(spans(&resolved), vec![(150, 300)]);
    }

    #[rstest]
    fn test_low_quality_is_dropped_first() {
        let resolver = ContainmentResolver::new(ResolveMode::Containment, 0, 30);
        let (resolved, stats) = resolver.resolve(group(vec![segment(0, 100, 10), segment(20, 40, 60)]));
        assert_eq!(spans(&resolved), vec![(20, 40)]);
        assert_eq!(stats.segments_low_quality, 1);

        let (resolved, stats) = resolver.resolve(group(vec![segment(0, 100, 10)]));
        assert!(resolved.is_empty());
        assert_eq!(stats.reads_kept, 0);
        assert_eq!(resolved.read_id, "read1");
    }

    #[rstest]
    fn test_single_segment_survives(#[values(ResolveMode::Overlap, ResolveMode::Containment)] mode: ResolveMode) {
        let resolver = ContainmentResolver::new(mode, 20, 1);
        let (resolved, stats) = resolver.resolve(group(vec![segment(0, 10, 60)]));
        assert_eq!(spans(&resolved), vec![(0, 10)]);
        assert_eq!(stats.reads_kept, 1);
    }

    #[rstest]
    fn test_resolution_is_idempotent(
        #[values(ResolveMode::Overlap, ResolveMode::Containment)] mode: ResolveMode,
        #[values(0, 5, 20)] trim: u32,
    ) {
        let resolver = ContainmentResolver::new(mode, trim, 5);
        let input = group(vec![
            segment(0, 120, 60),
            segment(10, 60, 60),
            segment(100, 250, 40),
            segment(240, 300, 2),
            segment(245, 400, 60),
            segment(390, 420, 60),
            segment(500, 520, 10),
        ]);

        let (once, _) = resolver.resolve(input);
        let (twice, stats) = resolver.resolve(once.clone());
        assert_eq!(twice, once);
        assert_eq!(stats.segments_seen, stats.segments_kept);
    }

    #[rstest]
    fn test_measure_overlaps() {
        let overlaps = measure_overlaps(&group(vec![segment(0, 50, 60), segment(45, 100, 60), segment(200, 250, 60)]));
        let values: Vec<(usize, usize, u32)> = overlaps.iter().map(|o| (o.i, o.j, o.overlap)).collect();
        assert_eq!(values, vec![(0, 1, 5), (0, 2, 0), (1, 2, 0)]);
        assert_eq!(overlaps[0].to_string(), "read1\t0\t1\t5");
    }
}
