use log::warn;
use serde::{Deserialize, Serialize};

use porec_core::models::{ContactWalk, FragmentAssignment, MappingType, Monomer, ReadAlignmentGroup};
use porec_overlaprs::{FragmentIndex, Overlap};

use crate::assign::assign_queried;

/// Counters collected while building walks.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub monomers: u64,
    pub unknown_references: u64,
    pub simple: u64,
    pub multi_frag: u64,
    pub unassigned: u64,
}

impl WalkStats {
    pub fn merge(&mut self, other: &WalkStats) {
        self.monomers += other.monomers;
        self.unknown_references += other.unknown_references;
        self.simple += other.simple;
        self.multi_frag += other.multi_frag;
        self.unassigned += other.unassigned;
    }

    fn count(&mut self, mapping_type: MappingType) {
        self.monomers += 1;
        match mapping_type {
            MappingType::Simple => self.simple += 1,
            MappingType::MultiFrag => self.multi_frag += 1,
            MappingType::None => self.unassigned += 1,
        }
    }
}

///
/// Turns the resolved alignments of a read into its contact walk.
///
/// The fragment index is borrowed, so one builder can be shared by every worker.
///
#[derive(Debug, Clone)]
pub struct WalkBuilder<'a> {
    index: &'a FragmentIndex,
    min_overlap: u64,
    containment_cutoff: Option<f64>,
}

impl<'a> WalkBuilder<'a> {
    ///
    /// # Arguments
    /// - index: fragments to assign against
    /// - min_overlap: overlaps must be strictly longer than this to count
    /// - containment_cutoff: percentage of a fragment an alignment must cover for the
    ///   fragment to be counted as contained; `None` skips the count
    ///
    pub fn new(index: &'a FragmentIndex, min_overlap: u64, containment_cutoff: Option<f64>) -> WalkBuilder<'a> {
        WalkBuilder {
            index,
            min_overlap,
            containment_cutoff,
        }
    }

    fn contained_fragments(&self, overlaps: &[Overlap<'_>]) -> u32 {
        match self.containment_cutoff {
            Some(cutoff) => overlaps
                .iter()
                .filter(|o| o.length as f64 > cutoff / 100.0 * o.frag_len() as f64)
                .count() as u32,
            None => 0,
        }
    }

    ///
    /// Build the walk of one read. Monomers follow the group's query order exactly.
    ///
    /// Segments on chromosomes without fragments are kept as unassigned monomers; the
    /// problem is logged and counted.
    ///
    pub fn build(&self, group: ReadAlignmentGroup) -> (ContactWalk, WalkStats) {
        let mut stats = WalkStats::default();
        let overlaps = self.index.query_many(group.segments());

        let mut monomers = Vec::with_capacity(group.len());
        for (segment, overlaps) in group.segments().iter().zip(&overlaps) {
            let assignment = match assign_queried(segment, self.index, overlaps, self.min_overlap) {
                Ok(assignment) => assignment,
                Err(e) => {
                    warn!("{}", e);
                    stats.unknown_references += 1;
                    FragmentAssignment::unassigned()
                }
            };
            stats.count(assignment.mapping_type);
            monomers.push((assignment, self.contained_fragments(overlaps)));
        }

        let walk = ContactWalk {
            read_id: group.read_id.clone(),
            monomers: group
                .into_segments()
                .into_iter()
                .zip(monomers)
                .map(|(segment, (assignment, contained_fragments))| Monomer {
                    segment,
                    assignment,
                    contained_fragments,
                })
                .collect(),
        };

        (walk, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containment::{ContainmentResolver, ResolveMode};
    use porec_core::models::AlignedSegment;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn index() -> FragmentIndex {
        FragmentIndex::from_endpoints(vec![
            ("chr1", vec![10, 20, 30, 100]),
            ("chr2", vec![5, 15, 25, 90]),
        ])
        .unwrap()
    }

    fn segment(chrom: &str, start: u64, end: u64, query_start: u32, query_end: u32) -> AlignedSegment {
        AlignedSegment {
            chrom: chrom.to_string(),
            start,
            end,
            is_reverse: false,
            read_id: "read1".to_string(),
            query_start,
            query_end,
            mapping_quality: 60,
        }
    }

    #[rstest]
    fn test_walk_follows_query_order(index: FragmentIndex) {
        let group = ReadAlignmentGroup::new(
            "read1",
            vec![
                segment("chr2", 16, 24, 100, 108),
                segment("chr1", 40, 90, 0, 50),
                segment("chr1", 0, 9, 200, 209),
            ],
        )
        .unwrap();

        let (walk, stats) = WalkBuilder::new(&index, 0, None).build(group);
        let frags: Vec<Option<u32>> = walk.monomers.iter().map(|m| m.frag_id()).collect();
        assert_eq!(frags, vec![Some(3), Some(6), Some(0)]);
        assert_eq!(stats.simple, 3);
        assert_eq!(stats.monomers, 3);
        assert!(walk.is_contact());
    }

    #[rstest]
    fn test_unknown_reference_is_unassigned_and_counted(index: FragmentIndex) {
        let group = ReadAlignmentGroup::new(
            "read1",
            vec![segment("chrUn", 0, 50, 0, 50), segment("chr1", 40, 90, 60, 110)],
        )
        .unwrap();

        let (walk, stats) = WalkBuilder::new(&index, 0, None).build(group);
        assert_eq!(walk.len(), 2);
        assert_eq!(walk.monomers[0].assignment, FragmentAssignment::unassigned());
        assert_eq!(stats.unknown_references, 1);
        assert_eq!(stats.unassigned, 1);
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some(99.0), 1)]
    #[case(Some(50.0), 2)]
    #[case(Some(2.0), 3)]
    fn test_contained_fragments(index: FragmentIndex, #[case] cutoff: Option<f64>, #[case] expected: u32) {
        // covers 8/10 of fragment 1, all of fragment 2 and 2/70 of fragment 3
        let group = ReadAlignmentGroup::new("read1", vec![segment("chr1", 12, 32, 0, 20)]).unwrap();
        let (walk, _) = WalkBuilder::new(&index, 0, cutoff).build(group);
        assert_eq!(walk.monomers[0].contained_fragments, expected);
        // advisory only
        assert_eq!(walk.monomers[0].frag_id(), Some(2));
        assert_eq!(walk.monomers[0].assignment.mapping_type, MappingType::MultiFrag);
    }

    #[rstest]
    fn test_empty_group_gives_empty_walk(index: FragmentIndex) {
        let group = ReadAlignmentGroup::new("read1", vec![]).unwrap();
        let (walk, stats) = WalkBuilder::new(&index, 0, None).build(group);
        assert!(walk.is_empty());
        assert!(!walk.is_contact());
        assert_eq!(stats, WalkStats::default());
    }

    #[rstest]
    fn test_resolve_then_build(index: FragmentIndex) {
        let group = ReadAlignmentGroup::new(
            "read1",
            vec![
                segment("chr1", 0, 9, 0, 50),
                segment("chr1", 40, 95, 45, 100),
                segment("chr2", 16, 24, 40, 48),
            ],
        )
        .unwrap();

        let resolver = ContainmentResolver::new(ResolveMode::Containment, 2, 1);
        let (resolved, _) = resolver.resolve(group);
        let (walk, _) = WalkBuilder::new(&index, 0, None).build(resolved);

        let starts: Vec<u32> = walk.monomers.iter().map(|m| m.segment.query_start).collect();
        assert_eq!(starts, vec![0, 45]);
        let frags: Vec<Option<u32>> = walk.monomers.iter().map(|m| m.frag_id()).collect();
        assert_eq!(frags, vec![Some(0), Some(3)]);
    }
}
