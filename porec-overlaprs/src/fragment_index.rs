//! Genome-wide index of restriction fragments (or fixed-width bins).
//!
//! Fragments on a chromosome are disjoint and sorted, so both their starts and their
//! ends are ascending. An overlap query is a binary search for the first fragment
//! ending after the query start followed by a linear walk until a fragment starts at
//! or after the query end: O(log n + k).
//!
//! ```
//! use porec_overlaprs::FragmentIndex;
//!
//! let index = FragmentIndex::from_endpoints(vec![("chr1", vec![10, 20, 30, 100])]).unwrap();
//!
//! let lengths: Vec<u64> = index.query("chr1", 15, 25).map(|o| o.length).collect();
//! assert_eq!(lengths, vec![5, 5]);
//! ```

use fxhash::FxHashMap;

use porec_core::models::{AlignedSegment, Interval};

use crate::errors::{FragmentIndexError, Result};

/// A fragment: `[start, end)` on its chromosome, valued by the fragment id.
pub type Fragment = Interval<u64, u32>;

///
/// Turn a list of breakpoints into consecutive half-open fragments.
///
/// A leading `0` is implied when the first breakpoint is not `0`. Ids start at
/// `id_offset` and increase by one per fragment.
///
/// # Arguments
/// - chrom: chromosome the breakpoints belong to (used in errors)
/// - positions: ascending breakpoints, the last one being the chromosome length
/// - id_offset: id of the first fragment
///
pub fn endpoints_to_intervals(
    chrom: &str,
    positions: &[u64],
    id_offset: u32,
) -> Result<Vec<Fragment>> {
    let malformed = |reason: String| FragmentIndexError::MalformedEndpoints {
        chrom: chrom.to_string(),
        reason,
    };

    if positions.is_empty() {
        return Err(malformed("no endpoints supplied".to_string()));
    }

    let mut endpoints = Vec::with_capacity(positions.len() + 1);
    if positions[0] != 0 {
        endpoints.push(0);
    }
    endpoints.extend_from_slice(positions);

    if endpoints.len() < 2 {
        return Err(malformed("a chromosome needs at least one fragment".to_string()));
    }

    endpoints
        .windows(2)
        .enumerate()
        .map(|(offset, pair)| {
            if pair[0] >= pair[1] {
                return Err(malformed(format!(
                    "endpoints are not strictly increasing ({} then {})",
                    pair[0], pair[1]
                )));
            }
            let id = u32::try_from(offset)
                .ok()
                .and_then(|offset| id_offset.checked_add(offset))
                .ok_or_else(|| malformed("fragment id overflows u32".to_string()))?;
            Ok(Interval {
                start: pair[0],
                end: pair[1],
                val: id,
            })
        })
        .collect()
}

/// The fragments of one chromosome, sorted and disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromFragments {
    pub chrom: String,
    pub length: u64,
    fragments: Vec<Fragment>,
}

impl ChromFragments {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Index of the first fragment that ends after `start`.
    #[inline]
    fn lower_bound(&self, start: u64) -> usize {
        self.fragments.partition_point(|f| f.end <= start)
    }

    /// Iterate over the fragments overlapping `[start, end)`.
    pub fn find_iter(&self, start: u64, end: u64) -> IterOverlaps<'_> {
        IterOverlaps {
            chrom: &self.chrom,
            fragments: &self.fragments,
            off: self.lower_bound(start),
            start,
            end,
        }
    }

    /// Same as [`find_iter`](Self::find_iter), but resumes the binary search from
    /// `cursor`. Queries issued in ascending start order only ever move the cursor
    /// forward; an out-of-order query resets it.
    pub fn seek(&self, start: u64, end: u64, cursor: &mut usize) -> IterOverlaps<'_> {
        let valid = *cursor <= self.fragments.len()
            && (*cursor == 0 || self.fragments[*cursor - 1].end <= start);
        if !valid {
            *cursor = 0;
        }
        *cursor += self.fragments[*cursor..].partition_point(|f| f.end <= start);

        IterOverlaps {
            chrom: &self.chrom,
            fragments: &self.fragments,
            off: *cursor,
            start,
            end,
        }
    }
}

/// One fragment intersecting a query, with the intersection length in bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap<'a> {
    pub chrom: &'a str,
    pub fragment: &'a Fragment,
    pub length: u64,
}

impl Overlap<'_> {
    pub fn frag_id(&self) -> u32 {
        self.fragment.val
    }

    pub fn frag_start(&self) -> u64 {
        self.fragment.start
    }

    pub fn frag_end(&self) -> u64 {
        self.fragment.end
    }

    pub fn frag_len(&self) -> u64 {
        self.fragment.width()
    }
}

/// Lazy iterator over the fragments overlapping a query, in ascending start order.
///
/// Created by [`FragmentIndex::query`] and [`ChromFragments::find_iter`].
#[derive(Debug, Clone)]
pub struct IterOverlaps<'a> {
    chrom: &'a str,
    fragments: &'a [Fragment],
    off: usize,
    start: u64,
    end: u64,
}

impl<'a> IterOverlaps<'a> {
    fn empty() -> IterOverlaps<'a> {
        IterOverlaps {
            chrom: "",
            fragments: &[],
            off: 0,
            start: 0,
            end: 0,
        }
    }
}

impl<'a> Iterator for IterOverlaps<'a> {
    type Item = Overlap<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.off < self.fragments.len() {
            let fragment = &self.fragments[self.off];
            if fragment.start >= self.end {
                self.off = self.fragments.len();
                break;
            }
            self.off += 1;

            // zero-length probes and touching ends give 0 here
            let length = fragment.intersect(self.start, self.end);
            if length > 0 {
                return Some(Overlap {
                    chrom: self.chrom,
                    fragment,
                    length,
                });
            }
        }
        None
    }
}

///
/// An immutable index of fragments across chromosomes.
///
/// Chromosomes keep the order they were added in, and fragment ids increase
/// along that order. The index owns every fragment; queries hand out references.
///
#[derive(Debug, Clone, Default)]
pub struct FragmentIndex {
    chroms: Vec<ChromFragments>,
    lookup: FxHashMap<String, usize>,
    by_id: FxHashMap<u32, (usize, usize)>,
}

impl PartialEq for FragmentIndex {
    fn eq(&self, other: &Self) -> bool {
        self.chroms == other.chroms
    }
}

impl Eq for FragmentIndex {}

impl FragmentIndex {
    fn push_chrom(&mut self, chrom: String, fragments: Vec<Fragment>, length: u64) -> Result<()> {
        if self.lookup.contains_key(&chrom) {
            return Err(FragmentIndexError::DuplicateChromosome(chrom));
        }

        let chrom_idx = self.chroms.len();
        for (pos, fragment) in fragments.iter().enumerate() {
            if self.by_id.insert(fragment.val, (chrom_idx, pos)).is_some() {
                return Err(FragmentIndexError::DuplicateFragmentId(fragment.val));
            }
        }

        self.lookup.insert(chrom.clone(), chrom_idx);
        self.chroms.push(ChromFragments {
            chrom,
            length,
            fragments,
        });
        Ok(())
    }

    fn next_id(&self) -> Result<u32> {
        u32::try_from(self.by_id.len()).map_err(|_| FragmentIndexError::MalformedEndpoints {
            chrom: String::new(),
            reason: "too many fragments for u32 ids".to_string(),
        })
    }

    ///
    /// Build an index from chromosome breakpoints.
    ///
    /// Chromosomes are taken in iteration order, which fixes the fragment ids.
    /// The last breakpoint of each chromosome is its length.
    ///
    /// # Arguments
    /// - endpoints: `(chrom, ascending breakpoints)` pairs
    ///
    pub fn from_endpoints<I, S>(endpoints: I) -> Result<FragmentIndex>
    where
        I: IntoIterator<Item = (S, Vec<u64>)>,
        S: Into<String>,
    {
        let mut index = FragmentIndex::default();
        for (chrom, positions) in endpoints {
            let chrom = chrom.into();
            let fragments = endpoints_to_intervals(&chrom, &positions, index.next_id()?)?;
            let length = fragments.last().map_or(0, |f| f.end);
            index.push_chrom(chrom, fragments, length)?;
        }
        Ok(index)
    }

    ///
    /// Build an index from four-column rows: `(chrom, start, end, fragment id)`.
    ///
    /// Rows of a chromosome must be contiguous in the input, sorted by start and
    /// non-overlapping. Ids are kept as given. The chromosome length is taken to be
    /// the end of its last fragment.
    ///
    pub fn from_intervals<I>(rows: I) -> Result<FragmentIndex>
    where
        I: IntoIterator<Item = (String, u64, u64, u32)>,
    {
        let mut index = FragmentIndex::default();
        let mut current: Option<(String, Vec<Fragment>)> = None;

        for (chrom, start, end, id) in rows {
            if start >= end {
                return Err(FragmentIndexError::MalformedEndpoints {
                    chrom,
                    reason: format!("fragment {start}-{end} is empty"),
                });
            }

            match current.as_mut() {
                Some((name, fragments)) if *name == chrom => {
                    let prev_end = fragments.last().map_or(0, |f| f.end);
                    if start < prev_end {
                        return Err(FragmentIndexError::UnsortedFragments { chrom, start });
                    }
                    fragments.push(Interval { start, end, val: id });
                }
                _ => {
                    if let Some((name, fragments)) = current.take() {
                        let length = fragments.last().map_or(0, |f| f.end);
                        index.push_chrom(name, fragments, length)?;
                    }
                    current = Some((chrom, vec![Interval { start, end, val: id }]));
                }
            }
        }

        if let Some((name, fragments)) = current {
            let length = fragments.last().map_or(0, |f| f.end);
            index.push_chrom(name, fragments, length)?;
        }

        Ok(index)
    }

    /// Number of fragments across all chromosomes.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains_chrom(&self, chrom: &str) -> bool {
        self.lookup.contains_key(chrom)
    }

    pub fn chrom(&self, chrom: &str) -> Option<&ChromFragments> {
        self.lookup.get(chrom).map(|&idx| &self.chroms[idx])
    }

    /// Chromosomes in the order they were added.
    pub fn chroms(&self) -> &[ChromFragments] {
        &self.chroms
    }

    pub fn chrom_length(&self, chrom: &str) -> Option<u64> {
        self.chrom(chrom).map(|c| c.length)
    }

    /// Look up a fragment by id.
    pub fn fragment(&self, id: u32) -> Option<(&str, &Fragment)> {
        self.by_id.get(&id).map(|&(chrom_idx, pos)| {
            let chrom = &self.chroms[chrom_idx];
            (chrom.chrom.as_str(), &chrom.fragments[pos])
        })
    }

    /// Iterate over every fragment, ordered by chromosome then start.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fragment)> + '_ {
        self.chroms.iter().flat_map(|c| {
            c.fragments
                .iter()
                .map(move |fragment| (c.chrom.as_str(), fragment))
        })
    }

    ///
    /// All fragments intersecting `[chrom:start, end)`, in ascending start order.
    ///
    /// Unknown chromosomes and zero-length queries give an empty iterator.
    ///
    pub fn query(&self, chrom: &str, start: u64, end: u64) -> IterOverlaps<'_> {
        match self.chrom(chrom) {
            Some(chrom) => chrom.find_iter(start, end),
            None => IterOverlaps::empty(),
        }
    }

    ///
    /// Query many segments at once with a sorted merge join.
    ///
    /// Segments are visited in (chromosome, start) order with one cursor per
    /// chromosome, so each lookup is a binary search over the fragments not yet
    /// passed. The result holds one vector per input segment, in input order.
    ///
    pub fn query_many(&self, segments: &[AlignedSegment]) -> Vec<Vec<Overlap<'_>>> {
        let mut order: Vec<(usize, usize)> = segments
            .iter()
            .enumerate()
            .filter_map(|(i, s)| self.lookup.get(&s.chrom).map(|&c| (c, i)))
            .collect();
        order.sort_by_key(|&(c, i)| (c, segments[i].start, i));

        let mut results: Vec<Vec<Overlap<'_>>> = vec![Vec::new(); segments.len()];
        let mut current_chrom = usize::MAX;
        let mut cursor = 0;

        for (chrom_idx, i) in order {
            if chrom_idx != current_chrom {
                current_chrom = chrom_idx;
                cursor = 0;
            }
            let segment = &segments[i];
            results[i].extend(self.chroms[chrom_idx].seek(segment.start, segment.end, &mut cursor));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn segment(chrom: &str, start: u64, end: u64) -> AlignedSegment {
        AlignedSegment {
            chrom: chrom.to_string(),
            start,
            end,
            is_reverse: false,
            read_id: "read1".to_string(),
            query_start: 0,
            query_end: 10,
            mapping_quality: 60,
        }
    }

    #[rstest]
    fn test_endpoints_to_intervals() {
        let intervals = endpoints_to_intervals("chr1", &[10, 20, 30], 0).unwrap();
        let tuples: Vec<(u64, u64, u32)> =
            intervals.iter().map(|f| (f.start, f.end, f.val)).collect();
        assert_eq!(tuples, vec![(0, 10, 0), (10, 20, 1), (20, 30, 2)]);

        let intervals = endpoints_to_intervals("chr1", &[10, 20, 30], 100).unwrap();
        let ids: Vec<u32> = intervals.iter().map(|f| f.val).collect();
        assert_eq!(ids, vec![100, 101, 102]);
    }

    #[rstest]
    fn test_leading_zero_is_not_duplicated() {
        let intervals = endpoints_to_intervals("chr1", &[0, 10, 20], 0).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start, 0);
        assert_eq!(intervals[0].end, 10);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![0])]
    #[case(vec![10, 10, 20])]
    #[case(vec![10, 30, 20])]
    fn test_malformed_endpoints(#[case] positions: Vec<u64>) {
        let result = FragmentIndex::from_endpoints(vec![("chr1", positions)]);
        assert!(matches!(
            result,
            Err(FragmentIndexError::MalformedEndpoints { .. })
        ));
    }

    #[rstest]
    fn test_ids_continue_across_chromosomes(index: FragmentIndex) {
        assert_eq!(index.len(), 8);
        let chr2_ids: Vec<u32> = index.chrom("chr2").unwrap().fragments().iter().map(|f| f.val).collect();
        assert_eq!(chr2_ids, vec![4, 5, 6, 7]);
        assert_eq!(index.chrom_length("chr1"), Some(100));
        assert_eq!(index.chrom_length("chr2"), Some(90));
    }

    #[rstest]
    fn test_duplicate_chromosome() {
        let result = FragmentIndex::from_endpoints(vec![("chr1", vec![10]), ("chr1", vec![20])]);
        assert!(matches!(
            result,
            Err(FragmentIndexError::DuplicateChromosome(_))
        ));
    }

    #[rstest]
    #[case(("chr1", 15, 25), vec![5, 5], vec![1, 2])]
    #[case(("chr1", 100, 110), vec![], vec![])]
    #[case(("chr1", 5, 5), vec![], vec![])]
    #[case(("chr1", 9, 10), vec![1], vec![0])]
    #[case(("chr1", 0, 100), vec![10, 10, 10, 70], vec![0, 1, 2, 3])]
    #[case(("chr2", 14, 16), vec![1, 1], vec![5, 6])]
    #[case(("chrX", 0, 100), vec![], vec![])]
    fn test_overlaps(
        index: FragmentIndex,
        #[case] query: (&str, u64, u64),
        #[case] lengths: Vec<u64>,
        #[case] ids: Vec<u32>,
    ) {
        let (chrom, start, end) = query;
        let overlaps: Vec<Overlap> = index.query(chrom, start, end).collect();
        assert_eq!(overlaps.iter().map(|o| o.length).collect::<Vec<_>>(), lengths);
        assert_eq!(overlaps.iter().map(|o| o.frag_id()).collect::<Vec<_>>(), ids);
    }

    #[rstest]
    fn test_overlaps_are_ordered_and_positive(index: FragmentIndex) {
        for start in 0..110u64 {
            for end in start..115u64 {
                let overlaps: Vec<Overlap> = index.query("chr1", start, end).collect();
                assert!(overlaps.iter().all(|o| o.length > 0));
                assert!(overlaps.windows(2).all(|w| w[0].frag_start() < w[1].frag_start()));
                if start == end {
                    assert!(overlaps.is_empty());
                }
                let total: u64 = overlaps.iter().map(|o| o.length).sum();
                assert_eq!(total, end.min(100).saturating_sub(start.min(100)));
            }
        }
    }

    #[rstest]
    fn test_fragment_lookup(index: FragmentIndex) {
        let (chrom, fragment) = index.fragment(6).unwrap();
        assert_eq!(chrom, "chr2");
        assert_eq!((fragment.start, fragment.end), (15, 25));
        assert!(index.fragment(8).is_none());
        assert_eq!(index.iter().count(), 8);
    }

    #[rstest]
    fn test_query_many_matches_single_queries(index: FragmentIndex) {
        let segments = vec![
            segment("chr2", 20, 40),
            segment("chr1", 15, 25),
            segment("chr1", 5, 12),
            segment("chrUn", 0, 10),
            segment("chr1", 95, 120),
            segment("chr1", 0, 3),
        ];

        let batch = index.query_many(&segments);
        assert_eq!(batch.len(), segments.len());
        for (segment, overlaps) in segments.iter().zip(batch.iter()) {
            let single: Vec<Overlap> = index
                .query(&segment.chrom, segment.start, segment.end)
                .collect();
            assert_eq!(overlaps, &single);
        }
        assert!(batch[3].is_empty());
    }

    #[rstest]
    fn test_seek_resets_on_out_of_order_queries(index: FragmentIndex) {
        let chrom = index.chrom("chr1").unwrap();
        let mut cursor = 0;
        assert_eq!(chrom.seek(50, 60, &mut cursor).count(), 1);
        assert_eq!(cursor, 3);
        assert_eq!(chrom.seek(0, 15, &mut cursor).count(), 2);
        assert_eq!(cursor, 0);
    }

    #[rstest]
    fn test_from_intervals() {
        let rows = vec![
            ("chr1".to_string(), 0, 10, 7),
            ("chr1".to_string(), 10, 20, 8),
            ("chr2".to_string(), 0, 5, 9),
        ];
        let index = FragmentIndex::from_intervals(rows).unwrap();
        assert_eq!(index.query("chr1", 12, 13).next().unwrap().frag_id(), 8);
        assert_eq!(index.chrom_length("chr2"), Some(5));
    }

    #[rstest]
    #[case(vec![("chr1", 0, 10, 0), ("chr1", 5, 20, 1)])]
    #[case(vec![("chr1", 10, 20, 0), ("chr1", 0, 10, 1)])]
    fn test_from_intervals_rejects_unsorted(#[case] rows: Vec<(&str, u64, u64, u32)>) {
        let rows = rows.into_iter().map(|(c, s, e, i)| (c.to_string(), s, e, i));
        assert!(matches!(
            FragmentIndex::from_intervals(rows),
            Err(FragmentIndexError::UnsortedFragments { .. })
        ));
    }

    #[rstest]
    fn test_from_intervals_rejects_split_chromosome_and_duplicate_ids() {
        let rows = vec![
            ("chr1".to_string(), 0, 10, 0),
            ("chr2".to_string(), 0, 10, 1),
            ("chr1".to_string(), 10, 20, 2),
        ];
        assert!(matches!(
            FragmentIndex::from_intervals(rows),
            Err(FragmentIndexError::DuplicateChromosome(_))
        ));

        let rows = vec![
            ("chr1".to_string(), 0, 10, 0),
            ("chr2".to_string(), 0, 10, 0),
        ];
        assert!(matches!(
            FragmentIndex::from_intervals(rows),
            Err(FragmentIndexError::DuplicateFragmentId(0))
        ));
    }
}
