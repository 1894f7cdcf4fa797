//! Decomposition of multi-way walks into lower-order contacts.
//!
//! A walk of `n` monomers holds `C(n, k)` size-`k` contacts when every combination is
//! taken (co-inclusion), or `n - k + 1` when only monomers next to each other along
//! the read are combined (direct). Both are produced lazily.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use porec_core::models::{ContactWalk, Monomer};

use crate::errors::{Result, WalkError};

/// Which combinations of monomers form a contact.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlattenMode {
    /// Every combination of monomers.
    #[default]
    CoInclusion,
    /// Only runs of consecutive monomers.
    Direct,
}

/// Whether the monomers of a contact were adjacent along the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Direct,
    CoInclusion,
}

impl ContactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Direct => "direct",
            ContactKind::CoInclusion => "co_inclusion",
        }
    }
}

impl Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contact between `size` monomers of one walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeNContact<'a> {
    pub read_id: &'a str,
    pub monomers: Vec<&'a Monomer>,
    pub kind: ContactKind,
}

impl SizeNContact<'_> {
    pub fn size(&self) -> usize {
        self.monomers.len()
    }
}

impl Display for SizeNContact<'_> {
    ///
    /// `read_id\tkind\tmonomer_1\t...\tmonomer_n`
    ///
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.read_id, self.kind)?;
        for monomer in &self.monomers {
            write!(f, "\t{}", monomer)?;
        }
        Ok(())
    }
}

///
/// Flattening settings. Validated once, then applied to any number of walks.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFlattener {
    size: usize,
    mode: FlattenMode,
    sort_by_fragment: bool,
}

impl ContactFlattener {
    ///
    /// # Arguments
    /// - size: monomers per contact, at least 2
    /// - mode: which combinations to emit
    /// - sort_by_fragment: order each contact's monomers by fragment id instead of
    ///   walk order; unassigned monomers go last
    ///
    pub fn new(size: usize, mode: FlattenMode, sort_by_fragment: bool) -> Result<ContactFlattener> {
        if size < 2 {
            return Err(WalkError::Config(format!(
                "contact size must be at least 2, got {size}"
            )));
        }
        Ok(ContactFlattener {
            size,
            mode,
            sort_by_fragment,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Lazily iterate over the contacts of a walk. Calling this again restarts.
    pub fn flatten<'a>(&self, walk: &'a ContactWalk) -> FlattenIter<'a> {
        let n = walk.len();
        let first = if self.size <= n {
            Some((0..self.size).collect())
        } else {
            None
        };

        FlattenIter {
            walk,
            mode: self.mode,
            sort_by_fragment: self.sort_by_fragment,
            next: first,
        }
    }

    /// Number of contacts [`flatten`](Self::flatten) yields for a walk of `n` monomers,
    /// saturating at `u64::MAX`.
    pub fn expected_count(&self, n: usize) -> u64 {
        match self.mode {
            FlattenMode::Direct => (n + 1).saturating_sub(self.size) as u64,
            FlattenMode::CoInclusion => n_choose_k(n as u64, self.size as u64),
        }
    }
}

fn n_choose_k(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    // acc is C(n, i) and grows with i, so it can only pass u64::MAX on the way to a
    // result that does too; the product below fits in u128 while acc fits in u64
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * u128::from(n - i) / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Iterator over the contacts of one walk, created by [`ContactFlattener::flatten`].
#[derive(Debug, Clone)]
pub struct FlattenIter<'a> {
    walk: &'a ContactWalk,
    mode: FlattenMode,
    sort_by_fragment: bool,
    /// Walk indices of the next contact, ascending.
    next: Option<Vec<usize>>,
}

impl FlattenIter<'_> {
    fn advance(&self, indices: &[usize]) -> Option<Vec<usize>> {
        let n = self.walk.len();
        let k = indices.len();
        let mut successor = indices.to_vec();

        match self.mode {
            FlattenMode::Direct => {
                if indices[k - 1] + 1 < n {
                    successor.iter_mut().for_each(|i| *i += 1);
                    Some(successor)
                } else {
                    None
                }
            }
            FlattenMode::CoInclusion => {
                // rightmost position that can still move
                let pos = (0..k).rev().find(|&pos| successor[pos] < n - k + pos)?;
                successor[pos] += 1;
                for later in (pos + 1)..k {
                    successor[later] = successor[later - 1] + 1;
                }
                Some(successor)
            }
        }
    }
}

impl<'a> Iterator for FlattenIter<'a> {
    type Item = SizeNContact<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.next.take()?;
        self.next = self.advance(&indices);

        let kind = if indices.windows(2).all(|w| w[1] == w[0] + 1) {
            ContactKind::Direct
        } else {
            ContactKind::CoInclusion
        };

        let walk: &'a ContactWalk = self.walk;
        let mut monomers: Vec<&'a Monomer> = indices.iter().map(|&i| &walk.monomers[i]).collect();
        if self.sort_by_fragment {
            monomers.sort_by_key(|m| (m.frag_id().is_none(), m.frag_id()));
        }

        Some(SizeNContact {
            read_id: &walk.read_id,
            monomers,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use porec_core::models::{AlignedSegment, FragmentAssignment, MappingType};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::collections::HashSet;

    fn walk(frag_ids: &[Option<u32>]) -> ContactWalk {
        let mut walk = ContactWalk::new("read1");
        for (i, frag_id) in frag_ids.iter().enumerate() {
            let query_start = i as u32 * 100;
            walk.push(Monomer {
                segment: AlignedSegment {
                    chrom: "chr1".to_string(),
                    start: 1000 * i as u64,
                    end: 1000 * i as u64 + 100,
                    is_reverse: false,
                    read_id: "read1".to_string(),
                    query_start,
                    query_end: query_start + 100,
                    mapping_quality: 60,
                },
                assignment: FragmentAssignment {
                    frag_id: *frag_id,
                    mapping_type: if frag_id.is_some() {
                        MappingType::Simple
                    } else {
                        MappingType::None
                    },
                },
                contained_fragments: 0,
            });
        }
        walk
    }

    fn query_starts(contact: &SizeNContact) -> Vec<u32> {
        contact.monomers.iter().map(|m| m.segment.query_start / 100).collect()
    }

    #[rstest]
    fn test_size_must_be_at_least_two() {
        assert!(ContactFlattener::new(1, FlattenMode::CoInclusion, false).is_err());
        assert!(ContactFlattener::new(2, FlattenMode::Direct, false).is_ok());
    }

    #[rstest]
    fn test_count_laws(
        #[values(0, 1, 2, 3, 5, 7)] n: usize,
        #[values(2, 3, 4)] size: usize,
        #[values(FlattenMode::CoInclusion, FlattenMode::Direct)] mode: FlattenMode,
    ) {
        let frags: Vec<Option<u32>> = (0..n as u32).map(Some).collect();
        let walk = walk(&frags);
        let flattener = ContactFlattener::new(size, mode, false).unwrap();

        let contacts: Vec<SizeNContact> = flattener.flatten(&walk).collect();
        assert_eq!(contacts.len() as u64, flattener.expected_count(n));

        let expected = match mode {
            FlattenMode::CoInclusion => n_choose_k(n as u64, size as u64),
            FlattenMode::Direct => n.saturating_sub(size - 1) as u64,
        };
        assert_eq!(contacts.len() as u64, expected);

        let mut seen = HashSet::new();
        for contact in &contacts {
            let starts = query_starts(contact);
            assert_eq!(starts.len(), size);
            // no monomer twice, no combination twice
            assert!(starts.windows(2).all(|w| w[0] < w[1]));
            assert!(seen.insert(starts));
        }
    }

    #[rstest]
    #[case(64, 32, 1_832_624_140_942_590_534)]
    #[case(67, 33, 14_226_520_737_620_288_370)]
    #[case(68, 34, u64::MAX)]
    #[case(1000, 500, u64::MAX)]
    #[case(1000, 2, 499_500)]
    fn test_expected_count_of_long_walks(#[case] n: usize, #[case] size: usize, #[case] expected: u64) {
        let flattener = ContactFlattener::new(size, FlattenMode::CoInclusion, false).unwrap();
        assert_eq!(flattener.expected_count(n), expected);
    }

    #[rstest]
    fn test_co_inclusion_order_and_kinds() {
        let walk = walk(&[Some(7), Some(3), Some(5)]);
        let flattener = ContactFlattener::new(2, FlattenMode::CoInclusion, false).unwrap();

        let contacts: Vec<(Vec<u32>, ContactKind)> = flattener
            .flatten(&walk)
            .map(|c| (query_starts(&c), c.kind))
            .collect();
        assert_eq!(
            contacts,
            vec![
                (vec![0, 1], ContactKind::Direct),
                (vec![0, 2], ContactKind::CoInclusion),
                (vec![1, 2], ContactKind::Direct),
            ]
        );
    }

    #[rstest]
    fn test_direct_windows() {
        let walk = walk(&[Some(1), Some(2), Some(3), Some(4)]);
        let flattener = ContactFlattener::new(3, FlattenMode::Direct, false).unwrap();
        let windows: Vec<Vec<u32>> = flattener.flatten(&walk).map(|c| query_starts(&c)).collect();
        assert_eq!(windows, vec![vec![0, 1, 2], vec![1, 2, 3]]);
        assert!(flattener.flatten(&walk).all(|c| c.kind == ContactKind::Direct));
    }

    #[rstest]
    fn test_sort_by_fragment() {
        let walk = walk(&[Some(7), None, Some(3)]);
        let flattener = ContactFlattener::new(3, FlattenMode::CoInclusion, true).unwrap();
        let contact = flattener.flatten(&walk).next().unwrap();
        let frags: Vec<Option<u32>> = contact.monomers.iter().map(|m| m.frag_id()).collect();
        assert_eq!(frags, vec![Some(3), Some(7), None]);
        // kind comes from walk positions, not the sorted order
        assert_eq!(contact.kind, ContactKind::Direct);
    }

    #[rstest]
    fn test_flatten_is_restartable() {
        let walk = walk(&[Some(1), Some(2), Some(3), Some(4)]);
        let flattener = ContactFlattener::new(2, FlattenMode::CoInclusion, false).unwrap();

        let mut iter = flattener.flatten(&walk);
        let first = iter.next().unwrap();
        let snapshot = iter.clone();
        assert_eq!(iter.count(), 5);
        assert_eq!(snapshot.count(), 5);
        assert_eq!(flattener.flatten(&walk).next().unwrap(), first);
    }

    #[rstest]
    fn test_contact_text() {
        let walk = walk(&[Some(1), Some(2)]);
        let flattener = ContactFlattener::new(2, FlattenMode::Direct, false).unwrap();
        let line = flattener.flatten(&walk).next().unwrap().to_string();
        assert_eq!(
            line,
            "read1\tdirect\tchr1,0,100,+,0,100,1,simple,60,0\tchr1,1000,1100,+,100,200,2,simple,60,0"
        );
    }
}
