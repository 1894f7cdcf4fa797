use std::io::{BufRead, Write};

use fxhash::FxHashMap;

use porec_overlaprs::FragmentToBinMap;

use crate::errors::{Result, WalkError};
use crate::formats::HicContact;

///
/// Sparse counts of pairwise contacts between bins.
///
/// Each contact is counted once under the unordered bin pair `(min, max)`.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinContactMatrix {
    counts: FxHashMap<(u32, u32), u64>,
}

impl BinContactMatrix {
    pub fn new() -> BinContactMatrix {
        BinContactMatrix::default()
    }

    pub fn add(&mut self, contact: &HicContact, bins: &FragmentToBinMap) -> Result<()> {
        let first = bins
            .bin_of(contact.first.frag_id)
            .ok_or(WalkError::UnknownFragment(contact.first.frag_id))?;
        let second = bins
            .bin_of(contact.second.frag_id)
            .ok_or(WalkError::UnknownFragment(contact.second.frag_id))?;

        *self
            .counts
            .entry((first.min(second), first.max(second)))
            .or_insert(0) += 1;
        Ok(())
    }

    ///
    /// Count every contact of a hic text stream.
    ///
    /// # Arguments
    /// - reader: hic text, one contact per line
    /// - bins: fragment to bin assignment
    ///
    pub fn from_hic_text<R: BufRead>(reader: R, bins: &FragmentToBinMap) -> Result<BinContactMatrix> {
        let mut matrix = BinContactMatrix::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let contact: HicContact = line.parse().map_err(|e| match e {
                WalkError::Parse { what, reason, .. } => WalkError::Parse {
                    what,
                    line: index + 1,
                    reason,
                },
                other => other,
            })?;
            matrix.add(&contact, bins)?;
        }
        Ok(matrix)
    }

    pub fn get(&self, bin1: u32, bin2: u32) -> u64 {
        self.counts
            .get(&(bin1.min(bin2), bin1.max(bin2)))
            .copied()
            .unwrap_or(0)
    }

    /// Number of non-zero bin pairs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Write `bin1 bin2 count` lines sorted by `(bin1, bin2)`.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut entries: Vec<(&(u32, u32), &u64)> = self.counts.iter().collect();
        entries.sort_unstable_by_key(|(pair, _)| **pair);
        for ((bin1, bin2), count) in entries {
            writeln!(writer, "{} {} {}", bin1, bin2, count)?;
        }
        writer.flush()?;
        Ok(())
    }
}
