use std::io::{BufRead, Write};

use fxhash::FxHashMap;
use log::debug;

use crate::errors::{FragmentIndexError, Result};
use crate::fragment_index::FragmentIndex;

impl FragmentIndex {
    ///
    /// Tile every chromosome with fixed-width bins `[0, w), [w, 2w), ...`; the last bin
    /// of a chromosome is cut short at its length.
    ///
    /// # Arguments
    /// - chrom_sizes: `(chrom, length)` pairs, in the order ids should be handed out
    /// - width: bin width in bases
    ///
    pub fn from_bins(chrom_sizes: &[(String, u64)], width: u64) -> Result<FragmentIndex> {
        if width == 0 {
            return Err(FragmentIndexError::InvalidCutSpec(
                "bin width must be positive".to_string(),
            ));
        }

        let endpoints = chrom_sizes.iter().map(|(chrom, length)| {
            let mut positions: Vec<u64> = (1u64..)
                .map(|i| i * width)
                .take_while(|p| p < length)
                .collect();
            positions.push(*length);
            (chrom.clone(), positions)
        });

        FragmentIndex::from_endpoints(endpoints)
    }
}

///
/// Assignment of each fragment to the bin containing its midpoint.
///
/// Every fragment of the fragment index appears exactly once. Fragments on a
/// chromosome missing from the bins, or whose midpoint falls past the last bin,
/// are reported as errors rather than dropped.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentToBinMap {
    pairs: Vec<(u32, u32)>,
    lookup: FxHashMap<u32, u32>,
}

impl FragmentToBinMap {
    pub fn new(fragments: &FragmentIndex, bins: &FragmentIndex) -> Result<FragmentToBinMap> {
        let mut pairs = Vec::with_capacity(fragments.len());

        for chrom in fragments.chroms() {
            let bin_chrom = bins.chrom(&chrom.chrom).ok_or_else(|| {
                FragmentIndexError::MalformedEndpoints {
                    chrom: chrom.chrom.clone(),
                    reason: "chromosome has no bins".to_string(),
                }
            })?;

            let mut cursor = 0;
            for fragment in chrom.fragments() {
                let mid = fragment.mid_point();
                let bin = bin_chrom.seek(mid, mid + 1, &mut cursor).next().ok_or_else(|| {
                    FragmentIndexError::MalformedEndpoints {
                        chrom: chrom.chrom.clone(),
                        reason: format!("fragment {} midpoint {mid} lies outside every bin", fragment.val),
                    }
                })?;
                pairs.push((fragment.val, bin.frag_id()));
            }
        }

        debug!("Mapped {} fragments onto {} bins", pairs.len(), bins.len());
        Ok(FragmentToBinMap::from_pairs(pairs))
    }

    fn from_pairs(pairs: Vec<(u32, u32)>) -> FragmentToBinMap {
        let lookup = pairs.iter().copied().collect();
        FragmentToBinMap { pairs, lookup }
    }

    pub fn bin_of(&self, frag_id: u32) -> Option<u32> {
        self.lookup.get(&frag_id).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, u32)> {
        self.pairs.iter()
    }

    /// Write one `frag_id\tbin_id` line per fragment.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        for (frag_id, bin_id) in &self.pairs {
            writeln!(writer, "{}\t{}", frag_id, bin_id)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read<R: BufRead>(reader: R) -> Result<FragmentToBinMap> {
        let mut pairs = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let parsed = match (fields.next(), fields.next()) {
                (Some(frag), Some(bin)) => frag.parse::<u32>().ok().zip(bin.parse::<u32>().ok()),
                _ => None,
            };
            let pair = parsed.ok_or_else(|| FragmentIndexError::Parse {
                line: index + 1,
                reason: format!("expected 'frag_id bin_id', found '{line}'"),
            })?;
            pairs.push(pair);
        }
        Ok(FragmentToBinMap::from_pairs(pairs))
    }
}
