use std::fmt::{self, Display};
use std::str::FromStr;

use porec_core::models::{Monomer, Strand};
use porec_overlaprs::FragmentIndex;

use crate::errors::{Result, WalkError};
use crate::flatten::SizeNContact;

/// One side of a pairwise contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEnd {
    pub strand: Strand,
    pub chrom: String,
    pub position: u64,
    pub frag_id: u32,
    pub mapping_quality: u8,
}

impl ContactEnd {
    fn from_monomer(read_id: &str, monomer: &Monomer) -> Result<ContactEnd> {
        let frag_id = monomer
            .frag_id()
            .ok_or_else(|| WalkError::UnassignedMonomer(read_id.to_string()))?;
        Ok(ContactEnd {
            strand: monomer.strand(),
            chrom: monomer.segment.chrom.clone(),
            position: monomer.position(),
            frag_id,
            mapping_quality: monomer.segment.mapping_quality,
        })
    }

    ///
    /// Bed line centred on the fragment: `chrom\tmid\tmid+1\tread_id`
    ///
    fn midpoint_bed(&self, read_id: &str, index: &FragmentIndex) -> Result<String> {
        let (chrom, fragment) = index
            .fragment(self.frag_id)
            .ok_or(WalkError::UnknownFragment(self.frag_id))?;
        if chrom != self.chrom {
            return Err(WalkError::FragmentChromMismatch {
                frag_id: self.frag_id,
                expected: chrom.to_string(),
                found: self.chrom.clone(),
            });
        }
        let mid = fragment.mid_point();
        Ok(format!("{}\t{}\t{}\t{}", chrom, mid, mid + 1, read_id))
    }
}

///
/// A pairwise contact in the whitespace-delimited hic text layout:
///
/// `read_id strand1 chr1 pos1 frag1 strand2 chr2 pos2 frag2 mapq1 mapq2`
///
/// Strands are written as SAM flags, `0` forward and `16` reverse.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HicContact {
    pub read_id: String,
    pub first: ContactEnd,
    pub second: ContactEnd,
}

impl HicContact {
    /// Bed lines for the midpoints of both fragments of the contact.
    pub fn to_midpoint_bed_pair(&self, index: &FragmentIndex) -> Result<(String, String)> {
        Ok((
            self.first.midpoint_bed(&self.read_id, index)?,
            self.second.midpoint_bed(&self.read_id, index)?,
        ))
    }
}

impl TryFrom<&SizeNContact<'_>> for HicContact {
    type Error = WalkError;

    fn try_from(contact: &SizeNContact<'_>) -> Result<Self> {
        if contact.size() != 2 {
            return Err(WalkError::NotAPair {
                read_id: contact.read_id.to_string(),
                size: contact.size(),
            });
        }
        Ok(HicContact {
            read_id: contact.read_id.to_string(),
            first: ContactEnd::from_monomer(contact.read_id, contact.monomers[0])?,
            second: ContactEnd::from_monomer(contact.read_id, contact.monomers[1])?,
        })
    }
}

impl Display for HicContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {} {} {}",
            self.read_id,
            self.first.strand.as_flag(),
            self.first.chrom,
            self.first.position,
            self.first.frag_id,
            self.second.strand.as_flag(),
            self.second.chrom,
            self.second.position,
            self.second.frag_id,
            self.first.mapping_quality,
            self.second.mapping_quality
        )
    }
}

impl FromStr for HicContact {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let malformed = |reason: String| WalkError::Parse {
            what: "hic contact",
            line: 0,
            reason,
        };
        if fields.len() != 11 {
            return Err(malformed(format!("expected 11 fields, found {}", fields.len())));
        }

        let number = |field: &str| -> Result<u64> {
            field
                .parse::<u64>()
                .map_err(|_| malformed(format!("invalid number '{field}'")))
        };
        let frag = |field: &str| -> Result<u32> {
            field
                .parse::<u32>()
                .map_err(|_| malformed(format!("invalid fragment id '{field}'")))
        };
        let mapq = |field: &str| -> Result<u8> {
            field
                .parse::<u8>()
                .map_err(|_| malformed(format!("invalid mapping quality '{field}'")))
        };

        Ok(HicContact {
            read_id: fields[0].to_string(),
            first: ContactEnd {
                strand: Strand::from_flag(fields[1])?,
                chrom: fields[2].to_string(),
                position: number(fields[3])?,
                frag_id: frag(fields[4])?,
                mapping_quality: mapq(fields[9])?,
            },
            second: ContactEnd {
                strand: Strand::from_flag(fields[5])?,
                chrom: fields[6].to_string(),
                position: number(fields[7])?,
                frag_id: frag(fields[8])?,
                mapping_quality: mapq(fields[10])?,
            },
        })
    }
}
