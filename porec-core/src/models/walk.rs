use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::ModelError;
use crate::models::{AlignedSegment, FragmentAssignment, MappingType, Strand};

const MONOMER_FIELDS: usize = 10;
const NO_FRAGMENT: &str = ".";

///
/// One alignment of a read after fragment assignment: a participant in a
/// multi-way contact.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Monomer {
    pub segment: AlignedSegment,
    pub assignment: FragmentAssignment,
    /// Number of fragments the alignment covers beyond the containment
    /// cutoff. Informational only, never used to filter.
    pub contained_fragments: u32,
}

impl Monomer {
    pub fn frag_id(&self) -> Option<u32> {
        self.assignment.frag_id
    }

    pub fn strand(&self) -> Strand {
        self.segment.strand()
    }

    /// Reference position reported for the monomer in contact records.
    pub fn position(&self) -> u64 {
        self.segment.five_prime_position()
    }

    ///
    /// Get the bed line of the monomer: `chrom\tstart\tend\tread_id`
    ///
    pub fn as_bed_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.segment.chrom, self.segment.start, self.segment.end, self.segment.read_id
        )
    }

    fn parse(read_id: &str, record: &str) -> Result<Monomer, ModelError> {
        // the chromosome is the only free-text field, so split from the right
        let fields: Vec<&str> = record.rsplitn(MONOMER_FIELDS, ',').collect();
        if fields.len() != MONOMER_FIELDS {
            return Err(ModelError::MalformedMonomer(record.to_string()));
        }
        let bad = |_| ModelError::MalformedMonomer(record.to_string());

        let contained_fragments = fields[0].parse::<u32>().map_err(bad)?;
        let mapping_quality = fields[1].parse::<u8>().map_err(bad)?;
        let mapping_type: MappingType = fields[2].parse()?;
        let frag_id = match fields[3] {
            NO_FRAGMENT => None,
            id => Some(id.parse::<u32>().map_err(bad)?),
        };
        let query_end = fields[4].parse::<u32>().map_err(bad)?;
        let query_start = fields[5].parse::<u32>().map_err(bad)?;
        let strand: Strand = fields[6].parse()?;
        let end = fields[7].parse::<u64>().map_err(bad)?;
        let start = fields[8].parse::<u64>().map_err(bad)?;
        let chrom = fields[9].to_string();

        let segment = AlignedSegment {
            chrom,
            start,
            end,
            is_reverse: strand.is_reverse(),
            read_id: read_id.to_string(),
            query_start,
            query_end,
            mapping_quality,
        };
        segment.validate()?;

        Ok(Monomer {
            segment,
            assignment: FragmentAssignment {
                frag_id,
                mapping_type,
            },
            contained_fragments,
        })
    }
}

impl Display for Monomer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frag = self
            .frag_id()
            .map_or(NO_FRAGMENT.to_string(), |id| id.to_string());
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{}",
            self.segment.chrom,
            self.segment.start,
            self.segment.end,
            self.strand(),
            self.segment.query_start,
            self.segment.query_end,
            frag,
            self.assignment.mapping_type,
            self.segment.mapping_quality,
            self.contained_fragments
        )
    }
}

///
/// The multi-way contact of a single read: its monomers in read order.
///
/// Monomer order is the order of the alignments along the read and stands
/// in for proximity along the ligated molecule, so it is never re-sorted.
///
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ContactWalk {
    pub read_id: String,
    pub monomers: Vec<Monomer>,
}

impl ContactWalk {
    pub fn new(read_id: &str) -> ContactWalk {
        ContactWalk {
            read_id: read_id.to_string(),
            monomers: Vec::new(),
        }
    }

    pub fn push(&mut self, monomer: Monomer) {
        self.monomers.push(monomer);
    }

    pub fn len(&self) -> usize {
        self.monomers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomers.is_empty()
    }

    /// Walks with fewer than two monomers carry no contact.
    pub fn is_contact(&self) -> bool {
        self.monomers.len() >= 2
    }
}

impl Display for ContactWalk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.read_id, self.monomers.len())?;
        for monomer in &self.monomers {
            write!(f, "\t{}", monomer)?;
        }
        Ok(())
    }
}

impl FromStr for ContactWalk {
    type Err = ModelError;

    ///
    /// Parse a walk line: `read_id\tN\tmonomer_1\t...\tmonomer_N`
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.trim_end().split('\t');

        let read_id = fields
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ModelError::MalformedWalk(s.to_string()))?;
        let count = fields
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| ModelError::MalformedWalk(s.to_string()))?;

        let monomers = fields
            .map(|record| Monomer::parse(read_id, record))
            .collect::<Result<Vec<Monomer>, ModelError>>()?;

        if monomers.len() != count {
            return Err(ModelError::MalformedWalk(format!(
                "{read_id}: expected {count} monomers, found {}",
                monomers.len()
            )));
        }

        Ok(ContactWalk {
            read_id: read_id.to_string(),
            monomers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn monomer(chrom: &str, start: u64, frag_id: Option<u32>, is_reverse: bool) -> Monomer {
        Monomer {
            segment: AlignedSegment {
                chrom: chrom.to_string(),
                start,
                end: start + 50,
                is_reverse,
                read_id: "read1".to_string(),
                query_start: start as u32,
                query_end: start as u32 + 50,
                mapping_quality: 30,
            },
            assignment: FragmentAssignment {
                frag_id,
                mapping_type: if frag_id.is_some() {
                    MappingType::Simple
                } else {
                    MappingType::None
                },
            },
            contained_fragments: 0,
        }
    }

    #[fixture]
    fn walk() -> ContactWalk {
        let mut walk = ContactWalk::new("read1");
        walk.push(monomer("chr1", 100, Some(3), false));
        walk.push(monomer("chr2", 400, None, true));
        walk.push(monomer("chr1,alt", 900, Some(12), false));
        walk
    }

    #[rstest]
    fn test_walk_text_round_trip(walk: ContactWalk) {
        let line = walk.to_string();
        assert!(line.starts_with("read1\t3\tchr1,100,150,+,100,150,3,simple,30,0"));
        let parsed: ContactWalk = line.parse().unwrap();
        assert_eq!(parsed, walk);
    }

    #[rstest]
    fn test_walk_count_mismatch(walk: ContactWalk) {
        let line = walk.to_string().replacen("\t3\t", "\t4\t", 1);
        assert!(matches!(
            line.parse::<ContactWalk>(),
            Err(ModelError::MalformedWalk(_))
        ));
    }

    #[rstest]
    #[case("read1\t1\tchr1,1,2,+,0,5,x,simple,30,0")]
    #[case("read1\t1\tchr1,1,2,*,0,5,1,simple,30,0")]
    #[case("read1\t1\tchr1,1,2")]
    #[case("read1")]
    fn test_malformed_walks(#[case] line: &str) {
        assert!(line.parse::<ContactWalk>().is_err());
    }

    #[rstest]
    fn test_bed_and_position(walk: ContactWalk) {
        assert_eq!(walk.monomers[0].as_bed_string(), "chr1\t100\t150\tread1");
        assert_eq!(walk.monomers[1].position(), 449);
        assert!(walk.is_contact());
    }
}
