use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::ModelError;

/// Orientation of an alignment on the reference.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn from_is_reverse(is_reverse: bool) -> Strand {
        if is_reverse {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }

    /// SAM flag encoding used by the hic text format: `0` forward, `16` reverse.
    pub fn as_flag(&self) -> u16 {
        match self {
            Strand::Forward => 0,
            Strand::Reverse => 16,
        }
    }

    pub fn from_flag(flag: &str) -> Result<Strand, ModelError> {
        match flag {
            "0" => Ok(Strand::Forward),
            "16" => Ok(Strand::Reverse),
            other => Err(ModelError::InvalidStrand(other.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

impl FromStr for Strand {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(ModelError::InvalidStrand(other.to_string())),
        }
    }
}

///
/// One alignment of part of a long read against the reference.
///
/// `start`/`end` are reference coordinates, `query_start`/`query_end` are
/// coordinates along the read. Both pairs are half-open.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignedSegment {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub is_reverse: bool,
    pub read_id: String,
    pub query_start: u32,
    pub query_end: u32,
    pub mapping_quality: u8,
}

impl AlignedSegment {
    pub fn strand(&self) -> Strand {
        Strand::from_is_reverse(self.is_reverse)
    }

    /// Length of the aligned portion of the read.
    pub fn query_len(&self) -> u32 {
        self.query_end.saturating_sub(self.query_start)
    }

    /// Length of the aligned portion of the reference.
    pub fn reference_len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// The 5' end of the alignment on the reference (0-based).
    pub fn five_prime_position(&self) -> u64 {
        if self.is_reverse {
            self.end.saturating_sub(1)
        } else {
            self.start
        }
    }

    /// Overlap of the two query spans, zero when they do not touch.
    pub fn query_overlap(&self, other: &AlignedSegment) -> u32 {
        std::cmp::min(self.query_end, other.query_end)
            .saturating_sub(std::cmp::max(self.query_start, other.query_start))
    }

    ///
    /// Check the coordinate invariants of the segment.
    ///
    /// Both the reference and the query span must be non-empty and the
    /// chromosome must be named.
    ///
    pub fn validate(&self) -> Result<(), ModelError> {
        let reason = if self.chrom.is_empty() {
            Some("empty chromosome name".to_string())
        } else if self.start >= self.end {
            Some(format!(
                "reference span {}-{} is empty",
                self.start, self.end
            ))
        } else if self.query_start >= self.query_end {
            Some(format!(
                "query span {}-{} is empty",
                self.query_start, self.query_end
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ModelError::MalformedSegment {
                read_id: self.read_id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn segment() -> AlignedSegment {
        AlignedSegment {
            chrom: "chr1".to_string(),
            start: 100,
            end: 200,
            is_reverse: false,
            read_id: "read1".to_string(),
            query_start: 10,
            query_end: 110,
            mapping_quality: 60,
        }
    }

    #[rstest]
    fn test_five_prime_position(segment: AlignedSegment) {
        assert_eq!(segment.five_prime_position(), 100);
        let rev = AlignedSegment {
            is_reverse: true,
            ..segment
        };
        assert_eq!(rev.five_prime_position(), 199);
        assert_eq!(rev.strand(), Strand::Reverse);
    }

    #[rstest]
    fn test_query_overlap(segment: AlignedSegment) {
        let other = AlignedSegment {
            query_start: 100,
            query_end: 300,
            ..segment.clone()
        };
        assert_eq!(segment.query_overlap(&other), 10);
        assert_eq!(other.query_overlap(&segment), 10);

        let apart = AlignedSegment {
            query_start: 500,
            query_end: 600,
            ..segment.clone()
        };
        assert_eq!(segment.query_overlap(&apart), 0);
    }

    #[rstest]
    fn test_validate(segment: AlignedSegment) {
        assert!(segment.validate().is_ok());

        let bad = AlignedSegment {
            query_end: 10,
            ..segment.clone()
        };
        assert!(matches!(
            bad.validate(),
            Err(ModelError::MalformedSegment { .. })
        ));

        let bad = AlignedSegment {
            end: 50,
            ..segment
        };
        assert!(bad.validate().is_err());
    }

    #[rstest]
    #[case("+", Strand::Forward)]
    #[case("-", Strand::Reverse)]
    fn test_strand_parse(#[case] s: &str, #[case] expected: Strand) {
        let strand: Strand = s.parse().unwrap();
        assert_eq!(strand, expected);
        assert_eq!(strand.to_string(), s);
        assert_eq!(Strand::from_flag(&strand.as_flag().to_string()).unwrap(), strand);
    }

    #[rstest]
    fn test_strand_parse_error() {
        assert_eq!(
            "x".parse::<Strand>(),
            Err(ModelError::InvalidStrand("x".to_string()))
        );
    }
}
