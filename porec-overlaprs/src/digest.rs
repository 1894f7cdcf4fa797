//! Virtual digestion of a reference sequence.
//!
//! A genome is cut either at every match of a recognition pattern (and its reverse
//! complement) or at fixed intervals. The cut positions of each sequence become the
//! breakpoints of a [`FragmentIndex`].
//!
//! ```
//! use porec_overlaprs::digest::{create_regex, find_site_positions};
//!
//! let regex = create_regex("AAGCTT").unwrap();
//! assert_eq!(find_site_positions(&regex, b"nnAAGCTTnn"), vec![2]);
//! ```

use std::io::Read;
use std::str::FromStr;

use log::{debug, warn};
use regex::bytes::Regex;
use seq_io::fasta::{Reader, Record};

use crate::errors::{FragmentIndexError, Result};
use crate::fragment_index::FragmentIndex;

fn complement(base: char) -> Option<char> {
    let c = match base {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        'R' => 'Y',
        'Y' => 'R',
        'K' => 'M',
        'M' => 'K',
        'B' => 'V',
        'V' => 'B',
        'D' => 'H',
        'H' => 'D',
        'S' | 'W' | 'N' | '-' | '|' => base,
        '(' => ')',
        ')' => '(',
        _ => return None,
    };
    Some(c)
}

fn expand_iupac(base: char) -> Option<&'static str> {
    let class = match base {
        'A' => "A",
        'C' => "C",
        'G' => "G",
        'T' => "T",
        'R' => "[AG]",
        'Y' => "[CT]",
        'S' => "[CG]",
        'W' => "[AT]",
        'K' => "[GT]",
        'M' => "[AC]",
        'B' => "[CGT]",
        'D' => "[AGT]",
        'H' => "[ACT]",
        'V' => "[ACG]",
        'N' => "[ACGT]",
        _ => return None,
    };
    Some(class)
}

///
/// Reverse complement of a recognition pattern.
///
/// Ambiguity codes are complemented, parentheses swap so groups stay balanced
/// and cut markers (`-`) are kept in place relative to the bases.
///
pub fn revcomp(pattern: &str) -> Result<String> {
    pattern
        .to_ascii_uppercase()
        .chars()
        .rev()
        .map(|c| complement(c).ok_or_else(|| FragmentIndexError::InvalidPattern(pattern.to_string())))
        .collect()
}

///
/// Compile a recognition pattern into a regex matching either strand.
///
/// The pattern may hold several alternatives (`GAATTC|GCGGCCGC`, optionally in
/// parentheses). Each alternative is followed by its reverse complement unless the
/// two are equal, ambiguity codes become character classes and the whole
/// alternation is wrapped in one group.
///
pub fn create_regex(pattern: &str) -> Result<Regex> {
    let trimmed = pattern
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .to_ascii_uppercase();
    if trimmed.is_empty() {
        return Err(FragmentIndexError::InvalidPattern(pattern.to_string()));
    }

    let mut alternatives: Vec<String> = Vec::new();
    for alternative in trimmed.split('|') {
        let forward = alternative.replace('-', "");
        let reverse = revcomp(alternative)?.replace('-', "");
        for site in [forward, reverse] {
            if site.is_empty() {
                return Err(FragmentIndexError::InvalidPattern(pattern.to_string()));
            }
            if !alternatives.contains(&site) {
                alternatives.push(site);
            }
        }
    }

    let expanded = alternatives
        .iter()
        .map(|site| {
            site.chars()
                .map(|c| expand_iupac(c).ok_or_else(|| FragmentIndexError::InvalidPattern(pattern.to_string())))
                .collect::<Result<String>>()
        })
        .collect::<Result<Vec<String>>>()?;

    let regex = format!("({})", expanded.join("|"));
    Regex::new(&regex).map_err(|e| FragmentIndexError::InvalidPattern(e.to_string()))
}

/// Start positions (0-based) of the non-overlapping matches of `regex` in `seq`,
/// case-insensitively.
pub fn find_site_positions(regex: &Regex, seq: &[u8]) -> Vec<u64> {
    let seq = seq.to_ascii_uppercase();
    regex.find_iter(&seq).map(|m| m.start() as u64).collect()
}

/// How to cut a sequence: `regex:<pattern>` or `bin:<width>` (`k`/`M` suffixes allowed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutSpec {
    Pattern(String),
    Bin(u64),
}

fn parse_width(width: &str) -> Option<u64> {
    let (digits, multiplier) = match width.chars().last()? {
        'k' | 'K' => (&width[..width.len() - 1], 1_000),
        'm' | 'M' => (&width[..width.len() - 1], 1_000_000),
        _ => (width, 1),
    };
    digits
        .parse::<u64>()
        .ok()
        .and_then(|w| w.checked_mul(multiplier))
        .filter(|w| *w > 0)
}

impl FromStr for CutSpec {
    type Err = FragmentIndexError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FragmentIndexError::InvalidCutSpec(s.to_string());
        let (kind, value) = s.split_once(':').ok_or_else(invalid)?;
        match kind {
            "regex" => {
                create_regex(value)?;
                Ok(CutSpec::Pattern(value.to_string()))
            }
            "bin" => parse_width(value).map(CutSpec::Bin).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

/// Cut positions of one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqDigest {
    pub seq_name: String,
    /// Cut positions, ascending, all below `seq_length`.
    pub positions: Vec<u64>,
    pub seq_length: u64,
}

impl SeqDigest {
    /// Fragment breakpoints: the cut positions followed by the sequence length.
    pub fn endpoints(&self) -> Vec<u64> {
        let mut endpoints = self.positions.clone();
        endpoints.push(self.seq_length);
        endpoints
    }
}

enum Cutter {
    Sites(Regex),
    Bins(u64),
}

impl Cutter {
    fn cut(&self, seq: &[u8]) -> Vec<u64> {
        match self {
            Cutter::Sites(regex) => find_site_positions(regex, seq)
                .into_iter()
                .filter(|p| *p > 0)
                .collect(),
            Cutter::Bins(width) => {
                let (width, length) = (*width, seq.len() as u64);
                (1u64..).map(|i| i * width).take_while(|p| *p < length).collect()
            }
        }
    }
}

///
/// Digest every sequence of a FASTA stream.
///
/// A site at position 0 produces no cut, since fragments always start at 0.
/// Empty sequences are skipped with a warning.
///
/// # Arguments
/// - reader: FASTA text (wrap with `get_dynamic_reader` for gzip support)
/// - cut: where to cut
///
pub fn digest_fasta<R: Read>(reader: R, cut: &CutSpec) -> Result<Vec<SeqDigest>> {
    let cutter = match cut {
        CutSpec::Pattern(pattern) => Cutter::Sites(create_regex(pattern)?),
        CutSpec::Bin(width) => Cutter::Bins(*width),
    };

    let mut fasta_reader = Reader::new(reader);
    let mut digests = Vec::new();

    while let Some(record) = fasta_reader.next() {
        let record = record.map_err(|e| FragmentIndexError::Parse {
            line: 0,
            reason: e.to_string(),
        })?;
        let seq_name = record
            .id()
            .map_err(|e| FragmentIndexError::Parse {
                line: 0,
                reason: e.to_string(),
            })?
            .to_string();

        let seq = record.full_seq();
        if seq.is_empty() {
            warn!("Skipping empty sequence {}", seq_name);
            continue;
        }

        let positions = cutter.cut(&seq);
        debug!("{}: {} cut sites", seq_name, positions.len());

        digests.push(SeqDigest {
            seq_name,
            positions,
            seq_length: seq.len() as u64,
        });
    }

    Ok(digests)
}

impl FragmentIndex {
    /// Build an index from digests, in stream order.
    pub fn from_digests<I>(digests: I) -> Result<FragmentIndex>
    where
        I: IntoIterator<Item = SeqDigest>,
    {
        FragmentIndex::from_endpoints(digests.into_iter().map(|d| {
            let endpoints = d.endpoints();
            (d.seq_name, endpoints)
        }))
    }
}
