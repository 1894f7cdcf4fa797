use thiserror::Error;

/// Errors raised while building, reading or writing a [`FragmentIndex`](crate::FragmentIndex).
#[derive(Error, Debug)]
pub enum FragmentIndexError {
    /// Breakpoints of a chromosome are empty or not strictly increasing.
    #[error("Malformed endpoints for {chrom}: {reason}")]
    MalformedEndpoints { chrom: String, reason: String },

    /// The same chromosome was supplied twice.
    #[error("Chromosome supplied more than once: {0}")]
    DuplicateChromosome(String),

    /// Interval table rows are out of order or overlap.
    #[error("Fragments on {chrom} are unsorted or overlapping at position {start}")]
    UnsortedFragments { chrom: String, start: u64 },

    /// Two fragments share an id.
    #[error("Fragment id {0} is used more than once")]
    DuplicateFragmentId(u32),

    /// The fragments of a chromosome cannot be expressed as HiCRef breakpoints.
    #[error("Fragments on {0} do not tile the chromosome with sequential ids")]
    NotHicRefCompatible(String),

    /// A line of a fragment definition could not be parsed.
    #[error("Error parsing fragment definition at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A digest specification such as `regex:AAGCTT` or `bin:50k` is invalid.
    #[error("Invalid cut specification: {0}")]
    InvalidCutSpec(String),

    /// A recognition pattern did not compile.
    #[error("Invalid recognition pattern: {0}")]
    InvalidPattern(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FragmentIndexError>;
