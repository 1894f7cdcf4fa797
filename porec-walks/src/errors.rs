use thiserror::Error;

use porec_core::ModelError;
use porec_overlaprs::FragmentIndexError;

#[derive(Error, Debug)]
pub enum WalkError {
    /// The segment lies on a chromosome the fragment index does not know.
    #[error("Read {read_id} aligns to {chrom}, which has no fragments")]
    UnknownFragmentReference { read_id: String, chrom: String },

    /// A contact refers to a fragment id missing from the index or bin map.
    #[error("Unknown fragment id: {0}")]
    UnknownFragment(u32),

    /// A contact end names a chromosome other than the one its fragment lies on.
    #[error("Fragment {frag_id} lies on {expected}, but the contact places it on {found}")]
    FragmentChromMismatch {
        frag_id: u32,
        expected: String,
        found: String,
    },

    /// A pairwise record was requested for a contact with an unassigned monomer.
    #[error("Contact from read {0} has a monomer without a fragment")]
    UnassignedMonomer(String),

    /// A pairwise record was requested for a contact that is not a pair.
    #[error("Contact from read {read_id} has {size} monomers, expected 2")]
    NotAPair { read_id: String, size: usize },

    #[error("Error parsing {what} at line {line}: {reason}")]
    Parse {
        what: &'static str,
        line: usize,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    FragmentIndex(#[from] FragmentIndexError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WalkError>;
