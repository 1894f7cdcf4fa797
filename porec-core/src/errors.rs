use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error("Invalid mapping type: {0}")]
    InvalidMappingType(String),

    #[error("Malformed segment for read {read_id}: {reason}")]
    MalformedSegment { read_id: String, reason: String },

    #[error("Malformed monomer record: {0}")]
    MalformedMonomer(String),

    #[error("Malformed walk record: {0}")]
    MalformedWalk(String),
}
