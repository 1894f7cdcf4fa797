//! Core models shared by the porec crates.
//!
//! A pore-C read carries several partial alignments against the reference, one per ligated
//! chromatin fragment. This crate holds the flat value types those alignments travel through:
//!
//! - [`models::AlignedSegment`]: one alignment of part of a read
//! - [`models::FragmentAssignment`]: the restriction fragment an alignment was assigned to
//! - [`models::ReadAlignmentGroup`]: every alignment of one read, in query order
//! - [`models::Monomer`] and [`models::ContactWalk`]: the ordered multi-way contact of one read
//!
//! Interval arithmetic lives on [`models::Interval`], which is half-open `[start, end)`.

pub mod errors;
pub mod models;
pub mod utils;

pub use errors::ModelError;
