//! Restriction fragment indexes for pore-C reads.
//!
//! A reference genome is cut into disjoint fragments, either by a restriction enzyme
//! (virtual digestion) or into fixed-width bins. This crate holds those fragments in a
//! [`FragmentIndex`] and answers overlap queries against it, one alignment at a time or
//! in sorted batches.
//!
//! ## Features
//!
//! - **Binary-search overlap queries**: `O(log n + k)` per query, lazily iterated
//! - **Batch joins**: many segments against the index with one cursor per chromosome
//! - **Lossless formats**: HiCRef text and four-column interval tables
//! - **Thread-safe**: the index is immutable, so it can be shared across worker threads
//!
//! ## Quick Start
//!
//! ```rust
//! use porec_overlaprs::FragmentIndex;
//!
//! let index = FragmentIndex::from_endpoints(vec![
//!     ("chr1", vec![10, 20, 30, 100]),
//!     ("chr2", vec![5, 15, 25, 90]),
//! ])
//! .unwrap();
//!
//! let hits: Vec<(u32, u64)> = index
//!     .query("chr1", 9, 10)
//!     .map(|o| (o.frag_id(), o.length))
//!     .collect();
//! assert_eq!(hits, vec![(0, 1)]);
//! ```
//!
//! ## Bins
//!
//! ```rust
//! use porec_overlaprs::FragmentIndex;
//!
//! let sizes = vec![("chr1".to_string(), 250)];
//! let bins = FragmentIndex::from_bins(&sizes, 100).unwrap();
//! assert_eq!(bins.len(), 3);
//! ```

pub mod bins;
pub mod digest;
pub mod errors;
pub mod fragment_index;
pub mod io;

// re-exports
pub use self::bins::FragmentToBinMap;
pub use self::digest::{CutSpec, SeqDigest};
pub use self::errors::FragmentIndexError;
pub use self::fragment_index::{
    ChromFragments, Fragment, FragmentIndex, IterOverlaps, Overlap, endpoints_to_intervals,
};
