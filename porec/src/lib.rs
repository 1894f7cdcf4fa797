//! # porec
//!
//! Multi-way chromatin contacts from long concatemer reads.
//!
//! Each member crate sits behind a feature of the same name:
//! - `core`: models shared by everything else and file helpers
//! - `overlaprs`: fragment sets of a reference genome and fragment overlap queries
//! - `walks`: alignment filtering, walks and contact flattening
//!
//! ```
//! use porec::overlaprs::FragmentIndex;
//!
//! let index = FragmentIndex::from_endpoints(vec![("chr1", vec![100, 250, 400])]).unwrap();
//! let hits: Vec<u32> = index.query("chr1", 90, 260).map(|o| o.frag_id()).collect();
//! assert_eq!(hits, vec![0, 1, 2]);
//! ```

#[cfg(feature = "core")]
#[doc(inline)]
pub use porec_core as core;

#[cfg(feature = "overlaprs")]
#[doc(inline)]
pub use porec_overlaprs as overlaprs;

#[cfg(feature = "walks")]
#[doc(inline)]
pub use porec_walks as walks;
