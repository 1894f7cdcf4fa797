//! From pore-C alignments to multi-way contacts.
//!
//! Each read is handled on its own, in four steps:
//!
//! 1. [`reader::ReadGroups`] collects the alignments of a read from an alignment table
//! 2. [`containment::ContainmentResolver`] drops redundant alignments
//! 3. [`walk::WalkBuilder`] assigns each remaining alignment to a restriction fragment
//!    with [`assign::assign`] rules and emits the read's [`ContactWalk`](porec_core::models::ContactWalk)
//! 4. [`flatten::ContactFlattener`] breaks walks into pairwise or size-n contacts
//!
//! [`pipeline`] runs the steps over whole files, spreading reads over a rayon pool.
//!
//! ```rust
//! use porec_core::models::{AlignedSegment, ReadAlignmentGroup};
//! use porec_overlaprs::FragmentIndex;
//! use porec_walks::{ContainmentResolver, ResolveMode, WalkBuilder};
//!
//! let index = FragmentIndex::from_endpoints(vec![("chr1", vec![100, 200, 300])]).unwrap();
//! let segment = |start: u64, query_start: u32| AlignedSegment {
//!     chrom: "chr1".to_string(),
//!     start,
//!     end: start + 50,
//!     is_reverse: false,
//!     read_id: "read1".to_string(),
//!     query_start,
//!     query_end: query_start + 50,
//!     mapping_quality: 60,
//! };
//! let group = ReadAlignmentGroup::new("read1", vec![segment(20, 0), segment(220, 60)]).unwrap();
//!
//! let resolver = ContainmentResolver::new(ResolveMode::Overlap, 20, 1);
//! let (resolved, _) = resolver.resolve(group);
//! let (walk, _) = WalkBuilder::new(&index, 10, None).build(resolved);
//!
//! let frags: Vec<Option<u32>> = walk.monomers.iter().map(|m| m.frag_id()).collect();
//! assert_eq!(frags, vec![Some(0), Some(2)]);
//! ```

pub mod assign;
pub mod config;
pub mod containment;
pub mod errors;
pub mod flatten;
pub mod formats;
pub mod matrix;
pub mod pipeline;
pub mod reader;
pub mod walk;

// re-exports
pub use self::assign::{assign, assign_overlaps};
pub use self::config::{FlattenConfig, WalkConfig};
pub use self::containment::{ContainmentResolver, ResolveMode, ResolverStats, measure_overlaps};
pub use self::errors::WalkError;
pub use self::flatten::{ContactFlattener, ContactKind, FlattenMode, SizeNContact};
pub use self::formats::HicContact;
pub use self::matrix::BinContactMatrix;
pub use self::reader::ReadGroups;
pub use self::walk::{WalkBuilder, WalkStats};
