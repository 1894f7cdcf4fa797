pub mod assignment;
pub mod group;
pub mod interval;
pub mod segment;
pub mod walk;

// re-export for cleaner imports
pub use self::assignment::{FragmentAssignment, MappingType};
pub use self::group::ReadAlignmentGroup;
pub use self::interval::Interval;
pub use self::segment::{AlignedSegment, Strand};
pub use self::walk::{ContactWalk, Monomer};
