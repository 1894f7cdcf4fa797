use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::ModelError;

/// How an alignment was matched to the restriction fragments it overlaps.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MappingType {
    /// No fragment overlaps by more than the minimum overlap.
    None,
    /// Exactly one fragment qualifies.
    Simple,
    /// Several fragments qualify; the one with the largest overlap was chosen.
    MultiFrag,
}

impl MappingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingType::None => "none",
            MappingType::Simple => "simple",
            MappingType::MultiFrag => "multi_frag",
        }
    }
}

impl Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MappingType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(MappingType::None),
            "simple" => Ok(MappingType::Simple),
            "multi_frag" => Ok(MappingType::MultiFrag),
            other => Err(ModelError::InvalidMappingType(other.to_string())),
        }
    }
}

/// The fragment an alignment resolved to, if any.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FragmentAssignment {
    pub frag_id: Option<u32>,
    pub mapping_type: MappingType,
}

impl FragmentAssignment {
    pub fn unassigned() -> FragmentAssignment {
        FragmentAssignment {
            frag_id: None,
            mapping_type: MappingType::None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.frag_id.is_some()
    }
}

impl Default for FragmentAssignment {
    fn default() -> Self {
        Self::unassigned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(MappingType::None)]
    #[case(MappingType::Simple)]
    #[case(MappingType::MultiFrag)]
    fn test_mapping_type_text(#[case] mapping_type: MappingType) {
        let parsed: MappingType = mapping_type.to_string().parse().unwrap();
        assert_eq!(parsed, mapping_type);
    }

    #[rstest]
    fn test_unknown_mapping_type() {
        assert!("multi".parse::<MappingType>().is_err());
    }

    #[rstest]
    fn test_default_is_unassigned() {
        let assignment = FragmentAssignment::default();
        assert!(!assignment.is_assigned());
        assert_eq!(assignment.mapping_type, MappingType::None);
    }
}
