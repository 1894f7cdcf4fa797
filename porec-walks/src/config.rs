use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::containment::{ContainmentResolver, ResolveMode};
use crate::errors::{Result, WalkError};
use crate::flatten::{ContactFlattener, FlattenMode};

fn default_trim() -> u32 {
    20
}

fn default_mapping_quality_cutoff() -> u8 {
    1
}

fn default_min_overlap() -> u64 {
    10
}

fn default_containment_cutoff() -> Option<f64> {
    Some(99.0)
}

fn default_threads() -> usize {
    1
}

fn default_chunk_size() -> usize {
    50_000
}

fn default_size() -> usize {
    2
}

///
/// Settings for turning alignments into walks. Every field has a default, so an
/// empty TOML file is a valid configuration.
///
/// ```toml
/// mode = "containment"
/// trim = 20
/// mapping_quality_cutoff = 1
/// min_overlap = 10
/// containment_cutoff = 99.0
/// threads = 4
/// chunk_size = 50000
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WalkConfig {
    #[serde(default)]
    pub mode: ResolveMode,
    #[serde(default = "default_trim")]
    pub trim: u32,
    #[serde(default = "default_mapping_quality_cutoff")]
    pub mapping_quality_cutoff: u8,
    #[serde(default = "default_min_overlap")]
    pub min_overlap: u64,
    #[serde(default = "default_containment_cutoff")]
    pub containment_cutoff: Option<f64>,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            mode: ResolveMode::default(),
            trim: default_trim(),
            mapping_quality_cutoff: default_mapping_quality_cutoff(),
            min_overlap: default_min_overlap(),
            containment_cutoff: default_containment_cutoff(),
            threads: default_threads(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl WalkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(WalkError::Config("threads must be at least 1".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(WalkError::Config("chunk_size must be at least 1".to_string()));
        }
        if let Some(cutoff) = self.containment_cutoff {
            if !(0.0..=100.0).contains(&cutoff) {
                return Err(WalkError::Config(format!(
                    "containment_cutoff must be a percentage, got {cutoff}"
                )));
            }
        }
        Ok(())
    }

    pub fn resolver(&self) -> ContainmentResolver {
        ContainmentResolver::new(self.mode, self.trim, self.mapping_quality_cutoff)
    }
}

impl TryFrom<&Path> for WalkConfig {
    type Error = WalkError;

    fn try_from(path: &Path) -> Result<Self> {
        let toml_str = read_to_string(path)?;
        let config: WalkConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

/// Settings for flattening walks into lower-order contacts.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FlattenConfig {
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default)]
    pub mode: FlattenMode,
    #[serde(default)]
    pub sort_by_fragment: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            size: default_size(),
            mode: FlattenMode::default(),
            sort_by_fragment: false,
        }
    }
}

impl FlattenConfig {
    pub fn flattener(&self) -> Result<ContactFlattener> {
        ContactFlattener::new(self.size, self.mode, self.sort_by_fragment)
    }
}

impl TryFrom<&Path> for FlattenConfig {
    type Error = WalkError;

    fn try_from(path: &Path) -> Result<Self> {
        let toml_str = read_to_string(path)?;
        let config: FlattenConfig = toml::from_str(&toml_str)?;
        config.flattener()?;
        Ok(config)
    }
}
