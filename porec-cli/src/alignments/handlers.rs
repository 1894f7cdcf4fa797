use std::io::Write;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use porec_core::utils::{get_dynamic_reader, get_dynamic_writer};
use porec_overlaprs::FragmentIndex;
use porec_walks::pipeline;
use porec_walks::{ReadGroups, ResolveMode, WalkConfig};

use crate::args::{optional_path, required_path};

/// Settings from `--config` (or the defaults) with the command line flags applied on top.
fn walk_config(matches: &ArgMatches) -> Result<WalkConfig> {
    let mut config = match optional_path(matches, "config") {
        Some(path) => WalkConfig::try_from(path)
            .with_context(|| format!("Failed to load walk settings from {:?}", path))?,
        None => WalkConfig::default(),
    };

    if matches.get_flag("contained") {
        config.mode = ResolveMode::Containment;
    }
    if let Some(trim) = matches.get_one::<u32>("trim") {
        config.trim = *trim;
    }
    if let Some(mapq) = matches.get_one::<u8>("mapq") {
        config.mapping_quality_cutoff = *mapq;
    }
    if let Some(min_overlap) = matches.get_one::<u64>("min_overlap") {
        config.min_overlap = *min_overlap;
    }
    if let Some(cutoff) = matches.get_one::<f64>("containment_cutoff") {
        config.containment_cutoff = Some(*cutoff);
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = *threads;
    }

    config.validate()?;
    Ok(config)
}

pub fn run_walks(matches: &ArgMatches) -> Result<()> {
    let alignments = required_path(matches, "alignments")?;
    let fragments = required_path(matches, "fragments")?;
    let output = required_path(matches, "output")?;
    let config = walk_config(matches)?;

    info!(
        "Building walks with {:?} resolution on {} threads",
        config.mode, config.threads
    );

    let index = FragmentIndex::try_from(fragments)?;
    info!("Loaded {} fragments from {:?}", index.len(), fragments);

    let groups = ReadGroups::new(get_dynamic_reader(alignments)?);
    let sink = get_dynamic_writer(output)?;
    let mut bed = match optional_path(matches, "bed") {
        Some(path) => Some(get_dynamic_writer(path)?),
        None => None,
    };

    let stats = pipeline::run_walks(
        groups,
        &index,
        &config,
        sink,
        bed.as_mut().map(|writer| writer as &mut dyn Write),
    )?;

    info!(
        "Kept {} of {} alignments ({} below the mapping quality cutoff); {} monomers on an unknown reference",
        stats.resolver.segments_kept,
        stats.resolver.segments_seen,
        stats.resolver.segments_low_quality,
        stats.walks.unknown_references
    );

    if let Some(path) = optional_path(matches, "stats") {
        stats.to_file(path)?;
        info!("Wrote the run summary to {:?}", path);
    }

    Ok(())
}

pub fn run_overlaps(matches: &ArgMatches) -> Result<()> {
    let alignments = required_path(matches, "alignments")?;
    let output = required_path(matches, "output")?;
    let no_zero = matches.get_flag("no_zero");

    let groups = ReadGroups::new(get_dynamic_reader(alignments)?);
    let rows = pipeline::run_overlaps(groups, get_dynamic_writer(output)?, no_zero)?;

    info!("Wrote {} overlap rows to {:?}", rows, output);
    Ok(())
}
