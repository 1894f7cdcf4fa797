use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use porec_core::utils::{get_dynamic_reader, get_dynamic_writer};
use porec_overlaprs::{FragmentIndex, FragmentToBinMap};
use porec_walks::pipeline;
use porec_walks::{BinContactMatrix, FlattenConfig, FlattenMode, HicContact};

use crate::args::{optional_path, required_path};

fn flatten_config(matches: &ArgMatches) -> Result<FlattenConfig> {
    let mut config = match optional_path(matches, "config") {
        Some(path) => FlattenConfig::try_from(path)
            .with_context(|| format!("Failed to load flatten settings from {:?}", path))?,
        None => FlattenConfig::default(),
    };

    if let Some(size) = matches.get_one::<usize>("size") {
        config.size = *size;
    }
    if matches.get_flag("direct") {
        config.mode = FlattenMode::Direct;
    }
    if matches.get_flag("sort") {
        config.sort_by_fragment = true;
    }

    Ok(config)
}

pub fn run_flatten(matches: &ArgMatches) -> Result<()> {
    let walks = required_path(matches, "walks")?;
    let output = required_path(matches, "output")?;
    let flattener = flatten_config(matches)?.flattener()?;

    let stats = pipeline::run_flatten(
        get_dynamic_reader(walks)?,
        &flattener,
        get_dynamic_writer(output)?,
    )?;

    if stats.malformed_walks > 0 {
        info!("{} malformed walks were skipped", stats.malformed_walks);
    }
    Ok(())
}

pub fn run_matrix(matches: &ArgMatches) -> Result<()> {
    let hic_txt = required_path(matches, "hic_txt")?;
    let frag_bins = required_path(matches, "frag_bins")?;
    let output = required_path(matches, "output")?;

    let bins = FragmentToBinMap::read(get_dynamic_reader(frag_bins)?)
        .with_context(|| format!("Failed to read the fragment to bin map {:?}", frag_bins))?;
    let matrix = BinContactMatrix::from_hic_text(get_dynamic_reader(hic_txt)?, &bins)
        .with_context(|| format!("Failed to count contacts of {:?}", hic_txt))?;
    matrix.write(get_dynamic_writer(output)?)?;

    info!(
        "Counted {} contacts over {} bin pairs",
        matrix.total(),
        matrix.len()
    );
    Ok(())
}

pub fn run_midpoints(matches: &ArgMatches) -> Result<()> {
    let hic_txt = required_path(matches, "hic_txt")?;
    let fragments = required_path(matches, "fragments")?;
    let output = required_path(matches, "output")?;

    let index = FragmentIndex::try_from(fragments)?;
    let reader = get_dynamic_reader(hic_txt)?;
    let mut writer = get_dynamic_writer(output)?;

    let mut contacts: u64 = 0;
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let contact: HicContact = line
            .parse()
            .with_context(|| format!("Bad contact at line {}", number + 1))?;
        let (first, second) = contact.to_midpoint_bed_pair(&index)?;
        writeln!(writer, "{}", first)?;
        writeln!(writer, "{}", second)?;
        contacts += 1;
    }
    writer.flush()?;

    info!("Wrote the midpoints of {} contacts to {:?}", contacts, output);
    Ok(())
}
