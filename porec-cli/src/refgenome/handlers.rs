use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use log::info;

use porec_core::utils::{get_dynamic_reader, get_dynamic_writer, read_chrom_sizes};
use porec_overlaprs::digest::digest_fasta;
use porec_overlaprs::io::{write_fragment_bed, write_hicref};
use porec_overlaprs::{CutSpec, FragmentIndex, FragmentToBinMap};

use crate::args::{optional_path, required_path};

pub fn run_digest(matches: &ArgMatches) -> Result<()> {
    let fasta = required_path(matches, "fasta")?;
    let cut_on = matches
        .get_one::<String>("cut_on")
        .context("A cut specification is required.")?;
    let bed = optional_path(matches, "bed");
    let hicref = optional_path(matches, "hicref");

    if bed.is_none() && hicref.is_none() {
        bail!("Nothing to write: pass --bed and/or --hicref");
    }

    let cut: CutSpec = cut_on.parse()?;
    let digests = digest_fasta(get_dynamic_reader(fasta)?, &cut)
        .with_context(|| format!("Failed to digest {:?}", fasta))?;
    let sites: usize = digests.iter().map(|d| d.positions.len()).sum();
    info!("Digested {} sequences at {} sites", digests.len(), sites);

    let index = FragmentIndex::from_digests(digests)?;

    if let Some(bed) = bed {
        write_fragment_bed(&index, get_dynamic_writer(bed)?)?;
        info!("Wrote {} fragments to {:?}", index.len(), bed);
    }
    if let Some(hicref) = hicref {
        write_hicref(&index, get_dynamic_writer(hicref)?)?;
        info!("Wrote {} fragments to {:?}", index.len(), hicref);
    }

    Ok(())
}

pub fn run_bins(matches: &ArgMatches) -> Result<()> {
    let chrom_sizes = required_path(matches, "chrom_sizes")?;
    let width = matches
        .get_one::<u64>("width")
        .copied()
        .context("A bin width is required.")?;
    let bed = required_path(matches, "bed")?;

    let sizes = read_chrom_sizes(chrom_sizes)?;
    let bins = FragmentIndex::from_bins(&sizes, width)?;
    write_fragment_bed(&bins, get_dynamic_writer(bed)?)?;

    info!("Wrote {} bins of width {} to {:?}", bins.len(), width, bed);
    Ok(())
}

pub fn run_convert(matches: &ArgMatches) -> Result<()> {
    let input = required_path(matches, "input")?;
    let output = required_path(matches, "output")?;

    let index = FragmentIndex::try_from(input)?;
    index.to_file(output)?;

    info!("Converted {} fragments from {:?} to {:?}", index.len(), input, output);
    Ok(())
}

pub fn run_frag_bins(matches: &ArgMatches) -> Result<()> {
    let fragments = required_path(matches, "fragments")?;
    let bins = required_path(matches, "bins")?;
    let output = required_path(matches, "output")?;

    let fragments = FragmentIndex::try_from(fragments)?;
    let bins = FragmentIndex::try_from(bins)?;
    let map = FragmentToBinMap::new(&fragments, &bins)?;
    map.write(get_dynamic_writer(output)?)?;

    info!("Assigned {} fragments to {} bins", map.len(), bins.len());
    Ok(())
}
