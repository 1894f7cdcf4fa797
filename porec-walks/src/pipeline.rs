//! Streaming drivers that tie the pieces together.
//!
//! Reads are pulled from a [`ReadGroups`] reader in chunks. Each chunk is resolved and
//! turned into walks on a rayon pool, then written out in input order before the next
//! chunk is read, so memory stays bounded by the chunk size.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use porec_core::models::{ContactWalk, ReadAlignmentGroup};
use porec_overlaprs::FragmentIndex;

use crate::config::WalkConfig;
use crate::containment::{ResolverStats, measure_overlaps};
use crate::errors::{Result, WalkError};
use crate::flatten::ContactFlattener;
use crate::formats::HicContact;
use crate::reader::ReadGroups;
use crate::walk::{WalkBuilder, WalkStats};

/// Summary of a walks run, written as JSON next to the output.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub resolver: ResolverStats,
    pub walks: WalkStats,
    pub failed_reads: u64,
    pub walks_emitted: u64,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.resolver.merge(&other.resolver);
        self.walks.merge(&other.walks);
        self.failed_reads += other.failed_reads;
        self.walks_emitted += other.walks_emitted;
    }

    /// Write the summary as pretty-printed JSON.
    pub fn to_file<T: AsRef<Path>>(&self, path: T) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create the run summary {:?}", path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Counters for a flatten run.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenStats {
    pub walks: u64,
    pub malformed_walks: u64,
    pub contacts: u64,
    pub unassigned_contacts: u64,
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg} ({pos} reads)")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Pull up to `chunk_size` reads; unparseable reads are logged and counted, I/O
/// errors end the run.
fn next_chunk<R: BufRead>(
    groups: &mut ReadGroups<R>,
    chunk_size: usize,
    failed_reads: &mut u64,
) -> Result<Vec<ReadAlignmentGroup>> {
    let mut chunk = Vec::with_capacity(chunk_size);
    for group in groups.by_ref() {
        match group {
            Ok(group) => chunk.push(group),
            Err(WalkError::Io(e)) => return Err(WalkError::Io(e)),
            Err(e) => {
                warn!("Skipping read: {}", e);
                *failed_reads += 1;
            }
        }
        if chunk.len() >= chunk_size {
            break;
        }
    }
    Ok(chunk)
}

///
/// Resolve every read of an alignment table and write one walk line per read that
/// still has at least two monomers.
///
/// # Arguments
/// - groups: reads of the alignment table
/// - index: fragments to assign against
/// - config: resolution, assignment and threading settings
/// - sink: destination of the walk lines
/// - bed: optional destination of one bed line per emitted monomer
///
pub fn run_walks<R, W>(
    mut groups: ReadGroups<R>,
    index: &FragmentIndex,
    config: &WalkConfig,
    mut sink: W,
    mut bed: Option<&mut dyn Write>,
) -> Result<RunStats>
where
    R: BufRead,
    W: Write,
{
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| WalkError::Config(format!("failed to build thread pool: {e}")))?;

    let resolver = config.resolver();
    let builder = WalkBuilder::new(index, config.min_overlap, config.containment_cutoff);
    let mut stats = RunStats::default();
    let pb = spinner("Building walks");

    loop {
        let chunk = next_chunk(&mut groups, config.chunk_size, &mut stats.failed_reads)?;
        if chunk.is_empty() {
            break;
        }
        debug!("Processing a chunk of {} reads", chunk.len());

        let results: Vec<(ContactWalk, RunStats)> = pool.install(|| {
            chunk
                .into_par_iter()
                .map(|group| {
                    let (resolved, resolver_stats) = resolver.resolve(group);
                    let (walk, walk_stats) = builder.build(resolved);
                    let stats = RunStats {
                        resolver: resolver_stats,
                        walks: walk_stats,
                        ..Default::default()
                    };
                    (walk, stats)
                })
                .collect()
        });

        for (walk, walk_stats) in results {
            pb.inc(1);
            stats.merge(&walk_stats);
            if !walk.is_contact() {
                continue;
            }
            writeln!(sink, "{}", walk)?;
            if let Some(bed) = bed.as_mut() {
                for monomer in &walk.monomers {
                    writeln!(bed, "{}", monomer.as_bed_string())?;
                }
            }
            stats.walks_emitted += 1;
        }
    }

    sink.flush()?;
    if let Some(bed) = bed.as_mut() {
        bed.flush()?;
    }
    pb.finish_and_clear();

    info!(
        "Processed {} reads: {} walks written, {} reads failed",
        stats.resolver.reads_seen, stats.walks_emitted, stats.failed_reads
    );
    Ok(stats)
}

///
/// Write the query overlap of every pair of alignments in each read as
/// `read_id\ti\tj\toverlap`.
///
/// Returns the number of rows written.
///
pub fn run_overlaps<R, W>(groups: ReadGroups<R>, mut sink: W, no_zero: bool) -> Result<u64>
where
    R: BufRead,
    W: Write,
{
    let mut rows = 0;
    for group in groups {
        let group = match group {
            Ok(group) => group,
            Err(e) => {
                warn!("Skipping read: {}", e);
                continue;
            }
        };
        for overlap in measure_overlaps(&group) {
            if no_zero && overlap.overlap == 0 {
                continue;
            }
            writeln!(sink, "{}", overlap)?;
            rows += 1;
        }
    }
    sink.flush()?;
    Ok(rows)
}

///
/// Flatten every walk of a walks file.
///
/// Pairs are written as hic text, skipping (and counting) pairs with an unassigned
/// monomer. Larger contacts are written as `read_id\tkind\tmonomer...` lines.
/// Malformed walk lines are logged and skipped.
///
pub fn run_flatten<R, W>(reader: R, flattener: &ContactFlattener, mut sink: W) -> Result<FlattenStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = FlattenStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let walk: ContactWalk = match line.parse() {
            Ok(walk) => walk,
            Err(e) => {
                warn!("Skipping walk at line {}: {}", index + 1, e);
                stats.malformed_walks += 1;
                continue;
            }
        };
        stats.walks += 1;

        for contact in flattener.flatten(&walk) {
            if flattener.size() == 2 {
                match HicContact::try_from(&contact) {
                    Ok(hic) => writeln!(sink, "{}", hic)?,
                    Err(WalkError::UnassignedMonomer(_)) => {
                        stats.unassigned_contacts += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            } else {
                writeln!(sink, "{}", contact)?;
            }
            stats.contacts += 1;
        }
    }

    sink.flush()?;
    info!(
        "Flattened {} walks into {} contacts ({} pairs without a fragment skipped)",
        stats.walks, stats.contacts, stats.unassigned_contacts
    );
    Ok(stats)
}
