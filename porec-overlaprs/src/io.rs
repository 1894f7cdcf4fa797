use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;

use porec_core::utils::{get_dynamic_reader, get_dynamic_writer};

use crate::errors::{FragmentIndexError, Result};
use crate::fragment_index::FragmentIndex;

fn parse_error(line: usize, reason: impl Into<String>) -> FragmentIndexError {
    FragmentIndexError::Parse {
        line,
        reason: reason.into(),
    }
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

///
/// Read HiCRef text: one line per chromosome, `chrom pos_1 pos_2 ... length`, where
/// every position is the end of a fragment.
///
pub fn read_hicref<R: BufRead>(reader: R) -> Result<FragmentIndex> {
    let mut endpoints: Vec<(String, Vec<u64>)> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }

        let mut fields = line.split_whitespace();
        let chrom = fields
            .next()
            .ok_or_else(|| parse_error(index + 1, "missing chromosome"))?;
        let positions = fields
            .map(|p| {
                p.parse::<u64>()
                    .map_err(|_| parse_error(index + 1, format!("invalid position '{p}'")))
            })
            .collect::<Result<Vec<u64>>>()?;

        endpoints.push((chrom.to_string(), positions));
    }

    FragmentIndex::from_endpoints(endpoints)
}

///
/// Write the index as HiCRef text.
///
/// Only indexes whose fragments tile each chromosome from 0 with sequential ids can be
/// written this way, otherwise the ids would change on the way back in.
///
pub fn write_hicref<W: Write>(index: &FragmentIndex, mut writer: W) -> Result<()> {
    let mut expected_id = 0u32;

    for chrom in index.chroms() {
        let mut prev_end = 0u64;
        for fragment in chrom.fragments() {
            if fragment.start != prev_end || fragment.val != expected_id {
                return Err(FragmentIndexError::NotHicRefCompatible(chrom.chrom.clone()));
            }
            prev_end = fragment.end;
            expected_id += 1;
        }

        write!(writer, "{}", chrom.chrom)?;
        for fragment in chrom.fragments() {
            write!(writer, " {}", fragment.end)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

///
/// Read a four-column interval table: `chrom\tstart\tend\tfrag_id`.
///
/// Extra columns are ignored, as are `track`/`browser` header lines.
///
pub fn read_fragment_bed<R: BufRead>(reader: R) -> Result<FragmentIndex> {
    let mut rows: Vec<(String, u64, u64, u32)> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) || line.starts_with("track") || line.starts_with("browser") {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 4 {
            return Err(parse_error(
                index + 1,
                format!("expected 4 columns, found {}", parts.len()),
            ));
        }

        let start = parts[1]
            .parse::<u64>()
            .map_err(|_| parse_error(index + 1, format!("invalid start '{}'", parts[1])))?;
        let end = parts[2]
            .parse::<u64>()
            .map_err(|_| parse_error(index + 1, format!("invalid end '{}'", parts[2])))?;
        let id = parts[3]
            .parse::<u32>()
            .map_err(|_| parse_error(index + 1, format!("invalid fragment id '{}'", parts[3])))?;

        rows.push((parts[0].to_string(), start, end, id));
    }

    FragmentIndex::from_intervals(rows)
}

/// Write the index as a four-column interval table, sorted by (chrom, start).
pub fn write_fragment_bed<W: Write>(index: &FragmentIndex, mut writer: W) -> Result<()> {
    for (chrom, fragment) in index.iter() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            chrom, fragment.start, fragment.end, fragment.val
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn is_bed_path(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".bed") || name.ends_with(".bed.gz")
}

impl TryFrom<&Path> for FragmentIndex {
    type Error = anyhow::Error;

    ///
    /// Load a fragment definition from disk. Files ending in `.bed` or `.bed.gz` are
    /// read as interval tables, anything else as HiCRef text.
    ///
    /// # Arguments:
    /// - value: path to the fragment file on disk.
    fn try_from(value: &Path) -> anyhow::Result<Self> {
        let reader = get_dynamic_reader(value)?;
        let index = match is_bed_path(value) {
            true => read_fragment_bed(reader),
            false => read_hicref(reader),
        }
        .with_context(|| format!("Failed to load fragments from {:?}", value))?;

        Ok(index)
    }
}

impl FragmentIndex {
    /// Write the index to disk, choosing the format from the extension like
    /// [`TryFrom<&Path>`](FragmentIndex::try_from) does.
    pub fn to_file<T: AsRef<Path>>(&self, path: T) -> anyhow::Result<()> {
        let path = path.as_ref();
        let writer = get_dynamic_writer(path)?;
        match is_bed_path(path) {
            true => write_fragment_bed(self, writer),
            false => write_hicref(self, writer),
        }
        .with_context(|| format!("Failed to write fragments to {:?}", path))?;
        Ok(())
    }
}
