use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use fxhash::FxHashSet;

fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Get a writer that gzip-compresses when the path ends in `.gz`.
///
/// Parent directories are created when missing.
///
pub fn get_dynamic_writer(path: &Path) -> Result<BufWriter<Box<dyn Write>>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let file: Box<dyn Write> = match is_gzipped(path) {
        true => Box::new(GzEncoder::new(file, Compression::default())),
        false => Box::new(file),
    };

    Ok(BufWriter::new(file))
}

///
/// Read a chrom sizes file (`chrom<ws>length`, extra columns ignored, so a
/// fasta `.fai` index works too).
///
/// Chromosomes are returned in file order; that order decides fragment ids
/// when bins are generated from the sizes.
///
pub fn read_chrom_sizes<T: AsRef<Path>>(path: T) -> Result<Vec<(String, u64)>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path)?;

    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut chrom_sizes = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let chrom = parts.next();
        let size = parts.next();

        match (chrom, size) {
            (Some(chrom), Some(size)) => {
                let size = size.parse::<u64>().with_context(|| {
                    format!("Invalid chromosome length at line {} of {:?}", index + 1, path)
                })?;
                if !seen.insert(chrom.to_string()) {
                    anyhow::bail!("Chromosome {} listed twice in {:?}", chrom, path);
                }
                chrom_sizes.push((chrom.to_string(), size));
            }
            _ => anyhow::bail!(
                "Failed to parse chrom sizes file {:?} at line {}: {}",
                path,
                index + 1,
                line
            ),
        }
    }

    Ok(chrom_sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    #[rstest]
    fn test_gz_writer_and_reader_agree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sizes.txt.gz");

        let mut writer = get_dynamic_writer(&path).unwrap();
        writeln!(writer, "chr2\t500\t10\t60\t61").unwrap();
        writeln!(writer, "chr1\t300").unwrap();
        drop(writer);

        let sizes = read_chrom_sizes(&path).unwrap();
        assert_eq!(
            sizes,
            vec![("chr2".to_string(), 500), ("chr1".to_string(), 300)]
        );
    }

    #[rstest]
    fn test_duplicate_chromosome_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sizes.txt");
        std::fs::write(&path, "chr1 10\nchr1 20\n").unwrap();
        assert!(read_chrom_sizes(&path).is_err());
    }

    #[rstest]
    fn test_missing_length_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sizes.txt");
        std::fs::write(&path, "chr1\n").unwrap();
        assert!(read_chrom_sizes(&path).is_err());
    }
}
