//! Reading alignment tables.
//!
//! The table is tab-delimited, one alignment per line, with the alignments of a read
//! on consecutive lines:
//!
//! ```text
//! read_id  chrom  start  end  strand  query_start  query_end  mapq
//! ```
//!
//! `strand` is `+` or `-`. Lines starting with `#` are ignored.

use std::io::{BufRead, Lines};

use porec_core::models::{AlignedSegment, ReadAlignmentGroup, Strand};

use crate::errors::{Result, WalkError};

const ALIGNMENT_COLUMNS: usize = 8;

fn parse_error(line: usize, reason: String) -> WalkError {
    WalkError::Parse {
        what: "alignment table",
        line,
        reason,
    }
}

///
/// Parse one line of an alignment table.
///
/// # Arguments
/// - line: the text of the line
/// - line_number: 1-based, for error messages
///
pub fn parse_alignment(line: &str, line_number: usize) -> Result<AlignedSegment> {
    let fields: Vec<&str> = line.trim_end().split('\t').collect();
    if fields.len() < ALIGNMENT_COLUMNS {
        return Err(parse_error(
            line_number,
            format!("expected {ALIGNMENT_COLUMNS} columns, found {}", fields.len()),
        ));
    }

    let int = |column: usize| -> Result<u64> {
        fields[column]
            .parse::<u64>()
            .map_err(|_| parse_error(line_number, format!("invalid integer '{}'", fields[column])))
    };
    let narrow = |column: usize, value: u64| -> Result<u32> {
        u32::try_from(value)
            .map_err(|_| parse_error(line_number, format!("value out of range '{}'", fields[column])))
    };

    let strand: Strand = fields[4].parse()?;
    let mapping_quality = u8::try_from(int(7)?)
        .map_err(|_| parse_error(line_number, format!("invalid mapping quality '{}'", fields[7])))?;

    let segment = AlignedSegment {
        read_id: fields[0].to_string(),
        chrom: fields[1].to_string(),
        start: int(2)?,
        end: int(3)?,
        is_reverse: strand.is_reverse(),
        query_start: narrow(5, int(5)?)?,
        query_end: narrow(6, int(6)?)?,
        mapping_quality,
    };
    segment.validate()?;

    Ok(segment)
}

fn is_skippable(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#')
}

fn read_id_of(line: &str) -> &str {
    line.split('\t').next().unwrap_or_default()
}

///
/// Groups consecutive alignment lines by read id.
///
/// Each item is one read. A bad line fails only the read it belongs to: the error is
/// returned in place of that read's group and iteration carries on with the next read.
/// An I/O error ends the iteration.
///
pub struct ReadGroups<R: BufRead> {
    lines: Lines<R>,
    line_number: usize,
    pending: Option<(usize, String)>,
    done: bool,
}

impl<R: BufRead> ReadGroups<R> {
    pub fn new(reader: R) -> ReadGroups<R> {
        ReadGroups {
            lines: reader.lines(),
            line_number: 0,
            pending: None,
            done: false,
        }
    }

    fn next_line(&mut self) -> Option<std::io::Result<(usize, String)>> {
        if let Some(pending) = self.pending.take() {
            return Some(Ok(pending));
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;
            if !is_skippable(&line) {
                return Some(Ok((self.line_number, line)));
            }
        }
    }
}

impl<R: BufRead> Iterator for ReadGroups<R> {
    type Item = Result<ReadAlignmentGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let (line_number, line) = match self.next_line()? {
            Ok(first) => first,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };

        let read_id = read_id_of(&line).to_string();
        let mut segments = Vec::new();
        let mut error: Option<WalkError> = None;

        let mut current = Some((line_number, line));
        while let Some((line_number, line)) = current.take() {
            if error.is_none() {
                match parse_alignment(&line, line_number) {
                    Ok(segment) => segments.push(segment),
                    Err(e) => error = Some(e),
                }
            }

            match self.next_line() {
                Some(Ok((n, next))) if read_id_of(&next) == read_id => current = Some((n, next)),
                Some(Ok(other)) => self.pending = Some(other),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {}
            }
        }

        if let Some(e) = error {
            return Some(Err(e));
        }
        Some(ReadAlignmentGroup::new(&read_id, segments).map_err(WalkError::from))
    }
}
