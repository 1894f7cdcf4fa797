use std::path::Path;

use anyhow::{Result, anyhow};
use clap::ArgMatches;

/// Path given to a required positional or option.
pub fn required_path<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    matches
        .get_one::<String>(name)
        .map(Path::new)
        .ok_or_else(|| anyhow!("A path for <{}> is required.", name))
}

pub fn optional_path<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a Path> {
    matches.get_one::<String>(name).map(Path::new)
}
