mod alignments;
mod args;
mod contacts;
mod refgenome;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "porec";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Multi-way chromatin contacts from long concatemer reads: reference digestion, alignment filtering, walks and contact flattening.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More logging, repeat for trace output")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand(refgenome::cli::create_refgenome_cli())
        .subcommand(alignments::cli::create_alignments_cli())
        .subcommand(contacts::cli::create_contacts_cli())
}

/// RUST_LOG wins over the flags when set.
fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("quiet") {
        "warn"
    } else {
        match matches.get_count("verbose") {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(&matches);

    match matches.subcommand() {
        //
        // REFERENCE GENOME
        //
        Some((refgenome::cli::REFGENOME_CMD, matches)) => match matches.subcommand() {
            Some((refgenome::cli::DIGEST_CMD, matches)) => {
                refgenome::handlers::run_digest(matches)?;
            }
            Some((refgenome::cli::BINS_CMD, matches)) => {
                refgenome::handlers::run_bins(matches)?;
            }
            Some((refgenome::cli::CONVERT_CMD, matches)) => {
                refgenome::handlers::run_convert(matches)?;
            }
            Some((refgenome::cli::FRAG_BINS_CMD, matches)) => {
                refgenome::handlers::run_frag_bins(matches)?;
            }
            _ => unreachable!("refgenome subcommand not found"),
        },

        //
        // ALIGNMENTS
        //
        Some((alignments::cli::ALIGNMENTS_CMD, matches)) => match matches.subcommand() {
            Some((alignments::cli::WALKS_CMD, matches)) => {
                alignments::handlers::run_walks(matches)?;
            }
            Some((alignments::cli::OVERLAPS_CMD, matches)) => {
                alignments::handlers::run_overlaps(matches)?;
            }
            _ => unreachable!("alignments subcommand not found"),
        },

        //
        // CONTACTS
        //
        Some((contacts::cli::CONTACTS_CMD, matches)) => match matches.subcommand() {
            Some((contacts::cli::FLATTEN_CMD, matches)) => {
                contacts::handlers::run_flatten(matches)?;
            }
            Some((contacts::cli::MATRIX_CMD, matches)) => {
                contacts::handlers::run_matrix(matches)?;
            }
            Some((contacts::cli::MIDPOINTS_CMD, matches)) => {
                contacts::handlers::run_midpoints(matches)?;
            }
            _ => unreachable!("contacts subcommand not found"),
        },

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[test]
    fn test_walk_flags_parse() {
        let matches = build_parser()
            .try_get_matches_from([
                "porec",
                "-vv",
                "alignments",
                "walks",
                "aln.tsv",
                "frags.hicRef",
                "walks.txt.gz",
                "--contained",
                "--threads",
                "4",
            ])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);

        let (_, group) = matches.subcommand().unwrap();
        let (name, walks) = group.subcommand().unwrap();
        assert_eq!(name, alignments::cli::WALKS_CMD);
        assert!(walks.get_flag("contained"));
        assert_eq!(walks.get_one::<usize>("threads"), Some(&4));
        assert_eq!(walks.get_one::<u32>("trim"), None);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = build_parser().try_get_matches_from([
            "porec",
            "-v",
            "--quiet",
            "refgenome",
            "convert",
            "a.bed",
            "b.hicRef",
        ]);
        assert!(result.is_err());
    }
}
