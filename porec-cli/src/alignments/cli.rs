use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const ALIGNMENTS_CMD: &str = "alignments";
pub const WALKS_CMD: &str = "walks";
pub const OVERLAPS_CMD: &str = "overlaps";

pub fn create_alignments_cli() -> Command {
    Command::new(ALIGNMENTS_CMD)
        .about("Filter the alignments of concatemer reads and turn them into walks.")
        .subcommand_required(true)
        .subcommand(
            Command::new(WALKS_CMD)
                .about("Resolve overlapping alignments, assign fragments and write one walk per read.")
                .arg_required_else_help(true)
                .arg(Arg::new("alignments").required(true))
                .arg(Arg::new("fragments").required(true))
                .arg(Arg::new("output").required(true))
                .arg(arg!(--config <config> "TOML file with walk settings, flags win over it"))
                .arg(
                    arg!(--contained "Only drop alignments contained in a better one")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--trim <trim> "Bases trimmed from each side before comparing alignments")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    arg!(--mapq <mapq> "Alignments below this mapping quality are dropped")
                        .value_parser(value_parser!(u8)),
                )
                .arg(
                    Arg::new("min_overlap")
                        .long("min-overlap")
                        .help("Minimum overlap with a fragment, in bases")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("containment_cutoff")
                        .long("containment-cutoff")
                        .help("Percent of a fragment an alignment must cover to count it as contained")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    arg!(-t --threads <threads> "Worker threads")
                        .value_parser(value_parser!(usize)),
                )
                .arg(arg!(--bed <bed> "Also write one bed line per monomer"))
                .arg(arg!(--stats <stats> "Write the run summary as JSON")),
        )
        .subcommand(
            Command::new(OVERLAPS_CMD)
                .about("Report the query overlap of every pair of alignments of a read.")
                .arg_required_else_help(true)
                .arg(Arg::new("alignments").required(true))
                .arg(Arg::new("output").required(true))
                .arg(
                    Arg::new("no_zero")
                        .long("no-zero")
                        .help("Skip pairs that do not overlap")
                        .action(ArgAction::SetTrue),
                ),
        )
}
