use clap::{Arg, Command, arg, value_parser};

pub const REFGENOME_CMD: &str = "refgenome";
pub const DIGEST_CMD: &str = "digest";
pub const BINS_CMD: &str = "bins";
pub const CONVERT_CMD: &str = "convert";
pub const FRAG_BINS_CMD: &str = "frag-bins";

pub fn create_refgenome_cli() -> Command {
    Command::new(REFGENOME_CMD)
        .about("Build and convert fragment sets of a reference genome.")
        .subcommand_required(true)
        .subcommand(
            Command::new(DIGEST_CMD)
                .about("Virtually digest a FASTA file into fragments.")
                .arg_required_else_help(true)
                .arg(Arg::new("fasta").required(true))
                .arg(
                    Arg::new("cut_on")
                        .required(true)
                        .help("regex:<pattern> for restriction sites, bin:<width> for fixed windows (k and M suffixes allowed)"),
                )
                .arg(arg!(--bed <bed> "Write the fragments as bed"))
                .arg(arg!(--hicref <hicref> "Write the fragments as HiCRef")),
        )
        .subcommand(
            Command::new(BINS_CMD)
                .about("Tile every chromosome of a chrom.sizes file with fixed-width bins.")
                .arg_required_else_help(true)
                .arg(Arg::new("chrom_sizes").required(true))
                .arg(
                    Arg::new("width")
                        .required(true)
                        .value_parser(value_parser!(u64)),
                )
                .arg(arg!(--bed <bed> "Where to write the bins").required(true)),
        )
        .subcommand(
            Command::new(CONVERT_CMD)
                .about("Convert a fragment file between HiCRef and bed, by extension.")
                .arg_required_else_help(true)
                .arg(Arg::new("input").required(true))
                .arg(Arg::new("output").required(true)),
        )
        .subcommand(
            Command::new(FRAG_BINS_CMD)
                .about("Assign every fragment to the bin holding its midpoint.")
                .arg_required_else_help(true)
                .arg(Arg::new("fragments").required(true))
                .arg(Arg::new("bins").required(true))
                .arg(Arg::new("output").required(true)),
        )
}
