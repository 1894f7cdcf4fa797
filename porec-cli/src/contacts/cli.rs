use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const CONTACTS_CMD: &str = "contacts";
pub const FLATTEN_CMD: &str = "flatten";
pub const MATRIX_CMD: &str = "matrix";
pub const MIDPOINTS_CMD: &str = "midpoints";

pub fn create_contacts_cli() -> Command {
    Command::new(CONTACTS_CMD)
        .about("Flatten walks into lower-order contacts and count them.")
        .subcommand_required(true)
        .subcommand(
            Command::new(FLATTEN_CMD)
                .about("Enumerate the contacts of a given size in every walk. Pairs are written as hic text.")
                .arg_required_else_help(true)
                .arg(Arg::new("walks").required(true))
                .arg(Arg::new("output").required(true))
                .arg(arg!(--config <config> "TOML file with flatten settings, flags win over it"))
                .arg(
                    arg!(--size <size> "Number of monomers per contact")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    arg!(--direct "Only contacts of monomers adjacent on the read")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--sort "Order the monomers of each contact by fragment id")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new(MATRIX_CMD)
                .about("Count hic text contacts per pair of bins.")
                .arg_required_else_help(true)
                .arg(Arg::new("hic_txt").required(true))
                .arg(Arg::new("frag_bins").required(true))
                .arg(Arg::new("output").required(true)),
        )
        .subcommand(
            Command::new(MIDPOINTS_CMD)
                .about("Write both ends of every hic text contact as fragment midpoint bed lines.")
                .arg_required_else_help(true)
                .arg(Arg::new("hic_txt").required(true))
                .arg(Arg::new("fragments").required(true))
                .arg(Arg::new("output").required(true)),
        )
}
