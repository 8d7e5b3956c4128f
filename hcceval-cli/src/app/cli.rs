// Imports
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, builder::Styles, value_parser as vparser};

#[rustfmt::skip]
pub fn build_cli() -> Command {
    Command::new("hcceval")
        .about("Evaluates HierCC cluster assignments across levels using silhouette scores and pairwise NMIs")
        .color(clap::ColorChoice::Auto)
        .styles(Styles::styled())
        .arg(
            Arg::new("profile")
                .help("The typing-profile matrix, tab separated; can be gzip or zstd compressed")
                .required_unless_present("version")
                .short('p')
                .long("profile")
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("cluster")
                .help("The HierCC cluster-assignment matrix, tab separated; can be gzip or zstd compressed")
                .required_unless_present("version")
                .short('c')
                .long("cluster")
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("output")
                .help("Prefix for the emitted artifacts: `<prefix>.tsv` and `<prefix>.svg`")
                .required_unless_present("version")
                .short('o')
                .long("output")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("stepwise")
                .help("Evaluate every <stepwise>-th clustering level")
                .required(false)
                .short('s')
                .long("stepwise")
                .default_value("10")
                .value_parser(vparser!(usize))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("version")
                .required(false)
                .short('v')
                .long("version")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("color")
                .required(false)
                .long("color")
                .value_parser(["always", "auto", "never"])
                .default_value("auto")
                .action(ArgAction::Set)
        )
}
