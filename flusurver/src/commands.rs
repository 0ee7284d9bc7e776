use crate::CLAP_STYLING;
use clap::{arg, command};
use flusurver_core::submit::{DEFAULT_ENDPOINT, DEFAULT_FORCEREF};
use flusurver_scanner::links::DEFAULT_BASE_URL;
use std::path::PathBuf;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("flusurver")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("flusurver")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("submit")
                .about(
                    "Submit a sequence file to FluSurver, export the annotated mutations and \
                download the linked reports.",
                )
                .arg(
                    arg!(-f --"seqfile" <PATH>)
                        .required(true)
                        .help("Path to the sequence file (FASTA)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-r --"forceref" <MODE>)
                        .required(false)
                        .help("Reference selection mode")
                        .default_value(DEFAULT_FORCEREF),
                )
                .arg(
                    arg!(-l --"lclq" <LCLQ>)
                        .required(false)
                        .help("Local quality setting")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"endpoint" <URL>)
                        .required(false)
                        .help("FluSurver submission endpoint")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_ENDPOINT),
                )
                .arg(
                    arg!(--"skip-reports")
                        .required(false)
                        .help("Do not download the linked report files")
                        .action(clap::ArgAction::SetTrue),
                )
                .args(output_args()),
        )
        .subcommand(
            command!("parse")
                .about("Extract mutations and report links from a saved FluSurver result page.")
                .arg(
                    arg!(-i --"html" <PATH>)
                        .required(true)
                        .help("Path to the saved HTML response")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"fetch-reports")
                        .required(false)
                        .help("Download the linked report files")
                        .action(clap::ArgAction::SetTrue),
                )
                .args(output_args()),
        )
}

/// Arguments shared by every command that writes results.
fn output_args() -> Vec<clap::Arg> {
    vec![
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Path of the mutation table (TSV)")
            .value_parser(clap::value_parser!(PathBuf))
            .default_value("mutations.tsv"),
        arg!(-d --"output-dir" <DIR>)
            .required(false)
            .help("Directory for downloaded reports and debug output")
            .value_parser(clap::value_parser!(PathBuf))
            .default_value("reports"),
        arg!(--"base-url" <URL>)
            .required(false)
            .help("Prefix for relative report links")
            .value_parser(clap::value_parser!(Url))
            .default_value(DEFAULT_BASE_URL),
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("120"),
        arg!(--"debug")
            .required(false)
            .help("Keep the raw HTML response and log verbosely")
            .action(clap::ArgAction::SetTrue),
        arg!(--"format" <FORMAT>)
            .required(false)
            .help("Summary format: text, json")
            .value_parser(["text", "json"])
            .default_value("text"),
    ]
}
