use commands::command_argument_builder;
use flusurver::handlers::{handle_parse, handle_submit, show_banner};
use flusurver_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    if show_banner(&chosen_command, quiet) {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("submit", primary_command)) => handle_submit(primary_command, quiet).await,
        Some(("parse", primary_command)) => handle_parse(primary_command, quiet).await,
        // No subcommand provided, just show the banner
        _ => {}
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
