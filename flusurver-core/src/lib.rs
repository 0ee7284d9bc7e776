use colored::Colorize;

pub mod export;
pub mod run;
pub mod submit;

pub use run::{RunInput, RunOptions, RunProgressCallback, RunSummary, execute_run};

pub fn print_banner() {
    println!(
        "{} {}",
        "flusurver".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_white()
    );
    println!("{}", "FluSurver submission and result extraction".blue());
    println!();
}
