use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use flusurver_core::run::{generate_json_report, generate_run_report};
use flusurver_core::submit::Submission;
use flusurver_core::{RunInput, RunOptions, RunSummary, execute_run};
use flusurver_scanner::ReportLabels;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use url::Url;

/// How the run summary is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Text,
    Json,
}

impl SummaryFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(SummaryFormat::Text),
            "json" => Some(SummaryFormat::Json),
            _ => None,
        }
    }
}

/// Expand a leading `~` in a user supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}

/// Create the output directory if it is not there yet
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Load a saved result page
pub fn load_saved_html(path: &Path) -> Result<String> {
    let html = fs::read_to_string(path)
        .with_context(|| format!("Failed to read HTML file {}", path.display()))?;
    if html.trim().is_empty() {
        bail!("HTML file {} is empty", path.display());
    }
    Ok(html)
}

/// Pick the log level from the `--debug` / `--quiet` flags
pub fn log_level(debug: bool, quiet: bool) -> Level {
    if debug {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    }
}

fn init_tracing(debug: bool, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level(debug, quiet))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Options shared by `submit` and `parse`, read from their matches.
pub fn run_options_from_args(args: &ArgMatches, fetch_reports: bool, quiet: bool) -> Result<RunOptions> {
    let output_file = args
        .get_one::<PathBuf>("output")
        .context("missing --output")?;
    let output_dir = args
        .get_one::<PathBuf>("output-dir")
        .context("missing --output-dir")?;
    let base_url = args
        .get_one::<Url>("base-url")
        .context("missing --base-url")?;
    let timeout_secs = *args.get_one::<u64>("timeout").unwrap_or(&120);
    let debug = args.get_flag("debug");

    Ok(RunOptions {
        base_url: base_url.to_string(),
        labels: ReportLabels::default(),
        output_file: expand_path(output_file),
        output_dir: expand_path(output_dir),
        timeout_secs,
        fetch_reports,
        debug,
        show_progress_bars: !quiet && summary_format(args) == SummaryFormat::Text,
    })
}

/// Summary format chosen with `--format`, text when absent.
pub fn summary_format(args: &ArgMatches) -> SummaryFormat {
    args.get_one::<String>("format")
        .and_then(|s| SummaryFormat::from_str(s))
        .unwrap_or(SummaryFormat::Text)
}

/// The banner goes to stdout, so it is left out for `-q` and for JSON output.
pub fn show_banner(matches: &ArgMatches, quiet: bool) -> bool {
    if quiet {
        return false;
    }
    match matches.subcommand() {
        Some((_, sub)) => summary_format(sub) == SummaryFormat::Text,
        None => true,
    }
}

async fn run_submit(args: &ArgMatches, quiet: bool) -> Result<RunSummary> {
    let seqfile = args
        .get_one::<PathBuf>("seqfile")
        .context("missing --seqfile")?;
    let seqfile = expand_path(seqfile);
    let forceref = args
        .get_one::<String>("forceref")
        .context("missing --forceref")?;
    let lclq = *args.get_one::<u32>("lclq").unwrap_or(&1);
    let endpoint = args
        .get_one::<Url>("endpoint")
        .context("missing --endpoint")?
        .clone();

    let submission = Submission::from_file(&seqfile, forceref, lclq)
        .with_context(|| format!("Failed to read sequence file {}", seqfile.display()))?;

    let options = run_options_from_args(args, !args.get_flag("skip-reports"), quiet)?;
    prepare_output_dir(&options.output_dir)?;

    let summary = execute_run(
        RunInput::Submit {
            endpoint,
            submission,
        },
        options,
        None,
    )
    .await
    .context("FluSurver run failed")?;

    Ok(summary)
}

async fn run_parse(args: &ArgMatches, quiet: bool) -> Result<RunSummary> {
    let html_path = args
        .get_one::<PathBuf>("html")
        .context("missing --html")?;
    let html = load_saved_html(&expand_path(html_path))?;

    let options = run_options_from_args(args, args.get_flag("fetch-reports"), quiet)?;
    prepare_output_dir(&options.output_dir)?;

    let progress_callback = Arc::new(|msg: String| {
        tracing::debug!("{}", msg);
    });

    let summary = execute_run(RunInput::Html(html), options, Some(progress_callback))
        .await
        .context("Failed to interpret saved page")?;

    Ok(summary)
}

fn print_summary(summary: &RunSummary, format: SummaryFormat) {
    match format {
        SummaryFormat::Text => {
            println!("\n{} Done!\n", "✓".green().bold());
            print!("{}", generate_run_report(summary));
        }
        SummaryFormat::Json => match generate_json_report(summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} Failed to render summary: {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
    }
}

pub async fn handle_submit(args: &ArgMatches, quiet: bool) {
    init_tracing(args.get_flag("debug"), quiet);

    match run_submit(args, quiet).await {
        Ok(summary) => print_summary(&summary, summary_format(args)),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_parse(args: &ArgMatches, quiet: bool) {
    init_tracing(args.get_flag("debug"), quiet);

    match run_parse(args, quiet).await {
        Ok(summary) => print_summary(&summary, summary_format(args)),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
