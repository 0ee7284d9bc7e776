use crate::export::write_tsv;
use crate::submit::{Submission, build_client, submit_sequence};
use colored::Colorize;
use flusurver_scanner::error::Result;
use flusurver_scanner::{
    ExtractionResult, LinkResolver, OutcomeStatus, ReportCategory, ReportFetcher, ReportLabels,
    ReportOutcome, RiskColor, analyze,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// File name of the raw response kept in debug mode.
pub const RAW_RESPONSE_FILE: &str = "response.html";

/// Where the response page comes from.
pub enum RunInput {
    /// Submit a sequence and interpret the answer.
    Submit {
        endpoint: Url,
        submission: Submission,
    },
    /// Interpret a response page that was saved earlier.
    Html(String),
}

/// Options for configuring a run
pub struct RunOptions {
    pub base_url: String,
    pub labels: ReportLabels,
    pub output_file: PathBuf,
    /// Must already exist when reports are fetched or `debug` is set.
    pub output_dir: PathBuf,
    pub timeout_secs: u64,
    pub fetch_reports: bool,
    pub debug: bool,
    pub show_progress_bars: bool,
}

/// Callback for reporting run progress
pub type RunProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub extraction: ExtractionResult,
    pub tsv_path: PathBuf,
    pub outcomes: BTreeMap<ReportCategory, ReportOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response_path: Option<PathBuf>,
}

/// Runs the whole pipeline: obtain the page, extract, export, download.
///
/// Missing report categories and failed downloads end up in the summary.
/// Only an unusable page or a failed TSV write abort the run.
pub async fn execute_run(
    input: RunInput,
    options: RunOptions,
    progress_callback: Option<RunProgressCallback>,
) -> Result<RunSummary> {
    let RunOptions {
        base_url,
        labels,
        output_file,
        output_dir,
        timeout_secs,
        fetch_reports,
        debug,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(Arc::new(pb))
    } else {
        None
    };
    let report = |msg: String| {
        if let Some(ref pb) = progress_bar {
            pb.set_message(msg.clone());
        }
        if let Some(ref callback) = progress_callback {
            callback(msg);
        }
    };

    let html = match input {
        RunInput::Submit {
            endpoint,
            submission,
        } => {
            report(format!("Submitting {} to FluSurver...", submission.file_name));
            let client = build_client(timeout_secs)?;
            submit_sequence(&client, &endpoint, &submission).await?
        }
        RunInput::Html(html) => html,
    };

    let raw_response_path = if debug {
        let path = output_dir.join(RAW_RESPONSE_FILE);
        tokio::fs::write(&path, &html).await?;
        info!("Saved raw response to {}", path.display());
        Some(path)
    } else {
        None
    };

    report("Interpreting response...".to_string());
    let resolver = LinkResolver::new(&base_url).with_labels(labels);
    let extraction = analyze(&html, &resolver)?;
    info!(
        "Found {} mutation(s), {} drug warning(s), {} report link(s)",
        extraction.mutations.records.len(),
        extraction.mutations.warnings.len(),
        extraction.reports.links.len()
    );

    write_tsv(
        &output_file,
        &extraction.mutations.records,
        &extraction.mutations.warnings,
    )?;
    info!("Wrote mutation table to {}", output_file.display());

    let outcomes = if fetch_reports && !extraction.reports.links.is_empty() {
        let pb_clone = progress_bar.clone();
        let fetcher = ReportFetcher::with_timeout(timeout_secs)?.with_progress_callback(Arc::new(
            move |category: ReportCategory, _url: String| {
                if let Some(ref pb) = pb_clone {
                    pb.set_message(format!("Downloading {}...", category));
                }
            },
        ));
        fetcher
            .fetch_all(&extraction.reports.links, &output_dir)
            .await
    } else {
        BTreeMap::new()
    };

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(RunSummary {
        extraction,
        tsv_path: output_file,
        outcomes,
        raw_response_path,
    })
}

/// Generate a human readable summary of a run
pub fn generate_run_report(summary: &RunSummary) -> String {
    let mutations = &summary.extraction.mutations;
    let reports = &summary.extraction.reports;

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Mutations\n");
    report.push_str(&format!("  Total: {}\n", mutations.records.len()));
    report.push_str(&format!(
        "  {}: {}\n",
        "red".red(),
        mutations.count_by_color(&RiskColor::Red)
    ));
    report.push_str(&format!(
        "  {}: {}\n",
        "orange".yellow(),
        mutations.count_by_color(&RiskColor::Orange)
    ));
    report.push_str(&format!(
        "  {}: {}\n",
        "green".green(),
        mutations.count_by_color(&RiskColor::Green)
    ));
    let other = mutations
        .records
        .iter()
        .filter(|r| matches!(r.risk_color, RiskColor::Unknown(_)))
        .count();
    if other > 0 {
        report.push_str(&format!("  other: {}\n", other));
    }
    report.push_str(&format!("  Table: {}\n", summary.tsv_path.display()));

    if !mutations.warnings.is_empty() {
        report.push_str("\n# Drug warnings\n");
        for warning in &mutations.warnings {
            report.push_str(&format!("  {} {}\n", "!".red().bold(), warning));
        }
    }

    report.push_str("\n# Reports\n");
    if summary.outcomes.is_empty() {
        for link in reports.links.values() {
            report.push_str(&format!("  {} {}\n", link.category, link.url));
        }
    }
    for outcome in summary.outcomes.values() {
        match &outcome.status {
            OutcomeStatus::Stored { path } => {
                report.push_str(&format!(
                    "  {} {} {}\n",
                    "✓".green(),
                    outcome.category,
                    path.display()
                ));
            }
            OutcomeStatus::Failed {
                url,
                description,
                reason,
            } => {
                report.push_str(&format!(
                    "  {} {} ({}) {} [{}]\n",
                    "✗".red(),
                    outcome.category,
                    description,
                    url,
                    reason
                ));
            }
        }
    }
    for category in &reports.missing {
        report.push_str(&format!("  {} {} not found in response\n", "⚠".yellow(), category));
    }

    if let Some(ref path) = summary.raw_response_path {
        report.push_str(&format!("\nRaw response: {}\n", path.display()));
    }

    report
}

pub fn generate_json_report(summary: &RunSummary) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

