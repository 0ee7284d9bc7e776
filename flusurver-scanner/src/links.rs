use crate::html::{Document, Node};
use crate::result::{ReportCategory, ReportLink, ResolvedReports};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use url::Url;

/// Where FluSurver serves the files its result pages link to.
pub const DEFAULT_BASE_URL: &str = "https://flusurver.bii.a-star.edu.sg";

/// File extensions of downloadable reports.
pub const REPORT_EXTENSIONS: [&str; 3] = ["txt", "csv", "tsv"];

/// Descriptive labels used to classify report anchors, in matching order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLabels {
    entries: Vec<(ReportCategory, String)>,
}

impl ReportLabels {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ReportCategory, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(category, label)| (category, label.into()))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(ReportCategory, String)] {
        &self.entries
    }

    pub fn categories(&self) -> BTreeSet<ReportCategory> {
        self.entries.iter().map(|(category, _)| *category).collect()
    }

    /// First configured label contained in `text`, compared case-insensitively.
    pub fn classify(&self, text: &str) -> Option<(ReportCategory, &str)> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|(_, label)| text.contains(&label.to_lowercase()))
            .map(|(category, label)| (*category, label.as_str()))
    }
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self::new([
            (ReportCategory::MutationReport, "detailed mutation report"),
            (ReportCategory::QuerySummary, "query summary report"),
            (ReportCategory::CladeCall, "query to clade call"),
            (ReportCategory::DrugSensitivity, "drug sensitivity summary report"),
        ])
    }
}

/// Finds the report download links on a result page.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    labels: ReportLabels,
    base_url: String,
}

impl LinkResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            labels: ReportLabels::default(),
            base_url: base_url.to_string(),
        }
    }

    pub fn with_labels(mut self, labels: ReportLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn labels(&self) -> &ReportLabels {
        &self.labels
    }

    pub fn resolve(&self, html: &str) -> ResolvedReports {
        let document = Document::parse(html);
        self.resolve_document(&document)
    }

    /// Classifies every report anchor by the text written just before it,
    /// falling back to its parent's text. A later anchor of the same category
    /// replaces an earlier one.
    pub fn resolve_document(&self, document: &Document) -> ResolvedReports {
        let mut resolved = ResolvedReports::default();

        for anchor in document.find_all("a[href]") {
            let Some(href) = anchor.attr("href") else {
                continue;
            };
            if !has_report_extension(href) {
                continue;
            }

            let Some((category, label)) = self.classify_anchor(&anchor) else {
                debug!("Report link {} did not match any label", href);
                continue;
            };

            let url = normalize_href(&self.base_url, href);
            if let Some(previous) = resolved.links.get(&category) {
                debug!(
                    "Replacing {} link {} with {}",
                    category, previous.url, url
                );
            } else {
                debug!("Found {} link {}", category, url);
            }

            resolved.links.insert(
                category,
                ReportLink {
                    category,
                    url,
                    description: label.to_string(),
                },
            );
        }

        let found: BTreeSet<ReportCategory> = resolved.links.keys().copied().collect();
        resolved.missing = self
            .labels
            .categories()
            .difference(&found)
            .copied()
            .collect();

        for category in &resolved.missing {
            warn!("Report category {} not found in response", category);
        }

        resolved
    }

    fn classify_anchor(&self, anchor: &Node<'_>) -> Option<(ReportCategory, &str)> {
        if let Some(found) = self.labels.classify(&anchor.preceding_text()) {
            return Some(found);
        }
        let parent = anchor.parent()?;
        self.labels.classify(&parent.normalized_text())
    }
}

/// Whether the path part of `href` ends in one of [`REPORT_EXTENSIONS`].
pub fn has_report_extension(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        REPORT_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Turns a page-relative `href` into an absolute locator under `base`.
///
/// Leading `../` and `./` segments are dropped and the rest is joined to the
/// base with a single slash. Absolute http(s) links are returned unchanged.
/// Root-relative (`/x`) and protocol-relative (`//host/x`) links resolve
/// against the base's origin.
pub fn normalize_href(base: &str, href: &str) -> String {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return href.to_string();
    }

    if href.starts_with('/') {
        match Url::parse(base).and_then(|base| base.join(href)) {
            Ok(url) => return url.to_string(),
            Err(e) => debug!("Cannot resolve {} against {}: {}", href, base, e),
        }
    }

    let mut path = href;
    loop {
        if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else {
            break;
        }
    }

    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
