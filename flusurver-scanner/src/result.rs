use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Risk level encoded in the color of a mutation annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskColor {
    Red,
    Orange,
    Green,
    /// Any color the service uses that we do not classify. Keeps the raw value.
    Unknown(String),
}

impl RiskColor {
    /// Total mapping from a `color` attribute value.
    pub fn from_attr(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "red" => RiskColor::Red,
            "orange" => RiskColor::Orange,
            "green" => RiskColor::Green,
            _ => RiskColor::Unknown(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RiskColor::Red => "red",
            RiskColor::Orange => "orange",
            RiskColor::Green => "green",
            RiskColor::Unknown(raw) => raw,
        }
    }

    pub fn is_red(&self) -> bool {
        matches!(self, RiskColor::Red)
    }
}

impl fmt::Display for RiskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RiskColor {
    fn from(value: String) -> Self {
        RiskColor::from_attr(&value)
    }
}

impl From<RiskColor> for String {
    fn from(value: RiskColor) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub name: String,
    pub protein: String,
    pub risk_color: RiskColor,
    /// Color attribute as written in the page, exported verbatim.
    pub effect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure_link: Option<String>,
}

impl MutationRecord {
    /// Builds a record from the displayed mutation text. Returns `None` for
    /// empty text since no protein can be derived from it.
    pub fn new(name: &str, risk_color: RiskColor, structure_link: Option<String>) -> Option<Self> {
        let protein = protein_of(name)?;
        Some(Self {
            name: name.to_string(),
            protein,
            effect: risk_color.as_str().to_string(),
            risk_color,
            structure_link,
        })
    }

    /// Keeps the raw color attribute (e.g. `RED`) for the Effect column.
    pub fn with_effect(mut self, raw: &str) -> Self {
        self.effect = raw.trim().to_string();
        self
    }
}

/// Protein prefix of a mutation identifier: everything before the first
/// underscore, or the first two characters when there is no usable prefix.
pub fn protein_of(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    if let Some((prefix, _)) = name.split_once('_')
        && !prefix.is_empty()
    {
        return Some(prefix.to_string());
    }

    Some(name.chars().take(2).collect())
}

/// Free-text advisory about reduced drug sensitivity.
pub type DrugWarning = String;

/// Mutation view of a response document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationExtraction {
    pub records: Vec<MutationRecord>,
    pub warnings: Vec<DrugWarning>,
}

impl MutationExtraction {
    pub fn count_by_color(&self, color: &RiskColor) -> usize {
        self.records.iter().filter(|r| &r.risk_color == color).count()
    }
}

/// Downloadable artifacts FluSurver produces next to its HTML page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    MutationReport,
    QuerySummary,
    CladeCall,
    DrugSensitivity,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 4] = [
        ReportCategory::MutationReport,
        ReportCategory::QuerySummary,
        ReportCategory::CladeCall,
        ReportCategory::DrugSensitivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::MutationReport => "mutation_report",
            ReportCategory::QuerySummary => "query_summary",
            ReportCategory::CladeCall => "clade_call",
            ReportCategory::DrugSensitivity => "drug_sensitivity",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLink {
    pub category: ReportCategory,
    pub url: String,
    pub description: String,
}

/// Report view of a response document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReports {
    pub links: BTreeMap<ReportCategory, ReportLink>,
    pub missing: BTreeSet<ReportCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Stored {
        path: PathBuf,
    },
    Failed {
        url: String,
        description: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub category: ReportCategory,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ReportOutcome {
    pub fn stored(category: ReportCategory, path: PathBuf) -> Self {
        Self {
            category,
            status: OutcomeStatus::Stored { path },
        }
    }

    pub fn failed(link: &ReportLink, reason: String) -> Self {
        Self {
            category: link.category,
            status: OutcomeStatus::Failed {
                url: link.url.clone(),
                description: link.description.clone(),
                reason,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Stored { .. })
    }

    pub fn stored_path(&self) -> Option<&PathBuf> {
        match &self.status {
            OutcomeStatus::Stored { path } => Some(path),
            OutcomeStatus::Failed { .. } => None,
        }
    }
}

/// Both views over a single response document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub mutations: MutationExtraction,
    pub reports: ResolvedReports,
}
