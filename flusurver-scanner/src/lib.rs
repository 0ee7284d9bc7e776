pub mod error;
pub mod fetcher;
pub mod html;
pub mod links;
pub mod mutations;
pub mod result;

pub use error::ScanError;
pub use fetcher::{FetchProgressCallback, ReportFetcher};
pub use links::{LinkResolver, ReportLabels};
pub use mutations::extract_mutations;
pub use result::{
    DrugWarning, ExtractionResult, MutationExtraction, MutationRecord, OutcomeStatus,
    ReportCategory, ReportLink, ReportOutcome, ResolvedReports, RiskColor,
};

use html::Document;

/// Parses a response body once and runs both extractors over it.
///
/// An empty body means there is nothing to interpret and is the only error.
pub fn analyze(html: &str, resolver: &LinkResolver) -> error::Result<ExtractionResult> {
    if html.trim().is_empty() {
        return Err(ScanError::InputUnavailable(
            "response body is empty".to_string(),
        ));
    }

    let document = Document::parse(html);
    let mutations = MutationExtraction {
        records: mutations::extract_records(&document),
        warnings: mutations::extract_drug_warnings(&document),
    };
    let reports = resolver.resolve_document(&document);

    Ok(ExtractionResult { mutations, reports })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_input_unavailable() {
        let resolver = LinkResolver::new(links::DEFAULT_BASE_URL);
        assert!(matches!(
            analyze("  \n", &resolver),
            Err(ScanError::InputUnavailable(_))
        ));
    }

    #[test]
    fn test_both_views_from_one_document() {
        let html = r#"<html><body><table><tr>
            <td><a href="javascript:void(0)"><font color="red"><b>NA_H275Y</b></font></a></td>
            </tr></table>
            <font color="red">Reduced sensitivity or resistance to oseltamivir</font>
            <p>query to clade call <a href="../out/clade.txt">txt</a></p>
        </body></html>"#;

        let resolver = LinkResolver::new("https://host");
        let result = analyze(html, &resolver).unwrap();

        assert_eq!(result.mutations.records.len(), 1);
        assert_eq!(result.mutations.warnings.len(), 1);
        assert_eq!(
            result.reports.links[&ReportCategory::CladeCall].url,
            "https://host/out/clade.txt"
        );
        assert_eq!(result.reports.missing.len(), 3);
    }
}
