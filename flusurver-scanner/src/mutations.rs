use crate::html::{Document, Node};
use crate::result::{DrugWarning, MutationExtraction, MutationRecord, RiskColor};
use tracing::debug;

/// Pseudo-link prefix FluSurver uses for anchors that trigger in-page actions.
pub const ACTION_HREF_PREFIX: &str = "javascript:";

/// Visible text of the per-mutation structure viewer link.
pub const STRUCTURE_LINK_TEXT: &str = "show in structure";

/// Phrase that marks a drug-sensitivity advisory block.
pub const DRUG_WARNING_PHRASE: &str = "Reduced sensitivity or resistance";

const COLOR_SELECTOR: &str = "font[color], span[color]";
const EMPHASIS_SELECTOR: &str = "b, strong, em, i";

/// Extracts mutation annotations and drug warnings from a response page.
///
/// Anchors that do not have the expected shape are skipped; the result is
/// never an error, only possibly empty.
pub fn extract_mutations(html: &str) -> MutationExtraction {
    if html.trim().is_empty() {
        return MutationExtraction::default();
    }

    let document = Document::parse(html);
    let records = extract_records(&document);
    let warnings = extract_drug_warnings(&document);

    debug!(
        "Extracted {} mutation(s) and {} drug warning(s)",
        records.len(),
        warnings.len()
    );

    MutationExtraction { records, warnings }
}

pub fn extract_records(document: &Document) -> Vec<MutationRecord> {
    document
        .find_all("a[href]")
        .into_iter()
        .filter(is_action_anchor)
        .filter_map(|anchor| record_from_anchor(&anchor))
        .collect()
}

pub fn extract_drug_warnings(document: &Document) -> Vec<DrugWarning> {
    document
        .find_all(COLOR_SELECTOR)
        .into_iter()
        .filter(|element| {
            element
                .attr("color")
                .is_some_and(|color| color.trim().eq_ignore_ascii_case("red"))
        })
        .map(|element| element.text())
        .filter(|text| text.contains(DRUG_WARNING_PHRASE))
        .map(|text| text.trim().to_string())
        .collect()
}

fn is_action_anchor(anchor: &Node<'_>) -> bool {
    anchor.attr("href").is_some_and(|href| {
        href.trim_start()
            .get(..ACTION_HREF_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ACTION_HREF_PREFIX))
    })
}

fn record_from_anchor(anchor: &Node<'_>) -> Option<MutationRecord> {
    let Some(colored) = anchor.find_first(COLOR_SELECTOR) else {
        debug!("Skipping action anchor without a colored element");
        return None;
    };
    let Some(emphasis) = anchor.find_first(EMPHASIS_SELECTOR) else {
        debug!("Skipping action anchor without mutation text");
        return None;
    };

    let name = emphasis.text();
    let name = name.trim();
    let raw_color = colored.attr("color").unwrap_or_default();
    let structure_link = structure_link_near(anchor);

    MutationRecord::new(name, RiskColor::from_attr(raw_color), structure_link)
        .map(|record| record.with_effect(raw_color))
}

/// Inline action of the "show in structure" link sharing the anchor's cell.
fn structure_link_near(anchor: &Node<'_>) -> Option<String> {
    let cell = anchor.ancestor("td")?;
    cell.find_all("a")
        .into_iter()
        .find(|a| a.text().trim() == STRUCTURE_LINK_TEXT)
        .and_then(|a| a.attr("onclick"))
        .map(str::to_string)
}
