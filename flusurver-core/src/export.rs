// Tab-separated export of extracted mutations

use flusurver_scanner::result::{DrugWarning, MutationRecord};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const TSV_HEADER: [&str; 5] = [
    "Protein",
    "Mutation",
    "Effect",
    "Structure Link",
    "Drug Warning",
];

/// Written in place of an absent value.
pub const PLACEHOLDER: &str = "N/A";

/// Renders the mutation table. Every red mutation carries all drug warnings
/// of the document, other colors get the placeholder.
pub fn render_tsv(records: &[MutationRecord], warnings: &[DrugWarning]) -> String {
    let mut table = String::new();
    table.push_str(&TSV_HEADER.join("\t"));
    table.push('\n');

    let joined_warnings = if warnings.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        warnings.join("; ")
    };

    for record in records {
        let drug_warning = if record.risk_color.is_red() {
            joined_warnings.as_str()
        } else {
            PLACEHOLDER
        };

        let row = [
            record.protein.as_str(),
            record.name.as_str(),
            record.effect.as_str(),
            record.structure_link.as_deref().unwrap_or(PLACEHOLDER),
            drug_warning,
        ];

        let fields: Vec<String> = row.iter().map(|field| sanitize_field(field)).collect();
        table.push_str(&fields.join("\t"));
        table.push('\n');
    }

    table
}

/// Writes the whole table with a single write call.
pub fn write_tsv(
    path: &Path,
    records: &[MutationRecord],
    warnings: &[DrugWarning],
) -> std::io::Result<()> {
    let table = render_tsv(records, warnings);
    let mut file = File::create(path)?;
    file.write_all(table.as_bytes())?;
    Ok(())
}

/// Tabs and line breaks would shift columns, so they become spaces.
fn sanitize_field(field: &str) -> String {
    field
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}
