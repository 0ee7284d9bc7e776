// Tests for the mutation table export

use flusurver_core::export::{PLACEHOLDER, TSV_HEADER, render_tsv, write_tsv};
use flusurver_scanner::result::{MutationRecord, RiskColor};
use std::fs;
use tempfile::TempDir;

fn record(name: &str, color: RiskColor, structure: Option<&str>) -> MutationRecord {
    MutationRecord::new(name, color, structure.map(str::to_string)).expect("non-empty name")
}

fn sample_records() -> Vec<MutationRecord> {
    vec![
        record("NA_H275Y", RiskColor::Red, Some("jmolScript('select 275')")),
        record("HA_D222G", RiskColor::Orange, None),
        record("M1", RiskColor::Green, None),
    ]
}

// ============================================================================
// Table shape
// ============================================================================

#[test]
fn test_header_only_for_no_records() {
    let table = render_tsv(&[], &[]);
    assert_eq!(table, "Protein\tMutation\tEffect\tStructure Link\tDrug Warning\n");
}

#[test]
fn test_one_line_per_record_plus_header() {
    let records = sample_records();
    let table = render_tsv(&records, &["w1".to_string()]);

    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), records.len() + 1);
    assert_eq!(lines[0], TSV_HEADER.join("\t"));
    assert!(table.ends_with('\n'));
    for line in &lines {
        assert_eq!(line.split('\t').count(), 5);
    }
}

#[test]
fn test_row_fields_follow_record() {
    let table = render_tsv(&sample_records(), &[]);
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(
        lines[1],
        "NA\tNA_H275Y\tred\tjmolScript('select 275')\tN/A"
    );
    assert_eq!(lines[2], "HA\tHA_D222G\torange\tN/A\tN/A");
    assert_eq!(lines[3], "M1\tM1\tgreen\tN/A\tN/A");
}

#[test]
fn test_rows_keep_extraction_order() {
    let records = vec![
        record("PB2_E627K", RiskColor::Green, None),
        record("HA_A1B", RiskColor::Green, None),
        record("NS1_P42S", RiskColor::Green, None),
    ];
    let table = render_tsv(&records, &[]);
    let names: Vec<&str> = table
        .lines()
        .skip(1)
        .map(|line| line.split('\t').nth(1).unwrap())
        .collect();
    assert_eq!(names, vec!["PB2_E627K", "HA_A1B", "NS1_P42S"]);
}

// ============================================================================
// Drug warnings
// ============================================================================

#[test]
fn test_red_rows_carry_all_warnings() {
    let warnings = vec!["w1".to_string(), "w2".to_string()];
    let records = vec![
        record("NA_H275Y", RiskColor::Red, None),
        record("HA_Q226L", RiskColor::Green, None),
        record("NA_I223R", RiskColor::Red, None),
    ];

    let table = render_tsv(&records, &warnings);
    let warning_column: Vec<&str> = table
        .lines()
        .skip(1)
        .map(|line| line.split('\t').nth(4).unwrap())
        .collect();

    assert_eq!(warning_column, vec!["w1; w2", PLACEHOLDER, "w1; w2"]);
}

#[test]
fn test_unknown_color_written_raw() {
    let records = vec![record("PA_I38T", RiskColor::Unknown("#ff00ff".to_string()), None)];
    let table = render_tsv(&records, &["w".to_string()]);
    assert_eq!(table.lines().nth(1), Some("PA\tPA_I38T\t#ff00ff\tN/A\tN/A"));
}

#[test]
fn test_effect_column_keeps_color_as_written() {
    let records = vec![record("NA_H275Y", RiskColor::Red, None).with_effect("RED")];
    let table = render_tsv(&records, &["w1".to_string()]);
    // Still red for the warning column
    assert_eq!(table.lines().nth(1), Some("NA\tNA_H275Y\tRED\tN/A\tw1"));
}

#[test]
fn test_embedded_tabs_and_newlines_do_not_break_columns() {
    let warnings = vec!["Reduced sensitivity\tor\nresistance".to_string()];
    let records = vec![record("NA_H275Y", RiskColor::Red, Some("a\tb"))];

    let table = render_tsv(&records, &warnings);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[1],
        "NA\tNA_H275Y\tred\ta b\tReduced sensitivity or resistance"
    );
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_write_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mutations.tsv");
    let records = sample_records();
    let warnings = vec!["w1".to_string()];

    write_tsv(&path, &records, &warnings).unwrap();
    let first = fs::read(&path).unwrap();
    write_tsv(&path, &records, &warnings).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(String::from_utf8(first).unwrap(), render_tsv(&records, &warnings));
}

#[test]
fn test_write_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("mutations.tsv");
    assert!(write_tsv(&path, &sample_records(), &[]).is_err());
}
