use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use overlap_match::SweepRow;
use overlap_model::MatchType;

use crate::commands::{MatchOutcome, SynonymOutcome};

const MATCH_TYPES: [MatchType; 4] = [
    MatchType::Exact,
    MatchType::Identifier,
    MatchType::Synonym,
    MatchType::FuzzyConsensus,
];

pub fn print_match_summary(outcome: &MatchOutcome) {
    let stats = &outcome.report.stats;
    println!("Overlaps: {} ({:?})", outcome.out.display(), outcome.format);
    if let Some(path) = &outcome.unmatched {
        println!("Unmatched: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Left records"), Cell::new(stats.left_records)]);
    table.add_row(vec![Cell::new("Right records"), Cell::new(stats.right_records)]);
    if stats.left_units != stats.left_records {
        table.add_row(vec![
            dim_cell("  -> exploded units"),
            Cell::new(stats.left_units),
        ]);
    }
    table.add_row(vec![
        Cell::new("Empty names excluded"),
        count_cell(stats.empty_left + stats.empty_right, Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Blocking keys"), Cell::new(stats.blocking_keys)]);
    table.add_row(vec![
        Cell::new("Candidate pairs"),
        Cell::new(stats.candidate_pairs),
    ]);
    table.add_row(vec![Cell::new("Passing pairs"), Cell::new(stats.passing_pairs)]);
    for match_type in MATCH_TYPES {
        let count = stats.by_type.get(&match_type).copied().unwrap_or(0);
        table.add_row(vec![
            dim_cell(format!("  -> {match_type}")),
            count_cell(count, Color::Green),
        ]);
    }
    table.add_row(vec![
        Cell::new("OVERLAPS")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(stats.overlaps).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Unmatched left"),
        count_cell(outcome.report.unmatched_left.len(), Color::Yellow),
    ]);
    println!("{table}");
}

pub fn print_sweep_table(rows: &[SweepRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Jaro-Winkler"),
        header_cell("Jaccard"),
        header_cell("Passing"),
        header_cell("Matches"),
        header_cell("Unique left"),
        header_cell("Unique right"),
    ]);
    apply_table_style(&mut table);
    for index in 0..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let best = rows.iter().map(|row| row.total_matches).max().unwrap_or(0);
    for row in rows {
        let matches = if row.total_matches == best && best > 0 {
            Cell::new(row.total_matches)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(row.total_matches)
        };
        table.add_row(vec![
            Cell::new(format!("{:.2}", row.thresholds.jaro_winkler)),
            Cell::new(format!("{:.2}", row.thresholds.jaccard)),
            Cell::new(row.passing_pairs),
            matches,
            Cell::new(row.unique_left),
            Cell::new(row.unique_right),
        ]);
    }
    println!("{table}");
}

pub fn print_synonym_summary(outcome: &SynonymOutcome) {
    println!(
        "Suggested {} synonym entries: {}",
        outcome.suggestions,
        outcome.out.display()
    );
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
