//! Table rendering for trials and comparisons.

use std::fmt::Write as _;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use trial_model::{
    EventCategory, FormattedOutcome, FormattedSafety, FullTrialData, TrialComparison,
    WarningCategory,
};

use crate::commands::SourcedWarning;

/// Shown in place of result tables for trials without posted results.
pub const NO_RESULTS_MESSAGE: &str = "No results posted yet";

pub fn render_trial(trial: &FullTrialData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", trial.nct_id, trial.title);
    let _ = writeln!(
        out,
        "Status: {} | Phase: {} | Sponsor: {} | Enrollment: {} | Completed: {}",
        trial.status,
        trial.phase.as_deref().unwrap_or("-"),
        trial.sponsor.as_deref().unwrap_or("-"),
        trial
            .enrollment
            .map_or_else(|| "-".to_string(), |n| n.to_string()),
        trial.completion_date.as_deref().unwrap_or("-"),
    );

    if !trial.arms.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Arm"),
            header_cell("Type"),
            header_cell("Intervention"),
            header_cell("N"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 3, CellAlignment::Right);
        for arm in &trial.arms {
            table.add_row(vec![
                Cell::new(&arm.title)
                    .fg(Color::Blue)
                    .add_attribute(Attribute::Bold),
                optional_cell(arm.arm_type.as_deref()),
                optional_cell(arm.intervention.as_deref()),
                count_cell(arm.n),
            ]);
        }
        let _ = writeln!(out, "\nArms:\n{table}");
    }

    if !trial.has_results {
        let _ = writeln!(out, "\n{NO_RESULTS_MESSAGE}");
        return out;
    }

    for (label, outcomes) in [
        ("Primary outcomes", &trial.primary_outcomes),
        ("Secondary outcomes", &trial.secondary_outcomes),
    ] {
        if !outcomes.is_empty() {
            let _ = writeln!(out, "\n{label}:\n{}", outcome_table(outcomes));
        }
    }

    if let Some(safety) = &trial.safety {
        out.push_str(&render_safety(safety));
    }
    out
}

fn outcome_table(outcomes: &[FormattedOutcome]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Outcome"),
        header_cell("Arm"),
        header_cell("Value"),
        header_cell("95% CI"),
        header_cell("N"),
        header_cell("p-value"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for outcome in outcomes {
        let title = match &outcome.units {
            Some(units) => format!("{} ({units})", outcome.title),
            None => outcome.title.clone(),
        };
        if outcome.results.is_empty() {
            table.add_row(vec![
                Cell::new(title),
                dim_cell("-"),
                dim_cell("not reported"),
                dim_cell("-"),
                dim_cell("-"),
                p_value_cell(outcome),
            ]);
            continue;
        }
        for (index, result) in outcome.results.iter().enumerate() {
            let first = index == 0;
            table.add_row(vec![
                if first {
                    Cell::new(&title)
                } else {
                    Cell::new("")
                },
                Cell::new(&result.arm_title),
                Cell::new(&result.value),
                match &result.ci {
                    Some(ci) => Cell::new(format!("{} to {}", ci.lower, ci.upper)),
                    None => dim_cell("-"),
                },
                count_cell(result.n),
                if first {
                    p_value_cell(outcome)
                } else {
                    Cell::new("")
                },
            ]);
        }
    }
    table
}

fn render_safety(safety: &FormattedSafety) -> String {
    let mut out = String::new();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Arm"),
        header_cell("Serious"),
        header_cell("Other"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for arm in &safety.arms {
        table.add_row(vec![
            Cell::new(&arm.title),
            Cell::new(format!(
                "{}/{}",
                arm.serious_num_affected, arm.serious_num_at_risk
            )),
            Cell::new(format!("{}/{}", arm.other_num_affected, arm.other_num_at_risk)),
        ]);
    }
    let time_frame = safety
        .time_frame
        .as_deref()
        .map(|tf| format!(" ({tf})"))
        .unwrap_or_default();
    if !safety.arms.is_empty() {
        let _ = writeln!(out, "\nAdverse events{time_frame}:\n{table}");
    }

    for category in [EventCategory::Serious, EventCategory::Other] {
        let events = safety.events(category);
        if events.is_empty() {
            continue;
        }
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Event"),
            header_cell("Organ system"),
            header_cell("Affected"),
            header_cell("Rate"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 3, CellAlignment::Right);
        for event in events {
            table.add_row(vec![
                Cell::new(&event.term),
                optional_cell(event.organ_system.as_deref()),
                Cell::new(event.total_affected()),
                rate_cell(event.overall_rate),
            ]);
        }
        let _ = writeln!(out, "\n{} adverse events:\n{table}", capitalize(category.as_str()));
    }
    out
}

pub fn render_comparison(comparison: &TrialComparison) -> String {
    let mut out = String::new();
    let ids: Vec<&str> = comparison
        .populations
        .iter()
        .map(|p| p.nct_id.as_str())
        .collect();

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Trial"),
        header_cell("Enrollment"),
        header_cell("Arms"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for population in &comparison.populations {
        table.add_row(vec![
            Cell::new(&population.nct_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(population.enrollment),
            Cell::new(population.arms.join("\n")),
        ]);
    }
    let _ = writeln!(out, "Populations:\n{table}");

    if !comparison.primary_endpoints.is_empty() {
        let mut table = comparison_table("Primary endpoint", &ids);
        for row in &comparison.primary_endpoints {
            let mut cells = vec![Cell::new(&row.endpoint).add_attribute(Attribute::Bold)];
            cells.extend(ids.iter().map(|id| match row.value_for(id) {
                Some(value) => {
                    let mut text = value.value.clone();
                    if let Some(units) = &value.units {
                        let _ = write!(text, " {units}");
                    }
                    if let Some(p) = &value.p_value {
                        let _ = write!(text, "\np={p}");
                    }
                    let cell = Cell::new(text);
                    if value.significant == Some(true) {
                        cell.fg(Color::Green)
                    } else {
                        cell
                    }
                }
                None => dim_cell("not reported"),
            }));
            table.add_row(cells);
        }
        let _ = writeln!(out, "\nPrimary endpoints:\n{table}");
    }

    if !comparison.safety_highlights.is_empty() {
        let mut table = comparison_table("Adverse event", &ids);
        for highlight in &comparison.safety_highlights {
            let mut cells = vec![Cell::new(format!(
                "{} ({})",
                highlight.event, highlight.category
            ))];
            cells.extend(ids.iter().map(|id| match highlight.rate_for(id) {
                Some(rate) => rate_cell(rate),
                None => dim_cell("not reported"),
            }));
            table.add_row(cells);
        }
        let _ = writeln!(out, "\nCommon adverse events:\n{table}");
    }

    if !comparison.endpoint_differences.is_empty() {
        let _ = writeln!(out, "\nComparability notes:");
        for note in &comparison.endpoint_differences {
            let _ = writeln!(out, "- {note}");
        }
    }
    out
}

fn comparison_table(first_header: &str, ids: &[&str]) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell(first_header)];
    header.extend(ids.iter().map(|id| header_cell(id)));
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=ids.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table
}

/// Warnings table, or `None` when there is nothing to report.
pub fn render_warnings(warnings: &[SourcedWarning]) -> Option<String> {
    if warnings.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Area"),
        header_cell("Message"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    for sourced in warnings {
        table.add_row(vec![
            Cell::new(&sourced.source),
            area_cell(sourced.warning.category()),
            Cell::new(sourced.warning.message()),
        ]);
    }
    Some(format!("Data quality warnings:\n{table}"))
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn area_cell(category: WarningCategory) -> Cell {
    match category {
        WarningCategory::Alignment => Cell::new(category.label()).fg(Color::Magenta),
        WarningCategory::Safety => Cell::new(category.label()).fg(Color::Red),
        WarningCategory::Arms | WarningCategory::Outcomes => {
            Cell::new(category.label()).fg(Color::Yellow)
        }
    }
}

fn p_value_cell(outcome: &FormattedOutcome) -> Cell {
    match outcome.p_value() {
        Some(p) if outcome.is_significant() => Cell::new(p)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(p) => Cell::new(p),
        None => dim_cell("-"),
    }
}

fn rate_cell(rate: f64) -> Cell {
    Cell::new(format!("{rate:.1}%"))
}

fn count_cell(count: Option<u64>) -> Cell {
    match count {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
