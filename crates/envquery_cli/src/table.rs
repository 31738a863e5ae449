use std::cmp::Ordering;
use std::fmt::Write as _;

use clap::ValueEnum;
use envquery::{NormalizedResult, QueryHistoryItem, VariableRecord};

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum SortKey {
    Name,
    Value,
    Confidence,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Stable sort; ties keep the order the agent returned them in.
pub fn sort_variables(variables: &mut [VariableRecord], key: SortKey, direction: SortDirection) {
    variables.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare(a: &VariableRecord, b: &VariableRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Value => a.value.to_lowercase().cmp(&b.value.to_lowercase()),
        SortKey::Confidence => a.confidence.rank().cmp(&b.confidence.rank()),
    }
}

pub fn render_result(result: &NormalizedResult) -> String {
    let mut out = String::new();
    if !result.query_interpretation.is_empty() {
        let _ = writeln!(out, "Interpretation: {}", result.query_interpretation);
    }
    if !result.message.is_empty() {
        let _ = writeln!(out, "Message: {}", result.message);
    }
    if result.variables.is_empty() {
        out.push_str("No matching variables.\n");
        return out;
    }

    let rows: Vec<[&str; 3]> = result
        .variables
        .iter()
        .map(|v| [v.name.as_str(), v.value.as_str(), v.confidence.as_str()])
        .collect();
    out.push_str(&render_rows(["NAME", "VALUE", "CONFIDENCE"], &rows));
    let _ = writeln!(
        out,
        "{} shown, {} found",
        result.variables.len(),
        result.total_found
    );
    out
}

pub fn render_history<'a>(items: impl IntoIterator<Item = &'a QueryHistoryItem>) -> String {
    let owned: Vec<[String; 3]> = items
        .into_iter()
        .map(|item| {
            [
                item.timestamp.to_string(),
                item.result_count.to_string(),
                item.query.clone(),
            ]
        })
        .collect();
    if owned.is_empty() {
        return "History is empty.\n".to_string();
    }
    let rows: Vec<[&str; 3]> = owned
        .iter()
        .map(|[ts, count, query]| [ts.as_str(), count.as_str(), query.as_str()])
        .collect();
    render_rows(["TIMESTAMP", "RESULTS", "QUERY"], &rows)
}

fn render_rows(header: [&str; 3], rows: &[[&str; 3]]) -> String {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use envquery::Confidence;

    fn var(name: &str, value: &str, confidence: Confidence) -> VariableRecord {
        VariableRecord {
            name: name.to_string(),
            value: value.to_string(),
            confidence,
        }
    }

    fn names(vars: &[VariableRecord]) -> Vec<&str> {
        vars.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn sorts_by_name_case_insensitively() {
        let mut vars = vec![
            var("path", "", Confidence::Low),
            var("HOME", "", Confidence::Low),
            var("Editor", "", Confidence::Low),
        ];
        sort_variables(&mut vars, SortKey::Name, SortDirection::Ascending);
        assert_eq!(names(&vars), ["Editor", "HOME", "path"]);
    }

    #[test]
    fn confidence_sort_is_stable_and_ranked() {
        let mut vars = vec![
            var("A", "", Confidence::Low),
            var("B", "", Confidence::High),
            var("C", "", Confidence::Medium),
            var("D", "", Confidence::High),
        ];
        sort_variables(&mut vars, SortKey::Confidence, SortDirection::Descending);
        assert_eq!(names(&vars), ["B", "D", "C", "A"]);
    }

    #[test]
    fn renders_aligned_table() {
        let result = NormalizedResult {
            query_interpretation: "web server".to_string(),
            variables: vec![
                var("PORT", "8080", Confidence::High),
                var("HOST_NAME", "not set", Confidence::Low),
            ],
            total_found: 5,
            message: String::new(),
        };
        let text = render_result(&result);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Interpretation: web server");
        assert_eq!(lines[1], "NAME       VALUE    CONFIDENCE");
        assert_eq!(lines[2], "PORT       8080     high");
        assert_eq!(lines[3], "HOST_NAME  not set  low");
        assert_eq!(lines[4], "2 shown, 5 found");
    }

    #[test]
    fn empty_result_says_so() {
        let text = render_result(&NormalizedResult::default());
        assert_eq!(text, "No matching variables.\n");
    }
}
