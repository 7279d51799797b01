use serde_json::Value;

use crate::db::models::record::Record;
use crate::db::schema::{parse_date, FieldKind, Leaf, ResourceSchema, DATE_FORMAT};

pub const NO_DATE: &str = "No date";
pub const SIGNATURE: &str = "Signature: __________________________";

/// How records are laid out on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// One `Label: value` line per field, records separated by a blank line.
    Labeled,
    /// A header row followed by one row per record.
    Table,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    Title(String),
    Text(String),
    Blank,
    Header(Vec<String>),
    Row(Vec<String>),
    Signature(String),
}

/// The textual content of a report, independent of the PDF container.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

impl ReportLayout {
    pub fn build(schema: &ResourceSchema, records: &[Record], style: ReportStyle) -> Self {
        let leaves = schema.leaves();
        let mut lines = vec![ReportLine::Title(schema.title.to_string()), ReportLine::Blank];

        match style {
            ReportStyle::Labeled => {
                for record in records {
                    for leaf in &leaves {
                        lines.push(ReportLine::Text(format!(
                            "{}: {}",
                            leaf.label,
                            display_value(record, leaf)
                        )));
                    }
                    lines.push(ReportLine::Blank);
                }
            }
            ReportStyle::Table => {
                lines.push(ReportLine::Header(
                    leaves.iter().map(|leaf| leaf.label.to_string()).collect(),
                ));
                for record in records {
                    lines.push(ReportLine::Row(
                        leaves.iter().map(|leaf| display_value(record, leaf)).collect(),
                    ));
                }
                lines.push(ReportLine::Blank);
            }
        }

        lines.push(ReportLine::Signature(SIGNATURE.to_string()));
        Self {
            title: schema.title.to_string(),
            lines,
        }
    }

    /// Plain-text rendering; table cells are joined with ` | `.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                ReportLine::Title(s) | ReportLine::Text(s) | ReportLine::Signature(s) => out.push_str(s),
                ReportLine::Blank => {}
                ReportLine::Header(cells) | ReportLine::Row(cells) => out.push_str(&cells.join(" | ")),
            }
            out.push('\n');
        }
        out
    }
}

/// Formats one field of a record for display.
pub fn display_value(record: &Record, leaf: &Leaf) -> String {
    let value = record.get(&leaf.path);
    match leaf.kind {
        FieldKind::Date => value
            .and_then(Value::as_str)
            .and_then(parse_date)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| NO_DATE.to_string()),
        _ => match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => format_number(n),
            Some(other) => other.to_string(),
        },
    }
}

fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
