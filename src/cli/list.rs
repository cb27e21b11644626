use std::path::Path;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use registry::{storage::SearchHit, Command, Outcome, Persistence, Registry, StudentRecord};
use serde::Serialize;
use tracing::instrument;

use crate::cli::{open_registry, terminal};

/// Command arguments for `students list`.
#[derive(Debug, Parser)]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let registry = open_registry(root);
        render_all(&registry, self.output)
    }
}

/// Command arguments for `students search`.
#[derive(Debug, Parser)]
pub struct Search {
    /// Text to look for in name, student ID, email or contact number
    query: String,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Search {
    #[instrument(level = "debug", skip_all, fields(query = %self.query))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut registry = open_registry(root);

        let Outcome::Matches(indices) =
            registry.dispatch(Command::Search(self.query), |_| false)?
        else {
            anyhow::bail!("search returned an unexpected result");
        };

        let rows: Vec<Row<'_>> = indices
            .into_iter()
            .filter_map(|index| registry.get(index).map(|record| Row::new(index, record)))
            .collect();
        render(&rows, self.output)
    }
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One rendered record, keyed by its position in the full list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Row<'a> {
    index: usize,
    name: &'a str,
    student_id: &'a str,
    email: &'a str,
    contact: &'a str,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl<'a> Row<'a> {
    fn new(index: usize, record: &'a StudentRecord) -> Self {
        Self {
            index,
            name: record.name(),
            student_id: record.student_id(),
            email: record.email(),
            contact: record.contact(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        }
    }
}

impl<'a> From<SearchHit<'a>> for Row<'a> {
    fn from(hit: SearchHit<'a>) -> Self {
        Self::new(hit.index, hit.record)
    }
}

/// Renders every record in the registry.
pub fn render_all<P: Persistence>(
    registry: &Registry<P>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let rows: Vec<Row<'_>> = registry.find(|_| true).into_iter().map(Row::from).collect();
    render(&rows, output)
}

fn render(rows: &[Row<'_>], output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => print!("{}", format_table(rows, terminal::is_narrow())),
    }
    Ok(())
}

const HEADERS: [&str; 5] = ["#", "Name", "Student ID", "Email", "Contact"];

fn cells(row: &Row<'_>) -> [String; 5] {
    [
        row.index.to_string(),
        row.name.to_string(),
        row.student_id.to_string(),
        row.email.to_string(),
        row.contact.to_string(),
    ]
}

fn format_table(rows: &[Row<'_>], narrow: bool) -> String {
    use terminal::Colorize;

    if rows.is_empty() {
        return format!("{}\n", "No student records found.".dim());
    }

    let mut out = String::new();

    if narrow {
        for row in rows {
            out.push_str(&format!("{} {}\n", format!("#{}", row.index).info(), row.name));
            out.push_str(&format!("    {}  {}\n", row.student_id, row.email));
            out.push_str(&format!("    {}\n", row.contact));
        }
    } else {
        let body: Vec<[String; 5]> = rows.iter().map(cells).collect();
        let mut widths = HEADERS.map(str::len);
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = pad_line(HEADERS.map(String::from), widths);
        out.push_str(&format!("{}\n", header.dim()));
        for cells in body {
            out.push_str(&pad_line(cells, widths));
            out.push('\n');
        }
    }

    out.push_str(&format!("\nTotal: {}\n", rows.len()));
    out
}

fn pad_line(cells: [String; 5], widths: [usize; 5]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
