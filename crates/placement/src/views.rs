//! Table views over the fetched lists: aligned text for the terminal, CSV for export, JSON for
//! scripting.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use serde_json::Value;

use crate::pagination::Page;
use crate::wire::{format_time, DATE_FORMAT};
use crate::workflows::applications::{Application, Interview};
use crate::workflows::directory::{Account, Company, InternshipPosition, Student, UnknownVariant};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to flush output: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(UnknownVariant::new("output format", value)),
        }
    }
}

/// A record that can be shown as one table row.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

/// Headers plus already formatted cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows<T: TableRow>(rows: &[T]) -> Self {
        Self {
            headers: T::HEADERS.iter().map(|header| header.to_string()).collect(),
            rows: rows.iter().map(TableRow::cells).collect(),
        }
    }

    /// Append a column computed outside the record, e.g. the actions offered per row.
    pub fn with_column(mut self, header: &str, cells: Vec<String>) -> Self {
        self.headers.push(header.to_string());
        let mut cells = cells.into_iter();
        for row in &mut self.rows {
            row.push(cells.next().unwrap_or_default());
        }
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> Result<String, ViewError> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ViewError::Io(err.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "(no rows)");
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        write_line(f, &rule, &widths)?;
        for row in &self.rows {
            write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(f, "{}", line.trim_end())
}

/// Render rows in the requested format.
pub fn render<T>(rows: &[T], format: OutputFormat) -> Result<String, ViewError>
where
    T: TableRow + Serialize,
{
    render_table(Table::from_rows(rows), rows, format)
}

/// Render a prepared table; JSON output still serializes the records themselves.
pub fn render_table<T: Serialize>(
    table: Table,
    rows: &[T],
    format: OutputFormat,
) -> Result<String, ViewError> {
    match format {
        OutputFormat::Table => Ok(table.to_string()),
        OutputFormat::Csv => table.to_csv(),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)? + "\n"),
    }
}

/// Pager line under a table, e.g. `page 2 of 3 (12 rows)  [1] <2> [3]`. Empty when there are
/// no pages.
pub fn page_footer<T>(page: &Page<'_, T>) -> String {
    if page.count == 0 {
        return String::new();
    }
    let buttons = (1..=page.count)
        .map(|number| {
            if number == page.number {
                format!("<{number}>")
            } else {
                format!("[{number}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "page {} of {} ({} rows)  {}",
        page.number, page.count, page.total, buttons
    )
}

fn date_cell(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn time_cell(value: Option<NaiveTime>) -> String {
    value
        .map(format_time)
        .unwrap_or_default()
}

fn details_cell(extra: &std::collections::BTreeMap<String, Value>) -> String {
    extra
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl TableRow for Application {
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Student ID",
        "Position ID",
        "Status",
        "Interview Date",
        "Interview Time",
        "Interview Location",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.student_id.to_string(),
            self.position_id.to_string(),
            self.status.to_string(),
            date_cell(self.interview_date),
            time_cell(self.interview_time),
            self.interview_location.clone().unwrap_or_default(),
        ]
    }
}

impl TableRow for Interview {
    const HEADERS: &'static [&'static str] = &[
        "Application ID",
        "Student ID",
        "Position ID",
        "Date",
        "Time",
        "Location",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.student_id.to_string(),
            self.position_id.to_string(),
            date_cell(self.interview_date),
            time_cell(self.interview_time),
            self.interview_location.clone().unwrap_or_default(),
        ]
    }
}

impl TableRow for InternshipPosition {
    const HEADERS: &'static [&'static str] =
        &["ID", "Company ID", "Title", "Description", "Slots", "Status"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.company_id.to_string(),
            self.title.clone(),
            self.description.clone(),
            self.slots.to_string(),
            self.status.label().to_string(),
        ]
    }
}

impl TableRow for Account {
    const HEADERS: &'static [&'static str] = &["ID", "Username", "Email", "Role"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.email.clone(),
            self.role.to_string(),
        ]
    }
}

impl TableRow for Company {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Details"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            details_cell(&self.extra),
        ]
    }
}

impl TableRow for Student {
    const HEADERS: &'static [&'static str] = &["ID", "Full Name", "Details"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.clone(),
            details_cell(&self.extra),
        ]
    }
}
