//! Chart-data parsing and the chart-versus-table heuristic.
//!
//! Two inputs can become charts: free text (a paragraph or code block holding
//! CSV or a JSON object) and Markdown tables whose value columns are mostly
//! numeric. Both paths coerce non-numeric cells to `0` so every dataset keeps
//! exactly one value per label.

use crate::model::{ChartData, ChartType, Dataset};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Share of numeric value cells a table must exceed to render as a chart.
pub const CHART_TABLE_THRESHOLD: f64 = 0.8;

/// Chart content recovered from text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChart {
    /// Chart kind named by the source, if any.
    pub chart_type: Option<ChartType>,
    /// Title named by the source, if any.
    pub title: Option<String>,
    /// Labels and datasets.
    pub data: ChartData,
}

/// Shape of text that matched chart-data detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSource {
    /// A JSON object.
    Json,
    /// Comma-separated rows with a header line.
    Csv,
}

/// Errors raised when detected chart data cannot be converted.
#[derive(Debug, Error, PartialEq)]
pub enum ChartDataError {
    /// JSON object without the `labels`/`datasets` shape.
    #[error("invalid chart JSON: {0}")]
    InvalidJson(String),
    /// Text is neither a JSON object nor CSV.
    #[error("text is not CSV or JSON chart data")]
    NotChartData,
}

/// Returns how `text` matches chart-data detection, or `None`.
///
/// JSON matches when the text parses as an object. CSV matches when there is
/// a header and at least one data line, the header has a column besides the
/// label column, every non-empty line has the header's field count, and at
/// least one value cell is numeric.
pub fn detect_chart_data(text: &str) -> Option<ChartSource> {
    let trimmed = text.trim();
    if trimmed.starts_with('{')
        && matches!(
            serde_json::from_str::<JsonValue>(trimmed),
            Ok(JsonValue::Object(_))
        )
    {
        return Some(ChartSource::Json);
    }

    let rows = csv_rows(trimmed)?;
    let any_numeric = rows[1..]
        .iter()
        .flat_map(|row| row.iter().skip(1))
        .any(|cell| parse_number(cell).is_some());
    any_numeric.then_some(ChartSource::Csv)
}

/// Parses chart data from CSV or JSON text.
///
/// Text starting with `{` is read as a JSON chart object. Anything else must
/// be well-shaped CSV; value cells that are not numbers become `0`. Unlike
/// [`detect_chart_data`], no numeric cell is required, so callers that
/// already know the text is chart data (a `csv` fence) get a chart.
pub fn parse_chart_data(text: &str) -> Result<ParsedChart, ChartDataError> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return parse_json_chart(trimmed);
    }

    let rows = csv_rows(trimmed).ok_or(ChartDataError::NotChartData)?;
    Ok(ParsedChart {
        chart_type: None,
        title: None,
        data: columns_to_chart(&rows[0], &rows[1..]),
    })
}

#[derive(Deserialize)]
struct JsonChart {
    #[serde(default, rename = "type", alias = "chartType")]
    chart_type: Option<ChartType>,
    #[serde(default)]
    title: Option<String>,
    labels: Vec<JsonValue>,
    datasets: Vec<JsonDataset>,
}

#[derive(Deserialize)]
struct JsonDataset {
    label: String,
    data: Vec<JsonValue>,
}

fn parse_json_chart(text: &str) -> Result<ParsedChart, ChartDataError> {
    let chart: JsonChart =
        serde_json::from_str(text).map_err(|err| ChartDataError::InvalidJson(err.to_string()))?;

    let labels = chart.labels.iter().map(json_label).collect();
    let datasets = chart
        .datasets
        .into_iter()
        .map(|dataset| Dataset {
            label: dataset.label,
            data: dataset.data.iter().map(json_number).collect(),
        })
        .collect();

    Ok(ParsedChart {
        chart_type: chart.chart_type,
        title: chart.title,
        data: ChartData { labels, datasets },
    })
}

fn json_label(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_number(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Number(n) => n.as_f64().unwrap_or(0.0),
        JsonValue::String(s) => parse_number(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Header plus data lines with one shared field count of at least two.
fn csv_rows(text: &str) -> Option<Vec<Vec<String>>> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(split_csv_line)
        .collect();

    let width = rows.first()?.len();
    if rows.len() < 2 || width < 2 {
        return None;
    }
    if rows.iter().any(|row| row.len() != width) {
        return None;
    }
    Some(rows)
}

/// Splits one CSV line, honouring double-quoted fields with `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Parses a cell as a number, tolerating currency prefixes, `%` suffixes and
/// thousands separators. Non-finite values are rejected.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    let unsigned = trimmed.trim_start_matches(['$', '€', '£', '¥']);
    let unsuffixed = unsigned.strip_suffix('%').unwrap_or(unsigned).trim();
    if unsuffixed.is_empty() {
        return None;
    }

    let digits: String = unsuffixed.chars().filter(|c| *c != ',').collect();
    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Decides whether a Markdown table should render as a chart.
///
/// True when more than [`CHART_TABLE_THRESHOLD`] of the cells after the
/// first column parse as numbers. Tables with no value cells never qualify.
pub fn is_chart_table(headers: &[String], rows: &[Vec<String>]) -> bool {
    if headers.len() < 2 {
        return false;
    }

    let mut total = 0usize;
    let mut numeric = 0usize;
    for row in rows {
        for cell in row.iter().skip(1) {
            total += 1;
            if parse_number(cell).is_some() {
                numeric += 1;
            }
        }
    }

    total > 0 && (numeric as f64 / total as f64) > CHART_TABLE_THRESHOLD
}

/// Builds chart data column-wise: the first column supplies labels and each
/// remaining header names one dataset.
pub fn columns_to_chart(headers: &[String], rows: &[Vec<String>]) -> ChartData {
    let labels = rows
        .iter()
        .map(|row| row.first().cloned().unwrap_or_default())
        .collect();

    let datasets = headers
        .iter()
        .enumerate()
        .skip(1)
        .map(|(column, header)| Dataset {
            label: header.clone(),
            data: rows
                .iter()
                .map(|row| {
                    row.get(column)
                        .and_then(|cell| parse_number(cell))
                        .unwrap_or(0.0)
                })
                .collect(),
        })
        .collect();

    ChartData { labels, datasets }
}
