use std::time::Duration;

use anyhow::Result;
use arrow_array::RecordBatch;
use clap::ValueEnum;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Color,
    ContentArrangement, Table,
};
use gizmosqlline_client::arrow::format_column;
use gizmosqlline_client::QueryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Tsv,
}

/// Render a result set in `format`. Returns an empty string when the result
/// has no columns.
pub fn render_result(result: &QueryResult, format: OutputFormat) -> Result<String> {
    let header: Vec<String> = result
        .schema
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();
    if header.is_empty() {
        return Ok(String::new());
    }
    let rows = collect_rows(&result.batches)?;

    Ok(match format {
        OutputFormat::Table => render_table(&header, &rows),
        OutputFormat::Csv => render_delimited(&header, &rows, ',', quote_csv),
        OutputFormat::Tsv => render_delimited(&header, &rows, '\t', escape_tsv),
    })
}

fn collect_rows(batches: &[RecordBatch]) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for batch in batches {
        let columns = batch
            .columns()
            .iter()
            .map(|column| format_column(column.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for row_idx in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row_idx].clone()).collect());
        }
    }
    Ok(rows)
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let header_cells: Vec<Cell> = header
        .iter()
        .map(|name| {
            Cell::new(name)
                .fg(Color::Cyan)
                .set_alignment(CellAlignment::Center)
        })
        .collect();
    table.set_header(header_cells);
    for row in rows {
        table.add_row(row.clone());
    }
    table.to_string()
}

fn render_delimited(
    header: &[String],
    rows: &[Vec<String>],
    delimiter: char,
    escape: fn(&str) -> String,
) -> String {
    let separator = delimiter.to_string();
    std::iter::once(header)
        .chain(rows.iter().map(Vec::as_slice))
        .map(|fields| {
            fields
                .iter()
                .map(|field| escape(field))
                .collect::<Vec<_>>()
                .join(&separator)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_tsv(field: &str) -> String {
    field
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// `3 rows selected (0.012 seconds)`
pub fn rows_selected(rows: usize, elapsed: Duration) -> String {
    match rows {
        0 => format!("No rows selected ({:.3} seconds)", elapsed.as_secs_f64()),
        1 => format!("1 row selected ({:.3} seconds)", elapsed.as_secs_f64()),
        n => format!("{n} rows selected ({:.3} seconds)", elapsed.as_secs_f64()),
    }
}

/// `2 rows affected (0.004 seconds)`. Servers report unknown counts as
/// `None` or a negative number.
pub fn rows_affected(rows: Option<i64>, elapsed: Duration) -> String {
    match rows {
        Some(1) => format!("1 row affected ({:.3} seconds)", elapsed.as_secs_f64()),
        Some(n) if n > 0 => format!("{n} rows affected ({:.3} seconds)", elapsed.as_secs_f64()),
        _ => format!("No rows affected ({:.3} seconds)", elapsed.as_secs_f64()),
    }
}
