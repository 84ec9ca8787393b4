//! Fixed-width survey microdata parsing driven by a SAS input layout.
//!
//! The layout file documents each column as an `@`-prefixed line:
//!
//! ```text
//! @0005 UPA $9. /* Unidade primária de amostragem */
//! ```
//!
//! carrying the 1-based start position, the column name, a `$`-wrapped width
//! and a comment with the column label.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    /// 0-based byte offset into each data line.
    pub start: usize,
    pub name: String,
    pub width: usize,
    pub label: String,
}

/// Parse the SAS input layout into column specs, in layout order.
pub fn parse_sas_layout(path: &Path) -> Result<Vec<ColumnSpec>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_sas_layout_str(&content)
}

fn parse_sas_layout_str(content: &str) -> Result<Vec<ColumnSpec>> {
    let mut columns = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if !line.starts_with('@') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let start_tok = parts.next().unwrap_or("");
        let name = parts.next().context("layout line missing column name")?;
        let width_tok = parts.next().context("layout line missing column width")?;
        let label = parts.collect::<Vec<_>>().join(" ");
        let label = label
            .trim_start_matches("/*")
            .trim_end_matches("*/")
            .trim();

        let start: usize = start_tok
            .trim_start_matches('@')
            .parse()
            .with_context(|| format!("bad start position in `{line}`"))?;
        let width: usize = width_tok
            .trim_start_matches('$')
            .trim_end_matches('.')
            .parse()
            .with_context(|| format!("bad width in `{line}`"))?;

        columns.push(ColumnSpec {
            start: start - 1, // layout positions are 1-based
            name: name.to_string(),
            width,
            label: label.to_string(),
        });
    }
    Ok(columns)
}

/// Slice one data line per the column specs. Slices past the end of the line
/// yield empty fields; short lines are tolerated, matching the source data.
pub fn split_line(line: &str, columns: &[ColumnSpec]) -> Vec<String> {
    columns
        .iter()
        .map(|col| {
            let end = (col.start + col.width).min(line.len());
            line.get(col.start..end).unwrap_or("").to_string()
        })
        .collect()
}

/// Read an entire fixed-width data file into rows, with a progress bar over
/// a pre-counted line total.
pub fn read_fixed_width(path: &Path, columns: &[ColumnSpec]) -> Result<Vec<Vec<String>>> {
    let total = count_lines(path)?;
    info!("Reading {} lines from {}", total, path.display());

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::with_capacity(total as usize);
    for line in reader.lines() {
        let line = line?;
        rows.push(split_line(&line, columns));
        pb.inc(1);
    }
    pb.finish();
    Ok(rows)
}

/// Export rows as CSV with a header row of column names.
pub fn write_csv(path: &Path, columns: &[ColumnSpec], rows: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer.write_record(columns.iter().map(|c| c.name.as_str()))?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn count_lines(path: &Path) -> Result<u64> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut lines = 0u64;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        lines += buf.iter().filter(|&&b| b == b'\n').count() as u64;
        let len = buf.len();
        reader.consume(len);
    }
    Ok(lines)
}
