//! Custom assertions for display validation.
//!
//! Each returns `anyhow::Result` so failures carry what was actually shown.

use crate::RecordingSurface;
use anyhow::{Context, Result};
use livedisplay_engine::{ROWS, to_ascii};
use serde_json::Value;

fn describe_row(surface: &RecordingSurface, row: usize) -> String {
    to_ascii(surface.cells(row), '#', '.')
}

/// Assert that `row` shows exactly the rendering of `text`.
pub fn assert_row_shows(surface: &RecordingSurface, row: usize, text: &str) -> Result<()> {
    if !surface.shows(row, text) {
        anyhow::bail!(
            "Row {} does not show {:?}; it shows:\n{}",
            row,
            text,
            describe_row(surface, row)
        );
    }
    Ok(())
}

/// Assert that `row` has no lit cell.
pub fn assert_row_dark(surface: &RecordingSurface, row: usize) -> Result<()> {
    if !surface.is_dark(row) {
        anyhow::bail!("Row {} is not dark:\n{}", row, describe_row(surface, row));
    }
    Ok(())
}

pub fn assert_icon(surface: &RecordingSurface, row: usize, expected: &str) -> Result<()> {
    let icon = surface
        .icon(row)
        .with_context(|| format!("Row {} never received an icon", row))?;
    if icon != expected {
        anyhow::bail!("Row {} has icon {} but expected {}", row, icon, expected);
    }
    Ok(())
}

/// Assert that no cell of `row` changed more than `max` times.
pub fn assert_max_flips(surface: &RecordingSurface, row: usize, max: usize) -> Result<()> {
    for index in 0..surface.columns() * ROWS {
        let flips = surface.flips(row, index);
        if flips > max {
            anyhow::bail!("Cell {} of row {} changed {} times", index, row, flips);
        }
    }
    Ok(())
}

/// Assert that `cache show --format json` output lists `expected` entries.
pub fn assert_cache_entry_count(json: &Value, expected: usize) -> Result<()> {
    let entries = json["entries"]
        .as_array()
        .context("Expected 'entries' array in JSON")?;

    if entries.len() != expected {
        anyhow::bail!("Expected {} cache entries, got {}", expected, entries.len());
    }
    Ok(())
}
