//! Terminal-independent state of the display and its text rendering.
//!
//! Each dot-matrix row is drawn with half blocks: two pixel rows per text
//! line, so a 7-pixel row takes 4 lines.

use livedisplay_engine::{ROWS, Settings};
use livedisplay_types::{PLACEHOLDER_ICON, Theme};
use std::path::Path;

/// Text lines used by one display row
pub const LINES_PER_ROW: usize = ROWS.div_ceil(2);

/// Columns left of the grid reserved for the icon label
pub const GUTTER_WIDTH: usize = 16;

#[derive(Debug, Clone, Default)]
struct RowView {
    cells: Vec<bool>,
    icon: String,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayView {
    columns: usize,
    rows: Vec<RowView>,
    theme: Theme,
    settings: Settings,
    dirty: bool,
}

impl DisplayView {
    pub fn new() -> Self {
        Self::default()
    }

    fn row_mut(&mut self, row: usize) -> &mut RowView {
        while self.rows.len() <= row {
            self.rows.push(RowView {
                cells: vec![false; self.columns * ROWS],
                icon: String::new(),
            });
        }
        &mut self.rows[row]
    }

    pub fn set_cell(&mut self, row: usize, index: usize, on: bool) {
        if let Some(cell) = self.row_mut(row).cells.get_mut(index) {
            *cell = on;
        }
        self.dirty = true;
    }

    pub fn set_icon(&mut self, row: usize, icon: &str) {
        self.row_mut(row).icon = icon.to_string();
        self.dirty = true;
    }

    /// Same flat-index-preserving resize as the engine's grids
    pub fn resize(&mut self, columns: usize) {
        self.columns = columns;
        for row in &mut self.rows {
            row.cells.resize(columns * ROWS, false);
        }
        self.dirty = true;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.dirty = true;
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.dirty = true;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether anything changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Text lines for `row`'s pixels
    pub fn pixel_lines(&self, row: usize) -> Vec<String> {
        let cells = self
            .rows
            .get(row)
            .map(|r| r.cells.as_slice())
            .unwrap_or(&[]);
        let lit = |column: usize, pixel_row: usize| {
            pixel_row < ROWS && cells.get(column * ROWS + pixel_row) == Some(&true)
        };

        (0..LINES_PER_ROW)
            .map(|line| {
                (0..self.columns)
                    .map(|column| match (lit(column, line * 2), lit(column, line * 2 + 1)) {
                        (true, true) => '█',
                        (true, false) => '▀',
                        (false, true) => '▄',
                        (false, false) => ' ',
                    })
                    .collect()
            })
            .collect()
    }

    pub fn icon_label(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|r| icon_label(&r.icon))
            .unwrap_or_default()
    }
}

/// Short name for an icon location: its file stem, truncated to the gutter.
pub fn icon_label(icon: &str) -> String {
    if icon.is_empty() || icon == PLACEHOLDER_ICON {
        return String::new();
    }
    let stem = Path::new(icon)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| icon.to_string());
    stem.chars().take(GUTTER_WIDTH - 2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedisplay_engine::render;

    #[test]
    fn test_half_block_rows() {
        let mut view = DisplayView::new();
        view.resize(2);
        // column 0: pixel rows 0, 1 and 6
        view.set_cell(0, 0, true);
        view.set_cell(0, 1, true);
        view.set_cell(0, 6, true);
        // column 1: pixel row 3
        view.set_cell(0, ROWS + 3, true);

        let lines = view.pixel_lines(0);
        assert_eq!(lines, vec!["█ ", " ▄", "  ", "▀ "]);
    }

    #[test]
    fn test_rendered_text_fills_lines() {
        let mut view = DisplayView::new();
        let stream = render("I");
        view.resize(stream.len() / ROWS);
        for (index, on) in stream.iter().enumerate() {
            view.set_cell(1, index, *on);
        }
        let lines = view.pixel_lines(1);
        assert_eq!(lines.len(), LINES_PER_ROW);
        assert!(lines.iter().all(|l| l.chars().count() == view.columns));
        assert!(view.pixel_lines(0).iter().all(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_icon_label() {
        assert_eq!(icon_label("./img/weather/c01d.png"), "c01d");
        assert_eq!(icon_label(PLACEHOLDER_ICON), "");
        assert_eq!(icon_label(""), "");
        let long = icon_label("./img/a-really-long-icon-name.svg");
        assert_eq!(long.chars().count(), 14);
    }

    #[test]
    fn test_resize_keeps_cells_and_marks_dirty() {
        let mut view = DisplayView::new();
        view.resize(3);
        view.set_cell(0, 2, true);
        assert!(view.take_dirty());
        assert!(!view.take_dirty());

        view.resize(1);
        view.resize(3);
        assert!(view.take_dirty());
        assert_eq!(view.pixel_lines(0)[1].chars().next(), Some('▀'));
    }
}
