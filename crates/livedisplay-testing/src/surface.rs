//! In-memory display surface.

use livedisplay_engine::layout::{RESERVED_UNITS, UNIT_PER_HEIGHT};
use livedisplay_engine::{DisplaySurface, ROWS, render};
use livedisplay_types::Theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Cell { row: usize, index: usize, on: bool },
    Icon { row: usize, icon: String },
    Columns(usize),
    Theme(Theme),
}

/// Mirrors the engine's grids from the changes it reports and logs every call.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    viewport_columns: usize,
    columns: usize,
    cells: Vec<Vec<bool>>,
    icons: Vec<Option<String>>,
    events: Vec<SurfaceEvent>,
    theme: Theme,
    flushes: usize,
}

impl RecordingSurface {
    /// A surface whose viewport fits exactly `columns` columns.
    pub fn new(columns: usize) -> Self {
        Self {
            viewport_columns: columns,
            columns,
            cells: Vec::new(),
            icons: Vec::new(),
            events: Vec::new(),
            theme: Theme::Normal,
            flushes: 0,
        }
    }

    /// Change what `measure` reports; takes effect on the engine's next resize.
    pub fn set_viewport_columns(&mut self, columns: usize) {
        self.viewport_columns = columns;
    }

    fn ensure_row(&mut self, row: usize) {
        while self.cells.len() <= row {
            self.cells.push(vec![false; self.columns * ROWS]);
            self.icons.push(None);
        }
    }

    pub fn cells(&self, row: usize) -> &[bool] {
        self.cells.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `row` shows exactly the rendering of `text`
    pub fn shows(&self, row: usize, text: &str) -> bool {
        let target = render(text);
        let cells = self.cells(row);
        let lit = |grid: &[bool], i: usize| grid.get(i) == Some(&true);
        (0..self.columns * ROWS).all(|i| lit(cells, i) == lit(&target[..], i))
    }

    pub fn is_dark(&self, row: usize) -> bool {
        !self.cells(row).iter().any(|on| *on)
    }

    pub fn icon(&self, row: usize) -> Option<&str> {
        self.icons.get(row).and_then(|icon| icon.as_deref())
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    /// Number of times cell `at_index` of `at_row` changed
    pub fn flips(&self, at_row: usize, at_index: usize) -> usize {
        self.events
            .iter()
            .filter(|event| match event {
                SurfaceEvent::Cell { row, index, .. } => *row == at_row && *index == at_index,
                _ => false,
            })
            .count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl DisplaySurface for RecordingSurface {
    fn set_cell(&mut self, row: usize, index: usize, on: bool) {
        self.ensure_row(row);
        if let Some(cell) = self.cells[row].get_mut(index) {
            *cell = on;
        }
        self.events.push(SurfaceEvent::Cell { row, index, on });
    }

    fn set_icon(&mut self, row: usize, icon: &str) {
        self.ensure_row(row);
        self.icons[row] = Some(icon.to_string());
        self.events.push(SurfaceEvent::Icon {
            row,
            icon: icon.to_string(),
        });
    }

    fn measure(&self) -> (f64, f64) {
        (
            self.viewport_columns as f64 + RESERVED_UNITS + 0.5,
            1.0 / UNIT_PER_HEIGHT,
        )
    }

    fn columns_changed(&mut self, columns: usize) {
        self.columns = columns;
        for row in &mut self.cells {
            row.resize(columns * ROWS, false);
        }
        self.events.push(SurfaceEvent::Columns(columns));
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.events.push(SurfaceEvent::Theme(theme));
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
