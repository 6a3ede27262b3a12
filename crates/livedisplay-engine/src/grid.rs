use crate::glyph::ROWS;

/// Cell state of one display row, stored column-major.
///
/// Cell `i` sits in column `i / ROWS`, row `i % ROWS`. The animator relies on
/// this layout to address whole columns as contiguous index ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    columns: usize,
    cells: Vec<bool>,
}

impl PixelGrid {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            cells: vec![false; columns * ROWS],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reallocate to `columns × ROWS` cells.
    ///
    /// Cells whose flat index exists before and after keep their state;
    /// new cells start off.
    pub fn resize(&mut self, columns: usize) {
        self.columns = columns;
        self.cells.resize(columns * ROWS, false);
    }

    /// Set cell `index`; returns whether its state changed.
    /// Indices outside the grid are ignored.
    pub fn set_cell(&mut self, index: usize, on: bool) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) if *cell != on => {
                *cell = on;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    pub fn snapshot(&self) -> &[bool] {
        &self.cells
    }

    pub fn any_lit(&self) -> bool {
        self.cells.iter().any(|on| *on)
    }

    /// Whether the grid shows exactly `target`, with cells past its end off
    pub fn matches(&self, target: &[bool]) -> bool {
        self.cells
            .iter()
            .enumerate()
            .all(|(i, on)| *on == target.get(i).copied().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_dark() {
        let grid = PixelGrid::new(10);
        assert_eq!(grid.len(), 70);
        assert!(!grid.any_lit());
    }

    #[test]
    fn test_set_cell_reports_changes() {
        let mut grid = PixelGrid::new(2);
        assert!(grid.set_cell(3, true));
        assert!(!grid.set_cell(3, true));
        assert!(grid.get(3));
        assert!(!grid.set_cell(99, true));
        assert_eq!(grid.snapshot().iter().filter(|on| **on).count(), 1);
    }

    #[test]
    fn test_resize_preserves_overlapping_cells() {
        let mut grid = PixelGrid::new(4);
        for i in (0..grid.len()).step_by(3) {
            grid.set_cell(i, true);
        }
        let before = grid.snapshot().to_vec();

        grid.resize(2);
        assert_eq!(grid.snapshot(), &before[..14]);

        grid.resize(6);
        assert_eq!(&grid.snapshot()[..14], &before[..14]);
        assert!(grid.snapshot()[14..].iter().all(|on| !*on));
        assert_eq!(grid.columns(), 6);
    }

    #[test]
    fn test_matches_treats_missing_target_as_off() {
        let mut grid = PixelGrid::new(1);
        grid.set_cell(0, true);
        assert!(grid.matches(&[true]));
        grid.set_cell(5, true);
        assert!(!grid.matches(&[true]));
    }
}
