//! Row transitions: the two-stencil diagonal sweep and the quick clear-then-paint.
//!
//! A [`Transition`] only mutates the grid it is handed and reports every cell
//! it actually flips through a callback; deciding *when* the next step runs is
//! left to the engine's tick queue.

use crate::glyph::ROWS;
use crate::grid::PixelGrid;

/// Width of the sweep window in columns, less one
pub const TRANSITION_WIDTH: usize = 12;

/// Delay between two sweep steps
pub const STEP_DELAY_MS: i64 = 30;

/// Gap between clearing and painting in quick mode
pub const QUICK_CHANGE_DELAY_MS: i64 = 1000;

/// Advancing head of the sweep, 13 columns
#[rustfmt::skip]
pub const TRANSITION_FILL: [u8; 91] = [
    0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 1,
    0, 0, 0, 0, 0, 1, 1,
    0, 0, 0, 0, 1, 1, 1,
    0, 0, 0, 1, 1, 1, 1,
    0, 0, 1, 1, 1, 1, 1,
    0, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 0,
    1, 1, 1, 1, 1, 0, 0,
    1, 1, 1, 1, 0, 0, 0,
    1, 1, 1, 0, 0, 0, 0,
    1, 1, 0, 0, 0, 0, 0,
    1, 0, 0, 0, 0, 0, 0,
];

/// Trailing tail of the sweep, 7 columns; positions past the end count as 0
#[rustfmt::skip]
pub const TRANSITION_CLEAR: [u8; 49] = [
    1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 0,
    1, 1, 1, 1, 1, 0, 0,
    1, 1, 1, 1, 0, 0, 0,
    1, 1, 1, 0, 0, 0, 0,
    1, 1, 0, 0, 0, 0, 0,
    1, 0, 0, 0, 0, 0, 0,
];

/// Number of sweep steps needed to cross `columns`
pub fn sweep_steps(columns: usize) -> usize {
    columns + TRANSITION_WIDTH
}

/// Wall time a full sweep across `columns` takes
pub fn sweep_duration_ms(columns: usize) -> i64 {
    sweep_steps(columns) as i64 * STEP_DELAY_MS
}

/// Apply one sweep step with the window starting at `offset`.
pub fn sweep_step(
    grid: &mut PixelGrid,
    target: &[bool],
    offset: isize,
    on_change: &mut impl FnMut(usize, bool),
) {
    let window = (TRANSITION_WIDTH * ROWS) as isize;
    let start = offset.max(0);
    let end = (offset + window).min(grid.len() as isize);

    for k in start..end {
        let rel = (k - offset) as usize;
        let index = k as usize;
        let next = if TRANSITION_FILL[rel] == 1 {
            Some(true)
        } else if TRANSITION_CLEAR.get(rel) == Some(&1) {
            Some(target.get(index).copied().unwrap_or(false))
        } else {
            None
        };

        if let Some(on) = next
            && grid.set_cell(index, on)
        {
            on_change(index, on);
        }
    }
}

/// Turn every lit cell off.
pub fn clear_all(grid: &mut PixelGrid, on_change: &mut impl FnMut(usize, bool)) {
    for index in 0..grid.len() {
        if grid.set_cell(index, false) {
            on_change(index, false);
        }
    }
}

/// Set every cell to its target bit, off past the end of `target`.
pub fn paint(grid: &mut PixelGrid, target: &[bool], on_change: &mut impl FnMut(usize, bool)) {
    for index in 0..grid.len() {
        let on = target.get(index).copied().unwrap_or(false);
        if grid.set_cell(index, on) {
            on_change(index, on);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    Sweep,
    Quick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Sweeping {
        offset: isize,
        step: usize,
        steps: usize,
    },
    AwaitingPaint,
}

/// What the owner of a transition should do after driving it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Drive the transition again after this many milliseconds
    After(i64),
    /// Target reached
    Done,
}

/// An in-flight change of one grid to a target pixel stream
#[derive(Debug, Clone)]
pub struct Transition {
    target: Vec<bool>,
    phase: Phase,
}

impl Transition {
    pub fn new(mode: TransitionMode, target: Vec<bool>, columns: usize) -> Self {
        let phase = match mode {
            TransitionMode::Sweep => Phase::Sweeping {
                offset: -((TRANSITION_WIDTH * ROWS) as isize),
                step: 0,
                steps: sweep_steps(columns),
            },
            TransitionMode::Quick => Phase::AwaitingPaint,
        };
        Self { target, phase }
    }

    pub fn mode(&self) -> TransitionMode {
        match self.phase {
            Phase::Sweeping { .. } => TransitionMode::Sweep,
            Phase::AwaitingPaint => TransitionMode::Quick,
        }
    }

    pub fn target(&self) -> &[bool] {
        &self.target
    }

    /// Start the transition; quick mode clears the grid immediately.
    pub fn begin(&mut self, grid: &mut PixelGrid, on_change: &mut impl FnMut(usize, bool)) -> Step {
        match self.phase {
            Phase::Sweeping { .. } => Step::After(STEP_DELAY_MS),
            Phase::AwaitingPaint => {
                clear_all(grid, on_change);
                Step::After(QUICK_CHANGE_DELAY_MS)
            }
        }
    }

    /// Run the next deferred tick.
    pub fn step(&mut self, grid: &mut PixelGrid, on_change: &mut impl FnMut(usize, bool)) -> Step {
        match &mut self.phase {
            Phase::Sweeping {
                offset,
                step,
                steps,
            } => {
                *offset += ROWS as isize;
                sweep_step(grid, &self.target, *offset, on_change);
                *step += 1;
                if *step < *steps {
                    Step::After(STEP_DELAY_MS)
                } else {
                    Step::Done
                }
            }
            Phase::AwaitingPaint => {
                paint(grid, &self.target, on_change);
                Step::Done
            }
        }
    }

    /// Abandon a sweep and restart towards the same target in quick mode.
    pub fn into_quick(self) -> Self {
        Self {
            target: self.target,
            phase: Phase::AwaitingPaint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::render;

    fn run_to_end(transition: &mut Transition, grid: &mut PixelGrid) -> Vec<(usize, bool)> {
        let mut changes = Vec::new();
        let mut record = |i: usize, on: bool| changes.push((i, on));
        let mut next = transition.begin(grid, &mut record);
        while next != Step::Done {
            next = transition.step(grid, &mut record);
        }
        changes
    }

    #[test]
    fn test_stencil_shapes() {
        assert_eq!(TRANSITION_FILL.len(), (TRANSITION_WIDTH + 1) * ROWS);
        assert_eq!(TRANSITION_CLEAR.len(), 7 * ROWS);
    }

    #[test]
    fn test_sweep_reaches_target() {
        let mut grid = PixelGrid::new(20);
        for i in (0..grid.len()).step_by(2) {
            grid.set_cell(i, true);
        }
        let target = render("ab");
        let mut transition = Transition::new(TransitionMode::Sweep, target.clone(), 20);

        run_to_end(&mut transition, &mut grid);
        assert!(grid.matches(&target));
    }

    #[test]
    fn test_sweep_takes_columns_plus_width_steps() {
        let mut grid = PixelGrid::new(5);
        let mut transition = Transition::new(TransitionMode::Sweep, vec![true], 5);
        let mut noop = |_: usize, _: bool| {};

        assert_eq!(
            transition.begin(&mut grid, &mut noop),
            Step::After(STEP_DELAY_MS)
        );
        let mut steps = 0;
        loop {
            steps += 1;
            if transition.step(&mut grid, &mut noop) == Step::Done {
                break;
            }
        }
        assert_eq!(steps, 5 + TRANSITION_WIDTH);
        assert_eq!(sweep_duration_ms(5), 17 * 30);
    }

    #[test]
    fn test_sweep_flips_each_cell_at_most_twice() {
        let mut grid = PixelGrid::new(16);
        let target = render("x1");
        let mut transition = Transition::new(TransitionMode::Sweep, target, 16);

        let changes = run_to_end(&mut transition, &mut grid);
        let mut per_cell = vec![0usize; grid.len()];
        for (index, _) in changes {
            per_cell[index] += 1;
        }
        assert!(per_cell.iter().all(|count| *count <= 2));
    }

    #[test]
    fn test_quick_mode_clears_then_paints() {
        let mut grid = PixelGrid::new(8);
        grid.set_cell(0, true);
        grid.set_cell(40, true);
        let target = render("7");
        let mut transition = Transition::new(TransitionMode::Quick, target.clone(), 8);
        let mut noop = |_: usize, _: bool| {};

        assert_eq!(
            transition.begin(&mut grid, &mut noop),
            Step::After(QUICK_CHANGE_DELAY_MS)
        );
        assert!(!grid.any_lit());

        assert_eq!(transition.step(&mut grid, &mut noop), Step::Done);
        assert!(grid.matches(&target));
    }

    #[test]
    fn test_into_quick_keeps_target() {
        let transition = Transition::new(TransitionMode::Sweep, vec![true, false, true], 4);
        let quick = transition.into_quick();
        assert_eq!(quick.mode(), TransitionMode::Quick);
        assert_eq!(quick.target(), &[true, false, true]);
    }

    #[test]
    fn test_target_longer_than_grid_is_truncated() {
        let mut grid = PixelGrid::new(2);
        let target = render("88888");
        let mut transition = Transition::new(TransitionMode::Sweep, target.clone(), 2);
        run_to_end(&mut transition, &mut grid);
        assert_eq!(grid.snapshot(), &target[..14]);
    }
}
