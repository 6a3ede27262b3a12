//! Full-screen terminal surface for the display.

pub mod input;
pub mod view;

use anyhow::Result;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use livedisplay_engine::layout::UNIT_PER_HEIGHT;
use livedisplay_engine::{DisplaySurface, Settings};
use livedisplay_types::Theme;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use view::{DisplayView, GUTTER_WIDTH, LINES_PER_ROW};

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen);
}

pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    view: DisplayView,
    panel_open: Arc<AtomicBool>,
    panel_drawn: bool,
}

impl TerminalSurface {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        // Raw mode delivers Ctrl+C as a key; this covers signals from outside
        ctrlc::set_handler(move || {
            restore_terminal();
            std::process::exit(0);
        })?;

        Ok(Self {
            terminal,
            view: DisplayView::new(),
            panel_open: Arc::new(AtomicBool::new(false)),
            panel_drawn: false,
        })
    }

    /// Flag the input thread flips to show or hide the settings panel
    pub fn panel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.panel_open)
    }

    fn draw(&mut self) -> Result<()> {
        let view = &self.view;
        let panel_open = self.panel_drawn;
        self.terminal.draw(|f| draw_display(f, view, panel_open))?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore_terminal();
    }
}

impl DisplaySurface for TerminalSurface {
    fn set_cell(&mut self, row: usize, index: usize, on: bool) {
        self.view.set_cell(row, index, on);
    }

    fn set_icon(&mut self, row: usize, icon: &str) {
        self.view.set_icon(row, icon);
    }

    /// Terminal width in cells with a unit of one cell, so the grid gets
    /// every column right of the gutter.
    fn measure(&self) -> (f64, f64) {
        let width = crossterm::terminal::size().map_or(80, |(width, _)| width);
        (f64::from(width), 1.0 / UNIT_PER_HEIGHT)
    }

    fn columns_changed(&mut self, columns: usize) {
        self.view.resize(columns);
    }

    fn set_theme(&mut self, theme: Theme) {
        self.view.set_theme(theme);
    }

    fn settings_changed(&mut self, settings: &Settings) {
        self.view.set_settings(*settings);
    }

    fn flush(&mut self) {
        let panel_open = self.panel_open.load(Ordering::SeqCst);
        let panel_changed = panel_open != self.panel_drawn;
        if !self.view.take_dirty() && !panel_changed {
            return;
        }
        self.panel_drawn = panel_open;
        if let Err(err) = self.draw() {
            tracing::warn!(error = %err, "failed to draw display");
        }
    }
}

fn colors(theme: Theme) -> (Color, Color) {
    match theme {
        Theme::Normal => (Color::LightRed, Color::Black),
        Theme::Invert => (Color::Black, Color::White),
    }
}

fn draw_display(f: &mut Frame, view: &DisplayView, panel_open: bool) {
    let (lit, background) = colors(view.theme());
    let style = Style::default().fg(lit).bg(background);
    let area = f.area();
    f.render_widget(Block::default().style(style), area);

    let row_height = (LINES_PER_ROW + 1) as u16;
    for row in 0..view.row_count() {
        let top = area.y + row as u16 * row_height + 1;
        if top + LINES_PER_ROW as u16 > area.bottom() {
            break;
        }

        let gutter_width = (GUTTER_WIDTH as u16 - 1).min(area.width);
        let gutter = Rect::new(area.x + 1, top, gutter_width, 1);
        let label = Paragraph::new(view.icon_label(row));
        f.render_widget(label.style(style.fg(Color::DarkGray)), gutter);

        let grid_x = area.x + GUTTER_WIDTH as u16;
        if grid_x >= area.right() {
            continue;
        }
        let grid = Rect::new(grid_x, top, area.right() - grid_x, LINES_PER_ROW as u16);
        let lines: Vec<Line> = view.pixel_lines(row).into_iter().map(Line::from).collect();
        f.render_widget(Paragraph::new(Text::from(lines)).style(style), grid);
    }

    if panel_open {
        draw_settings_panel(f, view.settings(), style);
    }
}

fn draw_settings_panel(f: &mut Frame, settings: Settings, style: Style) {
    let area = f.area();
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(7)])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(44)])
        .split(vertical[1]);
    let panel = horizontal[1];

    let lines = vec![
        Line::from(format!("Time per page: {}s   [-] [+]", settings.timeout_secs)),
        Line::from(format!("{}   [c]", settings.quick_change_label())),
        Line::from(format!("Theme: {}   [t]", settings.theme)),
        Line::from("Next page [n]   Close [s]   Quit [q]"),
    ];

    f.render_widget(Clear, panel);
    f.render_widget(
        Paragraph::new(Text::from(lines)).style(style).block(
            Block::default()
                .title(" Settings ")
                .borders(Borders::ALL)
                .border_style(style.fg(Color::DarkGray)),
        ),
        panel,
    );
}
