use crate::settings::Settings;
use livedisplay_types::Theme;

/// Where the engine draws.
///
/// The engine owns the pixel state and only reports changes; a surface never
/// needs to read anything back except its own size.
pub trait DisplaySurface {
    /// Cell `index` of `row` changed to `on`
    fn set_cell(&mut self, row: usize, index: usize, on: bool);

    /// Icon location for `row`
    fn set_icon(&mut self, row: usize, icon: &str);

    /// Viewport size as `(width, height)` in the surface's own units
    fn measure(&self) -> (f64, f64);

    /// Every grid was rebuilt with `columns` columns
    fn columns_changed(&mut self, _columns: usize) {}

    fn set_theme(&mut self, _theme: Theme) {}

    /// Timeout, quick-change flag or theme changed
    fn settings_changed(&mut self, _settings: &Settings) {}

    /// Called once after each batch of changes
    fn flush(&mut self) {}
}
