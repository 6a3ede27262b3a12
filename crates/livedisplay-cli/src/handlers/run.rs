use crate::terminal::{TerminalSurface, input};
use anyhow::{Result, bail};
use is_terminal::IsTerminal;
use livedisplay_runtime::{Clock, DisplayConfig, FileStore, Runtime, STORE_FILE, command_channel};
use std::path::Path;

pub fn handle(data_dir: &Path, config_path: &Path) -> Result<()> {
    if !std::io::stdout().is_terminal() || !std::io::stdin().is_terminal() {
        bail!(
            "The display needs an interactive terminal. Use `livedisplay render <TEXT>` to print text instead."
        );
    }

    let config = DisplayConfig::load_from(config_path)?;
    let store = FileStore::open(data_dir.join(STORE_FILE));
    tracing::info!(
        config = %config_path.display(),
        pages = config.pages.len(),
        rows = config.rows,
        "starting display"
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    rt.block_on(async {
        let surface = TerminalSurface::new()?;
        let panel = surface.panel_flag();
        let runtime = Runtime::build(surface, Box::new(store), &config, Clock::system())?;

        let (commands, receiver) = command_channel();
        let input = input::spawn(commands, panel);
        let engine = runtime.run(receiver).await;

        if input.join().is_err() {
            tracing::warn!("input thread panicked");
        }
        drop(engine);
        Ok::<(), anyhow::Error>(())
    })
}
