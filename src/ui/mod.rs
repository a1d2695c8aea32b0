pub mod components;
pub mod screens;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use eframe::NativeOptions;

use crate::config::SplitterConfig;

/// Open the editor window, optionally with a file already loaded.
pub fn launch_editor(config: SplitterConfig, input: Option<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let title = window_title(input.as_deref());
    let mut app = screens::editor::EditorApp::new(config, output_dir);
    if let Some(path) = input {
        app.open_path(&path);
    }
    let options = NativeOptions::default();
    eframe::run_native(&title, options, Box::new(move |_cc| Box::new(app)))
        .map_err(|err| anyhow!("editor failed: {}", err))
}

fn window_title(input: Option<&Path>) -> String {
    input
        .and_then(|path| path.file_name())
        .map(|name| format!("Wavecut – {}", name.to_string_lossy()))
        .unwrap_or_else(|| "Wavecut".to_string())
}
