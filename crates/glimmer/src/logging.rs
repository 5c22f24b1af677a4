//! Log to a file; the terminal is busy drawing.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `GLIMMER_LOG=glimmer_effects=debug`.
pub const LOG_ENV: &str = "GLIMMER_LOG";

/// Install the global subscriber writing to `<data dir>/glimmer.log`.
pub fn init() -> color_eyre::Result<PathBuf> {
    let dir = glimmer_config::project_dirs()?.data_dir().to_path_buf();
    fs::create_dir_all(&dir)?;
    let path = dir.join("glimmer.log");
    let file = File::create(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}
