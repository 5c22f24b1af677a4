//! Configuration and preferences for glimmer.
//!
//! Settings live in a TOML file under the platform config directory; the
//! theme choice lives in a separate preference store so the toggle can write
//! it without touching user-edited settings.

mod appearance;
mod config;
mod error;
mod store;
mod toggle;

pub use appearance::{
    AppearanceWatcher, COLORFGBG, FixedAppearance, SystemAppearance, TerminalAppearance,
    dark_background,
};
pub use config::{Config, project_dirs};
pub use error::{ConfigError, Result};
pub use store::{FileStore, MemoryStore, PreferenceStore};
pub use toggle::{ACKNOWLEDGE_MS, THEME_KEY, ThemeToggle, ThemeView, resolve_initial};

#[cfg(test)]
mod test_support {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT: AtomicUsize = AtomicUsize::new(0);

    /// A fresh, empty directory under the system temp dir.
    pub fn scratch_dir(name: &str) -> PathBuf {
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir()
            .join("glimmer-tests")
            .join(format!("{name}-{}-{n}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
