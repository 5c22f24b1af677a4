//! System colour-scheme preference.

use std::env;

/// Environment variable terminals use to advertise their colours, `"fg;bg"`.
pub const COLORFGBG: &str = "COLORFGBG";

/// Whether the host environment prefers a dark scheme.
pub trait SystemAppearance {
    fn prefers_dark(&self) -> bool;
}

/// Reads the terminal's advertised background colour.
///
/// Backgrounds 0-6 and 8 of the 16-colour palette count as dark. Without the
/// variable the terminal is assumed dark.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalAppearance;

impl SystemAppearance for TerminalAppearance {
    fn prefers_dark(&self) -> bool {
        env::var(COLORFGBG)
            .ok()
            .and_then(|v| dark_background(&v))
            .unwrap_or(true)
    }
}

/// Parse a `COLORFGBG` value. `None` when it names no usable background.
pub fn dark_background(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(bg, 0..=6 | 8))
}

/// A fixed answer, for hosts without a scheme source and for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAppearance(pub bool);

impl SystemAppearance for FixedAppearance {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

/// Turns a polled [`SystemAppearance`] into change notifications.
#[derive(Debug)]
pub struct AppearanceWatcher<A> {
    source: A,
    last: bool,
}

impl<A: SystemAppearance> AppearanceWatcher<A> {
    pub fn new(source: A) -> Self {
        let last = source.prefers_dark();
        Self { source, last }
    }

    pub fn prefers_dark(&self) -> bool {
        self.last
    }

    /// Re-check the source; `Some(dark)` when it changed since the last poll.
    pub fn poll(&mut self) -> Option<bool> {
        let now = self.source.prefers_dark();
        if now == self.last {
            return None;
        }
        self.last = now;
        tracing::info!(dark = now, "system colour scheme changed");
        Some(now)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_dark_background() {
        assert_eq!(dark_background("15;0"), Some(true));
        assert_eq!(dark_background("0;15"), Some(false));
        assert_eq!(dark_background("12;default;8"), Some(true));
        assert_eq!(dark_background("0;7"), Some(false));
        assert_eq!(dark_background("default"), None);
        assert_eq!(dark_background(""), None);
    }

    struct Switch(Rc<Cell<bool>>);

    impl SystemAppearance for Switch {
        fn prefers_dark(&self) -> bool {
            self.0.get()
        }
    }

    #[test]
    fn test_watcher_reports_changes_once() {
        let dark = Rc::new(Cell::new(false));
        let mut watcher = AppearanceWatcher::new(Switch(dark.clone()));
        assert!(!watcher.prefers_dark());
        assert_eq!(watcher.poll(), None);

        dark.set(true);
        assert_eq!(watcher.poll(), Some(true));
        assert_eq!(watcher.poll(), None);

        dark.set(false);
        assert_eq!(watcher.poll(), Some(false));
        assert!(!FixedAppearance(false).prefers_dark());
    }
}
