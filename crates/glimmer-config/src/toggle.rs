//! The light/dark toggle state machine.
//!
//! A persisted value records an explicit user choice. User toggles persist
//! before they are applied, so a store failure leaves both the stored and
//! the visible theme where they were. Initial resolution and system scheme
//! changes only apply; they never write a choice the user did not make.

use glimmer_core::ThemePreference;

use crate::error::Result;
use crate::store::PreferenceStore;

/// Store key holding `"light"` or `"dark"`.
pub const THEME_KEY: &str = "theme";

/// Length of the acknowledgment pulse on the toggle control.
pub const ACKNOWLEDGE_MS: u64 = 200;

/// Where the active theme becomes visible.
pub trait ThemeView {
    fn apply(&mut self, theme: ThemePreference);

    /// Start the short acknowledgment animation on the toggle control.
    fn acknowledge(&mut self);
}

/// Initial theme from the persisted choice and the system scheme.
pub fn resolve_initial(persisted: Option<ThemePreference>, system_dark: bool) -> ThemePreference {
    match persisted {
        Some(theme) => theme,
        None => ThemePreference::from_dark(system_dark),
    }
}

#[derive(Debug)]
pub struct ThemeToggle<S, V> {
    store: S,
    view: V,
    current: ThemePreference,
}

impl<S: PreferenceStore, V: ThemeView> ThemeToggle<S, V> {
    /// Resolve and apply the initial theme.
    pub fn init(store: S, mut view: V, system_dark: bool) -> Self {
        let persisted = match read_persisted(&store) {
            Ok(persisted) => persisted,
            Err(err) => {
                tracing::warn!(%err, "could not read theme preference, following system");
                None
            }
        };
        let current = resolve_initial(persisted, system_dark);
        tracing::info!(theme = %current, persisted = persisted.is_some(), "initial theme");
        view.apply(current);
        view.acknowledge();
        Self {
            store,
            view,
            current,
        }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    /// The explicit choice on record, if any.
    pub fn persisted(&self) -> Result<Option<ThemePreference>> {
        read_persisted(&self.store)
    }

    /// Switch to the opposite theme.
    ///
    /// On a store failure the error is returned and nothing changes.
    pub fn toggle(&mut self) -> Result<ThemePreference> {
        let next = self.current.toggle();
        if let Err(err) = self.store.set(THEME_KEY, next.as_str()) {
            tracing::warn!(%err, theme = %next, "theme not persisted, keeping {}", self.current);
            return Err(err);
        }
        self.current = next;
        self.view.apply(next);
        self.view.acknowledge();
        tracing::info!(theme = %next, "theme toggled");
        Ok(next)
    }

    /// Follow a system scheme change unless the user has made a choice.
    ///
    /// Returns the applied theme, or `None` when an explicit choice wins or
    /// the store cannot tell whether one was made.
    pub fn on_system_change(&mut self, system_dark: bool) -> Option<ThemePreference> {
        match read_persisted(&self.store) {
            Ok(Some(_)) => return None,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%err, "could not read theme preference, keeping current theme");
                return None;
            }
        }
        let theme = ThemePreference::from_dark(system_dark);
        self.current = theme;
        self.view.apply(theme);
        self.view.acknowledge();
        Some(theme)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Stored choice; unrecognised values count as no choice.
fn read_persisted<S: PreferenceStore>(store: &S) -> Result<Option<ThemePreference>> {
    let Some(raw) = store.get(THEME_KEY)? else {
        return Ok(None);
    };
    match raw.parse() {
        Ok(theme) => Ok(Some(theme)),
        Err(err) => {
            tracing::warn!(%err, "ignoring stored theme");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[derive(Debug, Default)]
    struct RecordingView {
        applied: Vec<ThemePreference>,
        pulses: usize,
    }

    impl RecordingView {
        fn shown(&self) -> Option<ThemePreference> {
            self.applied.last().copied()
        }
    }

    impl ThemeView for RecordingView {
        fn apply(&mut self, theme: ThemePreference) {
            self.applied.push(theme);
        }

        fn acknowledge(&mut self) {
            self.pulses += 1;
        }
    }

    fn toggle_with(
        store: MemoryStore,
        system_dark: bool,
    ) -> ThemeToggle<MemoryStore, RecordingView> {
        ThemeToggle::init(store, RecordingView::default(), system_dark)
    }

    #[test]
    fn test_theme_serializes_as_stored_literal() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Prefs {
            theme: ThemePreference,
        }

        let text = toml::to_string(&Prefs {
            theme: ThemePreference::Dark,
        })
        .unwrap();
        assert_eq!(text.trim(), "theme = \"dark\"");
        let back: Prefs = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(back.theme, ThemePreference::Light);
    }

    #[test]
    fn test_initial_resolution_table() {
        use ThemePreference::{Dark, Light};
        let cases = [
            (Some("dark"), false, Dark),
            (Some("dark"), true, Dark),
            (Some("light"), false, Light),
            (Some("light"), true, Light),
            (None, true, Dark),
            (None, false, Light),
        ];
        for (persisted, system_dark, expected) in cases {
            let store = match persisted {
                Some(value) => MemoryStore::new().with(THEME_KEY, value),
                None => MemoryStore::new(),
            };
            let toggle = toggle_with(store, system_dark);
            assert_eq!(toggle.current(), expected, "{persisted:?} / {system_dark}");
            assert_eq!(toggle.view().shown(), Some(expected));
            assert_eq!(toggle.view().pulses, 1);
        }
    }

    #[test]
    fn test_unrecognised_value_counts_as_absent() {
        let toggle = toggle_with(MemoryStore::new().with(THEME_KEY, "sepia"), true);
        assert_eq!(toggle.current(), ThemePreference::Dark);
        assert_eq!(toggle.persisted().unwrap(), None);
    }

    #[test]
    fn test_toggle_twice_returns_to_start() {
        let mut toggle = toggle_with(MemoryStore::new(), false);
        let start = toggle.current();

        let first = toggle.toggle().unwrap();
        assert_eq!(first, start.toggle());
        assert_eq!(toggle.store().peek(THEME_KEY), Some(first.as_str()));
        assert_eq!(toggle.view().shown(), Some(first));

        let second = toggle.toggle().unwrap();
        assert_eq!(second, start);
        assert_eq!(toggle.store().peek(THEME_KEY), Some(second.as_str()));
        assert_eq!(toggle.view().shown(), Some(second));
        assert_eq!(toggle.view().pulses, 3);
    }

    #[test]
    fn test_failed_persist_keeps_previous_state() {
        let mut toggle = toggle_with(MemoryStore::new().with(THEME_KEY, "light"), true);
        toggle.store_mut().set_fail_writes(true);

        assert!(toggle.toggle().is_err());
        assert_eq!(toggle.current(), ThemePreference::Light);
        assert_eq!(toggle.view().shown(), Some(ThemePreference::Light));
        assert_eq!(toggle.view().applied.len(), 1);
        assert_eq!(toggle.store().peek(THEME_KEY), Some("light"));

        toggle.store_mut().set_fail_writes(false);
        assert_eq!(toggle.toggle().unwrap(), ThemePreference::Dark);
        assert_eq!(toggle.store().peek(THEME_KEY), Some("dark"));
    }

    #[test]
    fn test_system_change_without_choice() {
        let mut toggle = toggle_with(MemoryStore::new(), false);
        assert_eq!(toggle.on_system_change(true), Some(ThemePreference::Dark));
        assert_eq!(toggle.view().shown(), Some(ThemePreference::Dark));
        assert_eq!(toggle.store().peek(THEME_KEY), None);
    }

    #[test]
    fn test_system_change_ignored_after_choice() {
        let mut toggle = toggle_with(MemoryStore::new(), false);
        toggle.toggle().unwrap();
        assert_eq!(toggle.on_system_change(false), None);
        assert_eq!(toggle.current(), ThemePreference::Dark);
        assert_eq!(toggle.view().shown(), Some(ThemePreference::Dark));
    }

    #[test]
    fn test_unreadable_store_follows_system_only_at_init() {
        let mut store = MemoryStore::new().with(THEME_KEY, "light");
        store.set_fail_reads(true);
        let mut toggle = toggle_with(store, true);
        assert_eq!(toggle.current(), ThemePreference::Dark);
        assert_eq!(toggle.on_system_change(false), None);
        assert_eq!(toggle.current(), ThemePreference::Dark);
        assert_eq!(toggle.view().shown(), Some(ThemePreference::Dark));
    }

    #[test]
    fn test_system_change_keeps_saved_choice_when_store_fails() {
        let mut toggle = toggle_with(MemoryStore::new().with(THEME_KEY, "light"), false);
        assert_eq!(toggle.current(), ThemePreference::Light);
        toggle.store_mut().set_fail_reads(true);

        assert_eq!(toggle.on_system_change(true), None);
        assert_eq!(toggle.current(), ThemePreference::Light);
        assert_eq!(toggle.view().shown(), Some(ThemePreference::Light));
        assert_eq!(toggle.store().peek(THEME_KEY), Some("light"));
    }
}
