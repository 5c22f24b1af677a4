use std::cell::RefCell;
use std::io::stdout;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
};
use glimmer_config::{
    AppearanceWatcher, Config, ConfigError, FileStore, PreferenceStore, SystemAppearance,
    TerminalAppearance, ThemeToggle,
};
use glimmer_core::{Palette, Rect};
use glimmer_effects::{
    AnimationHandle, Canvas2d, DrawList, EventLoop,
    layers::{
        shooting_star::{self, ShootingStarLayer},
        sparkle::{self, SparkleLayer},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use ratatui::{
    DefaultTerminal, Frame, layout,
    style::{Style, Stylize},
    text::{Line, Span},
};

mod background;
mod draw;
mod logging;
mod scene;
mod theme;

use background::{Starfield, render_shooting_stars};
use draw::{canvas_size, cell_center, viewport};
use scene::{Scene, TOGGLE, ToggleState};
use theme::TerminalTheme;

/// How long a status message replaces the help line.
const STATUS_MS: f64 = 2500.0;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(err) = logging::init() {
        eprintln!("glimmer: logging disabled: {err}");
    }
    let config = match Config::load() {
        Ok(config) => config,
        Err(ConfigError::NoProjectDirs) => {
            tracing::warn!("no config dir, using defaults");
            Config::default()
        }
        Err(err) => return Err(err.into()),
    };

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;
    let size = terminal.size()?;
    let area = layout::Rect::new(0, 0, size.width, size.height);
    let result = App::new(config, area).run(&mut terminal);
    if let Err(err) = execute!(stdout(), DisableMouseCapture) {
        tracing::warn!(%err, "could not release mouse capture");
    }
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App<S = FileStore, A = TerminalAppearance> {
    /// Is the application running?
    running: bool,
    config: Config,
    started: Instant,
    event_loop: EventLoop,
    /// Area the scene is currently laid out for.
    area: layout::Rect,
    scene: Scene,
    starfield: Starfield,
    canvas: Rc<RefCell<DrawList>>,
    sparkles: Rc<RefCell<SparkleLayer<StdRng>>>,
    sparkle_loop: Option<AnimationHandle>,
    shooting_stars: Rc<RefCell<ShootingStarLayer<StdRng>>>,
    shooting_loop: Option<AnimationHandle>,
    theme: ThemeToggle<S, TerminalTheme<StdRng>>,
    appearance: AppearanceWatcher<A>,
    next_appearance_poll_ms: f64,
    /// A message and the clock time it expires at.
    status: Option<(String, f64)>,
}

impl App {
    /// Construct a new instance of [`App`] laid out for `area`, keeping the
    /// theme choice in the user's data directory.
    pub fn new(config: Config, area: layout::Rect) -> Self {
        let store = FileStore::open_default().unwrap_or_else(|err| {
            let fallback = std::env::temp_dir().join("glimmer-preferences.toml");
            tracing::warn!(%err, path = %fallback.display(), "no data dir, preferences go to temp");
            FileStore::new(fallback)
        });
        Self::with_parts(config, area, store, TerminalAppearance)
    }
}

impl<S: PreferenceStore, A: SystemAppearance> App<S, A> {
    /// Construct an [`App`] with its preference store and system scheme source.
    pub fn with_parts(config: Config, area: layout::Rect, store: S, appearance: A) -> Self {
        let event_loop = EventLoop::new();
        let mut rng = StdRng::from_os_rng();

        let canvas = Rc::new(RefCell::new(DrawList::new(canvas_size(area))));
        let sparkles = Rc::new(RefCell::new(SparkleLayer::new(
            config.sparkles,
            canvas_size(area),
            StdRng::seed_from_u64(rng.random()),
        )));
        let shooting_stars = Rc::new(RefCell::new(ShootingStarLayer::new(
            viewport(area),
            StdRng::seed_from_u64(rng.random()),
        )));
        let starfield = Starfield::new(&config, &mut rng);
        let mut scene = Scene::new(&event_loop, &config);
        scene.resize(area);

        let appearance = AppearanceWatcher::new(appearance);
        let theme = ThemeToggle::init(
            store,
            TerminalTheme::new(&event_loop, sparkles.clone()),
            appearance.prefers_dark(),
        );

        let sparkle_loop = (config.sparkles > 0)
            .then(|| sparkle::start(&event_loop, sparkles.clone(), canvas.clone()));
        let shooting_loop = config
            .shooting_stars
            .then(|| shooting_star::start(&event_loop, shooting_stars.clone()));
        tracing::info!(scatter = starfield.len(), "scene ready");

        Self {
            running: false,
            next_appearance_poll_ms: config.appearance_poll_ms as f64,
            config,
            started: Instant::now(),
            event_loop,
            area,
            scene,
            starfield,
            canvas,
            sparkles,
            sparkle_loop,
            shooting_stars,
            shooting_loop,
            theme,
            appearance,
            status: None,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let frame_interval = Duration::from_millis(self.config.frame_interval_ms.max(1));
        while self.running {
            let now = self.started.elapsed().as_secs_f64() * 1000.0;
            self.event_loop.tick(now);
            self.poll_appearance(now);
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(frame_interval)?;
        }
        self.stop_animations();
        Ok(())
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area != self.area {
            self.resize(area);
        }
        let palette = self.theme.current().palette();
        let now = self.event_loop.now();

        frame.render_widget(self.canvas.borrow().view(palette.background), area);
        self.starfield.render(frame.buffer_mut(), area, now, &palette);
        render_shooting_stars(&self.shooting_stars.borrow(), frame.buffer_mut(), area, &palette);

        let view = self.theme.view();
        let toggle = ToggleState {
            theme: view.theme(),
            pulsing: view.is_pulsing(),
        };
        self.scene.render(frame, area, &palette, toggle);

        let bottom = layout::Rect {
            y: area.bottom().saturating_sub(1),
            height: area.height.min(1),
            ..area
        };
        frame.render_widget(self.footer(now, &palette), bottom);
        self.scene.render_cursor(frame, area, &palette);
    }

    /// Help text, or the latest status message while it lasts.
    fn footer(&self, now: f64, palette: &Palette) -> Line<'static> {
        let key = palette.accent.to_color();
        let text = palette.muted.to_color();
        if let Some((message, until)) = &self.status {
            if now < *until {
                return Line::from(Span::styled(message.clone(), Style::new().fg(key))).centered();
            }
        }
        Line::from(vec![
            "q".bold().fg(key),
            " quit  ".fg(text),
            "t".bold().fg(key),
            " toggle theme  ".fg(text),
            "s".bold().fg(key),
            " sparkles  ".fg(text),
            "mouse".bold().fg(key),
            " parallax".fg(text),
        ])
        .centered()
    }

    fn resize(&mut self, area: layout::Rect) {
        self.area = area;
        self.scene.resize(area);
        self.canvas.borrow_mut().resize(canvas_size(area));
        self.sparkles.borrow_mut().resize(canvas_size(area));
        self.shooting_stars.borrow_mut().resize(viewport(area));
        tracing::debug!(width = area.width, height = area.height, "resized");
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits at most one frame so the animations keep moving.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                // Picked up by the next draw.
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('t')) => self.toggle_theme(),
            (_, KeyCode::Char('s')) => self.toggle_sparkles(),
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        let point = cell_center(self.area, mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.scene.on_pointer_move(point),
            MouseEventKind::Down(MouseButton::Left) => {
                self.scene.on_pointer_move(point);
                if self.scene.hit(TOGGLE, point) {
                    self.toggle_theme();
                }
            }
            _ => {}
        }
    }

    fn toggle_theme(&mut self) {
        let message = match self.theme.toggle() {
            Ok(theme) => format!("{theme} theme"),
            Err(err) => format!("theme unchanged: {err}"),
        };
        self.show_status(message);
    }

    /// Stop the sparkle loop, or start a fresh one.
    fn toggle_sparkles(&mut self) {
        if let Some(handle) = self.sparkle_loop.take() {
            handle.stop();
            let mut canvas = self.canvas.borrow_mut();
            let full = Rect::from_size(canvas.size());
            canvas.clear(full);
            drop(canvas);
            self.show_status("sparkles off".to_string());
        } else {
            self.sparkle_loop = Some(sparkle::start(
                &self.event_loop,
                self.sparkles.clone(),
                self.canvas.clone(),
            ));
            self.show_status("sparkles on".to_string());
        }
    }

    /// Follow the system scheme, checked every `appearance_poll_ms`.
    fn poll_appearance(&mut self, now: f64) {
        if now < self.next_appearance_poll_ms {
            return;
        }
        self.next_appearance_poll_ms = now + self.config.appearance_poll_ms.max(1) as f64;
        let Some(dark) = self.appearance.poll() else {
            return;
        };
        if let Some(theme) = self.theme.on_system_change(dark) {
            self.show_status(format!("{theme} theme from system"));
        }
    }

    fn show_status(&mut self, message: String) {
        self.status = Some((message, self.event_loop.now() + STATUS_MS));
    }

    fn stop_animations(&mut self) {
        for handle in [self.sparkle_loop.take(), self.shooting_loop.take()]
            .into_iter()
            .flatten()
        {
            handle.stop();
        }
        tracing::info!("animations stopped");
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use glimmer_config::{FixedAppearance, MemoryStore, THEME_KEY};
    use glimmer_core::ThemePreference;

    use super::*;

    fn app_with(store: MemoryStore) -> App<MemoryStore, FixedAppearance> {
        let area = layout::Rect::new(0, 0, 80, 24);
        App::with_parts(Config::default(), area, store, FixedAppearance(true))
    }

    fn app() -> App<MemoryStore, FixedAppearance> {
        app_with(MemoryStore::new())
    }

    #[test]
    fn test_theme_follows_injected_parts() {
        let mut app = app();
        assert_eq!(app.theme.current(), ThemePreference::Dark);
        app.toggle_theme();
        assert_eq!(app.theme.current(), ThemePreference::Light);
        assert_eq!(app.theme.store().peek(THEME_KEY), Some("light"));
        app.stop_animations();

        let mut app = app_with(MemoryStore::new().with(THEME_KEY, "light"));
        assert_eq!(app.theme.current(), ThemePreference::Light);
        app.stop_animations();
    }

    #[test]
    fn test_sparkle_toggle_stops_and_restarts() {
        let mut app = app();
        app.event_loop.tick(16.0);
        assert!(!app.canvas.borrow().is_empty());

        app.toggle_sparkles();
        assert!(app.sparkle_loop.is_none());
        assert!(app.canvas.borrow().is_empty());
        app.event_loop.tick(32.0);
        assert!(app.canvas.borrow().is_empty());

        app.toggle_sparkles();
        assert!(!app.canvas.borrow().is_empty());
        app.stop_animations();
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            KeyEvent::from(KeyCode::Char('q')),
            KeyEvent::from(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app();
            app.running = true;
            app.on_key_event(key);
            assert!(!app.running);
        }
    }
}
