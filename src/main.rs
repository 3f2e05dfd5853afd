mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::Rng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use snoot::{
    config::{Config, ConfigStore, FileConfigStore},
    game::{Game, GameConfig, GameState},
    geom::Point,
    history::{SessionLog, SessionRecord},
    landmarks::{LandmarkFrame, LandmarkSource},
    runtime::{CrosstermEventSource, FixedTicker, InputEvent, Runner},
    stats::StatsDb,
    TICK_RATE_MS,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

/// Canvas pixels the simulated nose moves per arrow keypress.
const POINTER_STEP: f64 = 12.0;

/// nose-pointer spelling game with dwell selection
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Spell the secret word by holding your nose over floating letters. \
This binary drives the game core with a simulated pointer: move it with the \
arrow keys (or feed it real landmarks through the library)."
)]
pub struct Cli {
    /// canvas width in pixels
    #[clap(long)]
    width: Option<f64>,

    /// canvas height in pixels
    #[clap(long)]
    height: Option<f64>,

    /// target selection radius in pixels
    #[clap(short = 'r', long)]
    radius: Option<f64>,

    /// speed-mode countdown in seconds
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// disable per-letter selection statistics recording
    #[clap(long)]
    no_stats: bool,

    /// print per-letter selection statistics and exit
    #[clap(long)]
    letter_stats: bool,
}

/// Landmark source backed by the keyboard-driven pointer instead of a
/// webcam. Stands in for the real capture pipeline so the whole game is
/// playable without hardware.
pub struct SimulatedLandmarks {
    pub pointer: Point,
    pub face_visible: bool,
    width: f64,
}

impl SimulatedLandmarks {
    fn new(width: f64, height: f64) -> Self {
        Self {
            pointer: Point::new(width / 2.0, height / 2.0),
            face_visible: true,
            width,
        }
    }
}

impl LandmarkSource for SimulatedLandmarks {
    fn poll(&mut self) -> Option<LandmarkFrame> {
        self.face_visible
            .then(|| LandmarkFrame::from_canvas_pointer(self.pointer, self.width))
    }
}

pub struct App {
    pub game: Game,
    pub landmarks: SimulatedLandmarks,
    /// Inner canvas area of the last draw, for click mapping.
    pub canvas_area: Option<Rect>,
    log: SessionLog,
    was_finished: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let stats_db = if config.record_stats {
            StatsDb::new().ok()
        } else {
            None
        };
        let game_config = GameConfig::from(config);
        let mut rng = rand::thread_rng();

        Self {
            game: Game::new(game_config, stats_db, &mut rng),
            landmarks: SimulatedLandmarks::new(game_config.width, game_config.height),
            canvas_area: None,
            log: SessionLog::new(),
            was_finished: false,
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent, rng: &mut impl Rng) -> bool {
        let config = *self.game.config();
        let pointer = &mut self.landmarks.pointer;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => pointer.x = (pointer.x - POINTER_STEP).max(0.0),
            KeyCode::Right => pointer.x = (pointer.x + POINTER_STEP).min(config.width),
            KeyCode::Up => pointer.y = (pointer.y - POINTER_STEP).max(0.0),
            KeyCode::Down => pointer.y = (pointer.y + POINTER_STEP).min(config.height),
            KeyCode::Char(' ') | KeyCode::Char('m') => self.game.toggle_pause(rng),
            KeyCode::Enter => {
                let pos = self.landmarks.pointer;
                self.game.on_click(pos, Instant::now(), rng);
            }
            KeyCode::Char('f') => self.landmarks.face_visible = !self.landmarks.face_visible,
            _ => {}
        }
        false
    }

    /// Map a terminal cell to canvas coordinates via the last drawn area.
    fn cell_to_canvas(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.canvas_area?;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let config = self.game.config();
        let x = (column - area.x) as f64 + 0.5;
        let y = (row - area.y) as f64 + 0.5;
        Some(Point::new(
            x / area.width as f64 * config.width,
            y / area.height as f64 * config.height,
        ))
    }

    /// Append a session record once per Playing -> Finished transition.
    fn record_finish(&mut self, now: Instant) {
        let finished = self.game.state() == GameState::Finished;
        if finished && !self.was_finished {
            let session = &self.game.session;
            let record = SessionRecord::new(
                session.mode.map(|m| m.to_string()).unwrap_or_default(),
                session.success,
                session.score,
                self.game.engine().collected().len(),
                self.game.elapsed_secs(now),
            );
            let _ = self.log.append(&record);
        }
        self.was_finished = finished;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.letter_stats {
        return print_letter_stats();
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    if let Some(w) = cli.width {
        config.canvas_width = w;
    }
    if let Some(h) = cli.height {
        config.canvas_height = h;
    }
    if let Some(r) = cli.radius {
        config.target_radius = r;
    }
    if let Some(s) = cli.seconds {
        config.speed_time_limit_secs = s;
    }
    if cli.no_stats {
        config.record_stats = false;
    }
    let _ = store.save(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut rng = rand::thread_rng();

    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        match runner.step() {
            InputEvent::Key(key) => {
                if app.handle_key(key, &mut rng) {
                    return Ok(());
                }
            }
            InputEvent::Click { column, row } => {
                if let Some(pos) = app.cell_to_canvas(column, row) {
                    app.game.on_click(pos, Instant::now(), &mut rng);
                }
            }
            InputEvent::Resize => {}
            InputEvent::Tick => {
                let now = Instant::now();
                let frame = app.landmarks.poll();
                app.game.on_tick(frame.as_ref(), now, &mut rng);
                app.record_finish(now);
            }
        }
    }
}

fn print_letter_stats() -> Result<(), Box<dyn Error>> {
    let db = StatsDb::new()?;
    let summary = db.letter_summary()?;
    if summary.is_empty() {
        println!("no selection statistics recorded yet");
        return Ok(());
    }
    println!(
        "{:<8} {:>12} {:>10} {:>9}",
        "letter", "avg time ms", "miss rate", "attempts"
    );
    for (letter, avg_time, miss_rate, attempts) in summary {
        println!(
            "{:<8} {:>12.0} {:>9.0}% {:>9}",
            letter,
            avg_time,
            miss_rate * 100.0,
            attempts
        );
    }
    Ok(())
}
