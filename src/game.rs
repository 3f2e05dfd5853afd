use crate::dwell::{MENU_DWELL_MS, TARGET_DWELL_MS};
use crate::geom::Point;
use crate::landmarks::{Landmark, LandmarkFrame};
use crate::menu::{MenuAction, MenuDwellController};
use crate::selection::{SelectionEngine, SelectionSignal, TARGET_WORD};
use crate::session::{GameSession, Mode, SPEED_TIME_LIMIT_SECS};
use crate::snapshot::{MenuItemView, Snapshot, TargetView};
use crate::stats::StatsDb;
use crate::targets::{PlayArea, TargetSetGenerator, TARGET_RADIUS};
use crate::trail::TrailBuffer;
use rand::Rng;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    MainMenu,
    Playing,
    Paused,
    Finished,
}

#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub target_dwell: Duration,
    pub menu_dwell: Duration,
    pub speed_time_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            radius: TARGET_RADIUS,
            target_dwell: Duration::from_millis(TARGET_DWELL_MS),
            menu_dwell: Duration::from_millis(MENU_DWELL_MS),
            speed_time_limit: SPEED_TIME_LIMIT_SECS,
        }
    }
}

/// Top-level state machine: owns the session, the selection engine and
/// generator, and the two dwell menus, and routes each tick to whichever
/// of them the current state says is live.
pub struct Game {
    config: GameConfig,
    pub session: GameSession,
    engine: SelectionEngine,
    generator: TargetSetGenerator,
    main_menu: MenuDwellController,
    overlay_menu: MenuDwellController,
    countdown_last: Option<Instant>,
    started_at: Option<Instant>,
    last_pointer: Option<Point>,
    left_trail: TrailBuffer,
    right_trail: TrailBuffer,
}

impl Game {
    pub fn new(config: GameConfig, stats_db: Option<StatsDb>, rng: &mut impl Rng) -> Self {
        let area = PlayArea {
            width: config.width,
            height: config.height,
        };
        let mut main_menu = MenuDwellController::main_menu(config.width, config.height)
            .with_threshold(config.menu_dwell);
        // The main menu is visible from the start
        main_menu.shuffle(rng);

        Self {
            session: GameSession::default(),
            engine: SelectionEngine::with_word(TARGET_WORD.to_vec(), config.target_dwell, stats_db),
            generator: TargetSetGenerator::new(area, config.radius),
            main_menu,
            overlay_menu: MenuDwellController::overlay(config.width, config.height)
                .with_threshold(config.menu_dwell),
            countdown_last: None,
            started_at: None,
            last_pointer: None,
            left_trail: TrailBuffer::new(),
            right_trail: TrailBuffer::new(),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    pub fn state(&self) -> GameState {
        if self.session.finished {
            GameState::Finished
        } else if !self.session.started {
            GameState::MainMenu
        } else if self.session.paused {
            GameState::Paused
        } else {
            GameState::Playing
        }
    }

    /// Seconds since the current attempt started.
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        self.started_at
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0)
    }

    /// One frame of the fixed-rate loop. `frame` is `None` when no face was
    /// detected this tick.
    pub fn on_tick(&mut self, frame: Option<&LandmarkFrame>, now: Instant, rng: &mut impl Rng) {
        let pointer = frame.map(|f| f.pointer(self.config.width));
        self.last_pointer = pointer;
        if let Some(f) = frame {
            self.left_trail.push(f.get(Landmark::LeftEyeCorner), now);
            self.right_trail.push(f.get(Landmark::RightEyeCorner), now);
        }

        match self.state() {
            GameState::MainMenu => {
                if let Some(action) = self.main_menu.tick(pointer, now) {
                    self.apply(action, now, rng);
                }
            }
            GameState::Playing => {
                self.tick_countdown(now, rng);
                if self.state() != GameState::Playing {
                    return;
                }
                let mode = match self.session.mode {
                    Some(m) => m,
                    None => return,
                };
                match self.engine.tick(pointer, now, mode, &mut self.generator, rng) {
                    Some(SelectionSignal::Advanced) => self.session.score += 1,
                    Some(SelectionSignal::Completed) => {
                        self.session.score += 1;
                        self.session.finished = true;
                        self.session.success = true;
                        self.overlay_menu.shuffle(rng);
                    }
                    Some(SelectionSignal::Missed) | None => {}
                }
            }
            GameState::Paused | GameState::Finished => {
                if let Some(action) = self.overlay_menu.tick(pointer, now) {
                    self.apply(action, now, rng);
                }
            }
        }
    }

    /// External pause signal; symmetric, not dwell-gated.
    pub fn toggle_pause(&mut self, rng: &mut impl Rng) {
        match self.state() {
            GameState::Playing => {
                self.session.paused = true;
                self.overlay_menu.shuffle(rng);
            }
            GameState::Paused => self.resume(),
            _ => {}
        }
    }

    /// Immediate click confirmation at canvas position `pos`.
    pub fn on_click(&mut self, pos: Point, now: Instant, rng: &mut impl Rng) {
        match self.state() {
            GameState::MainMenu => {
                if let Some(action) = self.main_menu.hit(pos) {
                    self.apply(action, now, rng);
                }
            }
            GameState::Paused => match self.overlay_menu.hit(pos) {
                Some(action) => self.apply(action, now, rng),
                // A click outside every item closes the menu without action
                None => self.resume(),
            },
            GameState::Finished => {
                if let Some(action) = self.overlay_menu.hit(pos) {
                    self.apply(action, now, rng);
                }
            }
            GameState::Playing => {}
        }
    }

    fn resume(&mut self) {
        self.session.paused = false;
        self.overlay_menu.clear_dwell();
        // The countdown interval restarts on the next Playing tick, so time
        // spent paused is not charged to the player.
        self.countdown_last = None;
    }

    fn tick_countdown(&mut self, now: Instant, rng: &mut impl Rng) {
        if !self.session.mode.map_or(false, |m| m.is_timed()) {
            return;
        }
        let last = match self.countdown_last {
            Some(t) => t,
            None => {
                self.countdown_last = Some(now);
                return;
            }
        };
        if now.duration_since(last) >= Duration::from_secs(1) {
            self.countdown_last = Some(now);
            self.session.remaining_secs = self.session.remaining_secs.saturating_sub(1);
            if self.session.remaining_secs == 0 {
                self.session.finished = true;
                self.session.success = false;
                self.overlay_menu.shuffle(rng);
            }
        }
    }

    fn apply(&mut self, action: MenuAction, now: Instant, rng: &mut impl Rng) {
        match action {
            MenuAction::Start(mode) => {
                self.session.reset();
                self.session.mode = Some(mode);
                self.session.started = true;
                self.session.remaining_secs = self.config.speed_time_limit;
                self.begin_attempt(mode, now, rng);
            }
            MenuAction::Restart => {
                let mode = match self.session.mode {
                    Some(m) => m,
                    None => return,
                };
                self.session.paused = false;
                self.session.finished = false;
                self.session.success = false;
                self.session.score = 0;
                self.session.remaining_secs = self.config.speed_time_limit;
                self.begin_attempt(mode, now, rng);
            }
            MenuAction::Home => {
                self.session.reset();
                self.session.remaining_secs = self.config.speed_time_limit;
                self.engine.reset();
                self.started_at = None;
                self.countdown_last = None;
                self.main_menu.shuffle(rng);
            }
        }
    }

    fn begin_attempt(&mut self, mode: Mode, now: Instant, rng: &mut impl Rng) {
        self.engine.start_round(mode, now, &mut self.generator, rng);
        self.started_at = Some(now);
        self.countdown_last = None;
        self.left_trail.clear();
        self.right_trail.clear();
    }

    /// Read-only view for the renderer.
    pub fn snapshot(&self, now: Instant) -> Snapshot {
        let state = self.state();
        let center = Point::new(self.config.width / 2.0, self.config.height / 2.0);

        let targets = if state == GameState::Playing {
            self.engine
                .targets()
                .targets
                .iter()
                .enumerate()
                .map(|(i, t)| TargetView {
                    letter: t.letter,
                    pos: t.pos,
                    state: t.state,
                    dwell_progress: self.engine.dwell_progress(i, now),
                })
                .collect()
        } else {
            Vec::new()
        };

        let menu_src = match state {
            GameState::MainMenu => Some(&self.main_menu),
            GameState::Paused | GameState::Finished => Some(&self.overlay_menu),
            GameState::Playing => None,
        };
        let menu = menu_src
            .map(|m| {
                m.items()
                    .iter()
                    .enumerate()
                    .map(|(i, item)| MenuItemView {
                        label: item.label.clone(),
                        bounds: item.bounds,
                        action: item.action,
                        hovered: m.is_hovered(i),
                        dwell_progress: m.dwell_progress(i, now),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Snapshot {
            state,
            mode: self.session.mode,
            targets,
            collected: self.engine.collected().to_vec(),
            word_len: self.engine.word().len(),
            score: self.session.score,
            success: self.session.success,
            remaining_secs: self
                .session
                .mode
                .filter(|m| m.is_timed())
                .map(|_| self.session.remaining_secs),
            menu,
            cursor: self.last_pointer.unwrap_or(center),
            face_visible: self.last_pointer.is_some(),
            left_trail: self.left_trail.points().collect(),
            right_trail: self.right_trail.points().collect(),
        }
    }
}
