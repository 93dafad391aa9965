//! Screen flow
//!
//! `MainMenu -> LevelSelect -> Playing | PlayingSpecial -> GameOver -> LevelSelect`,
//! plus a direct quit from either playing screen back to level select.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::levels::LevelCatalog;
use crate::platform::{Key, RawInput, Runtime, normalize};
use crate::sim::{GameEvent, Outcome, Session, TickInput, tick};
use crate::snapshot::{GameplaySnapshot, LevelEntry, RenderState};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    MainMenu,
    LevelSelect,
    Playing,
    PlayingSpecial,
    GameOver,
}

impl Screen {
    pub fn is_playing(self) -> bool {
        matches!(self, Screen::Playing | Screen::PlayingSpecial)
    }
}

/// What the game-over screen shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelResult {
    pub level_index: usize,
    pub level_name: String,
    pub outcome: Outcome,
    /// Final meter value
    pub meter: u8,
    pub caught_good: u32,
    pub caught_bad: u32,
    pub time_left: f32,
}

impl LevelResult {
    pub fn message(&self) -> &'static str {
        self.outcome.message()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Level index outside the catalog
    InvalidLevelIndex { index: usize, len: usize },
    /// Retry before any level was started
    NothingToRetry,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidLevelIndex { index, len } => {
                write!(f, "level {index} does not exist ({len} levels)")
            }
            AppError::NothingToRetry => write!(f, "no level has been played yet"),
        }
    }
}

impl std::error::Error for AppError {}

/// Top-level game: catalog, current screen and the active session
#[derive(Debug)]
pub struct App {
    catalog: LevelCatalog,
    screen: Screen,
    session: Option<Session>,
    last_level: Option<usize>,
    result: Option<LevelResult>,
    /// Autoplay, toggled with `Key::I`
    idle_mode: bool,
    /// Hands out a fresh seed per attempt
    seeds: Pcg32,
}

impl App {
    pub fn new(catalog: LevelCatalog, seed: u64) -> Self {
        Self {
            catalog,
            screen: Screen::MainMenu,
            session: None,
            last_level: None,
            result: None,
            idle_mode: false,
            seeds: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn result(&self) -> Option<&LevelResult> {
        self.result.as_ref()
    }

    pub fn idle_mode(&self) -> bool {
        self.idle_mode
    }

    pub fn set_idle_mode(&mut self, on: bool) {
        if on != self.idle_mode {
            self.idle_mode = on;
            log::info!("Idle mode: {on}");
        }
    }

    /// Act on this frame's key presses and return the input for `frame`
    pub fn handle_input(&mut self, rt: &mut Runtime, raw: &RawInput) -> TickInput {
        if raw.was_pressed(Key::Escape) {
            self.escape(rt);
        }
        if raw.was_pressed(Key::I) {
            self.set_idle_mode(!self.idle_mode);
        }
        normalize(raw, self.idle_mode)
    }

    /// "Play" on the main menu
    pub fn open_level_select(&mut self) {
        self.set_screen(Screen::LevelSelect);
    }

    /// Start (or restart) the level at `index`
    pub fn start_level(&mut self, rt: &mut Runtime, index: usize) -> Result<(), AppError> {
        let level = self
            .catalog
            .get(index)
            .ok_or(AppError::InvalidLevelIndex {
                index,
                len: self.catalog.len(),
            })?
            .clone();

        let seed = self.seeds.random::<u64>();
        let sprites = rt.sprite_pool(&level);
        let session = Session::new(level, seed, sprites);
        log::info!("Starting {} (seed {seed})", session.level.name);

        let track = rt.stage_track(&session.level, session.stage_index);
        rt.audio.play_stage_track(track);

        let screen = if session.level.mode.is_slice() {
            Screen::PlayingSpecial
        } else {
            Screen::Playing
        };
        self.session = Some(session);
        self.last_level = Some(index);
        self.result = None;
        self.set_screen(screen);
        Ok(())
    }

    /// "Retry" on the game-over screen
    pub fn retry(&mut self, rt: &mut Runtime) -> Result<(), AppError> {
        let index = self.last_level.ok_or(AppError::NothingToRetry)?;
        self.start_level(rt, index)
    }

    /// Escape key: back out one screen
    pub fn escape(&mut self, rt: &mut Runtime) {
        match self.screen {
            Screen::Playing | Screen::PlayingSpecial => self.quit_to_level_select(rt),
            Screen::LevelSelect => self.set_screen(Screen::MainMenu),
            Screen::GameOver => self.set_screen(Screen::LevelSelect),
            Screen::MainMenu => {}
        }
    }

    /// Abandon the running level
    pub fn quit_to_level_select(&mut self, rt: &mut Runtime) {
        rt.audio.stop();
        if let Some(mut session) = self.session.take() {
            session.clear_entities();
        }
        self.set_screen(Screen::LevelSelect);
    }

    /// Run one frame of whatever screen is active
    pub fn frame(&mut self, rt: &mut Runtime, input: &TickInput, dt: f32) {
        if !self.screen.is_playing() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        tick(session, input, dt);

        let mut finished = None;
        for event in &session.events {
            match *event {
                GameEvent::StageChanged(stage) => {
                    log::debug!("Stage {stage}");
                    let track = rt.stage_track(&session.level, stage);
                    rt.audio.play_stage_track(track);
                }
                GameEvent::Finished(outcome) => finished = Some(outcome),
                _ => {}
            }
        }

        if let Some(outcome) = finished {
            self.result = Some(LevelResult {
                level_index: self.last_level.unwrap_or_default(),
                level_name: session.level.name.clone(),
                outcome,
                meter: session.meter.value(),
                caught_good: session.caught_good,
                caught_bad: session.caught_bad,
                time_left: session.time_left,
            });
            self.session = None;
            self.set_screen(Screen::GameOver);
        }
    }

    /// Level-select buttons
    pub fn level_select_entries(&self) -> Vec<LevelEntry> {
        self.catalog
            .iter()
            .enumerate()
            .map(|(index, level)| LevelEntry {
                index,
                label: level.select_label(index),
                slice_mode: level.mode.is_slice(),
            })
            .collect()
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> RenderState {
        match self.screen {
            Screen::MainMenu => RenderState::MainMenu,
            Screen::LevelSelect => RenderState::LevelSelect(self.level_select_entries()),
            Screen::Playing | Screen::PlayingSpecial => match &self.session {
                Some(session) => RenderState::InGame(Box::new(GameplaySnapshot::capture(session))),
                None => RenderState::LevelSelect(self.level_select_entries()),
            },
            Screen::GameOver => match &self.result {
                Some(result) => RenderState::GameOver(result.clone()),
                None => RenderState::LevelSelect(self.level_select_entries()),
            },
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        if screen != self.screen {
            log::info!("Screen: {:?} -> {:?}", self.screen, screen);
            self.screen = screen;
        }
    }
}
