//! Command facade for hosts
//!
//! Input adapters call the command methods whenever the player acts; the render
//! loop calls `frame(now)` once per display refresh and reads `snapshot()`.
//! Sound events raised by the simulation are forwarded to the audio sink.

use std::path::PathBuf;

use glam::Vec2;

use crate::audio::{AudioManager, AudioSink};
use crate::config::GameConfig;
use crate::platform::FrameClock;
use crate::settings::Settings;
use crate::sim::{
    FrameSnapshot, GameEvent, GamePhase, GameState, SkillError, SkillKind, TickInput, fire_bomb,
    skills, tick,
};

/// One running game plus its collaborators
pub struct Game {
    state: GameState,
    /// Commands waiting for the next frame
    input: TickInput,
    audio: AudioManager,
    settings: Settings,
    settings_path: Option<PathBuf>,
    frame_clock: FrameClock,
}

impl Game {
    pub fn new(config: &GameConfig, sink: Box<dyn AudioSink>, settings: Settings) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Running with unvalidated config: {}", e);
        }
        let mut audio = AudioManager::new(sink);
        audio.set_muted(!settings.sound_enabled);
        Self {
            state: GameState::new(config),
            input: TickInput::default(),
            audio,
            settings,
            settings_path: None,
            frame_clock: FrameClock::default(),
        }
    }

    /// Persist the sound preference to `path` whenever it is toggled
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Pointer/touch moved to `(x, y)` in arena coordinates
    pub fn set_move_target(&mut self, x: f32, y: f32) {
        self.input.move_target = Some(Vec2::new(x, y));
        self.input.clear_target = false;
    }

    /// Pointer released
    pub fn clear_move_target(&mut self) {
        self.input.move_target = None;
        self.input.clear_target = true;
    }

    /// Detonate a bomb right away. Returns false if nothing happened.
    pub fn fire_bomb(&mut self) -> bool {
        let now = self.state.now;
        let fired = fire_bomb(&mut self.state, now);
        self.dispatch_events();
        fired
    }

    pub fn activate_skill(&mut self, kind: SkillKind) -> Result<(), SkillError> {
        let now = self.state.now;
        let result = skills::activate(&mut self.state, kind, now);
        if let Err(err) = &result {
            log::info!("Skill {} refused: {}", kind.as_str(), err);
        }
        self.dispatch_events();
        result
    }

    /// Flip the sound preference. Returns the new value.
    pub fn toggle_sound(&mut self) -> bool {
        let enabled = self.settings.toggle_sound();
        self.audio.set_muted(!enabled);
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save_to(path) {
                log::warn!("Failed to save settings: {}", e);
            }
        }
        enabled
    }

    /// Start or restart a run on the next frame
    pub fn start_game(&mut self) {
        self.input.start = true;
    }

    /// Pause or resume on the next frame
    pub fn toggle_pause(&mut self) {
        self.input.pause = !self.input.pause;
    }

    /// Let the built-in pilot play
    pub fn set_autopilot(&mut self, on: bool) {
        self.input.autopilot = on;
    }

    /// Simulate one frame at wall-clock `now` (ms). Returns the non-sound events
    /// raised during the frame.
    pub fn frame(&mut self, now: u64) -> Vec<GameEvent> {
        self.frame_clock.record(now);

        let input = self.input.clone();
        tick(&mut self.state, &input, now);

        // One-shot commands are consumed; steering and autopilot persist
        self.input.start = false;
        self.input.pause = false;
        self.input.bomb = false;
        self.input.skill = None;
        self.input.clear_target = false;
        if !input.autopilot {
            self.input.move_target = None;
        }

        self.dispatch_events()
    }

    fn dispatch_events(&mut self) -> Vec<GameEvent> {
        let mut rest = Vec::new();
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(effect) => self.audio.play(effect),
                other => rest.push(other),
            }
        }
        rest
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fps(&self) -> u32 {
        self.frame_clock.fps()
    }
}
