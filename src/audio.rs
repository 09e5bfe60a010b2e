//! Sound effects
//!
//! The simulation only names sounds. Playing them is up to a caller-supplied
//! `AudioSink` (Web Audio, a native mixer, or nothing at all); each effect
//! carries a small procedural recipe a sink can synthesize from, so no sample
//! files are needed.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Sound effect vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Regular volley fired
    Shoot,
    /// Laser pulse fired
    Laser,
    /// Enemy or boss destroyed
    Explosion,
    /// Bullet hit that didn't kill
    Hit,
    /// Power or weapon pickup
    PowerUp,
    /// Bomb detonated
    Bomb,
    /// Shield pickup
    Shield,
    /// Bomb pickup
    BombItem,
    /// Enemy or boss fired
    EnemyShoot,
    /// Player took damage
    PlayerHit,
    GameOver,
    /// Run started / boss incoming
    Start,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 12] = [
        SoundEffect::Shoot,
        SoundEffect::Laser,
        SoundEffect::Explosion,
        SoundEffect::Hit,
        SoundEffect::PowerUp,
        SoundEffect::Bomb,
        SoundEffect::Shield,
        SoundEffect::BombItem,
        SoundEffect::EnemyShoot,
        SoundEffect::PlayerHit,
        SoundEffect::GameOver,
        SoundEffect::Start,
    ];

    /// Stable event name passed to the audio collaborator
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::Laser => "laser",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Hit => "hit",
            SoundEffect::PowerUp => "powerUp",
            SoundEffect::Bomb => "bomb",
            SoundEffect::Shield => "shield",
            SoundEffect::BombItem => "bombItem",
            SoundEffect::EnemyShoot => "enemyShoot",
            SoundEffect::PlayerHit => "playerHit",
            SoundEffect::GameOver => "gameOver",
            SoundEffect::Start => "start",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Oscillator layers making up the effect, all starting together
    pub fn recipe(&self) -> &'static [Tone] {
        match self {
            SoundEffect::Shoot => recipes::SHOOT,
            SoundEffect::Laser => recipes::LASER,
            SoundEffect::Explosion => recipes::EXPLOSION,
            SoundEffect::Hit => recipes::HIT,
            SoundEffect::PowerUp => recipes::POWER_UP,
            SoundEffect::Bomb => recipes::BOMB,
            SoundEffect::Shield => recipes::SHIELD,
            SoundEffect::BombItem => recipes::BOMB_ITEM,
            SoundEffect::EnemyShoot => recipes::ENEMY_SHOOT,
            SoundEffect::PlayerHit => recipes::PLAYER_HIT,
            SoundEffect::GameOver => recipes::GAME_OVER,
            SoundEffect::Start => recipes::START,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator layer: exponential pitch sweep with a decaying gain envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration_secs: f32,
    pub gain: f32,
}

impl Tone {
    pub const fn new(
        waveform: Waveform,
        start_hz: f32,
        end_hz: f32,
        duration_secs: f32,
        gain: f32,
    ) -> Self {
        Self {
            waveform,
            start_hz,
            end_hz,
            duration_secs,
            gain,
        }
    }
}

/// Per-effect oscillator layers
mod recipes {
    use super::Tone;
    use super::Waveform::*;

    pub(super) const SHOOT: &[Tone] = &[Tone::new(Sawtooth, 1000.0, 200.0, 0.08, 0.12)];
    pub(super) const LASER: &[Tone] = &[Tone::new(Sine, 600.0, 400.0, 0.06, 0.08)];
    pub(super) const EXPLOSION: &[Tone] = &[
        Tone::new(Sine, 60.0, 30.0, 0.4, 0.4),
        Tone::new(Triangle, 40.0, 20.0, 0.3, 0.25),
        Tone::new(Sawtooth, 200.0, 50.0, 0.1, 0.2),
    ];
    pub(super) const HIT: &[Tone] = &[Tone::new(Square, 300.0, 150.0, 0.05, 0.1)];
    pub(super) const POWER_UP: &[Tone] = &[
        Tone::new(Sine, 400.0, 800.0, 0.15, 0.2),
        Tone::new(Triangle, 600.0, 1200.0, 0.2, 0.1),
    ];
    pub(super) const BOMB: &[Tone] = &[
        Tone::new(Sawtooth, 150.0, 20.0, 0.8, 0.5),
        Tone::new(Sine, 80.0, 25.0, 1.0, 0.4),
    ];
    pub(super) const SHIELD: &[Tone] = &[Tone::new(Sine, 300.0, 900.0, 0.3, 0.15)];
    pub(super) const BOMB_ITEM: &[Tone] = &[Tone::new(Triangle, 200.0, 600.0, 0.2, 0.2)];
    pub(super) const ENEMY_SHOOT: &[Tone] = &[Tone::new(Square, 400.0, 100.0, 0.1, 0.08)];
    pub(super) const PLAYER_HIT: &[Tone] = &[Tone::new(Sawtooth, 200.0, 60.0, 0.2, 0.3)];
    pub(super) const GAME_OVER: &[Tone] = &[
        Tone::new(Triangle, 440.0, 110.0, 1.0, 0.3),
        Tone::new(Sine, 220.0, 55.0, 1.2, 0.2),
    ];
    pub(super) const START: &[Tone] = &[
        Tone::new(Square, 330.0, 660.0, 0.2, 0.15),
        Tone::new(Sine, 660.0, 990.0, 0.3, 0.1),
    ];
}

/// Whatever actually makes noise
pub trait AudioSink {
    /// Play `effect` at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards everything (headless runs)
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Logs every effect at trace level
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sound {} @ {:.2}", effect.name(), volume);
    }
}

/// Keeps played effects in order. Clones share one log, so a caller can hand
/// one clone to an `AudioManager` and inspect the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    played: Rc<RefCell<Vec<SoundEffect>>>,
}

impl RecordingSink {
    pub fn played(&self) -> Vec<SoundEffect> {
        self.played.borrow().clone()
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, effect: SoundEffect, _volume: f32) {
        self.played.borrow_mut().push(effect);
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }
}
