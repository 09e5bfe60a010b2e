//! Air Strike entry point
//!
//! Headless runner: loads configuration from the environment, lets the
//! autopilot play one session on a manual clock, and prints the final frame
//! as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use air_strike::audio::LogSink;
    use air_strike::platform::{Clock, ManualClock};
    use air_strike::sim::{GameEvent, GamePhase};
    use air_strike::{Game, GameConfig, Settings};

    /// One display refresh at 60 Hz
    const FRAME_MS: u64 = 16;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let config = GameConfig::load_or_default();
        if let Err(e) = config.validate() {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
        log::info!(
            "Air Strike starting ({}x{}, {:?} movement, {:?} roster, seed {})",
            config.arena_width,
            config.arena_height,
            config.movement,
            config.roster,
            config.seed
        );

        let settings_path = PathBuf::from(Settings::FILE_NAME);
        let settings = Settings::load_from(&settings_path);
        let mut game = Game::new(&config, Box::new(LogSink), settings).with_settings_path(settings_path);

        let mut clock = ManualClock::new(1000);
        game.set_autopilot(true);
        game.start_game();

        for _ in 0..MAX_FRAMES {
            let events = game.frame(clock.now_ms());
            for event in &events {
                match event {
                    GameEvent::LevelUp { level } => log::info!("Level {}", level),
                    GameEvent::BossDefeated { score } => log::info!("Boss down (+{})", score),
                    _ => {}
                }
            }
            if game.phase() == GamePhase::GameOver {
                break;
            }
            clock.advance(FRAME_MS);
        }

        let state = game.state();
        log::info!(
            "Session over after {} frames: score {}, level {}, stage {}, max combo {}, {} fps",
            state.frame,
            state.score,
            state.level,
            state.stage,
            state.max_combo,
            game.fps()
        );

        match serde_json::to_string_pretty(&game.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive `air_strike::Game` directly; there is no headless runner here
}
