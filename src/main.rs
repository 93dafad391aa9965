//! Polutio - headless runner
//!
//! Plays the configured demo level in autoplay mode at the target frame rate
//! and logs the result. Set `RUST_LOG=debug` to follow power-ups and stage
//! changes.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use polutio::platform::{RawInput, Runtime};
use polutio::{App, LevelCatalog, Screen, Settings};

/// Optional user catalog next to the settings file
const LEVELS_FILE: &str = "levels.json";

fn load_catalog() -> LevelCatalog {
    let path = Path::new(LEVELS_FILE);
    if !path.exists() {
        return LevelCatalog::builtin();
    }
    match LevelCatalog::load(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::warn!("Ignoring {LEVELS_FILE}: {e}");
            LevelCatalog::builtin()
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Polutio (headless) starting...");

    let settings_path = Path::new(Settings::FILE_NAME);
    let settings = Settings::load_from(settings_path);
    if !settings_path.exists() {
        // Leave a file with the defaults to edit
        if let Err(e) = settings.save_to(settings_path) {
            log::warn!("Cannot write {}: {e}", settings_path.display());
        }
    }
    let seed = settings.seed.unwrap_or_else(clock_seed);
    let demo_level = settings.demo_level;
    let time_cap = settings.demo_time_cap;

    let mut rt = Runtime::init(settings);
    let mut app = App::new(load_catalog(), seed);

    app.open_level_select();
    if let Err(e) = app.start_level(&mut rt, demo_level) {
        log::error!("Cannot start demo: {e}");
        rt.shutdown();
        return;
    }

    // No window: nothing is ever pressed, the demo plays itself
    app.set_idle_mode(true);
    let raw = RawInput::default();
    let mut elapsed = 0.0;
    while app.screen().is_playing() && elapsed < time_cap {
        let dt = rt.clock.tick();
        let input = app.handle_input(&mut rt, &raw);
        app.frame(&mut rt, &input, dt);
        elapsed += dt;
    }

    match (app.screen(), app.result()) {
        (Screen::GameOver, Some(result)) => log::info!(
            "{}: {} | final {}% | {} good / {} bad caught | {:.1}s left",
            result.level_name,
            result.message(),
            result.meter,
            result.caught_good,
            result.caught_bad,
            result.time_left
        ),
        _ => {
            if let Some(session) = app.session() {
                log::info!(
                    "Demo stopped after {elapsed:.1}s at {}% ({} fps)",
                    session.meter.value(),
                    rt.clock.fps()
                );
            }
            app.quit_to_level_select(&mut rt);
        }
    }

    rt.shutdown();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No web front end; the library is driven by the embedding page
}
