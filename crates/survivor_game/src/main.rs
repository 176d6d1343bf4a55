use std::path::{Path, PathBuf};

use survivor_core::{Clock, SystemClock};
use survivor_game::assets::AssetCatalog;
use survivor_game::config::{load_config_from_path, GameConfig};
use survivor_game::headless::{RecordingAudio, RecordingCanvas};
use survivor_game::map::{load_map_from_path, MapFile, MapSource};
use survivor_game::replay::{default_script, load_replay_from_path, run_script, ReplayScript};
use survivor_game::Game;

const CONFIG_PATH: &str = "assets/config/game.json";
const MAP_PATH: &str = "assets/maps/world.json";
const REPLAY_PATH: &str = "assets/replays/smoke.json";
const IMAGES_DIR: &str = "assets/images";
const FALLBACK_ARENA_TILES: i32 = 20;

fn load_config() -> GameConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        log::warn!("Config file '{}' not found; using defaults.", path.display());
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config: {}", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}; using defaults.");
            GameConfig::default()
        }
    }
}

fn load_map(config: &GameConfig) -> Box<dyn MapSource> {
    match load_map_from_path(Path::new(MAP_PATH)) {
        Ok(map) => {
            log::info!("Loaded map '{}' ({} px tiles)", map.map_id, map.tile_size);
            Box::new(map)
        }
        Err(err) => {
            log::error!("{err}; using the fallback arena.");
            Box::new(MapFile::fallback_arena(
                config.tile_size,
                FALLBACK_ARENA_TILES,
            ))
        }
    }
}

fn load_script(path: &Path, config: &GameConfig) -> ReplayScript {
    match load_replay_from_path(path) {
        Ok(script) => {
            log::info!(
                "Loaded replay: {} ({} frames)",
                path.display(),
                script.frames.len()
            );
            script
        }
        Err(err) => {
            log::warn!("{err}; using the built-in replay.");
            default_script(config.viewport())
        }
    }
}

fn run<C: Clock>(
    clock: C,
    config: GameConfig,
    catalog: AssetCatalog,
    map: Box<dyn MapSource>,
    script: &ReplayScript,
) -> Game<C, RecordingCanvas, RecordingAudio> {
    let mut game = Game::new(
        config,
        catalog,
        map,
        clock,
        RecordingCanvas::new(),
        RecordingAudio::new(),
    );
    let summary = run_script(&mut game, script);
    log::info!(
        "Run complete: {} ticks, {} frames presented, {} sounds played, final state {:?}, score {}, lives {}",
        summary.ticks,
        game.canvas().frames_presented(),
        game.audio().sounds.len(),
        summary.final_state,
        summary.score,
        summary.lives
    );
    game
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Survivor starting...");

    let config = load_config();
    let mut catalog = AssetCatalog::placeholder(config.viewport());
    let masks = catalog.load_masks_from_dir(Path::new(IMAGES_DIR));
    log::info!("Asset catalog: {} images, {} alpha masks", catalog.len(), masks);
    let map = load_map(&config);

    let replay_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(REPLAY_PATH));
    let script = load_script(&replay_path, &config);

    if script.realtime {
        let clock = SystemClock::new(config.target_fps);
        let game = run(clock, config, catalog, map, &script);
        let clock = game.clock();
        log::info!(
            "Frame pacing: {} frames at {:.1} fps ({:.2}ms per frame)",
            clock.frame_count,
            clock.smoothed_fps,
            clock.smoothed_frame_time_ms
        );
    } else {
        let clock = script.manual_clock();
        run(clock, config, catalog, map, &script);
    }
}
