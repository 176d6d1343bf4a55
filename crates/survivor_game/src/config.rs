//! Tuning constants loaded from JSON, with validation.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use glam::Vec2;

/// Gameplay tuning. Every field may be omitted from the JSON file; omitted
/// fields keep their default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub tile_size: u32,
    pub target_fps: u32,

    pub player_speed: f32,
    pub player_animation_fps: f32,
    pub player_max_lives: u32,
    pub invulnerability_ms: u64,
    pub death_effect_radius: f32,
    pub death_effect_frame_ms: u64,

    pub enemy_speed: f32,
    pub enemy_animation_fps: f32,
    pub enemy_spawn_interval_ms: u64,
    pub enemy_death_ms: u64,

    pub bullet_speed: f32,
    pub bullet_lifetime_ms: u64,
    pub gun_cooldown_ms: u64,
    pub gun_distance: f32,
    pub muzzle_offset: f32,

    pub loading_duration_ms: u64,
    pub loading_frame_ms: u64,

    pub music_volume: f32,
    pub sfx_volume: f32,

    /// Fixed seed for enemy spawn selection. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 1440,
            window_height: 720,
            tile_size: 64,
            target_fps: 60,
            player_speed: 500.0,
            player_animation_fps: 5.0,
            player_max_lives: 4,
            invulnerability_ms: 1000,
            death_effect_radius: 200.0,
            death_effect_frame_ms: 50,
            enemy_speed: 200.0,
            enemy_animation_fps: 6.0,
            enemy_spawn_interval_ms: 300,
            enemy_death_ms: 400,
            bullet_speed: 1200.0,
            bullet_lifetime_ms: 1000,
            gun_cooldown_ms: 100,
            gun_distance: 140.0,
            muzzle_offset: 50.0,
            loading_duration_ms: 3000,
            loading_frame_ms: 100,
            music_volume: 0.5,
            sfx_volume: 0.5,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.window_width as f32, self.window_height as f32)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.window_width == 0 || config.window_height == 0 {
        return Err("Config validation failed: window size must be > 0".to_string());
    }
    if config.tile_size == 0 || config.target_fps == 0 {
        return Err("Config validation failed: tile_size and target_fps must be > 0".to_string());
    }
    if config.player_max_lives == 0 {
        return Err("Config validation failed: player_max_lives must be > 0".to_string());
    }
    let speeds = [
        ("player_speed", config.player_speed),
        ("enemy_speed", config.enemy_speed),
        ("bullet_speed", config.bullet_speed),
    ];
    for (name, value) in speeds {
        if !(value > 0.0) {
            return Err(format!("Config validation failed: {name} must be > 0"));
        }
    }
    let durations = [
        ("bullet_lifetime_ms", config.bullet_lifetime_ms),
        ("enemy_death_ms", config.enemy_death_ms),
        ("death_effect_frame_ms", config.death_effect_frame_ms),
        ("loading_frame_ms", config.loading_frame_ms),
    ];
    for (name, value) in durations {
        if value == 0 {
            return Err(format!("Config validation failed: {name} must be > 0"));
        }
    }
    for (name, value) in [
        ("music_volume", config.music_volume),
        ("sfx_volume", config.sfx_volume),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!(
                "Config validation failed: {name} must be within [0, 1], got {value}"
            ));
        }
    }
    Ok(())
}
