//! One playthrough's worth of mutable state.
//!
//! A [`Session`] is built in one go from the map and replaced wholesale on
//! every new game or restart; nothing carries over from the previous one.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::assets::{
    AssetCatalog, BULLET_SIZE, EFFECT_FRAME_SIZE, ENEMY_FRAME_SIZE, GUN_SIZE, PLAYER_FRAME_SIZE,
};
use crate::bullet::Bullet;
use crate::collision::{Aabb, Obstacles};
use crate::combat::{resolve_bullets, resolve_player, CombatOutcome};
use crate::config::GameConfig;
use crate::effect::DeathEffect;
use crate::enemy::Enemy;
use crate::entity::{Entity, FrameContext, StaticSprite};
use crate::map::{
    MapSource, LAYER_COLLISIONS, LAYER_ENTITIES, LAYER_GROUND, LAYER_OBJECTS, PLAYER_SPAWN,
};
use crate::platform::{Canvas, Rgb, TextAlign};
use crate::player::{Gun, Player};
use crate::render::RenderGroup;
use crate::timers::{FireCooldown, SpawnTicker};

const HUD_ORIGIN: Vec2 = Vec2::new(20.0, 20.0);
const HEART_SPACING: f32 = 50.0;
const SCORE_POS: Vec2 = Vec2::new(20.0, 80.0);
const SCORE_TEXT_SIZE: u32 = 48;

pub struct Session {
    config: GameConfig,
    pub player: Player,
    pub gun: Gun,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub effects: Vec<DeathEffect>,
    statics: Vec<StaticSprite>,
    pub obstacles: Obstacles,
    pub spawn_points: Vec<Vec2>,
    pub fire: FireCooldown,
    pub spawner: SpawnTicker,
    pub score: u32,
    group: RenderGroup,
}

impl Session {
    pub fn new(
        map: &dyn MapSource,
        catalog: &AssetCatalog,
        config: &GameConfig,
        now_ms: u64,
    ) -> Self {
        let tile = map.tile_size() as f32;
        let mut statics = Vec::new();
        let mut obstacles = Obstacles::default();

        for t in map.tiles(LAYER_GROUND) {
            let top_left = Vec2::new(t.x as f32 * tile, t.y as f32 * tile);
            let size = catalog.size_of(&t.image, Vec2::splat(tile));
            statics.push(StaticSprite::ground(t.image, top_left, size));
        }

        for obj in map.objects(LAYER_OBJECTS) {
            let top_left = Vec2::new(obj.x, obj.y);
            let declared = Vec2::new(obj.width, obj.height);
            match obj.image {
                Some(image) => {
                    let size = catalog.size_of(&image, declared.max(Vec2::ONE));
                    obstacles.push(Aabb::from_top_left(top_left, size));
                    statics.push(StaticSprite::object(image, top_left, size));
                }
                None => {
                    log::warn!(
                        "Object '{}' at ({}, {}) has no image; kept as invisible wall",
                        obj.name,
                        obj.x,
                        obj.y
                    );
                    obstacles.push(Aabb::from_top_left(top_left, declared.max(Vec2::ONE)));
                }
            }
        }

        for obj in map.objects(LAYER_COLLISIONS) {
            let size = Vec2::new(obj.width, obj.height).max(Vec2::ONE);
            obstacles.push(Aabb::from_top_left(Vec2::new(obj.x, obj.y), size));
        }

        let mut player_spawn = None;
        let mut spawn_points = Vec::new();
        for obj in map.objects(LAYER_ENTITIES) {
            let point = Vec2::new(obj.x, obj.y);
            if obj.name == PLAYER_SPAWN {
                player_spawn = Some(point);
            } else {
                spawn_points.push(point);
            }
        }
        let player_spawn = player_spawn.unwrap_or_else(|| {
            log::warn!("Map has no '{PLAYER_SPAWN}' entity; spawning the player at the origin");
            Vec2::ZERO
        });
        if spawn_points.is_empty() {
            log::warn!("Map has no enemy spawn points; no enemies will appear");
        }

        let frame_size = catalog
            .player
            .down
            .first()
            .map(|id| catalog.size_of(id, PLAYER_FRAME_SIZE))
            .unwrap_or(PLAYER_FRAME_SIZE);
        let player = Player::new(player_spawn, frame_size, catalog.player.clone(), config);
        let gun = Gun::new(
            catalog.gun.clone(),
            catalog.size_of(&catalog.gun, GUN_SIZE),
            player.position(),
            config,
        );

        log::info!(
            "Session ready: {} static sprites, {} obstacles, {} spawn points",
            statics.len(),
            obstacles.len(),
            spawn_points.len()
        );

        Self {
            config: config.clone(),
            player,
            gun,
            bullets: Vec::new(),
            enemies: Vec::new(),
            effects: Vec::new(),
            statics,
            obstacles,
            spawn_points,
            fire: FireCooldown::new(config.gun_cooldown_ms),
            spawner: SpawnTicker::new(config.enemy_spawn_interval_ms, now_ms),
            score: 0,
            group: RenderGroup::new(config.viewport()),
        }
    }

    pub fn static_count(&self) -> usize {
        self.statics.len()
    }

    /// Expire the fire cooldown and invulnerability windows.
    pub fn update_timers(&mut self, now_ms: u64) {
        self.fire.update(now_ms);
        self.player.invulnerability.update(now_ms);
    }

    /// Fire from the gun's muzzle if the cooldown allows it.
    pub fn try_fire(&mut self, catalog: &AssetCatalog, now_ms: u64) -> bool {
        if !self.fire.trigger(now_ms) {
            return false;
        }
        self.bullets.push(Bullet::new(
            catalog.bullet.clone(),
            catalog.size_of(&catalog.bullet, BULLET_SIZE),
            self.gun.muzzle(),
            self.gun.direction(),
            self.config.bullet_speed,
            now_ms,
            self.config.bullet_lifetime_ms,
        ));
        true
    }

    /// One enemy at a random spawn point with a random look. Does nothing if
    /// the map has no spawn points or the catalog has no enemy variants.
    pub fn spawn_enemy<R: Rng + ?Sized>(&mut self, rng: &mut R, catalog: &AssetCatalog) -> bool {
        let (Some(point), Some(variant)) = (
            self.spawn_points.choose(&mut *rng).copied(),
            catalog.enemy_variants.choose(&mut *rng),
        ) else {
            return false;
        };
        let size = variant
            .frames
            .first()
            .map(|id| catalog.size_of(id, ENEMY_FRAME_SIZE))
            .unwrap_or(ENEMY_FRAME_SIZE);
        self.enemies
            .push(Enemy::new(point, size, variant.frames.clone(), &self.config));
        log::debug!("Spawned {} at ({:.0}, {:.0})", variant.name, point.x, point.y);
        true
    }

    /// Advance every entity by one frame. The player moves first so the gun
    /// and enemies see its new position.
    pub fn update_entities(&mut self, dt: f32, now_ms: u64, move_intent: Vec2, aim: Vec2) {
        let mut ctx = FrameContext {
            dt,
            now_ms,
            obstacles: &self.obstacles,
            move_intent,
            aim,
            target: self.player.position(),
        };
        self.player.update(&ctx);
        ctx.target = self.player.position();

        self.gun.update(&ctx);
        for bullet in &mut self.bullets {
            bullet.update(&ctx);
        }
        for enemy in &mut self.enemies {
            enemy.update(&ctx);
        }
    }

    /// Drop expired bullets and enemies whose death animation has finished.
    pub fn compact(&mut self, now_ms: u64) {
        self.bullets.retain(|b| !b.is_expired());
        self.enemies.retain(|e| !e.is_finished(now_ms));
    }

    pub fn resolve_combat(&mut self, catalog: &AssetCatalog, now_ms: u64) -> CombatOutcome {
        let bullets = resolve_bullets(&mut self.bullets, &mut self.enemies, catalog, now_ms);
        let player = resolve_player(
            &mut self.player,
            &mut self.enemies,
            catalog,
            now_ms,
            self.config.death_effect_radius,
        );

        if let Some(at) = player.hit_position {
            if catalog.death_effect_frames.is_empty() {
                log::debug!("No death effect frames; skipping burst");
            } else {
                self.effects.push(DeathEffect::new(
                    at,
                    now_ms,
                    catalog.death_effect_frames.len(),
                    self.config.death_effect_frame_ms,
                ));
            }
        }

        let outcome = CombatOutcome {
            bullet_hits: bullets.bullet_hits,
            kills: bullets.kills + player.kills,
            player_hit: player.player_hit,
            hit_position: player.hit_position,
        };
        self.score += outcome.score();
        outcome
    }

    /// Ground then objects, camera centred on the player.
    pub fn draw_world(&mut self, canvas: &mut dyn Canvas) {
        canvas.fill(Rgb::BLACK);
        self.group.clear();
        self.group.extend(self.statics.iter().map(|s| s.draw_item()));
        self.group.push(self.player.draw_item());
        self.group.push(self.gun.draw_item());
        self.group.extend(self.enemies.iter().map(|e| e.draw_item()));
        self.group.extend(self.bullets.iter().map(|b| b.draw_item()));
        self.group.draw(canvas, self.player.position());
    }

    /// Draw live bursts over the world and forget finished ones.
    pub fn draw_effects(
        &mut self,
        canvas: &mut dyn Canvas,
        catalog: &AssetCatalog,
        now_ms: u64,
    ) {
        self.effects.retain(|e| !e.is_done(now_ms));
        let offset = self.group.offset();
        for effect in &self.effects {
            if let Some(image) = effect.image(&catalog.death_effect_frames, now_ms) {
                let size = catalog.size_of(image, EFFECT_FRAME_SIZE);
                canvas.draw_image(image, effect.position - size * 0.5 + offset);
            }
        }
    }

    pub fn draw_hud(&self, canvas: &mut dyn Canvas, catalog: &AssetCatalog) {
        for i in 0..self.config.player_max_lives {
            let heart = if i < self.player.lives {
                &catalog.heart_full
            } else {
                &catalog.heart_empty
            };
            canvas.draw_image(heart, HUD_ORIGIN + Vec2::new(i as f32 * HEART_SPACING, 0.0));
        }
        let text = format!("Score: {}", self.score);
        let shadow = SCORE_POS + Vec2::splat(2.0);
        canvas.draw_text(&text, shadow, SCORE_TEXT_SIZE, Rgb::BLACK, TextAlign::TopLeft);
        canvas.draw_text(&text, SCORE_POS, SCORE_TEXT_SIZE, Rgb::WHITE, TextAlign::TopLeft);
    }
}
