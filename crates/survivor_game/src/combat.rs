//! Per-tick combat resolution, run after every entity has moved.
//!
//! Order is fixed: bullets against enemies first, then enemies against the
//! player. An enemy's kill is recorded at most once, so score is awarded at
//! most once per enemy no matter how many bullets or radius kills reach it in
//! the same tick.

use std::sync::Arc;

use glam::Vec2;

use crate::assets::AssetCatalog;
use crate::bullet::Bullet;
use crate::collision::Aabb;
use crate::enemy::Enemy;
use crate::entity::{DrawItem, Entity};
use crate::mask::{masks_collide, CollisionMask};
use crate::player::Player;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CombatOutcome {
    /// Bullets consumed by a hit this tick.
    pub bullet_hits: u32,
    /// Enemies newly killed this tick, by bullets or the radius burst.
    pub kills: u32,
    pub player_hit: bool,
    /// Where the player was when hit, for the death burst.
    pub hit_position: Option<Vec2>,
}

impl CombatOutcome {
    pub fn score(&self) -> u32 {
        self.kills
    }
}

fn mask_for(catalog: &AssetCatalog, item: &DrawItem) -> Arc<CollisionMask> {
    catalog.mask_of(&item.image, item.rect.size())
}

/// Bullets against every enemy still in the world. A bullet that overlaps any
/// enemy is consumed, including one already in its death animation; only the
/// first kill of each enemy counts. Consumed bullets are removed after the
/// pass.
pub fn resolve_bullets(
    bullets: &mut Vec<Bullet>,
    enemies: &mut [Enemy],
    catalog: &AssetCatalog,
    now_ms: u64,
) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    if bullets.is_empty() || enemies.is_empty() {
        return outcome;
    }

    let targets: Vec<(usize, Aabb, Arc<CollisionMask>)> = enemies
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let item = e.draw_item();
            (i, item.rect, mask_for(catalog, &item))
        })
        .collect();

    let mut consumed = vec![false; bullets.len()];
    for (slot, bullet) in bullets.iter().enumerate() {
        let item = bullet.draw_item();
        let mask = mask_for(catalog, &item);
        for (index, rect, enemy_mask) in &targets {
            if !masks_collide(&item.rect, &mask, rect, enemy_mask) {
                continue;
            }
            consumed[slot] = true;
            if enemies[*index].kill(now_ms) {
                outcome.kills += 1;
                log::debug!("Enemy {index} killed by bullet");
            }
        }
        if consumed[slot] {
            outcome.bullet_hits += 1;
        }
    }

    let mut flags = consumed.into_iter();
    bullets.retain(|_| !flags.next().unwrap_or(false));
    outcome
}

/// Enemies against the player. Skipped while the player is invulnerable. A
/// hit costs one life, opens the invulnerability window and kills every
/// enemy within `radius` of the player's centre.
pub fn resolve_player(
    player: &mut Player,
    enemies: &mut [Enemy],
    catalog: &AssetCatalog,
    now_ms: u64,
    radius: f32,
) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    if player.invulnerability.is_active() {
        return outcome;
    }

    let item = player.draw_item();
    let mask = mask_for(catalog, &item);
    let touched = enemies.iter().filter(|e| !e.is_dying()).any(|e| {
        let enemy_item = e.draw_item();
        masks_collide(&item.rect, &mask, &enemy_item.rect, &mask_for(catalog, &enemy_item))
    });
    if !touched {
        return outcome;
    }

    player.take_hit(now_ms);
    let center = player.position();
    outcome.player_hit = true;
    outcome.hit_position = Some(center);

    for enemy in enemies.iter_mut() {
        if enemy.position().distance(center) <= radius && enemy.kill(now_ms) {
            outcome.kills += 1;
        }
    }
    log::info!(
        "Player hit: {} lives left, {} enemies caught in the burst",
        player.lives,
        outcome.kills
    );
    outcome
}
