//! Enemies that chase the player and play a death animation once killed.

use glam::Vec2;
use survivor_core::{AnimationClip, AnimationState};

use crate::assets::ImageId;
use crate::collision::Aabb;
use crate::config::GameConfig;
use crate::entity::{DrawItem, Entity, FrameContext, Role};

pub const ENEMY_HITBOX_DELTA: Vec2 = Vec2::new(-20.0, -40.0);

/// A target-seeking enemy.
///
/// Killing an enemy is logical: it records the death time once, stops moving
/// and taking damage, and stays visible as a silhouette until its death
/// animation has run out. The session removes it after that.
#[derive(Debug, Clone)]
pub struct Enemy {
    rect: Aabb,
    hitbox: Aabb,
    speed: f32,
    frames: Vec<ImageId>,
    clip: AnimationClip,
    animation: AnimationState,
    death_time_ms: Option<u64>,
    death_duration_ms: u64,
}

impl Enemy {
    pub fn new(spawn: Vec2, frame_size: Vec2, frames: Vec<ImageId>, config: &GameConfig) -> Self {
        let rect = Aabb::from_center(spawn, frame_size);
        let clip = AnimationClip::from_fps(frames.len(), config.enemy_animation_fps);
        Self {
            rect,
            hitbox: rect.inflate(ENEMY_HITBOX_DELTA),
            speed: config.enemy_speed,
            frames,
            clip,
            animation: AnimationState::new(),
            death_time_ms: None,
            death_duration_ms: config.enemy_death_ms,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        self.hitbox
    }

    pub fn death_time_ms(&self) -> Option<u64> {
        self.death_time_ms
    }

    pub fn is_dying(&self) -> bool {
        self.death_time_ms.is_some()
    }

    /// Records the death time. Returns false if the enemy was already dead,
    /// in which case nothing changes.
    pub fn kill(&mut self, now_ms: u64) -> bool {
        if self.death_time_ms.is_some() {
            return false;
        }
        self.death_time_ms = Some(now_ms);
        true
    }

    /// True once the death animation has fully played.
    pub fn is_finished(&self, now_ms: u64) -> bool {
        match self.death_time_ms {
            Some(died) => now_ms.saturating_sub(died) >= self.death_duration_ms,
            None => false,
        }
    }

    pub fn current_image(&self) -> ImageId {
        if self.frames.is_empty() {
            return ImageId::new("enemy");
        }
        let index = if self.is_dying() {
            0
        } else {
            self.animation.frame_index % self.frames.len()
        };
        self.frames[index].clone()
    }
}

impl Entity for Enemy {
    fn rect(&self) -> Aabb {
        self.rect
    }

    fn update(&mut self, ctx: &FrameContext<'_>) {
        if self.is_dying() {
            return;
        }
        let direction = (ctx.target - self.rect.center()).normalize_or_zero();
        let delta = direction * self.speed * ctx.dt;
        self.hitbox = ctx.obstacles.move_and_collide(self.hitbox, delta.x, delta.y);
        self.rect.set_center(self.hitbox.center());

        let dt_us = (ctx.dt.max(0.0) * 1_000_000.0).round() as u64;
        self.animation.tick(dt_us, &self.clip);
    }

    fn draw_item(&self) -> DrawItem {
        DrawItem {
            silhouette: self.is_dying(),
            ..DrawItem::new(Role::Object, self.current_image(), self.rect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Obstacles;

    fn bat(spawn: Vec2) -> Enemy {
        let frames = (0..4).map(|i| ImageId::new(&format!("enemies/bat/{i}"))).collect();
        Enemy::new(spawn, Vec2::splat(96.0), frames, &GameConfig::default())
    }

    fn step(enemy: &mut Enemy, obstacles: &Obstacles, target: Vec2, now_ms: u64) {
        enemy.update(&FrameContext {
            dt: 0.1,
            now_ms,
            obstacles,
            move_intent: Vec2::ZERO,
            aim: Vec2::ZERO,
            target,
        });
    }

    #[test]
    fn seeks_target_at_fixed_speed() {
        let obstacles = Obstacles::default();
        let mut enemy = bat(Vec2::ZERO);
        step(&mut enemy, &obstacles, Vec2::new(0.0, 1000.0), 100);
        assert_eq!(enemy.position(), Vec2::new(0.0, 20.0));
    }

    #[test]
    fn stays_put_when_on_target() {
        let obstacles = Obstacles::default();
        let mut enemy = bat(Vec2::new(5.0, 5.0));
        step(&mut enemy, &obstacles, Vec2::new(5.0, 5.0), 100);
        assert_eq!(enemy.position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn kill_is_recorded_once() {
        let mut enemy = bat(Vec2::ZERO);
        assert!(enemy.kill(1_000));
        assert!(!enemy.kill(1_200));
        assert_eq!(enemy.death_time_ms(), Some(1_000));
    }

    #[test]
    fn dying_enemy_freezes_and_draws_silhouette() {
        let obstacles = Obstacles::default();
        let mut enemy = bat(Vec2::ZERO);
        for now in [100, 200, 300] {
            step(&mut enemy, &obstacles, Vec2::new(1000.0, 0.0), now);
        }
        let before = enemy.position();
        enemy.kill(300);
        step(&mut enemy, &obstacles, Vec2::new(1000.0, 0.0), 400);
        assert_eq!(enemy.position(), before);

        let item = enemy.draw_item();
        assert!(item.silhouette);
        assert_eq!(item.image.as_str(), "enemies/bat/0");
    }

    #[test]
    fn finishes_after_death_duration() {
        let mut enemy = bat(Vec2::ZERO);
        assert!(!enemy.is_finished(10_000));
        enemy.kill(1_000);
        assert!(!enemy.is_finished(1_399));
        assert!(enemy.is_finished(1_400));
    }
}
