//! The player actor and the gun that orbits it.

use glam::Vec2;
use survivor_core::{AnimationClip, AnimationState};

use crate::assets::{DirectionalFrames, ImageId};
use crate::collision::Aabb;
use crate::config::GameConfig;
use crate::entity::{DrawItem, Entity, FrameContext, Role};
use crate::timers::Invulnerability;

/// Hitbox is the sprite rect shrunk by this much (width, height).
pub const PLAYER_HITBOX_DELTA: Vec2 = Vec2::new(-60.0, -90.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Right,
    Left,
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct Player {
    rect: Aabb,
    hitbox: Aabb,
    speed: f32,
    animation_fps: f32,
    frames: DirectionalFrames,
    facing: Facing,
    direction: Vec2,
    animation: AnimationState,
    pub lives: u32,
    pub invulnerability: Invulnerability,
}

impl Player {
    pub fn new(
        spawn: Vec2,
        frame_size: Vec2,
        frames: DirectionalFrames,
        config: &GameConfig,
    ) -> Self {
        let rect = Aabb::from_center(spawn, frame_size);
        Self {
            rect,
            hitbox: rect.inflate(PLAYER_HITBOX_DELTA),
            speed: config.player_speed,
            animation_fps: config.player_animation_fps,
            frames,
            facing: Facing::Down,
            direction: Vec2::ZERO,
            animation: AnimationState::new(),
            lives: config.player_max_lives,
            invulnerability: Invulnerability::new(config.invulnerability_ms),
        }
    }

    pub fn hitbox(&self) -> Aabb {
        self.hitbox
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn frame_index(&self) -> usize {
        self.animation.frame_index
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Lose one life and open the invulnerability window.
    pub fn take_hit(&mut self, now_ms: u64) {
        self.lives = self.lives.saturating_sub(1);
        self.invulnerability.start(now_ms);
    }

    fn frames_for(&self, facing: Facing) -> &[ImageId] {
        match facing {
            Facing::Right => &self.frames.right,
            Facing::Left => &self.frames.left,
            Facing::Up => &self.frames.up,
            Facing::Down => &self.frames.down,
        }
    }

    pub fn current_image(&self) -> ImageId {
        let frames = self.frames_for(self.facing);
        if frames.is_empty() {
            return ImageId::new("player");
        }
        frames[self.animation.frame_index % frames.len()].clone()
    }

    fn animate(&mut self, dt: f32) {
        if self.direction.x != 0.0 {
            self.facing = if self.direction.x > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            };
        }
        // Vertical motion wins the facing on diagonals.
        if self.direction.y != 0.0 {
            self.facing = if self.direction.y > 0.0 {
                Facing::Down
            } else {
                Facing::Up
            };
        }

        if self.direction == Vec2::ZERO {
            self.animation.reset();
            return;
        }
        let clip = AnimationClip::from_fps(self.frames_for(self.facing).len(), self.animation_fps);
        let dt_us = (dt.max(0.0) * 1_000_000.0).round() as u64;
        self.animation.tick(dt_us, &clip);
    }
}

impl Entity for Player {
    fn rect(&self) -> Aabb {
        self.rect
    }

    fn update(&mut self, ctx: &FrameContext<'_>) {
        self.direction = ctx.move_intent.normalize_or_zero();
        let delta = self.direction * self.speed * ctx.dt;
        self.hitbox = ctx.obstacles.move_and_collide(self.hitbox, delta.x, delta.y);
        self.rect.set_center(self.hitbox.center());
        self.animate(ctx.dt);
    }

    fn draw_item(&self) -> DrawItem {
        DrawItem::new(Role::Object, self.current_image(), self.rect)
    }
}

/// Normalised direction from the viewport centre (where the player is always
/// drawn) to the pointer. Zero when the pointer sits exactly on the centre.
pub fn aim_from_pointer(pointer: Vec2, viewport: Vec2) -> Vec2 {
    (pointer - viewport * 0.5).normalize_or_zero()
}

#[derive(Debug, Clone)]
pub struct Gun {
    image: ImageId,
    rect: Aabb,
    direction: Vec2,
    distance: f32,
    muzzle_offset: f32,
}

impl Gun {
    pub fn new(image: ImageId, size: Vec2, player_center: Vec2, config: &GameConfig) -> Self {
        let direction = Vec2::Y;
        Self {
            image,
            rect: Aabb::from_center(player_center + direction * config.gun_distance, size),
            direction,
            distance: config.gun_distance,
            muzzle_offset: config.muzzle_offset,
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Clockwise degrees from +x (screen space, y down).
    pub fn rotation_deg(&self) -> f32 {
        self.direction.y.atan2(self.direction.x).to_degrees()
    }

    /// Where a fired bullet starts.
    pub fn muzzle(&self) -> Vec2 {
        self.rect.center() + self.direction * self.muzzle_offset
    }
}

impl Entity for Gun {
    fn rect(&self) -> Aabb {
        self.rect
    }

    fn update(&mut self, ctx: &FrameContext<'_>) {
        if ctx.aim != Vec2::ZERO {
            self.direction = ctx.aim;
        }
        self.rect.set_center(ctx.target + self.direction * self.distance);
    }

    fn draw_item(&self) -> DrawItem {
        DrawItem {
            rotation_deg: self.rotation_deg(),
            ..DrawItem::new(Role::Object, self.image.clone(), self.rect)
        }
    }
}
