//! Player projectiles.

use glam::Vec2;

use crate::assets::ImageId;
use crate::collision::Aabb;
use crate::entity::{DrawItem, Entity, FrameContext, Role};

/// Straight-flying projectile with a fixed lifetime.
#[derive(Debug, Clone)]
pub struct Bullet {
    image: ImageId,
    rect: Aabb,
    velocity: Vec2,
    spawn_ms: u64,
    lifetime_ms: u64,
    expired: bool,
}

impl Bullet {
    pub fn new(
        image: ImageId,
        size: Vec2,
        origin: Vec2,
        direction: Vec2,
        speed: f32,
        spawn_ms: u64,
        lifetime_ms: u64,
    ) -> Self {
        Self {
            image,
            rect: Aabb::from_center(origin, size),
            velocity: direction.normalize_or_zero() * speed,
            spawn_ms,
            lifetime_ms,
            expired: false,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn spawn_ms(&self) -> u64 {
        self.spawn_ms
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

impl Entity for Bullet {
    fn rect(&self) -> Aabb {
        self.rect
    }

    fn update(&mut self, ctx: &FrameContext<'_>) {
        self.rect.translate(self.velocity * ctx.dt);
        if ctx.now_ms.saturating_sub(self.spawn_ms) >= self.lifetime_ms {
            self.expired = true;
        }
    }

    fn draw_item(&self) -> DrawItem {
        DrawItem::new(Role::Object, self.image.clone(), self.rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Obstacles;

    #[test]
    fn flies_through_walls_and_expires_on_lifetime() {
        let obstacles = Obstacles::new(vec![Aabb::from_top_left(
            Vec2::new(10.0, -50.0),
            Vec2::splat(100.0),
        )]);
        let mut bullet = Bullet::new(
            ImageId::new("gun/bullet"),
            Vec2::splat(24.0),
            Vec2::ZERO,
            Vec2::new(3.0, 0.0),
            1200.0,
            500,
            1000,
        );
        assert_eq!(bullet.velocity(), Vec2::new(1200.0, 0.0));

        let mut now = 500;
        let mut ticks = 0;
        while !bullet.is_expired() {
            now += 16;
            ticks += 1;
            bullet.update(&FrameContext {
                dt: 0.016,
                now_ms: now,
                obstacles: &obstacles,
                move_intent: Vec2::ZERO,
                aim: Vec2::ZERO,
                target: Vec2::ZERO,
            });
        }
        assert_eq!(ticks, 63, "1000 ms lifetime at 16 ms ticks");
        assert!(bullet.position().x > 1000.0);
    }
}
