//! Common contract for everything the session simulates and draws.

use glam::Vec2;

use crate::assets::ImageId;
use crate::collision::{Aabb, Obstacles};

/// Static draw class. Ground always renders underneath every object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Ground,
    Object,
}

/// One sprite as the render group sees it, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub role: Role,
    pub image: ImageId,
    pub rect: Aabb,
    pub rotation_deg: f32,
    /// Draw as a flat white shape of the image's mask.
    pub silhouette: bool,
}

impl DrawItem {
    pub fn new(role: Role, image: ImageId, rect: Aabb) -> Self {
        Self {
            role,
            image,
            rect,
            rotation_deg: 0.0,
            silhouette: false,
        }
    }

    /// Vertical anchor used for depth sorting.
    pub fn anchor_y(&self) -> f32 {
        self.rect.center_y
    }
}

/// Per-frame inputs shared by every entity update.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub dt: f32,
    pub now_ms: u64,
    pub obstacles: &'a Obstacles,
    /// Raw movement axis from input, not normalised.
    pub move_intent: Vec2,
    /// Unit aim direction, or zero when there is no aim.
    pub aim: Vec2,
    /// World point enemies seek toward (the player's centre).
    pub target: Vec2,
}

pub trait Entity {
    fn rect(&self) -> Aabb;

    fn position(&self) -> Vec2 {
        self.rect().center()
    }

    fn update(&mut self, ctx: &FrameContext<'_>);

    fn draw_item(&self) -> DrawItem;
}

/// Immovable map geometry: ground tiles and image-bearing obstacles.
#[derive(Debug, Clone)]
pub struct StaticSprite {
    role: Role,
    image: ImageId,
    rect: Aabb,
}

impl StaticSprite {
    pub fn ground(image: ImageId, top_left: Vec2, size: Vec2) -> Self {
        Self {
            role: Role::Ground,
            image,
            rect: Aabb::from_top_left(top_left, size),
        }
    }

    pub fn object(image: ImageId, top_left: Vec2, size: Vec2) -> Self {
        Self {
            role: Role::Object,
            image,
            rect: Aabb::from_top_left(top_left, size),
        }
    }
}

impl Entity for StaticSprite {
    fn rect(&self) -> Aabb {
        self.rect
    }

    fn update(&mut self, _ctx: &FrameContext<'_>) {}

    fn draw_item(&self) -> DrawItem {
        DrawItem::new(self.role, self.image.clone(), self.rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_sprite_never_moves() {
        let obstacles = Obstacles::default();
        let mut tile = StaticSprite::ground(
            ImageId::new("tiles/grass"),
            Vec2::new(64.0, 128.0),
            Vec2::splat(64.0),
        );
        let before = tile.rect();
        tile.update(&FrameContext {
            dt: 1.0,
            now_ms: 1_000,
            obstacles: &obstacles,
            move_intent: Vec2::X,
            aim: Vec2::X,
            target: Vec2::ZERO,
        });
        assert_eq!(tile.rect(), before);
        assert_eq!(tile.position(), Vec2::new(96.0, 160.0));
        assert_eq!(tile.draw_item().role, Role::Ground);
    }

    #[test]
    fn object_sprite_anchor_is_rect_center() {
        let tree = StaticSprite::object(
            ImageId::new("objects/tree"),
            Vec2::new(0.0, 0.0),
            Vec2::new(64.0, 96.0),
        );
        let item = tree.draw_item();
        assert_eq!(item.role, Role::Object);
        assert_eq!(item.anchor_y(), 48.0);
        assert!(!item.silhouette);
    }
}
