//! Camera-relative, depth-by-anchor drawing of the world.
//!
//! Two passes: every [`Role::Ground`] item first, then every other item.
//! Within a pass items are sorted by ascending vertical anchor so lower
//! sprites draw later and appear in front. The sort is stable, so equal
//! anchors keep submission order.

use glam::Vec2;

use crate::entity::{DrawItem, Role};
use crate::platform::Canvas;

#[derive(Debug, Clone)]
pub struct RenderGroup {
    viewport: Vec2,
    items: Vec<DrawItem>,
    offset: Vec2,
}

impl RenderGroup {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            items: Vec::new(),
            offset: Vec2::ZERO,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = DrawItem>) {
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Offset that puts `focus` at the viewport centre.
    pub fn camera_offset(&self, focus: Vec2) -> Vec2 {
        -(focus - self.viewport * 0.5)
    }

    /// Offset used by the last [`RenderGroup::draw`].
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn draw_order(&self) -> Vec<&DrawItem> {
        let mut order = Vec::with_capacity(self.items.len());
        for role in [Role::Ground, Role::Object] {
            let mut pass: Vec<&DrawItem> = self.items.iter().filter(|i| i.role == role).collect();
            pass.sort_by(|a, b| {
                a.anchor_y()
                    .partial_cmp(&b.anchor_y())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            order.extend(pass);
        }
        order
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas, focus: Vec2) {
        self.offset = self.camera_offset(focus);
        for item in self.draw_order() {
            canvas.draw_sprite(
                &item.image,
                item.rect.top_left() + self.offset,
                item.rotation_deg,
                item.silhouette,
            );
        }
    }
}
