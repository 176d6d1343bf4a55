//! Movement collision against static obstacles.
//!
//! Gameplay truth for walls lives here as a flat list of rectangles, built
//! from the map's `Objects` and `Collisions` layers. Moving actors (player and
//! enemies) resolve their hitbox with **axis-separable move-and-slide**:
//! resolve X movement first, then resolve Y using the already-corrected X
//! position. This keeps actors from slipping diagonally through the seam
//! between two touching obstacles and produces the "slide along walls" feel.
//!
//! World space is screen-like: x grows right, y grows down.

use glam::Vec2;

/// Axis-aligned box stored as centre + half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            center_x: center.x,
            center_y: center.y,
            half_w: size.x * 0.5,
            half_h: size.y * 0.5,
        }
    }

    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self::from_center(top_left + size * 0.5, size)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center_x = center.x;
        self.center_y = center.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.center_x += delta.x;
        self.center_y += delta.y;
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.half_w * 2.0, self.half_h * 2.0)
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.top())
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_h
    }

    /// Grow (or shrink, with negative deltas) around the same centre. Extents
    /// never go below one pixel.
    pub fn inflate(&self, delta: Vec2) -> Self {
        let size = (self.size() + delta).max(Vec2::ONE);
        Self::from_center(self.center(), size)
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Half-open point test: left/top edges inside, right/bottom edges outside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Obstacles {
    rects: Vec<Aabb>,
}

impl Obstacles {
    pub fn new(rects: Vec<Aabb>) -> Self {
        Self { rects }
    }

    pub fn push(&mut self, rect: Aabb) {
        self.rects.push(rect);
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aabb> {
        self.rects.iter()
    }

    /// Move on x, then on y, stopping flush against the first obstacle on
    /// each axis. The free axis keeps its full motion.
    pub fn move_and_collide(&self, aabb: Aabb, dx: f32, dy: f32) -> Aabb {
        let mut moved = aabb;
        moved.center_x = self.resolve_axis_x(aabb, dx);
        moved.center_y = self.resolve_axis_y(moved, dy);
        moved
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32) -> f32 {
        if dx == 0.0 {
            return aabb.center_x;
        }

        let mut candidate = aabb;
        candidate.center_x += dx;
        let shrunk = shrink(candidate);
        let mut resolved_x = candidate.center_x;

        for rect in self.rects.iter().filter(|r| shrunk.overlaps(r)) {
            if dx > 0.0 {
                resolved_x = resolved_x.min(rect.left() - aabb.half_w);
            } else {
                resolved_x = resolved_x.max(rect.right() + aabb.half_w);
            }
        }

        // Guardrail: never push opposite to the direction of travel.
        if dx > 0.0 {
            resolved_x.max(aabb.center_x)
        } else {
            resolved_x.min(aabb.center_x)
        }
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32) -> f32 {
        if dy == 0.0 {
            return aabb.center_y;
        }

        let mut candidate = aabb;
        candidate.center_y += dy;
        let shrunk = shrink(candidate);
        let mut resolved_y = candidate.center_y;

        for rect in self.rects.iter().filter(|r| shrunk.overlaps(r)) {
            if dy > 0.0 {
                resolved_y = resolved_y.min(rect.top() - aabb.half_h);
            } else {
                resolved_y = resolved_y.max(rect.bottom() + aabb.half_h);
            }
        }

        if dy > 0.0 {
            resolved_y.max(aabb.center_y)
        } else {
            resolved_y.min(aabb.center_y)
        }
    }
}

// Flush contact after a previous resolution must not count as overlap.
fn shrink(aabb: Aabb) -> Aabb {
    const EPS: f32 = 0.001;
    Aabb {
        half_w: (aabb.half_w - EPS).max(0.0),
        half_h: (aabb.half_h - EPS).max(0.0),
        ..aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::from_top_left(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn edges_only_touching_do_not_overlap() {
        let a = wall_at(0.0, 0.0, 10.0, 10.0);
        let b = wall_at(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = wall_at(9.0, 9.0, 10.0, 10.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = wall_at(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(9.9, 9.9)));
        assert!(!rect.contains_point(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn inflate_keeps_center() {
        let rect = Aabb::from_center(Vec2::new(50.0, 50.0), Vec2::new(96.0, 128.0));
        let hitbox = rect.inflate(Vec2::new(-60.0, -90.0));
        assert_eq!(hitbox.center(), rect.center());
        assert_eq!(hitbox.size(), Vec2::new(36.0, 38.0));
        assert_eq!(rect.inflate(Vec2::splat(-500.0)).size(), Vec2::ONE);
    }

    #[test]
    fn move_and_collide_blocks_motion_into_wall() {
        let obstacles = Obstacles::new(vec![wall_at(64.0, 0.0, 32.0, 64.0)]);
        let start = Aabb::from_center(Vec2::new(40.0, 32.0), Vec2::new(16.0, 16.0));

        let moved = obstacles.move_and_collide(start, 40.0, 0.0);
        assert!((moved.right() - 64.0).abs() < 0.001);
        assert_eq!(moved.center_y, start.center_y);
    }

    #[test]
    fn slides_along_wall_on_free_axis() {
        let obstacles = Obstacles::new(vec![wall_at(64.0, 0.0, 32.0, 256.0)]);
        let start = Aabb::from_center(Vec2::new(56.0, 32.0), Vec2::new(16.0, 16.0));

        // Flush against the wall, pushing diagonally into it.
        let moved = obstacles.move_and_collide(start, 10.0, 20.0);
        assert!((moved.center_y - 52.0).abs() < 0.001);
        assert!((moved.center_x - 56.0).abs() < 0.001);
    }

    #[test]
    fn diagonal_move_cannot_clip_through_corner_seam() {
        // Two walls meeting at a corner: one to the right, one below.
        let obstacles = Obstacles::new(vec![
            wall_at(64.0, 0.0, 64.0, 64.0),
            wall_at(0.0, 64.0, 64.0, 64.0),
        ]);
        let start = Aabb::from_center(Vec2::new(50.0, 50.0), Vec2::new(20.0, 20.0));

        let moved = obstacles.move_and_collide(start, 30.0, 30.0);
        assert!(moved.right() <= 64.0 + 0.001);
        assert!(moved.bottom() <= 64.0 + 0.001);
    }

    #[test]
    fn moving_up_into_ceiling_never_pushes_downward() {
        let obstacles = Obstacles::new(vec![wall_at(0.0, 0.0, 128.0, 32.0)]);
        let start = Aabb::from_center(Vec2::new(40.0, 42.0), Vec2::new(16.0, 16.0));

        let moved = obstacles.move_and_collide(start, 0.0, -30.0);
        assert!(moved.center_y <= start.center_y + 0.0001);
        assert!((moved.top() - 32.0).abs() < 0.001);
        assert_eq!(moved.center_x, start.center_x);
    }

    #[test]
    fn no_obstacles_moves_freely() {
        let obstacles = Obstacles::default();
        let start = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let moved = obstacles.move_and_collide(start, 3.0, -4.0);
        assert_eq!(moved.center(), Vec2::new(3.0, -4.0));
    }
}
