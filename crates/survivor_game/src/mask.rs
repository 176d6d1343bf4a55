//! Per-pixel collision masks.
//!
//! Combat uses a two-stage test: a coarse rectangle overlap first, then a
//! pixel-accurate mask test on the overlapping region. Masks are built from
//! an image's alpha channel; a pixel is solid when its alpha is above
//! [`ALPHA_THRESHOLD`].

use std::path::Path;

use crate::collision::Aabb;

pub const ALPHA_THRESHOLD: u8 = 127;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl CollisionMask {
    /// Every pixel solid. Used for rectangles and for images whose alpha could
    /// not be read.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> Result<Self, String> {
        if alpha.len() != (width * height) as usize {
            return Err(format!(
                "Mask build failed: expected {} alpha values for {}x{}, got {}",
                width * height,
                width,
                height,
                alpha.len()
            ));
        }
        Ok(Self {
            width,
            height,
            bits: alpha.iter().map(|&a| a > ALPHA_THRESHOLD).collect(),
        })
    }

    pub fn from_image(image: &image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let bits = image.pixels().map(|p| p.0[3] > ALPHA_THRESHOLD).collect();
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True if any solid pixel of `self` coincides with a solid pixel of
    /// `other`, where `other`'s origin sits at `offset` in `self`'s pixels.
    pub fn overlaps(&self, other: &CollisionMask, offset: (i32, i32)) -> bool {
        let (ox, oy) = offset;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + other.width as i32).min(self.width as i32);
        let y1 = (oy + other.height as i32).min(self.height as i32);

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - ox, y - oy) {
                    return true;
                }
            }
        }
        false
    }
}

/// Coarse rectangle screen, then pixel test. Masks are anchored at each
/// rect's top-left corner.
pub fn masks_collide(a_rect: &Aabb, a: &CollisionMask, b_rect: &Aabb, b: &CollisionMask) -> bool {
    if !a_rect.overlaps(b_rect) {
        return false;
    }
    let a_origin = a_rect.top_left().floor();
    let b_origin = b_rect.top_left().floor();
    let offset = (
        (b_origin.x - a_origin.x) as i32,
        (b_origin.y - a_origin.y) as i32,
    );
    a.overlaps(b, offset)
}

pub fn load_mask_from_path(path: &Path) -> Result<CollisionMask, String> {
    let image = image::open(path)
        .map_err(|e| format!("Failed to load mask image {}: {e}", path.display()))?;
    Ok(CollisionMask::from_image(&image.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use image::{Rgba, RgbaImage};

    /// 4x4 mask with only the top-left 2x2 quadrant solid.
    fn quadrant_mask() -> CollisionMask {
        let mut alpha = vec![0u8; 16];
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            alpha[y * 4 + x] = 255;
        }
        CollisionMask::from_alpha(4, 4, &alpha).expect("valid alpha buffer")
    }

    #[test]
    fn from_alpha_rejects_wrong_length() {
        let err = CollisionMask::from_alpha(2, 2, &[255; 3]).expect_err("short buffer");
        assert!(err.contains("expected 4"));
    }

    #[test]
    fn from_image_uses_alpha_threshold() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 0]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 200]));
        let mask = CollisionMask::from_image(&image);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn overlap_respects_offset() {
        let a = quadrant_mask();
        let b = CollisionMask::full(2, 2);
        assert!(a.overlaps(&b, (1, 1)));
        // b only covers a's transparent bottom-right quadrant.
        assert!(!a.overlaps(&b, (2, 2)));
        assert!(a.overlaps(&b, (-1, -1)));
        assert!(!a.overlaps(&b, (4, 0)));
    }

    #[test]
    fn rect_overlap_without_pixel_overlap_is_not_a_hit() {
        let a_mask = quadrant_mask();
        let b_mask = quadrant_mask();
        let a_rect = Aabb::from_top_left(Vec2::ZERO, Vec2::splat(4.0));
        let b_rect = Aabb::from_top_left(Vec2::new(2.0, 2.0), Vec2::splat(4.0));
        assert!(a_rect.overlaps(&b_rect));
        assert!(!masks_collide(&a_rect, &a_mask, &b_rect, &b_mask));

        let c_rect = Aabb::from_top_left(Vec2::new(1.0, 1.0), Vec2::splat(4.0));
        assert!(masks_collide(&a_rect, &a_mask, &c_rect, &b_mask));
    }

    #[test]
    fn disjoint_rects_skip_pixel_test() {
        let mask = CollisionMask::full(4, 4);
        let a = Aabb::from_top_left(Vec2::ZERO, Vec2::splat(4.0));
        let b = Aabb::from_top_left(Vec2::new(10.0, 0.0), Vec2::splat(4.0));
        assert!(!masks_collide(&a, &mask, &b, &mask));
    }

    #[test]
    fn load_mask_missing_file_is_error() {
        let path = std::env::temp_dir().join("survivor_mask_does_not_exist.png");
        let err = load_mask_from_path(&path).expect_err("missing file should fail");
        assert!(err.contains("Failed to load mask image"));
    }
}
