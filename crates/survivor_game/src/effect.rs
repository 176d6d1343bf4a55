use glam::Vec2;
use survivor_core::AnimationClip;

use crate::assets::ImageId;

/// A one-shot burst drawn over the world at a fixed position. Not part of the
/// collision world.
#[derive(Debug, Clone)]
pub struct DeathEffect {
    pub position: Vec2,
    start_ms: u64,
    clip: AnimationClip,
}

impl DeathEffect {
    pub fn new(position: Vec2, start_ms: u64, frame_count: usize, frame_ms: u64) -> Self {
        Self {
            position,
            start_ms,
            clip: AnimationClip::once(frame_count, frame_ms),
        }
    }

    /// Current frame index, or `None` once every frame has been shown.
    pub fn frame(&self, now_ms: u64) -> Option<usize> {
        self.clip.frame_at(now_ms.saturating_sub(self.start_ms))
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        self.frame(now_ms).is_none()
    }

    pub fn image<'a>(&self, frames: &'a [ImageId], now_ms: u64) -> Option<&'a ImageId> {
        self.frame(now_ms).and_then(|i| frames.get(i))
    }
}
