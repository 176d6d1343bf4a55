//! Frame-based sprite animation timing.
//!
//! Clips here only know how many frames they have and how long each frame
//! lasts; which image a frame index maps to is the caller's business. All
//! timing is integer (milliseconds for clip definitions, microseconds for
//! accumulated state) so the same inputs always pick the same frame.
//!
//! Two ways to drive a clip:
//! - [`AnimationClip::frame_at`] keys the frame purely on time since the clip
//!   started. Loading spinners and death bursts use this.
//! - [`AnimationState::tick`] accumulates per-frame deltas. Walk cycles use
//!   this so they can be reset when the actor stops.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationClip {
    pub frame_count: usize,
    pub frame_duration_ms: u64,
    pub looping: bool,
}

impl AnimationClip {
    pub fn looping(frame_count: usize, frame_duration_ms: u64) -> Self {
        Self {
            frame_count,
            frame_duration_ms,
            looping: true,
        }
    }

    pub fn once(frame_count: usize, frame_duration_ms: u64) -> Self {
        Self {
            frame_count,
            frame_duration_ms,
            looping: false,
        }
    }

    /// Looping clip playing `fps` frames per second.
    pub fn from_fps(frame_count: usize, fps: f32) -> Self {
        let frame_duration_ms = if fps > 0.0 {
            ((1000.0 / fps).round() as u64).max(1)
        } else {
            u64::MAX
        };
        Self::looping(frame_count, frame_duration_ms)
    }

    /// Total duration of one full cycle in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.frame_duration_ms.saturating_mul(self.frame_count as u64)
    }

    /// Frame shown `elapsed_ms` after the clip started.
    ///
    /// Returns `None` for an empty clip, or once a non-looping clip has run
    /// past its last frame.
    pub fn frame_at(&self, elapsed_ms: u64) -> Option<usize> {
        if self.frame_count == 0 || self.frame_duration_ms == 0 {
            return None;
        }
        let index = (elapsed_ms / self.frame_duration_ms) as usize;
        if self.looping {
            Some(index % self.frame_count)
        } else if index < self.frame_count {
            Some(index)
        } else {
            None
        }
    }
}

/// Runtime state for one clip advanced by frame deltas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance by `dt_us` microseconds and return the current frame index.
    pub fn tick(&mut self, dt_us: u64, clip: &AnimationClip) -> usize {
        if clip.frame_count == 0 || self.finished {
            return self.frame_index.min(clip.frame_count.saturating_sub(1));
        }

        let frame_us = clip.frame_duration_ms.saturating_mul(1000);
        self.elapsed_us += dt_us;

        while self.elapsed_us >= frame_us {
            self.elapsed_us -= frame_us;
            self.frame_index += 1;

            if self.frame_index >= clip.frame_count {
                if clip.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.frame_count - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            }
        }

        self.frame_index
    }
}
