//! Display and mixer stand-ins that record what the game asked for.
//!
//! The binary runs on these, and so do the state machine tests.

use glam::Vec2;

use crate::assets::ImageId;
use crate::collision::Aabb;
use crate::platform::{Audio, Canvas, Music, Rgb, Sound, TextAlign};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill(Rgb),
    Sprite {
        image: ImageId,
        top_left: Vec2,
        rotation_deg: f32,
        silhouette: bool,
    },
    Image {
        image: ImageId,
        top_left: Vec2,
    },
    Text {
        text: String,
        pos: Vec2,
    },
    Overlay {
        alpha: u8,
    },
    Button {
        label: String,
        rect: Aabb,
        hovered: bool,
    },
    Slider {
        track: Aabb,
        value: f32,
    },
}

/// Keeps the commands of the frame being drawn and of the last presented one.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pending: Vec<DrawCommand>,
    last_frame: Vec<DrawCommand>,
    frames_presented: u64,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Images of the last frame's world sprites, in draw order.
    pub fn sprite_images(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Sprite { image, .. } => Some(image.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn button_labels(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Button { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn fill(&mut self, color: Rgb) {
        self.pending.push(DrawCommand::Fill(color));
    }

    fn draw_sprite(
        &mut self,
        image: &ImageId,
        top_left: Vec2,
        rotation_deg: f32,
        silhouette: bool,
    ) {
        self.pending.push(DrawCommand::Sprite {
            image: image.clone(),
            top_left,
            rotation_deg,
            silhouette,
        });
    }

    fn draw_image(&mut self, image: &ImageId, top_left: Vec2) {
        self.pending.push(DrawCommand::Image {
            image: image.clone(),
            top_left,
        });
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, _size: u32, _color: Rgb, _align: TextAlign) {
        self.pending.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
        });
    }

    fn draw_overlay(&mut self, _color: Rgb, alpha: u8) {
        self.pending.push(DrawCommand::Overlay { alpha });
    }

    fn draw_button(&mut self, label: &str, rect: Aabb, hovered: bool) {
        self.pending.push(DrawCommand::Button {
            label: label.to_string(),
            rect,
            hovered,
        });
    }

    fn draw_slider(&mut self, track: Aabb, value: f32) {
        self.pending.push(DrawCommand::Slider { track, value });
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames_presented += 1;
        log::trace!(
            "Presented frame {} with {} draw commands",
            self.frames_presented,
            self.last_frame.len()
        );
    }
}

/// Logs every sound and music change and keeps them for inspection.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub sounds: Vec<(Sound, f32)>,
    pub music: Option<Music>,
    pub music_volume: f32,
    pub music_starts: u32,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, sound: Sound) -> usize {
        self.sounds.iter().filter(|(s, _)| *s == sound).count()
    }
}

impl Audio for RecordingAudio {
    fn play_sound(&mut self, sound: Sound, volume: f32) {
        log::trace!("sound {sound:?} at {volume:.2}");
        self.sounds.push((sound, volume));
    }

    fn play_music(&mut self, music: Music, volume: f32) {
        log::debug!("music {music:?} at {volume:.2}");
        self.music = Some(music);
        self.music_volume = volume;
        self.music_starts += 1;
    }

    fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume;
    }

    fn stop_music(&mut self) {
        log::debug!("music stopped");
        self.music = None;
    }
}
