//! Seams to the display and the mixer.
//!
//! The game owns no rendering or mixing logic. It is handed a [`Canvas`] and
//! an [`Audio`] at construction and calls them as side effects of a tick. Image
//! decoding, blitting, fonts and playback all live behind these traits.

use glam::Vec2;

use crate::assets::ImageId;
use crate::collision::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    /// Menu backdrop and overlay tint.
    pub const DUSK: Rgb = Rgb(20, 20, 30);
    pub const CRIMSON: Rgb = Rgb(220, 20, 60);
    pub const SHADOW: Rgb = Rgb(50, 50, 50);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    TopLeft,
    Center,
}

pub trait Canvas {
    fn fill(&mut self, color: Rgb);

    /// World sprite already shifted into screen space by the camera.
    fn draw_sprite(
        &mut self,
        image: &ImageId,
        top_left: Vec2,
        rotation_deg: f32,
        silhouette: bool,
    );

    /// Screen-space image (HUD, menus, effects after camera offset).
    fn draw_image(&mut self, image: &ImageId, top_left: Vec2);

    fn draw_text(&mut self, text: &str, pos: Vec2, size: u32, color: Rgb, align: TextAlign);

    /// Full-screen translucent tint.
    fn draw_overlay(&mut self, color: Rgb, alpha: u8);

    fn draw_button(&mut self, label: &str, rect: Aabb, hovered: bool);

    fn draw_slider(&mut self, track: Aabb, value: f32);

    /// End of frame.
    fn present(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Shoot,
    Impact,
    PlayerDeath,
    PlayerRevive,
    ButtonClick,
}

impl Sound {
    /// Mix level before the sfx volume is applied.
    pub fn base_volume(self) -> f32 {
        match self {
            Sound::Shoot => 0.2,
            Sound::Impact => 0.3,
            Sound::PlayerDeath => 0.4,
            Sound::PlayerRevive => 0.3,
            Sound::ButtonClick => 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Music {
    Menu,
    Game,
}

pub trait Audio {
    fn play_sound(&mut self, sound: Sound, volume: f32);

    /// Start looping `music`, replacing whatever track is playing.
    fn play_music(&mut self, music: Music, volume: f32);

    fn set_music_volume(&mut self, volume: f32);

    fn stop_music(&mut self);
}
