//! Menu widgets as hit regions and values.
//!
//! Widgets report which action a click resolves to and hand the canvas what to
//! draw. How a button or slider looks is up to the platform.

use glam::Vec2;

use crate::assets::ImageId;
use crate::collision::Aabb;
use crate::platform::{Canvas, Rgb, TextAlign};

const BUTTON_SIZE: Vec2 = Vec2::new(300.0, 80.0);
const SLIDER_SIZE: Vec2 = Vec2::new(400.0, 20.0);
const TITLE_SIZE: u32 = 96;
const BODY_SIZE: u32 = 48;
const OVERLAY_ALPHA: u8 = 200;
const SETTINGS_OVERLAY_ALPHA: u8 = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuAction {
    Start,
    Settings,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    Resume,
    Settings,
    Restart,
    MainMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverAction {
    PlayAgain,
    MainMenu,
}

#[derive(Debug, Clone)]
pub struct Button<A> {
    pub label: &'static str,
    pub rect: Aabb,
    pub action: A,
}

impl<A: Copy> Button<A> {
    fn centered(viewport: Vec2, top: f32, label: &'static str, action: A) -> Self {
        let left = viewport.x / 2.0 - BUTTON_SIZE.x / 2.0;
        Self {
            label,
            rect: Aabb::from_top_left(Vec2::new(left, top), BUTTON_SIZE),
            action,
        }
    }

    pub fn hovered(&self, pointer: Vec2) -> bool {
        self.rect.contains_point(pointer)
    }
}

/// First button under the pointer, in declaration order.
fn click<A: Copy>(buttons: &[Button<A>], pointer: Vec2) -> Option<A> {
    buttons.iter().find(|b| b.hovered(pointer)).map(|b| b.action)
}

fn draw_buttons<A: Copy>(canvas: &mut dyn Canvas, buttons: &[Button<A>], pointer: Vec2) {
    for button in buttons {
        canvas.draw_button(button.label, button.rect, button.hovered(pointer));
    }
}

#[derive(Debug, Clone)]
pub struct VolumeSlider {
    pub track: Aabb,
    pub value: f32,
    dragging: bool,
}

impl VolumeSlider {
    fn centered(viewport: Vec2, top: f32, value: f32) -> Self {
        let left = viewport.x / 2.0 - SLIDER_SIZE.x / 2.0;
        Self {
            track: Aabb::from_top_left(Vec2::new(left, top), SLIDER_SIZE),
            value: value.clamp(0.0, 1.0),
            dragging: false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pressing on the track starts a drag; the drag follows the pointer
    /// anywhere until the button is released. Returns true if the value moved.
    pub fn drag(&mut self, pointer: Vec2, pressed: bool) -> bool {
        if !pressed {
            self.dragging = false;
            return false;
        }
        if self.track.contains_point(pointer) {
            self.dragging = true;
        }
        if !self.dragging {
            return false;
        }
        let width = self.track.size().x;
        let value = ((pointer.x - self.track.left()) / width).clamp(0.0, 1.0);
        let changed = value != self.value;
        self.value = value;
        changed
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    viewport: Vec2,
    pub main: Vec<Button<MainMenuAction>>,
    pub pause: Vec<Button<PauseAction>>,
    pub game_over: Vec<Button<GameOverAction>>,
    pub back: Button<()>,
    pub music: VolumeSlider,
    pub sfx: VolumeSlider,
}

impl Menu {
    pub fn new(viewport: Vec2, music_volume: f32, sfx_volume: f32) -> Self {
        Self {
            viewport,
            main: vec![
                Button::centered(viewport, 320.0, "START", MainMenuAction::Start),
                Button::centered(viewport, 430.0, "SETTINGS", MainMenuAction::Settings),
                Button::centered(viewport, 540.0, "EXIT", MainMenuAction::Exit),
            ],
            pause: vec![
                Button::centered(viewport, 250.0, "RESUME", PauseAction::Resume),
                Button::centered(viewport, 360.0, "SETTINGS", PauseAction::Settings),
                Button::centered(viewport, 470.0, "RESTART", PauseAction::Restart),
                Button::centered(viewport, 580.0, "MAIN MENU", PauseAction::MainMenu),
            ],
            game_over: vec![
                Button::centered(viewport, 350.0, "PLAY AGAIN", GameOverAction::PlayAgain),
                Button::centered(viewport, 460.0, "MAIN MENU", GameOverAction::MainMenu),
            ],
            back: Button::centered(viewport, 550.0, "BACK", ()),
            music: VolumeSlider::centered(viewport, 300.0, music_volume),
            sfx: VolumeSlider::centered(viewport, 420.0, sfx_volume),
        }
    }

    pub fn music_volume(&self) -> f32 {
        self.music.value
    }

    pub fn sfx_volume(&self) -> f32 {
        self.sfx.value
    }

    pub fn main_menu_click(&self, pointer: Vec2) -> Option<MainMenuAction> {
        click(&self.main, pointer)
    }

    pub fn pause_click(&self, pointer: Vec2) -> Option<PauseAction> {
        click(&self.pause, pointer)
    }

    pub fn game_over_click(&self, pointer: Vec2) -> Option<GameOverAction> {
        click(&self.game_over, pointer)
    }

    pub fn back_clicked(&self, pointer: Vec2) -> bool {
        self.back.hovered(pointer)
    }

    /// Drive both sliders. Returns true if the music volume changed.
    pub fn drag_sliders(&mut self, pointer: Vec2, pressed: bool) -> bool {
        let music_changed = self.music.drag(pointer, pressed);
        self.sfx.drag(pointer, pressed);
        music_changed
    }

    fn title(&self, canvas: &mut dyn Canvas, text: &str, y: f32, color: Rgb) {
        let center = Vec2::new(self.viewport.x / 2.0, y);
        let shadow = center + Vec2::splat(4.0);
        canvas.draw_text(text, shadow, TITLE_SIZE, Rgb::SHADOW, TextAlign::Center);
        canvas.draw_text(text, center, TITLE_SIZE, color, TextAlign::Center);
    }

    pub fn draw_main_menu(
        &self,
        canvas: &mut dyn Canvas,
        background: Option<&ImageId>,
        pointer: Vec2,
    ) {
        match background {
            Some(image) => canvas.draw_image(image, Vec2::ZERO),
            None => canvas.fill(Rgb::DUSK),
        }
        self.title(canvas, "SURVIVOR", 200.0, Rgb::WHITE);
        draw_buttons(canvas, &self.main, pointer);
    }

    pub fn draw_pause(&self, canvas: &mut dyn Canvas, pointer: Vec2) {
        canvas.draw_overlay(Rgb::DUSK, OVERLAY_ALPHA);
        self.title(canvas, "PAUSED", 130.0, Rgb::WHITE);
        draw_buttons(canvas, &self.pause, pointer);
    }

    pub fn draw_game_over(&self, canvas: &mut dyn Canvas, score: u32, pointer: Vec2) {
        canvas.draw_overlay(Rgb::DUSK, OVERLAY_ALPHA);
        self.title(canvas, "YOU DIED", 200.0, Rgb::CRIMSON);
        canvas.draw_text(
            &format!("Score: {score}"),
            Vec2::new(self.viewport.x / 2.0, 280.0),
            BODY_SIZE,
            Rgb::WHITE,
            TextAlign::Center,
        );
        draw_buttons(canvas, &self.game_over, pointer);
    }

    /// Over the paused game when `from_pause`, otherwise over the menu
    /// background.
    pub fn draw_settings(
        &self,
        canvas: &mut dyn Canvas,
        from_pause: bool,
        background: Option<&ImageId>,
        pointer: Vec2,
    ) {
        if from_pause {
            canvas.draw_overlay(Rgb::DUSK, SETTINGS_OVERLAY_ALPHA);
        } else {
            match background {
                Some(image) => canvas.draw_image(image, Vec2::ZERO),
                None => canvas.fill(Rgb::DUSK),
            }
        }
        self.title(canvas, "SETTINGS", 120.0, Rgb::WHITE);

        let cx = self.viewport.x / 2.0;
        let rows = [
            ("Music Volume", 250.0, &self.music, 340.0),
            ("Sound Effects", 370.0, &self.sfx, 460.0),
        ];
        for (label, label_y, slider, percent_y) in rows {
            let label_pos = Vec2::new(cx, label_y);
            canvas.draw_text(label, label_pos, BODY_SIZE, Rgb::WHITE, TextAlign::Center);
            canvas.draw_slider(slider.track, slider.value);
            canvas.draw_text(
                &format!("{}%", (slider.value * 100.0) as u32),
                Vec2::new(cx, percent_y),
                BODY_SIZE,
                Rgb::WHITE,
                TextAlign::Center,
            );
        }
        canvas.draw_button(self.back.label, self.back.rect, self.back.hovered(pointer));
    }
}
