//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! The platform layer hands the game an ordered stream of [`InputEvent`]s once
//! per tick. Folding them through [`InputState::apply`] gives:
//!
//! - **Level-triggered (held):** `is_held(key)` / `is_mouse_held(btn)` are true
//!   every tick the key or button is physically down. Movement and firing use
//!   these.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the tick
//!   the transition happened. Menu clicks and the escape toggle use these. They
//!   are cleared by `end_frame()` at the end of every tick.

use std::collections::HashSet;
use std::hash::Hash;

use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    W,
    A,
    S,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

/// One platform event, in the order the platform observed it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Quit,
    KeyDown { key: Key },
    KeyUp { key: Key },
    MouseDown { button: MouseBtn },
    MouseUp { button: MouseBtn },
    PointerMoved { x: f32, y: f32 },
}

/// Held set plus the press/release edges seen since the last `clear_edges`.
#[derive(Debug)]
struct Edges<T> {
    held: HashSet<T>,
    pressed: HashSet<T>,
    released: HashSet<T>,
}

impl<T: Copy + Eq + Hash> Edges<T> {
    fn new() -> Self {
        Self {
            held: HashSet::new(),
            pressed: HashSet::new(),
            released: HashSet::new(),
        }
    }

    /// OS key repeat arrives as repeated downs; only the first one is an edge.
    fn down(&mut self, item: T) {
        if self.held.insert(item) {
            self.pressed.insert(item);
        }
    }

    fn up(&mut self, item: T) {
        if self.held.remove(&item) {
            self.released.insert(item);
        }
    }

    fn clear_edges(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }
}

pub struct InputState {
    keys: Edges<Key>,
    mouse: Edges<MouseBtn>,
    pub pointer: Vec2,
    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys: Edges::new(),
            mouse: Edges::new(),
            pointer: Vec2::ZERO,
            quit_requested: false,
        }
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Quit => self.quit_requested = true,
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::KeyUp { key } => self.key_up(key),
            InputEvent::MouseDown { button } => self.mouse_down(button),
            InputEvent::MouseUp { button } => self.mouse_up(button),
            InputEvent::PointerMoved { x, y } => self.pointer = Vec2::new(x, y),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        self.keys.down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys.up(key);
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        self.mouse.down(btn);
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        self.mouse.up(btn);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.keys.pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.keys.released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse.held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse.pressed.contains(&btn)
    }

    pub fn is_mouse_just_released(&self, btn: MouseBtn) -> bool {
        self.mouse.released.contains(&btn)
    }

    /// Sticky: once seen, stays set for the rest of the run.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Raw movement intent from arrows or WASD: x is right-minus-left, y is
    /// down-minus-up (screen space, y grows downward). Not normalised.
    pub fn move_axis(&self) -> Vec2 {
        let pressed = |a: Key, b: Key| (self.is_held(a) || self.is_held(b)) as i32 as f32;
        Vec2::new(
            pressed(Key::Right, Key::D) - pressed(Key::Left, Key::A),
            pressed(Key::Down, Key::S) - pressed(Key::Up, Key::W),
        )
    }

    /// Drop this tick's edges. Held state carries over.
    pub fn end_frame(&mut self) {
        self.keys.clear_edges();
        self.mouse.clear_edges();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
