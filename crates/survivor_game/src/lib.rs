pub mod assets;
pub mod bullet;
pub mod collision;
pub mod combat;
pub mod config;
pub mod effect;
pub mod enemy;
pub mod entity;
pub mod game;
pub mod headless;
pub mod map;
pub mod mask;
pub mod menu;
pub mod platform;
pub mod player;
pub mod render;
pub mod replay;
pub mod session;
pub mod timers;

pub use game::{Game, GameState, LoadTarget};
