pub mod animation;
pub mod input;
pub mod time;

pub use animation::{AnimationClip, AnimationState};
pub use input::{InputEvent, InputState, Key, MouseBtn};
pub use time::{Clock, ManualClock, SystemClock};
