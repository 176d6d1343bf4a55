//! Scripted input runs for headless play and regression tests.

use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use survivor_core::{Clock, InputEvent, Key, ManualClock, MouseBtn};

use crate::game::{Game, GameState};
use crate::platform::{Audio, Canvas};

/// Scripted input for a headless run.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplayScript {
    /// Clock advance per tick when not running in real time.
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// Pace ticks on the wall clock instead of stepping a manual clock.
    #[serde(default)]
    pub realtime: bool,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub events: Vec<InputEvent>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub ticks: u64,
    pub final_state: GameState,
    pub score: u32,
    pub lives: u32,
}

impl ReplayScript {
    /// Events per tick. A frame's events arrive on the first tick of its run;
    /// the repeats are quiet ticks, so held keys and buttons stay held.
    pub fn expanded(&self) -> Vec<&[InputEvent]> {
        let mut out: Vec<&[InputEvent]> = Vec::new();
        for frame in &self.frames {
            out.push(&frame.events);
            for _ in 1..frame.repeat.max(1) {
                out.push(&[]);
            }
        }
        out
    }

    pub fn manual_clock(&self) -> ManualClock {
        ManualClock::new(self.step_ms)
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let script: ReplayScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&script)?;
    Ok(script)
}

fn validate_replay(script: &ReplayScript) -> Result<(), String> {
    if script.step_ms == 0 {
        return Err("Replay validation failed: step_ms must be > 0".to_string());
    }
    if script.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_step_ms() -> u64 {
    16
}

const fn default_repeat() -> u32 {
    1
}

fn click(at: Vec2) -> Vec<InputEvent> {
    vec![
        InputEvent::PointerMoved { x: at.x, y: at.y },
        InputEvent::MouseDown {
            button: MouseBtn::Left,
        },
        InputEvent::MouseUp {
            button: MouseBtn::Left,
        },
    ]
}

fn frame(events: Vec<InputEvent>, repeat: u32) -> ReplayFrame {
    ReplayFrame { events, repeat }
}

/// Start a game from the menu, strafe while firing right, pause and resume,
/// then quit.
pub fn default_script(viewport: Vec2) -> ReplayScript {
    let start_button = Vec2::new(viewport.x / 2.0, 360.0);
    let escape = vec![
        InputEvent::KeyDown { key: Key::Escape },
        InputEvent::KeyUp { key: Key::Escape },
    ];
    ReplayScript {
        step_ms: default_step_ms(),
        realtime: false,
        frames: vec![
            frame(Vec::new(), 30),
            frame(click(start_button), 200),
            frame(
                vec![
                    InputEvent::PointerMoved {
                        x: viewport.x,
                        y: viewport.y / 2.0,
                    },
                    InputEvent::MouseDown {
                        button: MouseBtn::Left,
                    },
                    InputEvent::KeyDown { key: Key::W },
                ],
                120,
            ),
            frame(
                vec![
                    InputEvent::KeyUp { key: Key::W },
                    InputEvent::KeyDown { key: Key::S },
                ],
                240,
            ),
            frame(escape.clone(), 60),
            frame(escape, 120),
            frame(vec![InputEvent::Quit], 1),
        ],
    }
}

/// Feed the script to the game one tick at a time. Stops early once the game
/// is no longer running.
pub fn run_script<C: Clock, V: Canvas, A: Audio>(
    game: &mut Game<C, V, A>,
    script: &ReplayScript,
) -> ReplaySummary {
    let mut ticks = 0;
    for events in script.expanded() {
        if !game.is_running() {
            break;
        }
        game.frame(events);
        ticks += 1;
    }
    let (score, lives) = game
        .session()
        .map_or((0, 0), |s| (s.score, s.player.lives));
    log::info!(
        "Replay finished after {ticks} ticks in {:?}: score {score}, lives {lives}",
        game.state()
    );
    ReplaySummary {
        ticks,
        final_state: game.state(),
        score,
        lives,
    }
}
