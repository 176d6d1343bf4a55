//! Top-level state machine.
//!
//! One [`Game::tick`] per rendered frame. Every tick runs in the same order:
//! fold the frame's input events, bail out on quit, run the current state's
//! handler (input, simulation, combat, then drawing), present, and clear the
//! edge-triggered input.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use survivor_core::{AnimationClip, Clock, InputEvent, InputState, Key, MouseBtn};

use crate::assets::{AssetCatalog, ImageId, EFFECT_FRAME_SIZE};
use crate::config::GameConfig;
use crate::map::MapSource;
use crate::menu::{GameOverAction, MainMenuAction, Menu, PauseAction};
use crate::platform::{Audio, Canvas, Music, Rgb, Sound, TextAlign};
use crate::player::aim_from_pointer;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Loading,
    Playing,
    Paused,
    Settings,
    GameOver,
}

/// Where the loading screen goes once it has run its course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    Playing,
    Menu,
}

pub struct Game<C: Clock, V: Canvas, A: Audio> {
    config: GameConfig,
    catalog: AssetCatalog,
    map: Box<dyn MapSource>,
    clock: C,
    canvas: V,
    audio: A,
    rng: StdRng,
    input: InputState,
    menu: Menu,
    state: GameState,
    previous_state: Option<GameState>,
    loading_started_ms: u64,
    loading_target: Option<LoadTarget>,
    current_music: Option<Music>,
    session: Option<Session>,
    running: bool,
}

impl<C: Clock, V: Canvas, A: Audio> Game<C, V, A> {
    pub fn new(
        config: GameConfig,
        catalog: AssetCatalog,
        map: Box<dyn MapSource>,
        clock: C,
        canvas: V,
        audio: A,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let menu = Menu::new(config.viewport(), config.music_volume, config.sfx_volume);
        Self {
            config,
            catalog,
            map,
            clock,
            canvas,
            audio,
            rng,
            input: InputState::new(),
            menu,
            state: GameState::Menu,
            previous_state: None,
            loading_started_ms: 0,
            loading_target: None,
            current_music: None,
            session: None,
            running: true,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn canvas(&self) -> &V {
        &self.canvas
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Pace one frame on the clock, then tick with its delta.
    pub fn frame(&mut self, events: &[InputEvent]) {
        let dt = self.clock.tick();
        self.tick(dt, events);
    }

    pub fn tick(&mut self, dt: f32, events: &[InputEvent]) {
        for event in events {
            self.input.apply(event);
        }
        if self.input.quit_requested() {
            if self.running {
                log::info!("Quit requested, exiting.");
            }
            self.running = false;
            self.input.end_frame();
            return;
        }

        match self.state {
            GameState::Menu => self.handle_menu(),
            GameState::Loading => self.handle_loading(),
            GameState::Playing => self.handle_playing(dt),
            GameState::Paused => self.handle_paused(),
            GameState::Settings => self.handle_settings(),
            GameState::GameOver => self.handle_game_over(),
        }

        self.canvas.present();
        self.input.end_frame();
    }

    fn clicked(&self) -> bool {
        self.input.is_mouse_just_pressed(MouseBtn::Left)
    }

    fn play_sound(&mut self, sound: Sound) {
        let volume = sound.base_volume() * self.menu.sfx_volume();
        self.audio.play_sound(sound, volume);
    }

    fn play_music(&mut self, music: Music) {
        let volume = self.menu.music_volume();
        if self.current_music == Some(music) {
            self.audio.set_music_volume(volume);
            return;
        }
        self.audio.play_music(music, volume);
        self.current_music = Some(music);
    }

    fn stop_music(&mut self) {
        self.audio.stop_music();
        self.current_music = None;
    }

    fn set_state(&mut self, next: GameState) {
        if self.state != next {
            log::info!("State {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    fn start_loading(&mut self, target: LoadTarget) {
        self.set_state(GameState::Loading);
        self.loading_started_ms = self.clock.now_ms();
        self.loading_target = Some(target);
    }

    /// Throw away the current session and build a fresh one from the map.
    fn reset_session(&mut self) {
        let now = self.clock.now_ms();
        self.session = Some(Session::new(
            self.map.as_ref(),
            &self.catalog,
            &self.config,
            now,
        ));
        log::info!("New session started");
    }

    fn enter_game_over(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.spawner.stop();
            log::info!("Game over with score {}", session.score);
        }
        self.stop_music();
        self.set_state(GameState::GameOver);
    }

    fn menu_background(&self) -> Option<&ImageId> {
        let id = &self.catalog.menu_background;
        self.catalog.info(id).map(|_| id)
    }

    /// The paused world behind an overlay.
    fn draw_backdrop(&mut self, with_hud: bool) {
        let Some(session) = self.session.as_mut() else {
            self.canvas.fill(Rgb::BLACK);
            return;
        };
        session.draw_world(&mut self.canvas);
        if with_hud {
            session.draw_hud(&mut self.canvas, &self.catalog);
        }
    }

    fn handle_menu(&mut self) {
        self.play_music(Music::Menu);

        if self.clicked() {
            match self.menu.main_menu_click(self.input.pointer) {
                Some(MainMenuAction::Start) => {
                    self.play_sound(Sound::ButtonClick);
                    self.start_loading(LoadTarget::Playing);
                }
                Some(MainMenuAction::Settings) => {
                    self.play_sound(Sound::ButtonClick);
                    self.previous_state = Some(GameState::Menu);
                    self.set_state(GameState::Settings);
                }
                Some(MainMenuAction::Exit) => {
                    self.play_sound(Sound::ButtonClick);
                    log::info!("Exit chosen from the main menu");
                    self.running = false;
                }
                None => {}
            }
        }

        let background = self.menu_background().cloned();
        self.menu
            .draw_main_menu(&mut self.canvas, background.as_ref(), self.input.pointer);
    }

    fn handle_loading(&mut self) {
        let elapsed = self.clock.now_ms().saturating_sub(self.loading_started_ms);
        self.draw_loading_screen(elapsed);

        if elapsed < self.config.loading_duration_ms {
            return;
        }
        match self.loading_target.take() {
            Some(LoadTarget::Playing) => {
                self.set_state(GameState::Playing);
                self.reset_session();
                self.play_music(Music::Game);
            }
            Some(LoadTarget::Menu) => {
                self.set_state(GameState::Menu);
                self.play_music(Music::Menu);
            }
            None => {
                log::warn!("Loading finished with no target; returning to the menu");
                self.set_state(GameState::Menu);
            }
        }
    }

    fn draw_loading_screen(&mut self, elapsed_ms: u64) {
        let viewport = self.config.viewport();
        let center = viewport * 0.5;
        self.canvas.fill(Rgb::DUSK);

        let frames = &self.catalog.loading_frames;
        let clip = AnimationClip::looping(frames.len(), self.config.loading_frame_ms);
        if let Some(image) = clip.frame_at(elapsed_ms).and_then(|i| frames.get(i)) {
            let size = self.catalog.size_of(image, EFFECT_FRAME_SIZE);
            let frame_center = center - Vec2::new(0.0, 50.0);
            self.canvas.draw_image(image, frame_center - size * 0.5);
        }

        let text_pos = center + Vec2::new(0.0, 80.0);
        let shadow = text_pos + Vec2::splat(3.0);
        self.canvas
            .draw_text("Loading...", shadow, 48, Rgb::BLACK, TextAlign::Center);
        self.canvas
            .draw_text("Loading...", text_pos, 48, Rgb::WHITE, TextAlign::Center);
    }

    fn handle_playing(&mut self, dt: f32) {
        let now = self.clock.now_ms();

        // The rest of this tick still runs; the pause shows from the next one.
        if self.input.is_just_pressed(Key::Escape) {
            self.play_sound(Sound::ButtonClick);
            self.set_state(GameState::Paused);
        }

        let Some(session) = self.session.as_mut() else {
            log::warn!("Playing without a session; returning to the menu");
            self.set_state(GameState::Menu);
            return;
        };

        if session.spawner.poll(now) {
            session.spawn_enemy(&mut self.rng, &self.catalog);
        }
        session.update_timers(now);

        let mut sounds = Vec::new();
        if self.input.is_mouse_held(MouseBtn::Left) && session.try_fire(&self.catalog, now) {
            sounds.push(Sound::Shoot);
        }

        let aim = aim_from_pointer(self.input.pointer, self.config.viewport());
        session.update_entities(dt, now, self.input.move_axis(), aim);
        session.compact(now);

        let outcome = session.resolve_combat(&self.catalog, now);
        sounds.extend(std::iter::repeat(Sound::Impact).take(outcome.bullet_hits as usize));
        if outcome.player_hit {
            sounds.push(Sound::PlayerDeath);
        }

        session.draw_world(&mut self.canvas);
        session.draw_effects(&mut self.canvas, &self.catalog, now);
        session.draw_hud(&mut self.canvas, &self.catalog);
        let dead = !session.player.is_alive();

        for sound in sounds {
            self.play_sound(sound);
        }
        if dead {
            self.enter_game_over();
        }
    }

    fn handle_paused(&mut self) {
        if self.input.is_just_pressed(Key::Escape) {
            self.play_sound(Sound::ButtonClick);
            self.set_state(GameState::Playing);
        }

        if self.clicked() {
            match self.menu.pause_click(self.input.pointer) {
                Some(PauseAction::Resume) => {
                    self.play_sound(Sound::ButtonClick);
                    self.set_state(GameState::Playing);
                }
                Some(PauseAction::Settings) => {
                    self.play_sound(Sound::ButtonClick);
                    self.previous_state = Some(GameState::Paused);
                    self.set_state(GameState::Settings);
                }
                Some(PauseAction::Restart) => {
                    self.play_sound(Sound::ButtonClick);
                    self.play_sound(Sound::PlayerRevive);
                    self.set_state(GameState::Playing);
                    self.reset_session();
                }
                Some(PauseAction::MainMenu) => {
                    self.play_sound(Sound::ButtonClick);
                    self.start_loading(LoadTarget::Menu);
                }
                None => {}
            }
        }

        self.draw_backdrop(true);
        self.menu.draw_pause(&mut self.canvas, self.input.pointer);
    }

    fn handle_settings(&mut self) {
        let from_pause = self.previous_state == Some(GameState::Paused);

        if self.clicked() && self.menu.back_clicked(self.input.pointer) {
            self.play_sound(Sound::ButtonClick);
            let back_to = self.previous_state.take().unwrap_or(GameState::Menu);
            self.set_state(back_to);
        }

        let pressed = self.input.is_mouse_held(MouseBtn::Left);
        if self.menu.drag_sliders(self.input.pointer, pressed) && self.current_music.is_some() {
            self.audio.set_music_volume(self.menu.music_volume());
        }

        if from_pause {
            self.draw_backdrop(true);
        }
        let background = self.menu_background().cloned();
        self.menu.draw_settings(
            &mut self.canvas,
            from_pause,
            background.as_ref(),
            self.input.pointer,
        );
    }

    fn handle_game_over(&mut self) {
        if self.clicked() {
            match self.menu.game_over_click(self.input.pointer) {
                Some(GameOverAction::PlayAgain) => {
                    self.play_sound(Sound::ButtonClick);
                    self.play_sound(Sound::PlayerRevive);
                    self.start_loading(LoadTarget::Playing);
                }
                Some(GameOverAction::MainMenu) => {
                    self.play_sound(Sound::ButtonClick);
                    self.start_loading(LoadTarget::Menu);
                }
                None => {}
            }
        }

        self.draw_backdrop(false);
        let score = self.session.as_ref().map_or(0, |s| s.score);
        self.menu
            .draw_game_over(&mut self.canvas, score, self.input.pointer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::Enemy;
    use crate::entity::Entity;
    use crate::headless::{DrawCommand, RecordingAudio, RecordingCanvas};
    use crate::map::MapFile;
    use survivor_core::ManualClock;

    type TestGame = Game<ManualClock, RecordingCanvas, RecordingAudio>;

    const STEP_MS: u64 = 16;
    const DT: f32 = 0.016;

    fn game() -> TestGame {
        let config = GameConfig {
            rng_seed: Some(42),
            ..GameConfig::default()
        };
        let catalog = AssetCatalog::placeholder(config.viewport());
        let map = Box::new(MapFile::fallback_arena(config.tile_size, 20));
        Game::new(
            config,
            catalog,
            map,
            ManualClock::new(STEP_MS),
            RecordingCanvas::new(),
            RecordingAudio::new(),
        )
    }

    fn step(game: &mut TestGame, events: &[InputEvent]) {
        game.clock_mut().advance(STEP_MS);
        game.tick(DT, events);
    }

    fn click_at(x: f32, y: f32) -> Vec<InputEvent> {
        vec![
            InputEvent::PointerMoved { x, y },
            InputEvent::MouseDown {
                button: MouseBtn::Left,
            },
            InputEvent::MouseUp {
                button: MouseBtn::Left,
            },
        ]
    }

    fn escape() -> Vec<InputEvent> {
        vec![
            InputEvent::KeyDown { key: Key::Escape },
            InputEvent::KeyUp { key: Key::Escape },
        ]
    }

    /// Menu -> loading -> playing, with the pointer parked at screen centre.
    fn start_playing(game: &mut TestGame) {
        step(game, &click_at(720.0, 360.0));
        assert_eq!(game.state(), GameState::Loading);
        game.clock_mut().advance(3_000);
        step(game, &[]);
        assert_eq!(game.state(), GameState::Playing);
    }

    fn drop_enemy_on_player(game: &mut TestGame) {
        let session = game.session_mut().expect("session");
        let at = session.player.position();
        let frames = vec![ImageId::new("enemies/bat/0")];
        session
            .enemies
            .push(Enemy::new(at, Vec2::splat(96.0), frames, &GameConfig::default()));
    }

    #[test]
    fn starts_in_menu_with_menu_music() {
        let mut game = game();
        step(&mut game, &[]);
        assert_eq!(game.state(), GameState::Menu);
        assert_eq!(game.audio().music, Some(Music::Menu));
        assert_eq!(
            game.canvas().button_labels(),
            vec!["START", "SETTINGS", "EXIT"]
        );

        step(&mut game, &[]);
        assert_eq!(game.audio().music_starts, 1);
    }

    #[test]
    fn quit_stops_before_rendering() {
        let mut game = game();
        step(&mut game, &[]);
        let presented = game.canvas().frames_presented();
        step(&mut game, &[InputEvent::Quit]);
        assert!(!game.is_running());
        assert_eq!(game.canvas().frames_presented(), presented);
    }

    #[test]
    fn exit_button_stops_the_game() {
        let mut game = game();
        step(&mut game, &click_at(720.0, 580.0));
        assert!(!game.is_running());
        assert_eq!(game.audio().count(Sound::ButtonClick), 1);
    }

    #[test]
    fn loading_waits_for_full_duration() {
        let mut game = game();
        step(&mut game, &click_at(720.0, 360.0));
        assert_eq!(game.state(), GameState::Loading);
        assert!(game.session().is_none());

        game.clock_mut().advance(2_984 - STEP_MS);
        step(&mut game, &[]);
        assert_eq!(game.state(), GameState::Loading);
        assert!(game.canvas().texts().contains(&"Loading..."));

        step(&mut game, &[]);
        assert_eq!(game.state(), GameState::Playing);
        assert!(game.session().is_some());
        assert_eq!(game.audio().music, Some(Music::Game));
    }

    #[test]
    fn escape_pauses_and_resumes_without_touching_the_session() {
        let mut game = game();
        start_playing(&mut game);
        step(&mut game, &escape());
        assert_eq!(game.state(), GameState::Paused);
        let enemies = game.session().map(|s| s.enemies.len());

        step(&mut game, &[]);
        assert_eq!(game.session().map(|s| s.enemies.len()), enemies);
        assert_eq!(
            game.canvas().button_labels(),
            vec!["RESUME", "SETTINGS", "RESTART", "MAIN MENU"]
        );
        // The world is still drawn behind the overlay.
        assert!(!game.canvas().sprite_images().is_empty());

        step(&mut game, &escape());
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn enemy_on_player_costs_exactly_one_life() {
        let mut game = game();
        start_playing(&mut game);
        drop_enemy_on_player(&mut game);
        step(&mut game, &[]);

        let session = game.session().expect("session");
        assert_eq!(session.player.lives, 3);
        assert!(session.player.invulnerability.is_active());
        assert_eq!(session.score, 1);
        assert_eq!(game.audio().count(Sound::PlayerDeath), 1);

        // Still invulnerable on the next tick even with another enemy on top.
        drop_enemy_on_player(&mut game);
        step(&mut game, &[]);
        assert_eq!(game.session().map(|s| s.player.lives), Some(3));
    }

    #[test]
    fn invulnerability_lasts_exactly_its_duration() {
        let mut game = game();
        start_playing(&mut game);
        drop_enemy_on_player(&mut game);
        step(&mut game, &[]);
        let hit_at = game.clock().now_ms();

        // One tick before expiry: still protected.
        let before = hit_at + 1_000 - STEP_MS;
        let wait = before - game.clock().now_ms() - STEP_MS;
        game.clock_mut().advance(wait);
        drop_enemy_on_player(&mut game);
        step(&mut game, &[]);
        assert_eq!(game.clock().now_ms(), before);
        assert_eq!(game.session().map(|s| s.player.lives), Some(3));

        // At expiry the window closes before combat runs.
        drop_enemy_on_player(&mut game);
        step(&mut game, &[]);
        assert_eq!(game.clock().now_ms(), hit_at + 1_000);
        assert_eq!(game.session().map(|s| s.player.lives), Some(2));
    }

    #[test]
    fn game_over_on_the_tick_lives_hit_zero() {
        let mut game = game();
        start_playing(&mut game);
        let mut history = Vec::new();

        for _ in 0..4 {
            assert_eq!(game.state(), GameState::Playing);
            drop_enemy_on_player(&mut game);
            step(&mut game, &[]);
            history.push(game.session().map(|s| s.player.lives).unwrap_or(0));
            game.clock_mut().advance(1_000);
        }

        assert_eq!(history, vec![3, 2, 1, 0]);
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.audio().music, None);
        assert!(!game.session().map_or(true, |s| s.spawner.is_running()));

        // The last frame of play was still drawn in full.
        let last = game.canvas().last_frame();
        assert!(last
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "Score: 4")));
    }

    #[test]
    fn game_over_play_again_resets_through_loading() {
        let mut game = game();
        start_playing(&mut game);
        for _ in 0..4 {
            drop_enemy_on_player(&mut game);
            step(&mut game, &[]);
            game.clock_mut().advance(1_000);
        }
        assert_eq!(game.state(), GameState::GameOver);

        step(&mut game, &click_at(720.0, 390.0));
        assert_eq!(game.state(), GameState::Loading);
        assert_eq!(game.audio().count(Sound::PlayerRevive), 1);

        game.clock_mut().advance(3_000);
        step(&mut game, &[]);
        let session = game.session().expect("fresh session");
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(session.player.lives, 4);
        assert_eq!(session.score, 0);
        assert!(session.enemies.is_empty());
        assert!(session.spawner.is_running());
    }

    #[test]
    fn holding_fire_respects_cooldown() {
        let mut game = game();
        start_playing(&mut game);
        let press = [
            InputEvent::PointerMoved { x: 1000.0, y: 360.0 },
            InputEvent::MouseDown {
                button: MouseBtn::Left,
            },
        ];
        step(&mut game, &press);
        assert_eq!(game.session().map(|s| s.bullets.len()), Some(1));

        // 16 ms ticks: the second shot lands on the first tick at or past 100 ms.
        for _ in 0..5 {
            step(&mut game, &[]);
        }
        assert_eq!(game.session().map(|s| s.bullets.len()), Some(1));
        step(&mut game, &[]);
        assert_eq!(game.session().map(|s| s.bullets.len()), Some(1));
        step(&mut game, &[]);
        assert_eq!(game.session().map(|s| s.bullets.len()), Some(2));
        assert_eq!(game.audio().count(Sound::Shoot), 2);
    }

    #[test]
    fn settings_from_pause_returns_to_pause() {
        let mut game = game();
        start_playing(&mut game);
        step(&mut game, &escape());
        step(&mut game, &click_at(720.0, 400.0));
        assert_eq!(game.state(), GameState::Settings);

        // Drag the music slider far past its right edge.
        let drag = [
            InputEvent::PointerMoved { x: 720.0, y: 310.0 },
            InputEvent::MouseDown {
                button: MouseBtn::Left,
            },
        ];
        step(&mut game, &drag);
        step(&mut game, &[InputEvent::PointerMoved { x: 4000.0, y: 310.0 }]);
        assert_eq!(game.menu().music_volume(), 1.0);
        assert_eq!(game.audio().music_volume, 1.0);
        step(&mut game, &[InputEvent::MouseUp { button: MouseBtn::Left }]);

        step(&mut game, &click_at(720.0, 590.0));
        assert_eq!(game.state(), GameState::Paused);
    }

    #[test]
    fn settings_from_menu_defaults_back_to_menu() {
        let mut game = game();
        step(&mut game, &click_at(720.0, 470.0));
        assert_eq!(game.state(), GameState::Settings);
        step(&mut game, &click_at(720.0, 590.0));
        assert_eq!(game.state(), GameState::Menu);
    }

    #[test]
    fn restart_rebuilds_the_session() {
        let mut game = game();
        start_playing(&mut game);
        drop_enemy_on_player(&mut game);
        step(&mut game, &[]);
        assert_eq!(game.session().map(|s| s.score), Some(1));

        step(&mut game, &escape());
        step(&mut game, &click_at(720.0, 510.0));
        assert_eq!(game.state(), GameState::Playing);
        let session = game.session().expect("session");
        assert_eq!(session.score, 0);
        assert_eq!(session.player.lives, 4);
        assert!(session.effects.is_empty());
        assert_eq!(game.audio().count(Sound::PlayerRevive), 1);
    }

    #[test]
    fn pause_main_menu_goes_through_loading() {
        let mut game = game();
        start_playing(&mut game);
        step(&mut game, &escape());
        step(&mut game, &click_at(720.0, 620.0));
        assert_eq!(game.state(), GameState::Loading);

        game.clock_mut().advance(3_000);
        step(&mut game, &[]);
        assert_eq!(game.state(), GameState::Menu);
        assert_eq!(game.audio().music, Some(Music::Menu));
    }

    #[test]
    fn enemies_spawn_on_the_ticker() {
        let mut game = game();
        start_playing(&mut game);
        // 300 ms spawn period at 16 ms ticks.
        for _ in 0..40 {
            step(&mut game, &[]);
        }
        let spawned = game.session().map_or(0, |s| s.enemies.len());
        assert!(spawned >= 2, "spawned {spawned}");
    }
}
