//! Match engine
//!
//! Owns one match: the simulation state, the timer set that drives it, the
//! seeded RNG and the injected score store. The host feeds it elapsed time
//! through `advance` and player input through `apply`; both run on the
//! caller's thread, so every mutation of the match is serialized.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::SNAKE_CYCLE_PALETTE;
use crate::highscores::ScoreStore;
use crate::persistence::KeyValueStore;
use crate::sim::spawn::{expire_entity, spawn_entity};
use crate::sim::{
    Direction, EntityKind, EntitySlot, GameEvent, GameMode, GamePhase, GameState, Scheduler,
    TimerKind, move_interval_ms,
};
use crate::tuning::Tuning;

/// Input forwarded by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ChangeDirection(Direction),
    Pause,
    Resume,
    Restart,
    SelectMode(GameMode),
}

/// Recurring spawn timer for an entity kind
fn spawn_timer(kind: EntityKind) -> TimerKind {
    match kind {
        EntityKind::SpecialFood => TimerKind::SpawnSpecialFood,
        EntityKind::ColorFood => TimerKind::SpawnColorFood,
        EntityKind::Star => TimerKind::SpawnStar,
        EntityKind::Bomb => TimerKind::SpawnBomb,
    }
}

/// One match plus everything needed to run it
#[derive(Debug)]
pub struct Game<S: KeyValueStore> {
    state: GameState,
    scheduler: Scheduler,
    rng: Pcg32,
    tuning: Tuning,
    scores: ScoreStore<S>,
    player_name: String,
    /// Set once the finished match has been written to the score store
    score_recorded: bool,
    /// Events since the last `drain_events`
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> Game<S> {
    /// Start a match in `mode`
    pub fn new(
        mode: GameMode,
        seed: u64,
        tuning: Tuning,
        scores: ScoreStore<S>,
        player_name: impl Into<String>,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = GameState::new_game(mode, &mut rng, 0);

        let mut game = Self {
            state,
            scheduler: Scheduler::new(),
            rng,
            tuning,
            scores,
            player_name: player_name.into(),
            score_recorded: false,
            events: Vec::new(),
        };
        game.arm_match_timers();
        log::info!("New {} match (seed {})", mode.as_str(), seed);
        game
    }

    // ---------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------

    /// Apply one UI command
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::ChangeDirection(dir) => self.change_direction(dir),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Restart => {
                self.restart();
                true
            }
            Command::SelectMode(mode) => {
                self.select_mode(mode);
                true
            }
        }
    }

    /// Queue a heading; reversals are ignored
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        crate::sim::change_direction(&mut self.state, direction)
    }

    /// Freeze the match. Only valid while running.
    pub fn pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Running {
            return false;
        }
        self.state.phase = GamePhase::Paused;
        log::info!("Paused");
        true
    }

    /// Unfreeze the match, re-deriving the move interval. Only valid while paused.
    pub fn resume(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        self.state.phase = GamePhase::Running;
        self.rearm_move();
        log::info!("Resumed");
        true
    }

    /// Throw the current match away and start a fresh one in the same mode.
    ///
    /// Events the UI has not drained yet (such as the final `GameOver`) are kept.
    pub fn restart(&mut self) {
        self.scheduler.cancel_all();
        let mode = self.state.mode;
        self.state = GameState::new_game(mode, &mut self.rng, self.scheduler.now_ms());
        self.score_recorded = false;
        self.arm_match_timers();
        log::info!("Restarted {} match", mode.as_str());
    }

    /// Switch difficulty; always starts a fresh match
    pub fn select_mode(&mut self, mode: GameMode) {
        self.state.mode = mode;
        self.restart();
    }

    // ---------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------

    /// Let `dt_ms` of play time pass, firing every timer that falls due.
    ///
    /// Does nothing unless the match is running, so a paused match keeps every
    /// timer (including entity lifetimes) exactly where it was.
    pub fn advance(&mut self, dt_ms: u64) {
        if self.state.phase != GamePhase::Running {
            return;
        }

        let until = self.scheduler.now_ms().saturating_add(dt_ms);
        while let Some(kind) = self.scheduler.pop_due(until) {
            self.state.now_ms = self.scheduler.now_ms();
            self.fire(kind);
            if self.state.phase != GamePhase::Running {
                return;
            }
        }
        self.scheduler.settle(until);
        self.state.now_ms = self.scheduler.now_ms();
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Move => {
                let events = crate::sim::tick(&mut self.state, &mut self.rng, &self.tuning);
                self.handle_events(&events);
                self.events.extend(events);
            }
            TimerKind::SpawnSpecialFood => self.spawn(EntityKind::SpecialFood),
            TimerKind::SpawnColorFood => self.spawn(EntityKind::ColorFood),
            TimerKind::SpawnStar => self.spawn(EntityKind::Star),
            TimerKind::SpawnBomb => self.spawn(EntityKind::Bomb),
            TimerKind::Expire(entity) => {
                expire_entity(&mut self.state, entity);
            }
            TimerKind::InvincibilityEnd => {
                self.state.invincible = false;
                log::debug!("Invincibility over");
            }
            TimerKind::SpeedBoostEnd => {
                self.state.speed_boost_ms = 0;
                self.rearm_move();
                // The next special food comes a full period after the boost
                self.scheduler.arm_every(
                    TimerKind::SpawnSpecialFood,
                    self.tuning.spawn_every_ms(EntityKind::SpecialFood),
                );
            }
            TimerKind::ColorCycleStep => {
                self.state.color_cycle = self
                    .state
                    .color_cycle
                    .map(|i| (i + 1) % SNAKE_CYCLE_PALETTE.len());
            }
            TimerKind::ColorCycleEnd => {
                self.state.color_cycle = None;
                self.scheduler.cancel(TimerKind::ColorCycleStep);
            }
        }
    }

    fn spawn(&mut self, kind: EntityKind) {
        let lifetime = self.tuning.lifetime_ms(kind);
        if spawn_entity(&mut self.state, kind, &mut self.rng, lifetime).is_some() {
            self.scheduler.arm_once(TimerKind::Expire(kind), lifetime);
        }
    }

    /// Arm the timers that follow up on a tick
    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::Ate(item) => {
                    if let Some(kind) = item.entity() {
                        self.scheduler.cancel(TimerKind::Expire(kind));
                    }
                }
                GameEvent::LevelUp { .. } => self.rearm_move(),
                GameEvent::ObstaclesPlaced { .. } => {}
                GameEvent::InvincibilityGranted => {
                    self.scheduler
                        .arm_once(TimerKind::InvincibilityEnd, self.tuning.invincibility_ms);
                }
                GameEvent::ColorCycleStarted => {
                    self.scheduler
                        .arm_every(TimerKind::ColorCycleStep, self.tuning.color_cycle_step_ms);
                    self.scheduler
                        .arm_once(TimerKind::ColorCycleEnd, self.tuning.color_cycle_ms);
                }
                GameEvent::SpeedBoosted => {
                    self.rearm_move();
                    self.scheduler.cancel(TimerKind::SpawnSpecialFood);
                    self.scheduler
                        .arm_once(TimerKind::SpeedBoostEnd, self.tuning.speed_boost_duration_ms);
                }
                GameEvent::GameOver(_) | GameEvent::Won => self.finish(),
            }
        }
    }

    /// Stop every timer and record the result once
    fn finish(&mut self) {
        self.scheduler.cancel_all();
        if self.score_recorded {
            return;
        }
        self.score_recorded = true;
        self.scores.save_score(
            &self.player_name,
            self.state.score,
            self.state.level,
            self.state.mode,
        );
    }

    fn arm_match_timers(&mut self) {
        self.scheduler.cancel_all();
        self.rearm_move();
        for kind in EntityKind::ALL {
            if kind == EntityKind::ColorFood && !self.state.mode.obstacles_enabled() {
                continue;
            }
            self.scheduler
                .arm_every(spawn_timer(kind), self.tuning.spawn_every_ms(kind));
        }
    }

    fn rearm_move(&mut self) {
        let interval = self.tick_interval_ms();
        self.scheduler.arm_every(TimerKind::Move, interval);
    }

    // ---------------------------------------------------------------
    // Read-only views for the UI
    // ---------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn has_won(&self) -> bool {
        self.state.has_won()
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn entity(&self, kind: EntityKind) -> &EntitySlot {
        self.state.slot(kind)
    }

    pub fn snake_color(&self) -> u32 {
        self.state.snake_color()
    }

    /// Play time of the current match, excluding pauses
    pub fn elapsed_ms(&self) -> u64 {
        self.state.elapsed_ms()
    }

    /// Current move interval
    pub fn tick_interval_ms(&self) -> u64 {
        move_interval_ms(
            self.state.mode,
            self.state.level,
            self.state.speed_boost_ms,
        )
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Takes effect for the next recorded score
    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    pub fn scores(&self) -> &ScoreStore<S> {
        &self.scores
    }

    /// Events produced since the last call (for sounds, haptics, banners)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
