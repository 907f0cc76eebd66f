//! Mission state machine.
//!
//! A mission visits its landing targets in order. Each credited landing is
//! graded, and after a short pause the next target becomes active; landing
//! on the last one completes the mission with a star rating. A crash or a
//! sustained empty tank fails the mission and starts a slow-motion freeze.
//!
//! The controller never calls out to observers directly. State changes are
//! queued as [`MissionEvent`]s and drained in order at the end of each
//! update, where the plugin fans them out as [`MissionMessage`]s.

pub mod schedule;

use bevy::prelude::*;

use crate::fuel::{FuelExhaustedMessage, FuelTank};
use crate::landing::{LandingQuality, LandingSession, LandingSite};
use crate::outcome::{GradeThresholds, LandingGrade, StarRecord, grade_landing};
use crate::progress::{CurrentLevel, LevelProgress};
use crate::time::{Dilation, TimeControl};
use crate::types::{DEFAULT_FIXED_TIMESTEP, Kinematic, Ship, SimulationSet};

use schedule::{Clock, ContinuationId, ContinuationQueue};

/// Plugin providing the mission controller and its notifications.
pub struct MissionPlugin;

impl Plugin for MissionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MissionController>()
            .init_resource::<LevelProgress>()
            .init_resource::<CurrentLevel>()
            .add_message::<MissionMessage>()
            .add_message::<FuelExhaustedMessage>()
            .add_systems(
                FixedUpdate,
                (record_fuel_level, handle_fuel_exhausted, dispatch_mission_events)
                    .chain()
                    .in_set(SimulationSet::Mission),
            )
            .add_systems(
                Update,
                (sync_target_count, tick_mission_clock, dispatch_mission_events).chain(),
            );
    }
}

/// Mission thresholds and delays.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionConfig {
    pub grading: GradeThresholds,
    /// Fuel needed at completion for the fuel star.
    pub min_fuel_for_star: f64,
    /// Game seconds between a landing and the next target.
    pub advance_delay: f64,
    /// Real seconds between completion and the results screen.
    pub results_delay: f64,
    /// Real seconds between failure and the failure screen.
    pub fail_screen_delay: f64,
    /// Real seconds of the failure slow-motion freeze.
    pub dilation_duration: f64,
    /// Fixed step at normal speed.
    pub normal_timestep: f64,
    /// Fixed step approached during the freeze.
    pub frozen_timestep: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            grading: GradeThresholds::default(),
            min_fuel_for_star: 20.0,
            advance_delay: 2.0,
            results_delay: 1.0,
            fail_screen_delay: 2.0,
            dilation_duration: 1.0,
            normal_timestep: DEFAULT_FIXED_TIMESTEP,
            frozen_timestep: 0.002,
        }
    }
}

/// Overall state of the current mission attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
    MissionFail,
    MissionComplete,
}

impl GameState {
    /// Failed and completed missions only leave through a restart.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::MissionFail | GameState::MissionComplete)
    }
}

/// Why a mission failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureCause {
    Crashed,
    OutOfFuel,
}

/// Notification for mission observers (UI, audio, camera).
#[derive(Clone, Debug, PartialEq)]
pub enum MissionEvent {
    /// A new landing target is active.
    ActiveTargetChanged(usize),
    /// A landing on `index` was credited.
    TargetLanded { index: usize, grade: LandingGrade },
    /// The last target was landed on.
    MissionCompleted { stars: u8, record: StarRecord },
    /// Time to show the results sequence.
    ResultsReady(StarRecord),
    MissionFailed(FailureCause),
    /// Time to show the failure screen.
    FailureScreenReady,
    Paused,
    Resumed,
    Restarted,
}

/// Message carrying a [`MissionEvent`] to other systems.
#[derive(Message, Clone, Debug)]
pub struct MissionMessage(pub MissionEvent);

/// Rejected mission operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MissionError {
    #[error("mission is not playing (state: {0:?})")]
    NotPlaying(GameState),

    #[error("landing on target {0} was already credited")]
    LandingAlreadyCredited(usize),

    #[error("no active landing target")]
    NoActiveTarget,

    #[error("mission is already paused")]
    AlreadyPaused,

    #[error("mission is not paused")]
    NotPaused,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Continuation {
    AdvanceTarget,
    ShowResults(StarRecord),
    ShowFailureScreen,
}

/// Finite-state controller for one mission attempt.
#[derive(Resource, Clone, Debug)]
pub struct MissionController {
    config: MissionConfig,
    target_count: usize,
    target_index: usize,
    state: GameState,
    record: StarRecord,
    fuel_level: Option<f64>,
    /// Advance scheduled by a credited landing that has not fired yet.
    pending_advance: Option<ContinuationId>,
    schedule: ContinuationQueue<Continuation>,
    game_clock: f64,
    real_clock: f64,
    time: TimeControl,
    dilation: Option<Dilation>,
    outbox: Vec<MissionEvent>,
}

impl Default for MissionController {
    fn default() -> Self {
        Self::new(MissionConfig::default(), 0)
    }
}

impl MissionController {
    /// Start a mission over `target_count` targets; the first is active.
    pub fn new(config: MissionConfig, target_count: usize) -> Self {
        let time = TimeControl::normal(config.normal_timestep);
        let mut controller = Self {
            config,
            target_count,
            target_index: 0,
            state: GameState::Playing,
            record: StarRecord::default(),
            fuel_level: None,
            pending_advance: None,
            schedule: ContinuationQueue::new(),
            game_clock: 0.0,
            real_clock: 0.0,
            time,
            dilation: None,
            outbox: Vec::new(),
        };
        controller.announce_first_target();
        controller
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Index of the target currently being flown to, if any.
    pub fn active_target(&self) -> Option<usize> {
        (self.target_index < self.target_count && !self.state.is_terminal())
            .then_some(self.target_index)
    }

    /// Star flags so far (final once the mission is complete).
    pub fn record(&self) -> StarRecord {
        self.record
    }

    pub fn time_control(&self) -> TimeControl {
        self.time
    }

    pub fn dilation(&self) -> Option<&Dilation> {
        self.dilation.as_ref()
    }

    /// Whether a credited landing is waiting for the next target.
    pub fn is_awaiting_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    /// Take all queued notifications in the order they happened.
    pub fn drain_events(&mut self) -> Vec<MissionEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Change the number of targets (level loading).
    ///
    /// Announces the first target if the mission had none before.
    pub fn set_target_count(&mut self, target_count: usize) {
        let had_target = self.active_target().is_some();
        self.target_count = target_count;
        if !had_target && self.state == GameState::Playing {
            self.announce_first_target();
        }
    }

    /// Record the ship's remaining fuel for the fuel star.
    pub fn update_fuel(&mut self, level: f64) {
        self.fuel_level = Some(level);
    }

    /// Credit a landing on the active target.
    ///
    /// Grades the landing and schedules the advance to the next target.
    pub fn landed(&mut self, quality: LandingQuality) -> Result<LandingGrade, MissionError> {
        if self.state != GameState::Playing {
            return Err(MissionError::NotPlaying(self.state));
        }
        let Some(index) = self.active_target() else {
            warn!("Landing reported with no active target");
            return Err(MissionError::NoActiveTarget);
        };
        if self.pending_advance.is_some() {
            return Err(MissionError::LandingAlreadyCredited(index));
        }

        let grade = grade_landing(&quality, &self.config.grading);
        self.record.apply_grade(grade);
        info!(
            "Target {} landed ({}): impact {:.2}, duration {:.2}s",
            index,
            grade.label(),
            quality.impact_speed,
            quality.duration
        );
        self.outbox.push(MissionEvent::TargetLanded { index, grade });

        if self.config.advance_delay > 0.0 {
            let due = self.game_clock + self.config.advance_delay;
            self.pending_advance =
                Some(self.schedule.schedule(Clock::Game, due, Continuation::AdvanceTarget));
        } else {
            self.advance_target();
        }

        Ok(grade)
    }

    /// Fail the mission because the ship crashed.
    pub fn report_crash(&mut self) -> Result<(), MissionError> {
        self.fail(FailureCause::Crashed)
    }

    /// Fail the mission because the ship ran dry for too long.
    pub fn report_fuel_exhausted(&mut self) -> Result<(), MissionError> {
        self.fail(FailureCause::OutOfFuel)
    }

    /// Freeze the game. Only a playing mission can be paused.
    pub fn pause(&mut self) -> Result<(), MissionError> {
        match self.state {
            GameState::Playing => {
                self.state = GameState::Paused;
                self.time.time_scale = 0.0;
                info!("Mission paused");
                self.outbox.push(MissionEvent::Paused);
                Ok(())
            }
            GameState::Paused => Err(MissionError::AlreadyPaused),
            state => Err(MissionError::NotPlaying(state)),
        }
    }

    /// Continue a paused mission at normal speed.
    pub fn resume(&mut self) -> Result<(), MissionError> {
        if self.state != GameState::Paused {
            return Err(MissionError::NotPaused);
        }
        self.state = GameState::Playing;
        self.time = TimeControl::normal(self.config.normal_timestep);
        info!("Mission resumed");
        self.outbox.push(MissionEvent::Resumed);
        Ok(())
    }

    /// Start the mission over from the first target.
    ///
    /// Pending continuations are voided and time runs at normal speed.
    pub fn restart(&mut self) {
        self.target_index = 0;
        self.state = GameState::Playing;
        self.record = StarRecord::default();
        self.fuel_level = None;
        self.pending_advance = None;
        self.schedule.clear();
        self.game_clock = 0.0;
        self.real_clock = 0.0;
        self.time = TimeControl::normal(self.config.normal_timestep);
        self.dilation = None;

        info!("Mission restarted");
        self.outbox.push(MissionEvent::Restarted);
        self.announce_first_target();
    }

    /// Advance the mission clocks by `real_dt` wall-clock seconds.
    ///
    /// Game time advances by `real_dt` scaled by the current time scale.
    /// Runs the failure freeze and fires due continuations.
    pub fn update(&mut self, real_dt: f64) {
        if !(real_dt >= 0.0 && real_dt.is_finite()) {
            return;
        }

        self.game_clock += real_dt * self.time.time_scale;
        self.real_clock += real_dt;

        if let Some(dilation) = self.dilation.as_mut()
            && dilation.advance(real_dt, &mut self.time)
        {
            info!("Failure freeze complete");
        }

        let mut due = self.schedule.poll(Clock::Game, self.game_clock);
        due.extend(self.schedule.poll(Clock::Real, self.real_clock));

        for continuation in due {
            match continuation {
                Continuation::AdvanceTarget => {
                    if self.state == GameState::Playing {
                        self.advance_target();
                    }
                }
                Continuation::ShowResults(record) => {
                    self.outbox.push(MissionEvent::ResultsReady(record));
                }
                Continuation::ShowFailureScreen => {
                    self.outbox.push(MissionEvent::FailureScreenReady);
                }
            }
        }
    }

    fn announce_first_target(&mut self) {
        if self.target_count == 0 {
            warn!("Mission has no landing targets");
            return;
        }
        self.outbox.push(MissionEvent::ActiveTargetChanged(self.target_index));
    }

    fn advance_target(&mut self) {
        self.pending_advance = None;
        self.target_index += 1;

        if self.target_index >= self.target_count {
            self.complete();
        } else {
            debug!("Advancing to target {}", self.target_index);
            self.outbox.push(MissionEvent::ActiveTargetChanged(self.target_index));
        }
    }

    fn complete(&mut self) {
        self.state = GameState::MissionComplete;

        match self.fuel_level {
            Some(level) if level < self.config.min_fuel_for_star => self.record.fuel = false,
            Some(_) => {}
            None => debug!("No fuel level reported; keeping the fuel star"),
        }

        let stars = self.record.count();
        info!("Mission complete with {} stars", stars);
        self.outbox.push(MissionEvent::MissionCompleted {
            stars,
            record: self.record,
        });

        let due = self.real_clock + self.config.results_delay;
        self.schedule
            .schedule(Clock::Real, due, Continuation::ShowResults(self.record));
    }

    fn fail(&mut self, cause: FailureCause) -> Result<(), MissionError> {
        if self.state != GameState::Playing {
            return Err(MissionError::NotPlaying(self.state));
        }

        self.state = GameState::MissionFail;
        if let Some(id) = self.pending_advance.take() {
            self.schedule.cancel(id);
        }
        self.dilation = Some(Dilation::new(
            self.config.dilation_duration,
            self.config.normal_timestep,
            self.config.frozen_timestep,
        ));

        info!("Mission failed: {:?}", cause);
        self.outbox.push(MissionEvent::MissionFailed(cause));

        let due = self.real_clock + self.config.fail_screen_delay;
        self.schedule
            .schedule(Clock::Real, due, Continuation::ShowFailureScreen);
        Ok(())
    }
}

/// Keep the target count in line with the spawned landing sites.
fn sync_target_count(
    added: Query<(), Added<LandingSite>>,
    sites: Query<&LandingSite>,
    mut mission: ResMut<MissionController>,
) {
    if added.is_empty() {
        return;
    }
    mission.set_target_count(sites.iter().count());
}

/// Drive the mission clocks from wall-clock time.
pub(crate) fn tick_mission_clock(time: Res<Time<Real>>, mut mission: ResMut<MissionController>) {
    mission.update(time.delta_secs_f64());
}

/// Feed the ship's tank level into the fuel star.
fn record_fuel_level(
    tanks: Query<&FuelTank, (With<Ship>, Changed<FuelTank>)>,
    mut mission: ResMut<MissionController>,
) {
    for tank in tanks.iter() {
        mission.update_fuel(tank.level());
    }
}

fn handle_fuel_exhausted(
    mut exhausted: MessageReader<FuelExhaustedMessage>,
    mut mission: ResMut<MissionController>,
) {
    for _ in exhausted.read() {
        if let Err(err) = mission.report_fuel_exhausted() {
            debug!("Ignoring fuel exhaustion: {}", err);
        }
    }
}

/// Fan out queued mission events and keep collaborators in step.
///
/// A restart frees wrecked ships so they fly again; placing them back at the
/// start is up to the host.
fn dispatch_mission_events(
    mut commands: Commands,
    wrecks: Query<Entity, (With<Ship>, With<Kinematic>)>,
    mut mission: ResMut<MissionController>,
    mut session: ResMut<LandingSession>,
    mut progress: ResMut<LevelProgress>,
    level: Res<CurrentLevel>,
    mut messages: MessageWriter<MissionMessage>,
) {
    for event in mission.drain_events() {
        match &event {
            MissionEvent::ActiveTargetChanged(index) => session.assign_target(*index),
            MissionEvent::Restarted => {
                session.reset();
                for wreck in wrecks.iter() {
                    commands.entity(wreck).remove::<Kinematic>();
                }
            }
            MissionEvent::MissionFailed(_) => session.clear_target(),
            MissionEvent::MissionCompleted { record, .. } => {
                if let Err(err) = progress.record_completion(level.0, *record) {
                    warn!("Could not save level progress: {}", err);
                }
            }
            _ => {}
        }
        messages.write(MissionMessage(event));
    }
}
