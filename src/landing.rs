//! Landing session: dwell-time tracking and landing quality inputs.
//!
//! A landing is credited once the ship has rested on both legs, slowly
//! enough, within range of the active landing site for a continuous
//! `landing_duration`. Partial contact bleeds the dwell timer off quickly
//! instead of resetting it, so a brief wobble does not throw away progress.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::collision::ImpactMessage;
use crate::contact::ContactState;
use crate::mission::MissionController;
use crate::types::{BodyState, Kinematic, Ship, SimulationSet};

/// Plugin running the landing session on the fixed tick.
pub struct LandingPlugin;

impl Plugin for LandingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LandingSession>().add_systems(
            FixedUpdate,
            (handle_impacts, update_landing_session)
                .chain()
                .in_set(SimulationSet::Landing),
        );
    }
}

/// Landing and crash thresholds.
#[derive(Clone, Debug, PartialEq)]
pub struct LandingConfig {
    /// Continuous dwell needed to credit a landing (seconds).
    pub landing_duration: f64,
    /// Speed ceiling for "slow enough" to count towards the dwell.
    pub max_landing_speed: f64,
    /// How much faster than real time the dwell timer decays.
    pub decay_multiplier: f64,
    /// Floor kept by a decaying timer under partial contact.
    pub partial_contact_floor: f64,
    /// Maximum distance to the landing site.
    pub landing_range: f64,
    /// Impacts faster than this destroy the ship.
    pub crash_speed: f64,
    /// Impacts faster than this are loud enough to play a sound.
    pub audible_impact_speed: f64,
    /// Impact speed reported when no impact was recorded.
    pub fallback_impact_speed: f64,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            landing_duration: 1.0,
            max_landing_speed: 0.5,
            decay_multiplier: 5.0,
            partial_contact_floor: 0.01,
            landing_range: 7.0,
            crash_speed: 5.0,
            audible_impact_speed: 0.4,
            fallback_impact_speed: 0.0,
        }
    }
}

/// Inputs for grading a landing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingQuality {
    /// Relative speed of the first impact near the site.
    pub impact_speed: f64,
    /// Total contact time, partial contact included.
    pub duration: f64,
}

/// Classification of a single collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImpactOutcome {
    /// Above the crash threshold; the session is abandoned.
    Crashed,
    /// Survivable but loud.
    Audible,
    Soft,
}

/// A landing site the ship can be sent to.
#[derive(Component, Clone, Copy, Debug)]
pub struct LandingSite {
    /// Position of this site in the mission's target order.
    pub order: usize,
    pub position: DVec2,
}

/// Dwell bookkeeping for the current landing target.
#[derive(Resource, Clone, Debug)]
pub struct LandingSession {
    config: LandingConfig,
    target: Option<usize>,
    dwell: f64,
    total_elapsed: f64,
    impact_speed: Option<f64>,
    abandoned: bool,
}

impl Default for LandingSession {
    fn default() -> Self {
        Self::new(LandingConfig::default())
    }
}

impl LandingSession {
    pub fn new(config: LandingConfig) -> Self {
        Self {
            config,
            target: None,
            dwell: 0.0,
            total_elapsed: 0.0,
            impact_speed: None,
            abandoned: false,
        }
    }

    pub fn config(&self) -> &LandingConfig {
        &self.config
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn dwell(&self) -> f64 {
        self.dwell
    }

    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    /// First qualifying impact speed since the last reset, if any.
    pub fn impact_speed(&self) -> Option<f64> {
        self.impact_speed
    }

    /// Whether a crash ended this session.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Whether the dwell timer is running (a landing has started).
    pub fn is_charging(&self) -> bool {
        self.dwell > 0.0
    }

    /// Dwell progress towards a landing, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.config.landing_duration > 0.0 {
            (self.dwell / self.config.landing_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Point the session at a new target and forget any partial progress.
    pub fn assign_target(&mut self, index: usize) {
        debug!("Landing session targeting site {}", index);
        self.target = Some(index);
        self.clear_progress();
    }

    /// Stop counting towards any target.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Return to a fresh session with no target (mission restart).
    pub fn reset(&mut self) {
        self.target = None;
        self.abandoned = false;
        self.clear_progress();
    }

    /// Whether `ship` is close enough to `site` to land there.
    pub fn in_landing_range(&self, ship: DVec2, site: DVec2) -> bool {
        ship.distance(site) <= self.config.landing_range
    }

    fn clear_progress(&mut self) {
        self.dwell = 0.0;
        self.total_elapsed = 0.0;
        self.impact_speed = None;
    }

    fn decay(&self, dt: f64) -> f64 {
        self.dwell - dt * self.config.decay_multiplier
    }

    /// Advance the session by one tick.
    ///
    /// Returns the landing quality when this tick completes a landing. The
    /// session then forgets its target until [`LandingSession::assign_target`]
    /// is called again. Without a target the ship is never in range.
    pub fn step(
        &mut self,
        contact: ContactState,
        speed: f64,
        in_range: bool,
        dt: f64,
    ) -> Option<LandingQuality> {
        if self.abandoned || !(dt > 0.0 && dt.is_finite()) {
            return None;
        }

        if !in_range || self.target.is_none() || contact == ContactState::None {
            self.dwell = self.decay(dt).max(0.0);
            self.total_elapsed = 0.0;
            if self.dwell == 0.0 {
                self.impact_speed = None;
            }
            return None;
        }

        if contact == ContactState::Both && speed <= self.config.max_landing_speed {
            self.dwell += dt;
            self.total_elapsed += dt;

            if self.dwell >= self.config.landing_duration {
                let quality = LandingQuality {
                    impact_speed: self.impact_speed.unwrap_or(self.config.fallback_impact_speed),
                    duration: self.total_elapsed,
                };
                info!(
                    "Landed on site {:?}: impact {:.2}, duration {:.2}s",
                    self.target, quality.impact_speed, quality.duration
                );
                self.clear_progress();
                self.target = None;
                return Some(quality);
            }
            return None;
        }

        // Partial contact or too fast: keep counting contact time, bleed the dwell
        self.total_elapsed += dt;
        if self.dwell > 0.0 {
            let floor = self.config.partial_contact_floor.min(self.dwell);
            self.dwell = self.decay(dt).max(floor);
        }
        None
    }

    /// Classify a collision and record the first qualifying impact speed.
    ///
    /// Crashes abandon the session regardless of contact; later collisions
    /// are ignored for bookkeeping.
    pub fn report_collision(&mut self, relative_speed: f64, in_range: bool) -> ImpactOutcome {
        if self.abandoned {
            return ImpactOutcome::Soft;
        }

        if relative_speed > self.config.crash_speed {
            info!("Crashed at {:.2} (threshold {:.2})", relative_speed, self.config.crash_speed);
            self.abandoned = true;
            return ImpactOutcome::Crashed;
        }

        if in_range && self.target.is_some() && self.impact_speed.is_none() {
            debug!("Recorded impact speed {:.3}", relative_speed);
            self.impact_speed = Some(relative_speed);
        }

        if relative_speed > self.config.audible_impact_speed {
            ImpactOutcome::Audible
        } else {
            ImpactOutcome::Soft
        }
    }
}

/// Position of the site the session is currently aiming for.
fn target_site(session: &LandingSession, sites: &Query<&LandingSite>) -> Option<DVec2> {
    let target = session.target()?;
    sites
        .iter()
        .find(|site| site.order == target)
        .map(|site| site.position)
}

/// Feed collisions into the session; a crash fails the mission.
fn handle_impacts(
    mut commands: Commands,
    mut impacts: MessageReader<ImpactMessage>,
    ships: Query<&BodyState, With<Ship>>,
    sites: Query<&LandingSite>,
    mut session: ResMut<LandingSession>,
    mut mission: ResMut<MissionController>,
) {
    for impact in impacts.read() {
        let Ok(ship) = ships.get(impact.entity) else {
            continue;
        };

        let in_range = target_site(&session, &sites)
            .is_some_and(|site| session.in_landing_range(ship.pos, site));

        match session.report_collision(impact.relative_speed, in_range) {
            ImpactOutcome::Crashed => {
                commands.entity(impact.entity).insert(Kinematic);
                if let Err(err) = mission.report_crash() {
                    warn!("Ignoring crash: {}", err);
                }
            }
            ImpactOutcome::Audible => {
                debug!("Audible impact at {:.2}", impact.relative_speed);
            }
            ImpactOutcome::Soft => {}
        }
    }
}

/// Advance the dwell timer from the ship's contact and speed.
fn update_landing_session(
    ships: Query<(&BodyState, &ContactState), (With<Ship>, Without<Kinematic>)>,
    sites: Query<&LandingSite>,
    mut session: ResMut<LandingSession>,
    mut mission: ResMut<MissionController>,
    time: Res<Time>,
) {
    let dt = time.delta_secs_f64();

    for (body, contact) in ships.iter() {
        let in_range = target_site(&session, &sites)
            .is_some_and(|site| session.in_landing_range(body.pos, site));

        if let Some(quality) = session.step(*contact, body.speed(), in_range, dt)
            && let Err(err) = mission.landed(quality)
        {
            warn!("Landing not credited: {}", err);
        }
    }
}
