//! Leg-probe ground contact classification.
//!
//! The ship has two landing legs. Each fixed tick a small circle around each
//! foot is tested against the terrain and the pair of results is folded into
//! a [`ContactState`]. Nothing is remembered between ticks.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::terrain::Terrain;
use crate::types::{BodyState, Heading, Ship, SimulationSet};

/// Plugin sampling leg contact for every ship.
pub struct ContactPlugin;

impl Plugin for ContactPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ContactTracker>().add_systems(
            FixedUpdate,
            sample_ship_contact.in_set(SimulationSet::Contact),
        );
    }
}

/// How many legs touch the ground.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContactState {
    #[default]
    None,
    Single,
    Both,
}

impl ContactState {
    /// Fold two leg results into a contact state.
    pub fn from_legs(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, true) => ContactState::Both,
            (true, false) | (false, true) => ContactState::Single,
            (false, false) => ContactState::None,
        }
    }
}

/// Leg geometry in ship-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeConfig {
    pub left_offset: DVec2,
    pub right_offset: DVec2,
    /// Radius of the overlap test around each foot.
    pub radius: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            left_offset: DVec2::new(-0.6, -0.8),
            right_offset: DVec2::new(0.6, -0.8),
            radius: 0.1,
        }
    }
}

impl ProbeConfig {
    fn is_valid(&self) -> bool {
        self.left_offset.is_finite()
            && self.right_offset.is_finite()
            && self.radius.is_finite()
            && self.radius > 0.0
    }
}

/// Stateless classifier for the two leg probes.
#[derive(Resource, Clone, Debug, Default)]
pub struct ContactTracker {
    pub probes: ProbeConfig,
}

impl ContactTracker {
    pub fn new(probes: ProbeConfig) -> Self {
        Self { probes }
    }

    /// Classify two independent probe results.
    pub fn sample(&self, left_grounded: bool, right_grounded: bool) -> ContactState {
        ContactState::from_legs(left_grounded, right_grounded)
    }

    /// World positions of the left and right feet.
    pub fn probe_points(&self, body_pos: DVec2, heading: Heading) -> (DVec2, DVec2) {
        (
            body_pos + heading.rotate(self.probes.left_offset),
            body_pos + heading.rotate(self.probes.right_offset),
        )
    }

    /// Test both feet against the terrain.
    ///
    /// Malformed probe geometry is reported once and counts as not grounded.
    pub fn probe(&self, terrain: &Terrain, body_pos: DVec2, heading: Heading) -> ContactState {
        if !self.probes.is_valid() {
            warn_once!("Leg probe configuration is malformed: {:?}", self.probes);
            return ContactState::None;
        }

        let (left, right) = self.probe_points(body_pos, heading);
        let radius = self.probes.radius;
        self.sample(terrain.overlaps(left, radius), terrain.overlaps(right, radius))
    }
}

/// Write the current contact state onto each ship.
pub(crate) fn sample_ship_contact(
    mut ships: Query<(&BodyState, &Heading, &mut ContactState), With<Ship>>,
    tracker: Res<ContactTracker>,
    terrain: Res<Terrain>,
) {
    for (body, heading, mut contact) in ships.iter_mut() {
        let sampled = tracker.probe(&terrain, body.pos, *heading);
        if *contact != sampled {
            debug!("Contact {:?} -> {:?}", *contact, sampled);
            *contact = sampled;
        }
    }
}
