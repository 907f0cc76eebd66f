//! Core simulation types shared by the physics, landing and mission layers.

use bevy::math::DVec2;
use bevy::prelude::*;

/// System set for ordering the fixed-tick simulation.
///
/// Gravity must be applied before legs are probed, and the landing session
/// must have reported before the mission controller consumes its output.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Gravity field sampling and live body integration.
    Gravity,
    /// Leg probe sampling.
    Contact,
    /// Landing session dwell tracking and impact handling.
    Landing,
    /// Mission state updates and notification fan-out.
    Mission,
}

/// Fixed simulation step used by the game at normal speed (seconds).
pub const DEFAULT_FIXED_TIMESTEP: f64 = 0.02;

/// Physical state of a simulated body.
///
/// The simulation is 2.5D: everything happens on the XY plane, so positions
/// and velocities are 2D.
#[derive(Component, Clone, Debug, Default)]
pub struct BodyState {
    /// Position in world units.
    pub pos: DVec2,
    /// Velocity in world units per second.
    pub vel: DVec2,
    /// Mass (arbitrary units, must be positive for integration).
    pub mass: f64,
}

impl BodyState {
    /// Create a new body state
    pub fn new(pos: DVec2, vel: DVec2, mass: f64) -> Self {
        Self { pos, vel, mass }
    }

    /// Linear speed (magnitude of velocity).
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }
}

/// Rotation of a body around the Z axis, in radians.
///
/// Zero means the body's local "up" points along +Y.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Heading(pub f64);

impl Heading {
    /// Unit vector pointing out of the top of the body.
    pub fn up(&self) -> DVec2 {
        DVec2::from_angle(self.0).rotate(DVec2::Y)
    }

    /// Rotate a body-local offset into world orientation.
    pub fn rotate(&self, local: DVec2) -> DVec2 {
        DVec2::from_angle(self.0).rotate(local)
    }
}

/// Marker for the player's lander.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Ship;

/// Marker for bodies that are pulled by the gravity field.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct GravityAffected;

/// Marker for bodies excluded from integration (e.g. a wrecked ship).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Kinematic;
