//! Ship thrust and fuel.
//!
//! Thrust pushes the ship along its heading while the tank has fuel. Once
//! the tank is empty, a grace timer runs; if it expires before the tank is
//! refilled, a [`FuelExhaustedMessage`] is sent and the mission fails.

use bevy::prelude::*;

use crate::physics::{acceleration_for_mass, integrate_bodies};
use crate::types::{BodyState, Heading, Kinematic, SimulationSet};

/// Plugin applying thrust and tracking fuel.
pub struct FuelPlugin;

impl Plugin for FuelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FuelConfig>()
            .add_message::<FuelExhaustedMessage>()
            .add_systems(
                FixedUpdate,
                apply_thrust
                    .in_set(SimulationSet::Gravity)
                    .before(integrate_bodies),
            );
    }
}

/// Message sent when a ship has been out of fuel for the full grace period.
#[derive(Message, Clone, Debug)]
pub struct FuelExhaustedMessage {
    pub entity: Entity,
}

/// Tank and engine defaults for new ships.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct FuelConfig {
    pub capacity: f64,
    /// Fuel burned per second of thrust.
    pub consumption_rate: f64,
    /// Seconds the ship may drift with an empty tank.
    pub grace_period: f64,
    /// Engine force at full throttle.
    pub thrust_force: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            capacity: 100.0,
            consumption_rate: 0.1,
            grace_period: 5.0,
            thrust_force: 10.0,
        }
    }
}

/// Fuel carried by a ship.
#[derive(Component, Clone, Debug)]
pub struct FuelTank {
    level: f64,
    capacity: f64,
    consumption_rate: f64,
    grace_period: f64,
    time_without_fuel: f64,
    exhausted: bool,
}

impl Default for FuelTank {
    fn default() -> Self {
        Self::full(&FuelConfig::default())
    }
}

impl FuelTank {
    /// A full tank sized by `config`.
    pub fn full(config: &FuelConfig) -> Self {
        Self {
            level: config.capacity,
            capacity: config.capacity,
            consumption_rate: config.consumption_rate,
            grace_period: config.grace_period,
            time_without_fuel: 0.0,
            exhausted: false,
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Remaining fuel as a fraction of capacity.
    pub fn fraction(&self) -> f64 {
        if self.capacity > 0.0 {
            (self.level / self.capacity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn has_fuel(&self) -> bool {
        self.level > 0.0
    }

    pub fn time_without_fuel(&self) -> f64 {
        self.time_without_fuel
    }

    /// Burn fuel for `dt` seconds of thrust. Any positive throttle burns at
    /// the full rate. Returns whether the engine could fire.
    pub fn burn(&mut self, throttle: f64, dt: f64) -> bool {
        if throttle <= 0.0 || !self.has_fuel() {
            return false;
        }
        self.level = (self.level - self.consumption_rate * dt).max(0.0);
        true
    }

    /// Add fuel, up to capacity. Clears the empty-tank timer.
    pub fn refuel(&mut self, amount: f64) {
        self.level = (self.level + amount.max(0.0)).min(self.capacity);
        if self.has_fuel() {
            self.time_without_fuel = 0.0;
            self.exhausted = false;
        }
    }

    /// Advance the empty-tank timer.
    ///
    /// Returns true exactly once, on the tick the grace period runs out.
    pub fn update(&mut self, dt: f64) -> bool {
        if self.has_fuel() {
            self.time_without_fuel = 0.0;
            self.exhausted = false;
            return false;
        }

        self.time_without_fuel += dt;
        if self.time_without_fuel >= self.grace_period && !self.exhausted {
            self.exhausted = true;
            return true;
        }
        false
    }
}

/// Throttle input set by the external input layer, in [0, 1].
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Thruster {
    pub throttle: f64,
}

/// Push ships along their heading and burn fuel.
fn apply_thrust(
    mut ships: Query<(Entity, &mut BodyState, &Heading, &Thruster, &mut FuelTank), Without<Kinematic>>,
    config: Res<FuelConfig>,
    time: Res<Time>,
    mut exhausted: MessageWriter<FuelExhaustedMessage>,
) {
    let dt = time.delta_secs_f64();
    if dt <= 0.0 {
        return;
    }

    for (entity, mut body, heading, thruster, mut tank) in ships.iter_mut() {
        let throttle = thruster.throttle.clamp(0.0, 1.0);
        if tank.burn(throttle, dt) {
            let force = heading.up() * config.thrust_force * throttle;
            let acc = acceleration_for_mass(force, body.mass);
            body.vel += acc * dt;
        }

        if tank.update(dt) {
            warn!("{:?} has been out of fuel for {:.1}s", entity, tank.time_without_fuel());
            exhausted.write(FuelExhaustedMessage { entity });
        }
    }
}
