//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use moonhopper::MoonhopperPlugin;
use moonhopper::collision::Hull;
use moonhopper::contact::ContactState;
use moonhopper::fuel::{FuelTank, Thruster};
use moonhopper::landing::LandingSite;
use moonhopper::mission::{MissionEvent, MissionMessage};
use moonhopper::physics::{GravityField, GravitySource, GravityWell};
use moonhopper::terrain::SurfaceRadius;
use moonhopper::types::{BodyState, GravityAffected, Heading, Ship};

/// Frame length used by headless apps.
pub const FRAME: Duration = Duration::from_millis(20);

/// Radius of the test moon's surface.
pub const MOON_RADIUS: f64 = 10.0;

/// Height of an upright ship's center when resting on the test moon.
pub const RESTING_HEIGHT: f64 = MOON_RADIUS + 0.85;

/// Distinct entity handles for gravity sources that live outside an app.
pub fn owners(n: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..n).map(|_| world.spawn_empty().id()).collect()
}

/// A field with one source (peak 2, radius 100, fraction 0.4) at the origin.
pub fn single_source_field() -> (GravityField, Entity) {
    let owner = owners(1)[0];
    let mut field = GravityField::new();
    field.add_source(GravitySource::new(owner, 2.0, 100.0, 0.4));
    (field, owner)
}

/// Mission notifications seen by the test app, in order.
#[derive(Resource, Default)]
pub struct MissionLog(pub Vec<MissionEvent>);

impl MissionLog {
    pub fn contains(&self, event: &MissionEvent) -> bool {
        self.0.contains(event)
    }
}

fn record_mission_messages(mut messages: MessageReader<MissionMessage>, mut log: ResMut<MissionLog>) {
    log.0.extend(messages.read().map(|m| m.0.clone()));
}

/// Headless app with every simulation plugin and a fixed frame length.
pub fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(MoonhopperPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .init_resource::<MissionLog>()
        .add_systems(Last, record_mission_messages);
    app
}

/// Spawn a moon with the default well at `pos`.
pub fn spawn_moon(app: &mut App, pos: DVec2) -> Entity {
    app.world_mut()
        .spawn((
            BodyState::new(pos, DVec2::ZERO, 1.0),
            GravityWell::default(),
            SurfaceRadius(MOON_RADIUS),
        ))
        .id()
}

/// Spawn a landing site.
pub fn spawn_site(app: &mut App, order: usize, position: DVec2) -> Entity {
    app.world_mut().spawn(LandingSite { order, position }).id()
}

/// Spawn an upright ship.
pub fn spawn_ship(app: &mut App, pos: DVec2, vel: DVec2) -> Entity {
    app.world_mut()
        .spawn((
            Ship,
            GravityAffected,
            BodyState::new(pos, vel, 1.0),
            Heading::default(),
            ContactState::default(),
            Hull::default(),
            FuelTank::default(),
            Thruster::default(),
        ))
        .id()
}

/// Run `n` frames.
pub fn run_frames(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}

/// Run frames until `done` holds, up to `max` frames. Returns the number of
/// frames run, or `None` if the condition never held.
pub fn run_until(app: &mut App, max: usize, mut done: impl FnMut(&World) -> bool) -> Option<usize> {
    for frame in 1..=max {
        app.update();
        if done(app.world()) {
            return Some(frame);
        }
    }
    None
}
