//! Moonhopper - headless demo
//!
//! Drops a lander above a single moon, lets a simple autopilot hold the
//! descent rate, and exits once the mission is decided.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::math::DVec2;
use bevy::prelude::*;

use moonhopper::MoonhopperPlugin;
use moonhopper::collision::Hull;
use moonhopper::contact::ContactState;
use moonhopper::fuel::{FuelTank, Thruster};
use moonhopper::landing::LandingSite;
use moonhopper::mission::{MissionEvent, MissionMessage};
use moonhopper::physics::GravityWell;
use moonhopper::terrain::SurfaceRadius;
use moonhopper::types::{BodyState, GravityAffected, Heading, Ship};

/// Descent rate the autopilot holds.
const TARGET_DESCENT: f64 = 0.4;

/// Give up after this many frames.
const MAX_FRAMES: u32 = 60 * 60;

fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
            LogPlugin::default(),
        ))
        .add_plugins(MoonhopperPlugin)
        .add_systems(Startup, spawn_level)
        .add_systems(Update, (autopilot, exit_when_decided))
        .run();
}

fn spawn_level(mut commands: Commands) {
    commands.spawn((
        BodyState::new(DVec2::ZERO, DVec2::ZERO, 1.0),
        GravityWell::default(),
        SurfaceRadius(10.0),
    ));

    commands.spawn(LandingSite {
        order: 0,
        position: DVec2::new(0.0, 10.0),
    });

    commands.spawn((
        Ship,
        GravityAffected,
        BodyState::new(DVec2::new(0.0, 16.0), DVec2::ZERO, 1.0),
        Heading::default(),
        ContactState::default(),
        Hull::default(),
        FuelTank::default(),
        Thruster::default(),
    ));
}

/// Fire the engine whenever the ship falls faster than the target rate.
fn autopilot(mut ships: Query<(&BodyState, &mut Thruster), With<Ship>>) {
    for (body, mut thruster) in ships.iter_mut() {
        thruster.throttle = if body.vel.y < -TARGET_DESCENT { 1.0 } else { 0.0 };
    }
}

fn exit_when_decided(
    mut messages: MessageReader<MissionMessage>,
    mut exit: MessageWriter<AppExit>,
    mut frames: Local<u32>,
) {
    *frames += 1;

    for MissionMessage(event) in messages.read() {
        match event {
            MissionEvent::ResultsReady(record) => {
                info!("Results: {} stars ({:?})", record.count(), record);
                exit.write(AppExit::Success);
            }
            MissionEvent::FailureScreenReady => {
                info!("Mission failed");
                exit.write(AppExit::error());
            }
            _ => {}
        }
    }

    if *frames >= MAX_FRAMES {
        warn!("Mission undecided after {} frames", MAX_FRAMES);
        exit.write(AppExit::error());
    }
}
