//! Integration tests for the live integrator against the path predictor.

mod common;

use approx::assert_relative_eq;
use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use moonhopper::physics::{GravityField, GravitySource, GravityWell, PhysicsPlugin};
use moonhopper::prediction::{SimBody, predict_path};
use moonhopper::types::{BodyState, GravityAffected, SimulationSet};

#[derive(Resource, Default)]
struct TickCount(usize);

fn count_ticks(mut ticks: ResMut<TickCount>) {
    ticks.0 += 1;
}

fn never(_: DVec2, _: DVec2, _: f64) -> Option<DVec2> {
    None
}

fn physics_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(PhysicsPlugin)
        .insert_resource(Time::<Fixed>::from_seconds(0.02))
        .insert_resource(TimeUpdateStrategy::ManualDuration(common::FRAME))
        .init_resource::<TickCount>()
        .add_systems(FixedUpdate, count_ticks.after(SimulationSet::Gravity));
    app
}

/// Run frames until `ticks` fixed ticks have run since the app started.
fn run_ticks(app: &mut App, ticks: usize) {
    let ran = common::run_until(app, ticks * 2 + 2, |world| world.resource::<TickCount>().0 >= ticks);
    assert!(ran.is_some(), "app should reach {ticks} fixed ticks");
    assert_eq!(app.world().resource::<TickCount>().0, ticks);
}

fn spawn_well(app: &mut App, pos: DVec2) -> Entity {
    app.world_mut()
        .spawn((BodyState::new(pos, DVec2::ZERO, 1.0), GravityWell::default()))
        .id()
}

fn spawn_body(app: &mut App, pos: DVec2, vel: DVec2, mass: f64) -> Entity {
    app.world_mut()
        .spawn((GravityAffected, BodyState::new(pos, vel, mass)))
        .id()
}

/// Field mirroring default wells owned by `owners`.
fn field_for(owners: &[Entity]) -> GravityField {
    let well = GravityWell::default();
    let mut field = GravityField::new();
    for owner in owners {
        field.add_source(GravitySource::new(
            *owner,
            well.peak_acceleration,
            well.influence_radius,
            well.peak_fraction,
        ));
    }
    field
}

#[test]
fn test_live_motion_matches_prediction() {
    let mut app = physics_app();
    let moon_pos = DVec2::ZERO;
    let moon = spawn_well(&mut app, moon_pos);
    let start = SimBody {
        pos: DVec2::new(30.0, 0.0),
        vel: DVec2::new(0.0, 5.0),
        mass: 1.0,
    };
    let ship = spawn_body(&mut app, start.pos, start.vel, start.mass);

    let ticks = 60;
    run_ticks(&mut app, ticks);

    let field = field_for(&[moon]);
    let predicted = predict_path(
        &field,
        |owner| (owner == moon).then_some(moon_pos),
        start,
        0.02,
        ticks + 1,
        &never,
    );
    assert_eq!(predicted.len(), ticks + 1);

    let live = app.world().get::<BodyState>(ship).expect("ship state");
    let forecast = predicted.end().expect("non-empty forecast");
    assert_relative_eq!(live.pos.x, forecast.x, epsilon = 1e-9);
    assert_relative_eq!(live.pos.y, forecast.y, epsilon = 1e-9);
}

#[test]
fn test_two_wells_superpose() {
    let mut app = physics_app();
    let left_pos = DVec2::new(-20.0, 0.0);
    let right_pos = DVec2::new(20.0, 0.0);
    let left = spawn_well(&mut app, left_pos);
    let right = spawn_well(&mut app, right_pos);

    // Midpoint: equal and opposite pulls cancel
    let balanced = spawn_body(&mut app, DVec2::ZERO, DVec2::ZERO, 1.0);
    // Off-axis: the horizontal pulls cancel, the vertical ones add
    let above = spawn_body(&mut app, DVec2::new(0.0, 10.0), DVec2::ZERO, 1.0);

    run_ticks(&mut app, 20);

    let world = app.world();
    let balanced = world.get::<BodyState>(balanced).expect("body state");
    assert_relative_eq!(balanced.pos.length(), 0.0, epsilon = 1e-12);

    let above = world.get::<BodyState>(above).expect("body state");
    assert_relative_eq!(above.pos.x, 0.0, epsilon = 1e-12);
    assert!(above.pos.y < 10.0, "body should fall towards the wells' axis");

    let field = field_for(&[left, right]);
    let position_of = |owner| {
        if owner == left {
            Some(left_pos)
        } else if owner == right {
            Some(right_pos)
        } else {
            None
        }
    };
    let single = field
        .get(left)
        .expect("left source")
        .acceleration_at(left_pos, DVec2::new(0.0, 10.0));
    let combined = field.sample_acceleration(DVec2::new(0.0, 10.0), position_of);
    assert_relative_eq!(combined.y, 2.0 * single.y, epsilon = 1e-12);
}

#[test]
fn test_heavier_body_accelerates_less() {
    let mut app = physics_app();
    spawn_well(&mut app, DVec2::ZERO);
    let light = spawn_body(&mut app, DVec2::new(0.0, 25.0), DVec2::ZERO, 1.0);
    let heavy = spawn_body(&mut app, DVec2::new(0.0, -25.0), DVec2::ZERO, 4.0);

    run_ticks(&mut app, 1);

    let world = app.world();
    let light_vel = world.get::<BodyState>(light).expect("body state").vel;
    let heavy_vel = world.get::<BodyState>(heavy).expect("body state").vel;
    assert!(light_vel.y < 0.0 && heavy_vel.y > 0.0);
    assert_relative_eq!(-light_vel.y, 4.0 * heavy_vel.y, max_relative = 1e-12);
}

#[test]
fn test_removed_well_stops_pulling() {
    let mut app = physics_app();
    let moon = spawn_well(&mut app, DVec2::ZERO);
    let ship = spawn_body(&mut app, DVec2::new(0.0, 20.0), DVec2::ZERO, 1.0);

    run_ticks(&mut app, 5);
    assert_eq!(app.world().resource::<GravityField>().len(), 1);

    app.world_mut().entity_mut(moon).remove::<GravityWell>();
    run_ticks(&mut app, 6);
    assert!(app.world().resource::<GravityField>().is_empty());

    let vel = app.world().get::<BodyState>(ship).expect("ship state").vel;
    run_ticks(&mut app, 16);
    let after = app.world().get::<BodyState>(ship).expect("ship state").vel;
    assert_eq!(vel, after);
}
