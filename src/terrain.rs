//! Solid moon surfaces used by leg probes and path obstruction tests.
//!
//! Every moon is a circle in the simulation plane. The [`Terrain`] resource
//! is rebuilt each fixed tick from entities carrying a [`SurfaceRadius`], so
//! surfaces follow their moons if they move.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::types::{BodyState, SimulationSet};

/// Plugin keeping the [`Terrain`] resource in sync with moon entities.
pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Terrain>().add_systems(
            FixedUpdate,
            sync_terrain
                .after(SimulationSet::Gravity)
                .before(SimulationSet::Contact),
        );
    }
}

/// Radius of the solid surface of a body (moon).
#[derive(Component, Clone, Copy, Debug)]
pub struct SurfaceRadius(pub f64);

/// A solid circular surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub center: DVec2,
    pub radius: f64,
}

impl Surface {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether a circle of `radius` around `point` touches this surface.
    #[inline]
    pub fn overlaps(&self, point: DVec2, radius: f64) -> bool {
        let reach = self.radius + radius;
        point.distance_squared(self.center) <= reach * reach
    }

    /// Distance along a unit `direction` from `origin` to the surface.
    ///
    /// Rays starting inside the surface never hit it.
    fn ray_distance(&self, origin: DVec2, direction: DVec2) -> Option<f64> {
        let offset = origin - self.center;
        let c = offset.length_squared() - self.radius * self.radius;
        if c <= 0.0 {
            return None;
        }

        let b = offset.dot(direction);
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let t = -b - discriminant.sqrt();
        (t >= 0.0).then_some(t)
    }
}

/// Collection of every solid surface in the level.
#[derive(Resource, Clone, Debug, Default)]
pub struct Terrain {
    surfaces: Vec<Surface>,
}

impl Terrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, surface: Surface) {
        self.surfaces.push(surface);
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    /// Whether a circle of `radius` around `point` touches any surface.
    pub fn overlaps(&self, point: DVec2, radius: f64) -> bool {
        self.surfaces.iter().any(|s| s.overlaps(point, radius))
    }

    /// Nearest point where a ray hits a surface within `max_distance`.
    ///
    /// `direction` need not be normalized; a zero direction never hits.
    pub fn raycast(&self, origin: DVec2, direction: DVec2, max_distance: f64) -> Option<DVec2> {
        let direction = direction.try_normalize()?;

        self.surfaces
            .iter()
            .filter_map(|s| s.ray_distance(origin, direction))
            .filter(|&t| t <= max_distance)
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| origin + direction * t)
    }
}

/// Anything that can block a straight segment of a predicted path.
///
/// Given the segment's start, direction and length, returns the exact point
/// where it is blocked.
pub trait Obstruction {
    fn obstruct(&self, origin: DVec2, direction: DVec2, distance: f64) -> Option<DVec2>;
}

impl Obstruction for Terrain {
    fn obstruct(&self, origin: DVec2, direction: DVec2, distance: f64) -> Option<DVec2> {
        self.raycast(origin, direction, distance)
    }
}

impl<F> Obstruction for F
where
    F: Fn(DVec2, DVec2, f64) -> Option<DVec2>,
{
    fn obstruct(&self, origin: DVec2, direction: DVec2, distance: f64) -> Option<DVec2> {
        self(origin, direction, distance)
    }
}

/// Rebuild the terrain from moon positions.
fn sync_terrain(bodies: Query<(&BodyState, &SurfaceRadius)>, mut terrain: ResMut<Terrain>) {
    terrain.clear();
    for (body, radius) in bodies.iter() {
        terrain.add_surface(Surface::new(body.pos, radius.0));
    }
}
