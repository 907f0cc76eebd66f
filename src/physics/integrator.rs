//! Semi-implicit (symplectic) Euler integration.
//!
//! Both the live bodies and the trajectory predictor advance with this
//! scheme so that a forecast follows the same numerical path the ship will
//! actually take.

use bevy::math::DVec2;

/// Advance a position/velocity pair by one step.
///
/// Velocity is updated first and the *new* velocity moves the position:
///
///   v' = v + a·dt
///   x' = x + v'·dt
///
/// Returns `(new_pos, new_vel)`.
#[inline]
pub fn semi_implicit_euler(pos: DVec2, vel: DVec2, acc: DVec2, dt: f64) -> (DVec2, DVec2) {
    let vel_new = vel + acc * dt;
    let pos_new = pos + vel_new * dt;
    (pos_new, vel_new)
}

/// Acceleration of a body of `mass` under a field acceleration.
///
/// Live bodies and predictions both go through this, so a heavy ship feels
/// a weaker pull in both. Non-positive mass yields no acceleration.
#[inline]
pub fn acceleration_for_mass(field_acc: DVec2, mass: f64) -> DVec2 {
    if mass > 0.0 && mass.is_finite() {
        field_acc / mass
    } else {
        DVec2::ZERO
    }
}
