//! Property-based tests for the gravity falloff law using proptest.

use bevy::math::DVec2;
use proptest::prelude::*;

use super::gravity::{GravityField, GravitySource};
use super::integrator::semi_implicit_euler;
use crate::test_utils::fixtures;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Points beyond every influence radius feel no pull at all.
    #[test]
    fn prop_zero_outside_influence(
        peak in 0.0f64..50.0,
        radius in 0.5f64..500.0,
        fraction in 0.0f64..=1.0,
        angle in 0.0f64..std::f64::consts::TAU,
        overshoot in 1.0001f64..10.0,
    ) {
        let owner = fixtures::owners(1)[0];
        let mut field = GravityField::new();
        field.add_source(GravitySource::new(owner, peak, radius, fraction));

        let center = DVec2::new(12.0, -7.0);
        let point = center + DVec2::from_angle(angle) * radius * overshoot;
        let acc = field.sample_acceleration(point, |_| Some(center));

        prop_assert_eq!(acc, DVec2::ZERO);
    }

    /// Magnitude stays within [0, peak] everywhere inside the radius.
    #[test]
    fn prop_magnitude_bounded_by_peak(
        peak in 0.0f64..50.0,
        radius in 0.5f64..500.0,
        fraction in 0.0f64..=1.0,
        t in 0.0f64..=1.0,
    ) {
        let owner = fixtures::owners(1)[0];
        let source = GravitySource::new(owner, peak, radius, fraction);
        let magnitude = source.magnitude_at(radius * t);

        prop_assert!(magnitude >= -1e-9, "negative magnitude {}", magnitude);
        prop_assert!(magnitude <= peak + 1e-9, "magnitude {} above peak {}", magnitude, peak);
    }

    /// The peak distance always yields exactly the peak acceleration.
    #[test]
    fn prop_peak_at_peak_distance(
        peak in 0.0f64..50.0,
        radius in 0.5f64..500.0,
        fraction in 0.01f64..0.99,
    ) {
        let owner = fixtures::owners(1)[0];
        let source = GravitySource::new(owner, peak, radius, fraction);
        let magnitude = source.magnitude_at(source.peak_distance());

        prop_assert!((magnitude - peak).abs() <= 1e-9 * peak.max(1.0));
    }

    /// Rising ramp is monotonic up to the peak, falling ramp beyond it.
    #[test]
    fn prop_ramps_are_monotonic(
        radius in 1.0f64..500.0,
        fraction in 0.05f64..0.95,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let owner = fixtures::owners(1)[0];
        let source = GravitySource::new(owner, 3.0, radius, fraction);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let peak_distance = source.peak_distance();
        let rising = (source.magnitude_at(peak_distance * lo), source.magnitude_at(peak_distance * hi));
        prop_assert!(rising.0 <= rising.1 + 1e-12);

        let span = radius - peak_distance;
        let falling = (
            source.magnitude_at(peak_distance + span * lo),
            source.magnitude_at(peak_distance + span * hi),
        );
        prop_assert!(falling.0 + 1e-12 >= falling.1);
    }

    /// Without acceleration the integrator moves in a straight line.
    #[test]
    fn prop_free_flight_is_linear(
        vx in -100.0f64..100.0,
        vy in -100.0f64..100.0,
        dt in 0.001f64..0.5,
        steps in 1usize..200,
    ) {
        let vel = DVec2::new(vx, vy);
        let mut pos = DVec2::ZERO;
        let mut v = vel;
        for _ in 0..steps {
            (pos, v) = semi_implicit_euler(pos, v, DVec2::ZERO, dt);
        }

        let expected = vel * dt * steps as f64;
        prop_assert!((pos - expected).length() <= 1e-6 * expected.length().max(1.0));
        prop_assert_eq!(v, vel);
    }
}
