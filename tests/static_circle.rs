//! spec.md §8 scenario 1: a single non-dynamic object on a static circular
//! orbit around the root.

use nalgebra::Vector3;
use orbital_physics::{Context, OrbitType, Validity};

#[test]
fn static_circular_orbit_matches_expected_speed_and_period() {
    let mut ctx = Context::new();
    ctx.set_root_space_scaling(10.0);
    ctx.get_root_object().set_mass(&mut ctx, 1.0 / orbital_physics::consts::G_GRAVITATIONAL);

    let root = ctx.get_root_local_space();
    let position = Vector3::new(0.9f32, 0.0, 0.0);
    let obj = ctx.create_circular(root, 1.0e5, position, false);

    assert_eq!(obj.object(&ctx).validity, Validity::Valid);
    assert_eq!(obj.elements(&ctx).orbit_type, OrbitType::Circle);

    let mu = orbital_physics::consts::G_GRAVITATIONAL * (1.0 / orbital_physics::consts::G_GRAVITATIONAL) * 10f64.powi(-3);
    let r = position.norm() as f64;
    let expected_speed = (mu / r).sqrt();
    let expected_period = std::f64::consts::TAU * r / expected_speed;

    let speed = obj.object(&ctx).state.velocity.norm();
    assert!((speed - expected_speed).abs() < 1e-9, "speed {speed} != expected {expected_speed}");
    assert!(
        (obj.elements(&ctx).period - expected_period).abs() < 1e-6,
        "period {} != expected {}",
        obj.elements(&ctx).period,
        expected_period
    );
}
