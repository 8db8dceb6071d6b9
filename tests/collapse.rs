//! spec.md §8 scenario 5: collapsing a local space promotes every object it
//! hosts into the next-higher local space, preserving absolute position and
//! velocity, and removes the collapsed node from the tree.

mod common;

use nalgebra::Vector3;
use orbital_physics::Validity;

#[test]
fn collapsing_a_local_space_promotes_its_objects_with_absolute_state_preserved() {
    let (mut ctx, _obj1, ship) = common::build_hierarchy();

    let satellite_frame = ship.add_default_local_space(&mut ctx);
    let frame_radius = satellite_frame.local_space(&ctx).radius;

    let probe_position = Vector3::new(0.05f32, 0.0, 0.0);
    let probe_velocity = Vector3::new(0.0, 0.0, 0.05);
    let probe = ctx.create(satellite_frame, 1.0, probe_position, probe_velocity, false);
    assert_eq!(probe.object(&ctx).validity, Validity::Valid);
    assert_eq!(probe.parent_lsp(&ctx), satellite_frame);

    let ship_position = ship.object(&ctx).state.position;
    let ship_velocity = ship.object(&ctx).state.velocity;

    ctx.collapse_local_space(satellite_frame);

    assert!(!ctx.has(satellite_frame.id()), "collapsed local space should be removed from the tree");
    assert_eq!(probe.parent_lsp(&ctx), ship.parent_lsp(&ctx), "probe should be promoted beside the ship");
    assert_eq!(probe.object(&ctx).validity, Validity::Valid);

    let expected_position = probe_position * frame_radius + ship_position;
    let expected_velocity = probe_velocity.cast::<f64>() * frame_radius as f64 + ship_velocity;
    let actual_position = probe.object(&ctx).state.position;
    let actual_velocity = probe.object(&ctx).state.velocity;

    assert!(
        (actual_position - expected_position).norm() < 1e-6,
        "position {actual_position:?} != expected {expected_position:?}"
    );
    assert!(
        (actual_velocity - expected_velocity).norm() < 1e-9,
        "velocity {actual_velocity:?} != expected {expected_velocity:?}"
    );
}
