//! Shared scenario setup for the integration tests in `tests/`. Not itself a
//! test binary: Cargo only discovers `tests/*.rs` directly, not this
//! subdirectory's contents.

use nalgebra::Vector3;
use orbital_physics::{Context, ObjectHandle};

/// Builds the two-body hierarchy from spec.md §8 scenarios 1-2: root mass
/// `1/G`, object #1 on a circular orbit at `(0.9, 0, 0)`, and a dynamic ship
/// inside object #1's sphere of influence.
pub fn build_hierarchy() -> (Context, ObjectHandle, ObjectHandle) {
    let mut ctx = Context::new();
    ctx.set_root_space_scaling(10.0);
    ctx.get_root_object().set_mass(&mut ctx, 1.0 / orbital_physics::consts::G_GRAVITATIONAL);

    let root = ctx.get_root_local_space();
    let obj1 = ctx.create_circular(root, 1.0e5, Vector3::new(0.9, 0.0, 0.0), false);

    let soi = obj1.sphere_of_influence(&ctx);
    assert!(!soi.is_null(), "object #1 should have gained a sphere of influence");

    let ship = ctx.create(
        soi,
        1.0e-11,
        Vector3::new(-0.7, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 0.21),
        true,
    );

    (ctx, obj1, ship)
}
