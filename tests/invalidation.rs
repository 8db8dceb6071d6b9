//! spec.md §8 scenario 4: zeroing an object's mass invalidates it and pulls
//! it out of the update queue, so [`orbital_physics::Context::on_update`]
//! no longer advances it.

use nalgebra::Vector3;
use orbital_physics::{Context, Validity};

#[test]
fn zero_mass_invalidates_object_and_freezes_it_in_the_update_queue() {
    let mut ctx = Context::new();
    ctx.set_root_space_scaling(10.0);
    ctx.get_root_object().set_mass(&mut ctx, 1.0 / orbital_physics::consts::G_GRAVITATIONAL);

    let root = ctx.get_root_local_space();
    let obj = ctx.create_circular(root, 1.0e5, Vector3::new(0.9, 0.0, 0.0), false);
    assert_eq!(obj.object(&ctx).validity, Validity::Valid);

    obj.set_mass(&mut ctx, 0.0);
    assert_eq!(obj.object(&ctx).validity, Validity::InvalidMass);

    let frozen_position = obj.object(&ctx).state.position;
    let frozen_velocity = obj.object(&ctx).state.velocity;

    for _ in 0..100 {
        ctx.on_update(1.0 / 60.0);
    }

    assert_eq!(obj.object(&ctx).state.position, frozen_position);
    assert_eq!(obj.object(&ctx).state.velocity, frozen_velocity);
    assert_eq!(obj.object(&ctx).validity, Validity::InvalidMass);
}

#[test]
fn restoring_mass_revalidates_and_resumes_updates() {
    let mut ctx = Context::new();
    ctx.set_root_space_scaling(10.0);
    ctx.get_root_object().set_mass(&mut ctx, 1.0 / orbital_physics::consts::G_GRAVITATIONAL);

    let root = ctx.get_root_local_space();
    let obj = ctx.create_circular(root, 1.0e5, Vector3::new(0.9, 0.0, 0.0), false);

    obj.set_mass(&mut ctx, 0.0);
    assert_eq!(obj.object(&ctx).validity, Validity::InvalidMass);

    obj.set_mass(&mut ctx, 1.0e5);
    assert_eq!(obj.object(&ctx).validity, Validity::Valid);

    let position_before = obj.object(&ctx).state.position;
    for _ in 0..5 {
        ctx.on_update(1.0 / 60.0);
    }
    assert_ne!(obj.object(&ctx).state.position, position_before);
}
