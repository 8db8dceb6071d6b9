//! spec.md §8 scenario 2: a dynamic "ship" attached as a child of a massive
//! object, which must gain a sphere-of-influence local space sized by its
//! mass.

mod common;

use orbital_physics::Validity;

#[test]
fn massive_object_gains_sphere_of_influence_sized_by_mass_ratio() {
    let (ctx, obj1, ship) = common::build_hierarchy();

    let soi = obj1.sphere_of_influence(&ctx);
    assert!(!soi.is_null());
    assert!(soi.is_influencing(&ctx), "a sphere of influence is always its own primary");

    let mass_ratio = 1.0e5 / (1.0 / orbital_physics::consts::G_GRAVITATIONAL);
    let expected_radius = obj1.elements(&ctx).semi_major * (mass_ratio as f32).powf(0.4);
    let actual_radius = soi.local_space(&ctx).radius;
    assert!(
        (actual_radius - expected_radius).abs() < 1e-6,
        "SOI radius {actual_radius} != expected {expected_radius}"
    );

    assert_eq!(ship.parent_lsp(&ctx), soi, "ship should live inside object #1's sphere of influence");
    assert_eq!(ship.object(&ctx).validity, Validity::Valid);
}

#[test]
fn sibling_local_spaces_stay_radius_sorted_descending() {
    let (ctx, obj1, _ship) = common::build_hierarchy();

    let mut lspaces = Vec::new();
    obj1.get_local_spaces(&ctx, &mut lspaces);
    for pair in lspaces.windows(2) {
        assert!(
            pair[0].local_space(&ctx).radius >= pair[1].local_space(&ctx).radius,
            "sibling local spaces must be radius-descending"
        );
    }
}
