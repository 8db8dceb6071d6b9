//! spec.md §8 scenario 3: a dynamic object is boosted onto a hyperbolic,
//! escaping trajectory and must promote out of its local space exactly once,
//! firing the `lsp_changed` callback, ending up valid in the root space.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use orbital_physics::{OrbitType, Validity};

#[test]
fn dynamic_object_escapes_its_local_space_exactly_once() {
    let (mut ctx, _obj1, ship) = common::build_hierarchy();

    let circular_velocity = ship.circular_orbit_velocity(&ctx);
    ship.set_velocity(&mut ctx, circular_velocity * 1.6);

    assert_eq!(ship.elements(&ctx).orbit_type, OrbitType::Hyperbola);
    assert_eq!(ship.object(&ctx).validity, Validity::Valid);
    let soi = ship.parent_lsp(&ctx);
    assert!(!soi.is_root());

    let escape_count = Rc::new(Cell::new(0u32));
    let counted = Rc::clone(&escape_count);
    ctx.on_lsp_changed(move |_obj| counted.set(counted.get() + 1));

    let mut escaped = false;
    for _ in 0..20_000 {
        ctx.on_update(1.0e-3);
        if ship.parent_lsp(&ctx).is_root() {
            escaped = true;
            break;
        }
    }

    assert!(escaped, "ship never escaped into the root local space");
    assert_eq!(escape_count.get(), 1, "lsp_changed must fire exactly once");
    assert_eq!(ship.object(&ctx).validity, Validity::Valid);
}
