// Copyright (c) 2019-present the orbital-physics contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! The per-object stepping algorithm driven by [`crate::context::Context::on_update`]:
//! angular advance along the conic, Velocity-Verlet for small true-anomaly
//! steps or accelerating objects, automatic switching between the two, and
//! escape detection against the local-space boundary.

use crate::attributes::{IntegrationMethod, Validity};
use crate::consts::{LOCAL_SPACE_ESCAPE_RADIUS, MAX_OBJECT_UPDATES, MIN_UPDATE_TRUE_ANOMALY};
use crate::context::Context;
use crate::handles::ObjectHandle;
use crate::log::Log;

/// Advances every queued object whose `update_timer` has elapsed, then
/// subtracts `dt` from every remaining queued timer. See the crate docs for
/// the stepping algorithm and the `kMaxObjectUpdates` bound on per-frame
/// work.
pub(crate) fn on_update(ctx: &mut Context, dt: f64) {
    #[cfg(feature = "stats")]
    let update_start = std::time::Instant::now();

    let min_obj_dt = dt / MAX_OBJECT_UPDATES as f64;

    while !ctx.update_queue_front.is_null()
        && ctx.objects.get(ctx.update_queue_front.id()).integration.update_timer < 0.0
    {
        let obj = ctx.update_queue_front;

        #[cfg(feature = "stats")]
        {
            ctx.stats.obj_stats.entry(obj.id()).or_default().num_updates += 1;
        }

        step(ctx, obj, min_obj_dt);
        test_escape(ctx, obj, min_obj_dt);

        let obj_dt = ctx.objects.get(obj.id()).integration.prev_dt;
        ctx.objects.get_mut(obj.id()).integration.update_timer += obj_dt;
        crate::queue::sort_front(ctx);
    }

    let mut node = ctx.update_queue_front;
    while !node.is_null() {
        let next = ctx.objects.get(node.id()).integration.update_next;
        ctx.objects.get_mut(node.id()).integration.update_timer -= dt;
        node = ObjectHandle::new(ctx, next);
    }

    #[cfg(feature = "stats")]
    {
        ctx.stats.last_update_time = update_start.elapsed();
    }
}

/// Runs `obj`'s selected integration method. An `Angular` object whose
/// `delta_true_anomaly` has dropped below `kMinUpdateTrueAnomaly` switches to
/// `Linear` *before* stepping, and the same step then runs the linear half -
/// this fall-through is intentional, not a bug (see the crate docs).
fn step(ctx: &mut Context, obj: ObjectHandle, min_obj_dt: f64) {
    let method = ctx.objects.get(obj.id()).integration.method;
    if method == IntegrationMethod::Angular {
        let delta_true_anomaly = ctx.objects.get(obj.id()).integration.delta_true_anomaly;
        if delta_true_anomaly < MIN_UPDATE_TRUE_ANOMALY {
            switch_to_linear(ctx, obj);
            step_linear(ctx, obj, min_obj_dt);
        } else {
            step_angular(ctx, obj, min_obj_dt);
        }
    } else {
        step_linear(ctx, obj, min_obj_dt);
    }
}

/// Seeds `obj`'s acceleration from its current state and flips its method
/// tag, without advancing its position - the half of `step` that runs before
/// falling through into `step_linear` for the same call.
fn switch_to_linear(ctx: &mut Context, obj: ObjectHandle) {
    let position_from_primary = obj.local_position_from_primary(ctx);
    let pos_mag2 = position_from_primary.norm_squared();
    let pos_dir = position_from_primary / pos_mag2.sqrt();
    let grav = obj.elements(ctx).grav;

    let mut acceleration = -pos_dir.cast::<f64>() * grav / pos_mag2 as f64;
    if obj.is_dynamic(ctx) {
        acceleration += obj.dynamics(ctx).continuous_acceleration;
    }
    ctx.objects.get_mut(obj.id()).state.acceleration = acceleration;
    ctx.objects.get_mut(obj.id()).integration.method = IntegrationMethod::Linear;
    Log::info(format!("object {} switched from angular to linear integration", obj.id()));
}

/// Advances true anomaly by `delta_true_anomaly` and derives position and
/// velocity from the conic directly - no numerical error accumulates as long
/// as the step stays large relative to `kMinUpdateTrueAnomaly`.
fn step_angular(ctx: &mut Context, obj: ObjectHandle, min_obj_dt: f64) {
    let elems = *obj.elements(ctx);
    let delta_true_anomaly = ctx.objects.get(obj.id()).integration.delta_true_anomaly;
    let true_anomaly = crate::elements::wrap_angle(elems.true_anomaly + delta_true_anomaly);

    let sin_t = true_anomaly.sin();
    let cos_t = true_anomaly.cos();
    let r = elems.p / (1.0 + elems.e * cos_t);

    let position_from_primary = r * (cos_t * elems.perifocal_x + sin_t * elems.perifocal_y);
    let offset_from_primary = obj.parent_lsp(ctx).local_offset_from_primary(ctx);
    let velocity_dir = (elems.e + cos_t) * elems.perifocal_y - sin_t * elems.perifocal_x;

    ctx.elements.get_mut(obj.id()).true_anomaly = true_anomaly;
    {
        let state = &mut ctx.objects.get_mut(obj.id()).state;
        state.position = position_from_primary - offset_from_primary;
        state.velocity = velocity_dir.cast::<f64>() * elems.v_constant;
    }

    let velocity_mag = ctx.objects.get(obj.id()).state.velocity.norm();
    let obj_dt = crate::context::compute_obj_dt(velocity_mag, min_obj_dt);
    let delta_true_anomaly = (obj_dt * elems.h / (r * r) as f64) as f32;

    let integration = &mut ctx.objects.get_mut(obj.id()).integration;
    integration.prev_dt = obj_dt;
    integration.delta_true_anomaly = delta_true_anomaly;
}

/// Velocity-Verlet step. Recomputes true anomaly from the stepped position
/// for non-accelerating objects (never letting it decrease except across a
/// periapsis wrap), or a full `Elements`/`Dynamics`/`Influence` recompute for
/// continuously-accelerating ones, whose conic changes shape every step.
fn step_linear(ctx: &mut Context, obj: ObjectHandle, min_obj_dt: f64) {
    let obj_dt = ctx.objects.get(obj.id()).integration.prev_dt;
    let state0 = ctx.objects.get(obj.id()).state;

    let position = state0.position
        + (state0.velocity * obj_dt).cast::<f32>()
        + 0.5f32 * (state0.acceleration * obj_dt * obj_dt).cast::<f32>();
    ctx.objects.get_mut(obj.id()).state.position = position;

    let position_from_primary = obj.local_position_from_primary(ctx);
    let r2 = position_from_primary.norm_squared();
    let grav = obj.elements(ctx).grav;
    let mut new_acceleration = -position_from_primary.cast::<f64>() * grav / (r2 * r2.sqrt()) as f64;

    let is_dynamic = obj.is_dynamic(ctx);
    let mut is_accelerating = false;
    if is_dynamic {
        new_acceleration += obj.dynamics(ctx).continuous_acceleration;
        is_accelerating = obj.dynamics(ctx).is_continuously_accelerating();
    }

    let velocity = state0.velocity + 0.5 * (state0.acceleration + new_acceleration) * obj_dt;
    {
        let state = &mut ctx.objects.get_mut(obj.id()).state;
        state.velocity = velocity;
        state.acceleration = new_acceleration;
    }

    if is_accelerating {
        crate::elements::compute(ctx, obj);
        crate::dynamics::compute_dynamics(ctx, obj);
        crate::dynamics::compute_influence(ctx, obj);
    } else {
        let perifocal_x = obj.elements(ctx).perifocal_x;
        let perifocal_y = obj.elements(ctx).perifocal_y;
        let old_true_anomaly = obj.elements(ctx).true_anomaly;

        let pos_dir = position_from_primary.normalize();
        let mut new_true_anomaly = crate::elements::angle_between_unit_vectors(perifocal_x, pos_dir);
        if pos_dir.dot(&perifocal_y) < 0.0 {
            new_true_anomaly = std::f32::consts::TAU - new_true_anomaly;
        }

        // True anomaly must not decrease except across a periapsis wrap: a
        // large negative jump means it wrapped forward at periapsis (accept
        // the new, smaller value); a large positive jump means it wrapped
        // backward (discard it); otherwise take whichever is larger.
        let delta_true_anomaly = new_true_anomaly - old_true_anomaly;
        let true_anomaly = if delta_true_anomaly < -std::f32::consts::PI {
            new_true_anomaly
        } else if delta_true_anomaly <= std::f32::consts::PI {
            new_true_anomaly.max(old_true_anomaly)
        } else {
            old_true_anomaly
        };
        ctx.elements.get_mut(obj.id()).true_anomaly = true_anomaly;
    }

    let velocity_mag = ctx.objects.get(obj.id()).state.velocity.norm();
    let new_obj_dt = crate::context::compute_obj_dt(velocity_mag, min_obj_dt);
    ctx.objects.get_mut(obj.id()).integration.prev_dt = new_obj_dt;

    if !is_accelerating {
        let position_from_primary = obj.local_position_from_primary(ctx);
        let h = obj.elements(ctx).h;
        let delta_true_anomaly = (new_obj_dt * h / position_from_primary.norm_squared() as f64) as f32;
        ctx.objects.get_mut(obj.id()).integration.delta_true_anomaly = delta_true_anomaly;
        if delta_true_anomaly > MIN_UPDATE_TRUE_ANOMALY {
            ctx.objects.get_mut(obj.id()).integration.method = IntegrationMethod::Angular;
        }
    }
}

/// Promotes a dynamic object out of its local space once its true anomaly
/// passes the escape anomaly computed by [`crate::dynamics::compute_dynamics`],
/// firing the `lsp_changed` callback and re-deriving its timestep and method
/// for the space it lands in.
///
/// TODO: this re-derivation assumes zero continuous acceleration on the step
/// an escape occurs (matching the original), same as the still-open
/// `TryComputeAttributes` case - neither handles a non-zero `ContAcceleration`
/// at the moment escape is detected.
fn test_escape(ctx: &mut Context, obj: ObjectHandle, min_obj_dt: f64) {
    if !obj.is_dynamic(ctx) {
        return;
    }

    let escape_true_anomaly = obj.dynamics(ctx).escape_true_anomaly;
    let true_anomaly = obj.elements(ctx).true_anomaly;
    if !(escape_true_anomaly > 0.0 && true_anomaly < std::f32::consts::PI && true_anomaly > escape_true_anomaly) {
        return;
    }

    debug_assert!(
        ctx.objects.get(obj.id()).state.position.norm() > LOCAL_SPACE_ESCAPE_RADIUS,
        "false positive on escape test"
    );
    debug_assert!(!obj.parent_lsp(ctx).is_root(), "cannot escape the root local space");

    crate::kinematics::promote(ctx, obj);
    ctx.fire_lsp_changed(obj);

    debug_assert_eq!(
        obj.object(ctx).validity,
        Validity::Valid,
        "invalid dynamics after escape"
    );

    let velocity_mag = ctx.objects.get(obj.id()).state.velocity.norm();
    let obj_dt = crate::context::compute_obj_dt(velocity_mag, min_obj_dt);
    let position_from_primary = obj.local_position_from_primary(ctx);
    let pos_mag2 = position_from_primary.norm_squared();
    let h = obj.elements(ctx).h;
    let delta_true_anomaly = (obj_dt * h / pos_mag2 as f64) as f32;

    ctx.objects.get_mut(obj.id()).integration.prev_dt = obj_dt;
    ctx.objects.get_mut(obj.id()).integration.delta_true_anomaly = delta_true_anomaly;

    if delta_true_anomaly > MIN_UPDATE_TRUE_ANOMALY {
        ctx.objects.get_mut(obj.id()).integration.method = IntegrationMethod::Angular;
    } else {
        let pos_dir = position_from_primary / pos_mag2.sqrt();
        let grav = obj.elements(ctx).grav;
        let mut acceleration = -pos_dir.cast::<f64>() * grav / pos_mag2 as f64;
        acceleration += obj.dynamics(ctx).continuous_acceleration;
        ctx.objects.get_mut(obj.id()).state.acceleration = acceleration;
        ctx.objects.get_mut(obj.id()).integration.method = IntegrationMethod::Linear;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;
    use crate::attributes::OrbitType;

    fn setup_circular_orbit(radius: f32) -> (Context, ObjectHandle) {
        let mut ctx = Context::new();
        ctx.set_root_space_scaling(10.0);
        ctx.get_root_object().set_mass(&mut ctx, 1.0 / crate::consts::G_GRAVITATIONAL);
        let root = ctx.get_root_local_space();
        let obj = ctx.create_circular(root, 1e5, Vector3::new(radius, 0.0, 0.0), false);
        (ctx, obj)
    }

    #[test]
    fn circular_orbit_keeps_constant_radius_under_angular_stepping() {
        let (mut ctx, obj) = setup_circular_orbit(0.9);
        assert_eq!(obj.elements(&ctx).orbit_type, OrbitType::Circle);

        let initial_radius = obj.object(&ctx).state.position.norm();
        for _ in 0..200 {
            ctx.on_update(1.0 / 60.0);
        }
        let final_radius = obj.object(&ctx).state.position.norm();
        assert!(
            (final_radius - initial_radius).abs() < 1e-3,
            "circular orbit radius drifted: {initial_radius} -> {final_radius}"
        );
        assert_eq!(obj.object(&ctx).validity, Validity::Valid);
    }

    #[test]
    fn true_anomaly_advances_monotonically_modulo_periapsis_wrap() {
        let (mut ctx, obj) = setup_circular_orbit(0.5);
        let mut prev = obj.elements(&ctx).true_anomaly;
        let mut wraps = 0;
        for _ in 0..500 {
            ctx.on_update(1.0 / 60.0);
            let next = obj.elements(&ctx).true_anomaly;
            if next < prev {
                wraps += 1;
            }
            prev = next;
        }
        assert!(wraps >= 1, "expected at least one periapsis wrap over 500 steps");
    }

    #[test]
    fn update_timer_is_subtracted_for_every_queued_object() {
        let mut ctx = Context::new();
        ctx.set_root_space_scaling(10.0);
        ctx.get_root_object().set_mass(&mut ctx, 1.0 / crate::consts::G_GRAVITATIONAL);
        let root = ctx.get_root_local_space();
        let a = ctx.create_circular(root, 1e5, Vector3::new(0.3, 0.0, 0.0), false);
        let b = ctx.create_circular(root, 1e5, Vector3::new(0.6, 0.0, 0.0), false);

        let timer_a_before = a.object(&ctx).integration.update_timer;
        let timer_b_before = b.object(&ctx).integration.update_timer;
        ctx.on_update(1e-9);
        assert!(a.object(&ctx).integration.update_timer <= timer_a_before);
        assert!(b.object(&ctx).integration.update_timer <= timer_b_before);
    }
}
