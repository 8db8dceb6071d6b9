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

//! Sphere-of-influence maintenance and escape/entry geometry for dynamic
//! objects.

use nalgebra::Vector2;

use crate::attributes::{Dynamics, OrbitType, Validity};
use crate::consts::{LOCAL_SPACE_ESCAPE_RADIUS, MAX_LSPACE_RADIUS, MIN_LSPACE_RADIUS};
use crate::context::Context;
use crate::handles::{LocalSpaceHandle, ObjectHandle};
use crate::log::Log;

/// Creates, resizes, or removes `obj`'s sphere of influence to match its
/// current mass and orbit, per `R_I = semi_major * (m / M_primary)^0.4`.
pub(crate) fn compute_influence(ctx: &mut Context, obj: ObjectHandle) {
    debug_assert!(!obj.is_root(), "cannot compute influence of the root object");

    let mass = ctx.objects.get(obj.id()).state.mass;
    let primary_mass = obj.primary_obj(ctx).object(ctx).state.mass;
    let semi_major = obj.elements(ctx).semi_major;

    let mass_factor = (mass / primary_mass).powf(0.4);
    let radius_of_influence = semi_major * mass_factor as f32;

    let influence = ctx.objects.get(obj.id()).influence;

    if radius_of_influence > MIN_LSPACE_RADIUS {
        if radius_of_influence > MAX_LSPACE_RADIUS {
            Log::warn("object with sphere of influence must have adequate separation from primary");
            ctx.objects.get_mut(obj.id()).validity = Validity::InvalidPath;
            return;
        }
        if influence.is_null() {
            let lsp = crate::context::new_local_space_node(ctx, obj, radius_of_influence);
            ctx.local_spaces.get_mut(lsp.id()).primary = lsp;
            ctx.objects.get_mut(obj.id()).influence = lsp;
        } else {
            crate::kinematics::set_radius_impl(ctx, influence, radius_of_influence);
            debug_assert_eq!(
                ctx.local_spaces.get(influence.id()).primary,
                influence,
                "sphere of influence should still be its own primary"
            );
        }
    } else if !influence.is_null() {
        crate::context::collapse_local_space(ctx, influence);
        ctx.objects.get_mut(obj.id()).influence = LocalSpaceHandle::NULL;
    }
}

/// Derives escape/entry geometry for a dynamic object, or validates a
/// non-dynamic one against the same escape condition. Must run after
/// [`crate::elements::compute`].
pub(crate) fn compute_dynamics(ctx: &mut Context, obj: ObjectHandle) {
    debug_assert!(!obj.is_root(), "cannot compute dynamics of the root object");

    let elems = *obj.elements(ctx);
    let apoapsis_radius = elems.p / (1.0 - elems.e);
    let escapes_local_space = elems.orbit_type == OrbitType::Hyperbola || apoapsis_radius > LOCAL_SPACE_ESCAPE_RADIUS;

    let escape_true_anomaly = if escapes_local_space {
        ((elems.p / LOCAL_SPACE_ESCAPE_RADIUS - 1.0) / elems.e).clamp(-1.0, 1.0).acos()
    } else {
        0.0
    };

    debug_assert!(
        matches!(obj.object(ctx).validity, Validity::Valid | Validity::InvalidPath),
        "cannot compute dynamics on an object with invalid parent, mass, or position"
    );

    ctx.objects.get_mut(obj.id()).validity = Validity::Valid;

    if obj.is_dynamic(ctx) {
        if escapes_local_space && obj.parent_lsp(ctx).is_root() {
            Log::warn("orbit path cannot exit the simulation space");
            ctx.objects.get_mut(obj.id()).validity = Validity::InvalidPath;
            return;
        }
    } else {
        if escapes_local_space {
            Log::warn("non-dynamic orbit cannot exit its primary's local space");
            ctx.objects.get_mut(obj.id()).validity = Validity::InvalidPath;
        }
        return;
    }

    // Reaching here means `obj.is_dynamic(ctx)` is true, so a Dynamics
    // record already exists (added by `set_dynamic`). Only the geometry
    // fields are touched - `continuous_acceleration` is caller-owned state.
    let mut escape_point = nalgebra::Vector3::zeros();
    let mut entry_point = nalgebra::Vector3::zeros();
    let mut escape_point_perifocal = Vector2::zeros();

    if escapes_local_space {
        let cos_escape = escape_true_anomaly.cos();
        let sin_escape = escape_true_anomaly.sin();
        let entry_true_anomaly = std::f32::consts::TAU - escape_true_anomaly;

        let escape_direction = cos_escape * elems.perifocal_x + sin_escape * elems.perifocal_y;
        let entry_direction = entry_true_anomaly.cos() * elems.perifocal_x + entry_true_anomaly.sin() * elems.perifocal_y;

        escape_point = LOCAL_SPACE_ESCAPE_RADIUS * escape_direction;
        entry_point = LOCAL_SPACE_ESCAPE_RADIUS * entry_direction;
        escape_point_perifocal = Vector2::new(
            LOCAL_SPACE_ESCAPE_RADIUS * cos_escape - elems.center_offset,
            LOCAL_SPACE_ESCAPE_RADIUS * sin_escape,
        );
    }

    let record = ctx.dynamics.get_mut(obj.id());
    record.escape_true_anomaly = escape_true_anomaly;
    record.escape_point = escape_point;
    record.entry_point = entry_point;
    record.escape_point_perifocal = escape_point_perifocal;
}
