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

//! Keplerian element derivation and the fixed reference frame.
//!
//! The reference frame is left-handed: X = +x, Y = -z, normal = +y. It is
//! what the ascending-node and argument-of-periapsis disambiguation rules in
//! [`compute`] are built against; changing it changes the sign conventions
//! those rules rely on.

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::attributes::{Elements, OrbitType};
use crate::consts::{ECCENTRICITY_EPSILON, G_GRAVITATIONAL, PARALLEL_DOT_PRODUCT_LIMIT};
use crate::context::Context;
use crate::handles::{LocalSpaceHandle, ObjectHandle};

pub fn reference_x() -> Vector3<f32> {
    Vector3::new(1.0, 0.0, 0.0)
}

pub fn reference_y() -> Vector3<f32> {
    Vector3::new(0.0, 0.0, -1.0)
}

pub fn reference_normal() -> Vector3<f32> {
    Vector3::new(0.0, 1.0, 0.0)
}

pub(crate) fn angle_between_unit_vectors(a: Vector3<f32>, b: Vector3<f32>) -> f32 {
    a.dot(&b).clamp(-1.0, 1.0).acos()
}

/// Wraps `angle` into `[0, 2*pi)`.
pub(crate) fn wrap_angle(angle: f32) -> f32 {
    let two_pi = std::f32::consts::TAU;
    if angle > 0.0 {
        angle % two_pi
    } else {
        (angle + two_pi) % two_pi
    }
}

fn axis_angle_quat(axis: Vector3<f32>, angle: f32) -> UnitQuaternion<f64> {
    let axis = Unit::new_normalize(axis.cast::<f64>());
    UnitQuaternion::from_axis_angle(&axis, angle as f64)
}

/// Derives [`Elements`] from `obj`'s instantaneous state relative to its
/// primary. Must only be called on a non-root object whose validity is
/// `Valid` or `InvalidPath` (an object that is otherwise invalid has no
/// meaningful primary to compute elements against).
pub(crate) fn compute(ctx: &mut Context, obj: ObjectHandle) {
    debug_assert!(!obj.is_root(), "cannot compute elements of the root object");

    let lsp = obj.parent_lsp(ctx);
    let primary_mass = obj.primary_obj(ctx).object(ctx).state.mass;
    let meters_per_radius = lsp.local_space(ctx).meters_per_radius;
    let grav = G_GRAVITATIONAL * primary_mass * meters_per_radius.powi(-3);

    let position_from_primary = obj.local_position_from_primary(ctx);
    let velocity = ctx.objects.get(obj.id()).state.velocity;

    let h_vec = position_from_primary.cast::<f64>().cross(&velocity);
    let h2 = h_vec.norm_squared();
    let h = h2.sqrt();

    if h == 0.0 {
        *ctx.elements.get_mut(obj.id()) = Elements {
            grav,
            ..Elements::default()
        };
        return;
    }

    let perifocal_normal = (h_vec / h).cast::<f32>();
    let p = (h2 / grav) as f32;
    let v_constant = grav / h;

    let pos_dir = position_from_primary.normalize();
    let e_vec = (velocity.cross(&h_vec) / grav).cast::<f32>() - pos_dir;
    let mut e = e_vec.norm();

    let orbit_type;
    let perifocal_x;
    let perifocal_y;
    let mut e2term;

    if e < ECCENTRICITY_EPSILON {
        e = 0.0;
        orbit_type = OrbitType::Circle;
        perifocal_x = if perifocal_normal.dot(&reference_y()).abs() > PARALLEL_DOT_PRODUCT_LIMIT {
            reference_x()
        } else {
            reference_y().cross(&perifocal_normal)
        };
        perifocal_y = perifocal_normal.cross(&perifocal_x);
        e2term = 1.0;
    } else {
        perifocal_x = e_vec / e;
        perifocal_y = perifocal_normal.cross(&perifocal_x);
        if e < 1.0 {
            orbit_type = OrbitType::Ellipse;
            e2term = 1.0 - e * e;
        } else {
            orbit_type = OrbitType::Hyperbola;
            e2term = e * e - 1.0;
        }
        e2term += f32::EPSILON;
    }

    let semi_major = p / e2term;
    let semi_minor = semi_major * e2term.sqrt();

    let mut center_offset = p / (1.0 + e);
    center_offset += if orbit_type == OrbitType::Hyperbola {
        semi_major
    } else {
        -semi_major
    };

    let period = std::f64::consts::TAU * (semi_major * semi_minor) as f64 / h;

    let mut true_anomaly = angle_between_unit_vectors(perifocal_x, pos_dir);
    if pos_dir.dot(&perifocal_y) < 0.0 {
        true_anomaly = std::f32::consts::TAU - true_anomaly;
    }

    let inclination = perifocal_normal.dot(&reference_normal()).clamp(-1.0, 1.0).acos();
    let ascending_node = if perifocal_normal.dot(&reference_normal()).abs() > PARALLEL_DOT_PRODUCT_LIMIT {
        perifocal_x
    } else {
        reference_normal().cross(&perifocal_normal).normalize()
    };
    let mut raan = ascending_node.dot(&reference_x()).clamp(-1.0, 1.0).acos();
    if ascending_node.dot(&reference_y()) < 0.0 {
        raan = std::f32::consts::TAU - raan;
    }
    let mut arg_periapsis = angle_between_unit_vectors(ascending_node, perifocal_x);
    if ascending_node.dot(&perifocal_y) > 0.0 {
        arg_periapsis = std::f32::consts::TAU - arg_periapsis;
    }

    let perifocal_orientation = axis_angle_quat(perifocal_normal, arg_periapsis)
        * axis_angle_quat(ascending_node, inclination)
        * axis_angle_quat(reference_normal(), raan);

    *ctx.elements.get_mut(obj.id()) = Elements {
        grav,
        h,
        e,
        orbit_type,
        p,
        v_constant,
        inclination,
        ascending_node,
        raan,
        arg_periapsis,
        perifocal_x,
        perifocal_y,
        perifocal_normal,
        perifocal_orientation,
        true_anomaly,
        semi_major,
        semi_minor,
        center_offset,
        period,
    };
}

/// Speed of a circular orbit around `lsp`'s primary at `local_radius` local
/// units from the primary. Assumes the orbiter's mass is negligible next to
/// the primary's.
pub fn circular_orbit_speed(ctx: &Context, lsp: LocalSpaceHandle, local_radius: f32) -> f64 {
    let primary_mass = lsp.primary_obj(ctx).object(ctx).state.mass;
    let meters_per_radius = lsp.local_space(ctx).meters_per_radius;
    (G_GRAVITATIONAL * primary_mass * meters_per_radius.powi(-3) / local_radius as f64).sqrt()
}

/// Velocity for a counter-clockwise circular orbit around `lsp`'s primary,
/// starting at `local_position` (in `lsp`'s own units). Keeps the orbital
/// plane as close to the reference plane as possible.
pub fn circular_orbit_velocity(
    ctx: &Context,
    lsp: LocalSpaceHandle,
    local_position: Vector3<f32>,
) -> nalgebra::Vector3<f64> {
    let position_from_primary = local_position + lsp.local_offset_from_primary(ctx);
    let r_mag = position_from_primary.norm();
    if r_mag == 0.0 {
        return Vector3::zeros();
    }

    let r_dir = position_from_primary / r_mag;
    let r_dot_normal = r_dir.dot(&reference_normal());
    let v_dir = if r_dot_normal.abs() > PARALLEL_DOT_PRODUCT_LIMIT {
        if r_dot_normal > 0.0 {
            -reference_x()
        } else {
            reference_x()
        }
    } else {
        reference_normal().cross(&r_dir).normalize()
    };

    v_dir.cast::<f64>() * circular_orbit_speed(ctx, lsp, r_mag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_frame_is_orthonormal_and_left_handed() {
        let x = reference_x();
        let y = reference_y();
        let n = reference_normal();
        assert!((x.dot(&y)).abs() < 1e-6);
        assert!((x.dot(&n)).abs() < 1e-6);
        assert!((y.dot(&n)).abs() < 1e-6);
        assert!((x.cross(&y) - n).norm() < 1e-6);
    }

    #[test]
    fn angle_between_identical_unit_vectors_is_zero() {
        let v = reference_x();
        assert!(angle_between_unit_vectors(v, v).abs() < 1e-6);
    }

    #[test]
    fn angle_between_opposite_unit_vectors_is_pi() {
        let v = reference_x();
        assert!((angle_between_unit_vectors(v, -v) - std::f32::consts::PI).abs() < 1e-6);
    }
}
