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

//! Rescaling an object's state when it moves between local spaces of
//! different radii, and resizing a local space itself.

use crate::consts::{EPS_LSPACE_RADIUS, LOCAL_SPACE_ESCAPE_RADIUS, MAX_LSPACE_RADIUS, MIN_LSPACE_RADIUS};
use crate::context::Context;
use crate::handles::{LocalSpaceHandle, ObjectHandle};
use crate::log::Log;

/// Scales the radius (and derived `meters_per_radius`) of every local space
/// directly owned by `obj` by `rescaling_factor`, without moving any nodes.
/// Called whenever `obj` itself changes local space, since its own child
/// spaces are measured in units of `obj`'s old local space.
pub(crate) fn rescale_local_spaces(ctx: &mut Context, obj: ObjectHandle, rescaling_factor: f32) {
    let parent_meters_per_radius = obj.parent_lsp(ctx).local_space(ctx).meters_per_radius;
    let mut lspaces = Vec::new();
    obj.get_local_spaces(ctx, &mut lspaces);
    for lsp in lspaces {
        let record = ctx.local_spaces.get_mut(lsp.id());
        record.radius *= rescaling_factor;
        record.meters_per_radius = parent_meters_per_radius * record.radius as f64;
    }
}

/// Moves `obj` to the next-higher local space, rescaling its state to
/// preserve absolute position and velocity.
pub(crate) fn promote(ctx: &mut Context, obj: ObjectHandle) {
    let old_lsp = obj.parent_lsp(ctx);
    debug_assert!(!old_lsp.is_root(), "cannot promote an object out of the root local space");
    let new_lsp = old_lsp.next_higher_lsp(ctx);

    let rescaling_factor;
    if old_lsp.is_highest_lsp_on_object(ctx) {
        rescaling_factor = old_lsp.local_space(ctx).radius;
        let parent_obj = old_lsp.parent_obj(ctx);
        let parent_state = ctx.objects.get(parent_obj.id()).state;
        let state = &mut ctx.objects.get_mut(obj.id()).state;
        state.position = state.position * rescaling_factor + parent_state.position;
        state.velocity = state.velocity * rescaling_factor as f64 + parent_state.velocity;
    } else {
        rescaling_factor = old_lsp.local_space(ctx).radius / new_lsp.local_space(ctx).radius;
        let state = &mut ctx.objects.get_mut(obj.id()).state;
        state.position *= rescaling_factor;
        state.velocity *= rescaling_factor as f64;
    }

    ctx.tree.move_node(obj.id(), new_lsp.id());
    rescale_local_spaces(ctx, obj, rescaling_factor);

    crate::context::compute_state_validity(ctx, obj);
    crate::context::try_compute_attributes(ctx, obj);
    crate::context::subtree_cascade_attribute_changes(ctx, obj.id());
}

/// Moves `obj` into `new_lsp`, a local space attached to a sibling object in
/// `obj`'s current local space, preserving absolute position/velocity.
pub(crate) fn demote_into(ctx: &mut Context, new_lsp: LocalSpaceHandle, obj: ObjectHandle) {
    debug_assert_eq!(
        new_lsp.parent_lsp(ctx),
        obj.parent_lsp(ctx),
        "target local space is not a sibling's child within the object's current local space"
    );

    let rescaling_factor = 1.0 / new_lsp.local_space(ctx).radius;
    let parent_state = ctx.objects.get(new_lsp.parent_obj(ctx).id()).state;
    let state = &mut ctx.objects.get_mut(obj.id()).state;
    state.position = (state.position - parent_state.position) * rescaling_factor;
    state.velocity = (state.velocity - parent_state.velocity) * rescaling_factor as f64;

    ctx.tree.move_node(obj.id(), new_lsp.id());
    rescale_local_spaces(ctx, obj, rescaling_factor);
}

/// Moves `obj` to the next-lower local space attached to the same object as
/// its current local space.
pub(crate) fn demote_to_next_lower(ctx: &mut Context, obj: ObjectHandle) {
    let lsp = obj.parent_lsp(ctx);
    let new_lsp_id = ctx.tree.get(lsp.id()).next_sibling;
    debug_assert!(ctx.tree.has(new_lsp_id), "no next-lower local space exists");
    let new_lsp = LocalSpaceHandle::new(ctx, new_lsp_id);

    let rescaling_factor = lsp.local_space(ctx).radius / new_lsp.local_space(ctx).radius;
    let state = &mut ctx.objects.get_mut(obj.id()).state;
    state.position *= rescaling_factor;
    state.velocity *= rescaling_factor as f64;

    ctx.tree.move_node(obj.id(), new_lsp.id());
    rescale_local_spaces(ctx, obj, rescaling_factor);
}

/// Sets `lsp`'s radius unconditionally, rescaling hosted objects and
/// resorting siblings. Bypasses the `[MIN_LSPACE_RADIUS, MAX_LSPACE_RADIUS]`
/// check `try_set_radius` performs - callers must validate first.
pub(crate) fn set_radius_impl(ctx: &mut Context, lsp: LocalSpaceHandle, radius: f32) {
    debug_assert!(!lsp.is_root(), "cannot set the root local space's radius this way");
    debug_assert!(
        radius < MAX_LSPACE_RADIUS + EPS_LSPACE_RADIUS && radius > MIN_LSPACE_RADIUS - EPS_LSPACE_RADIUS,
        "radius outside the valid local-space range"
    );

    let old_radius = lsp.local_space(ctx).radius;
    let rescale_factor = old_radius / radius;

    let grandparent_meters_per_radius = if ctx.tree.height(lsp.id()) == 1 {
        ctx.local_spaces.get(crate::context::ROOT_LSP_ID).meters_per_radius
    } else {
        ctx.local_spaces.get(ctx.tree.grandparent(lsp.id())).meters_per_radius
    };

    {
        let record = ctx.local_spaces.get_mut(lsp.id());
        record.radius = radius;
        record.meters_per_radius = radius as f64 * grandparent_meters_per_radius;
    }

    let parent_obj = lsp.parent_obj(ctx);
    let influence = parent_obj.object(ctx).influence;
    if !influence.is_null() && radius <= influence.local_space(ctx).radius {
        ctx.local_spaces.get_mut(lsp.id()).primary = lsp;
    } else {
        let primary = parent_obj.primary_lsp(ctx);
        ctx.local_spaces.get_mut(lsp.id()).primary = primary;
    }

    let mut child_objs = Vec::new();
    lsp.get_local_objects(ctx, &mut child_objs);

    let prev_sibling = ctx.tree.get(lsp.id()).prev_sibling;
    let promote_all = ctx.tree.has(prev_sibling)
        && radius > ctx.local_spaces.get(prev_sibling).radius;

    for child in child_objs {
        {
            let state = &mut ctx.objects.get_mut(child.id()).state;
            state.position *= rescale_factor;
            state.velocity *= rescale_factor as f64;
        }

        let escapes = ctx.objects.get(child.id()).state.position.norm() > LOCAL_SPACE_ESCAPE_RADIUS;
        if promote_all || escapes {
            // "Promoting" still works here because the local space has not
            // yet been re-sorted among its siblings.
            promote(ctx, child);
        } else {
            crate::context::compute_state_validity(ctx, child);
            crate::context::try_compute_attributes(ctx, child);
            crate::context::subtree_cascade_attribute_changes(ctx, child.id());
        }
    }

    if rescale_factor < 1.0 {
        while ctx.tree.has(ctx.tree.get(lsp.id()).prev_sibling) {
            let prev = ctx.tree.get(lsp.id()).prev_sibling;
            if radius > ctx.local_spaces.get(prev).radius {
                ctx.tree.swap_with_prev_sibling(lsp.id());
            } else {
                break;
            }
        }
    } else {
        while ctx.tree.has(ctx.tree.get(lsp.id()).next_sibling) {
            let next = ctx.tree.get(lsp.id()).next_sibling;
            if radius < ctx.local_spaces.get(next).radius {
                ctx.tree.swap_with_next_sibling(lsp.id());
            } else {
                break;
            }
        }
    }

    let next_higher = lsp.next_higher_lsp(ctx);
    let mut higher_objs = Vec::new();
    next_higher.get_local_objects(ctx, &mut higher_objs);
    let next_higher_is_sibling = next_higher.id() == ctx.tree.get(lsp.id()).prev_sibling;
    let radius_in_prev = lsp.local_space(ctx).radius / next_higher.local_space(ctx).radius;
    let lsp_parent_pos = parent_obj.object(ctx).state.position;

    for candidate in higher_objs {
        if candidate.id() == ctx.tree.get(lsp.id()).parent {
            continue;
        }
        let pos = ctx.objects.get(candidate.id()).state.position;
        if next_higher_is_sibling && pos.norm() < radius_in_prev {
            demote_to_next_lower(ctx, candidate);
        } else if !next_higher_is_sibling && (pos - lsp_parent_pos).norm() < lsp.local_space(ctx).radius {
            demote_into(ctx, lsp, candidate);
        }
    }

    crate::context::subtree_cascade_attribute_changes(ctx, lsp.id());
}

impl LocalSpaceHandle {
    /// Sets this local space's radius unconditionally. Asserts this is not a
    /// sphere of influence, whose radius is owned by [`crate::dynamics::compute_influence`].
    pub fn set_radius(self, ctx: &mut Context, radius: f32) {
        debug_assert!(!self.is_sphere_of_influence(ctx), "cannot set radius of a sphere of influence directly");
        set_radius_impl(ctx, self, radius);
    }

    /// Sets this local space's radius if `radius` lies within
    /// `[MIN_LSPACE_RADIUS, MAX_LSPACE_RADIUS]` and this is not an
    /// influencing space. The boundary-facing counterpart to
    /// [`LocalSpaceHandle::set_radius`], which asserts instead of returning
    /// [`crate::error::Error::ShrinkSphereOfInfluence`].
    pub fn try_set_radius(self, ctx: &mut Context, radius: f32) -> crate::error::Result<()> {
        if self.is_null() {
            return Err(crate::error::Error::NullHandle);
        }
        if self.is_influencing(ctx)
            || radius >= MAX_LSPACE_RADIUS + EPS_LSPACE_RADIUS
            || radius <= MIN_LSPACE_RADIUS - EPS_LSPACE_RADIUS
        {
            Log::warn(format!(
                "attempted to set invalid local-space radius ({radius}): must be in [{MIN_LSPACE_RADIUS}, {MAX_LSPACE_RADIUS}]"
            ));
            return Err(crate::error::Error::ShrinkSphereOfInfluence);
        }
        set_radius_impl(ctx, self, radius);
        Ok(())
    }
}
