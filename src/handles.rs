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

//! Typed node handles: the only public read/write surface over a
//! [`crate::context::Context`]'s arena. `ObjectHandle` and `LocalSpaceHandle`
//! are cheap, `Copy` values that assert depth parity on construction and do
//! not own the node they name - dereferencing one after the node has been
//! erased is undefined, same as any other arena index (see the crate docs).
//!
//! Every handle method that needs to read or mutate simulation state takes a
//! `&Context`/`&mut Context` explicitly; there is no implicit global context,
//! unlike the static-context original this crate is modeled on.

use std::fmt;

use nalgebra::Vector3;

use crate::arena::{Id, NULL_ID};
use crate::attributes::{Dynamics, Elements, Object};
use crate::context::Context;

/// A handle to an object node (even tree height).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub(crate) Id);

/// A handle to a local space node (odd tree height).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalSpaceHandle(pub(crate) Id);

impl ObjectHandle {
    pub const NULL: Self = Self(NULL_ID);

    pub(crate) fn new(ctx: &Context, id: Id) -> Self {
        if id != NULL_ID {
            debug_assert!(ctx.tree.has(id), "invalid node id");
            debug_assert!(ctx.tree.height(id) % 2 == 0, "id does not name an object node");
            debug_assert!(ctx.objects.has(id), "object node must have an Object attribute");
        }
        Self(id)
    }

    pub fn id(self) -> Id {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == NULL_ID
    }

    pub fn is_root(self) -> bool {
        self.0 == crate::context::ROOT_OBJ_ID
    }

    pub fn is_dynamic(self, ctx: &Context) -> bool {
        ctx.dynamics.has(self.0)
    }

    pub fn is_influencing(self, ctx: &Context) -> bool {
        !ctx.objects.get(self.0).influence.is_null()
    }

    pub fn object(self, ctx: &Context) -> &Object {
        ctx.objects.get(self.0)
    }

    pub fn elements(self, ctx: &Context) -> &Elements {
        ctx.elements.get(self.0)
    }

    pub fn dynamics(self, ctx: &Context) -> &Dynamics {
        ctx.dynamics.get(self.0)
    }

    /// The local space this object directly occupies.
    pub fn parent_lsp(self, ctx: &Context) -> LocalSpaceHandle {
        LocalSpaceHandle::new(ctx, ctx.tree.parent(self.0))
    }

    /// The object owning this object's parent local space.
    pub fn parent_obj(self, ctx: &Context) -> ObjectHandle {
        ObjectHandle::new(ctx, ctx.tree.grandparent(self.0))
    }

    pub fn primary_lsp(self, ctx: &Context) -> LocalSpaceHandle {
        ctx.local_spaces.get(ctx.tree.parent(self.0)).primary
    }

    pub fn primary_obj(self, ctx: &Context) -> ObjectHandle {
        self.primary_lsp(ctx).parent_obj(ctx)
    }

    /// This object's sphere of influence, or a null handle if it isn't
    /// massive enough to have one.
    pub fn sphere_of_influence(self, ctx: &Context) -> LocalSpaceHandle {
        ctx.objects.get(self.0).influence
    }

    pub fn local_position_from_primary(self, ctx: &Context) -> Vector3<f32> {
        ctx.objects.get(self.0).state.position
            + self.parent_lsp(ctx).local_offset_from_primary(ctx)
    }

    /// Appends this object's local spaces, largest radius first, and returns
    /// how many were added.
    pub fn get_local_spaces(self, ctx: &Context, out: &mut Vec<LocalSpaceHandle>) -> usize {
        let mut count = 0;
        let mut child = ctx.tree.get(self.0).first_child;
        while ctx.tree.has(child) {
            count += 1;
            out.push(LocalSpaceHandle::new(ctx, child));
            child = ctx.tree.get(child).next_sibling;
        }
        count
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "ObjectHandle(null)")
        } else {
            write!(f, "ObjectHandle({})", self.0)
        }
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl LocalSpaceHandle {
    pub const NULL: Self = Self(NULL_ID);

    pub(crate) fn new(ctx: &Context, id: Id) -> Self {
        if id != NULL_ID {
            debug_assert!(ctx.tree.has(id), "invalid node id");
            debug_assert!(ctx.tree.height(id) % 2 == 1, "id does not name a local space node");
            debug_assert!(
                ctx.local_spaces.has(id),
                "local space node must have a LocalSpace attribute"
            );
        }
        Self(id)
    }

    pub fn id(self) -> Id {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == NULL_ID
    }

    pub fn is_root(self) -> bool {
        self.0 == crate::context::ROOT_LSP_ID
    }

    pub fn local_space(self, ctx: &Context) -> &crate::attributes::LocalSpace {
        ctx.local_spaces.get(self.0)
    }

    pub fn parent_obj(self, ctx: &Context) -> ObjectHandle {
        ObjectHandle::new(ctx, ctx.tree.parent(self.0))
    }

    pub fn parent_lsp(self, ctx: &Context) -> LocalSpaceHandle {
        LocalSpaceHandle::new(ctx, ctx.tree.grandparent(self.0))
    }

    pub fn primary_lsp(self, ctx: &Context) -> LocalSpaceHandle {
        ctx.local_spaces.get(self.0).primary
    }

    pub fn primary_obj(self, ctx: &Context) -> ObjectHandle {
        self.primary_lsp(ctx).parent_obj(ctx)
    }

    /// True if the parent object is the locally dominant source of gravity,
    /// i.e. this space's radius is within its parent's sphere of influence
    /// (or the parent has none and this is the root).
    pub fn is_influencing(self, ctx: &Context) -> bool {
        self.0 == ctx.local_spaces.get(self.0).primary.0
    }

    /// True if this local space *is* its parent object's sphere of
    /// influence.
    pub fn is_sphere_of_influence(self, ctx: &Context) -> bool {
        self.0 == self.parent_obj(ctx).object(ctx).influence.0
    }

    pub fn is_highest_lsp_on_object(self, ctx: &Context) -> bool {
        self.0 == ctx.tree.get(ctx.tree.parent(self.0)).first_child
    }

    /// The next-higher (larger-radius) local space: the previous sibling if
    /// one exists, otherwise the grandparent local space.
    pub fn next_higher_lsp(self, ctx: &Context) -> LocalSpaceHandle {
        let prev_sibling = ctx.tree.get(self.0).prev_sibling;
        if ctx.tree.has(prev_sibling) {
            LocalSpaceHandle::new(ctx, prev_sibling)
        } else {
            LocalSpaceHandle::new(ctx, ctx.tree.grandparent(self.0))
        }
    }

    /// This local space's offset from its `Primary`, expressed in this
    /// space's own units, accumulated by walking up through intervening
    /// parent objects' positions and rescaling at each local space crossed.
    pub fn local_offset_from_primary(self, ctx: &Context) -> Vector3<f32> {
        let primary = ctx.local_spaces.get(self.0).primary;
        local_offset_from_primary(ctx, self, primary)
    }

    /// Speed of a circular orbit around this local space's primary at
    /// `local_radius` local units from the primary.
    pub fn circular_orbit_speed(self, ctx: &Context, local_radius: f32) -> f64 {
        crate::elements::circular_orbit_speed(ctx, self, local_radius)
    }

    /// Appends this local space's direct child objects and returns how many
    /// were added.
    pub fn get_local_objects(self, ctx: &Context, out: &mut Vec<ObjectHandle>) -> usize {
        let mut count = 0;
        let mut child = ctx.tree.get(self.0).first_child;
        while ctx.tree.has(child) {
            count += 1;
            out.push(ObjectHandle::new(ctx, child));
            child = ctx.tree.get(child).next_sibling;
        }
        count
    }
}

fn local_offset_from_primary(
    ctx: &Context,
    lsp: LocalSpaceHandle,
    primary: LocalSpaceHandle,
) -> Vector3<f32> {
    if lsp == primary {
        return Vector3::zeros();
    }
    let parent_obj_id = ctx.tree.parent(lsp.0);
    let parent_obj = ObjectHandle::new(ctx, parent_obj_id);
    let grandparent_lsp = LocalSpaceHandle::new(ctx, ctx.tree.parent(parent_obj_id));
    let offset = ctx.objects.get(parent_obj_id).state.position
        + local_offset_from_primary(ctx, grandparent_lsp, primary);
    offset / ctx.local_spaces.get(lsp.0).radius
}

impl fmt::Debug for LocalSpaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "LocalSpaceHandle(null)")
        } else {
            write!(f, "LocalSpaceHandle({})", self.0)
        }
    }
}

impl Default for LocalSpaceHandle {
    fn default() -> Self {
        Self::NULL
    }
}
