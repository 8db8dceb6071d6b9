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

//! The simulation context: owns the tree, every attribute table, and the
//! update queue, and exposes the public API described in the crate docs.
//! Everything that mutates simulation state funnels through
//! [`compute_state_validity`], [`try_compute_attributes`] and
//! [`subtree_cascade_attribute_changes`], in that order, on every path that
//! needs them - see the handle setters below and [`crate::kinematics`].

use nalgebra::Vector3;

use crate::arena::{AttributeTable, Id};
use crate::attributes::{Dynamics, Elements, IntegrationMethod, LocalSpace, Object, Validity};
use crate::consts::{DEFAULT_MIN_DT, MAX_UPDATE_DISTANCE, MIN_UPDATE_TRUE_ANOMALY};
use crate::handles::{LocalSpaceHandle, ObjectHandle};
use crate::log::Log;
use crate::tree::Tree;

/// Id of the one permanent object node, created with every [`Context`].
pub const ROOT_OBJ_ID: Id = 0;
/// Id of the one permanent local space node, created with every [`Context`].
pub const ROOT_LSP_ID: Id = 1;

#[cfg(feature = "stats")]
#[derive(Debug, Clone, Default)]
pub struct ObjStats {
    pub num_updates: u64,
}

#[cfg(feature = "stats")]
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub obj_stats: std::collections::HashMap<Id, ObjStats>,
    pub last_update_time: std::time::Duration,
}

/// Owns a hierarchy of objects and local spaces and steps them forward in
/// time. Not `Sync`/`Send`-derived: the crate is single-threaded by
/// contract (see the crate docs).
pub struct Context {
    pub(crate) tree: Tree,
    pub(crate) objects: AttributeTable<Id, Object>,
    pub(crate) local_spaces: AttributeTable<Id, LocalSpace>,
    pub(crate) elements: AttributeTable<Id, Elements>,
    pub(crate) dynamics: AttributeTable<Id, Dynamics>,
    pub(crate) update_queue_front: ObjectHandle,
    lsp_changed_callback: Option<Box<dyn FnMut(ObjectHandle)>>,
    #[cfg(feature = "stats")]
    pub stats: Stats,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Builds a fresh context with just the root object and root local
    /// space. The root local space's scaling is unset (`meters_per_radius
    /// == 0`) until [`Context::set_root_space_scaling`] is called, which
    /// leaves every other object `InvalidParent` until then.
    pub fn new() -> Self {
        let mut tree = Tree::new();
        let root_obj_id = tree.new_root();
        let root_lsp_id = tree.new_child(root_obj_id);
        debug_assert_eq!(root_obj_id, ROOT_OBJ_ID);
        debug_assert_eq!(root_lsp_id, ROOT_LSP_ID);

        let mut objects = AttributeTable::new();
        // `Object::default()`'s `InvalidParent` is meaningless for the root
        // (which is never parented); start it `InvalidMass` instead, since
        // the root's mass is left zero until the caller sets it.
        objects.add(root_obj_id).validity = Validity::InvalidMass;

        let mut local_spaces = AttributeTable::new();
        let root_lsp = local_spaces.add(root_lsp_id);
        root_lsp.radius = 1.0;
        root_lsp.primary = LocalSpaceHandle(root_lsp_id);

        Self {
            tree,
            objects,
            local_spaces,
            elements: AttributeTable::new(),
            dynamics: AttributeTable::new(),
            update_queue_front: ObjectHandle::NULL,
            lsp_changed_callback: None,
            #[cfg(feature = "stats")]
            stats: Stats::default(),
        }
    }

    pub fn has(&self, id: Id) -> bool {
        self.tree.has(id)
    }

    pub fn get_root_object(&self) -> ObjectHandle {
        ObjectHandle::new(self, ROOT_OBJ_ID)
    }

    pub fn get_root_local_space(&self) -> LocalSpaceHandle {
        LocalSpaceHandle::new(self, ROOT_LSP_ID)
    }

    /// Sets the root local space's scaling, in meters per unit-radius, and
    /// cascades the change through every object in the tree.
    pub fn set_root_space_scaling(&mut self, meters: f64) {
        self.local_spaces.get_mut(ROOT_LSP_ID).meters_per_radius = meters;
        subtree_cascade_attribute_changes(self, ROOT_LSP_ID);
    }

    /// Registers the callback fired synchronously, from inside
    /// [`Context::on_update`], whenever an object crosses a local-space
    /// boundary. The callback must not mutate the simulation re-entrantly.
    pub fn on_lsp_changed<F: FnMut(ObjectHandle) + 'static>(&mut self, callback: F) {
        self.lsp_changed_callback = Some(Box::new(callback));
    }

    pub(crate) fn fire_lsp_changed(&mut self, obj: ObjectHandle) {
        if let Some(callback) = self.lsp_changed_callback.as_mut() {
            callback(obj);
        }
    }

    /// Creates an object in `lsp` with the given state.
    pub fn create(
        &mut self,
        lsp: LocalSpaceHandle,
        mass: f64,
        position: Vector3<f32>,
        velocity: Vector3<f64>,
        dynamic: bool,
    ) -> ObjectHandle {
        debug_assert!(!lsp.is_null(), "invalid local space");

        let obj = new_object_node(self, lsp);
        {
            let state = &mut self.objects.get_mut(obj.id()).state;
            state.mass = mass;
            state.position = position;
            state.velocity = velocity;
        }
        if dynamic {
            self.dynamics.get_or_add(obj.id());
        }

        compute_state_validity(self, obj);
        try_compute_attributes(self, obj);
        obj
    }

    /// Creates an object whose velocity defaults to a circular orbit at
    /// `position` around `lsp`'s primary.
    pub fn create_circular(
        &mut self,
        lsp: LocalSpaceHandle,
        mass: f64,
        position: Vector3<f32>,
        dynamic: bool,
    ) -> ObjectHandle {
        let velocity = crate::elements::circular_orbit_velocity(self, lsp, position);
        self.create(lsp, mass, position, velocity, dynamic)
    }

    /// Creates a zero-mass, stationary object in `lsp`.
    pub fn create_empty(&mut self, lsp: LocalSpaceHandle, dynamic: bool) -> ObjectHandle {
        self.create(lsp, 0.0, Vector3::zeros(), Vector3::zeros(), dynamic)
    }

    /// Destroys `obj`, reparenting its children into its own parent local
    /// space with their absolute position/velocity preserved.
    pub fn destroy(&mut self, obj: ObjectHandle) {
        debug_assert!(!obj.is_null(), "invalid node");

        let parent_lsp = obj.parent_lsp(self);
        let obj_state = self.objects.get(obj.id()).state;

        let mut lspaces = Vec::new();
        obj.get_local_spaces(self, &mut lspaces);
        for lsp in lspaces {
            let rescaling_factor = lsp.local_space(self).radius;
            let mut local_objs = Vec::new();
            lsp.get_local_objects(self, &mut local_objs);
            for local_obj in local_objs {
                {
                    let state = &mut self.objects.get_mut(local_obj.id()).state;
                    state.position = state.position * rescaling_factor + obj_state.position;
                    state.velocity = state.velocity * rescaling_factor as f64 + obj_state.velocity;
                }
                self.tree.move_node(local_obj.id(), parent_lsp.id());

                compute_state_validity(self, local_obj);
                try_compute_attributes(self, local_obj);
                subtree_cascade_attribute_changes(self, local_obj.id());
            }
        }

        remove_object_node(self, obj);
    }

    /// Removes `lsp`, promoting every object it hosts to the next-higher
    /// local space with absolute state preserved.
    pub fn collapse_local_space(&mut self, lsp: LocalSpaceHandle) {
        collapse_local_space(self, lsp);
    }

    /// Fallible counterpart to [`Context::destroy`] for callers at a library
    /// boundary where a null or root handle should be a catchable
    /// [`crate::error::Error`] rather than a `debug_assert!` failure.
    pub fn try_destroy(&mut self, obj: ObjectHandle) -> crate::error::Result<()> {
        if obj.is_null() {
            return Err(crate::error::Error::NullHandle);
        }
        if obj.is_root() {
            return Err(crate::error::Error::RootMutation);
        }
        self.destroy(obj);
        Ok(())
    }

    /// Fallible counterpart to [`Context::collapse_local_space`].
    pub fn try_collapse_local_space(&mut self, lsp: LocalSpaceHandle) -> crate::error::Result<()> {
        if lsp.is_null() {
            return Err(crate::error::Error::NullHandle);
        }
        if lsp.is_root() {
            return Err(crate::error::Error::RootMutation);
        }
        self.collapse_local_space(lsp);
        Ok(())
    }

    /// Advances every queued object whose update timer has elapsed, then
    /// subtracts `dt` from every queued timer. See the crate docs for the
    /// per-object stepping algorithm.
    pub fn on_update(&mut self, dt: f64) {
        crate::integrate::on_update(self, dt);
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

pub(crate) fn new_object_node(ctx: &mut Context, parent: LocalSpaceHandle) -> ObjectHandle {
    let id = ctx.tree.new_child(parent.id());
    ctx.objects.add(id);
    ctx.elements.add(id);
    ObjectHandle::new(ctx, id)
}

pub(crate) fn remove_object_node(ctx: &mut Context, obj: ObjectHandle) {
    ctx.objects.remove(obj.id());
    ctx.elements.remove(obj.id());
    ctx.dynamics.try_remove(obj.id());
    ctx.tree.remove(obj.id());
}

pub(crate) fn new_local_space_node(ctx: &mut Context, parent: ObjectHandle, radius: f32) -> LocalSpaceHandle {
    let id = ctx.tree.new_child(parent.id());
    ctx.local_spaces.add(id).radius = 1.0;
    let lsp = LocalSpaceHandle::new(ctx, id);
    crate::kinematics::set_radius_impl(ctx, lsp, radius);
    lsp
}

pub(crate) fn remove_local_space_node(ctx: &mut Context, lsp: LocalSpaceHandle) {
    ctx.local_spaces.remove(lsp.id());
    ctx.tree.remove(lsp.id());
}

pub(crate) fn collapse_local_space(ctx: &mut Context, lsp: LocalSpaceHandle) {
    let mut objs = Vec::new();
    lsp.get_local_objects(ctx, &mut objs);
    for obj in objs {
        crate::kinematics::promote(ctx, obj);
    }
    debug_assert_eq!(
        ctx.tree.get(lsp.id()).first_child,
        crate::arena::NULL_ID,
        "failed to remove all children before collapsing local space"
    );
    remove_local_space_node(ctx, lsp);
}

fn valid_parent(ctx: &Context, obj: ObjectHandle) -> bool {
    if obj.is_root() {
        return true;
    }
    if ctx.local_spaces.get(ROOT_LSP_ID).meters_per_radius > 0.0 {
        return obj.parent_obj(ctx).object(ctx).validity == Validity::Valid;
    }
    Log::warn("root scaling has not been set");
    false
}

fn valid_mass(ctx: &Context, obj: ObjectHandle) -> bool {
    let mass = obj.object(ctx).state.mass;
    let mut valid = mass > 0.0;
    if !obj.is_root() {
        let primary_mass = obj.primary_obj(ctx).object(ctx).state.mass;
        valid = valid && crate::consts::MAX_COG > mass / (mass + primary_mass);
    }
    valid
}

fn valid_position(ctx: &Context, obj: ObjectHandle) -> bool {
    if obj.is_root() {
        return true;
    }
    let escape_distance2 = crate::consts::LOCAL_SPACE_ESCAPE_RADIUS * crate::consts::LOCAL_SPACE_ESCAPE_RADIUS;
    let pos_mag2 = obj.object(ctx).state.position.norm_squared();
    let pos_from_primary_mag2 = obj.local_position_from_primary(ctx).norm_squared();
    pos_mag2 < escape_distance2 && pos_from_primary_mag2 > 0.0
}

/// Re-evaluates `obj`'s [`Validity`] from its parent, mass, and position, in
/// that order, and stores the first failing check. Returns whether the
/// result is `Valid`.
pub(crate) fn compute_state_validity(ctx: &mut Context, obj: ObjectHandle) -> bool {
    let validity = if !valid_parent(ctx, obj) {
        Validity::InvalidParent
    } else if !valid_mass(ctx, obj) {
        Validity::InvalidMass
    } else if !valid_position(ctx, obj) {
        Validity::InvalidPosition
    } else {
        Validity::Valid
    };
    ctx.objects.get_mut(obj.id()).validity = validity;
    validity == Validity::Valid
}

pub(crate) fn compute_obj_dt(velocity_magnitude: f64, min_dt: f64) -> f64 {
    if velocity_magnitude > 0.0 {
        (MAX_UPDATE_DISTANCE / velocity_magnitude).max(min_dt)
    } else {
        min_dt
    }
}

/// Recomputes `obj`'s derived attributes (elements, dynamics, influence) if
/// its validity allows it, updates its place in the update queue, and picks
/// its integration method for the next step. A no-op for objects that are
/// not `Valid` or `InvalidPath` (and for the root, which has none of these
/// attributes).
pub(crate) fn try_compute_attributes(ctx: &mut Context, obj: ObjectHandle) {
    crate::queue::safe_remove(ctx, obj);

    let validity = ctx.objects.get(obj.id()).validity;
    if obj.is_root() || !matches!(validity, Validity::Valid | Validity::InvalidPath) {
        return;
    }

    crate::elements::compute(ctx, obj);
    crate::dynamics::compute_dynamics(ctx, obj);
    crate::dynamics::compute_influence(ctx, obj);

    if ctx.objects.get(obj.id()).validity != Validity::Valid {
        return;
    }

    crate::queue::push_front(ctx, obj);

    let velocity_mag = ctx.objects.get(obj.id()).state.velocity.norm();
    let prev_dt = compute_obj_dt(velocity_mag, DEFAULT_MIN_DT);
    ctx.objects.get_mut(obj.id()).integration.prev_dt = prev_dt;

    let position_from_primary = obj.local_position_from_primary(ctx);
    let pos_mag2 = position_from_primary.norm_squared();
    let h = obj.elements(ctx).h;
    let delta_true_anomaly = (prev_dt * h / pos_mag2 as f64) as f32;
    ctx.objects.get_mut(obj.id()).integration.delta_true_anomaly = delta_true_anomaly;

    if delta_true_anomaly > MIN_UPDATE_TRUE_ANOMALY {
        ctx.objects.get_mut(obj.id()).integration.method = IntegrationMethod::Angular;
    } else {
        let pos_dir = position_from_primary / pos_mag2.sqrt();
        let grav = obj.elements(ctx).grav;
        let mut acceleration = -pos_dir.cast::<f64>() * grav / pos_mag2 as f64;
        if obj.is_dynamic(ctx) {
            acceleration += obj.dynamics(ctx).continuous_acceleration;
        }
        ctx.objects.get_mut(obj.id()).state.acceleration = acceleration;
        ctx.objects.get_mut(obj.id()).integration.method = IntegrationMethod::Linear;
    }
}

/// Re-runs [`compute_state_validity`] and [`try_compute_attributes`] on
/// every object (not local space) in the subtree rooted at `root_id`,
/// exclusive. Relies on [`Tree::get_subtree`]'s non-decreasing depth order
/// to converge in one pass: a parent's new validity is always computed
/// before its children re-derive theirs.
pub(crate) fn subtree_cascade_attribute_changes(ctx: &mut Context, root_id: Id) {
    let mut subtree = Vec::new();
    ctx.tree.get_subtree(root_id, &mut subtree);
    for id in subtree {
        if ctx.tree.height(id) % 2 == 1 {
            continue;
        }
        let sub_obj = ObjectHandle::new(ctx, id);
        compute_state_validity(ctx, sub_obj);
        try_compute_attributes(ctx, sub_obj);
    }
}

impl ObjectHandle {
    pub fn set_local_space(self, ctx: &mut Context, new_lsp: LocalSpaceHandle) {
        debug_assert!(!self.is_root() && !self.is_null() && !new_lsp.is_null(), "invalid nodes");

        ctx.tree.move_node(self.id(), new_lsp.id());

        compute_state_validity(ctx, self);
        try_compute_attributes(ctx, self);
        subtree_cascade_attribute_changes(ctx, self.id());
    }

    pub fn set_mass(self, ctx: &mut Context, mass: f64) {
        ctx.objects.get_mut(self.id()).state.mass = mass;

        compute_state_validity(ctx, self);
        try_compute_attributes(ctx, self);
        subtree_cascade_attribute_changes(ctx, self.id());
    }

    pub fn set_position(self, ctx: &mut Context, position: Vector3<f32>) {
        debug_assert!(!self.is_null() && !self.is_root(), "cannot set position of root or null object");

        ctx.objects.get_mut(self.id()).state.position = position;

        compute_state_validity(ctx, self);
        try_compute_attributes(ctx, self);
        subtree_cascade_attribute_changes(ctx, self.id());
    }

    /// Sets velocity. Deliberately does not re-run `compute_state_validity`
    /// - velocity has no validity rule of its own - matching every other
    /// setter's cascade except that one step.
    pub fn set_velocity(self, ctx: &mut Context, velocity: nalgebra::Vector3<f64>) {
        debug_assert!(!self.is_null() && !self.is_root(), "cannot set velocity of root or null object");

        ctx.objects.get_mut(self.id()).state.velocity = velocity;

        try_compute_attributes(ctx, self);
        subtree_cascade_attribute_changes(ctx, self.id());
    }

    /// Velocity for a circular orbit around this object's current primary,
    /// at its current position.
    pub fn circular_orbit_velocity(self, ctx: &Context) -> nalgebra::Vector3<f64> {
        let lsp = self.parent_lsp(ctx);
        let position = ctx.objects.get(self.id()).state.position;
        crate::elements::circular_orbit_velocity(ctx, lsp, position)
    }

    pub fn set_dynamic(self, ctx: &mut Context, dynamic: bool) {
        debug_assert!(!self.is_root(), "cannot set root object dynamics");

        if dynamic {
            ctx.dynamics.get_or_add(self.id());
        } else {
            ctx.dynamics.try_remove(self.id());
        }

        compute_state_validity(ctx, self);
        try_compute_attributes(ctx, self);
    }

    pub fn add_local_space(self, ctx: &mut Context, radius: f32) -> LocalSpaceHandle {
        new_local_space_node(ctx, self, radius)
    }

    pub fn add_default_local_space(self, ctx: &mut Context) -> LocalSpaceHandle {
        self.add_local_space(ctx, crate::consts::DEFAULT_LSPACE_RADIUS)
    }

    /// Fallible counterpart to [`ObjectHandle::set_mass`]: the root object's
    /// mass can only be set through [`Context`] at construction, matching
    /// spec.md's treatment of the root as a fixed, unparented primary.
    pub fn try_set_mass(self, ctx: &mut Context, mass: f64) -> crate::error::Result<()> {
        if self.is_null() {
            return Err(crate::error::Error::NullHandle);
        }
        if self.is_root() {
            return Err(crate::error::Error::RootMutation);
        }
        self.set_mass(ctx, mass);
        Ok(())
    }

    /// Fallible counterpart to [`ObjectHandle::set_position`].
    pub fn try_set_position(self, ctx: &mut Context, position: Vector3<f32>) -> crate::error::Result<()> {
        if self.is_null() {
            return Err(crate::error::Error::NullHandle);
        }
        if self.is_root() {
            return Err(crate::error::Error::RootMutation);
        }
        self.set_position(ctx, position);
        Ok(())
    }

    /// Fallible counterpart to [`ObjectHandle::set_velocity`].
    pub fn try_set_velocity(self, ctx: &mut Context, velocity: nalgebra::Vector3<f64>) -> crate::error::Result<()> {
        if self.is_null() {
            return Err(crate::error::Error::NullHandle);
        }
        if self.is_root() {
            return Err(crate::error::Error::RootMutation);
        }
        self.set_velocity(ctx, velocity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_root_object_and_local_space() {
        let ctx = Context::new();
        assert!(ctx.has(ROOT_OBJ_ID));
        assert!(ctx.has(ROOT_LSP_ID));
        assert_eq!(ctx.tree.height(ROOT_OBJ_ID), 0);
        assert_eq!(ctx.tree.height(ROOT_LSP_ID), 1);
    }

    #[test]
    fn objects_are_invalid_parent_until_root_scaling_is_set() {
        let mut ctx = Context::new();
        let root = ctx.get_root_local_space();
        let obj = ctx.create(root, 1.0, Vector3::new(0.5, 0.0, 0.0), Vector3::zeros(), false);
        assert_eq!(obj.object(&ctx).validity, Validity::InvalidParent);
    }

    #[test]
    fn try_setters_reject_the_root_object() {
        let mut ctx = Context::new();
        let root = ctx.get_root_object();
        assert_eq!(root.try_set_mass(&mut ctx, 1.0), Err(crate::error::Error::RootMutation));
        assert_eq!(
            root.try_set_position(&mut ctx, Vector3::new(1.0, 0.0, 0.0)),
            Err(crate::error::Error::RootMutation)
        );
        assert_eq!(root.try_set_velocity(&mut ctx, Vector3::zeros()), Err(crate::error::Error::RootMutation));
    }

    #[test]
    fn try_setters_reject_a_null_handle() {
        let mut ctx = Context::new();
        assert_eq!(ObjectHandle::NULL.try_set_mass(&mut ctx, 1.0), Err(crate::error::Error::NullHandle));
    }

    #[test]
    fn try_destroy_and_try_collapse_reject_root_and_null_handles() {
        let mut ctx = Context::new();
        assert_eq!(ctx.try_destroy(ObjectHandle::NULL), Err(crate::error::Error::NullHandle));
        assert_eq!(ctx.try_destroy(ctx.get_root_object()), Err(crate::error::Error::RootMutation));
        assert_eq!(ctx.try_collapse_local_space(LocalSpaceHandle::NULL), Err(crate::error::Error::NullHandle));
        assert_eq!(
            ctx.try_collapse_local_space(ctx.get_root_local_space()),
            Err(crate::error::Error::RootMutation)
        );
    }

    #[test]
    fn static_circular_orbit_is_valid() {
        let mut ctx = Context::new();
        ctx.set_root_space_scaling(10.0);
        ctx.get_root_object().set_mass(&mut ctx, 1.0 / crate::consts::G_GRAVITATIONAL);
        let root = ctx.get_root_local_space();
        let obj = ctx.create_circular(root, 1e5, Vector3::new(0.9, 0.0, 0.0), false);
        assert_eq!(obj.object(&ctx).validity, Validity::Valid);
        assert_eq!(obj.elements(&ctx).orbit_type, crate::attributes::OrbitType::Circle);
    }
}
