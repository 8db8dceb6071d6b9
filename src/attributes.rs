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

//! Per-node attribute records. Every tree node carries at most one of each of
//! these, keyed by node id in the four `AttributeTable`s owned by [`crate::context::Context`].

use nalgebra::{UnitQuaternion, Vector2, Vector3};

use crate::handles::LocalSpaceHandle;

/// Outcome of evaluating an object's state against the validity rules in
/// `compute_state_validity`. Ordered the way the checks run: parent, then
/// mass, then position, then path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    InvalidParent,
    InvalidMass,
    InvalidPosition,
    InvalidPath,
    Valid,
}

/// The shape of the conic an object's state describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitType {
    Circle,
    Ellipse,
    Hyperbola,
}

/// Which stepper `on_update` should use for an object on its next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationMethod {
    Angular,
    Linear,
}

impl Default for Validity {
    fn default() -> Self {
        Validity::InvalidParent
    }
}

impl Default for OrbitType {
    fn default() -> Self {
        OrbitType::Circle
    }
}

impl Default for IntegrationMethod {
    fn default() -> Self {
        IntegrationMethod::Angular
    }
}

/// Instantaneous kinematic state of an object, in its parent local space's
/// units. Position is single-precision (local-space coordinates are
/// normalized to stay near unit scale); velocity, acceleration and mass are
/// double-precision, which matters for numerical stability at small radii.
#[derive(Debug, Clone, Copy, Default)]
pub struct State {
    pub mass: f64,
    pub position: Vector3<f32>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
}

/// Integration bookkeeping for one object: current method, adaptive
/// timestep, and the intrusive update-queue link (see [`crate::queue`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct Integration {
    pub method: IntegrationMethod,
    pub prev_dt: f64,
    pub update_timer: f64,
    pub delta_true_anomaly: f32,
    pub update_next: u32,
}

/// Per-object attribute record: state, integration bookkeeping, validity, and
/// (if the object is massive enough) a handle to its sphere of influence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Object {
    pub validity: Validity,
    pub state: State,
    pub integration: Integration,
    pub influence: LocalSpaceHandle,
}

/// Per-local-space attribute record.
#[derive(Debug, Clone, Copy)]
pub struct LocalSpace {
    /// Radius measured in the parent's local-space units. Must lie in
    /// `[kMinLSpaceRadius, kMaxLSpaceRadius]` outside of construction.
    pub radius: f32,
    /// Physical scale: meters per unit-radius of this local space.
    pub meters_per_radius: f64,
    /// The nearest ancestor (or self) local space whose parent object is the
    /// locally dominant source of gravity.
    pub primary: LocalSpaceHandle,
}

impl Default for LocalSpace {
    fn default() -> Self {
        Self {
            radius: 0.0,
            meters_per_radius: 0.0,
            primary: LocalSpaceHandle::NULL,
        }
    }
}

/// Keplerian elements derived from an object's instantaneous state. Present
/// on every non-root object.
#[derive(Debug, Clone, Copy)]
pub struct Elements {
    /// Gravitational parameter of the primary, `mu = G * M`.
    pub grav: f64,
    /// Specific angular momentum, `|r x v|`.
    pub h: f64,
    pub e: f32,
    pub orbit_type: OrbitType,
    /// Semi-latus rectum, `h^2 / mu`.
    pub p: f32,
    /// `mu / h`, the constant factor of orbital velocity.
    pub v_constant: f64,
    pub inclination: f32,
    /// Direction of the ascending node.
    pub ascending_node: Vector3<f32>,
    pub raan: f32,
    pub arg_periapsis: f32,
    pub perifocal_x: Vector3<f32>,
    pub perifocal_y: Vector3<f32>,
    pub perifocal_normal: Vector3<f32>,
    pub perifocal_orientation: UnitQuaternion<f64>,
    pub true_anomaly: f32,
    pub semi_major: f32,
    pub semi_minor: f32,
    /// Signed distance from the occupied focus to the orbit's center, along
    /// the perifocal X axis.
    pub center_offset: f32,
    /// Orbit period, in seconds; meaningless (and left at zero) for
    /// hyperbolic orbits.
    pub period: f64,
}

impl Default for Elements {
    fn default() -> Self {
        Self {
            grav: 0.0,
            h: 0.0,
            e: 0.0,
            orbit_type: OrbitType::Circle,
            p: 0.0,
            v_constant: 0.0,
            inclination: 0.0,
            ascending_node: Vector3::zeros(),
            raan: 0.0,
            arg_periapsis: 0.0,
            perifocal_x: Vector3::zeros(),
            perifocal_y: Vector3::zeros(),
            perifocal_normal: Vector3::zeros(),
            perifocal_orientation: UnitQuaternion::identity(),
            true_anomaly: 0.0,
            semi_major: 0.0,
            semi_minor: 0.0,
            center_offset: 0.0,
            period: 0.0,
        }
    }
}

/// Escape/entry geometry and continuous thrust, present only on objects
/// marked dynamic via [`crate::handles::ObjectHandle::set_dynamic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Dynamics {
    /// True anomaly at which orbital radius first equals the local-space
    /// escape radius; zero if the orbit never escapes.
    pub escape_true_anomaly: f32,
    pub escape_point: Vector3<f32>,
    /// Mirror of `escape_point` across the perifocal X axis.
    pub entry_point: Vector3<f32>,
    pub escape_point_perifocal: Vector2<f32>,
    /// Acceleration assumed constant between integration steps.
    pub continuous_acceleration: Vector3<f64>,
}

impl Dynamics {
    pub fn is_continuously_accelerating(&self) -> bool {
        !self.continuous_acceleration.iter().all(|c| *c == 0.0)
    }
}
