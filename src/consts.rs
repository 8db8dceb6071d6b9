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

//! Tuning constants. These are part of the public contract, not internal
//! knobs: changing one changes observable simulation behavior.

/// Newtonian gravitational constant, m^3 kg^-1 s^-2.
pub const G_GRAVITATIONAL: f64 = 6.6743e-11;

/// Radius assigned to a manually added local space unless the caller
/// specifies otherwise.
pub const DEFAULT_LSPACE_RADIUS: f32 = 0.1;

/// Radius, in a local space's own units, beyond which an orbit is considered
/// to have escaped that local space.
pub const LOCAL_SPACE_ESCAPE_RADIUS: f32 = 1.01;

/// Eccentricity below which an orbit is treated as circular.
pub const ECCENTRICITY_EPSILON: f32 = 1e-4;

pub const MAX_LSPACE_RADIUS: f32 = 0.2;
pub const MIN_LSPACE_RADIUS: f32 = 0.004;
pub const EPS_LSPACE_RADIUS: f32 = 1e-6;

/// Upper bound on how many times a single object may integrate within one
/// `on_update` call, via the `min_obj_dt` floor it implies.
pub const MAX_OBJECT_UPDATES: u32 = 20;

pub const DEFAULT_MIN_DT: f64 = 1.0 / (60.0 * 20.0);

/// Distance an object's position may move per linear-integration step before
/// `prev_dt` is shrunk to compensate.
pub const MAX_UPDATE_DISTANCE: f64 = 1e-6;

/// Below this per-step true-anomaly delta, the angular integrator switches
/// to Velocity-Verlet rather than risk stepping across an inflection in the
/// conic.
pub const MIN_UPDATE_TRUE_ANOMALY: f32 = 100.0 * f32::EPSILON;

/// Maximum tolerated offset of the shared center of gravity from the
/// primary, as a fraction of total mass (two-body assumption).
pub const MAX_COG: f64 = 1e-4;

/// Two unit vectors whose dot product magnitude exceeds this are treated as
/// parallel, to avoid degenerate cross products near axis singularities.
pub const PARALLEL_DOT_PRODUCT_LIMIT: f32 = 1.0 - 10.0 * f32::EPSILON;
