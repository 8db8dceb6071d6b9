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

//! A hierarchical two-body orbital mechanics simulator.
//!
//! A [`Context`] owns a tree of alternating **objects** and **local spaces**
//! (spheres of influence): every object orbits the locally dominant primary
//! of the local space it occupies, and local spaces nest inside the objects
//! massive enough to hold one. [`Context::on_update`] steps every object
//! along its Keplerian orbit, promoting and demoting objects between local
//! spaces as they cross sphere-of-influence boundaries.
//!
//! Each object sees only its own dominant primary - there is no N-body
//! gravitational interaction, collision detection, relativistic correction,
//! persistence, or threading. The crate is single-threaded by contract: a
//! [`Context`] and every handle borrowed from it are meant to live on one
//! thread for their whole lifetime.
//!
//! ```
//! use orbital_physics::Context;
//! use nalgebra::Vector3;
//!
//! let mut ctx = Context::new();
//! ctx.set_root_space_scaling(1.0e10);
//! ctx.get_root_object().set_mass(&mut ctx, 1.0e29);
//!
//! let root = ctx.get_root_local_space();
//! let planet = ctx.create_circular(root, 1.0e24, Vector3::new(0.5, 0.0, 0.0), false);
//! assert_eq!(planet.object(&ctx).validity, orbital_physics::Validity::Valid);
//!
//! ctx.on_update(1.0 / 60.0);
//! ```

pub mod arena;
pub mod attributes;
pub mod consts;
pub mod context;
pub mod dynamics;
pub mod elements;
pub mod error;
pub mod handles;
mod integrate;
pub mod kinematics;
pub mod log;
pub mod queue;
pub mod tree;

pub use attributes::{IntegrationMethod, OrbitType, Validity};
pub use context::Context;
pub use error::{Error, Result};
pub use handles::{LocalSpaceHandle, ObjectHandle};
