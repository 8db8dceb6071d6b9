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

//! Recoverable, caller-facing errors. Internal invariants (a handle naming a
//! node of the wrong kind, a queue link pointing nowhere) stay `debug_assert!`
//! - those indicate a bug in this crate or a caller ignoring a handle's
//! lifetime, not a condition a caller should be asked to branch on.

/// Errors a [`crate::context::Context`] mutation can fail with.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A handle required to be non-null was null.
    #[error("operation requires a non-null handle")]
    NullHandle,

    /// An operation that only makes sense on a non-root node was asked to
    /// run on the root object or root local space.
    #[error("root node cannot be modified this way")]
    RootMutation,

    /// [`crate::handles::LocalSpaceHandle::try_set_radius`] was asked to
    /// resize a local space outside `[MIN_LSPACE_RADIUS, MAX_LSPACE_RADIUS]`,
    /// or one that is currently its object's sphere of influence - whose
    /// size is owned by [`crate::dynamics::compute_influence`], not the
    /// caller.
    #[error("radius is out of range, or this local space is a sphere of influence")]
    ShrinkSphereOfInfluence,
}

pub type Result<T> = std::result::Result<T, Error>;
