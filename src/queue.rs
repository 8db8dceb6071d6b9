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

//! The intrusive, priority-ordered update queue: a singly-linked list
//! through `Object::integration::update_next`, kept sorted by
//! `update_timer` ascending. Membership is exactly the set of `Valid`,
//! non-root objects - see [`crate::context::try_compute_attributes`].

use crate::context::Context;
use crate::handles::ObjectHandle;

/// Inserts `obj` at the head of the queue in O(1).
pub(crate) fn push_front(ctx: &mut Context, obj: ObjectHandle) {
    let old_front = ctx.update_queue_front;
    ctx.objects.get_mut(obj.id()).integration.update_next = old_front.id();
    ctx.update_queue_front = obj;
}

/// Unlinks `obj` from the queue. `obj` must currently be in the queue.
pub(crate) fn remove(ctx: &mut Context, obj: ObjectHandle) {
    debug_assert!(!ctx.update_queue_front.is_null(), "attempting to remove from an empty queue");

    if ctx.update_queue_front == obj {
        let next = ctx.objects.get(obj.id()).integration.update_next;
        ctx.update_queue_front = ObjectHandle::new(ctx, next);
        ctx.objects.get_mut(obj.id()).integration.update_next = crate::arena::NULL_ID;
        return;
    }

    let mut item = ctx.update_queue_front;
    let mut next_id = ctx.objects.get(item.id()).integration.update_next;
    while next_id != obj.id() {
        debug_assert!(next_id != crate::arena::NULL_ID, "object not found in update queue");
        item = ObjectHandle::new(ctx, next_id);
        next_id = ctx.objects.get(item.id()).integration.update_next;
    }
    let obj_next = ctx.objects.get(obj.id()).integration.update_next;
    ctx.objects.get_mut(item.id()).integration.update_next = obj_next;
    ctx.objects.get_mut(obj.id()).integration.update_next = crate::arena::NULL_ID;
}

/// Removes `obj` from the queue if present. Returns whether it was found.
pub(crate) fn safe_remove(ctx: &mut Context, obj: ObjectHandle) -> bool {
    if ctx.update_queue_front.is_null() {
        return false;
    }
    if ctx.update_queue_front == obj {
        let next = ctx.objects.get(obj.id()).integration.update_next;
        ctx.update_queue_front = ObjectHandle::new(ctx, next);
        ctx.objects.get_mut(obj.id()).integration.update_next = crate::arena::NULL_ID;
        return true;
    }

    let mut item = ctx.update_queue_front;
    let mut next_id = ctx.objects.get(item.id()).integration.update_next;
    while next_id != crate::arena::NULL_ID {
        if next_id == obj.id() {
            let obj_next = ctx.objects.get(obj.id()).integration.update_next;
            ctx.objects.get_mut(item.id()).integration.update_next = obj_next;
            ctx.objects.get_mut(obj.id()).integration.update_next = crate::arena::NULL_ID;
            return true;
        }
        item = ObjectHandle::new(ctx, next_id);
        next_id = ctx.objects.get(item.id()).integration.update_next;
    }
    false
}

/// Bubbles the head element backward until `update_timer` order is
/// restored. Assumes only the head may be out of order.
pub(crate) fn sort_front(ctx: &mut Context) {
    debug_assert!(!ctx.update_queue_front.is_null(), "attempting to sort an empty queue");

    let obj = ctx.update_queue_front;
    let timer = ctx.objects.get(obj.id()).integration.update_timer;

    let next_id = ctx.objects.get(obj.id()).integration.update_next;
    if next_id == crate::arena::NULL_ID {
        return;
    }
    if timer < ctx.objects.get(next_id).integration.update_timer {
        return;
    }
    ctx.update_queue_front = ObjectHandle::new(ctx, next_id);

    let mut item_id = next_id;
    let mut next_next_id = ctx.objects.get(next_id).integration.update_next;
    while next_next_id != crate::arena::NULL_ID {
        if timer < ctx.objects.get(next_next_id).integration.update_timer {
            break;
        }
        item_id = next_next_id;
        next_next_id = ctx.objects.get(next_next_id).integration.update_next;
    }

    ctx.objects.get_mut(item_id).integration.update_next = obj.id();
    ctx.objects.get_mut(obj.id()).integration.update_next = next_next_id;
}
