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

//! Intrusive parent/first-child/sibling tree over [`Arena`] indices.
//!
//! Every node has an optional parent, an ordered list of siblings, and an
//! optional first child. The tree can be empty; the first call to
//! [`Tree::new_root`] creates the single height-0 node, and every other node
//! is created with [`Tree::new_child`].

use crate::arena::{Arena, Id, NULL_ID};

/// Links describing one node's position in the tree. `Id` fields are
/// [`NULL_ID`] when absent.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub parent: Id,
    pub next_sibling: Id,
    pub prev_sibling: Id,
    pub first_child: Id,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            parent: NULL_ID,
            next_sibling: NULL_ID,
            prev_sibling: NULL_ID,
            first_child: NULL_ID,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Arena<Node>,
    heights: Vec<i32>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has(&self, id: Id) -> bool {
        self.nodes.has(id)
    }

    /// Creates the tree's single height-0 node (or recreates it after a full
    /// [`Tree::clear`]).
    pub fn new_root(&mut self) -> Id {
        let id = self.new_slot();
        self.heights[id as usize] = 0;
        id
    }

    /// Creates a new node parented to `parent_id`, which must already exist.
    pub fn new_child(&mut self, parent_id: Id) -> Id {
        debug_assert!(self.has(parent_id), "invalid parent id");
        let id = self.new_slot();
        self.attach(id, parent_id);
        id
    }

    pub fn get(&self, id: Id) -> &Node {
        self.nodes.get(id)
    }

    pub fn height(&self, id: Id) -> i32 {
        debug_assert!(self.has(id), "invalid node id");
        self.heights[id as usize]
    }

    /// Removes a node and its whole subtree. Removing the root clears the
    /// tree entirely.
    pub fn remove(&mut self, id: Id) {
        if self.heights[id as usize] == 0 {
            self.clear();
        } else {
            self.detach(id);
            self.recycle_subtree(id);
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.heights.clear();
    }

    /// Moves `id` (with its whole subtree, unaffected by the move itself) to
    /// be a child of `new_parent_id`.
    pub fn move_node(&mut self, id: Id, new_parent_id: Id) {
        self.detach(id);
        self.attach(id, new_parent_id);
    }

    pub fn swap_with_prev_sibling(&mut self, id: Id) {
        let node = *self.nodes.get(id);
        debug_assert!(self.has(node.prev_sibling), "node has no previous sibling");
        let prev = *self.nodes.get(node.prev_sibling);

        if self.nodes.get(node.parent).first_child == node.prev_sibling {
            self.nodes.get_mut(node.parent).first_child = id;
        }
        if self.has(prev.prev_sibling) {
            self.nodes.get_mut(prev.prev_sibling).next_sibling = id;
        }
        if self.has(node.next_sibling) {
            self.nodes.get_mut(node.next_sibling).prev_sibling = node.prev_sibling;
        }
        self.nodes.get_mut(node.prev_sibling).next_sibling = node.next_sibling;
        let n = self.nodes.get_mut(id);
        n.next_sibling = node.prev_sibling;
        n.prev_sibling = prev.prev_sibling;
        self.nodes.get_mut(node.prev_sibling).prev_sibling = id;
    }

    pub fn swap_with_next_sibling(&mut self, id: Id) {
        let node = *self.nodes.get(id);
        debug_assert!(self.has(node.next_sibling), "node has no next sibling");
        let next = *self.nodes.get(node.next_sibling);

        if self.nodes.get(node.parent).first_child == id {
            self.nodes.get_mut(node.parent).first_child = node.next_sibling;
        }
        if self.has(next.next_sibling) {
            self.nodes.get_mut(next.next_sibling).prev_sibling = id;
        }
        if self.has(node.prev_sibling) {
            self.nodes.get_mut(node.prev_sibling).next_sibling = node.next_sibling;
        }
        self.nodes.get_mut(node.next_sibling).prev_sibling = node.prev_sibling;
        let n = self.nodes.get_mut(id);
        n.prev_sibling = node.next_sibling;
        n.next_sibling = next.next_sibling;
        self.nodes.get_mut(node.next_sibling).next_sibling = id;
    }

    /// Appends `id`'s direct children to `out` and returns how many were
    /// added.
    pub fn get_children(&self, id: Id, out: &mut Vec<Id>) -> usize {
        let mut count = 0;
        let mut child = self.nodes.get(id).first_child;
        while self.has(child) {
            count += 1;
            out.push(child);
            child = self.nodes.get(child).next_sibling;
        }
        count
    }

    /// Enumerates the subtree rooted at `id` (exclusive), level by level:
    /// children first, then their children, and so on. Later passes
    /// (`subtree_cascade_attribute_changes`) rely on this non-decreasing
    /// depth order to converge in a single pass, so preserve it exactly.
    pub fn get_subtree(&self, id: Id, out: &mut Vec<Id>) -> usize {
        let mut added = self.get_children(id, out);
        let mut total = added;
        while added > 0 {
            let end = out.len();
            let mut idx = end - added;
            added = 0;
            while idx < end {
                added += self.get_children(out[idx], out);
                idx += 1;
            }
            total += added;
        }
        total
    }

    pub fn parent(&self, id: Id) -> Id {
        debug_assert!(self.has(id), "invalid node id");
        debug_assert!(self.heights[id as usize] > 0, "root node has no parent");
        self.nodes.get(id).parent
    }

    pub fn grandparent(&self, id: Id) -> Id {
        debug_assert!(self.has(id), "invalid node id");
        debug_assert!(self.heights[id as usize] > 1, "node has no grandparent");
        self.nodes.get(self.nodes.get(id).parent).parent
    }

    fn new_slot(&mut self) -> Id {
        let id = self.nodes.new_slot();
        if id as usize >= self.heights.len() {
            self.heights.push(-1);
        }
        id
    }

    fn recycle_subtree(&mut self, root_id: Id) {
        debug_assert!(self.has(root_id), "invalid root node id");
        let mut child_id = self.nodes.get(root_id).first_child;
        // Mirrors the original traversal: advance to the next sibling before
        // recycling the one just left behind, rather than the more obvious
        // "recycle then advance". Terminates because each step recycles the
        // sibling the loop variable just vacated, and a recycled node can no
        // longer be reached as anyone's `next_sibling`.
        while self.has(child_id) {
            let recycle = child_id;
            child_id = self.nodes.get(child_id).next_sibling;
            self.recycle_subtree(recycle);
        }
        self.heights[root_id as usize] = -1;
        self.nodes.erase(root_id);
    }

    fn attach(&mut self, id: Id, parent_id: Id) {
        let first_child = self.nodes.get(parent_id).first_child;
        {
            let node = self.nodes.get_mut(id);
            node.parent = parent_id;
            if self.has(first_child) {
                node.next_sibling = first_child;
            }
        }
        if self.has(first_child) {
            self.nodes.get_mut(first_child).prev_sibling = id;
        }
        self.nodes.get_mut(parent_id).first_child = id;
        self.heights[id as usize] = self.heights[parent_id as usize] + 1;
    }

    fn detach(&mut self, id: Id) {
        let node = *self.nodes.get(id);
        if self.nodes.get(node.parent).first_child == id {
            self.nodes.get_mut(node.parent).first_child = node.next_sibling;
        }
        if self.has(node.next_sibling) {
            self.nodes.get_mut(node.next_sibling).prev_sibling = node.prev_sibling;
        }
        if self.has(node.prev_sibling) {
            self.nodes.get_mut(node.prev_sibling).next_sibling = node.next_sibling;
        }
        let n = self.nodes.get_mut(id);
        n.parent = NULL_ID;
        n.next_sibling = NULL_ID;
        n.prev_sibling = NULL_ID;
        self.heights[id as usize] = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_height_zero() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        assert_eq!(tree.height(root), 0);
    }

    #[test]
    fn children_increase_height_by_one() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let child = tree.new_child(root);
        let grandchild = tree.new_child(child);
        assert_eq!(tree.height(child), 1);
        assert_eq!(tree.height(grandchild), 2);
        assert_eq!(tree.parent(grandchild), child);
        assert_eq!(tree.grandparent(grandchild), root);
    }

    #[test]
    fn get_children_in_reverse_insertion_order() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let a = tree.new_child(root);
        let b = tree.new_child(root);
        let c = tree.new_child(root);
        let mut out = Vec::new();
        tree.get_children(root, &mut out);
        assert_eq!(out, vec![c, b, a]);
    }

    #[test]
    fn remove_subtree_recycles_all_descendants() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let a = tree.new_child(root);
        let b = tree.new_child(a);
        let c = tree.new_child(a);
        tree.remove(a);
        assert!(!tree.has(a));
        assert!(!tree.has(b));
        assert!(!tree.has(c));
        assert!(tree.has(root));
    }

    #[test]
    fn remove_root_clears_tree() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let _a = tree.new_child(root);
        tree.remove(root);
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn get_subtree_is_level_by_level() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let a = tree.new_child(root);
        let b = tree.new_child(root);
        let c = tree.new_child(a);
        let mut out = Vec::new();
        tree.get_subtree(root, &mut out);
        assert_eq!(out, vec![b, a, c]);
    }

    #[test]
    fn swap_with_next_then_prev_sibling_is_identity() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let a = tree.new_child(root);
        let b = tree.new_child(root);
        let mut out = Vec::new();
        tree.get_children(root, &mut out);
        assert_eq!(out, vec![b, a]);

        tree.swap_with_next_sibling(a);
        out.clear();
        tree.get_children(root, &mut out);
        assert_eq!(out, vec![a, b]);

        tree.swap_with_prev_sibling(a);
        out.clear();
        tree.get_children(root, &mut out);
        assert_eq!(out, vec![b, a]);
    }

    #[test]
    fn move_node_reparents_and_updates_height() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let a = tree.new_child(root);
        let b = tree.new_child(root);
        let c = tree.new_child(a);
        tree.move_node(c, b);
        assert_eq!(tree.parent(c), b);
        assert_eq!(tree.height(c), 2);
    }
}
