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

//! Index-keyed, recycling storage. No generation counter: unlike a
//! [generational arena](https://crates.io/crates/generational-arena), an [`Id`]
//! is only meaningful until the slot it names is erased, same as the rest of
//! this crate's single-threaded, caller-trusted contract (see the crate docs).

use std::collections::HashMap;
use std::hash::Hash;

/// An index into an [`Arena`]. Stable until the slot is erased, after which it
/// may be handed out again for an unrelated value.
pub type Id = u32;

/// Sentinel for "no id" - the maximum representable index.
pub const NULL_ID: Id = u32::MAX;

/// Dynamic array-based storage intended for efficient re-use of allocated
/// memory: freed slots are pushed onto a free list and handed back out by
/// [`Arena::new_slot`] before the backing vector grows.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
    free: Vec<Id>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T: Default> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of in-use items (total storage minus recycled slots).
    pub fn len(&self) -> usize {
        self.items.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has(&self, id: Id) -> bool {
        (id as usize) < self.items.len() && !self.free.contains(&id)
    }

    /// Allocates a new, default-valued slot and returns its id: re-uses a
    /// recycled slot if one exists, otherwise grows the backing vector.
    pub fn new_slot(&mut self) -> Id {
        if let Some(id) = self.free.pop() {
            id
        } else {
            let id = self.items.len() as Id;
            self.items.push(T::default());
            id
        }
    }

    pub fn get(&self, id: Id) -> &T {
        debug_assert!(self.has(id), "invalid arena id");
        &self.items[id as usize]
    }

    pub fn get_mut(&mut self, id: Id) -> &mut T {
        debug_assert!(self.has(id), "invalid arena id");
        &mut self.items[id as usize]
    }

    /// Resets the slot to its default value and returns it to the free list.
    pub fn erase(&mut self, id: Id) {
        debug_assert!(self.has(id), "invalid arena id");
        self.items[id as usize] = T::default();
        self.free.push(id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.free.clear();
    }
}

impl<T: Default> std::ops::Index<Id> for Arena<T> {
    type Output = T;
    fn index(&self, id: Id) -> &T {
        self.get(id)
    }
}

impl<T: Default> std::ops::IndexMut<Id> for Arena<T> {
    fn index_mut(&mut self, id: Id) -> &mut T {
        self.get_mut(id)
    }
}

/// A sparse mapping from an external key (usually a tree [`Id`]) to an
/// attribute record, backed by an [`Arena`]. Mirrors the role of
/// `AttributeStorage<TAttr>` sitting alongside the hierarchy tree: the tree
/// owns node identity, attribute tables attach optional payloads to it.
#[derive(Debug, Clone)]
pub struct AttributeTable<K, T> {
    arena: Arena<T>,
    index: HashMap<K, Id>,
}

impl<K: Eq + Hash + Copy, T: Default> Default for AttributeTable<K, T> {
    fn default() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy, T: Default> AttributeTable<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    /// Attaches a new, default-valued record to `key`.
    pub fn add(&mut self, key: K) -> &mut T {
        debug_assert!(!self.index.contains_key(&key), "key already has an attribute");
        let id = self.arena.new_slot();
        self.index.insert(key, id);
        self.arena.get_mut(id)
    }

    pub fn get(&self, key: K) -> &T {
        let id = *self
            .index
            .get(&key)
            .expect("key is missing requested attribute");
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, key: K) -> &mut T {
        let id = *self
            .index
            .get(&key)
            .expect("key is missing requested attribute");
        self.arena.get_mut(id)
    }

    /// Returns the existing record for `key`, adding a default one first if
    /// none exists yet.
    pub fn get_or_add(&mut self, key: K) -> &mut T {
        if !self.index.contains_key(&key) {
            self.add(key);
        }
        self.get_mut(key)
    }

    pub fn remove(&mut self, key: K) {
        let id = self
            .index
            .remove(&key)
            .expect("key does not have the attribute to remove");
        self.arena.erase(id);
    }

    /// Removes the record for `key` if present; a no-op otherwise.
    pub fn try_remove(&mut self, key: K) {
        if let Some(id) = self.index.remove(&key) {
            self.arena.erase(id);
        }
    }
}

impl<K: Eq + Hash + Copy, T: Default> std::ops::Index<K> for AttributeTable<K, T> {
    type Output = T;
    fn index(&self, key: K) -> &T {
        self.get(key)
    }
}

impl<K: Eq + Hash + Copy, T: Default> std::ops::IndexMut<K> for AttributeTable<K, T> {
    fn index_mut(&mut self, key: K) -> &mut T {
        self.get_mut(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, PartialEq, Debug)]
    struct Payload(u32);

    #[test]
    fn recycles_erased_slots() {
        let mut arena: Arena<Payload> = Arena::new();
        let a = arena.new_slot();
        *arena.get_mut(a) = Payload(1);
        let b = arena.new_slot();
        assert_ne!(a, b);
        arena.erase(a);
        assert!(!arena.has(a));
        let c = arena.new_slot();
        assert_eq!(a, c, "erased slot should be reused before growing");
        assert_eq!(*arena.get(c), Payload::default());
    }

    #[test]
    fn len_excludes_free_slots() {
        let mut arena: Arena<Payload> = Arena::new();
        let a = arena.new_slot();
        let _b = arena.new_slot();
        assert_eq!(arena.len(), 2);
        arena.erase(a);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn attribute_table_add_get_remove() {
        let mut table: AttributeTable<u32, Payload> = AttributeTable::new();
        assert!(!table.has(5));
        table.add(5).0 = 42;
        assert!(table.has(5));
        assert_eq!(table.get(5).0, 42);
        table.remove(5);
        assert!(!table.has(5));
    }

    #[test]
    fn attribute_table_get_or_add() {
        let mut table: AttributeTable<u32, Payload> = AttributeTable::new();
        table.get_or_add(1).0 += 1;
        table.get_or_add(1).0 += 1;
        assert_eq!(table.get(1).0, 2);
    }
}
