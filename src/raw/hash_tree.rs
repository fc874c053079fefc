use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;

use alloc::vec::Vec;

use super::index::{CHAIN_END, ChainIndex, NodeIndex};
use super::node::{Color, HashSlot, fingerprint_of};

// Table geometry. The hashable prefix takes 90% of the capacity; the
// remainder is collision overflow. Growth doubles the capacity.
const LOAD_FACTOR: f32 = 1.0;
const HASHABLE_RATIO: f32 = 0.9;
const GROWTH_MULTIPLE: usize = 2;

/// The hash-indexed red-black tree backing `HashFlatMap` and `HashFlatSet`.
///
/// One slot array serves as both an open-addressing hash table and the node
/// pool of a red-black tree, so point lookups are O(1) while ordered
/// operations stay O(log n) over the same records.
///
/// Layout: slots `[0, hashable_capacity)` are addressable directly from a
/// hash; slots `[hashable_capacity, capacity)` hold collision overflow,
/// chained through `next` with zero as terminator. Freed overflow slots form
/// a free list threaded from the virgin slot at `collision_head` (the slot
/// array carries one extra record so that anchor always exists).
///
/// Unlike the dense flat engine, rotations here relink node pointers and
/// never move contents: a slot's position is what the hash index addresses.
pub(crate) struct RawHashTree<K, V, S> {
    slots: Vec<HashSlot<K, V>>,
    hasher: S,
    len: usize,
    capacity: usize,
    hashable_capacity: usize,
    collision_head: usize,
    collision_tail: usize,
    root: NodeIndex,
    first: NodeIndex,
    last: NodeIndex,
}

impl<K: Clone, V: Clone, S: Clone> Clone for RawHashTree<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            hasher: self.hasher.clone(),
            len: self.len,
            capacity: self.capacity,
            hashable_capacity: self.hashable_capacity,
            collision_head: self.collision_head,
            collision_tail: self.collision_tail,
            root: self.root,
            first: self.first,
            last: self.last,
        }
    }
}

impl<K: Default, V: Default, S> RawHashTree<K, V, S> {
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        assert!(capacity >= 1, "`RawHashTree::with_capacity_and_hasher()` - `capacity` must be at least 1");
        assert!(
            capacity < NodeIndex::MAX_LEN,
            "`RawHashTree::with_capacity_and_hasher()` - `capacity` collides with the index sentinel ({})",
            NodeIndex::MAX_LEN
        );
        let mut slots = Vec::new();
        // One extra slot: the record at `collision_head` anchors the free
        // list even when the head has advanced to `capacity`.
        slots.resize_with(capacity + 1, HashSlot::default);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hashable_capacity = ((capacity as f32 * HASHABLE_RATIO) as usize).max(1);
        Self {
            slots,
            hasher,
            len: 0,
            capacity,
            hashable_capacity,
            collision_head: hashable_capacity,
            collision_tail: hashable_capacity,
            root: NodeIndex::NIL,
            first: NodeIndex::NIL,
            last: NodeIndex::NIL,
        }
    }

    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = HashSlot::default();
        }
        self.len = 0;
        self.collision_head = self.hashable_capacity;
        self.collision_tail = self.hashable_capacity;
        self.root = NodeIndex::NIL;
        self.first = NodeIndex::NIL;
        self.last = NodeIndex::NIL;
    }
}

impl<K, V, S> RawHashTree<K, V, S> {
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) const fn hasher(&self) -> &S {
        &self.hasher
    }

    pub(crate) const fn first(&self) -> NodeIndex {
        self.first
    }

    pub(crate) const fn last(&self) -> NodeIndex {
        self.last
    }

    #[inline]
    pub(crate) fn key(&self, index: NodeIndex) -> &K {
        &self.slots[index.get()].key
    }

    #[inline]
    pub(crate) fn value(&self, index: NodeIndex) -> &V {
        &self.slots[index.get()].value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: NodeIndex) -> &mut V {
        &mut self.slots[index.get()].value
    }

    #[inline]
    pub(crate) fn pair(&self, index: NodeIndex) -> (&K, &V) {
        let slot = &self.slots[index.get()];
        (&slot.key, &slot.value)
    }

    /// Returns the first slot whose key is `>= key`, or the sentinel.
    pub(crate) fn lower_bound_index<Q>(&self, key: &Q) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut node = self.root;
        let mut bound = NodeIndex::NIL;
        while !node.is_nil() {
            if self.slots[node.get()].key.borrow() < key {
                node = self.slots[node.get()].right;
            } else {
                bound = node;
                node = self.slots[node.get()].left;
            }
        }
        bound
    }

    /// Returns the first slot whose key is `> key`, or the sentinel.
    pub(crate) fn upper_bound_index<Q>(&self, key: &Q) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut node = self.root;
        let mut bound = NodeIndex::NIL;
        while !node.is_nil() {
            if self.slots[node.get()].key.borrow() <= key {
                node = self.slots[node.get()].right;
            } else {
                bound = node;
                node = self.slots[node.get()].left;
            }
        }
        bound
    }

    pub(crate) fn successor(&self, index: NodeIndex) -> NodeIndex {
        if index.is_nil() {
            return NodeIndex::NIL;
        }
        let right = self.slots[index.get()].right;
        if !right.is_nil() {
            return self.subtree_min(right);
        }
        let mut node = index;
        let mut parent = self.slots[node.get()].parent;
        while !parent.is_nil() && node == self.slots[parent.get()].right {
            node = parent;
            parent = self.slots[node.get()].parent;
        }
        parent
    }

    pub(crate) fn predecessor(&self, index: NodeIndex) -> NodeIndex {
        if index.is_nil() {
            return NodeIndex::NIL;
        }
        let left = self.slots[index.get()].left;
        if !left.is_nil() {
            return self.subtree_max(left);
        }
        let mut node = index;
        let mut parent = self.slots[node.get()].parent;
        while !parent.is_nil() && node == self.slots[parent.get()].left {
            node = parent;
            parent = self.slots[node.get()].parent;
        }
        parent
    }

    /// Advances to the in-order successor through a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawHashTree<K, V, S>`.
    /// - Only link fields may be aliased by outstanding value references.
    pub(crate) unsafe fn successor_ptr(ptr: *const Self, index: NodeIndex) -> NodeIndex {
        // SAFETY: Caller guarantees ptr is valid; only link fields are read.
        unsafe { (*ptr).successor(index) }
    }

    /// Retreats to the in-order predecessor through a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawHashTree<K, V, S>`.
    /// - Only link fields may be aliased by outstanding value references.
    pub(crate) unsafe fn predecessor_ptr(ptr: *const Self, index: NodeIndex) -> NodeIndex {
        // SAFETY: Caller guarantees ptr is valid; only link fields are read.
        unsafe { (*ptr).predecessor(index) }
    }

    /// Returns a shared key reference and exclusive value reference for `index`.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawHashTree<K, V, S>`.
    /// - No other live reference to the value at `index` may exist.
    pub(crate) unsafe fn pair_mut_ptr<'a>(ptr: *mut Self, index: NodeIndex) -> (&'a K, &'a mut V) {
        // SAFETY: Caller guarantees exclusivity for this slot's value; the key
        // is handed out shared and never mutated through this path.
        unsafe {
            let slots = &raw mut (*ptr).slots;
            let slot = (*slots).as_mut_ptr().add(index.get());
            (&(*slot).key, &mut (*slot).value)
        }
    }

    /// Consumes the table, returning its entries in key order.
    pub(crate) fn into_entries(self) -> Vec<(K, V)>
    where
        K: Ord,
    {
        let mut entries: Vec<(K, V)> =
            self.slots.into_iter().filter(HashSlot::is_full).map(|slot| (slot.key, slot.value)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    fn subtree_min(&self, mut node: NodeIndex) -> NodeIndex {
        loop {
            let left = self.slots[node.get()].left;
            if left.is_nil() {
                return node;
            }
            node = left;
        }
    }

    fn subtree_max(&self, mut node: NodeIndex) -> NodeIndex {
        loop {
            let right = self.slots[node.get()].right;
            if right.is_nil() {
                return node;
            }
            node = right;
        }
    }

    /// Home bucket for `hash`: masked to the next power of two above the
    /// hashable prefix, folded back down when it lands past the prefix.
    fn index_from_hash(&self, hash: u64) -> usize {
        let mask = u64::MAX >> (self.hashable_capacity as u64).leading_zeros();
        #[allow(clippy::cast_possible_truncation)]
        let index = (hash & mask) as usize;
        if index >= self.hashable_capacity { index - self.hashable_capacity } else { index }
    }

    fn update_parent_child(&mut self, child: NodeIndex, parent: NodeIndex, erased: NodeIndex) {
        if parent.is_nil() {
            self.root = child;
            return;
        }
        let parent_slot = &mut self.slots[parent.get()];
        if parent_slot.left == erased {
            parent_slot.left = child;
        } else {
            parent_slot.right = child;
        }
    }

    /// Copies the erased slot's links and color onto `min`, which is taking
    /// over its position in the tree.
    fn transfer_links(&mut self, min: NodeIndex, erased: NodeIndex) {
        let (parent, color, left, right) = {
            let slot = &self.slots[erased.get()];
            (slot.parent, slot.color(), slot.left, slot.right)
        };
        let min_slot = &mut self.slots[min.get()];
        min_slot.parent = parent;
        min_slot.set_color(color);
        min_slot.left = left;
        min_slot.right = right;
    }

    /// Link-based left rotation; slot contents stay put.
    fn rotate_left(&mut self, index: NodeIndex) {
        let child = self.slots[index.get()].right;
        let child_left = self.slots[child.get()].left;
        self.slots[index.get()].right = child_left;
        if !child_left.is_nil() {
            self.slots[child_left.get()].parent = index;
        }
        let parent = self.slots[index.get()].parent;
        self.slots[child.get()].parent = parent;
        if parent.is_nil() {
            self.root = child;
        } else if self.slots[parent.get()].left == index {
            self.slots[parent.get()].left = child;
        } else {
            self.slots[parent.get()].right = child;
        }
        self.slots[child.get()].left = index;
        self.slots[index.get()].parent = child;
    }

    /// Link-based right rotation; slot contents stay put.
    fn rotate_right(&mut self, index: NodeIndex) {
        let child = self.slots[index.get()].left;
        let child_right = self.slots[child.get()].right;
        self.slots[index.get()].left = child_right;
        if !child_right.is_nil() {
            self.slots[child_right.get()].parent = index;
        }
        let parent = self.slots[index.get()].parent;
        self.slots[child.get()].parent = parent;
        if parent.is_nil() {
            self.root = child;
        } else if self.slots[parent.get()].left == index {
            self.slots[parent.get()].left = child;
        } else {
            self.slots[parent.get()].right = child;
        }
        self.slots[child.get()].right = index;
        self.slots[index.get()].parent = child;
    }
}

impl<K, V, S: BuildHasher> RawHashTree<K, V, S> {
    fn hash_of<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    /// O(1) point lookup through the hash index.
    pub(crate) fn find_index<Q>(&self, key: &Q) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_with_chain(key).0
    }

    /// Returns the slot holding `key` (or the sentinel) together with the
    /// slot's chain predecessor, which erasure needs to splice the chain
    /// without a doubly linked list.
    fn find_with_chain<Q>(&self, key: &Q) -> (NodeIndex, usize)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(key);
        let fingerprint = fingerprint_of(hash);
        let mut prev = 0;
        let mut index = self.index_from_hash(hash);
        loop {
            let slot = &self.slots[index];
            if slot.is_full() && slot.fingerprint() == fingerprint && slot.key.borrow() == key {
                return (NodeIndex::new(index), prev);
            }
            if slot.next == CHAIN_END {
                return (NodeIndex::NIL, prev);
            }
            prev = index;
            index = slot.next as usize;
        }
    }
}

impl<K, V, S> RawHashTree<K, V, S>
where
    K: Ord + Hash + Default,
    V: Default,
    S: BuildHasher + Clone,
{
    /// Inserts `key`, or replaces the value of an existing entry.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (NodeIndex, Option<V>) {
        assert!(
            self.len < NodeIndex::MAX_LEN,
            "`RawHashTree::insert()` - table is at maximum capacity ({})",
            NodeIndex::MAX_LEN
        );
        // Hash placement first. A rehash invalidates every computed index,
        // so the whole placement restarts after any growth.
        let index = loop {
            let hash = self.hash_of(&key);
            let fingerprint = fingerprint_of(hash);
            let home = self.index_from_hash(hash);
            if self.slots[home].is_full() {
                let mut chain = home;
                loop {
                    let slot = &self.slots[chain];
                    if slot.fingerprint() == fingerprint && slot.key == key {
                        let old = mem::replace(&mut self.slots[chain].value, value);
                        return (NodeIndex::new(chain), Some(old));
                    }
                    if slot.next == CHAIN_END {
                        break;
                    }
                    chain = slot.next as usize;
                }
                // Not present; this insert will land in overflow.
                if !self.has_load_room() {
                    self.grow();
                    continue;
                }
                let taken = if self.collision_tail == self.collision_head {
                    // Free list empty: take a virgin overflow slot.
                    if self.collision_head >= self.capacity {
                        self.grow();
                        continue;
                    }
                    let taken = self.collision_head;
                    self.collision_head += 1;
                    self.collision_tail += 1;
                    taken
                } else {
                    // Reuse a freed slot from the list threaded off the
                    // virgin anchor at `collision_head`.
                    let taken = self.slots[self.collision_head].next as usize;
                    if taken == self.collision_tail {
                        self.collision_tail = self.collision_head;
                    } else {
                        self.slots[self.collision_head].next = self.slots[taken].next;
                    }
                    taken
                };
                #[allow(clippy::cast_possible_truncation)]
                {
                    self.slots[chain].next = taken as ChainIndex;
                }
                self.slots[taken].occupy(hash);
                self.slots[taken].next = CHAIN_END;
                break taken;
            }
            if !self.has_load_room() {
                self.grow();
                continue;
            }
            self.slots[home].occupy(hash);
            self.slots[home].next = CHAIN_END;
            break home;
        };
        // Tree placement. Links are index-stable here, so the caches can be
        // updated before the node is wired in.
        let index = NodeIndex::new(index);
        let mut parent = self.cached_extrema_parent(&key, index);
        if parent.is_nil() {
            parent = self.parent_location(&key);
        }
        let go_left = !parent.is_nil() && key < self.slots[parent.get()].key;
        {
            let slot = &mut self.slots[index.get()];
            slot.key = key;
            slot.value = value;
            slot.parent = parent;
            slot.left = NodeIndex::NIL;
            slot.right = NodeIndex::NIL;
        }
        self.len += 1;
        if self.root.is_nil() {
            self.root = index;
            self.slots[index.get()].set_color(Color::Black);
        } else {
            if go_left {
                self.slots[parent.get()].left = index;
            } else {
                self.slots[parent.get()].right = index;
            }
            self.fix_insert(index);
        }
        (index, None)
    }

    /// O(1) parent hint for keys outside the cached extrema; updates the
    /// caches for the insert that is about to happen.
    fn cached_extrema_parent(&mut self, key: &K, index: NodeIndex) -> NodeIndex {
        let mut parent = NodeIndex::NIL;
        if self.last.is_nil() {
            self.first = index;
            self.last = index;
        } else if *key < self.slots[self.first.get()].key {
            parent = self.first;
            self.first = index;
        } else if self.slots[self.last.get()].key < *key {
            parent = self.last;
            self.last = index;
        }
        parent
    }

    fn parent_location(&self, key: &K) -> NodeIndex {
        let mut node = self.root;
        let mut parent = NodeIndex::NIL;
        while !node.is_nil() {
            parent = node;
            node = if *key < self.slots[node.get()].key {
                self.slots[node.get()].left
            } else {
                self.slots[node.get()].right
            };
        }
        parent
    }

    fn has_load_room(&self) -> bool {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_len = (self.capacity as f32 * LOAD_FACTOR) as usize;
        self.len + 1 <= max_len
    }

    fn grow(&mut self) {
        assert!(
            self.capacity < NodeIndex::MAX_LEN - 1,
            "`RawHashTree::grow()` - table is at maximum capacity ({})",
            NodeIndex::MAX_LEN - 1
        );
        let new_capacity = (self.capacity * GROWTH_MULTIPLE).min(NodeIndex::MAX_LEN - 1);
        self.rehash(new_capacity);
    }

    /// Rebuilds the table at `new_capacity`, reinserting every entry.
    pub(crate) fn rehash(&mut self, new_capacity: usize) {
        let mut other = Self::with_capacity_and_hasher(new_capacity, self.hasher.clone());
        for index in 0..self.slots.len() {
            if self.slots[index].is_full() {
                let key = mem::take(&mut self.slots[index].key);
                let value = mem::take(&mut self.slots[index].value);
                other.insert(key, value);
            }
        }
        *self = other;
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let needed = self.len + additional;
        if needed > self.capacity {
            self.rehash(needed);
        }
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        let needed = self.len.max(1);
        if self.capacity > needed {
            self.rehash(needed);
        }
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (index, prev) = self.find_with_chain(key);
        if index.is_nil() { None } else { Some(self.remove_found(index, prev)) }
    }

    /// Removes the entry in slot `index`; used where the slot is already
    /// known (entry API, pops) and the chain predecessor must be re-derived.
    pub(crate) fn remove_at(&mut self, index: NodeIndex) -> (K, V) {
        let hash = self.hash_of(&self.slots[index.get()].key);
        let mut prev = 0;
        let mut node = self.index_from_hash(hash);
        while node != index.get() {
            prev = node;
            node = self.slots[node].next as usize;
        }
        self.remove_found(index, prev)
    }

    fn remove_found(&mut self, index: NodeIndex, prev: usize) -> (K, V) {
        let mut erase = index.get();
        self.unhash_slot(&mut erase, prev);
        let erase = NodeIndex::new(erase);
        // Ordered neighbors feed the extremum caches. Computed after the
        // chain compaction above so a relocated record is accounted for.
        let upper = self.successor(erase);
        let lower = self.predecessor(erase);
        if upper.is_nil() {
            self.last = lower;
        }
        if lower.is_nil() {
            self.first = upper;
        }
        // Structural unlink, as in the dense engine but without compaction.
        let slot = &self.slots[erase.get()];
        let slot_parent = slot.parent;
        let slot_left = slot.left;
        let slot_right = slot.right;
        let mut color = slot.color();
        let mut parent = slot_parent;
        let child;
        if slot_left.is_nil() || slot_right.is_nil() {
            child = if slot_left.is_nil() { slot_right } else { slot_left };
            if !child.is_nil() {
                self.slots[child.get()].parent = slot_parent;
            }
            self.update_parent_child(child, slot_parent, erase);
        } else {
            let min = self.subtree_min(slot_right);
            child = self.slots[min.get()].right;
            parent = self.slots[min.get()].parent;
            color = self.slots[min.get()].color();
            if !child.is_nil() {
                self.slots[child.get()].parent = parent;
            }
            if parent == erase {
                self.slots[parent.get()].right = child;
                parent = min;
            } else {
                self.slots[parent.get()].left = child;
            }
            self.transfer_links(min, erase);
            self.update_parent_child(min, slot_parent, erase);
            // The splice above may have rewritten the erased slot's right
            // link, so both links are re-read here.
            let left = self.slots[erase.get()].left;
            self.slots[left.get()].parent = min;
            let right = self.slots[erase.get()].right;
            if !right.is_nil() {
                self.slots[right.get()].parent = min;
            }
        }
        if color == Color::Black {
            self.fix_erase(child, parent);
        }
        self.len -= 1;
        let key = mem::take(&mut self.slots[erase.get()].key);
        let value = mem::take(&mut self.slots[erase.get()].value);
        (key, value)
    }

    /// Detaches `erase` from the hash index. A hashable slot with a chain
    /// has its chain successor's record swapped into it, and `erase` is
    /// updated to the vacated overflow slot now holding the erased record.
    fn unhash_slot(&mut self, erase: &mut usize, prev: usize) {
        let next = self.slots[*erase].next as usize;
        if *erase < self.hashable_capacity {
            if next == CHAIN_END as usize {
                self.slots[*erase].vacate();
                return;
            }
            self.swap_slot_position(next, *erase);
            *erase = next;
        } else {
            #[allow(clippy::cast_possible_truncation)]
            {
                self.slots[prev].next = next as ChainIndex;
            }
        }
        self.slots[*erase].vacate();
        self.slots[*erase].next = CHAIN_END;
        // Append the vacated overflow slot to the free list.
        #[allow(clippy::cast_possible_truncation)]
        {
            self.slots[self.collision_tail].next = *erase as ChainIndex;
        }
        self.collision_tail = *erase;
    }

    /// Exchanges two slots wholesale: records, tree links, chain links, with
    /// every inbound reference (parents, children, root, caches) fixed up.
    fn swap_slot_position(&mut self, keep: usize, remove: usize) {
        let keep_n = NodeIndex::new(keep);
        let remove_n = NodeIndex::new(remove);
        if self.first == keep_n {
            self.first = remove_n;
        }
        if self.last == keep_n {
            self.last = remove_n;
        }
        let keep_parent = self.slots[keep].parent;
        let keep_left = self.slots[keep].left;
        let keep_right = self.slots[keep].right;
        let remove_parent = self.slots[remove].parent;
        let remove_left = self.slots[remove].left;
        let remove_right = self.slots[remove].right;
        if !keep_parent.is_nil() {
            let parent_slot = &mut self.slots[keep_parent.get()];
            if parent_slot.left == keep_n {
                parent_slot.left = remove_n;
            } else {
                parent_slot.right = remove_n;
            }
        }
        if !remove_parent.is_nil() {
            let parent_slot = &mut self.slots[remove_parent.get()];
            if parent_slot.left == remove_n {
                parent_slot.left = keep_n;
            } else {
                parent_slot.right = keep_n;
            }
        }
        // A direct parent/child relationship collapses onto the swap itself.
        if keep_parent == remove_n {
            self.slots[keep].parent = keep_n;
        }
        if remove_parent == keep_n {
            self.slots[remove].parent = remove_n;
        }
        if !keep_left.is_nil() {
            self.slots[keep_left.get()].parent = remove_n;
        }
        if !keep_right.is_nil() {
            self.slots[keep_right.get()].parent = remove_n;
        }
        if !remove_left.is_nil() {
            self.slots[remove_left.get()].parent = keep_n;
        }
        if !remove_right.is_nil() {
            self.slots[remove_right.get()].parent = keep_n;
        }
        if self.root == keep_n {
            self.root = remove_n;
        } else if self.root == remove_n {
            self.root = keep_n;
        }
        self.slots.swap(keep, remove);
    }

    fn fix_insert(&mut self, mut node: NodeIndex) {
        let mut parent = self.slots[node.get()].parent;
        while node != self.root
            && self.slots[node.get()].color() == Color::Red
            && self.slots[parent.get()].color() == Color::Red
        {
            let grandparent = self.slots[parent.get()].parent;
            let parent_is_left = self.slots[grandparent.get()].left == parent;
            let uncle = if parent_is_left {
                self.slots[grandparent.get()].right
            } else {
                self.slots[grandparent.get()].left
            };
            if !uncle.is_nil() && self.slots[uncle.get()].color() == Color::Red {
                self.slots[grandparent.get()].set_color(Color::Red);
                self.slots[parent.get()].set_color(Color::Black);
                self.slots[uncle.get()].set_color(Color::Black);
                node = grandparent;
            } else {
                if parent_is_left {
                    if node == self.slots[parent.get()].right {
                        self.rotate_left(parent);
                        mem::swap(&mut node, &mut parent);
                    }
                    self.rotate_right(grandparent);
                } else {
                    if node == self.slots[parent.get()].left {
                        self.rotate_right(parent);
                        mem::swap(&mut node, &mut parent);
                    }
                    self.rotate_left(grandparent);
                }
                let parent_color = self.slots[parent.get()].color();
                let grandparent_color = self.slots[grandparent.get()].color();
                self.slots[grandparent.get()].set_color(parent_color);
                self.slots[parent.get()].set_color(grandparent_color);
                node = parent;
            }
            parent = self.slots[node.get()].parent;
        }
        self.slots[self.root.get()].set_color(Color::Black);
    }

    fn fix_erase(&mut self, mut node: NodeIndex, mut parent: NodeIndex) {
        while node != self.root && (node.is_nil() || self.slots[node.get()].color() == Color::Black) {
            let is_left = node == self.slots[parent.get()].left;
            let mut sibling = if is_left { self.slots[parent.get()].right } else { self.slots[parent.get()].left };
            // Red sibling: demote it over the parent.
            if self.slots[sibling.get()].color() == Color::Red {
                self.slots[sibling.get()].set_color(Color::Black);
                self.slots[parent.get()].set_color(Color::Red);
                if is_left {
                    self.rotate_left(parent);
                    sibling = self.slots[parent.get()].right;
                } else {
                    self.rotate_right(parent);
                    sibling = self.slots[parent.get()].left;
                }
            }
            // Black sibling, both children black: recolor and ascend.
            let sibling_left = self.slots[sibling.get()].left;
            let sibling_right = self.slots[sibling.get()].right;
            if (sibling_left.is_nil() || self.slots[sibling_left.get()].color() == Color::Black)
                && (sibling_right.is_nil() || self.slots[sibling_right.get()].color() == Color::Black)
            {
                self.slots[sibling.get()].set_color(Color::Red);
                node = parent;
                parent = self.slots[node.get()].parent;
                continue;
            }
            if is_left {
                // Inner red child only: rotate it outward first.
                if sibling_right.is_nil() || self.slots[sibling_right.get()].color() == Color::Black {
                    if !sibling_left.is_nil() {
                        self.slots[sibling_left.get()].set_color(Color::Black);
                    }
                    self.slots[sibling.get()].set_color(Color::Red);
                    self.rotate_right(sibling);
                    sibling = self.slots[parent.get()].right;
                }
                let parent_color = self.slots[parent.get()].color();
                self.slots[sibling.get()].set_color(parent_color);
                self.slots[parent.get()].set_color(Color::Black);
                let outer = self.slots[sibling.get()].right;
                if !outer.is_nil() {
                    self.slots[outer.get()].set_color(Color::Black);
                }
                self.rotate_left(parent);
            } else {
                if sibling_left.is_nil() || self.slots[sibling_left.get()].color() == Color::Black {
                    if !sibling_right.is_nil() {
                        self.slots[sibling_right.get()].set_color(Color::Black);
                    }
                    self.slots[sibling.get()].set_color(Color::Red);
                    self.rotate_left(sibling);
                    sibling = self.slots[parent.get()].left;
                }
                let parent_color = self.slots[parent.get()].color();
                self.slots[sibling.get()].set_color(parent_color);
                self.slots[parent.get()].set_color(Color::Black);
                let outer = self.slots[sibling.get()].left;
                if !outer.is_nil() {
                    self.slots[outer.get()].set_color(Color::Black);
                }
                self.rotate_right(parent);
            }
            node = self.root;
            break;
        }
        if !node.is_nil() {
            self.slots[node.get()].set_color(Color::Black);
        }
    }
}
