use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use alloc::vec::Vec;

use super::index::NodeIndex;
use super::node::{Color, Node};

/// The dense flat red-black tree backing `FlatMap` and `FlatSet`.
///
/// Nodes live in a contiguous `Vec` and link to each other by index. The live
/// prefix `[0, len)` is always fully occupied: erasure swaps the last node
/// into the vacated slot before popping, so the array never fragments.
///
/// Rotations swap slot *contents* (payload, color, and a permutation of the
/// child links) rather than relinking slot pointers. Slot identity is
/// preserved, which keeps the root index stable through rebalancing; the
/// price is that a key's slot can migrate, so operations that hand out
/// indices re-resolve them after fix-up.
pub(crate) struct RawFlatTree<K, V> {
    nodes: Vec<Node<K, V>>,
    root: NodeIndex,
    first: NodeIndex,
    last: NodeIndex,
}

impl<K: Clone, V: Clone> Clone for RawFlatTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            first: self.first,
            last: self.last,
        }
    }
}

/// Which extremum cache an insert landed on, if any.
enum Extremum {
    Min,
    Max,
    Interior,
}

impl<K, V> RawFlatTree<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeIndex::NIL,
            first: NodeIndex::NIL,
            last: NodeIndex::NIL,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity < NodeIndex::MAX_LEN,
            "`RawFlatTree::with_capacity()` - `capacity` collides with the index sentinel ({})",
            NodeIndex::MAX_LEN
        );
        Self {
            nodes: Vec::with_capacity(capacity),
            root: NodeIndex::NIL,
            first: NodeIndex::NIL,
            last: NodeIndex::NIL,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = NodeIndex::NIL;
        self.first = NodeIndex::NIL;
        self.last = NodeIndex::NIL;
    }

    pub(crate) const fn first(&self) -> NodeIndex {
        self.first
    }

    pub(crate) const fn last(&self) -> NodeIndex {
        self.last
    }

    #[inline]
    pub(crate) fn key(&self, index: NodeIndex) -> &K {
        &self.nodes[index.get()].key
    }

    #[inline]
    pub(crate) fn value(&self, index: NodeIndex) -> &V {
        &self.nodes[index.get()].value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: NodeIndex) -> &mut V {
        &mut self.nodes[index.get()].value
    }

    #[inline]
    pub(crate) fn pair(&self, index: NodeIndex) -> (&K, &V) {
        let node = &self.nodes[index.get()];
        (&node.key, &node.value)
    }

    /// Returns the slot holding `key`, or the sentinel.
    pub(crate) fn find_index<Q>(&self, key: &Q) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut node = self.root;
        while !node.is_nil() {
            match key.cmp(self.nodes[node.get()].key.borrow()) {
                Ordering::Equal => return node,
                Ordering::Less => node = self.nodes[node.get()].left,
                Ordering::Greater => node = self.nodes[node.get()].right,
            }
        }
        NodeIndex::NIL
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
            if self.nodes[node.get()].key.borrow() < key {
                node = self.nodes[node.get()].right;
            } else {
                bound = node;
                node = self.nodes[node.get()].left;
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
            if self.nodes[node.get()].key.borrow() <= key {
                node = self.nodes[node.get()].right;
            } else {
                bound = node;
                node = self.nodes[node.get()].left;
            }
        }
        bound
    }

    pub(crate) fn successor(&self, index: NodeIndex) -> NodeIndex {
        if index.is_nil() {
            return NodeIndex::NIL;
        }
        let right = self.nodes[index.get()].right;
        if !right.is_nil() {
            return self.subtree_min(right);
        }
        let mut node = index;
        let mut parent = self.nodes[node.get()].parent;
        while !parent.is_nil() && node == self.nodes[parent.get()].right {
            node = parent;
            parent = self.nodes[node.get()].parent;
        }
        parent
    }

    pub(crate) fn predecessor(&self, index: NodeIndex) -> NodeIndex {
        if index.is_nil() {
            return NodeIndex::NIL;
        }
        let left = self.nodes[index.get()].left;
        if !left.is_nil() {
            return self.subtree_max(left);
        }
        let mut node = index;
        let mut parent = self.nodes[node.get()].parent;
        while !parent.is_nil() && node == self.nodes[parent.get()].left {
            node = parent;
            parent = self.nodes[node.get()].parent;
        }
        parent
    }

    fn subtree_min(&self, mut node: NodeIndex) -> NodeIndex {
        loop {
            let left = self.nodes[node.get()].left;
            if left.is_nil() {
                return node;
            }
            node = left;
        }
    }

    fn subtree_max(&self, mut node: NodeIndex) -> NodeIndex {
        loop {
            let right = self.nodes[node.get()].right;
            if right.is_nil() {
                return node;
            }
            node = right;
        }
    }

    /// Advances to the in-order successor through a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawFlatTree<K, V>`.
    /// - Only link fields may be aliased by outstanding value references.
    pub(crate) unsafe fn successor_ptr(ptr: *const Self, index: NodeIndex) -> NodeIndex {
        // SAFETY: Caller guarantees ptr is valid; only link fields are read.
        unsafe { (*ptr).successor(index) }
    }

    /// Retreats to the in-order predecessor through a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawFlatTree<K, V>`.
    /// - Only link fields may be aliased by outstanding value references.
    pub(crate) unsafe fn predecessor_ptr(ptr: *const Self, index: NodeIndex) -> NodeIndex {
        // SAFETY: Caller guarantees ptr is valid; only link fields are read.
        unsafe { (*ptr).predecessor(index) }
    }

    /// Returns a shared key reference and exclusive value reference for `index`.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawFlatTree<K, V>`.
    /// - No other live reference to the value at `index` may exist.
    pub(crate) unsafe fn pair_mut_ptr<'a>(ptr: *mut Self, index: NodeIndex) -> (&'a K, &'a mut V) {
        // SAFETY: Caller guarantees exclusivity for this slot's value; the key
        // is handed out shared and never mutated through this path.
        unsafe {
            let nodes = &raw mut (*ptr).nodes;
            let node = (*nodes).as_mut_ptr().add(index.get());
            (&(*node).key, &mut (*node).value)
        }
    }

    /// Consumes the tree, returning its entries in key order.
    pub(crate) fn into_entries(self) -> Vec<(K, V)>
    where
        K: Ord,
    {
        let mut entries: Vec<(K, V)> = self.nodes.into_iter().map(|node| (node.key, node.value)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl<K: Ord, V> RawFlatTree<K, V> {
    /// Inserts `key`, or replaces the value of an existing entry.
    ///
    /// Returns the slot the entry landed in (resolved after fix-up, since
    /// rotations migrate contents) and the previous value, if any.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (NodeIndex, Option<V>) {
        assert!(
            self.nodes.len() < NodeIndex::MAX_LEN,
            "`RawFlatTree::insert()` - tree is at maximum capacity ({})",
            NodeIndex::MAX_LEN
        );
        if self.nodes.is_empty() {
            let mut node = Node::new(key, value, NodeIndex::NIL);
            node.color = Color::Black;
            self.nodes.push(node);
            let index = NodeIndex::new(0);
            self.root = index;
            self.first = index;
            self.last = index;
            return (index, None);
        }
        // A key outside the cached extrema attaches directly under the
        // current minimum or maximum, skipping the descent.
        let (parent, insert_left, extremum) = if key < self.nodes[self.first.get()].key {
            (self.first, true, Extremum::Min)
        } else if self.nodes[self.last.get()].key < key {
            (self.last, false, Extremum::Max)
        } else {
            let mut node = self.root;
            let mut parent = NodeIndex::NIL;
            let mut go_left = false;
            while !node.is_nil() {
                parent = node;
                match key.cmp(&self.nodes[node.get()].key) {
                    Ordering::Equal => {
                        let old = mem::replace(&mut self.nodes[node.get()].value, value);
                        return (node, Some(old));
                    }
                    Ordering::Less => {
                        go_left = true;
                        node = self.nodes[node.get()].left;
                    }
                    Ordering::Greater => {
                        go_left = false;
                        node = self.nodes[node.get()].right;
                    }
                }
            }
            (parent, go_left, Extremum::Interior)
        };
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node::new(key, value, parent));
        if insert_left {
            self.nodes[parent.get()].left = index;
        } else {
            self.nodes[parent.get()].right = index;
        }
        let index = self.fix_insert(index);
        match extremum {
            Extremum::Min => self.first = index,
            Extremum::Max => self.last = index,
            Extremum::Interior => {}
        }
        (index, None)
    }

    /// Restores the red-black invariants after linking a red leaf.
    ///
    /// Returns the slot holding the inserted key once rebalancing settles.
    fn fix_insert(&mut self, mut node: NodeIndex) -> NodeIndex {
        let mut inserted = node;
        loop {
            let parent = self.nodes[node.get()].parent;
            if parent.is_nil() || self.nodes[parent.get()].color == Color::Black {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.nodes[parent.get()].parent;
            let parent_is_left = self.nodes[grandparent.get()].left == parent;
            let uncle = if parent_is_left {
                self.nodes[grandparent.get()].right
            } else {
                self.nodes[grandparent.get()].left
            };
            if !uncle.is_nil() && self.nodes[uncle.get()].color == Color::Red {
                self.nodes[grandparent.get()].color = Color::Red;
                self.nodes[parent.get()].color = Color::Black;
                self.nodes[uncle.get()].color = Color::Black;
                node = grandparent;
                continue;
            }
            let inner = if parent_is_left {
                node == self.nodes[parent.get()].right
            } else {
                node == self.nodes[parent.get()].left
            };
            if parent_is_left {
                if inner {
                    self.rotate_left(parent);
                }
                self.rotate_right(grandparent);
            } else {
                if inner {
                    self.rotate_right(parent);
                }
                self.rotate_left(grandparent);
            }
            // Rotations moved contents, not slots: the colors to exchange now
            // sit at the parent and grandparent slot positions.
            let parent_color = self.nodes[parent.get()].color;
            self.nodes[parent.get()].color = self.nodes[grandparent.get()].color;
            self.nodes[grandparent.get()].color = parent_color;
            // A zig-zag rotation carries the inserted content two slots up.
            if node == inserted && inner {
                inserted = grandparent;
            }
            break;
        }
        self.nodes[self.root.get()].color = Color::Black;
        inserted
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = self.find_index(key);
        if index.is_nil() { None } else { Some(self.remove_at(index)) }
    }

    /// Unlinks the node at `index`, compacts the array, and rebalances.
    ///
    /// Returns the erased entry, carried out through the popped tail slot.
    pub(crate) fn remove_at(&mut self, index: NodeIndex) -> (K, V) {
        let was_first = index == self.first;
        let was_last = index == self.last;
        let node = &self.nodes[index.get()];
        let node_parent = node.parent;
        let node_left = node.left;
        let node_right = node.right;
        let mut color = node.color;
        let mut parent = node_parent;
        let mut child;
        if node_left.is_nil() || node_right.is_nil() {
            child = if node_left.is_nil() { node_right } else { node_left };
            if !child.is_nil() {
                self.nodes[child.get()].parent = node_parent;
            }
            self.update_parent_child(child, node_parent, index);
            let survivor = child;
            self.swap_out_of_tree(survivor, index, &mut child, &mut parent);
        } else {
            // Two children: the in-order successor takes over this node's
            // place in the tree, and its own right child is spliced up.
            let min = self.subtree_min(node_right);
            child = self.nodes[min.get()].right;
            parent = self.nodes[min.get()].parent;
            color = self.nodes[min.get()].color;
            if !child.is_nil() {
                self.nodes[child.get()].parent = parent;
            }
            if parent == index {
                self.nodes[parent.get()].right = child;
                parent = min;
            } else {
                self.nodes[parent.get()].left = child;
            }
            self.transfer_links(min, index);
            self.update_parent_child(min, node_parent, index);
            // The splice above may have rewritten the erased slot's right
            // link, so both links are re-read here.
            let left = self.nodes[index.get()].left;
            self.nodes[left.get()].parent = min;
            let right = self.nodes[index.get()].right;
            if !right.is_nil() {
                self.nodes[right.get()].parent = min;
            }
            self.swap_out_of_tree(min, index, &mut child, &mut parent);
        }
        // The erased content was swapped into the tail slot.
        let orphan = self.nodes.pop().expect("`RawFlatTree::remove_at()` - tree is empty!");
        if color == Color::Black {
            self.fix_erase(child, parent);
        }
        if self.nodes.is_empty() {
            self.first = NodeIndex::NIL;
            self.last = NodeIndex::NIL;
        } else {
            if was_first {
                self.first = self.subtree_min(self.root);
            }
            if was_last {
                self.last = self.subtree_max(self.root);
            }
        }
        (orphan.key, orphan.value)
    }

    /// Copies the erased node's links and color onto `min`, which is taking
    /// over its position in the tree.
    fn transfer_links(&mut self, min: NodeIndex, erased: NodeIndex) {
        let (parent, color, left, right) = {
            let node = &self.nodes[erased.get()];
            (node.parent, node.color, node.left, node.right)
        };
        let min_node = &mut self.nodes[min.get()];
        min_node.parent = parent;
        min_node.color = color;
        min_node.left = left;
        min_node.right = right;
    }

    fn update_parent_child(&mut self, child: NodeIndex, parent: NodeIndex, erased: NodeIndex) {
        if parent.is_nil() {
            self.root = child;
            return;
        }
        let parent_node = &mut self.nodes[parent.get()];
        if parent_node.left == erased {
            parent_node.left = child;
        } else {
            parent_node.right = child;
        }
    }

    /// Moves the surviving content into the erased slot, then the tail
    /// content into the vacated slot, keeping the live prefix dense.
    fn swap_out_of_tree(&mut self, node: NodeIndex, erased: NodeIndex, child: &mut NodeIndex, parent: &mut NodeIndex) {
        let mut vacated = erased;
        if !node.is_nil() {
            self.swap_for_removal(node, erased, child, parent);
            vacated = node;
        }
        let tail = NodeIndex::new(self.nodes.len() - 1);
        self.swap_for_removal(tail, vacated, child, parent);
    }

    /// Relocates the content of slot `a` into slot `b`, which is assumed to
    /// be out of the tree. Tracked fix-up indices, the root, and the
    /// extremum caches are remapped along the way.
    fn swap_for_removal(&mut self, a: NodeIndex, b: NodeIndex, child: &mut NodeIndex, parent: &mut NodeIndex) {
        if a == b {
            return;
        }
        if *child == a {
            *child = b;
        }
        if *parent == a {
            *parent = b;
        }
        if self.first == a {
            self.first = b;
        }
        if self.last == a {
            self.last = b;
        }
        let a_parent = self.nodes[a.get()].parent;
        let a_left = self.nodes[a.get()].left;
        let a_right = self.nodes[a.get()].right;
        if !a_parent.is_nil() {
            let parent_node = &mut self.nodes[a_parent.get()];
            if parent_node.left == a {
                parent_node.left = b;
            } else {
                parent_node.right = b;
            }
        }
        if !a_left.is_nil() {
            self.nodes[a_left.get()].parent = b;
        }
        if !a_right.is_nil() {
            self.nodes[a_right.get()].parent = b;
        }
        if self.root == a {
            self.root = b;
        }
        self.nodes.swap(a.get(), b.get());
    }

    /// Restores the equal-black-height invariant after removing a black
    /// node. `node` is the spliced-up child (possibly nil), `parent` its
    /// parent. Siblings are re-read from the parent slot after rotations
    /// because content-swap rotations leave slot links in place.
    fn fix_erase(&mut self, mut node: NodeIndex, mut parent: NodeIndex) {
        while node != self.root && (node.is_nil() || self.nodes[node.get()].color == Color::Black) {
            let is_left = node == self.nodes[parent.get()].left;
            let mut sibling = if is_left { self.nodes[parent.get()].right } else { self.nodes[parent.get()].left };
            // Red sibling: rotate it over the parent. The rotation's return
            // value tracks the parent's migrated content.
            if self.nodes[sibling.get()].color == Color::Red {
                self.nodes[sibling.get()].color = Color::Black;
                self.nodes[parent.get()].color = Color::Red;
                if is_left {
                    parent = self.rotate_left(parent);
                    sibling = self.nodes[parent.get()].right;
                } else {
                    parent = self.rotate_right(parent);
                    sibling = self.nodes[parent.get()].left;
                }
            }
            // Black sibling, both children black: recolor and ascend.
            let sibling_left = self.nodes[sibling.get()].left;
            let sibling_right = self.nodes[sibling.get()].right;
            if (sibling_left.is_nil() || self.nodes[sibling_left.get()].color == Color::Black)
                && (sibling_right.is_nil() || self.nodes[sibling_right.get()].color == Color::Black)
            {
                self.nodes[sibling.get()].color = Color::Red;
                node = parent;
                parent = self.nodes[node.get()].parent;
                continue;
            }
            if is_left {
                // Inner red child only: rotate it outward first.
                if sibling_right.is_nil() || self.nodes[sibling_right.get()].color == Color::Black {
                    if !sibling_left.is_nil() {
                        self.nodes[sibling_left.get()].color = Color::Black;
                    }
                    self.nodes[sibling.get()].color = Color::Red;
                    self.rotate_right(sibling);
                    sibling = self.nodes[parent.get()].right;
                }
                self.nodes[sibling.get()].color = self.nodes[parent.get()].color;
                self.nodes[parent.get()].color = Color::Black;
                let outer = self.nodes[sibling.get()].right;
                if !outer.is_nil() {
                    self.nodes[outer.get()].color = Color::Black;
                }
                self.rotate_left(parent);
            } else {
                if sibling_left.is_nil() || self.nodes[sibling_left.get()].color == Color::Black {
                    if !sibling_right.is_nil() {
                        self.nodes[sibling_right.get()].color = Color::Black;
                    }
                    self.nodes[sibling.get()].color = Color::Red;
                    self.rotate_left(sibling);
                    sibling = self.nodes[parent.get()].left;
                }
                self.nodes[sibling.get()].color = self.nodes[parent.get()].color;
                self.nodes[parent.get()].color = Color::Black;
                let outer = self.nodes[sibling.get()].left;
                if !outer.is_nil() {
                    self.nodes[outer.get()].color = Color::Black;
                }
                self.rotate_right(parent);
            }
            node = self.root;
            break;
        }
        if !node.is_nil() {
            self.nodes[node.get()].color = Color::Black;
        }
    }

    /// Content-swap left rotation. Returns the slot now holding the content
    /// that was at `node`.
    fn rotate_left(&mut self, node: NodeIndex) -> NodeIndex {
        let child = self.nodes[node.get()].right;
        let child_right = self.nodes[child.get()].right;
        if !child_right.is_nil() {
            self.nodes[child_right.get()].parent = node;
        }
        let node_left = self.nodes[node.get()].left;
        if !node_left.is_nil() {
            self.nodes[node_left.get()].parent = child;
        }
        self.remap_extrema(node, child);
        let (n, c) = self.pair_mut(node.get(), child.get());
        mem::swap(&mut n.key, &mut c.key);
        mem::swap(&mut n.value, &mut c.value);
        mem::swap(&mut n.color, &mut c.color);
        mem::swap(&mut n.left, &mut c.right);
        mem::swap(&mut n.left, &mut n.right);
        mem::swap(&mut c.left, &mut c.right);
        child
    }

    /// Content-swap right rotation. Returns the slot now holding the content
    /// that was at `node`.
    fn rotate_right(&mut self, node: NodeIndex) -> NodeIndex {
        let child = self.nodes[node.get()].left;
        let child_left = self.nodes[child.get()].left;
        if !child_left.is_nil() {
            self.nodes[child_left.get()].parent = node;
        }
        let node_right = self.nodes[node.get()].right;
        if !node_right.is_nil() {
            self.nodes[node_right.get()].parent = child;
        }
        self.remap_extrema(node, child);
        let (n, c) = self.pair_mut(node.get(), child.get());
        mem::swap(&mut n.key, &mut c.key);
        mem::swap(&mut n.value, &mut c.value);
        mem::swap(&mut n.color, &mut c.color);
        mem::swap(&mut n.right, &mut c.left);
        mem::swap(&mut n.left, &mut n.right);
        mem::swap(&mut c.left, &mut c.right);
        child
    }

    /// Keeps the extremum caches pointing at the min/max content when two
    /// slots exchange contents.
    fn remap_extrema(&mut self, a: NodeIndex, b: NodeIndex) {
        if self.first == a {
            self.first = b;
        } else if self.first == b {
            self.first = a;
        }
        if self.last == a {
            self.last = b;
        } else if self.last == b {
            self.last = a;
        }
    }

    fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Node<K, V>, &mut Node<K, V>) {
        debug_assert_ne!(a, b);
        if a < b {
            let (low, high) = self.nodes.split_at_mut(b);
            (&mut low[a], &mut high[0])
        } else {
            let (low, high) = self.nodes.split_at_mut(a);
            (&mut high[0], &mut low[b])
        }
    }
}
