use super::index::{CHAIN_END, ChainIndex, NodeIndex};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// A node of the dense flat tree. Nodes are stored by value in a `Vec` and
/// reference each other by index only.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: NodeIndex,
    pub(crate) left: NodeIndex,
    pub(crate) right: NodeIndex,
    pub(crate) color: Color,
}

impl<K, V> Node<K, V> {
    /// New nodes enter the tree red, as leaves.
    pub(crate) fn new(key: K, value: V, parent: NodeIndex) -> Self {
        Self {
            key,
            value,
            parent,
            left: NodeIndex::NIL,
            right: NodeIndex::NIL,
            color: Color::Red,
        }
    }
}

// Packed status word layout:
//   bit 0      occupancy (1 = full)
//   bit 1      tree color (1 = black)
//   bits 2..   hash fingerprint
const FULL_BIT: u64 = 1;
const BLACK_BIT: u64 = 2;

/// The fingerprint a slot occupied with `hash` will carry.
#[inline]
pub(crate) fn fingerprint_of(hash: u64) -> u64 {
    hash >> 2
}

/// A slot of the hash-indexed tree. The same record serves as hash bucket,
/// collision-chain link, and tree node; which roles are active is encoded in
/// the status word and the `next` link.
#[derive(Clone)]
pub(crate) struct HashSlot<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) status: u64,
    pub(crate) next: ChainIndex,
    pub(crate) parent: NodeIndex,
    pub(crate) left: NodeIndex,
    pub(crate) right: NodeIndex,
}

impl<K: Default, V: Default> Default for HashSlot<K, V> {
    fn default() -> Self {
        Self {
            key: K::default(),
            value: V::default(),
            status: 0,
            next: CHAIN_END,
            parent: NodeIndex::NIL,
            left: NodeIndex::NIL,
            right: NodeIndex::NIL,
        }
    }
}

impl<K, V> HashSlot<K, V> {
    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.status & FULL_BIT != 0
    }

    #[inline]
    pub(crate) fn fingerprint(&self) -> u64 {
        self.status >> 2
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        if self.status & BLACK_BIT != 0 { Color::Black } else { Color::Red }
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        match color {
            Color::Red => self.status &= !BLACK_BIT,
            Color::Black => self.status |= BLACK_BIT,
        }
    }

    /// Stores the hash as the slot's fingerprint and marks it full and red.
    #[inline]
    pub(crate) fn occupy(&mut self, hash: u64) {
        self.status = (hash & !BLACK_BIT) | FULL_BIT;
    }

    /// Clears only the occupancy bit; the fingerprint is stale but unread.
    #[inline]
    pub(crate) fn vacate(&mut self) {
        self.status &= !FULL_BIT;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fresh_node_is_red_leaf() {
        let node: Node<u32, u32> = Node::new(1, 2, NodeIndex::NIL);
        assert_eq!(node.color, Color::Red);
        assert!(node.left.is_nil());
        assert!(node.right.is_nil());
    }

    #[test]
    fn default_slot_is_empty() {
        let slot: HashSlot<u32, u32> = HashSlot::default();
        assert!(!slot.is_full());
        assert_eq!(slot.next, CHAIN_END);
        assert!(slot.parent.is_nil());
    }

    proptest! {
        #[test]
        fn status_word_round_trip(hash in any::<u64>()) {
            let mut slot: HashSlot<u32, u32> = HashSlot::default();
            slot.occupy(hash);
            prop_assert!(slot.is_full());
            prop_assert_eq!(slot.color(), Color::Red);
            prop_assert_eq!(slot.fingerprint(), fingerprint_of(hash));

            slot.set_color(Color::Black);
            prop_assert_eq!(slot.color(), Color::Black);
            prop_assert_eq!(slot.fingerprint(), fingerprint_of(hash));
            prop_assert!(slot.is_full());

            slot.set_color(Color::Red);
            prop_assert_eq!(slot.color(), Color::Red);

            slot.vacate();
            prop_assert!(!slot.is_full());
        }
    }
}
