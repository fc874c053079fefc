use core::fmt;

#[cfg(test)]
type RawIndex = u16;
#[cfg(not(test))]
type RawIndex = u32;

/// Position of a node in the backing slot array.
///
/// The all-ones bit pattern is reserved as the "no node" sentinel so that
/// parent/child links never dangle. Links stay valid when the array is moved
/// or grown, which is the whole point of index-based linkage.
#[derive(Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct NodeIndex(RawIndex);

impl NodeIndex {
    /// The "no node" sentinel.
    pub(crate) const NIL: Self = Self(RawIndex::MAX);
    /// Largest number of live nodes the index width can address.
    /// Slot `RawIndex::MAX` itself is never used; it is the sentinel.
    pub(crate) const MAX_LEN: usize = RawIndex::MAX as usize;

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < Self::MAX_LEN, "`NodeIndex::new()` - `index` collides with the sentinel!");
        #[allow(clippy::cast_possible_truncation)]
        Self(index as RawIndex)
    }

    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) const fn is_nil(self) -> bool {
        self.0 == RawIndex::MAX
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::NIL
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("NodeIndex(nil)")
        } else {
            f.debug_tuple("NodeIndex").field(&self.0).finish()
        }
    }
}

/// Index of the next slot in a collision chain. Zero terminates the chain;
/// slot 0 can only ever head a chain, so the encoding is unambiguous.
pub(crate) type ChainIndex = RawIndex;

pub(crate) const CHAIN_END: ChainIndex = 0;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Verify our assumptions about the index width.
    assert_eq_size!(NodeIndex, RawIndex);

    #[test]
    fn nil_is_nil() {
        assert!(NodeIndex::NIL.is_nil());
        assert!(!NodeIndex::new(0).is_nil());
        assert_eq!(NodeIndex::default(), NodeIndex::NIL);
    }

    proptest! {
        #[test]
        fn index_round_trip(index in 0..NodeIndex::MAX_LEN) {
            let node = NodeIndex::new(index);
            prop_assert_eq!(node.get(), index);
            prop_assert!(!node.is_nil());
        }
    }
}
