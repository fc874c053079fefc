//! An ordered set with a hash index for O(1) membership tests.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::ops::RangeBounds;

use hashbrown::DefaultHashBuilder;

use crate::hash_flat_map::{self, HashFlatMap};

/// An ordered set with hash-indexed membership tests.
///
/// This is a thin wrapper over [`HashFlatMap`] with unit values: membership
/// checks, insertion, and removal resolve through the hash index in O(1)
/// expected time, while iteration and the extremum accessors use the tree
/// order. Items must implement [`Hash`], [`Ord`], and [`Default`]; see
/// [`HashFlatMap`] for why `Default` is required.
///
/// # Examples
///
/// ```
/// use flatrb::HashFlatSet;
///
/// let mut primes: HashFlatSet<u32> = HashFlatSet::new();
/// primes.insert(5);
/// primes.insert(2);
/// primes.insert(3);
///
/// // O(1) membership test.
/// assert!(primes.contains(&3));
/// assert!(!primes.contains(&4));
///
/// // Iteration is in ascending order.
/// let sorted: Vec<_> = primes.iter().copied().collect();
/// assert_eq!(sorted, [2, 3, 5]);
/// ```
pub struct HashFlatSet<T, S = DefaultHashBuilder> {
    map: HashFlatMap<T, (), S>,
}

/// An iterator over the items of a `HashFlatSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`HashFlatSet`]. See
/// its documentation for more.
///
/// [`iter`]: HashFlatSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T, S> {
    inner: hash_flat_map::Keys<'a, T, (), S>,
}

/// An owning iterator over the items of a `HashFlatSet`, sorted by item.
///
/// This `struct` is created by the [`into_iter`] method on [`HashFlatSet`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<T> {
    inner: hash_flat_map::IntoIter<T, ()>,
}

/// An iterator over a sub-range of items in a `HashFlatSet`.
///
/// This `struct` is created by the [`range`] method on [`HashFlatSet`]. See
/// its documentation for more.
///
/// [`range`]: HashFlatSet::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T, S> {
    inner: hash_flat_map::Range<'a, T, (), S>,
}

impl<T: Default> HashFlatSet<T, DefaultHashBuilder> {
    /// Makes a new, empty `HashFlatSet` with a small default capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatSet;
    ///
    /// let mut set: HashFlatSet<u32> = HashFlatSet::new();
    /// set.insert(1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        HashFlatSet {
            map: HashFlatMap::new(),
        }
    }

    /// Makes a new, empty `HashFlatSet` with room for at least `capacity`
    /// items before the table grows.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds the maximum addressable number
    /// of items.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        HashFlatSet {
            map: HashFlatMap::with_capacity(capacity),
        }
    }
}

impl<T: Default, S> HashFlatSet<T, S> {
    /// Makes a new, empty `HashFlatSet` using `hasher` to hash items, with a
    /// small default capacity.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        HashFlatSet {
            map: HashFlatMap::with_hasher(hasher),
        }
    }

    /// Makes a new, empty `HashFlatSet` with room for at least `capacity`
    /// items, using `hasher` to hash items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds the maximum addressable number
    /// of items.
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        HashFlatSet {
            map: HashFlatMap::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Clears the set, removing all elements. The allocation is kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<T, S> HashFlatSet<T, S> {
    /// Returns the number of elements in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of items the set can hold without growing.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Returns a reference to the set's [`BuildHasher`].
    #[must_use]
    pub const fn hasher(&self) -> &S {
        self.map.hasher()
    }

    /// Returns a reference to the first element in the set, if any. This
    /// element is always the minimum of all elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached minimum.
    #[allow(clippy::must_use_candidate)]
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(item, ())| item)
    }

    /// Returns a reference to the last element in the set, if any. This
    /// element is always the maximum of all elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached maximum.
    #[allow(clippy::must_use_candidate)]
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|(item, ())| item)
    }

    /// Returns the first element greater than or equal to `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.lower_bound(value).map(|(item, ())| item)
    }

    /// Returns the first element strictly greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.upper_bound(value).map(|(item, ())| item)
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the
    /// set.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatSet;
    ///
    /// let mut set: HashFlatSet<u32> = HashFlatSet::new();
    /// set.insert(3);
    /// set.insert(5);
    /// set.insert(8);
    /// let in_range: Vec<_> = set.range(4..=8).copied().collect();
    /// assert_eq!(in_range, [5, 8]);
    /// ```
    pub fn range<T2, R>(&self, range: R) -> Range<'_, T, S>
    where
        T2: ?Sized + Ord,
        T: Borrow<T2> + Ord,
        R: RangeBounds<T2>,
    {
        Range {
            inner: self.map.range(range),
        }
    }

    /// Gets an iterator that visits the elements in the set in ascending
    /// order.
    pub fn iter(&self) -> Iter<'_, T, S> {
        Iter {
            inner: self.map.keys(),
        }
    }
}

impl<T, S: BuildHasher> HashFlatSet<T, S> {
    /// Returns `true` if the set contains an element equal to the value.
    ///
    /// # Complexity
    ///
    /// O(1) expected - resolves through the hash index, not the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatSet;
    ///
    /// let mut set: HashFlatSet<u32> = HashFlatSet::new();
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(value)
    }

    /// Returns a reference to the element in the set, if any, that is equal
    /// to the value.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get_key_value(value).map(|(item, ())| item)
    }
}

impl<T, S> HashFlatSet<T, S>
where
    T: Ord + Hash + Default,
    S: BuildHasher + Clone,
{
    /// Reserves capacity for at least `additional` more items, rehashing if
    /// the table must grow.
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// Shrinks the table to the smallest capacity holding the current items,
    /// rehashing if it shrinks.
    pub fn shrink_to_fit(&mut self) {
        self.map.shrink_to_fit();
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain an equal value, `true` is
    ///   returned.
    /// - If the set already contained an equal value, `false` is returned,
    ///   and the entry is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatSet;
    ///
    /// let mut set: HashFlatSet<u32> = HashFlatSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// If the set contains an element equal to the value, removes it from the
    /// set and drops it. Returns whether such an element was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the element in the set, if any, that is equal to
    /// the value.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove_entry(value).map(|(item, ())| item)
    }

    /// Removes the first element from the set and returns it, if any. The
    /// first element is always the minimum element in the set.
    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(item, ())| item)
    }

    /// Removes the last element from the set and returns it, if any. The last
    /// element is always the maximum element in the set.
    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(item, ())| item)
    }

    /// Moves all elements from `other` into `self`, leaving `other` empty.
    pub fn append(&mut self, other: &mut Self) {
        self.map.append(&mut other.map);
    }
}

impl<T: Default, S: Default> Default for HashFlatSet<T, S> {
    /// Creates an empty `HashFlatSet` with the default hasher.
    fn default() -> Self {
        HashFlatSet {
            map: HashFlatMap::default(),
        }
    }
}

impl<T: Clone, S: Clone> Clone for HashFlatSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for HashFlatSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, S> PartialEq for HashFlatSet<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, S> Eq for HashFlatSet<T, S> {}

impl<T, S> FromIterator<T> for HashFlatSet<T, S>
where
    T: Ord + Hash + Default,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashFlatSet::default();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashFlatSet<T, S>
where
    T: Ord + Hash + Default,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for HashFlatSet<T, DefaultHashBuilder>
where
    T: Ord + Hash + Default,
{
    /// Converts a `[T; N]` into a `HashFlatSet<T>`.
    ///
    /// ```
    /// use flatrb::HashFlatSet;
    ///
    /// let set1 = HashFlatSet::from([1, 2, 3]);
    /// let set2: HashFlatSet<_> = [1, 2, 3].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<'a, T, S> IntoIterator for &'a HashFlatSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Iter<'a, T, S> {
        self.iter()
    }
}

impl<T: Ord, S> IntoIterator for HashFlatSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an owning iterator over the elements of the set, in ascending
    /// order.
    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T, S> Iterator for Iter<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T, S> DoubleEndedIterator for Iter<'a, T, S> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T, S> ExactSizeIterator for Iter<'_, T, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T, S> FusedIterator for Iter<'_, T, S> {}

impl<T, S> Clone for Iter<'_, T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for Iter<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|(item, ())| item)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<'a, T, S> Iterator for Range<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T, S> DoubleEndedIterator for Range<'a, T, S> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().map(|(item, ())| item)
    }
}

impl<T, S> FusedIterator for Range<'_, T, S> {}

impl<T, S> Clone for Range<'_, T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
