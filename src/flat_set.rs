//! An ordered set backed by a flat red-black tree.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::RangeBounds;

use crate::flat_map::{self, FlatMap};

/// An ordered set based on a flat red-black tree.
///
/// This is a thin wrapper over [`FlatMap`] with unit values; see its
/// documentation for the storage layout and performance characteristics.
///
/// It is a logic error for an item to be modified in such a way that the
/// item's ordering relative to any other item changes while it is in the set.
///
/// # Examples
///
/// ```
/// use flatrb::FlatSet;
///
/// // type inference lets us omit an explicit type signature (which
/// // would be `FlatSet<&str>` in this example).
/// let mut books = FlatSet::new();
///
/// // Add some books.
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// // Check for a specific one.
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.",
///              books.len());
/// }
///
/// // Remove a book.
/// books.remove("The Odyssey");
///
/// // Iterate over everything, in sorted order.
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A `FlatSet` with a known list of items can be initialized from an array:
///
/// ```
/// use flatrb::FlatSet;
///
/// let set = FlatSet::from([1, 2, 3]);
/// ```
pub struct FlatSet<T> {
    map: FlatMap<T, ()>,
}

/// An iterator over the items of a `FlatSet`.
///
/// This `struct` is created by the [`iter`] method on [`FlatSet`]. See its
/// documentation for more.
///
/// [`iter`]: FlatSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: flat_map::Keys<'a, T, ()>,
}

/// An owning iterator over the items of a `FlatSet`, sorted by item.
///
/// This `struct` is created by the [`into_iter`] method on [`FlatSet`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<T> {
    inner: flat_map::IntoIter<T, ()>,
}

/// An iterator over a sub-range of items in a `FlatSet`.
///
/// This `struct` is created by the [`range`] method on [`FlatSet`]. See its
/// documentation for more.
///
/// [`range`]: FlatSet::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T> {
    inner: flat_map::Range<'a, T, ()>,
}

impl<T> FlatSet<T> {
    /// Makes a new, empty `FlatSet`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut set: FlatSet<i32> = FlatSet::new();
    /// set.insert(1);
    /// ```
    #[must_use]
    pub const fn new() -> FlatSet<T> {
        FlatSet { map: FlatMap::new() }
    }

    /// Makes a new, empty `FlatSet` with room for at least `capacity` items
    /// before the backing array reallocates.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds the maximum addressable number of items.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> FlatSet<T> {
        FlatSet {
            map: FlatMap::with_capacity(capacity),
        }
    }

    /// Returns the number of items the set can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Reserves capacity for at least `additional` more items.
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// Shrinks the backing array as much as possible.
    pub fn shrink_to_fit(&mut self) {
        self.map.shrink_to_fit();
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut v = FlatSet::new();
    /// assert_eq!(v.len(), 0);
    /// v.insert(1);
    /// assert_eq!(v.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clears the set, removing all elements. The allocation is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut v = FlatSet::new();
    /// v.insert(1);
    /// v.clear();
    /// assert!(v.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns `true` if the set contains an element equal to the value.
    ///
    /// The value may be any borrowed form of the set's element type, but the
    /// ordering on the borrowed form *must* match the ordering on the element
    /// type.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let set = FlatSet::from([1, 2, 3]);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.map.contains_key(value)
    }

    /// Returns a reference to the element in the set, if any, that is equal
    /// to the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let set = FlatSet::from([1, 2, 3]);
    /// assert_eq!(set.get(&2), Some(&2));
    /// assert_eq!(set.get(&4), None);
    /// ```
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.map.get_key_value(value).map(|(item, ())| item)
    }

    /// Returns a reference to the first element in the set, if any. This
    /// element is always the minimum of all elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached minimum.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(2);
    /// set.insert(1);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
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
        T: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.map.lower_bound(value).map(|(item, ())| item)
    }

    /// Returns the first element strictly greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.map.upper_bound(value).map(|(item, ())| item)
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain an equal value, `true` is
    ///   returned.
    /// - If the set already contained an equal value, `false` is returned, and
    ///   the entry is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool
    where
        T: Ord,
    {
        self.map.insert(value, ()).is_none()
    }

    /// If the set contains an element equal to the value, removes it from the
    /// set and drops it. Returns whether such an element was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    /// set.insert(2);
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the element in the set, if any, that is equal to
    /// the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut set = FlatSet::from([1, 2, 3]);
    /// assert_eq!(set.take(&2), Some(2));
    /// assert_eq!(set.take(&2), None);
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.map.remove_entry(value).map(|(item, ())| item)
    }

    /// Removes the first element from the set and returns it, if any. The
    /// first element is always the minimum element in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    /// set.insert(1);
    /// while let Some(n) = set.pop_first() {
    ///     assert_eq!(n, 1);
    /// }
    /// assert!(set.is_empty());
    /// ```
    pub fn pop_first(&mut self) -> Option<T>
    where
        T: Ord,
    {
        self.map.pop_first().map(|(item, ())| item)
    }

    /// Removes the last element from the set and returns it, if any. The last
    /// element is always the maximum element in the set.
    pub fn pop_last(&mut self) -> Option<T>
    where
        T: Ord,
    {
        self.map.pop_last().map(|(item, ())| item)
    }

    /// Moves all elements from `other` into `self`, leaving `other` empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut a = FlatSet::from([1, 2, 3]);
    /// let mut b = FlatSet::from([3, 4, 5]);
    ///
    /// a.append(&mut b);
    ///
    /// assert_eq!(a.len(), 5);
    /// assert_eq!(b.len(), 0);
    /// ```
    pub fn append(&mut self, other: &mut Self)
    where
        T: Ord,
    {
        self.map.append(&mut other.map);
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
    /// use flatrb::FlatSet;
    ///
    /// let set = FlatSet::from([3, 5, 8]);
    /// let in_range: Vec<_> = set.range(4..=8).copied().collect();
    /// assert_eq!(in_range, [5, 8]);
    /// ```
    pub fn range<T2, R>(&self, range: R) -> Range<'_, T>
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
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let set = FlatSet::from([3, 1, 2]);
    /// let items: Vec<_> = set.iter().copied().collect();
    /// assert_eq!(items, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.keys(),
        }
    }
}

impl<T> Default for FlatSet<T> {
    /// Creates an empty `FlatSet`.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for FlatSet<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FlatSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for FlatSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq> Eq for FlatSet<T> {}

impl<T: Ord> FromIterator<T> for FlatSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = FlatSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for FlatSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<'a, T: Ord + Copy> Extend<&'a T> for FlatSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for FlatSet<T> {
    /// Converts a `[T; N]` into a `FlatSet<T>`.
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let set1 = FlatSet::from([1, 2, 3]);
    /// let set2: FlatSet<_> = [1, 2, 3].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a FlatSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Ord> IntoIterator for FlatSet<T> {
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

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
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

impl<'a, T> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Range<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().map(|(item, ())| item)
    }
}

impl<T> FusedIterator for Range<'_, T> {}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
