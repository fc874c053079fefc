//! An ordered map with a hash index for O(1) point lookups.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Bound, Index, RangeBounds};

use hashbrown::DefaultHashBuilder;

use crate::flat_map::validate_range_bounds;
use crate::raw::{NodeIndex, RawHashTree};

mod entry;

pub use entry::{Entry, OccupiedEntry, VacantEntry};

/// Capacity used by `new` before the first explicit reservation.
const DEFAULT_CAPACITY: usize = 16;

/// An ordered map with hash-indexed point lookups.
///
/// `HashFlatMap` stores a red-black tree and an open-addressing hash table in
/// the *same* slot array: every record is simultaneously a hash bucket and a
/// tree node. Point operations ([`get`], [`contains_key`], [`insert`],
/// [`remove`]) resolve through the hash index in O(1) expected time, while
/// ordered operations ([`first_key_value`], [`lower_bound`], [`range`],
/// iteration) use the tree links and cost O(log n) or better. The tree
/// rebalances by relinking, never by moving records, so the hash addressing
/// stays intact through every rotation.
///
/// Because vacated slots keep placeholder records, both the key and value
/// types must implement [`Default`]. Keys must implement [`Hash`] and [`Ord`];
/// the hash drives placement, the order drives the tree.
///
/// The table resizes by doubling when full, which rehashes every entry;
/// [`with_capacity`] avoids that churn when the size is known up front.
///
/// [`get`]: HashFlatMap::get
/// [`contains_key`]: HashFlatMap::contains_key
/// [`insert`]: HashFlatMap::insert
/// [`remove`]: HashFlatMap::remove
/// [`first_key_value`]: HashFlatMap::first_key_value
/// [`lower_bound`]: HashFlatMap::lower_bound
/// [`range`]: HashFlatMap::range
/// [`with_capacity`]: HashFlatMap::with_capacity
///
/// # Examples
///
/// ```
/// use flatrb::HashFlatMap;
///
/// let mut deadlines: HashFlatMap<u32, &str> = HashFlatMap::new();
/// deadlines.insert(20260901, "design review");
/// deadlines.insert(20260815, "feature freeze");
/// deadlines.insert(20261001, "release");
///
/// // O(1) lookup by key.
/// assert_eq!(deadlines.get(&20260901), Some(&"design review"));
///
/// // Ordered access still works.
/// assert_eq!(deadlines.first_key_value(), Some((&20260815, &"feature freeze")));
/// let upcoming: Vec<_> = deadlines.range(20260901..).map(|(_, what)| *what).collect();
/// assert_eq!(upcoming, ["design review", "release"]);
/// ```
pub struct HashFlatMap<K, V, S = DefaultHashBuilder> {
    raw: RawHashTree<K, V, S>,
}

/// An iterator over the entries of a `HashFlatMap`, sorted by key.
///
/// This `struct` is created by the [`iter`] method on [`HashFlatMap`]. See
/// its documentation for more.
///
/// [`iter`]: HashFlatMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, S> {
    tree: *const RawHashTree<K, V, S>,
    front: NodeIndex,
    back: NodeIndex,
    remaining: usize,
    _marker: PhantomData<&'a RawHashTree<K, V, S>>,
}

// SAFETY: Iter behaves as &RawHashTree<K, V, S>, so it is Send/Sync when the tree is Sync.
unsafe impl<K: Sync, V: Sync, S: Sync> Send for Iter<'_, K, V, S> {}
unsafe impl<K: Sync, V: Sync, S: Sync> Sync for Iter<'_, K, V, S> {}

/// A mutable iterator over the entries of a `HashFlatMap`, sorted by key.
///
/// This `struct` is created by the [`iter_mut`] method on [`HashFlatMap`].
/// See its documentation for more.
///
/// [`iter_mut`]: HashFlatMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K: 'a, V: 'a, S> {
    tree: *mut RawHashTree<K, V, S>,
    front: NodeIndex,
    back: NodeIndex,
    remaining: usize,
    _marker: PhantomData<&'a mut (K, V)>,
}

// SAFETY: IterMut behaves as &mut RawHashTree<K, V, S>, so it is Send when K and V are Send.
// It is NOT Sync because mutable iterators should not be shared across threads.
unsafe impl<K: Send, V: Send, S: Send> Send for IterMut<'_, K, V, S> {}

/// An owning iterator over the entries of a `HashFlatMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`HashFlatMap`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `HashFlatMap`, in sorted order.
///
/// This `struct` is created by the [`keys`] method on [`HashFlatMap`].
///
/// [`keys`]: HashFlatMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

/// An iterator over the values of a `HashFlatMap`, in order by key.
///
/// This `struct` is created by the [`values`] method on [`HashFlatMap`].
///
/// [`values`]: HashFlatMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

/// A mutable iterator over the values of a `HashFlatMap`, in order by key.
///
/// This `struct` is created by the [`values_mut`] method on [`HashFlatMap`].
///
/// [`values_mut`]: HashFlatMap::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V, S> {
    inner: IterMut<'a, K, V, S>,
}

/// An owning iterator over the keys of a `HashFlatMap`, in sorted order.
///
/// This `struct` is created by the [`into_keys`] method on [`HashFlatMap`].
///
/// [`into_keys`]: HashFlatMap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

/// An owning iterator over the values of a `HashFlatMap`, in order by key.
///
/// This `struct` is created by the [`into_values`] method on [`HashFlatMap`].
///
/// [`into_values`]: HashFlatMap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

/// An iterator over a sub-range of entries in a `HashFlatMap`.
///
/// This `struct` is created by the [`range`] method on [`HashFlatMap`]. See
/// its documentation for more.
///
/// [`range`]: HashFlatMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K: 'a, V: 'a, S> {
    tree: *const RawHashTree<K, V, S>,
    front: NodeIndex,
    back: NodeIndex,
    /// Tracks whether the iterator has been exhausted (front and back have crossed).
    finished: bool,
    _marker: PhantomData<&'a RawHashTree<K, V, S>>,
}

// SAFETY: Range behaves as &RawHashTree<K, V, S>, so it is Send/Sync when the tree is Sync.
unsafe impl<K: Sync, V: Sync, S: Sync> Send for Range<'_, K, V, S> {}
unsafe impl<K: Sync, V: Sync, S: Sync> Sync for Range<'_, K, V, S> {}

impl<K: Default, V: Default> HashFlatMap<K, V, DefaultHashBuilder> {
    /// Makes a new, empty `HashFlatMap` with a small default capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Makes a new, empty `HashFlatMap` with room for at least `capacity`
    /// entries before the table grows.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds the maximum addressable number
    /// of entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K: Default, V: Default, S> HashFlatMap<K, V, S> {
    /// Makes a new, empty `HashFlatMap` using `hasher` to hash keys, with a
    /// small default capacity.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Makes a new, empty `HashFlatMap` with room for at least `capacity`
    /// entries, using `hasher` to hash keys.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds the maximum addressable number
    /// of entries.
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        HashFlatMap {
            raw: RawHashTree::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Clears the map, removing all elements. The allocation is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

impl<K, V, S> HashFlatMap<K, V, S> {
    /// Returns the number of elements in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of entries the map can hold without growing.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns a reference to the map's [`BuildHasher`].
    #[must_use]
    pub const fn hasher(&self) -> &S {
        self.raw.hasher()
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached minimum.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(2, "a");
    /// map.insert(1, "b");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let first = self.raw.first();
        if first.is_nil() { None } else { Some(self.raw.pair(first)) }
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached maximum.
    #[allow(clippy::must_use_candidate)]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let last = self.raw.last();
        if last.is_nil() { None } else { Some(self.raw.pair(last)) }
    }

    /// Returns the first entry whose key is greater than or equal to `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = self.raw.lower_bound_index(key);
        if index.is_nil() { None } else { Some(self.raw.pair(index)) }
    }

    /// Returns the first entry whose key is strictly greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = self.raw.upper_bound_index(key);
        if index.is_nil() { None } else { Some(self.raw.pair(index)) }
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the
    /// map.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// map.insert(3, "a");
    /// map.insert(5, "b");
    /// map.insert(8, "c");
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// ```
    pub fn range<T, R>(&self, range: R) -> Range<'_, K, V, S>
    where
        T: ?Sized + Ord,
        K: Borrow<T> + Ord,
        R: RangeBounds<T>,
    {
        validate_range_bounds(&range);

        let front = match range.start_bound() {
            Bound::Unbounded => self.raw.first(),
            Bound::Included(start) => self.raw.lower_bound_index(start),
            Bound::Excluded(start) => self.raw.upper_bound_index(start),
        };
        let back = match range.end_bound() {
            Bound::Unbounded => self.raw.last(),
            Bound::Included(end) => {
                let beyond = self.raw.upper_bound_index(end);
                if beyond.is_nil() { self.raw.last() } else { self.raw.predecessor(beyond) }
            }
            Bound::Excluded(end) => {
                let beyond = self.raw.lower_bound_index(end);
                if beyond.is_nil() { self.raw.last() } else { self.raw.predecessor(beyond) }
            }
        };
        let finished = front.is_nil() || back.is_nil() || self.raw.key(front) > self.raw.key(back);

        Range {
            tree: &raw const self.raw,
            front,
            back,
            finished,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// map.insert(3, "c");
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let keys: Vec<_> = map.iter().map(|(&k, _)| k).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            tree: &raw const self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
            _marker: PhantomData,
        }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, S> {
        IterMut {
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
            tree: &raw mut self.raw,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V, S> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V, S> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, S> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    pub fn into_keys(self) -> IntoKeys<K, V>
    where
        K: Ord,
    {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    pub fn into_values(self) -> IntoValues<K, V>
    where
        K: Ord,
    {
        IntoValues {
            inner: self.into_iter(),
        }
    }
}

impl<K, V, S: BuildHasher> HashFlatMap<K, V, S> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but [`Hash`]
    /// and [`Eq`] on the borrowed form *must* match those on the key type.
    ///
    /// # Complexity
    ///
    /// O(1) expected - resolves through the hash index, not the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.raw.find_index(key);
        if index.is_nil() { None } else { Some(self.raw.value(index)) }
    }

    /// Returns the key-value pair corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.raw.find_index(key);
        if index.is_nil() { None } else { Some(self.raw.pair(index)) }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.raw.find_index(key);
        if index.is_nil() { None } else { Some(self.raw.value_mut(index)) }
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(1) expected.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        !self.raw.find_index(key).is_nil()
    }
}

impl<K, V, S> HashFlatMap<K, V, S>
where
    K: Ord + Hash + Default,
    V: Default,
    S: BuildHasher + Clone,
{
    /// Reserves capacity for at least `additional` more entries, rehashing if
    /// the table must grow.
    pub fn reserve(&mut self, additional: usize) {
        self.raw.reserve(additional);
    }

    /// Shrinks the table to the smallest capacity holding the current
    /// entries, rehashing if it shrinks.
    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink_to_fit();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated.
    ///
    /// # Panics
    ///
    /// Panics if the map is at the maximum addressable number of entries.
    ///
    /// # Complexity
    ///
    /// O(log n); amortized over growth rehashes. The hash placement itself is
    /// O(1) expected.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value).1
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.remove(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.remove(key)
    }

    /// Removes and returns the first element in the map.
    /// The key of this element is the minimum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<u32, &str> = HashFlatMap::new();
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// assert_eq!(map.pop_first(), Some((2, "b")));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let first = self.raw.first();
        if first.is_nil() { None } else { Some(self.raw.remove_at(first)) }
    }

    /// Removes and returns the last element in the map.
    /// The key of this element is the maximum key that was in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.raw.last();
        if last.is_nil() { None } else { Some(self.raw.remove_at(last)) }
    }

    /// Moves all elements from `other` into `self`, leaving `other` empty.
    ///
    /// If a key from `other` is already present in `self`, the respective
    /// value from `self` will be overwritten with the respective value from
    /// `other`.
    pub fn append(&mut self, other: &mut Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            core::mem::swap(&mut self.raw, &mut other.raw);
            return;
        }
        let hasher = other.raw.hasher().clone();
        let raw = core::mem::replace(&mut other.raw, RawHashTree::with_capacity_and_hasher(1, hasher));
        for (key, value) in raw.into_entries() {
            self.raw.insert(key, value);
        }
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut count: HashFlatMap<u32, usize> = HashFlatMap::new();
    ///
    /// for x in [1, 2, 1, 3, 1, 2] {
    ///     count.entry(x).and_modify(|curr| *curr += 1).or_insert(1);
    /// }
    ///
    /// assert_eq!(count[&1], 3);
    /// assert_eq!(count[&2], 2);
    /// assert_eq!(count[&3], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let index = self.raw.find_index(&key);
        if index.is_nil() {
            Entry::Vacant(VacantEntry {
                key,
                tree: &mut self.raw,
            })
        } else {
            Entry::Occupied(OccupiedEntry {
                index,
                tree: &mut self.raw,
            })
        }
    }
}

impl<K: Default, V: Default, S: Default> Default for HashFlatMap<K, V, S> {
    /// Creates an empty `HashFlatMap` with the default hasher.
    fn default() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, S::default())
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for HashFlatMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashFlatMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, S> PartialEq for HashFlatMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, S> Eq for HashFlatMap<K, V, S> {}

impl<K, V, S> FromIterator<(K, V)> for HashFlatMap<K, V, S>
where
    K: Ord + Hash + Default,
    V: Default,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashFlatMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for HashFlatMap<K, V, S>
where
    K: Ord + Hash + Default,
    V: Default,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for HashFlatMap<K, V, DefaultHashBuilder>
where
    K: Ord + Hash + Default,
    V: Default,
{
    /// Converts a `[(K, V); N]` into a `HashFlatMap<K, V>`.
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let map1 = HashFlatMap::from([(1, 2), (3, 4)]);
    /// let map2: HashFlatMap<_, _> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, Q, V, S> Index<&Q> for HashFlatMap<K, V, S>
where
    K: Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `HashFlatMap`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashFlatMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Iter<'a, K, V, S> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashFlatMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, S>;

    fn into_iter(self) -> IterMut<'a, K, V, S> {
        self.iter_mut()
    }
}

impl<K: Ord, V, S> IntoIterator for HashFlatMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.into_entries().into_iter(),
        }
    }
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: The PhantomData lifetime keeps the tree borrowed shared for
        // 'a, so the pointer stays valid and unaliased by mutation.
        let tree: &'a RawHashTree<K, V, S> = unsafe { &*self.tree };
        let index = self.front;
        self.front = tree.successor(index);
        Some(tree.pair(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, S> DoubleEndedIterator for Iter<'a, K, V, S> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: As in `next`.
        let tree: &'a RawHashTree<K, V, S> = unsafe { &*self.tree };
        let index = self.back;
        self.back = tree.predecessor(index);
        Some(tree.pair(index))
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, S> FusedIterator for Iter<'_, K, V, S> {}

impl<K, V, S> Clone for Iter<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for Iter<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, S> Iterator for IterMut<'a, K, V, S> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let index = self.front;
        // SAFETY: Each index is yielded exactly once, so the value reference
        // handed out here is never produced again; the successor walk reads
        // only link fields, which no yielded reference aliases.
        unsafe {
            self.front = RawHashTree::successor_ptr(self.tree, index);
            Some(RawHashTree::pair_mut_ptr(self.tree, index))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, S> DoubleEndedIterator for IterMut<'a, K, V, S> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let index = self.back;
        // SAFETY: As in `next`.
        unsafe {
            self.back = RawHashTree::predecessor_ptr(self.tree, index);
            Some(RawHashTree::pair_mut_ptr(self.tree, index))
        }
    }
}

impl<K, V, S> ExactSizeIterator for IterMut<'_, K, V, S> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, S> FusedIterator for IterMut<'_, K, V, S> {}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<'a, K, V, S> Iterator for Keys<'a, K, V, S> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, S> DoubleEndedIterator for Keys<'a, K, V, S> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V, S> ExactSizeIterator for Keys<'_, K, V, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, S> FusedIterator for Keys<'_, K, V, S> {}

impl<K, V, S> Clone for Keys<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V, S> Iterator for Values<'a, K, V, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, S> DoubleEndedIterator for Values<'a, K, V, S> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, S> ExactSizeIterator for Values<'_, K, V, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, S> FusedIterator for Values<'_, K, V, S> {}

impl<K, V, S> Clone for Values<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V, S> Iterator for ValuesMut<'a, K, V, S> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, S> DoubleEndedIterator for ValuesMut<'a, K, V, S> {
    fn next_back(&mut self) -> Option<&'a mut V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, S> ExactSizeIterator for ValuesMut<'_, K, V, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, S> FusedIterator for ValuesMut<'_, K, V, S> {}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoValues<K, V> {}

impl<'a, K, V, S> Iterator for Range<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.finished {
            return None;
        }
        // SAFETY: The PhantomData lifetime keeps the tree borrowed shared for
        // 'a, so the pointer stays valid and unaliased by mutation.
        let tree: &'a RawHashTree<K, V, S> = unsafe { &*self.tree };
        let index = self.front;
        if index == self.back {
            self.finished = true;
        } else {
            self.front = tree.successor(index);
        }
        Some(tree.pair(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished { (0, Some(0)) } else { (1, None) }
    }
}

impl<'a, K, V, S> DoubleEndedIterator for Range<'a, K, V, S> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.finished {
            return None;
        }
        // SAFETY: As in `next`.
        let tree: &'a RawHashTree<K, V, S> = unsafe { &*self.tree };
        let index = self.back;
        if index == self.front {
            self.finished = true;
        } else {
            self.back = tree.predecessor(index);
        }
        Some(tree.pair(index))
    }
}

impl<K, V, S> FusedIterator for Range<'_, K, V, S> {}

impl<K, V, S> Clone for Range<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            finished: self.finished,
            _marker: PhantomData,
        }
    }
}
