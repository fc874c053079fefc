use core::fmt;
use core::mem;

use crate::raw::{NodeIndex, RawFlatTree};

/// A view into a single entry in a map, which may either be vacant or occupied.
///
/// This `enum` is constructed from the [`entry`] method on [`FlatMap`].
///
/// [`entry`]: crate::FlatMap::entry
/// [`FlatMap`]: crate::FlatMap
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

/// A view into an occupied entry in a `FlatMap`. It is part of the [`Entry`] enum.
pub struct OccupiedEntry<'a, K, V> {
    pub(super) index: NodeIndex,
    pub(super) tree: &'a mut RawFlatTree<K, V>,
}

/// A view into a vacant entry in a `FlatMap`. It is part of the [`Entry`] enum.
pub struct VacantEntry<'a, K, V> {
    pub(super) key: K,
    pub(super) tree: &'a mut RawFlatTree<K, V>,
}

impl<'a, K: Ord, V> Entry<'a, K, V> {
    /// Ensures a value is in the entry by inserting the default if empty, and
    /// returns a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map: FlatMap<&str, usize> = FlatMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// assert_eq!(map["poneyland"], 12);
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the default
    /// function if empty, and returns a mutable reference to the value in the
    /// entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map: FlatMap<&str, String> = FlatMap::new();
    /// let s = "hoho".to_string();
    ///
    /// map.entry("poneyland").or_insert_with(|| s);
    ///
    /// assert_eq!(map["poneyland"], "hoho".to_string());
    /// ```
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Ensures a value is in the entry by inserting the default value if
    /// empty, and returns a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map: FlatMap<&str, Option<usize>> = FlatMap::new();
    /// map.entry("poneyland").or_default();
    ///
    /// assert_eq!(map["poneyland"], None);
    /// ```
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }

    /// Returns a reference to this entry's key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map: FlatMap<&str, usize> = FlatMap::new();
    /// assert_eq!(map.entry("poneyland").key(), &"poneyland");
    /// ```
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map: FlatMap<&str, usize> = FlatMap::new();
    ///
    /// map.entry("poneyland").and_modify(|e| *e += 1).or_insert(42);
    /// assert_eq!(map["poneyland"], 42);
    ///
    /// map.entry("poneyland").and_modify(|e| *e += 1).or_insert(42);
    /// assert_eq!(map["poneyland"], 43);
    /// ```
    #[must_use]
    pub fn and_modify<F: FnOnce(&mut V)>(self, f: F) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

impl<K, V> OccupiedEntry<'_, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        self.tree.key(self.index)
    }

    /// Gets a reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{FlatMap, flat_map::Entry};
    ///
    /// let mut map: FlatMap<&str, usize> = FlatMap::new();
    /// map.insert("poneyland", 12);
    ///
    /// if let Entry::Occupied(entry) = map.entry("poneyland") {
    ///     assert_eq!(entry.get(), &12);
    /// }
    /// ```
    pub fn get(&self) -> &V {
        self.tree.value(self.index)
    }

    /// Gets a mutable reference to the value in the entry.
    ///
    /// If you need a reference to the value which may outlive the entry, see
    /// [`into_mut`](Self::into_mut).
    pub fn get_mut(&mut self) -> &mut V {
        self.tree.value_mut(self.index)
    }

    /// Sets the value of the entry, and returns the entry's old value.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{FlatMap, flat_map::Entry};
    ///
    /// let mut map: FlatMap<&str, usize> = FlatMap::new();
    /// map.insert("poneyland", 12);
    ///
    /// if let Entry::Occupied(mut entry) = map.entry("poneyland") {
    ///     assert_eq!(entry.insert(15), 12);
    /// }
    /// assert_eq!(map["poneyland"], 15);
    /// ```
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Converts the entry into a mutable reference to its value, with a
    /// lifetime bound to the map itself.
    pub fn into_mut(self) -> &'a mut V {
        self.tree.value_mut(self.index)
    }
}

impl<K: Ord, V> OccupiedEntry<'_, K, V> {
    /// Takes the value of the entry out of the map, and returns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{FlatMap, flat_map::Entry};
    ///
    /// let mut map: FlatMap<&str, usize> = FlatMap::new();
    /// map.insert("poneyland", 12);
    ///
    /// if let Entry::Occupied(entry) = map.entry("poneyland") {
    ///     assert_eq!(entry.remove(), 12);
    /// }
    /// assert!(!map.contains_key("poneyland"));
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Takes ownership of the key and value from the map.
    #[allow(clippy::must_use_candidate)]
    pub fn remove_entry(self) -> (K, V) {
        self.tree.remove_at(self.index)
    }
}

impl<K, V> VacantEntry<'_, K, V> {
    /// Gets a reference to the key that would be used when inserting a value
    /// through the `VacantEntry`.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    #[allow(clippy::must_use_candidate)]
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<'a, K: Ord, V> VacantEntry<'a, K, V> {
    /// Sets the value of the entry with the `VacantEntry`'s key, and returns
    /// a mutable reference to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{FlatMap, flat_map::Entry};
    ///
    /// let mut map: FlatMap<&str, u32> = FlatMap::new();
    ///
    /// if let Entry::Vacant(entry) = map.entry("poneyland") {
    ///     entry.insert(37);
    /// }
    /// assert_eq!(map["poneyland"], 37);
    /// ```
    pub fn insert(self, value: V) -> &'a mut V {
        let (index, _) = self.tree.insert(self.key, value);
        self.tree.value_mut(index)
    }
}

impl<K: fmt::Debug + Ord, V: fmt::Debug> fmt::Debug for Entry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Vacant(entry) => f.debug_tuple("Entry").field(entry).finish(),
            Entry::Occupied(entry) => f.debug_tuple("Entry").field(entry).finish(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OccupiedEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedEntry").field("key", self.key()).field("value", self.get()).finish()
    }
}

impl<K: fmt::Debug, V> fmt::Debug for VacantEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VacantEntry").field(self.key()).finish()
    }
}
