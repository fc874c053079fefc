//! Flat red-black tree collections for Rust.
//!
//! This crate provides [`FlatMap`] and [`FlatSet`], ordered collections with
//! the `BTreeMap`/`BTreeSet` API backed by a red-black tree stored in a
//! single contiguous array, plus [`HashFlatMap`] and [`HashFlatSet`], which
//! overlay a hash index on the same node array for O(1) point lookups while
//! keeping every ordered operation.
//!
//! # Example
//!
//! ```
//! use flatrb::FlatMap;
//!
//! let mut scores = FlatMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Standard BTreeMap operations work as expected
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.first_key_value(), Some((&"Alice", &100)));
//!
//! // Iteration is in key order
//! let names: Vec<_> = scores.keys().copied().collect();
//! assert_eq!(names, ["Alice", "Bob", "Carol"]);
//! ```
//!
//! For hash-indexed lookups:
//!
//! ```
//! use flatrb::HashFlatMap;
//!
//! let mut latencies: HashFlatMap<u32, u32> = HashFlatMap::new();
//! latencies.insert(7, 250);
//! latencies.insert(3, 120);
//!
//! // O(1) lookup, ordered traversal
//! assert_eq!(latencies.get(&7), Some(&250));
//! assert_eq!(latencies.first_key_value(), Some((&3, &120)));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Drop-in replacement** - API mirrors `std::collections::BTreeMap`/`BTreeSet`
//! - **Dense storage** - `FlatMap` keeps its nodes in a compact array prefix
//!   with no per-node allocation
//! - **O(1) lookups** - `HashFlatMap` reaches any entry through a hash index
//!   without walking the tree
//! - **O(1) extrema** - First and last entries are cached in every variant
//!
//! # Implementation
//!
//! Nodes reference each other by array index instead of pointer, with the
//! all-ones index as the null sentinel. The dense variants rebalance by
//! swapping node contents so the array stays a compact prefix; the hash
//! variants pin every record to its hash-addressed slot and rebalance by
//! relinking instead.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: We have to allow unsafe code in order to performantly match BTreeMap and BTreeSet's functionality.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod raw;

pub mod flat_map;
pub mod flat_set;
pub mod hash_flat_map;
pub mod hash_flat_set;

pub use flat_map::FlatMap;
pub use flat_set::FlatSet;
pub use hash_flat_map::HashFlatMap;
pub use hash_flat_set::HashFlatSet;

/// The default hash state for [`HashFlatMap`] and [`HashFlatSet`].
pub use hashbrown::DefaultHashBuilder;
