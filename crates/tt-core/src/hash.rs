//! Fast hash map and hash set type aliases.
//!
//! Path strings are the dominant key type in this workspace (the debounce
//! table keys on absolute paths), so the aliases here use the Fx hash
//! algorithm from `rustc-hash`, which is markedly faster than the standard
//! library's SipHash for short string keys. Denial-of-service resistance is
//! not needed: all keys come from the local filesystem.
//!
//! # Examples
//!
//! ```
//! use tt_core::{fx_hash_map, FxHashMap};
//!
//! let mut map: FxHashMap<String, u32> = fx_hash_map();
//! map.insert("shared/models/data.py".to_owned(), 1);
//! assert_eq!(map.len(), 1);
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// The hasher used by [`FxHashMap`] and [`FxHashSet`].
pub type FxBuildHasher = rustc_hash::FxBuildHasher;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}
