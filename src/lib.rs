//! # An ordered map on a height-balanced binary search tree
//!
//! `avl-collections` provides [`AvlMap`], a sorted key-value map kept as an
//! AVL tree.  Besides the usual point operations it supports building a map
//! directly from sorted entries, merging two maps and splitting a map around a
//! key.  Those whole-map operations flatten and rebuild rather than rotate, so
//! they run in linear time and always produce a minimal-height tree.
//!
//! Lookups that must distinguish "absent" from a stored value report
//! [`AvlError::KeyNotFound`]:
//!
//! ```
//! use avl_collections::{AvlError, AvlMap};
//!
//! let mut m = AvlMap::new();
//! m.insert(1, "one");
//! assert_eq!(m.search(&1), Ok(&"one"));
//! assert_eq!(m.search(&2), Err(AvlError::KeyNotFound));
//! ```

mod avl;
pub use avl::{AvlMap, IntoIter, Iter};

mod error;
pub use error::{AvlError, Result};
