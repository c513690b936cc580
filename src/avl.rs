#![warn(missing_docs)]
use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

mod build;
mod node;

use crate::error::{AvlError, Result};
use build::{build_from_vec, flatten, partition, MergeIter};
use node::{height, rebal, rebalance, Node, OptNode};

#[cfg(test)]
use node::chk;

#[cfg(test)]
macro_rules! chk_map {
    ( $x:expr ) => {{
        let n = $x;
        let chk_len = chk(&n.root, None).0;
        assert_eq!(chk_len, n.len);
        n
    }};
}

#[cfg(not(test))]
macro_rules! chk_map {
    ( $x: expr ) => {{
        $x
    }};
}

/// A map from keys to values sorted by key.
///
/// Internally, the map is an [AVL tree](https://en.wikipedia.org/wiki/AVL_tree):
/// every node caches its height, and after each insertion or removal the
/// nodes on the search path are rotated as needed so that the heights of any
/// node's two subtrees differ by at most one.  Lookups, insertions and
/// removals are therefore O(log n).
///
/// Whole-map operations ([`merge`](#method.merge), [`split`](#method.split),
/// [`from_sorted`](#method.from_sorted)) do not rotate.  They flatten their
/// operands into sorted runs, combine or partition the runs, and rebuild a
/// fresh, perfectly balanced tree in linear time.  The maps they return never
/// share nodes with their operands.
///
/// Inserting a key that is already present leaves the map untouched; use
/// [`update`](#method.update) to replace a value.
pub struct AvlMap<K, V> {
    len: usize,
    root: OptNode<K, V>,
}

impl<K: Clone, V: Clone> Clone for AvlMap<K, V> {
    fn clone(&self) -> Self {
        AvlMap {
            len: self.len,
            root: self.root.clone(),
        }
    }
}

impl<K: Debug, V: Debug> Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            None => f.write_str("AvlMap(EMPTY)"),
            Some(n) => {
                // use Node's Debug formatter
                f.write_fmt(format_args!("AvlMap(#{}, {:?})", self.len, n))
            }
        }
    }
}

impl<K: Ord, V: PartialEq> PartialEq for AvlMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(x, y)| x == y)
    }
}

impl<K: Ord, V: Eq> Eq for AvlMap<K, V> {}

impl<K, Q, V> std::ops::Index<&Q> for AvlMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in AvlMap"),
        }
    }
}

// Inserts (k,v) into the tree rooted at root unless k is already present.
// Returns whether a node was added.
fn ins<K: Ord, V>(root: &mut OptNode<K, V>, k: K, v: V) -> bool {
    let n = match root.as_mut() {
        None => {
            *root = Some(Node::leaf(k, v));
            return true; // *** EARLY RETURN ***
        }

        Some(n) => n,
    };

    let is_new = match k.cmp(&n.key) {
        Equal => false,
        Less => ins(&mut n.left, k, v),
        Greater => ins(&mut n.right, k, v),
    };

    if is_new {
        rebal(root);
    }

    is_new
}

// Detaches the node with the least key and returns it with both links
// cleared.  Every ancestor is rebalanced on the way back up.
fn rm_leftmost<K, V>(root: &mut OptNode<K, V>) -> OptNode<K, V> {
    let n = root.as_mut()?;

    if n.left.is_some() {
        let min = rm_leftmost(&mut n.left);
        rebal(root);
        min
    } else {
        let mut min = root.take()?;
        *root = min.right.take();
        Some(min)
    }
}

// mirror of rm_leftmost
fn rm_rightmost<K, V>(root: &mut OptNode<K, V>) -> OptNode<K, V> {
    let n = root.as_mut()?;

    if n.right.is_some() {
        let max = rm_rightmost(&mut n.right);
        rebal(root);
        max
    } else {
        let mut max = root.take()?;
        *root = max.left.take();
        Some(max)
    }
}

// Removes k from the tree rooted at root and returns its entry, if present.
fn rm<K, V, Q>(root: &mut OptNode<K, V>, k: &Q) -> Option<(K, V)>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    let n = root.as_mut()?;

    let old = match k.cmp(n.key.borrow()) {
        Less => rm(&mut n.left, k),

        Greater => rm(&mut n.right, k),

        Equal => {
            let mut old_n = root.take()?;

            *root = match old_n.right.take() {
                None => old_n.left.take(),

                Some(rt) => {
                    // splice the in-order successor in place of old_n
                    let mut rt = Some(rt);
                    match rm_leftmost(&mut rt) {
                        Some(mut succ) => {
                            succ.left = old_n.left.take();
                            succ.right = rt;
                            Some(rebalance(succ))
                        }
                        None => old_n.left.take(),
                    }
                }
            };

            return Some((old_n.key, old_n.val)); // *** EARLY RETURN ***
        }
    };

    if old.is_some() {
        rebal(root);
    }

    old
}

impl<K, V> AvlMap<K, V> {
    /// Creates a new, empty map.
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    /// let m: AvlMap<usize, usize> = AvlMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        AvlMap { len: 0, root: None }
    }

    /// Drops all elements from the map.
    pub fn clear(&mut self) {
        self.len = 0;
        self.root = None;
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of entries in self.
    ///
    /// The count is maintained by every mutation, so this is O(1).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the underlying tree; 0 for an empty map.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m: AvlMap<_, _> = (0..7).map(|i| (i, ())).collect();
    /// assert_eq!(m.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// The iterator walks the tree lazily, keeping the unvisited part of the
    /// left spine on a stack, so it needs O(log n) extra space.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m = AvlMap::from([(0,1), (1,2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i+1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut work = Vec::new();
        let mut curr = self.root.as_deref();
        while let Some(n) = curr {
            work.push(n);
            curr = n.left.as_deref();
        }

        Iter {
            work,
            len: self.len,
        }
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values of the map, ordered by their
    /// associated keys.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Applies f to each entry of the map in order of the keys.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m = AvlMap::from([(0,-10), (1,0), (2,12)]);
    /// let mut cnt_keys_gt_vals = 0;
    /// m.for_each(|(k, v)| if k > v { cnt_keys_gt_vals += 1 });
    /// assert_eq!(cnt_keys_gt_vals, 2);
    /// ```
    pub fn for_each<F: FnMut((&K, &V))>(&self, mut f: F) {
        if let Some(n) = self.root.as_ref() {
            n.for_each(&mut f);
        }
    }

    /// Returns the key-value pair for the least key in the map
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let fmap = AvlMap::from([(2,0), (1,0)]);
    /// assert_eq!(fmap.first_key_value(), Some((&1, &0)));
    /// ```
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(n) = curr.left.as_deref() {
            curr = n;
        }
        Some((&curr.key, &curr.val))
    }

    /// Returns the key-value pair for the greatest key in the map
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let fmap = AvlMap::from([(2,0), (1,0)]);
    /// assert_eq!(fmap.last_key_value(), Some((&2, &0)));
    /// ```
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(n) = curr.right.as_deref() {
            curr = n;
        }
        Some((&curr.key, &curr.val))
    }

    /// Removes and returns the entry with the least key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let min = rm_leftmost(&mut self.root)?;
        self.len -= 1;
        Some((min.key, min.val))
    }

    /// Removes and returns the entry with the greatest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let max = rm_rightmost(&mut self.root)?;
        self.len -= 1;
        Some((max.key, max.val))
    }

    #[cfg(test)]
    fn chk(&self)
    where
        K: Ord,
    {
        assert_eq!(self.len, chk(&self.root, None).0);
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Builds a map from entries whose keys are strictly ascending.
    ///
    /// The tree is built directly, rooting every range of entries at its
    /// midpoint, so construction is O(n) and needs no rotations.
    ///
    /// # Panics
    ///
    /// Panics if the keys are not strictly ascending.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m = AvlMap::from_sorted((0..100).map(|i| (i, i * i)));
    /// assert_eq!(m.len(), 100);
    /// assert_eq!(m.height(), 7);
    /// assert_eq!(m.get(&9), Some(&81));
    /// ```
    pub fn from_sorted<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries: Vec<_> = entries.into_iter().collect();
        assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "from_sorted requires strictly ascending keys"
        );

        let map = Self::from_entries(entries);
        tracing::trace!(
            target: "avl_collections::build",
            len = map.len,
            height = map.height(),
            "built map from sorted entries"
        );
        map
    }

    // entries must already be strictly ascending
    fn from_entries(entries: Vec<(K, V)>) -> Self {
        let len = entries.len();
        chk_map!(AvlMap {
            len,
            root: build_from_vec(entries),
        })
    }

    /// Inserts a key-value pair in the map.
    ///
    /// Returns true if the key was added.  If the key is already present the
    /// map is left unchanged, the existing value is kept and false is
    /// returned.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap = AvlMap::new();
    /// assert!(fmap.insert(0, "a"));
    /// assert!(!fmap.insert(0, "b"));
    /// assert_eq!(fmap.get(&0), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> bool {
        let is_new = ins(&mut self.root, key, val);
        self.len += is_new as usize;
        is_new
    }

    /// Removes a key from the map and returns the unmapped value.
    ///
    /// # Errors
    ///
    /// Returns [`AvlError::KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::{AvlError, AvlMap};
    ///
    /// let mut fmap = AvlMap::new();
    /// fmap.insert(1, 2);
    /// fmap.insert(2, 3);
    /// assert_eq!(fmap.remove(&2), Ok(3));
    /// assert_eq!(fmap.remove(&2), Err(AvlError::KeyNotFound));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (_, v) = rm(&mut self.root, key).ok_or(AvlError::KeyNotFound)?;
        self.len -= 1;
        Ok(v)
    }

    /// Returns a reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap = AvlMap::new();
    /// fmap.insert(0, 100);
    ///
    /// assert_eq!(fmap.get(&0), Some(&100));
    /// ```
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = &self.root;
        while let Some(n) = curr {
            match k.cmp(n.key.borrow()) {
                Less => curr = &n.left,
                Equal => return Some(&n.val),
                Greater => curr = &n.right,
            }
        }

        None
    }

    /// Returns a mutable reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap = AvlMap::new();
    /// fmap.insert(1, 7);
    ///
    /// *fmap.get_mut(&1).unwrap() = 2;
    /// assert_eq!(fmap.get(&1), Some(&2));
    /// ```
    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = &mut self.root;
        while let Some(n) = curr {
            match k.cmp(n.key.borrow()) {
                Less => curr = &mut n.left,
                Equal => return Some(&mut n.val),
                Greater => curr = &mut n.right,
            }
        }

        None
    }

    /// Returns the value associated with k.
    ///
    /// Unlike [`get`](#method.get), an absent key is reported as an error.
    ///
    /// # Errors
    ///
    /// Returns [`AvlError::KeyNotFound`] if the key is absent.
    pub fn search<Q>(&self, k: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(k).ok_or(AvlError::KeyNotFound)
    }

    /// Replaces the value stored under k and returns the old value.
    ///
    /// Only the value changes; the shape of the tree is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AvlError::KeyNotFound`] if the key is absent.  Unlike
    /// [`insert`](#method.insert), `update` never adds an entry.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::{AvlError, AvlMap};
    ///
    /// let mut fmap = AvlMap::from([(1, 1)]);
    /// assert_eq!(fmap.update(&1, 100), Ok(1));
    /// assert_eq!(fmap.search(&1), Ok(&100));
    /// assert_eq!(fmap.update(&2, 0), Err(AvlError::KeyNotFound));
    /// ```
    pub fn update<Q>(&mut self, k: &Q, val: V) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let slot = self.get_mut(k).ok_or(AvlError::KeyNotFound)?;
        Ok(std::mem::replace(slot, val))
    }

    /// Tests if self contains an entry for the given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Moves all entries of other into this map.
    ///
    /// When both maps hold the same key, the entry from other replaces the
    /// one in self.  Both trees are flattened and the union is rebuilt, so
    /// this takes O(n + m) time and never clones keys or values.
    pub fn merge_with(&mut self, other: Self) {
        let (lhs_len, rhs_len) = (self.len, other.len);
        let lhs = flatten(self.root.take(), lhs_len);
        let rhs = flatten(other.root, rhs_len);

        let merged: Vec<_> = MergeIter::new(lhs.into_iter(), rhs.into_iter()).collect();
        *self = Self::from_entries(merged);

        tracing::trace!(
            target: "avl_collections::merge",
            lhs = lhs_len,
            rhs = rhs_len,
            merged = self.len,
            height = self.height(),
            "merged maps"
        );
    }

    /// Moves all entries with keys greater than or equal to key into a new
    /// map, leaving the lesser keys in self.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap: AvlMap<_, _> = (0..10).map(|i| (i, i * 2)).collect();
    /// let higher_fives = fmap.split_off(&5);
    /// assert_eq!(fmap.get(&4), Some(&8));
    /// assert_eq!(fmap.get(&5), None);
    /// assert_eq!(higher_fives.get(&5), Some(&10));
    /// ```
    pub fn split_off<Q>(&mut self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let entries = flatten(self.root.take(), self.len);
        let (lt, ge) = partition(entries.into_iter(), key);
        *self = Self::from_entries(lt);
        let rhs = Self::from_entries(ge);

        tracing::trace!(
            target: "avl_collections::split",
            lhs = self.len,
            rhs = rhs.len,
            "split map"
        );

        rhs
    }
}

impl<K: Ord + Clone, V: Clone> AvlMap<K, V> {
    /// Builds a map holding the entries of both maps.
    ///
    /// Where a key occurs in both maps, the result takes the value from
    /// other.  Neither operand is modified; the result is a freshly built,
    /// independent tree.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let lhs = AvlMap::from([(0, 'a'), (1, 'a')]);
    /// let rhs = AvlMap::from([(1, 'b'), (3, 'b')]);
    /// let m = lhs.merge(&rhs);
    /// assert_eq!(m.traverse(), vec![(0, 'a'), (1, 'b'), (3, 'b')]);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        let lhs = self.iter().map(|(k, v)| (k.clone(), v.clone()));
        let rhs = other.iter().map(|(k, v)| (k.clone(), v.clone()));
        let merged = Self::from_entries(MergeIter::new(lhs, rhs).collect());

        tracing::trace!(
            target: "avl_collections::merge",
            lhs = self.len,
            rhs = other.len,
            merged = merged.len,
            height = merged.height(),
            "merged maps"
        );

        merged
    }

    /// Splits the map on a key, returning one map with the entries less than
    /// the key and one with the entries greater than or equal to it.
    ///
    /// The map itself is not modified.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let fmap = AvlMap::from([(0,1),(1,2),(2,3)]);
    /// let (lt, ge) = fmap.split(&1);
    /// assert_eq!(lt.traverse(), vec![(0, 1)]);
    /// assert_eq!(ge.traverse(), vec![(1, 2), (2, 3)]);
    /// ```
    pub fn split<Q>(&self, key: &Q) -> (Self, Self)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let entries = self.iter().map(|(k, v)| (k.clone(), v.clone()));
        let (lt, ge) = partition(entries, key);
        let (lhs, rhs) = (Self::from_entries(lt), Self::from_entries(ge));

        tracing::trace!(
            target: "avl_collections::split",
            lhs = lhs.len,
            rhs = rhs.len,
            "split map"
        );

        (lhs, rhs)
    }

    /// Returns a copy of every entry, ascending by key.
    pub fn traverse(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the entries of an [`AvlMap`], ascending by key.
pub struct Iter<'a, K, V> {
    work: Vec<&'a Node<K, V>>,
    len: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.work.pop().map(|n| {
            self.len -= 1;
            let entry = (&n.key, &n.val);
            let mut curr = n.right.as_deref();
            while let Some(m) = curr {
                self.work.push(m);
                curr = m.left.as_deref();
            }
            entry
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// An owning iterator over the entries of an [`AvlMap`], ascending by key.
pub struct IntoIter<K, V>(std::vec::IntoIter<(K, V)>);

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for AvlMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(flatten(self.root, self.len).into_iter())
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        AvlMap::from_iter(vs)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fmap = AvlMap::new();
        fmap.extend(iter);
        fmap
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::quickcheck;
    use std::collections::BTreeMap;

    fn bal_test(vs: Vec<(u8, u32)>) {
        let mut fmap = AvlMap::new();
        for &(k, v) in vs.iter() {
            fmap.insert(k, v);
            fmap.chk();
        }
    }

    fn rm_test(vs: Vec<(i8, u32)>) {
        let mut fmap = AvlMap::new();
        let mut btree = BTreeMap::new();

        for &(k, v) in vs.iter() {
            match k {
                1..=i8::MAX => {
                    let k = k % 32;
                    let is_new = !btree.contains_key(&k);
                    btree.entry(k).or_insert(v);
                    assert_eq!(fmap.insert(k, v), is_new);
                }

                0 | i8::MIN => (),

                _ => {
                    let k = -k % 32;
                    assert_eq!(fmap.remove(&k).ok(), btree.remove(&k));
                }
            }

            assert!(fmap.iter().cmp(btree.iter()).is_eq());
            fmap.chk();
        }
    }

    fn split_test<K: Clone + Ord, V: Clone + PartialEq>(fmap: AvlMap<K, V>, k: &K) {
        let (lhs, rhs) = fmap.split(k);
        fmap.chk();
        lhs.chk();
        rhs.chk();
        assert_eq!(lhs.len() + rhs.len(), fmap.len());
        assert!(lhs.last_key_value().map_or(true, |(k2, _)| k2 < k));
        assert!(rhs.first_key_value().map_or(true, |(k2, _)| k <= k2));

        let mut owned = fmap.clone();
        let rhs2 = owned.split_off(k);
        owned.chk();
        rhs2.chk();
        assert!(owned.iter().eq(lhs.iter()));
        assert!(rhs2.iter().eq(rhs.iter()));
    }

    // systematically try deleting each element of fmap
    fn chk_all_removes(fmap: AvlMap<u8, u8>) {
        for (k, v) in fmap.iter() {
            let mut fmap2 = fmap.clone();
            assert_eq!(fmap2.remove(k), Ok(*v));
            assert_eq!(fmap2.search(k), Err(AvlError::KeyNotFound));
            fmap2.chk();
        }
    }

    type TestEntries = Vec<(u8, u16)>;

    fn merge_test(v1: TestEntries, v2: TestEntries) {
        let f1 = AvlMap::from_iter(v1);
        let f2 = AvlMap::from_iter(v2);
        let both = f1.merge(&f2);
        both.chk();

        for (k, v) in both.iter() {
            match f2.get(k) {
                Some(v2) => assert_eq!(v, v2),
                None => assert_eq!(f1.get(k), Some(v)),
            }
        }

        assert!(f1.keys().all(|k| both.contains_key(k)));
        assert!(f2.keys().all(|k| both.contains_key(k)));

        let mut f3 = f1.clone();
        f3.merge_with(f2.clone());
        f3.chk();
        assert_eq!(f3, both);
    }

    #[test]
    fn insert_existing_is_noop() {
        let mut fmap = AvlMap::from([(1, 'a'), (2, 'b')]);
        let ht = fmap.height();
        assert!(!fmap.insert(1, 'z'));
        assert_eq!(fmap.len(), 2);
        assert_eq!(fmap.height(), ht);
        assert_eq!(fmap[&1], 'a');
    }

    #[test]
    fn empty_map_errors() {
        let mut fmap: AvlMap<u8, u8> = AvlMap::new();
        assert_eq!(fmap.search(&0), Err(AvlError::KeyNotFound));
        assert_eq!(fmap.update(&0, 1), Err(AvlError::KeyNotFound));
        assert_eq!(fmap.remove(&0), Err(AvlError::KeyNotFound));
        assert!(fmap.is_empty());
        fmap.chk();
    }

    #[test]
    fn update_keeps_shape() {
        let mut fmap: AvlMap<_, _> = (0..20).map(|i| (i, i)).collect();
        let before = format!("{:?}", fmap);

        // rewriting a value with itself leaves the dump byte-identical
        assert_eq!(fmap.update(&7, 7), Ok(7));
        assert_eq!(format!("{:?}", fmap), before);

        assert_eq!(fmap.update(&7, 700), Ok(7));
        assert_eq!(fmap.get(&7), Some(&700));
        fmap.chk();
    }

    #[test]
    fn remove_root_with_only_left_child() {
        let mut fmap = AvlMap::from([(2, ()), (1, ())]);
        assert_eq!(fmap.remove(&2), Ok(()));
        fmap.chk();
        assert_eq!(fmap.traverse(), vec![(1, ())]);
    }

    #[test]
    fn pop_ends() {
        let mut fmap: AvlMap<_, _> = (0..16).map(|i| (i, i * 3)).collect();
        assert_eq!(fmap.pop_first(), Some((0, 0)));
        fmap.chk();
        assert_eq!(fmap.pop_last(), Some((15, 45)));
        fmap.chk();
        assert_eq!(fmap.len(), 14);

        while fmap.pop_first().is_some() {
            fmap.chk();
        }
        assert!(fmap.is_empty());
        assert_eq!(fmap.pop_last(), None);
    }

    #[test]
    fn rm_each_test() {
        // build map in order to encourage skewing
        let fmap: AvlMap<_, _> = (0..32).map(|x| (x, x + 100)).collect();
        chk_all_removes(fmap);

        // build map in reverse order to encourage opposite skewing
        let fmap: AvlMap<_, _> = (0..32).rev().map(|x| (x, x + 100)).collect();
        chk_all_removes(fmap);
    }

    #[test]
    fn iter_len_test() {
        let fmap: AvlMap<_, _> = (0..10).map(|i| (i, ())).collect();

        let mut iter = fmap.iter();
        let mut cnt = 10;
        while iter.next().is_some() {
            assert_eq!(iter.len(), cnt - 1);
            cnt -= 1;
        }
    }

    #[test]
    fn into_iter_is_sorted() {
        let fmap: AvlMap<_, _> = [5, 3, 9, 1, 7].into_iter().map(|k| (k, k)).collect();
        let all: Vec<_> = fmap.into_iter().collect();
        assert_eq!(all, vec![(1, 1), (3, 3), (5, 5), (7, 7), (9, 9)]);
    }

    #[test]
    fn debug_format() {
        let fmap = AvlMap::from([(1, 'a'), (0, 'b'), (2, 'c')]);
        assert_eq!(
            format!("{:?}", fmap),
            "AvlMap(#3, (ht: 2 {1: 'a'} (ht: 1 {0: 'b'} . .) (ht: 1 {2: 'c'} . .)))"
        );
        assert_eq!(format!("{:?}", AvlMap::<u8, u8>::new()), "AvlMap(EMPTY)");
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn from_sorted_rejects_unsorted() {
        AvlMap::from_sorted([(2, ()), (1, ())]);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn from_sorted_rejects_duplicates() {
        AvlMap::from_sorted([(1, ()), (1, ())]);
    }

    #[test]
    fn merge_leaves_operands_alone() {
        let f1 = AvlMap::from([(1, 1), (2, 2)]);
        let f2 = AvlMap::from([(2, 20), (3, 30)]);
        let mut m = f1.merge(&f2);
        m.insert(4, 40);
        m.update(&1, 10).unwrap();
        assert_eq!(f1.traverse(), vec![(1, 1), (2, 2)]);
        assert_eq!(f2.traverse(), vec![(2, 20), (3, 30)]);
        assert_eq!(m.traverse(), vec![(1, 10), (2, 20), (3, 30), (4, 40)]);
    }

    #[test]
    fn bal_test_regr1() {
        bal_test(vec![(4, 0), (0, 0), (5, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn bal_test_regr2() {
        bal_test(vec![(3, 0), (0, 0), (1, 0), (2, 0), (4, 0)]);
    }

    #[test]
    fn rm_test_regr1() {
        rm_test(vec![(101, 0), (100, 0), (1, 0), (-100, 0)]);
    }

    #[test]
    fn rm_test_regr2() {
        rm_test(vec![
            (31, 0),
            (14, 0),
            (1, 0),
            (15, 0),
            (32, 0),
            (16, 0),
            (17, 0),
            (-14, 0),
            (-31, 0),
        ]);
    }

    quickcheck! {
        fn qc_bal_test(vs: Vec<(u8, u32)>) -> () {
            bal_test(vs);
        }

        fn qc_rm_test(vs: Vec<(i8, u32)>) -> () {
            rm_test(vs);
        }

        fn qc_rm_test2(vs: Vec<(u8, u8)>) -> () {
            let fmap = vs.into_iter().collect();
            chk_all_removes(fmap);
        }

        fn qc_split_test(vs: Vec<(u8, u16)>) -> () {
            let f1: AvlMap<_, _> = vs.into_iter().collect();

            // try extremum splits
            split_test(f1.clone(), &u8::MIN);
            split_test(f1.clone(), &u8::MAX);

            let (Some((&lb, _)), Some((&ub, _))) =
                (f1.first_key_value(), f1.last_key_value())
            else {
                return;
            };

            for k in lb..=ub {
                split_test(f1.clone(), &k);
            }
        }

        fn qc_merge_test(v1: TestEntries, v2: TestEntries) -> () {
            merge_test(v1, v2);
        }

        fn qc_round_trip(vs: Vec<(u8, u16)>) -> () {
            let f1: AvlMap<_, _> = vs.into_iter().collect();
            let f2 = AvlMap::from_sorted(f1.traverse());
            f2.chk();
            assert_eq!(f1, f2);
            assert!(f2.height() <= f1.height());
        }
    }
}
