//! Flatten-and-rebuild machinery behind bulk construction, merge and split.
//!
//! None of these functions rotate.  A tree is flattened to an ascending run of
//! entries, the runs are combined or partitioned, and the result is rebuilt by
//! always rooting a range at its midpoint.  Halves produced that way differ in
//! size by at most one entry, so the rebuilt tree is balanced as it stands.

use super::node::{rebalance, Node, OptNode};
use std::cmp::Ordering::*;
use std::iter::{FusedIterator, Peekable};

// Builds a tree from exactly `n` entries drawn in order from `entries`.
//
// For a range [start, end] the root is entry (start + end) / 2, so the left
// subtree gets (n - 1) / 2 entries and the right subtree the remaining ones.
// The entries are consumed in key order, which is why the left subtree is
// built before its root is pulled from the iterator.
pub(super) fn build<K, V, I>(n: usize, entries: &mut I) -> OptNode<K, V>
where
    I: Iterator<Item = (K, V)>,
{
    if n == 0 {
        return None;
    }

    let lf_len = (n - 1) / 2;
    let left = build(lf_len, entries);
    let (k, v) = entries.next()?;
    let right = build(n - 1 - lf_len, entries);

    // The midpoint split already yields a balanced node; rebalancing here
    // only recomputes the height.
    Some(rebalance(Box::new(Node::new(k, v, left, right))))
}

// Builds a tree from a vector of entries that are strictly ascending by key.
pub(super) fn build_from_vec<K, V>(entries: Vec<(K, V)>) -> OptNode<K, V> {
    let n = entries.len();
    build(n, &mut entries.into_iter())
}

// Moves every entry out of the tree, ascending by key.
pub(super) fn flatten<K, V>(opt_root: OptNode<K, V>, size_hint: usize) -> Vec<(K, V)> {
    let mut acc = Vec::with_capacity(size_hint);
    if let Some(n) = opt_root {
        n.drain_into(&mut acc);
    }
    acc
}

/// Zipper over two ascending entry sequences.
///
/// Yields one entry per distinct key.  When both sides hold the same key, the
/// entry from the right-hand sequence is kept and the left one is dropped.
pub(super) struct MergeIter<I, J>
where
    I: Iterator,
    J: Iterator,
{
    lhs: Peekable<I>,
    rhs: Peekable<J>,
}

impl<K, V, I, J> MergeIter<I, J>
where
    K: Ord,
    I: Iterator<Item = (K, V)>,
    J: Iterator<Item = (K, V)>,
{
    pub(super) fn new(lhs: I, rhs: J) -> Self {
        MergeIter {
            lhs: lhs.peekable(),
            rhs: rhs.peekable(),
        }
    }
}

impl<K, V, I, J> Iterator for MergeIter<I, J>
where
    K: Ord,
    I: Iterator<Item = (K, V)>,
    J: Iterator<Item = (K, V)>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let Some(peek_lhs) = self.lhs.peek() else {
            return self.rhs.next();
        };

        let Some(peek_rhs) = self.rhs.peek() else {
            return self.lhs.next();
        };

        match peek_lhs.0.cmp(&peek_rhs.0) {
            Less => self.lhs.next(),

            Equal => {
                self.lhs.next();
                self.rhs.next()
            }

            Greater => self.rhs.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (l_lo, l_hi) = self.lhs.size_hint();
        let (r_lo, r_hi) = self.rhs.size_hint();
        let hi = match (l_hi, r_hi) {
            (Some(x), Some(y)) => x.checked_add(y),
            _ => None,
        };
        (l_lo.max(r_lo), hi)
    }
}

impl<K, V, I, J> FusedIterator for MergeIter<I, J>
where
    K: Ord,
    I: Iterator<Item = (K, V)>,
    J: Iterator<Item = (K, V)>,
{
}

// Splits an ascending run into the entries with keys less than `pivot` and
// the rest.  Relative order is preserved on both sides.
pub(super) fn partition<K, V, Q, I>(entries: I, pivot: &Q) -> (Vec<(K, V)>, Vec<(K, V)>)
where
    K: std::borrow::Borrow<Q>,
    Q: Ord + ?Sized,
    I: Iterator<Item = (K, V)>,
{
    let mut lt = Vec::new();
    let mut ge = Vec::new();
    for (k, v) in entries {
        if k.borrow() < pivot {
            lt.push((k, v));
        } else {
            ge.push((k, v));
        }
    }
    (lt, ge)
}
