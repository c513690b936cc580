use std::fmt::{Debug, Formatter};

pub(super) type OptNode<K, V> = Option<Box<Node<K, V>>>;

pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) val: V,
    // cached height; a leaf has height 1
    pub(super) ht: i8,
    pub(super) left: OptNode<K, V>,
    pub(super) right: OptNode<K, V>,
}

impl<K, V> Node<K, V> {
    pub(super) fn new(key: K, val: V, left: OptNode<K, V>, right: OptNode<K, V>) -> Self {
        let mut n = Node {
            key,
            val,
            ht: 1,
            left,
            right,
        };
        n.fix_ht();
        n
    }

    pub(super) fn leaf(key: K, val: V) -> Box<Self> {
        Box::new(Self::new(key, val, None, None))
    }

    // Returns the "balance factor" of the node
    pub(super) fn bal(&self) -> i8 {
        height(&self.right) - height(&self.left)
    }

    // Is the given node balanced, that is -1 <= self.bal() <= 1 ?
    #[cfg(test)]
    pub(super) fn is_bal(&self) -> bool {
        // single-branch range inclusion check; requires unsigned wrap around
        ((self.bal() + 1) as u8) <= 2
    }

    pub(super) fn fix_ht(&mut self) {
        self.ht = height(&self.left).max(height(&self.right)) + 1;
    }

    pub(super) fn for_each<F>(&self, g: &mut F)
    where
        F: FnMut((&K, &V)),
    {
        if let Some(lf) = self.left.as_ref() {
            lf.for_each(g);
        }

        g((&self.key, &self.val));

        if let Some(rt) = self.right.as_ref() {
            rt.for_each(g);
        }
    }

    // Moves every entry below (and including) self onto the end of acc,
    // ascending by key.
    pub(super) fn drain_into(self, acc: &mut Vec<(K, V)>) {
        if let Some(lf) = self.left {
            lf.drain_into(acc);
        }

        acc.push((self.key, self.val));

        if let Some(rt) = self.right {
            rt.drain_into(acc);
        }
    }
}

impl<K: Ord, V> Node<K, V> {
    // Verifies order, balance and cached heights of the subtree. Returns the
    // number of entries and the greatest key seen.
    #[cfg(test)]
    pub(super) fn chk(&self, greatest: Option<&K>) -> (usize, Option<&K>) {
        // is our node in order with left-side ancestors?
        assert!(greatest.iter().all(|&k| k < &self.key));

        // is our cached height right?
        assert_eq!(height(&self.left).max(height(&self.right)) + 1, self.ht);

        // are we balanced?
        assert!(self.is_bal());

        let (lf_len, greatest) = chk(&self.left, greatest);

        // are our left descendents all less than us?
        assert!(greatest.iter().all(|&k| k < &self.key));

        let (rt_len, greatest) = chk(&self.right, Some(&self.key));

        (lf_len + rt_len + 1, greatest)
    }
}

impl<K: Clone, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        Node {
            key: self.key.clone(),
            val: self.val.clone(),
            ht: self.ht,
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

impl<K: Debug, V: Debug> Debug for Node<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "(ht: {} {{{:?}: {:?}}} ",
            self.ht, self.key, self.val
        ))?;

        match &self.left {
            None => f.write_str(".")?,
            Some(lf) => lf.fmt(f)?,
        }

        f.write_str(" ")?;

        match &self.right {
            None => f.write_str(".")?,
            Some(rt) => rt.fmt(f)?,
        }

        f.write_str(")")
    }
}

pub(super) fn height<K, V>(opt_node: &OptNode<K, V>) -> i8 {
    opt_node.as_ref().map_or(0, |n| n.ht)
}

fn bal<K, V>(opt_node: &OptNode<K, V>) -> i8 {
    opt_node.as_ref().map_or(0, |n| n.bal())
}

#[cfg(test)]
pub(super) fn count<K, V>(opt_node: &OptNode<K, V>) -> usize {
    opt_node
        .as_ref()
        .map_or(0, |n| count(&n.left) + 1 + count(&n.right))
}

#[cfg(test)]
pub(super) fn chk<'a, K: Ord, V>(
    opt_node: &'a OptNode<K, V>,
    greatest: Option<&'a K>,
) -> (usize, Option<&'a K>) {
    match opt_node.as_ref() {
        None => (0, greatest),
        Some(n) => n.chk(greatest),
    }
}

pub(super) fn rot_lf<K, V>(mut a: Box<Node<K, V>>) -> Box<Node<K, V>> {
    // We want the following transformation:
    //    a(x, b(y, z)))   =>   b(a(x, y), z)
    // x and z retain the same parents.

    let Some(mut b) = a.right.take() else {
        return a;
    };

    // move y from b to a
    a.right = b.left.take();
    a.fix_ht();

    // make a be b's left child
    b.left = Some(a);
    b.fix_ht();

    b
}

pub(super) fn rot_rt<K, V>(mut a: Box<Node<K, V>>) -> Box<Node<K, V>> {
    // We want the following transformation:
    //    a(b(x, y), z)   =>   b(x, a(y, z))
    // x and z retain the same parents.

    let Some(mut b) = a.left.take() else {
        return a;
    };

    // move y from b to a
    a.left = b.right.take();
    a.fix_ht();

    // move a into b
    b.right = Some(a);
    b.fix_ht();

    b
}

// Restores the AVL property at n, assuming both children are valid AVL trees
// whose heights differ by at most two.
pub(super) fn rebalance<K, V>(mut n: Box<Node<K, V>>) -> Box<Node<K, V>> {
    n.fix_ht();

    match n.bal() {
        -2 => {
            // left-right case: first shift the left child's height leftwards
            if bal(&n.left) > 0 {
                n.left = n.left.take().map(rot_lf);
            }
            rot_rt(n)
        }

        2 => {
            if bal(&n.right) < 0 {
                n.right = n.right.take().map(rot_rt);
            }
            rot_lf(n)
        }

        _ => n,
    }
}

// rebalance the subtree in place; an empty slot is left alone
pub(super) fn rebal<K, V>(root: &mut OptNode<K, V>) {
    if let Some(n) = root.take() {
        *root = Some(rebalance(n));
    }
}
