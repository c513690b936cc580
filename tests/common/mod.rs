use proptest::prelude::*;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

#[allow(dead_code)]
pub(super) type SmallIntPairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}

// keys drawn from a narrow range so that operands overlap heavily
#[allow(dead_code)]
pub(super) fn tiny_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..64u16, 0u16..1024u16), 0..48)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

// Walks the map the way a caller would and verifies the ordering and the
// balance that is observable from outside: a tree with n entries must be no
// taller than the AVL bound 1.44 * log2(n + 2).
#[allow(dead_code)]
pub(super) fn assert_well_formed<K: Ord, V>(m: &avl_collections::AvlMap<K, V>) {
    assert!(m.keys().zip(m.keys().skip(1)).all(|(a, b)| a < b));
    assert_eq!(m.iter().count(), m.len());

    let bound = 1.4405 * ((m.len() + 2) as f64).log2() - 0.3277;
    assert!((m.height() as f64) <= bound.max(0.0) + 1e-9);
}
