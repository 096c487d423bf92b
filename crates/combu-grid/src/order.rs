use combu_core::Key;
use log::warn;

/// Resolves the traversal order for a set of declared keys.
///
/// Requested keys come first, verbatim and in the given order; every declared
/// key not requested follows in declaration order. Requested keys are not
/// checked against the declaration here; an unknown key surfaces when the
/// specification is indexed by it. A key requested twice keeps its first
/// position.
pub fn resolve_order<'a, I>(declared: I, requested: &[Key]) -> Vec<Key>
where
    I: IntoIterator<Item = &'a Key>,
{
    let mut order: Vec<Key> = Vec::with_capacity(requested.len());
    for key in requested {
        if order.contains(key) {
            warn!("order repeats key `{key}`, keeping its first position");
            continue;
        }
        order.push(key.clone());
    }
    for key in declared {
        if !order.contains(key) {
            order.push(key.clone());
        }
    }
    order
}
