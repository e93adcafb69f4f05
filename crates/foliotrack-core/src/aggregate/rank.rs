use std::collections::HashMap;
use std::hash::Hash;

/// Group `items` by `key`, count each group and order the groups by
/// descending count.
///
/// `key` returning `None` drops the item. Groups with equal counts keep the
/// order in which their key was first seen. `cap` truncates the result.
pub fn rank_counts<I, K, F>(items: I, mut key: F, cap: Option<usize>) -> Vec<(K, u64)>
where
    I: IntoIterator,
    K: Eq + Hash + Clone,
    F: FnMut(I::Item) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, u64)> = Vec::new();

    for item in items {
        let Some(k) = key(item) else {
            continue;
        };
        match index.get(&k) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, 1));
            }
        }
    }

    // sort_by is stable, so first-seen order survives among equal counts.
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(cap) = cap {
        groups.truncate(cap);
    }
    groups
}
