use std::hash::Hash;

use fnv::FnvHashSet;

pub fn join<'a, T, S>(i: T, sep: S) -> String
where
    T: IntoIterator,
    T::Item: ToString,
    S: Into<&'a str>,
{
    i.into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(sep.into())
}

/// Removes later duplicates, keeping the first occurrence of each value in place
pub fn dedup_stable<T>(items: &mut Vec<T>)
where
    T: Clone + Eq + Hash,
{
    let mut seen = FnvHashSet::default();
    items.retain(|item| seen.insert(item.clone()));
}
