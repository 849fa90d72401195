use std::hash::Hash;

use hashbrown::HashMap;

use super::nable::NaMask;
use super::value::Value;

/// Equality-based grouping
///
/// Groups hold ascending 1-based positions, ordered by first appearance, with
/// the NA positions (if any) forming one trailing group whose representative
/// is [`Value::Na`].
///
pub trait Groupable {
    fn groups(&self) -> (Vec<Vec<usize>>, Vec<Value>);
    fn is_unique(&self) -> Vec<bool>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grouping<T> {
    pub groups: Vec<Vec<usize>>,
    /// One representative per group, `None` for the NA group
    pub values: Vec<Option<T>>,
}

impl<T> Grouping<T> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Flags positions whose group has a single member
    pub fn is_unique(&self, len: usize) -> Vec<bool> {
        let mut unique = vec![false; len];
        for group in self.groups.iter().filter(|g| g.len() == 1) {
            unique[group[0] - 1] = true;
        }
        unique
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Grouping<U> {
        Grouping {
            groups: self.groups,
            values: self.values.into_iter().map(|v| v.map(&f)).collect(),
        }
    }
}

/// Single left-to-right grouping pass
///
/// Values are bucketed by `key` and a bucket is only joined when `equal`
/// confirms it, so a coarse key (even `()`) still groups correctly.
///
pub fn group_by<T, K, FK, FE>(data: &[T], na: &NaMask, key: FK, equal: FE) -> Grouping<T>
where
    T: Clone,
    K: Hash + Eq,
    FK: Fn(&T) -> K,
    FE: Fn(&T, &T) -> bool,
{
    let mut buckets: HashMap<K, Vec<usize>> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut values: Vec<Option<T>> = Vec::new();
    let mut missing: Vec<usize> = Vec::new();

    for (i, x) in data.iter().enumerate() {
        if na.get(i) {
            missing.push(i + 1);
            continue;
        }

        let candidates = buckets.entry(key(x)).or_default();
        let found = candidates.iter().copied().find(|&g| match &values[g] {
            Some(rep) => equal(rep, x),
            None => false,
        });

        match found {
            Some(g) => groups[g].push(i + 1),
            None => {
                candidates.push(groups.len());
                groups.push(vec![i + 1]);
                values.push(Some(x.clone()));
            }
        }
    }

    if !missing.is_empty() {
        groups.push(missing);
        values.push(None);
    }

    Grouping { groups, values }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_strings() {
        let data: Vec<String> = ["a", "b", "a", "c", "b"].iter().map(|s| s.to_string()).collect();
        let g = group_by(&data, &NaMask::none(5), |s| s.clone(), |l, r| l == r);
        assert_eq!(g.groups, vec![vec![1, 3], vec![2, 5], vec![4]]);
        assert_eq!(
            g.values,
            vec![Some("a".to_string()), Some("b".to_string()), Some("c".to_string())]
        );
        assert_eq!(g.is_unique(5), vec![false, false, false, true, false]);
    }

    #[test]
    fn na_group_trails() {
        let data = vec![1, 0, 1, 0];
        let na = NaMask::new(vec![false, true, false, true]);
        let g = group_by(&data, &na, |x| *x, |l, r| l == r);
        assert_eq!(g.groups, vec![vec![1, 3], vec![2, 4]]);
        assert_eq!(g.values, vec![Some(1), None]);
    }

    #[test]
    fn coarse_key_uses_equality() {
        let data = vec![1, 11, 2, 21, 3];
        // same bucket for everything, equal by last digit
        let g = group_by(&data, &NaMask::none(5), |_| (), |l, r| l % 10 == r % 10);
        assert_eq!(g.groups, vec![vec![1, 2, 4], vec![3], vec![5]]);
        assert_eq!(g.values, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn nan_is_alone() {
        let data = vec![f64::NAN, f64::NAN, 1.0];
        let g = group_by(&data, &NaMask::none(3), |x| x.to_bits(), |l, r| l == r);
        assert_eq!(g.groups, vec![vec![1], vec![2], vec![3]]);
    }
}
