//! The shared element engine
//!
//! Algorithms written once over a slice of values and its [`NaMask`]. The
//! concrete payloads only supply their element type and, where the engine
//! needs it, ordering or equality.

use super::element::Element;
use super::mapper::{Folder, Mapper, Predicate, Visitor};
use super::nable::NaMask;

/// Gather by 1-based indices; 0 or an index past the end yields NA
pub fn gather<T: Clone>(data: &[T], na: &NaMask, indices: &[usize], default: &T) -> (Vec<T>, NaMask) {
    let mut values = Vec::with_capacity(indices.len());
    let mut mask = NaMask::none(0);

    for &i in indices {
        match i.checked_sub(1).and_then(|i| data.get(i).map(|v| (i, v))) {
            Some((i, v)) => {
                values.push(v.clone());
                mask.push(na.get(i));
            }
            None => {
                values.push(default.clone());
                mask.push(true);
            }
        }
    }

    (values, mask)
}

/// Cyclically extend or truncate to exactly `n` elements
///
/// An empty input has nothing to recycle and grows into all-NA.
///
pub fn recycle<T: Clone>(data: &[T], na: &NaMask, n: usize, default: &T) -> (Vec<T>, NaMask) {
    if data.is_empty() {
        return (vec![default.clone(); n], NaMask::all(n));
    }

    let values = data.iter().cycle().take(n).cloned().collect();
    let mask = na.as_slice().iter().copied().cycle().take(n).collect();
    (values, mask)
}

/// Concatenate two value/mask pairs
pub fn concat<T: Clone>(data: &[T], na: &NaMask, other: &[T], other_na: &NaMask) -> (Vec<T>, NaMask) {
    let mut values = Vec::with_capacity(data.len() + other.len());
    values.extend_from_slice(data);
    values.extend_from_slice(other);

    let mut mask = na.clone();
    mask.extend(other_na);
    (values, mask)
}

pub fn which<T: Element>(data: &[T], na: &NaMask, predicate: &Predicate<T>) -> Vec<bool> {
    data.iter()
        .enumerate()
        .map(|(i, v)| predicate.test(i + 1, v, na.get(i)))
        .collect()
}

pub fn apply<T: Element>(data: &[T], na: &NaMask, mapper: &Mapper<T>) -> (Vec<T>, NaMask) {
    let mut values = Vec::with_capacity(data.len());
    let mut mask = NaMask::none(0);

    for (i, v) in data.iter().enumerate() {
        let (value, is_na) = mapper.call(i + 1, v, na.get(i));
        values.push(if is_na { T::na_value() } else { value });
        mask.push(is_na);
    }

    (values, mask)
}

/// Apply at the given 1-based positions only; 0 and out-of-range are ignored
pub fn apply_to<T: Element>(
    data: &[T],
    na: &NaMask,
    indices: &[usize],
    mapper: &Mapper<T>,
) -> (Vec<T>, NaMask) {
    let mut values = data.to_vec();
    let mut mask = na.as_slice().to_vec();

    for &index in indices {
        let Some(i) = index.checked_sub(1).filter(|&i| i < data.len()) else {
            continue;
        };

        let (value, is_na) = mapper.call(index, &data[i], na.get(i));
        values[i] = if is_na { T::na_value() } else { value };
        mask[i] = is_na;
    }

    (values, NaMask::new(mask))
}

/// Fold into a single value, `None` when the result is NA
///
/// The full shape starts from the default value at index 1. Compact and
/// brief shapes start from the first non-NA element; an NA before it is
/// still offered to the callback, with the default as accumulator.
///
pub fn summarize<T: Element>(data: &[T], na: &NaMask, folder: &Folder<T>) -> Option<T> {
    let mut acc = match folder {
        Folder::Full(_) => Some(T::na_value()),
        _ => None,
    };

    if data.is_empty() {
        return None;
    }

    for (i, v) in data.iter().enumerate() {
        let missing = na.get(i);
        match acc.take() {
            Some(prev) => {
                let (next, is_na) = folder.step(i + 1, &prev, v, missing);
                if is_na {
                    return None;
                }
                acc = Some(next);
            }
            None if !missing => acc = Some(v.clone()),
            None => {
                let (_, is_na) = folder.step(i + 1, &T::na_value(), v, true);
                if is_na {
                    return None;
                }
            }
        }
    }

    acc
}

pub fn traverse<T: Element>(data: &[T], na: &NaMask, visitor: &mut Visitor<T>) {
    for (i, v) in data.iter().enumerate() {
        visitor.visit(i + 1, v, na.get(i));
    }
}

/// First non-NA wins, position by position; `other` must be as long as `data`
pub fn coalesce<T: Clone>(data: &[T], na: &NaMask, other: &[T], other_na: &NaMask) -> (Vec<T>, NaMask) {
    let (values, mask): (Vec<T>, Vec<bool>) = data
        .iter()
        .zip(other.iter())
        .enumerate()
        .map(|(i, (l, r))| match (na.get(i), other_na.get(i)) {
            (false, _) => (l.clone(), false),
            (true, false) => (r.clone(), false),
            (true, true) => (l.clone(), true),
        })
        .unzip();

    (values, NaMask::new(mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::nable::Nable;

    fn mask(flags: &[bool]) -> NaMask {
        NaMask::new(flags.to_vec())
    }

    #[test]
    fn gather_zero_and_overflow_are_na() {
        let (v, m) = gather(&[10, 20, 30], &mask(&[false, true, false]), &[3, 0, 2, 9, 1], &0);
        assert_eq!(v, vec![30, 0, 20, 0, 10]);
        assert_eq!(m.as_slice(), &[false, true, true, true, false]);
    }

    #[test]
    fn gather_identity() {
        let na = mask(&[false, true, false]);
        let (v, m) = gather(&[1, 2, 3], &na, &[1, 2, 3], &0);
        assert_eq!(v, vec![1, 2, 3]);
        assert_eq!(m, na);
    }

    #[test]
    fn recycle_grows_and_truncates() {
        let na = mask(&[false, false, true]);
        let (v, m) = recycle(&[1.0, 2.0, 0.0], &na, 10, &0.0);
        assert_eq!(v, vec![1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0]);
        assert_eq!(m.with_na(), vec![3, 6, 9]);

        let (v, m) = recycle(&[1.0, 2.0, 0.0], &na, 2, &0.0);
        assert_eq!(v, vec![1.0, 2.0]);
        assert!(!m.get(0) && !m.get(1));
    }

    #[test]
    fn recycle_empty_is_na() {
        let (v, m) = recycle::<i64>(&[], &NaMask::default(), 3, &0);
        assert_eq!(v, vec![0, 0, 0]);
        assert_eq!(m, NaMask::all(3));
    }

    #[test]
    fn apply_writes_default_at_na() {
        let m = Mapper::compact(|v: &i64, na| (v * 10, na || *v == 2));
        let (v, na) = apply(&[1, 2, 3], &mask(&[false, false, true]), &m);
        assert_eq!(v, vec![10, 0, 0]);
        assert_eq!(na.as_slice(), &[false, true, true]);
    }

    #[test]
    fn apply_to_subset() {
        let m = Mapper::brief(|v: &i64| -v);
        let (v, na) = apply_to(&[1, 2, 3, 4], &mask(&[false, false, true, false]), &[0, 2, 3], &m);
        assert_eq!(v, vec![1, -2, 0, 4]);
        assert_eq!(na.as_slice(), &[false, false, true, false]);
    }

    #[test]
    fn summarize_shapes() {
        let data = [1_i64, 2, 3, 4];
        let none = NaMask::none(4);

        let full = Folder::full(|i, acc: &i64, v: &i64, na| if i == 1 { (*v, na) } else { (acc + v, na) });
        assert_eq!(summarize(&data, &none, &full), Some(10));

        let brief = Folder::brief(|acc: &i64, v: &i64| acc * v);
        assert_eq!(summarize(&data, &none, &brief), Some(24));

        let some_na = mask(&[false, false, true, false]);
        assert_eq!(summarize(&data, &some_na, &full), None);
        assert_eq!(summarize(&data, &some_na, &brief), None);
        assert_eq!(summarize::<i64>(&[], &NaMask::default(), &brief), None);
        assert_eq!(summarize::<i64>(&[], &NaMask::default(), &full), None);
    }

    #[test]
    fn summarize_short_circuits() {
        let calls = std::cell::Cell::new(0);
        let full = Folder::full(|_, _: &i64, v: &i64, na| {
            calls.set(calls.get() + 1);
            (*v, na)
        });
        let na = mask(&[false, true, false, false]);
        assert_eq!(summarize(&[1, 2, 3, 4], &na, &full), None);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn compact_folder_sees_leading_na() {
        let skip_na = Folder::compact(|acc: &i64, v: &i64, na| match na {
            true => (*acc, false),
            false => (acc + v, false),
        });
        let data = [1_i64, 2, 3];
        assert_eq!(summarize(&data, &mask(&[false, true, false]), &skip_na), Some(4));
        assert_eq!(summarize(&data, &mask(&[true, false, false]), &skip_na), Some(5));
        assert_eq!(summarize(&data, &mask(&[true, true, false]), &skip_na), Some(3));
        assert_eq!(summarize(&data, &mask(&[true, true, true]), &skip_na), None);

        let strict = Folder::compact(|acc: &i64, v: &i64, na| (acc + v, na));
        assert_eq!(summarize(&data, &mask(&[true, false, false]), &strict), None);

        let brief = Folder::brief(|acc: &i64, v: &i64| acc + v);
        assert_eq!(summarize(&data, &mask(&[true, false, false]), &brief), None);
    }

    #[test]
    fn traverse_shapes() {
        let na = mask(&[false, true, false]);
        let mut seen = vec![];
        traverse(&[1_i64, 2, 3], &na, &mut Visitor::compact(|v: &i64, na| seen.push((*v, na))));
        assert_eq!(seen, vec![(1, false), (2, true), (3, false)]);

        let mut count = 0;
        traverse(&[1_i64, 2, 3], &na, &mut Visitor::brief(|_: &i64| count += 1));
        assert_eq!(count, 2);
    }

    #[test]
    fn coalesce_first_present_wins() {
        let (v, na) = coalesce(
            &[1, 0, 0, 4],
            &mask(&[false, true, true, false]),
            &[9, 8, 0, 6],
            &mask(&[false, false, true, false]),
        );
        assert_eq!(v, vec![1, 8, 0, 4]);
        assert_eq!(na.as_slice(), &[false, false, true, false]);
    }
}
