/// Zip iterators into recycling vectors, extending to longest length
///
/// This operation does not do any vector length matching, elements will be
/// recycled even if they do not repeat an even number of times. If either
/// side is empty, so is the result.
///
/// ```rust
/// use rvector::utils::zip_recycle;
///
/// let x = vec![1, 2, 3, 4];
/// let y = vec![2, 4];
/// let z: Vec<_> = zip_recycle(x.iter(), y.iter()).collect();
/// assert_eq!(z, vec![(&1, &2), (&2, &4), (&3, &2), (&4, &4)]);
/// ```
///
pub fn zip_recycle<'a, L, R, LItem, RItem>(
    l: L,
    r: R,
) -> impl Iterator<Item = (LItem, RItem)> + 'a
where
    L: ExactSizeIterator + Iterator<Item = LItem> + Clone + 'a,
    R: ExactSizeIterator + Iterator<Item = RItem> + Clone + 'a,
    LItem: Clone + 'a,
    RItem: Clone + 'a,
{
    let n = std::cmp::max(l.len(), r.len());
    l.cycle().zip(r.cycle()).take(n)
}

/// Positions of `true` entries in a mask, as ascending 1-based indices
pub fn true_positions(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &m)| if m { Some(i + 1) } else { None })
        .collect()
}
