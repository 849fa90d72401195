use std::cmp::Ordering;

/// NA-aware ordering
///
/// `sorted_indices` is a 0-based permutation that sorts the payload, with
/// NA positions last in their original order. Ranks are dense, aligned with
/// the sorted order, start at 1 and are 0 at NA positions.
///
pub trait Arrangeable {
    fn sorted_indices(&self) -> Vec<usize>;
    fn sorted_indices_with_ranks(&self) -> (Vec<usize>, Vec<usize>);
}

#[inline]
fn ordering<F>(less: &F, i: usize, j: usize) -> Ordering
where
    F: Fn(usize, usize) -> bool,
{
    if less(i, j) {
        Ordering::Less
    } else if less(j, i) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Stable sort of positions `0..na.len()`
///
/// `less` compares two 0-based positions and is never asked about an NA
/// position.
///
pub fn sort_indices<F>(na: &[bool], less: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> bool,
{
    let mut order: Vec<usize> = (0..na.len()).collect();

    if !na.iter().any(|&x| x) {
        order.sort_by(|&i, &j| ordering(&less, i, j));
        return order;
    }

    order.sort_by(|&i, &j| match (na[i], na[j]) {
        (true, true) => i.cmp(&j),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => ordering(&less, i, j),
    });

    order
}

/// Dense ranks along an already sorted order
pub fn rank_sorted<F>(order: &[usize], na: &[bool], equal: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> bool,
{
    let mut ranks = Vec::with_capacity(order.len());
    let mut rank = 0;
    let mut prev: Option<usize> = None;

    for &i in order {
        if na[i] {
            ranks.push(0);
        } else {
            match prev {
                Some(p) if !na[p] && equal(p, i) => (),
                _ => rank += 1,
            }
            ranks.push(rank);
        }
        prev = Some(i);
    }

    ranks
}
