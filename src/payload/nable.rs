use crate::utils::true_positions;

/// Missing-value queries
///
/// Every getter hands back a fresh vector; callers are free to modify
/// what they receive. Indices are 1-based and ascending.
///
pub trait Nable {
    fn has_na(&self) -> bool;
    fn is_na(&self) -> Vec<bool>;
    fn not_na(&self) -> Vec<bool>;
    fn with_na(&self) -> Vec<usize>;
    fn without_na(&self) -> Vec<usize>;
}

/// Per-position missing flags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NaMask(Vec<bool>);

impl NaMask {
    pub fn new(flags: Vec<bool>) -> Self {
        NaMask(flags)
    }

    /// A mask of `n` present values
    pub fn none(n: usize) -> Self {
        NaMask(vec![false; n])
    }

    /// A mask of `n` missing values
    pub fn all(n: usize) -> Self {
        NaMask(vec![true; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the 0-based position is missing; out of range counts as missing
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(true)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub(crate) fn push(&mut self, flag: bool) {
        self.0.push(flag)
    }

    pub(crate) fn extend(&mut self, other: &NaMask) {
        self.0.extend_from_slice(&other.0)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&na| na).count()
    }
}

impl From<Vec<bool>> for NaMask {
    fn from(flags: Vec<bool>) -> Self {
        NaMask(flags)
    }
}

impl FromIterator<bool> for NaMask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        NaMask(iter.into_iter().collect())
    }
}

impl Nable for NaMask {
    fn has_na(&self) -> bool {
        self.0.iter().any(|&na| na)
    }

    fn is_na(&self) -> Vec<bool> {
        self.0.clone()
    }

    fn not_na(&self) -> Vec<bool> {
        self.0.iter().map(|&na| !na).collect()
    }

    fn with_na(&self) -> Vec<usize> {
        true_positions(&self.0)
    }

    fn without_na(&self) -> Vec<usize> {
        true_positions(&self.not_na())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries() {
        let mask = NaMask::new(vec![false, true, false, true]);
        assert!(mask.has_na());
        assert_eq!(mask.is_na(), vec![false, true, false, true]);
        assert_eq!(mask.not_na(), vec![true, false, true, false]);
        assert_eq!(mask.with_na(), vec![2, 4]);
        assert_eq!(mask.without_na(), vec![1, 3]);
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn empty_mask_answers_nothing() {
        let mask = NaMask::default();
        assert!(!mask.has_na());
        assert!(mask.is_na().is_empty());
        assert!(mask.not_na().is_empty());
        assert!(mask.with_na().is_empty());
        assert!(mask.without_na().is_empty());
    }

    #[test]
    fn getters_copy() {
        let mask = NaMask::none(3);
        let mut flags = mask.is_na();
        flags[0] = true;
        assert!(!mask.has_na());
        assert!(!mask.get(0));
        assert!(mask.get(10));
    }
}
