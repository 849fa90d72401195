//! Callback shapes
//!
//! Callbacks handed to `apply`, `which`, `summarize` and `traverse` come in
//! three shapes. A *full* callback sees the 1-based index, the value and its
//! NA flag; a *compact* one sees the value and NA flag; a *brief* one sees
//! only the value and is never invoked at NA positions.
//!
//! ```
//! use rvector::payload::{IntegerPayload, Mapper};
//!
//! let x = IntegerPayload::from(vec![Some(1), None, Some(3)]);
//! let doubled = x.apply(&Mapper::brief(|v: &i64| v * 2));
//! assert_eq!(doubled.get(3), Some(6));
//! assert_eq!(doubled.get(2), None);
//! ```

use super::element::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Shape {
    Full,
    Compact,
    Brief,
}

/// Element-wise transformation, `(value, is_na) -> (value, is_na)`
pub enum Mapper<'a, T> {
    Full(Box<dyn Fn(usize, &T, bool) -> (T, bool) + 'a>),
    Compact(Box<dyn Fn(&T, bool) -> (T, bool) + 'a>),
    Brief(Box<dyn Fn(&T) -> T + 'a>),
}

impl<'a, T: Element> Mapper<'a, T> {
    pub fn full(f: impl Fn(usize, &T, bool) -> (T, bool) + 'a) -> Self {
        Mapper::Full(Box::new(f))
    }

    pub fn compact(f: impl Fn(&T, bool) -> (T, bool) + 'a) -> Self {
        Mapper::Compact(Box::new(f))
    }

    pub fn brief(f: impl Fn(&T) -> T + 'a) -> Self {
        Mapper::Brief(Box::new(f))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Mapper::Full(_) => Shape::Full,
            Mapper::Compact(_) => Shape::Compact,
            Mapper::Brief(_) => Shape::Brief,
        }
    }

    #[inline]
    pub(crate) fn call(&self, index: usize, value: &T, na: bool) -> (T, bool) {
        match self {
            Mapper::Full(f) => f(index, value, na),
            Mapper::Compact(f) => f(value, na),
            Mapper::Brief(_) if na => (T::na_value(), true),
            Mapper::Brief(f) => (f(value), false),
        }
    }
}

/// Element-wise test, `(value, is_na) -> bool`
pub enum Predicate<'a, T> {
    Full(Box<dyn Fn(usize, &T, bool) -> bool + 'a>),
    Compact(Box<dyn Fn(&T, bool) -> bool + 'a>),
    Brief(Box<dyn Fn(&T) -> bool + 'a>),
}

impl<'a, T: Element> Predicate<'a, T> {
    pub fn full(f: impl Fn(usize, &T, bool) -> bool + 'a) -> Self {
        Predicate::Full(Box::new(f))
    }

    pub fn compact(f: impl Fn(&T, bool) -> bool + 'a) -> Self {
        Predicate::Compact(Box::new(f))
    }

    pub fn brief(f: impl Fn(&T) -> bool + 'a) -> Self {
        Predicate::Brief(Box::new(f))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Predicate::Full(_) => Shape::Full,
            Predicate::Compact(_) => Shape::Compact,
            Predicate::Brief(_) => Shape::Brief,
        }
    }

    #[inline]
    pub(crate) fn test(&self, index: usize, value: &T, na: bool) -> bool {
        match self {
            Predicate::Full(f) => f(index, value, na),
            Predicate::Compact(f) => f(value, na),
            Predicate::Brief(f) => !na && f(value),
        }
    }
}

/// Fold step, `(accumulator, value, is_na) -> (accumulator, is_na)`
///
/// A full folder starts from the element default and is expected to seed
/// its accumulator itself when the index is 1. Compact and brief folders
/// are seeded with the first element and fold from the second onward.
///
pub enum Folder<'a, T> {
    Full(Box<dyn Fn(usize, &T, &T, bool) -> (T, bool) + 'a>),
    Compact(Box<dyn Fn(&T, &T, bool) -> (T, bool) + 'a>),
    Brief(Box<dyn Fn(&T, &T) -> T + 'a>),
}

impl<'a, T: Element> Folder<'a, T> {
    pub fn full(f: impl Fn(usize, &T, &T, bool) -> (T, bool) + 'a) -> Self {
        Folder::Full(Box::new(f))
    }

    pub fn compact(f: impl Fn(&T, &T, bool) -> (T, bool) + 'a) -> Self {
        Folder::Compact(Box::new(f))
    }

    pub fn brief(f: impl Fn(&T, &T) -> T + 'a) -> Self {
        Folder::Brief(Box::new(f))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Folder::Full(_) => Shape::Full,
            Folder::Compact(_) => Shape::Compact,
            Folder::Brief(_) => Shape::Brief,
        }
    }

    #[inline]
    pub(crate) fn step(&self, index: usize, acc: &T, value: &T, na: bool) -> (T, bool) {
        match self {
            Folder::Full(f) => f(index, acc, value, na),
            Folder::Compact(f) => f(acc, value, na),
            Folder::Brief(_) if na => (T::na_value(), true),
            Folder::Brief(f) => (f(acc, value), false),
        }
    }
}

/// Side-effecting visit, `(value, is_na)`
pub enum Visitor<'a, T> {
    Full(Box<dyn FnMut(usize, &T, bool) + 'a>),
    Compact(Box<dyn FnMut(&T, bool) + 'a>),
    Brief(Box<dyn FnMut(&T) + 'a>),
}

impl<'a, T: Element> Visitor<'a, T> {
    pub fn full(f: impl FnMut(usize, &T, bool) + 'a) -> Self {
        Visitor::Full(Box::new(f))
    }

    pub fn compact(f: impl FnMut(&T, bool) + 'a) -> Self {
        Visitor::Compact(Box::new(f))
    }

    pub fn brief(f: impl FnMut(&T) + 'a) -> Self {
        Visitor::Brief(Box::new(f))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Visitor::Full(_) => Shape::Full,
            Visitor::Compact(_) => Shape::Compact,
            Visitor::Brief(_) => Shape::Brief,
        }
    }

    #[inline]
    pub(crate) fn visit(&mut self, index: usize, value: &T, na: bool) {
        match self {
            Visitor::Full(f) => f(index, value, na),
            Visitor::Compact(f) => f(value, na),
            Visitor::Brief(_) if na => (),
            Visitor::Brief(f) => f(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_mapper_skips_na() {
        let m = Mapper::brief(|v: &i64| v + 1);
        assert_eq!(m.call(1, &1, false), (2, false));
        assert_eq!(m.call(2, &7, true), (0, true));
        assert_eq!(m.shape(), Shape::Brief);
    }

    #[test]
    fn compact_and_full_see_na() {
        let m = Mapper::compact(|v: &i64, na| if na { (-1, false) } else { (*v, false) });
        assert_eq!(m.call(1, &0, true), (-1, false));

        let m = Mapper::full(|i, v: &i64, _| (v * i as i64, false));
        assert_eq!(m.call(3, &2, false), (6, false));
    }

    #[test]
    fn predicates() {
        let p = Predicate::brief(|v: &i64| *v > 0);
        assert!(p.test(1, &1, false));
        assert!(!p.test(1, &1, true));

        let p = Predicate::compact(|_: &i64, na| na);
        assert!(p.test(1, &0, true));
        assert_eq!(p.shape().to_string(), "compact");
    }

    #[test]
    fn visitors_accumulate() {
        let mut seen = Vec::new();
        {
            let mut v = Visitor::brief(|x: &i64| seen.push(*x));
            v.visit(1, &4, false);
            v.visit(2, &5, true);
            v.visit(3, &6, false);
        }
        assert_eq!(seen, vec![4, 6]);
    }
}
