use chrono::{DateTime, Utc};
use num_complex::Complex64;

use super::core::Payload;
use super::element::Opaque;
use super::options::Opt;
use super::value::Value;
use crate::utils::true_positions;

/// Length-changing operations shared by every payload
///
/// All indices are 1-based. Every operation returns a new payload and
/// leaves the receiver untouched.
///
pub trait Sequence: Sized {
    fn len(&self) -> usize;

    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gather by position; 0 or a position past the end yields NA
    fn by_indices(&self, indices: &[usize]) -> Self;

    /// Recycle or truncate to exactly `n` elements
    fn adjust(&self, n: usize) -> Self;

    /// Concatenate, converting `other` into the receiver's element type
    fn append(&self, other: &Payload) -> Self;

    fn str_for_elem(&self, index: usize) -> String;
}

pub trait Configurable<T> {
    fn options(&self) -> Vec<Opt<T>>;

    /// Apply a single option, reporting whether it was recognized
    fn set_option(&mut self, opt: Opt<T>) -> bool;
}

/// Element-wise comparison against a single dynamically typed needle
///
/// The needle is converted into the payload's element type first. A needle
/// that cannot be converted, `Value::Na` included, matches nothing. NA
/// positions never match; `neq` is the complement of `eq`.
///
pub trait Comparable {
    fn eq(&self, needle: &Value) -> Vec<bool>;

    fn neq(&self, needle: &Value) -> Vec<bool> {
        self.eq(needle).into_iter().map(|x| !x).collect()
    }

    fn gt(&self, needle: &Value) -> Vec<bool>;

    fn gte(&self, needle: &Value) -> Vec<bool> {
        self.gt(needle)
            .into_iter()
            .zip(self.eq(needle))
            .map(|(gt, eq)| gt || eq)
            .collect()
    }

    fn lt(&self, needle: &Value) -> Vec<bool>;

    fn lte(&self, needle: &Value) -> Vec<bool> {
        self.lt(needle)
            .into_iter()
            .zip(self.eq(needle))
            .map(|(lt, eq)| lt || eq)
            .collect()
    }
}

pub trait Finder: Comparable {
    /// First matching 1-based position
    fn find(&self, needle: &Value) -> Option<usize> {
        self.eq(needle).iter().position(|&x| x).map(|i| i + 1)
    }

    fn find_all(&self, needle: &Value) -> Vec<usize> {
        true_positions(&self.eq(needle))
    }
}

impl<T: Comparable> Finder for T {}

pub trait Coalescer: Sized {
    /// Fill NA positions from `other`, converted and adjusted to fit
    fn coalesce(&self, other: &Payload) -> Self;
}

/// Conversion into every element type
///
/// Each getter returns fresh values and NA flags. Elements that have no
/// representation in the target type come back as NA.
///
pub trait Convertible {
    fn booleans(&self) -> (Vec<bool>, Vec<bool>);
    fn integers(&self) -> (Vec<i64>, Vec<bool>);
    fn floats(&self) -> (Vec<f64>, Vec<bool>);
    fn complexes(&self) -> (Vec<Complex64>, Vec<bool>);
    fn strings(&self) -> (Vec<String>, Vec<bool>);
    fn times(&self) -> (Vec<DateTime<Utc>>, Vec<bool>);
    fn anys(&self) -> (Vec<Opaque>, Vec<bool>);
}
