use chrono::{DateTime, Utc};
use num_traits::{One, Zero};

use super::core::{Payload, Variant};
use super::nable::{NaMask, Nable};
use super::ops::Numeric;
use super::typed::Typed;

/// Sums and products; every result is a payload
///
/// Any NA makes `sum`, `prod` and `mean` NA. The empty sum is 0 and the
/// empty product 1, while the empty mean is NA. Cumulative results turn NA
/// at the first NA and stay NA.
///
pub trait Summable {
    fn sum(&self) -> Payload;
    fn prod(&self) -> Payload;
    fn mean(&self) -> Payload;
    fn cum_sum(&self) -> Payload;
    fn cum_prod(&self) -> Payload;
}

/// Order statistics; NA behaves as for [`Summable`] and an empty payload
/// gives NA
pub trait Ordinal {
    fn min(&self) -> Payload;
    fn max(&self) -> Payload;
    fn median(&self) -> Payload;
    fn cum_min(&self) -> Payload;
    fn cum_max(&self) -> Payload;
}

/// Element types with an order statistic midpoint
pub trait Ordered: Variant + Copy {
    type Median: Variant;

    fn midpoint(lo: Self, hi: Self) -> Self::Median;
    fn exact(x: Self) -> Self::Median;
}

impl Ordered for i64 {
    type Median = f64;

    fn midpoint(lo: Self, hi: Self) -> f64 {
        (lo as f64 + hi as f64) / 2.0
    }

    fn exact(x: Self) -> f64 {
        x as f64
    }
}

impl Ordered for f64 {
    type Median = f64;

    fn midpoint(lo: Self, hi: Self) -> f64 {
        (lo + hi) / 2.0
    }

    fn exact(x: Self) -> f64 {
        x
    }
}

impl Ordered for DateTime<Utc> {
    type Median = DateTime<Utc>;

    fn midpoint(lo: Self, hi: Self) -> Self {
        lo + (hi - lo) / 2
    }

    fn exact(x: Self) -> Self {
        x
    }
}

fn fold<T: Variant + Copy>(x: &Typed<T>, init: T, f: impl Fn(T, T) -> T) -> Option<T> {
    if x.has_na() {
        return None;
    }
    let (data, _) = x.parts();
    Some(data.iter().fold(init, |acc, &v| f(acc, v)))
}

fn reduce<T: Variant + Copy>(x: &Typed<T>, f: impl Fn(T, T) -> T) -> Option<T> {
    if x.has_na() {
        return None;
    }
    let (data, _) = x.parts();
    data.iter().copied().reduce(f)
}

/// Running fold, NA from the first NA onward
fn running<T: Variant + Copy>(x: &Typed<T>, f: impl Fn(T, T) -> T) -> Typed<T> {
    let (data, na) = x.parts();
    let mut out = Vec::with_capacity(data.len());
    let mut mask = Vec::with_capacity(data.len());
    let mut acc: Option<T> = None;
    let mut missing = false;

    for (i, &v) in data.iter().enumerate() {
        missing = missing || na.get(i);
        if missing {
            out.push(T::na_value());
            mask.push(true);
            continue;
        }

        let next = match acc {
            Some(acc) => f(acc, v),
            None => v,
        };
        acc = Some(next);
        out.push(next);
        mask.push(false);
    }

    x.derive(out, NaMask::new(mask))
}

fn scalar<U: Variant>(value: Option<U>) -> Payload {
    U::wrap(match value {
        Some(x) => Typed::from(vec![x]),
        None => Typed::na(1),
    })
}

impl<T: Numeric> Summable for Typed<T> {
    fn sum(&self) -> Payload {
        T::wrap(self.scalar(fold(self, T::zero(), T::plus)))
    }

    fn prod(&self) -> Payload {
        T::wrap(self.scalar(fold(self, T::one(), T::times)))
    }

    fn mean(&self) -> Payload {
        let mean = match self.is_empty() || self.has_na() {
            true => None,
            false => Some(T::mean_of(self.parts().0)),
        };
        scalar(mean)
    }

    fn cum_sum(&self) -> Payload {
        T::wrap(running(self, T::plus))
    }

    fn cum_prod(&self) -> Payload {
        T::wrap(running(self, T::times))
    }
}

impl<T: Ordered> Ordinal for Typed<T> {
    fn min(&self) -> Payload {
        T::wrap(self.scalar(reduce(self, |a, b| if self.is_less(&b, &a) { b } else { a })))
    }

    fn max(&self) -> Payload {
        T::wrap(self.scalar(reduce(self, |a, b| if self.is_less(&a, &b) { b } else { a })))
    }

    /// Middle of the sorted values, averaging the two middle values of an
    /// even-length payload
    fn median(&self) -> Payload {
        if self.is_empty() || self.has_na() {
            return scalar::<T::Median>(None);
        }

        let (data, _) = self.parts();
        let order = self.order();
        let n = order.len();
        let median = match n % 2 {
            1 => T::exact(data[order[n / 2]]),
            _ => T::midpoint(data[order[n / 2 - 1]], data[order[n / 2]]),
        };
        scalar(Some(median))
    }

    fn cum_min(&self) -> Payload {
        T::wrap(running(self, |a, b| if self.is_less(&b, &a) { b } else { a }))
    }

    fn cum_max(&self) -> Payload {
        T::wrap(running(self, |a, b| if self.is_less(&a, &b) { b } else { a }))
    }
}
