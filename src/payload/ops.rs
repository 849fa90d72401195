use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Sub};

use num_complex::Complex64;
use num_traits::{One, Zero};

use super::core::Variant;
use super::element::Element;
use super::nable::NaMask;
use super::typed::Typed;
use crate::utils::zip_recycle;

/// Element types supporting arithmetic
///
/// Integer arithmetic wraps on overflow. Division reports `None` for a
/// zero divisor, which payload arithmetic turns into NA.
///
pub trait Numeric: Variant + Copy + Zero + One {
    /// Element type of a mean
    type Mean: Variant;

    fn plus(self, rhs: Self) -> Self;
    fn minus(self, rhs: Self) -> Self;
    fn times(self, rhs: Self) -> Self;
    fn over(self, rhs: Self) -> Option<Self>;
    fn negate(self) -> Self;

    /// Mean of non-empty values, accumulated in the mean's own type
    fn mean_of(values: &[Self]) -> Self::Mean;
}

impl Numeric for i64 {
    type Mean = f64;

    fn plus(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    fn minus(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }

    fn times(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }

    fn over(self, rhs: Self) -> Option<Self> {
        match rhs {
            0 => None,
            _ => Some(self.wrapping_div(rhs)),
        }
    }

    fn negate(self) -> Self {
        self.wrapping_neg()
    }

    fn mean_of(values: &[Self]) -> f64 {
        values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
    }
}

impl Numeric for f64 {
    type Mean = f64;

    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }

    fn times(self, rhs: Self) -> Self {
        self * rhs
    }

    fn over(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            None
        } else {
            Some(self / rhs)
        }
    }

    fn negate(self) -> Self {
        -self
    }

    fn mean_of(values: &[Self]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Numeric for Complex64 {
    type Mean = Complex64;

    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }

    fn times(self, rhs: Self) -> Self {
        self * rhs
    }

    fn over(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            None
        } else {
            Some(self / rhs)
        }
    }

    fn negate(self) -> Self {
        -self
    }

    fn mean_of(values: &[Self]) -> Complex64 {
        values.iter().sum::<Complex64>() / values.len() as f64
    }
}

/// Element-wise binary operation, recycling the shorter side
///
/// Either side NA, or `f` giving `None`, makes the position NA. An empty
/// operand gives an empty result.
///
pub(crate) fn binary<T, F>(lhs: &Typed<T>, rhs: &Typed<T>, f: F) -> Typed<T>
where
    T: Element + Copy,
    F: Fn(T, T) -> Option<T>,
{
    let (ldata, lna) = lhs.parts();
    let (rdata, rna) = rhs.parts();

    if ldata.is_empty() || rdata.is_empty() {
        return lhs.derive(vec![], NaMask::default());
    }

    let l = ldata.iter().zip(lna.as_slice().iter());
    let r = rdata.iter().zip(rna.as_slice().iter());

    let (data, na): (Vec<T>, Vec<bool>) = zip_recycle(l, r)
        .map(|((&l, &lna), (&r, &rna))| match lna || rna {
            true => None,
            false => f(l, r),
        })
        .map(|x| match x {
            Some(x) => (x, false),
            None => (T::na_value(), true),
        })
        .unzip();

    lhs.derive(data, NaMask::new(na))
}

fn unary<T, F>(x: &Typed<T>, f: F) -> Typed<T>
where
    T: Element + Copy,
    F: Fn(T) -> T,
{
    let (data, na) = x.parts();
    let data = data.iter().map(|&v| f(v)).collect();
    x.derive(data, na.clone())
}

/// Arithmetic operators usable without naming the operand types
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Arith {
    Add,
    Sub,
    Mul,
    Div,
}

impl Arith {
    pub(crate) fn apply<T: Numeric>(self, lhs: &Typed<T>, rhs: &Typed<T>) -> Typed<T> {
        match self {
            Arith::Add => lhs + rhs,
            Arith::Sub => lhs - rhs,
            Arith::Mul => lhs * rhs,
            Arith::Div => lhs / rhs,
        }
    }
}

impl<'a, T: Numeric> Add<&'a Typed<T>> for &'a Typed<T> {
    type Output = Typed<T>;

    fn add(self, rhs: &'a Typed<T>) -> Typed<T> {
        binary(self, rhs, |l, r| Some(l.plus(r)))
    }
}

impl<'a, T: Numeric> Sub<&'a Typed<T>> for &'a Typed<T> {
    type Output = Typed<T>;

    fn sub(self, rhs: &'a Typed<T>) -> Typed<T> {
        binary(self, rhs, |l, r| Some(l.minus(r)))
    }
}

impl<'a, T: Numeric> Mul<&'a Typed<T>> for &'a Typed<T> {
    type Output = Typed<T>;

    fn mul(self, rhs: &'a Typed<T>) -> Typed<T> {
        binary(self, rhs, |l, r| Some(l.times(r)))
    }
}

impl<'a, T: Numeric> Div<&'a Typed<T>> for &'a Typed<T> {
    type Output = Typed<T>;

    fn div(self, rhs: &'a Typed<T>) -> Typed<T> {
        binary(self, rhs, |l, r| l.over(r))
    }
}

impl<'a, T: Numeric> Neg for &'a Typed<T> {
    type Output = Typed<T>;

    fn neg(self) -> Typed<T> {
        unary(self, |x| x.negate())
    }
}

impl<'a> BitAnd<&'a Typed<bool>> for &'a Typed<bool> {
    type Output = Typed<bool>;

    fn bitand(self, rhs: &'a Typed<bool>) -> Typed<bool> {
        binary(self, rhs, |l, r| Some(l & r))
    }
}

impl<'a> BitOr<&'a Typed<bool>> for &'a Typed<bool> {
    type Output = Typed<bool>;

    fn bitor(self, rhs: &'a Typed<bool>) -> Typed<bool> {
        binary(self, rhs, |l, r| Some(l | r))
    }
}

impl<'a> BitXor<&'a Typed<bool>> for &'a Typed<bool> {
    type Output = Typed<bool>;

    fn bitxor(self, rhs: &'a Typed<bool>) -> Typed<bool> {
        binary(self, rhs, |l, r| Some(l ^ r))
    }
}

impl<'a> Not for &'a Typed<bool> {
    type Output = Typed<bool>;

    fn not(self) -> Typed<bool> {
        unary(self, |x| !x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::nable::Nable;
    use crate::payload::types::{BooleanPayload, ComplexPayload, FloatPayload, IntegerPayload};
    use approx::assert_relative_eq;

    #[test]
    fn add_recycles_and_propagates_na() {
        let x = IntegerPayload::from(vec![Some(1), Some(2), None, Some(4)]);
        let y = IntegerPayload::from(vec![10, 20]);
        let z = &x + &y;
        assert_eq!(z.values(), vec![Some(11), Some(22), None, Some(24)]);
    }

    #[test]
    fn na_iff_either_side_na() {
        let x = FloatPayload::from(vec![Some(1.0), None, Some(3.0), None]);
        let y = FloatPayload::from(vec![None, Some(2.0), Some(3.0), None]);
        for z in [&x + &y, &x - &y, &x * &y, &x / &y] {
            assert_eq!(z.is_na(), vec![true, true, false, true]);
        }
    }

    #[test]
    fn division_by_zero_is_na() {
        let x = IntegerPayload::from(vec![7, -7, 7]);
        let y = IntegerPayload::from(vec![2, 2, 0]);
        assert_eq!((&x / &y).values(), vec![Some(3), Some(-3), None]);

        let x = FloatPayload::from(vec![1.0, 1.0]);
        let y = FloatPayload::from(vec![4.0, 0.0]);
        let z = &x / &y;
        assert_relative_eq!(z.get(1).unwrap_or_default(), 0.25);
        assert_eq!(z.get(2), None);

        let x = ComplexPayload::from(vec![Complex64::new(1.0, 1.0)]);
        let y = ComplexPayload::from(vec![Complex64::new(0.0, 0.0)]);
        assert_eq!((&x / &y).with_na(), vec![1]);
    }

    #[test]
    fn integers_wrap() {
        let x = IntegerPayload::from(vec![i64::MAX, i64::MIN]);
        let y = IntegerPayload::from(vec![1, -1]);
        assert_eq!((&x + &y).values(), vec![Some(i64::MIN), Some(i64::MAX)]);
        assert_eq!((&x / &y).get(2), Some(i64::MIN));
    }

    #[test]
    fn empty_operand_gives_empty() {
        let x = IntegerPayload::from(vec![1, 2]);
        assert!((&x + &IntegerPayload::empty()).is_empty());
        assert!((&IntegerPayload::empty() * &x).is_empty());
    }

    #[test]
    fn negation() {
        let x = FloatPayload::from(vec![Some(1.5), None]);
        assert_eq!((-&x).values(), vec![Some(-1.5), None]);
    }

    #[test]
    fn boolean_logic() {
        let x = BooleanPayload::from(vec![Some(true), Some(true), Some(false), None]);
        let y = BooleanPayload::from(vec![Some(true), Some(false), Some(false), Some(true)]);
        assert_eq!((&x & &y).values(), vec![Some(true), Some(false), Some(false), None]);
        assert_eq!((&x | &y).values(), vec![Some(true), Some(true), Some(false), None]);
        assert_eq!((&x ^ &y).values(), vec![Some(false), Some(true), Some(false), None]);
        assert_eq!((!&x).values(), vec![Some(false), Some(false), Some(true), None]);
    }

    #[test]
    fn arith_dispatches() {
        let x = IntegerPayload::from(vec![6, 8]);
        let y = IntegerPayload::from(vec![2]);
        assert_eq!(Arith::Sub.apply(&x, &y).values(), vec![Some(4), Some(6)]);
        assert_eq!(Arith::Div.apply(&x, &y).values(), vec![Some(3), Some(4)]);
        assert_eq!(Arith::Mul.to_string(), "mul");
    }
}
