use std::borrow::Cow;

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use tracing::debug;

use super::arrange::Arrangeable;
use super::coercion::CoercibleInto;
use super::element::{Element, Kind, Na, Opaque};
use super::factor::FactorPayload;
use super::group::Groupable;
use super::mapper::{Folder, Mapper, Predicate, Shape, Visitor};
use super::nable::Nable;
use super::ops::{Arith, Numeric};
use super::options::Opt;
use super::stats::{Ordinal, Summable};
use super::traits::{Coalescer, Comparable, Configurable, Convertible, Finder, Sequence};
use super::typed::Typed;
use super::types::*;
use super::value::Value;
use crate::error::Error;
use crate::internal_err;

/// A payload of any element type
///
/// Each variant owns a concrete payload; operations dispatch on the variant.
/// Operations across element types convert the operand into the receiver's
/// type, except for arithmetic which promotes both sides to their common
/// numeric type.
///
#[derive(Debug, Clone)]
pub enum Payload {
    Boolean(BooleanPayload),
    Integer(IntegerPayload),
    Float(FloatPayload),
    Complex(ComplexPayload),
    String(StringPayload),
    Time(TimePayload),
    Factor(FactorPayload),
    Any(AnyPayload),
    Na(NaPayload),
}

/// Run the same expression against whichever payload a variant holds
macro_rules! dispatch {
    ($self:expr, $x:ident => $body:expr) => {
        match $self {
            Payload::Boolean($x) => $body,
            Payload::Integer($x) => $body,
            Payload::Float($x) => $body,
            Payload::Complex($x) => $body,
            Payload::String($x) => $body,
            Payload::Time($x) => $body,
            Payload::Factor($x) => $body,
            Payload::Any($x) => $body,
            Payload::Na($x) => $body,
        }
    };
}

/// As [`dispatch`], wrapping the result back into the same variant
macro_rules! rewrap {
    ($self:expr, $x:ident => $body:expr) => {
        match $self {
            Payload::Boolean($x) => Payload::Boolean($body),
            Payload::Integer($x) => Payload::Integer($body),
            Payload::Float($x) => Payload::Float($body),
            Payload::Complex($x) => Payload::Complex($body),
            Payload::String($x) => Payload::String($body),
            Payload::Time($x) => Payload::Time($body),
            Payload::Factor($x) => Payload::Factor($body),
            Payload::Any($x) => Payload::Any($body),
            Payload::Na($x) => Payload::Na($body),
        }
    };
}

/// Element types with their own [`Payload`] variant
///
/// Used to check, at call time, whether a typed callback or option fits a
/// type-erased payload. String callbacks and options also fit factors.
///
pub trait Variant: Element {
    fn typed(p: &Payload) -> Option<&Typed<Self>>;
    fn typed_mut(p: &mut Payload) -> Option<&mut Typed<Self>>;
    fn wrap(x: Typed<Self>) -> Payload;

    /// Convert any payload into this element type
    fn convert(p: &Payload) -> Typed<Self>;

    fn accepts(p: &Payload) -> bool {
        Self::typed(p).is_some()
    }

    /// Borrow as this element type when the payload holds it
    fn view(p: &Payload) -> Option<Cow<'_, Typed<Self>>> {
        Self::typed(p).map(Cow::Borrowed)
    }

    /// Rebuild the payload through a transformation of its values
    fn map(p: &Payload, f: impl FnOnce(&Typed<Self>) -> Typed<Self>) -> Option<Payload> {
        Self::typed(p).map(|x| Self::wrap(f(x)))
    }

    fn configure(p: &mut Payload, opt: Opt<Self>) -> Option<bool> {
        Self::typed_mut(p).map(|x| x.set_option(opt))
    }

    fn options(p: &Payload) -> Option<Vec<Opt<Self>>> {
        Self::typed(p).map(|x| x.options())
    }
}

macro_rules! variant {
    ($t:ty, $variant:ident) => {
        impl Variant for $t {
            fn typed(p: &Payload) -> Option<&Typed<Self>> {
                match p {
                    Payload::$variant(x) => Some(x),
                    _ => None,
                }
            }

            fn typed_mut(p: &mut Payload) -> Option<&mut Typed<Self>> {
                match p {
                    Payload::$variant(x) => Some(x),
                    _ => None,
                }
            }

            fn wrap(x: Typed<Self>) -> Payload {
                Payload::$variant(x)
            }

            fn convert(p: &Payload) -> Typed<Self> {
                p.coerce::<$t>()
            }
        }
    };
}

variant!(bool, Boolean);
variant!(i64, Integer);
variant!(f64, Float);
variant!(Complex64, Complex);
variant!(DateTime<Utc>, Time);
variant!(Opaque, Any);

impl Variant for String {
    fn typed(p: &Payload) -> Option<&Typed<Self>> {
        match p {
            Payload::String(x) => Some(x),
            _ => None,
        }
    }

    fn typed_mut(p: &mut Payload) -> Option<&mut Typed<Self>> {
        match p {
            Payload::String(x) => Some(x),
            _ => None,
        }
    }

    fn wrap(x: Typed<Self>) -> Payload {
        Payload::String(x)
    }

    fn convert(p: &Payload) -> Typed<Self> {
        p.coerce::<String>()
    }

    fn accepts(p: &Payload) -> bool {
        matches!(p, Payload::String(_) | Payload::Factor(_))
    }

    fn view(p: &Payload) -> Option<Cow<'_, Typed<Self>>> {
        match p {
            Payload::String(x) => Some(Cow::Borrowed(x)),
            Payload::Factor(x) => Some(Cow::Owned(x.to_strings())),
            _ => None,
        }
    }

    fn map(p: &Payload, f: impl FnOnce(&Typed<Self>) -> Typed<Self>) -> Option<Payload> {
        match p {
            Payload::String(x) => Some(Payload::String(f(x))),
            Payload::Factor(x) => Some(Payload::Factor(x.map_strings(f))),
            _ => None,
        }
    }

    fn configure(p: &mut Payload, opt: Opt<Self>) -> Option<bool> {
        match p {
            Payload::String(x) => Some(x.set_option(opt)),
            Payload::Factor(x) => Some(x.set_option(opt)),
            _ => None,
        }
    }

    fn options(p: &Payload) -> Option<Vec<Opt<Self>>> {
        match p {
            Payload::String(x) => Some(x.options()),
            Payload::Factor(x) => Some(x.options()),
            _ => None,
        }
    }
}

impl Variant for Na {
    fn typed(p: &Payload) -> Option<&Typed<Self>> {
        match p {
            Payload::Na(x) => Some(x),
            _ => None,
        }
    }

    fn typed_mut(p: &mut Payload) -> Option<&mut Typed<Self>> {
        match p {
            Payload::Na(x) => Some(x),
            _ => None,
        }
    }

    fn wrap(x: Typed<Self>) -> Payload {
        Payload::Na(x)
    }

    fn convert(p: &Payload) -> Typed<Self> {
        NaPayload::with_len(p.len())
    }
}

/// Convert for `append` or `coalesce`, noting elements lost on the way
pub(crate) fn convert_logged<T: Variant>(p: &Payload, op: &'static str) -> Typed<T> {
    let converted = T::convert(p);
    let before = p.nable().with_na().len();
    let after = converted.with_na().len();
    if after > before && !T::ALWAYS_NA {
        debug!(
            op,
            from = %p.kind(),
            to = %T::KIND,
            lost = after - before,
            "elements could not be converted and became NA"
        );
    }
    converted
}

fn unsupported<T: Element>(op: &'static str, kind: Kind, shape: Shape) {
    debug!(op, kind = %kind, callback = %T::KIND, %shape, "callback not supported by payload");
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::Boolean(_) => Kind::Boolean,
            Payload::Integer(_) => Kind::Integer,
            Payload::Float(_) => Kind::Float,
            Payload::Complex(_) => Kind::Complex,
            Payload::String(_) => Kind::String,
            Payload::Time(_) => Kind::Time,
            Payload::Factor(_) => Kind::Factor,
            Payload::Any(_) => Kind::Any,
            Payload::Na(_) => Kind::Na,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, x => x.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A single element, [`Value::Na`] when NA or out of range
    pub fn value(&self, index: usize) -> Value {
        dispatch!(self, x => x.value(index))
    }

    pub fn nable(&self) -> &dyn Nable {
        dispatch!(self, x => x)
    }

    pub fn arrangeable(&self) -> &dyn Arrangeable {
        dispatch!(self, x => x)
    }

    pub fn groupable(&self) -> &dyn Groupable {
        dispatch!(self, x => x)
    }

    pub fn comparable(&self) -> &dyn Comparable {
        dispatch!(self, x => x)
    }

    pub fn finder(&self) -> &dyn Finder {
        dispatch!(self, x => x)
    }

    /// Convert every element into `U`
    pub fn coerce<U: Element>(&self) -> Typed<U>
    where
        bool: CoercibleInto<U>,
        i64: CoercibleInto<U>,
        f64: CoercibleInto<U>,
        Complex64: CoercibleInto<U>,
        String: CoercibleInto<U>,
        DateTime<Utc>: CoercibleInto<U>,
        Opaque: CoercibleInto<U>,
    {
        match self {
            Payload::Boolean(x) => x.coerce(),
            Payload::Integer(x) => x.coerce(),
            Payload::Float(x) => x.coerce(),
            Payload::Complex(x) => x.coerce(),
            Payload::String(x) => x.coerce(),
            Payload::Time(x) => x.coerce(),
            Payload::Factor(x) => x.to_strings().coerce(),
            Payload::Any(x) => x.coerce(),
            Payload::Na(x) => Typed::na(x.len()),
        }
    }

    pub fn options<T: Variant>(&self) -> Option<Vec<Opt<T>>> {
        T::options(self)
    }

    /// Apply an option; false when `T` is not this payload's element type
    pub fn set_option<T: Variant>(&mut self, opt: Opt<T>) -> bool {
        T::configure(self, opt).unwrap_or(false)
    }

    pub fn supports_which<T: Variant>(&self) -> bool {
        T::accepts(self)
    }

    pub fn supports_apply<T: Variant>(&self) -> bool {
        T::accepts(self)
    }

    pub fn supports_summarize<T: Variant>(&self) -> bool {
        T::accepts(self)
    }

    pub fn supports_traverse<T: Variant>(&self) -> bool {
        T::accepts(self)
    }

    /// Test every element; an unsupported callback matches nothing
    pub fn which<T: Variant>(&self, predicate: &Predicate<T>) -> Vec<bool> {
        match T::view(self) {
            Some(x) => x.which(predicate),
            None => {
                unsupported::<T>("which", self.kind(), predicate.shape());
                vec![false; self.len()]
            }
        }
    }

    /// Map every element; an unsupported callback gives all NA
    pub fn apply<T: Variant>(&self, mapper: &Mapper<T>) -> Payload {
        T::map(self, |x| x.apply(mapper)).unwrap_or_else(|| {
            unsupported::<T>("apply", self.kind(), mapper.shape());
            self.by_indices(&vec![0; self.len()])
        })
    }

    pub fn apply_to<T: Variant>(&self, indices: &[usize], mapper: &Mapper<T>) -> Payload {
        T::map(self, |x| x.apply_to(indices, mapper)).unwrap_or_else(|| {
            unsupported::<T>("apply_to", self.kind(), mapper.shape());
            self.by_indices(&vec![0; self.len()])
        })
    }

    /// Fold into one element; an unsupported callback gives a single NA
    pub fn summarize<T: Variant>(&self, folder: &Folder<T>) -> Payload {
        T::map(self, |x| x.summarize(folder)).unwrap_or_else(|| {
            unsupported::<T>("summarize", self.kind(), folder.shape());
            self.by_indices(&[0])
        })
    }

    pub fn traverse<T: Variant>(&self, visitor: &mut Visitor<T>) {
        match T::view(self) {
            Some(x) => x.traverse(visitor),
            None => unsupported::<T>("traverse", self.kind(), visitor.shape()),
        }
    }

    pub fn sum(&self) -> Result<Payload, Error> {
        summable(self, "sum", |x| x.sum())
    }

    pub fn prod(&self) -> Result<Payload, Error> {
        summable(self, "prod", |x| x.prod())
    }

    pub fn mean(&self) -> Result<Payload, Error> {
        summable(self, "mean", |x| x.mean())
    }

    pub fn cum_sum(&self) -> Result<Payload, Error> {
        summable(self, "cum_sum", |x| x.cum_sum())
    }

    pub fn cum_prod(&self) -> Result<Payload, Error> {
        summable(self, "cum_prod", |x| x.cum_prod())
    }

    pub fn min(&self) -> Result<Payload, Error> {
        ordinal(self, "min", |x| x.min())
    }

    pub fn max(&self) -> Result<Payload, Error> {
        ordinal(self, "max", |x| x.max())
    }

    pub fn median(&self) -> Result<Payload, Error> {
        ordinal(self, "median", |x| x.median())
    }

    pub fn cum_min(&self) -> Result<Payload, Error> {
        ordinal(self, "cum_min", |x| x.cum_min())
    }

    pub fn cum_max(&self) -> Result<Payload, Error> {
        ordinal(self, "cum_max", |x| x.cum_max())
    }
}

fn summable(p: &Payload, op: &'static str, f: impl Fn(&dyn Summable) -> Payload) -> Result<Payload, Error> {
    match p {
        Payload::Boolean(x) => Ok(f(&x.coerce::<i64>())),
        Payload::Integer(x) => Ok(f(x)),
        Payload::Float(x) => Ok(f(x)),
        Payload::Complex(x) => Ok(f(x)),
        _ => Err(Error::unsupported(op, p.kind())),
    }
}

fn ordinal(p: &Payload, op: &'static str, f: impl Fn(&dyn Ordinal) -> Payload) -> Result<Payload, Error> {
    match p {
        Payload::Boolean(x) => Ok(f(&x.coerce::<i64>())),
        Payload::Integer(x) => Ok(f(x)),
        Payload::Float(x) => Ok(f(x)),
        Payload::Time(x) => Ok(f(x)),
        _ => Err(Error::unsupported(op, p.kind())),
    }
}

impl Sequence for Payload {
    fn len(&self) -> usize {
        Payload::len(self)
    }

    fn by_indices(&self, indices: &[usize]) -> Self {
        rewrap!(self, x => x.by_indices(indices))
    }

    fn adjust(&self, n: usize) -> Self {
        rewrap!(self, x => x.adjust(n))
    }

    /// Concatenate in the receiver's type; an NA receiver takes on the
    /// other payload's type
    fn append(&self, other: &Payload) -> Self {
        match (self, other) {
            (Payload::Na(x), Payload::Na(y)) => Payload::Na(NaPayload::with_len(x.len() + y.len())),
            (Payload::Na(x), _) => rewrap!(other, y => y.pad_front(x.len())),
            _ => rewrap!(self, x => x.append(other)),
        }
    }

    fn str_for_elem(&self, index: usize) -> String {
        dispatch!(self, x => x.str_for_elem(index))
    }
}

impl Coalescer for Payload {
    fn coalesce(&self, other: &Payload) -> Self {
        rewrap!(self, x => x.coalesce(other))
    }
}

impl Convertible for Payload {
    fn booleans(&self) -> (Vec<bool>, Vec<bool>) {
        self.coerce::<bool>().into_parts()
    }

    fn integers(&self) -> (Vec<i64>, Vec<bool>) {
        self.coerce::<i64>().into_parts()
    }

    fn floats(&self) -> (Vec<f64>, Vec<bool>) {
        self.coerce::<f64>().into_parts()
    }

    fn complexes(&self) -> (Vec<Complex64>, Vec<bool>) {
        self.coerce::<Complex64>().into_parts()
    }

    fn strings(&self) -> (Vec<String>, Vec<bool>) {
        self.coerce::<String>().into_parts()
    }

    fn times(&self) -> (Vec<DateTime<Utc>>, Vec<bool>) {
        self.coerce::<DateTime<Utc>>().into_parts()
    }

    fn anys(&self) -> (Vec<Opaque>, Vec<bool>) {
        self.coerce::<Opaque>().into_parts()
    }
}

impl<T: Variant> From<Typed<T>> for Payload {
    fn from(x: Typed<T>) -> Self {
        T::wrap(x)
    }
}

impl From<FactorPayload> for Payload {
    fn from(x: FactorPayload) -> Self {
        Payload::Factor(x)
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Na(NaPayload::empty())
    }
}

pub trait TryAdd<Rhs = Self> {
    type Output;
    fn try_add(self, rhs: Rhs) -> Result<Self::Output, Error>;
}

pub trait TrySub<Rhs = Self> {
    type Output;
    fn try_sub(self, rhs: Rhs) -> Result<Self::Output, Error>;
}

pub trait TryMul<Rhs = Self> {
    type Output;
    fn try_mul(self, rhs: Rhs) -> Result<Self::Output, Error>;
}

pub trait TryDiv<Rhs = Self> {
    type Output;
    fn try_div(self, rhs: Rhs) -> Result<Self::Output, Error>;
}

/// Position in the numeric promotion order; NA payloads count as boolean
fn numeric_rank(p: &Payload) -> Result<u8, Error> {
    match p {
        Payload::Na(_) => Ok(0),
        _ => p.kind().numeric_rank().ok_or(Error::CannotBeCoercedToNumeric),
    }
}

fn promoted<T: Variant>(p: &Payload) -> Cow<'_, Typed<T>> {
    match T::typed(p) {
        Some(x) => Cow::Borrowed(x),
        None => Cow::Owned(T::convert(p)),
    }
}

fn arith_as<T: Numeric>(op: Arith, lhs: &Payload, rhs: &Payload) -> Payload {
    T::wrap(op.apply(&promoted::<T>(lhs), &promoted::<T>(rhs)))
}

fn arith(op: Arith, lhs: &Payload, rhs: &Payload) -> Result<Payload, Error> {
    // booleans never stay booleans under arithmetic
    let rank = numeric_rank(lhs)?.max(numeric_rank(rhs)?).max(1);
    match rank {
        1 => Ok(arith_as::<i64>(op, lhs, rhs)),
        2 => Ok(arith_as::<f64>(op, lhs, rhs)),
        3 => Ok(arith_as::<Complex64>(op, lhs, rhs)),
        _ => Err(internal_err!(format!("no numeric type for {op}"))),
    }
}

impl TryAdd for &Payload {
    type Output = Payload;

    fn try_add(self, rhs: Self) -> Result<Payload, Error> {
        arith(Arith::Add, self, rhs)
    }
}

impl TrySub for &Payload {
    type Output = Payload;

    fn try_sub(self, rhs: Self) -> Result<Payload, Error> {
        arith(Arith::Sub, self, rhs)
    }
}

impl TryMul for &Payload {
    type Output = Payload;

    fn try_mul(self, rhs: Self) -> Result<Payload, Error> {
        arith(Arith::Mul, self, rhs)
    }
}

impl TryDiv for &Payload {
    type Output = Payload;

    fn try_div(self, rhs: Self) -> Result<Payload, Error> {
        arith(Arith::Div, self, rhs)
    }
}
