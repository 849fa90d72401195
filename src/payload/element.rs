use std::any::Any;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};
use num_complex::Complex64;

use super::coercion::CoercibleInto;
use super::value::Value;

/// Element kinds
///
/// Names round-trip through their lowercase spelling, `"float"`,
/// `"factor"` and so on.
///
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Boolean,
    Integer,
    Float,
    Complex,
    String,
    Time,
    Factor,
    Any,
    Na,
}

impl Kind {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Kind::Boolean | Kind::Integer | Kind::Float | Kind::Complex
        )
    }

    /// Rank in the numeric promotion hierarchy
    pub(crate) fn numeric_rank(&self) -> Option<u8> {
        match self {
            Kind::Boolean => Some(0),
            Kind::Integer => Some(1),
            Kind::Float => Some(2),
            Kind::Complex => Some(3),
            _ => None,
        }
    }
}

/// Values of arbitrary type held by an any-typed payload
pub type Opaque = Rc<dyn Any>;

/// The element of a payload that holds nothing but missing values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Na;

/// Element descriptor
///
/// Supplies everything the shared engine needs to know about an element
/// type: its native ordering and equality, a hash projection used to bucket
/// values while grouping, the default value stored at NA positions, and its
/// textual form.
///
pub trait Element: Clone + Debug + 'static {
    const KIND: Kind;

    /// Payloads of this element are NA at every position
    const ALWAYS_NA: bool = false;

    type Key: Hash + Eq;

    /// Default value written at NA positions
    fn na_value() -> Self;
    fn less(&self, other: &Self) -> bool;
    fn equal(&self, other: &Self) -> bool;
    fn key(&self) -> Self::Key;
    fn format(&self, precision: usize) -> String;
    fn to_value(&self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

/// Total order over floats placing NaN after every number
pub(crate) fn float_cmp(l: f64, r: f64) -> Ordering {
    match (l.is_nan(), r.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
    }
}

fn float_key(x: f64) -> u64 {
    // 0.0 == -0.0, so they must share a bucket
    if x == 0.0 {
        0_f64.to_bits()
    } else {
        x.to_bits()
    }
}

pub fn format_float(x: f64, precision: usize) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        format!("{:.*}", precision, x)
    }
}

pub fn format_complex(x: Complex64, precision: usize) -> String {
    if x.re.is_nan() || x.im.is_nan() {
        "NaN".to_string()
    } else if x.re.is_infinite() || x.im.is_infinite() {
        "Inf".to_string()
    } else {
        format!("{:.p$}{:+.p$}i", x.re, x.im, p = precision)
    }
}

pub fn format_time(x: &DateTime<Utc>) -> String {
    x.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Equality of opaque values: the same allocation, or equal known primitives
pub fn opaque_eq(l: &Opaque, r: &Opaque) -> bool {
    if Rc::ptr_eq(l, r) {
        return true;
    }

    macro_rules! same {
        ($($t:ty),*) => {
            $(
                if let (Some(l), Some(r)) = (l.downcast_ref::<$t>(), r.downcast_ref::<$t>()) {
                    return l == r;
                }
            )*
        };
    }

    same!(bool, i64, i32, f64, Complex64, String, &'static str, DateTime<Utc>, Na);
    false
}

/// Best-effort text for an opaque value
pub fn describe_opaque(x: &Opaque, precision: usize) -> String {
    if let Some(x) = x.downcast_ref::<Value>() {
        return x.to_string();
    }
    match CoercibleInto::<Value>::coerce_into(x) {
        Some(Value::Na) | None => "<any>".to_string(),
        Some(Value::Float(f)) => format_float(f, precision),
        Some(Value::Complex(c)) => format_complex(c, precision),
        Some(v) => v.to_string(),
    }
}

impl Element for bool {
    const KIND: Kind = Kind::Boolean;
    type Key = bool;

    fn na_value() -> Self {
        false
    }

    fn less(&self, other: &Self) -> bool {
        !*self & *other
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn key(&self) -> Self::Key {
        *self
    }

    fn format(&self, _precision: usize) -> String {
        self.to_string()
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.coerce_into()
    }
}

impl Element for i64 {
    const KIND: Kind = Kind::Integer;
    type Key = i64;

    fn na_value() -> Self {
        0
    }

    fn less(&self, other: &Self) -> bool {
        self < other
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn key(&self) -> Self::Key {
        *self
    }

    fn format(&self, _precision: usize) -> String {
        self.to_string()
    }

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.coerce_into()
    }
}

impl Element for f64 {
    const KIND: Kind = Kind::Float;
    type Key = u64;

    fn na_value() -> Self {
        0.0
    }

    fn less(&self, other: &Self) -> bool {
        float_cmp(*self, *other) == Ordering::Less
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn key(&self) -> Self::Key {
        float_key(*self)
    }

    fn format(&self, precision: usize) -> String {
        format_float(*self, precision)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.coerce_into()
    }
}

impl Element for Complex64 {
    const KIND: Kind = Kind::Complex;
    type Key = (u64, u64);

    fn na_value() -> Self {
        Complex64::new(0.0, 0.0)
    }

    /// Lexicographic on the real, then the imaginary part
    fn less(&self, other: &Self) -> bool {
        float_cmp(self.re, other.re)
            .then(float_cmp(self.im, other.im))
            .is_lt()
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn key(&self) -> Self::Key {
        (float_key(self.re), float_key(self.im))
    }

    fn format(&self, precision: usize) -> String {
        format_complex(*self, precision)
    }

    fn to_value(&self) -> Value {
        Value::Complex(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.coerce_into()
    }
}

impl Element for String {
    const KIND: Kind = Kind::String;
    type Key = String;

    fn na_value() -> Self {
        String::new()
    }

    fn less(&self, other: &Self) -> bool {
        self < other
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn key(&self) -> Self::Key {
        self.clone()
    }

    fn format(&self, _precision: usize) -> String {
        self.clone()
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.coerce_into()
    }
}

impl Element for DateTime<Utc> {
    const KIND: Kind = Kind::Time;
    type Key = DateTime<Utc>;

    fn na_value() -> Self {
        DateTime::<Utc>::default()
    }

    fn less(&self, other: &Self) -> bool {
        self < other
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn key(&self) -> Self::Key {
        *self
    }

    fn format(&self, _precision: usize) -> String {
        format_time(self)
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.coerce_into()
    }
}

impl Element for Opaque {
    const KIND: Kind = Kind::Any;
    type Key = ();

    fn na_value() -> Self {
        Rc::new(Na)
    }

    /// Opaque values carry no native order; supply one with `Opt::Less`
    fn less(&self, _other: &Self) -> bool {
        false
    }

    fn equal(&self, other: &Self) -> bool {
        opaque_eq(self, other)
    }

    fn key(&self) -> Self::Key {}

    fn format(&self, precision: usize) -> String {
        describe_opaque(self, precision)
    }

    fn to_value(&self) -> Value {
        Value::Any(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.coerce_into()
    }
}

impl Element for Na {
    const KIND: Kind = Kind::Na;
    const ALWAYS_NA: bool = true;
    type Key = ();

    fn na_value() -> Self {
        Na
    }

    fn less(&self, _other: &Self) -> bool {
        false
    }

    fn equal(&self, _other: &Self) -> bool {
        true
    }

    fn key(&self) -> Self::Key {}

    fn format(&self, _precision: usize) -> String {
        "NA".to_string()
    }

    fn to_value(&self) -> Value {
        Value::Na
    }

    fn from_value(_value: &Value) -> Option<Self> {
        None
    }
}
