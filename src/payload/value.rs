use std::fmt::Display;

use chrono::{DateTime, Utc};
use num_complex::Complex64;

use super::coercion::{shortest_complex, shortest_float};
use super::element::{describe_opaque, format_time, opaque_eq, Kind, Opaque};
use super::options::DEFAULT_PRECISION;

/// A single, dynamically typed element
///
/// Used as the needle of searches and comparisons, and to hand out single
/// elements or group representatives without knowing the payload's type.
///
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Na,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Complex(Complex64),
    String(String),
    Time(DateTime<Utc>),
    Any(Opaque),
}

impl Value {
    pub fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Na => Kind::Na,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Complex(_) => Kind::Complex,
            Value::String(_) => Kind::String,
            Value::Time(_) => Kind::Time,
            Value::Any(_) => Kind::Any,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Na, Na) => true,
            (Boolean(l), Boolean(r)) => l == r,
            (Integer(l), Integer(r)) => l == r,
            (Float(l), Float(r)) => l == r,
            (Complex(l), Complex(r)) => l == r,
            (String(l), String(r)) => l == r,
            (Time(l), Time(r)) => l == r,
            (Any(l), Any(r)) => opaque_eq(l, r),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Na => write!(f, "NA"),
            Value::Boolean(x) => write!(f, "{x}"),
            Value::Integer(x) => write!(f, "{x}"),
            Value::Float(x) => write!(f, "{}", shortest_float(*x)),
            Value::Complex(x) => write!(f, "{}", shortest_complex(x)),
            Value::String(x) => write!(f, "{x}"),
            Value::Time(x) => write!(f, "{}", format_time(x)),
            Value::Any(x) => write!(f, "{}", describe_opaque(x, DEFAULT_PRECISION)),
        }
    }
}

impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Value::Boolean(x)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Integer(x)
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Integer(x as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Complex64> for Value {
    fn from(x: Complex64) -> Self {
        Value::Complex(x)
    }
}

impl From<String> for Value {
    fn from(x: String) -> Self {
        Value::String(x)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::String(x.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(x: DateTime<Utc>) -> Self {
        Value::Time(x)
    }
}

impl From<Opaque> for Value {
    fn from(x: Opaque) -> Self {
        Value::Any(x)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(x: Option<T>) -> Self {
        match x {
            Some(x) => Value::from(x),
            None => Value::Na,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn display() {
        assert_eq!(Value::Na.to_string(), "NA");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "+Inf");
        assert_eq!(Value::from(Complex64::new(1.0, -1.0)).to_string(), "1-1i");
        assert_eq!(Value::from("a").to_string(), "a");
        let any: Opaque = Rc::new(5_i64);
        assert_eq!(Value::from(any).to_string(), "5");
    }

    #[test]
    fn options_map_to_na() {
        assert_eq!(Value::from(None::<i64>), Value::Na);
        assert_eq!(Value::from(Some(3_i64)), Value::Integer(3));
        assert!(Value::from(None::<bool>).is_na());
    }

    #[test]
    fn equality() {
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(1_i64), Value::from(1.0));
        assert_eq!(Value::from("x").kind(), Kind::String);
    }
}
