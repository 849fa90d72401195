//! Element conversions
//!
//! Every element type converts into every other, but conversions are
//! fallible: a value that has no representation in the target type comes
//! back as `None` and is stored as NA by the payload performing the
//! conversion.

use std::rc::Rc;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use num_complex::Complex64;

use super::element::{format_time, Na, Opaque};
use super::value::Value;

pub trait CoercibleInto<T> {
    fn coerce_into(&self) -> Option<T>;
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_float(s: &str) -> Option<f64> {
    match s.trim() {
        "NaN" => Some(f64::NAN),
        "Inf" | "+Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        s => s.parse::<f64>().ok(),
    }
}

pub(crate) fn parse_complex(s: &str) -> Option<Complex64> {
    parse_float(s)
        .map(|re| Complex64::new(re, 0.0))
        .or_else(|| Complex64::from_str(s.trim()).ok())
}

pub(crate) fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

pub(crate) fn float_to_i64(x: f64) -> Option<i64> {
    if x.is_finite() && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x.trunc() as i64)
    } else {
        None
    }
}

fn float_to_time(x: f64) -> Option<DateTime<Utc>> {
    let secs = float_to_i64(x.floor())?;
    let nanos = (((x - x.floor()) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(secs, nanos).single()
}

fn time_to_float(x: &DateTime<Utc>) -> f64 {
    x.timestamp() as f64 + x.timestamp_subsec_nanos() as f64 / 1e9
}

/// Shortest text of a float that still reads back as the same number
pub(crate) fn shortest_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        x.to_string()
    }
}

pub(crate) fn shortest_complex(x: &Complex64) -> String {
    format!("{}{}{}i", shortest_float(x.re), if x.im < 0.0 { "" } else { "+" }, shortest_float(x.im))
}

macro_rules! identity {
    ($($t:ty),*) => {
        $(
            impl CoercibleInto<$t> for $t {
                #[inline]
                fn coerce_into(&self) -> Option<$t> {
                    Some(self.clone())
                }
            }
        )*
    };
}

macro_rules! into_opaque {
    ($($t:ty),*) => {
        $(
            impl CoercibleInto<Opaque> for $t {
                #[inline]
                fn coerce_into(&self) -> Option<Opaque> {
                    Some(Rc::new(self.clone()))
                }
            }
        )*
    };
}

macro_rules! never {
    ($from:ty => $($t:ty),*) => {
        $(
            impl CoercibleInto<$t> for $from {
                #[inline]
                fn coerce_into(&self) -> Option<$t> {
                    None
                }
            }
        )*
    };
}

macro_rules! convert {
    ($from:ty => $to:ty, |$x:ident| $body:expr) => {
        impl CoercibleInto<$to> for $from {
            #[inline]
            fn coerce_into(&self) -> Option<$to> {
                let $x = self;
                $body
            }
        }
    };
}

identity!(bool, i64, f64, Complex64, String, DateTime<Utc>, Value);
into_opaque!(bool, i64, f64, Complex64, String, DateTime<Utc>);
never!(Na => bool, i64, f64, Complex64, String, DateTime<Utc>, Opaque);

convert!(bool => i64, |x| Some(*x as i64));
convert!(bool => f64, |x| Some(*x as i64 as f64));
convert!(bool => Complex64, |x| Some(Complex64::new(*x as i64 as f64, 0.0)));
convert!(bool => String, |x| Some(x.to_string()));
never!(bool => DateTime<Utc>);

convert!(i64 => bool, |x| Some(*x != 0));
convert!(i64 => f64, |x| Some(*x as f64));
convert!(i64 => Complex64, |x| Some(Complex64::new(*x as f64, 0.0)));
convert!(i64 => String, |x| Some(x.to_string()));
convert!(i64 => DateTime<Utc>, |x| Utc.timestamp_opt(*x, 0).single());

convert!(f64 => bool, |x| if x.is_nan() { None } else { Some(*x != 0.0) });
convert!(f64 => i64, |x| float_to_i64(*x));
convert!(f64 => Complex64, |x| Some(Complex64::new(*x, 0.0)));
convert!(f64 => String, |x| Some(shortest_float(*x)));
convert!(f64 => DateTime<Utc>, |x| float_to_time(*x));

convert!(Complex64 => bool, |x| if x.re.is_nan() || x.im.is_nan() {
    None
} else {
    Some(x.re != 0.0 || x.im != 0.0)
});
convert!(Complex64 => i64, |x| float_to_i64(x.re));
convert!(Complex64 => f64, |x| Some(x.re));
convert!(Complex64 => String, |x| Some(shortest_complex(x)));
never!(Complex64 => DateTime<Utc>);

convert!(String => bool, |x| parse_bool(x));
convert!(String => i64, |x| x.trim().parse::<i64>().ok());
convert!(String => f64, |x| parse_float(x));
convert!(String => Complex64, |x| parse_complex(x));
convert!(String => DateTime<Utc>, |x| parse_time(x));

never!(DateTime<Utc> => bool, Complex64);
convert!(DateTime<Utc> => i64, |x| Some(x.timestamp()));
convert!(DateTime<Utc> => f64, |x| Some(time_to_float(x)));
convert!(DateTime<Utc> => String, |x| Some(format_time(x)));

/// Unwrap an opaque value by trying the known primitive types in turn
fn opaque_into<T: Clone + 'static>(x: &Opaque) -> Option<T>
where
    bool: CoercibleInto<T>,
    i64: CoercibleInto<T>,
    f64: CoercibleInto<T>,
    Complex64: CoercibleInto<T>,
    String: CoercibleInto<T>,
    DateTime<Utc>: CoercibleInto<T>,
    Value: CoercibleInto<T>,
{
    if let Some(v) = x.downcast_ref::<T>() {
        return Some(v.clone());
    }

    if let Some(v) = x.downcast_ref::<Value>() {
        v.coerce_into()
    } else if let Some(v) = x.downcast_ref::<bool>() {
        v.coerce_into()
    } else if let Some(v) = x.downcast_ref::<i64>() {
        v.coerce_into()
    } else if let Some(v) = x.downcast_ref::<i32>() {
        (*v as i64).coerce_into()
    } else if let Some(v) = x.downcast_ref::<f64>() {
        v.coerce_into()
    } else if let Some(v) = x.downcast_ref::<Complex64>() {
        v.coerce_into()
    } else if let Some(v) = x.downcast_ref::<String>() {
        v.coerce_into()
    } else if let Some(v) = x.downcast_ref::<&'static str>() {
        v.to_string().coerce_into()
    } else if let Some(v) = x.downcast_ref::<DateTime<Utc>>() {
        v.coerce_into()
    } else {
        None
    }
}

convert!(Opaque => bool, |x| opaque_into(x));
convert!(Opaque => i64, |x| opaque_into(x));
convert!(Opaque => f64, |x| opaque_into(x));
convert!(Opaque => Complex64, |x| opaque_into(x));
convert!(Opaque => String, |x| opaque_into(x));
convert!(Opaque => DateTime<Utc>, |x| opaque_into(x));
convert!(Opaque => Opaque, |x| Some(x.clone()));

convert!(Opaque => Value, |x| {
    if let Some(v) = x.downcast_ref::<Value>() {
        Some(v.clone())
    } else if let Some(v) = x.downcast_ref::<bool>() {
        Some(Value::Boolean(*v))
    } else if let Some(v) = x.downcast_ref::<i64>() {
        Some(Value::Integer(*v))
    } else if let Some(v) = x.downcast_ref::<i32>() {
        Some(Value::Integer(*v as i64))
    } else if let Some(v) = x.downcast_ref::<f64>() {
        Some(Value::Float(*v))
    } else if let Some(v) = x.downcast_ref::<Complex64>() {
        Some(Value::Complex(*v))
    } else if let Some(v) = x.downcast_ref::<String>() {
        Some(Value::String(v.clone()))
    } else if let Some(v) = x.downcast_ref::<&'static str>() {
        Some(Value::String(v.to_string()))
    } else if let Some(v) = x.downcast_ref::<DateTime<Utc>>() {
        Some(Value::Time(*v))
    } else if x.downcast_ref::<Na>().is_some() {
        Some(Value::Na)
    } else {
        None
    }
});

macro_rules! value_into {
    ($($t:ty),*) => {
        $(
            impl CoercibleInto<$t> for Value {
                fn coerce_into(&self) -> Option<$t> {
                    match self {
                        Value::Na => None,
                        Value::Boolean(x) => x.coerce_into(),
                        Value::Integer(x) => x.coerce_into(),
                        Value::Float(x) => x.coerce_into(),
                        Value::Complex(x) => x.coerce_into(),
                        Value::String(x) => x.coerce_into(),
                        Value::Time(x) => x.coerce_into(),
                        Value::Any(x) => x.coerce_into(),
                    }
                }
            }
        )*
    };
}

value_into!(bool, i64, f64, Complex64, String, DateTime<Utc>, Opaque);

#[cfg(test)]
mod tests {
    use super::*;

    fn into<T>(x: impl CoercibleInto<T>) -> Option<T> {
        x.coerce_into()
    }

    #[test]
    fn booleans() {
        assert_eq!(into::<i64>(true), Some(1));
        assert_eq!(into::<f64>(false), Some(0.0));
        assert_eq!(into::<String>(true), Some("true".to_string()));
        assert_eq!(into::<DateTime<Utc>>(true), None);
    }

    #[test]
    fn floats() {
        assert_eq!(into::<i64>(3.9_f64), Some(3));
        assert_eq!(into::<i64>(-3.9_f64), Some(-3));
        assert_eq!(into::<i64>(f64::NAN), None);
        assert_eq!(into::<i64>(f64::INFINITY), None);
        assert_eq!(into::<bool>(f64::NAN), None);
        assert_eq!(into::<bool>(0.5_f64), Some(true));
        assert_eq!(into::<String>(1.5_f64), Some("1.5".to_string()));
        assert_eq!(into::<String>(f64::NEG_INFINITY), Some("-Inf".to_string()));
    }

    #[test]
    fn strings() {
        assert_eq!(into::<bool>("TRUE".to_string()), Some(true));
        assert_eq!(into::<bool>("maybe".to_string()), None);
        assert_eq!(into::<i64>(" 42 ".to_string()), Some(42));
        assert_eq!(into::<i64>("4.2".to_string()), None);
        assert_eq!(into::<f64>("+Inf".to_string()), Some(f64::INFINITY));
        assert!(into::<f64>("NaN".to_string()).is_some_and(|x| x.is_nan()));
        assert_eq!(
            into::<Complex64>("1+2i".to_string()),
            Some(Complex64::new(1.0, 2.0))
        );
        assert_eq!(into::<Complex64>("7".to_string()), Some(Complex64::new(7.0, 0.0)));
    }

    #[test]
    fn times() {
        let t = parse_time("2021-03-04T05:06:07Z").unwrap();
        assert_eq!(into::<i64>(t), Some(1_614_834_367));
        assert_eq!(into::<String>(t), Some("2021-03-04T05:06:07Z".to_string()));
        assert_eq!(into::<DateTime<Utc>>(1_614_834_367_i64), Some(t));
        assert_eq!(into::<DateTime<Utc>>(1_614_834_367.5_f64).map(|t| t.timestamp_subsec_millis()), Some(500));
    }

    #[test]
    fn complexes() {
        let c = Complex64::new(2.5, -1.0);
        assert_eq!(into::<f64>(c), Some(2.5));
        assert_eq!(into::<i64>(c), Some(2));
        assert_eq!(into::<String>(c), Some("2.5-1i".to_string()));
        assert_eq!(into::<bool>(Complex64::new(0.0, 0.0)), Some(false));
    }

    #[test]
    fn opaques_unwrap_known_primitives() {
        let x: Opaque = Rc::new(12_i64);
        assert_eq!(into::<f64>(x.clone()), Some(12.0));
        assert_eq!(into::<String>(x), Some("12".to_string()));

        let s: Opaque = Rc::new("3");
        assert_eq!(into::<i64>(s), Some(3));

        struct Custom;
        let c: Opaque = Rc::new(Custom);
        assert_eq!(into::<i64>(c.clone()), None);
        assert!(into::<Value>(c).is_none());
    }

    #[test]
    fn values() {
        assert_eq!(into::<i64>(Value::Float(2.0)), Some(2));
        assert_eq!(into::<i64>(Value::Na), None);
        assert_eq!(into::<String>(Value::Boolean(false)), Some("false".to_string()));
    }

    #[test]
    fn na_converts_to_nothing() {
        assert_eq!(into::<i64>(Na), None);
        assert_eq!(into::<String>(Na), None);
    }
}
