use chrono::{DateTime, Utc};
use num_complex::Complex64;

use super::element::{Na, Opaque};
use super::typed::Typed;

pub type BooleanPayload = Typed<bool>;
pub type IntegerPayload = Typed<i64>;
pub type FloatPayload = Typed<f64>;
pub type ComplexPayload = Typed<Complex64>;
pub type StringPayload = Typed<String>;
pub type TimePayload = Typed<DateTime<Utc>>;
pub type AnyPayload = Typed<Opaque>;

/// A payload that is NA everywhere
pub type NaPayload = Typed<Na>;

impl NaPayload {
    pub fn with_len(n: usize) -> Self {
        Typed::na(n)
    }
}
