//! # rvector
//!
//! R-style typed vector payloads. A payload is a dense array of values paired
//! with a parallel missing-value (NA) mask. Every element type shares one
//! generic engine for gathering, recycling, callbacks, ordering and grouping,
//! and the type-erased [`Payload`] dispatches that contract to the concrete
//! variant.
//!
//! ```
//! use rvector::payload::{Convertible, IntegerPayload, Payload, Sequence, Summable};
//!
//! let x = IntegerPayload::from(vec![Some(-20), Some(10), None, Some(27)]);
//! assert!(x.sum().value(1).is_na());
//!
//! let y = Payload::from(IntegerPayload::from(vec![1, 2, 3]));
//! assert_eq!(y.adjust(5).integers().0, vec![1, 2, 3, 1, 2]);
//! ```

pub mod error;
pub mod payload;
pub mod utils;

pub use error::Error;
pub use payload::Payload;
