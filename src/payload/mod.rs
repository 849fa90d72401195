mod core;
pub use self::core::*;

mod element;
pub use element::*;

mod coercion;
pub use coercion::CoercibleInto;

mod value;
pub use value::*;

mod options;
pub use options::*;

mod nable;
pub use nable::*;

mod mapper;
pub use mapper::*;

mod arrange;
pub use arrange::*;

mod group;
pub use group::*;

pub mod engine;

mod typed;
pub use typed::*;

mod types;
pub use types::*;

mod factor;
pub use factor::*;

mod traits;
pub use traits::*;

mod ops;
pub use ops::Numeric;

mod stats;
pub use stats::*;
