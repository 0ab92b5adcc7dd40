//! sf-core: stable foundation for sailflow.
//!
//! Contains:
//! - error (shared error types)
//! - numeric (Real + tolerances + float helpers)
//! - vector (ship-fixed spatial vectors)
//! - interpolation (piecewise-linear tables with boundary hold)
//! - units (uom SI types + constructors)
//! - tagged (the three-shape tagged-union deserializer used on the wire)

pub mod error;
pub mod interpolation;
pub mod numeric;
pub mod tagged;
pub mod units;
pub mod vector;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use interpolation::{is_strictly_increasing, linear_interpolation, linspace};
pub use numeric::*;
pub use tagged::{TaggedUnion, deserialize_tagged, serialize_tagged};
pub use vector::SpatialVector;
