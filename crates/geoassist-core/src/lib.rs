//! # GeoAssist Core
//!
//! Core types shared by the GeoAssist durability layer: the error type,
//! the closed set of index mutations, the objects a spatial index stores
//! and the trait a spatial index implements to be recoverable from the
//! write-ahead log.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod index;
pub mod object;
pub mod operation;

pub use error::{Error, Result};
pub use geometry::{Point, PointBuilder};
pub use index::SpatialIndex;
pub use object::{IndexObject, IndexObjectBuilder};
pub use operation::Operation;
