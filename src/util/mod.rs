//! Utility types and functions for raypack.
//!
//! This module contains fundamental pieces used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`fixed`] - Q15.16 fixed-point encoding of floats
//! - [`math`] - glam re-exports and the axis-aligned bounding box

mod error;
pub mod fixed;
pub mod math;

pub use error::{Error, Result};
