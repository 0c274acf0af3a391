//! # layerscrub Core
//!
//! Core types shared by the layerscrub crates.
//! Provides the point and color primitives, the axis-aligned bounding
//! volume accumulated while parsing, numeric constants, and error types.

pub mod bounds;
pub mod constants;
pub mod error;
pub mod types;

pub use bounds::BoundingVolume;
pub use error::{DisplayError, SceneError};
pub use types::{Color, Point3, Vector3};
