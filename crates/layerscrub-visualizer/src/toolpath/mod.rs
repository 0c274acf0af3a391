//! Reconstructed toolpath model
//!
//! Layers own their extrusion paths; both are immutable once parsing has
//! finished. The progress helpers cut a layer at a given arc length.

pub mod layer;
pub mod progress;

pub use layer::{polyline_length, ExtrusionPath, Layer};
pub use progress::{layer_prefix, layer_progress, LayerPrefix, PrefixPiece};
