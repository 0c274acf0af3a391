//! Arc-length truncation of a layer by progress.

use super::layer::{ExtrusionPath, Layer};
use layerscrub_core::Point3;

/// One piece of a truncated layer
#[derive(Debug, Clone, PartialEq)]
pub enum PrefixPiece<'a> {
    /// A path emitted in full
    Whole(&'a ExtrusionPath),
    /// The leading part of the path where progress ran out
    Partial(Vec<Point3>),
}

impl PrefixPiece<'_> {
    pub fn points(&self) -> &[Point3] {
        match self {
            PrefixPiece::Whole(path) => path.points(),
            PrefixPiece::Partial(points) => points,
        }
    }
}

/// The part of a layer deposited after a given length of extrusion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerPrefix<'a> {
    pub pieces: Vec<PrefixPiece<'a>>,
    /// Emitted arc length in millimeters
    pub length: f64,
    /// Nozzle position at the end of the prefix
    pub end: Option<Point3>,
}

impl LayerPrefix<'_> {
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

/// Walk `layer` in deposition order and keep the first `target_length`
/// millimeters of extrusion.
///
/// Paths that fit in the remaining budget are kept whole. The first path
/// that does not fit is cut at the exact remaining distance and the walk
/// stops. A non-positive target yields an empty prefix.
pub fn layer_prefix(layer: &Layer, target_length: f64) -> LayerPrefix<'_> {
    if !(target_length > 0.0) {
        return LayerPrefix::default();
    }
    walk_prefix(layer, target_length)
}

/// The part of `layer` deposited at `progress` (0.0 to 1.0) of its total
/// extrusion length.
///
/// Any positive progress is measured against the total length, so at 1.0
/// every path is emitted whole, including zero-length ones on a layer whose
/// total length is zero. Progress 0.0 yields an empty prefix.
pub fn layer_progress(layer: &Layer, progress: f64) -> LayerPrefix<'_> {
    if !(progress > 0.0) {
        return LayerPrefix::default();
    }
    walk_prefix(layer, layer.total_length() * progress)
}

fn walk_prefix(layer: &Layer, target_length: f64) -> LayerPrefix<'_> {
    let mut prefix = LayerPrefix::default();

    for path in layer.paths() {
        if prefix.length + path.length() <= target_length {
            prefix.length += path.length();
            prefix.end = Some(path.end());
            prefix.pieces.push(PrefixPiece::Whole(path));
            continue;
        }

        let remaining = target_length - prefix.length;
        if remaining > 0.0 {
            let partial = path.prefix(remaining);
            if partial.len() > 1 {
                prefix.length += remaining;
                prefix.end = partial.last().copied();
                prefix.pieces.push(PrefixPiece::Partial(partial));
            }
        }
        break;
    }

    prefix
}
