//! Shared numeric constants.

/// Minimum Z difference (mm) that starts a new layer.
pub const Z_EPSILON_MM: f64 = 0.001;

/// Lines shorter than this many bytes carry no interpretable move.
pub const MIN_LINE_LENGTH: usize = 3;

/// Resolution of the intra-layer progress slider.
pub const PROGRESS_SLIDER_STEPS: u32 = 1000;

/// Tolerance used when comparing accumulated path lengths.
pub const LENGTH_TOLERANCE_MM: f64 = 1e-9;
