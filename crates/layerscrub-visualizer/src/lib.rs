//! # layerscrub Visualizer
//!
//! Slicer G-code parsing and incremental layer preview for layerscrub.
//! Includes the toolpath parser, the layer model with arc-length truncation,
//! the rendering scene interface, the display cache, and the preview session.

pub mod gcode;
pub mod toolpath;
pub mod utils;
pub mod visualizer;

pub use gcode::{
    classify_line, ExtrusionMode, GcodeLine, MotionKind, ParseStats, ParsedToolpath,
    PositioningMode, ToolpathParser,
};

pub use toolpath::{
    layer_prefix, layer_progress, polyline_length, ExtrusionPath, Layer, LayerPrefix, PrefixPiece,
};

pub use visualizer::{
    AlignmentOffset, DisplayCache, DisplayStyles, LayerRole, LoadOutcome, MemoryScene, ObjectId,
    PathStyle, PreviewSession, RenderScene, SceneObject, SceneStats, ScrubRequest,
    SuppressedRedraw, UpdateSummary,
};

pub use utils::{FileReadStats, GcodeFileReader};
