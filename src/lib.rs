//! # layerscrub
//!
//! Layer-by-layer preview of slicer G-code with incremental scene updates.
//!
//! ## Architecture
//!
//! layerscrub is organized as a workspace with multiple crates:
//!
//! 1. **layerscrub-core** - Point and color primitives, bounding volume, errors
//! 2. **layerscrub-settings** - Parser and display configuration (TOML/JSON)
//! 3. **layerscrub-visualizer** - Toolpath parser, layer model, display cache,
//!    rendering scene interface, preview session
//! 4. **layerscrub** - This facade and the `layerscrub` command-line tool
//!
//! ## Data flow
//!
//! G-code text is parsed once into layers of extrusion paths. A
//! [`DisplayCache`] then keeps a [`RenderScene`] showing every layer below
//! the scrubbed one as background geometry and the scrubbed layer truncated
//! at a progress fraction, touching only what changed between scrub
//! positions.

pub use layerscrub_core::{
    constants, BoundingVolume, Color, DisplayError, Point3, SceneError, Vector3,
};

pub use layerscrub_settings::{
    Config, ConfigError, DisplaySettings, ParserSettings, SettingsError, SettingsResult,
};

pub use layerscrub_visualizer::{
    layer_prefix, layer_progress, AlignmentOffset, DisplayCache, DisplayStyles, ExtrusionPath,
    Layer, LayerPrefix, LayerRole, LoadOutcome, MemoryScene, ObjectId, ParseStats,
    ParsedToolpath, PathStyle, PreviewSession, RenderScene, SceneStats, ScrubRequest,
    ToolpathParser, UpdateSummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support, `info` when unset
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
