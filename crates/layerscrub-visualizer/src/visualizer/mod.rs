//! Layer preview
//!
//! This module provides:
//! - Alignment of the toolpath with the source model
//! - The rendering scene interface and a redraw-suppression guard
//! - The incremental display cache (ghost and active layers)
//! - An in-memory scene
//! - The preview session used by front ends

pub mod alignment;
pub mod display_cache;
pub mod memory_scene;
pub mod scene;
pub mod session;

pub use alignment::AlignmentOffset;
pub use display_cache::{DisplayCache, UpdateSummary};
pub use memory_scene::{MemoryScene, ObjectId, SceneObject, SceneStats};
pub use scene::{DisplayStyles, LayerRole, PathStyle, RenderScene, SuppressedRedraw};
pub use session::{LoadOutcome, PreviewSession, ScrubRequest};
