//! Rendering scene interface
//!
//! The display cache never draws anything itself. It creates and deletes
//! objects through [`RenderScene`], which a host application implements on
//! top of its own document or viewport.

use std::fmt;
use std::ops::{Deref, DerefMut};

use layerscrub_core::{Color, Point3, SceneError};
use layerscrub_settings::DisplaySettings;
use serde::Serialize;

/// Which part of the preview a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    /// Already-printed background layer
    Ghost,
    /// The layer being scrubbed
    Active,
}

/// Visual style of a path object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathStyle {
    pub role: LayerRole,
    pub color: Color,
    /// Locked objects cannot be selected or moved in the host scene
    pub locked: bool,
}

/// Styles for every object kind the cache emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStyles {
    pub ghost: PathStyle,
    pub active: PathStyle,
    pub marker: Color,
}

impl From<&DisplaySettings> for DisplayStyles {
    fn from(settings: &DisplaySettings) -> Self {
        Self {
            ghost: PathStyle {
                role: LayerRole::Ghost,
                color: settings.ghost_color,
                locked: settings.lock_ghosts,
            },
            active: PathStyle {
                role: LayerRole::Active,
                color: settings.active_color,
                locked: false,
            },
            marker: settings.marker_color,
        }
    }
}

impl Default for DisplayStyles {
    fn default() -> Self {
        Self::from(&DisplaySettings::default())
    }
}

/// Scene capabilities required by the display cache
///
/// Calls are synchronous. Redraw suppression nests: every
/// `begin_suppressed_redraw` is matched by exactly one
/// `end_suppressed_redraw`.
pub trait RenderScene {
    /// Opaque reference to an object created by this scene
    type Handle: Clone + fmt::Debug;

    /// Create a polyline object
    fn add_path(&mut self, points: &[Point3], style: &PathStyle)
        -> Result<Self::Handle, SceneError>;

    /// Create a point object
    fn add_marker(&mut self, point: Point3, color: Color) -> Result<Self::Handle, SceneError>;

    /// Delete a batch of objects
    ///
    /// Implementations should delete every handle they recognize even when
    /// some are unknown, then report the failure.
    fn delete_objects(&mut self, handles: &[Self::Handle]) -> Result<(), SceneError>;

    fn begin_suppressed_redraw(&mut self);

    fn end_suppressed_redraw(&mut self);
}

/// Scope guard that suppresses redraws until dropped
///
/// Dereferences to the scene so all mutations inside the scope go through
/// the guard. Redraw is resumed on every exit path, including unwinding.
pub struct SuppressedRedraw<'a, S: RenderScene + ?Sized> {
    scene: &'a mut S,
}

impl<'a, S: RenderScene + ?Sized> SuppressedRedraw<'a, S> {
    pub fn new(scene: &'a mut S) -> Self {
        scene.begin_suppressed_redraw();
        Self { scene }
    }
}

impl<S: RenderScene + ?Sized> Deref for SuppressedRedraw<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.scene
    }
}

impl<S: RenderScene + ?Sized> DerefMut for SuppressedRedraw<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.scene
    }
}

impl<S: RenderScene + ?Sized> Drop for SuppressedRedraw<'_, S> {
    fn drop(&mut self) {
        self.scene.end_suppressed_redraw();
    }
}
