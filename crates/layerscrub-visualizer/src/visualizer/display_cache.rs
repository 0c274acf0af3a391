//! Incremental display cache
//!
//! Keeps a rendering scene in sync with a `(layer, progress)` scrub
//! position while touching as few scene objects as possible:
//!
//! - **Ghost layers** `0..=high_water_mark` are drawn in full in the
//!   background style. Moving the target layer by `n` creates or deletes
//!   exactly `n` ghost layers.
//! - **Active layer** is the target layer truncated at `progress` of its
//!   extruded length, plus a marker at the nozzle position. It is rebuilt
//!   on every update.
//!
//! Scene failures never abort an update or a reset. They are logged, counted
//! in the returned summary, and the cache releases its handles regardless.

use std::collections::BTreeMap;
use std::mem;

use layerscrub_core::{DisplayError, Point3, SceneError};
use layerscrub_settings::DisplaySettings;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::alignment::AlignmentOffset;
use super::scene::{DisplayStyles, RenderScene, SuppressedRedraw};
use crate::toolpath::{layer_progress, Layer};

/// What an update changed
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpdateSummary {
    pub target_layer: usize,
    pub progress: f64,
    /// Ghost layers created by this update, ascending
    pub ghost_layers_added: Vec<usize>,
    /// Ghost layers deleted by this update, descending
    pub ghost_layers_removed: Vec<usize>,
    /// Ghost path objects created
    pub ghost_paths_added: usize,
    /// Active path objects now displayed
    pub active_paths: usize,
    /// Extruded length shown on the active layer (mm)
    pub active_length: f64,
    /// Marker position after alignment, if any geometry was emitted
    pub marker: Option<Point3>,
    /// Scene calls that failed and were skipped
    pub scene_failures: usize,
}

/// Cached scene objects for one preview
///
/// `H` is the scene's handle type. The cache exclusively owns every handle
/// it creates; handles are released from its bookkeeping as soon as their
/// deletion has been attempted.
#[derive(Debug)]
pub struct DisplayCache<H> {
    styles: DisplayStyles,
    alignment: AlignmentOffset,
    ghosts: BTreeMap<usize, Vec<H>>,
    high_water_mark: Option<usize>,
    active: Vec<H>,
    marker: Option<(H, Point3)>,
}

impl<H> Default for DisplayCache<H> {
    fn default() -> Self {
        Self::with_styles(DisplayStyles::default())
    }
}

impl<H> DisplayCache<H> {
    pub fn new(settings: &DisplaySettings) -> Self {
        Self::with_styles(DisplayStyles::from(settings))
    }

    pub fn with_styles(styles: DisplayStyles) -> Self {
        Self {
            styles,
            alignment: AlignmentOffset::ZERO,
            ghosts: BTreeMap::new(),
            high_water_mark: None,
            active: Vec::new(),
            marker: None,
        }
    }

    pub fn styles(&self) -> &DisplayStyles {
        &self.styles
    }

    pub fn alignment(&self) -> AlignmentOffset {
        self.alignment
    }

    /// Record the offset applied to every point emitted from now on.
    ///
    /// Already-materialized geometry is not moved; call [`reset`] first when
    /// changing the offset of a populated cache.
    ///
    /// [`reset`]: DisplayCache::reset
    pub fn set_alignment(&mut self, offset: AlignmentOffset) {
        if !self.is_empty() && offset != self.alignment {
            warn!(
                "Alignment changed to {} while {} ghost layer(s) are displayed; existing geometry keeps the old offset",
                offset.vector(),
                self.ghosts.len()
            );
        }
        self.alignment = offset;
    }

    /// Highest materialized ghost layer, `None` when there are no ghosts
    pub fn high_water_mark(&self) -> Option<usize> {
        self.high_water_mark
    }

    pub fn ghost_layer_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.ghosts.keys().copied()
    }

    pub fn ghost_handles(&self, layer_index: usize) -> Option<&[H]> {
        self.ghosts.get(&layer_index).map(Vec::as_slice)
    }

    pub fn active_handles(&self) -> &[H] {
        &self.active
    }

    pub fn marker_handle(&self) -> Option<&H> {
        self.marker.as_ref().map(|(handle, _)| handle)
    }

    /// Marker position after alignment
    pub fn marker_position(&self) -> Option<Point3> {
        self.marker.as_ref().map(|(_, point)| *point)
    }

    /// True when no scene object is owned
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty() && self.active.is_empty() && self.marker.is_none()
    }

    /// Ghost entries are exactly `0..=high_water_mark`
    pub fn ghosts_contiguous(&self) -> bool {
        match self.high_water_mark {
            None => self.ghosts.is_empty(),
            Some(hwm) => {
                self.ghosts.len() == hwm + 1 && self.ghosts.keys().copied().eq(0..=hwm)
            }
        }
    }
}

impl<H: Clone + std::fmt::Debug> DisplayCache<H> {
    /// Delete every owned scene object and forget them.
    ///
    /// Safe on an empty cache. Returns the number of scene failures that
    /// were swallowed.
    pub fn reset<S>(&mut self, scene: &mut S) -> usize
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        let mut handles: Vec<H> = mem::take(&mut self.ghosts)
            .into_values()
            .flatten()
            .collect();
        handles.append(&mut self.active);
        if let Some((marker, _)) = self.marker.take() {
            handles.push(marker);
        }
        self.high_water_mark = None;

        let mut failures = 0;
        let mut scene = SuppressedRedraw::new(scene);
        if !handles.is_empty() {
            debug!("Resetting display cache: deleting {} object(s)", handles.len());
            if let Err(err) = scene.delete_objects(&handles) {
                note_failure(&mut failures, "reset", &err);
            }
        }
        failures
    }

    /// Bring the scene to `layers[target_layer]` drawn up to `progress`.
    ///
    /// Ghost layers are created or deleted only for the difference from the
    /// previous target; the active layer is rebuilt.
    ///
    /// # Errors
    /// Returns [`DisplayError::InvalidArgument`] when `target_layer` is not
    /// an index into `layers` or `progress` is outside `0.0..=1.0`. The
    /// scene is not touched in that case.
    pub fn update<S>(
        &mut self,
        scene: &mut S,
        layers: &[Layer],
        target_layer: usize,
        progress: f64,
    ) -> Result<UpdateSummary, DisplayError>
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        if target_layer >= layers.len() {
            return Err(DisplayError::invalid_argument(
                "target_layer",
                format!("{} is out of range for {} layer(s)", target_layer, layers.len()),
            ));
        }
        if !(0.0..=1.0).contains(&progress) {
            return Err(DisplayError::invalid_argument(
                "progress",
                format!("must be within 0.0..=1.0, got {}", progress),
            ));
        }

        let mut summary = UpdateSummary {
            target_layer,
            progress,
            ..UpdateSummary::default()
        };
        let mut scene = SuppressedRedraw::new(scene);

        self.reconcile_ghosts(&mut *scene, layers, target_layer.checked_sub(1), &mut summary);
        self.rebuild_active(&mut *scene, &layers[target_layer], progress, &mut summary);

        debug_assert!(self.ghosts_contiguous());
        debug!(
            "Display update: layer {} at {:.1}%, ghosts +{} -{} (hwm {:?}), {} active path(s) {:.2}mm, {} scene failure(s)",
            target_layer,
            progress * 100.0,
            summary.ghost_layers_added.len(),
            summary.ghost_layers_removed.len(),
            self.high_water_mark,
            summary.active_paths,
            summary.active_length,
            summary.scene_failures
        );
        Ok(summary)
    }

    fn reconcile_ghosts<S>(
        &mut self,
        scene: &mut S,
        layers: &[Layer],
        needed: Option<usize>,
        summary: &mut UpdateSummary,
    ) where
        S: RenderScene<Handle = H> + ?Sized,
    {
        if needed > self.high_water_mark {
            if let Some(last) = needed {
                let first = self.high_water_mark.map_or(0, |hwm| hwm + 1);
                for index in first..=last {
                    if !self.ghosts.contains_key(&index) {
                        self.materialize_ghost(scene, index, &layers[index], summary);
                    }
                }
            }
        } else if needed < self.high_water_mark {
            if let Some(hwm) = self.high_water_mark {
                let first = needed.map_or(0, |n| n + 1);
                for index in (first..=hwm).rev() {
                    self.release_ghost(scene, index, summary);
                }
            }
        }
        self.high_water_mark = needed;
    }

    fn materialize_ghost<S>(
        &mut self,
        scene: &mut S,
        index: usize,
        layer: &Layer,
        summary: &mut UpdateSummary,
    ) where
        S: RenderScene<Handle = H> + ?Sized,
    {
        let mut handles = Vec::with_capacity(layer.path_count());
        for path in layer.paths() {
            let points = self.alignment.apply_all(path.points());
            match scene.add_path(&points, &self.styles.ghost) {
                Ok(handle) => handles.push(handle),
                Err(err) => note_failure(&mut summary.scene_failures, "ghost path", &err),
            }
        }
        trace!("Ghost layer {} materialized: {} path(s)", index, handles.len());
        summary.ghost_paths_added += handles.len();
        summary.ghost_layers_added.push(index);
        self.ghosts.insert(index, handles);
    }

    fn release_ghost<S>(&mut self, scene: &mut S, index: usize, summary: &mut UpdateSummary)
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        let Some(handles) = self.ghosts.remove(&index) else {
            return;
        };
        trace!("Ghost layer {} released: {} path(s)", index, handles.len());
        summary.ghost_layers_removed.push(index);
        if handles.is_empty() {
            return;
        }
        if let Err(err) = scene.delete_objects(&handles) {
            note_failure(&mut summary.scene_failures, "ghost layer delete", &err);
        }
    }

    fn rebuild_active<S>(
        &mut self,
        scene: &mut S,
        layer: &Layer,
        progress: f64,
        summary: &mut UpdateSummary,
    ) where
        S: RenderScene<Handle = H> + ?Sized,
    {
        let mut stale = mem::take(&mut self.active);
        if let Some((marker, _)) = self.marker.take() {
            stale.push(marker);
        }
        if !stale.is_empty() {
            if let Err(err) = scene.delete_objects(&stale) {
                note_failure(&mut summary.scene_failures, "active delete", &err);
            }
        }

        let prefix = layer_progress(layer, progress);
        for piece in &prefix.pieces {
            let points = self.alignment.apply_all(piece.points());
            match scene.add_path(&points, &self.styles.active) {
                Ok(handle) => self.active.push(handle),
                Err(err) => note_failure(&mut summary.scene_failures, "active path", &err),
            }
        }
        summary.active_paths = self.active.len();
        summary.active_length = prefix.length;

        if let Some(end) = prefix.end {
            let point = self.alignment.apply(end);
            match scene.add_marker(point, self.styles.marker) {
                Ok(handle) => {
                    self.marker = Some((handle, point));
                    summary.marker = Some(point);
                }
                Err(err) => note_failure(&mut summary.scene_failures, "marker", &err),
            }
        }
    }
}

fn note_failure(failures: &mut usize, operation: &str, err: &SceneError) {
    warn!("Scene {} failed, continuing: {}", operation, err);
    *failures += 1;
}
