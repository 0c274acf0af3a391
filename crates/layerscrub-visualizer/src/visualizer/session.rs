//! Preview session
//!
//! Glues a parsed toolpath, its alignment against the source model, and a
//! display cache into the workflow a slider-driven preview needs: load a
//! slicing run, scrub, coalesce rapid slider changes, close.

use layerscrub_core::{BoundingVolume, DisplayError};
use layerscrub_settings::DisplaySettings;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::alignment::AlignmentOffset;
use super::display_cache::{DisplayCache, UpdateSummary};
use super::scene::RenderScene;
use crate::gcode::ParsedToolpath;
use crate::toolpath::Layer;

/// Result of loading a slicing run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Nothing was extruded; there is nothing to display
    Empty,
    /// Layers are loaded and the first one is displayed
    Loaded {
        layers: usize,
        summary: UpdateSummary,
    },
}

/// A scrub position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrubRequest {
    pub layer: usize,
    pub progress: f64,
}

/// One preview of one slicing run at a time
#[derive(Debug)]
pub struct PreviewSession<H> {
    cache: DisplayCache<H>,
    layers: Vec<Layer>,
    bounds: BoundingVolume,
    progress_steps: u32,
    pending: Option<ScrubRequest>,
    position: Option<ScrubRequest>,
}

impl<H> Default for PreviewSession<H> {
    fn default() -> Self {
        Self::new(&DisplaySettings::default())
    }
}

impl<H> PreviewSession<H> {
    pub fn new(settings: &DisplaySettings) -> Self {
        Self {
            cache: DisplayCache::new(settings),
            layers: Vec::new(),
            bounds: BoundingVolume::empty(),
            progress_steps: settings.progress_steps,
            pending: None,
            position: None,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Bounds of the loaded toolpath before alignment
    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    pub fn alignment(&self) -> AlignmentOffset {
        self.cache.alignment()
    }

    pub fn cache(&self) -> &DisplayCache<H> {
        &self.cache
    }

    /// Last applied scrub position
    pub fn position(&self) -> Option<ScrubRequest> {
        self.position
    }

    pub fn pending(&self) -> Option<ScrubRequest> {
        self.pending
    }

    /// Queue a scrub position, superseding any unflushed one
    pub fn request(&mut self, layer: usize, progress: f64) {
        if let Some(previous) = self.pending.replace(ScrubRequest { layer, progress }) {
            debug!(
                "Scrub request layer {} at {:.3} superseded",
                previous.layer, previous.progress
            );
        }
    }

    /// Queue a scrub position from an integer slider value
    pub fn slider_request(&mut self, layer: usize, slider_value: u32) {
        self.request(layer, Self::progress_from_slider(slider_value, self.progress_steps));
    }

    /// Map a slider position in `0..=steps` to a fraction.
    ///
    /// Values past `steps` clamp to 1.0; zero steps means a slider with a
    /// single position, which shows the full layer.
    pub fn progress_from_slider(value: u32, steps: u32) -> f64 {
        if steps == 0 {
            return 1.0;
        }
        f64::from(value.min(steps)) / f64::from(steps)
    }

    /// Label for a layer slider position, with Z in the aligned frame
    pub fn layer_label(&self, index: usize) -> Option<String> {
        let layer = self.layers.get(index)?;
        let z = layer.z() + self.cache.alignment().vector().z;
        Some(format!(
            "Z-Level: {:.2}mm (Layer {}/{})",
            z,
            index + 1,
            self.layers.len()
        ))
    }
}

impl<H: Clone + std::fmt::Debug> PreviewSession<H> {
    /// Start previewing a new slicing run.
    ///
    /// Clears whatever the previous run displayed, aligns the toolpath with
    /// `source_bounds` when given, and shows the first layer in full.
    ///
    /// # Errors
    /// Propagates [`DisplayError`] from the initial update.
    pub fn load<S>(
        &mut self,
        scene: &mut S,
        parsed: ParsedToolpath,
        source_bounds: Option<&BoundingVolume>,
    ) -> Result<LoadOutcome, DisplayError>
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        self.clear(scene);

        if parsed.is_empty() || !parsed.bounds.is_valid() {
            info!("Toolpath has no extrusion, nothing to preview");
            return Ok(LoadOutcome::Empty);
        }

        let offset = match source_bounds {
            Some(source) => AlignmentOffset::between(source, &parsed.bounds).unwrap_or_else(|| {
                warn!("Source bounds are invalid, toolpath left unaligned");
                AlignmentOffset::ZERO
            }),
            None => AlignmentOffset::ZERO,
        };
        self.cache.set_alignment(offset);
        self.layers = parsed.layers;
        self.bounds = parsed.bounds;
        info!(
            "Loaded {} layer(s), alignment offset {}",
            self.layers.len(),
            offset.vector()
        );

        let summary = self.scrub(scene, 0, 1.0)?;
        Ok(LoadOutcome::Loaded {
            layers: self.layers.len(),
            summary,
        })
    }

    /// Display a scrub position immediately, discarding any pending request
    ///
    /// # Errors
    /// Returns [`DisplayError::InvalidArgument`] for an out-of-range layer
    /// or progress.
    pub fn scrub<S>(
        &mut self,
        scene: &mut S,
        layer: usize,
        progress: f64,
    ) -> Result<UpdateSummary, DisplayError>
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        self.pending = None;
        let summary = self.cache.update(scene, &self.layers, layer, progress)?;
        self.position = Some(ScrubRequest { layer, progress });
        Ok(summary)
    }

    /// Apply the latest pending request, if any
    ///
    /// # Errors
    /// Same as [`scrub`](PreviewSession::scrub).
    pub fn flush<S>(&mut self, scene: &mut S) -> Result<Option<UpdateSummary>, DisplayError>
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        match self.pending.take() {
            Some(request) => self
                .scrub(scene, request.layer, request.progress)
                .map(Some),
            None => Ok(None),
        }
    }

    /// End the session and remove everything it displayed.
    ///
    /// Returns the number of scene failures that were swallowed.
    pub fn close<S>(&mut self, scene: &mut S) -> usize
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        debug!("Closing preview session");
        self.clear(scene)
    }

    fn clear<S>(&mut self, scene: &mut S) -> usize
    where
        S: RenderScene<Handle = H> + ?Sized,
    {
        let failures = self.cache.reset(scene);
        self.cache.set_alignment(AlignmentOffset::ZERO);
        self.layers.clear();
        self.bounds = BoundingVolume::empty();
        self.pending = None;
        self.position = None;
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_from_slider() {
        assert_eq!(PreviewSession::<u64>::progress_from_slider(0, 1000), 0.0);
        assert_eq!(PreviewSession::<u64>::progress_from_slider(500, 1000), 0.5);
        assert_eq!(PreviewSession::<u64>::progress_from_slider(1000, 1000), 1.0);
        assert_eq!(PreviewSession::<u64>::progress_from_slider(1200, 1000), 1.0);
        assert_eq!(PreviewSession::<u64>::progress_from_slider(3, 0), 1.0);
    }

    #[test]
    fn test_requests_coalesce() {
        let mut session = PreviewSession::<u64>::default();
        session.request(1, 0.1);
        session.request(2, 0.2);
        session.slider_request(3, 250);
        assert_eq!(
            session.pending(),
            Some(ScrubRequest {
                layer: 3,
                progress: 0.25
            })
        );
    }

    #[test]
    fn test_label_without_layers() {
        let session = PreviewSession::<u64>::default();
        assert_eq!(session.layer_label(0), None);
    }
}
