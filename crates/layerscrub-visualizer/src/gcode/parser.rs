//! Toolpath reconstruction from slicer G-code
//!
//! Replays the motion stream and folds every extruding move into
//! continuous beads grouped by Z height. A single pass over the input,
//! no side effects; an empty or missing stream yields an empty toolpath.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use layerscrub_core::{BoundingVolume, Point3};
use layerscrub_settings::ParserSettings;
use tracing::{debug, trace};

use super::command::{classify_line, ExtrusionMode, GcodeLine, MotionKind, PositioningMode};
use crate::toolpath::Layer;
use crate::utils::{read_lines_lossy, GcodeFileReader};

/// Counters collected while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines fed to the parser
    pub lines: usize,
    /// Comment, blank, and too-short lines
    pub skipped_lines: usize,
    /// G0/G1 lines that named at least one of X, Y, Z
    pub moves: usize,
    /// Moves that deposited material
    pub extruding_moves: usize,
    /// G0/G1 lines with no X/Y/Z word
    pub extrusion_only_lines: usize,
    /// Lines with an unparseable axis word
    pub malformed_lines: usize,
    /// G92 lines that set E
    pub extrusion_resets: usize,
}

/// Result of parsing a motion stream
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedToolpath {
    /// Layers in the order they were started
    pub layers: Vec<Layer>,
    /// Bounds of extruded material only; invalid when nothing was extruded
    pub bounds: BoundingVolume,
    pub stats: ParseStats,
}

impl ParsedToolpath {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is nothing to display
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn path_count(&self) -> usize {
        self.layers.iter().map(Layer::path_count).sum()
    }

    pub fn total_length(&self) -> f64 {
        self.layers.iter().map(Layer::total_length).sum()
    }
}

/// Running machine state while replaying a stream
struct ToolpathBuilder {
    settings: ParserSettings,
    position: Point3,
    extruded: f64,
    positioning: PositioningMode,
    extrusion: ExtrusionMode,
    open_path: Vec<Point3>,
    layers: Vec<Layer>,
    bounds: BoundingVolume,
    stats: ParseStats,
}

impl ToolpathBuilder {
    fn new(settings: ParserSettings) -> Self {
        Self {
            settings,
            position: Point3::ZERO,
            extruded: 0.0,
            positioning: PositioningMode::default(),
            extrusion: ExtrusionMode::default(),
            open_path: Vec::new(),
            layers: Vec::new(),
            bounds: BoundingVolume::empty(),
            stats: ParseStats::default(),
        }
    }

    fn feed_line(&mut self, line: &str) {
        self.stats.lines += 1;
        let line = line.trim();

        if line.starts_with(';') || line.len() < self.settings.min_line_length {
            self.stats.skipped_lines += 1;
            return;
        }

        match classify_line(line) {
            GcodeLine::Move { kind, words } => {
                if !words.has_position() {
                    self.stats.extrusion_only_lines += 1;
                    return;
                }
                let target = match self.positioning {
                    PositioningMode::Absolute => Point3::new(
                        words.x.unwrap_or(self.position.x),
                        words.y.unwrap_or(self.position.y),
                        words.z.unwrap_or(self.position.z),
                    ),
                    PositioningMode::Relative => {
                        self.position
                            + Point3::new(
                                words.x.unwrap_or(0.0),
                                words.y.unwrap_or(0.0),
                                words.z.unwrap_or(0.0),
                            )
                    }
                };
                let extruded = match self.extrusion {
                    ExtrusionMode::Absolute => words.e.unwrap_or(self.extruded),
                    ExtrusionMode::Relative => self.extruded + words.e.unwrap_or(0.0),
                };
                self.apply_move(kind, target, extruded);
            }
            GcodeLine::SetPosition { e: Some(e) } => {
                trace!("Line {}: extrusion reset to {}", self.stats.lines, e);
                self.extruded = e;
                self.stats.extrusion_resets += 1;
            }
            GcodeLine::SetPosition { e: None } => {}
            GcodeLine::Positioning(mode) => self.positioning = mode,
            GcodeLine::Extrusion(mode) => self.extrusion = mode,
            GcodeLine::Ignored => {}
            GcodeLine::Malformed => {
                trace!("Line {}: malformed, skipped: {}", self.stats.lines, line);
                self.stats.malformed_lines += 1;
            }
        }
    }

    fn apply_move(&mut self, kind: MotionKind, target: Point3, extruded: f64) {
        self.stats.moves += 1;
        let extruding = kind == MotionKind::Linear && extruded > self.extruded;

        if extruding {
            self.bounds.union_point(target);
        }

        if (target.z - self.position.z).abs() > self.settings.z_epsilon {
            self.close_path();
            trace!("Line {}: new layer at Z={:.3}", self.stats.lines, target.z);
            self.layers.push(Layer::new(target.z));
        }

        if extruding {
            self.stats.extruding_moves += 1;
            if self.layers.is_empty() {
                self.layers.push(Layer::new(target.z));
            }
            if self.open_path.is_empty() {
                self.open_path.push(self.position);
            }
            self.open_path.push(target);
        } else {
            // a travel ends the bead
            self.close_path();
        }

        self.position = target;
        self.extruded = extruded;
    }

    fn close_path(&mut self) {
        if self.open_path.is_empty() {
            return;
        }
        let points = std::mem::take(&mut self.open_path);
        if let Some(layer) = self.layers.last_mut() {
            layer.add_path(points);
        }
    }

    fn finish(mut self) -> ParsedToolpath {
        self.close_path();

        let parsed = ParsedToolpath {
            layers: self.layers,
            bounds: self.bounds,
            stats: self.stats,
        };
        debug!(
            "Parse complete: {} lines, {} moves ({} extruding), {} malformed, {} layers, {} paths, {:.2}mm extruded path",
            parsed.stats.lines,
            parsed.stats.moves,
            parsed.stats.extruding_moves,
            parsed.stats.malformed_lines,
            parsed.layers.len(),
            parsed.path_count(),
            parsed.total_length()
        );
        parsed
    }
}

/// Slicer G-code to layered toolpath parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolpathParser {
    settings: ParserSettings,
}

impl ToolpathParser {
    pub fn new(settings: ParserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Parse an in-memory G-code program
    pub fn parse_str(&self, gcode: &str) -> ParsedToolpath {
        debug!("Starting toolpath parse, input size: {} bytes", gcode.len());
        self.parse_lines(gcode.lines())
    }

    /// Parse any sequence of lines
    pub fn parse_lines<I>(&self, lines: I) -> ParsedToolpath
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut builder = ToolpathBuilder::new(self.settings);
        for line in lines {
            builder.feed_line(line.as_ref());
        }
        builder.finish()
    }

    /// Parse from a buffered reader
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected, so
    /// a stray Latin-1 comment does not abort the parse.
    ///
    /// # Errors
    /// Returns the first I/O error raised by the reader
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> std::io::Result<ParsedToolpath> {
        let mut builder = ToolpathBuilder::new(self.settings);
        read_lines_lossy(reader, |line| {
            builder.feed_line(line);
            Ok::<(), std::io::Error>(())
        })?;
        Ok(builder.finish())
    }

    /// Parse a G-code file
    ///
    /// A missing or zero-length file is not an error: it produces an empty
    /// toolpath.
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedToolpath> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("No G-code at {}, nothing to parse", path.display());
            return Ok(ParsedToolpath::empty());
        }

        let reader = GcodeFileReader::new(path)?;
        if reader.file_size() == 0 {
            debug!("G-code file {} is empty", path.display());
            return Ok(ParsedToolpath::empty());
        }

        let mut builder = ToolpathBuilder::new(self.settings);
        let read_stats = reader
            .read_lines(|line| {
                builder.feed_line(line);
                Ok(())
            })
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(
            "Read {} lines ({} bytes) from {} in {}ms",
            read_stats.lines_read,
            read_stats.bytes_read,
            path.display(),
            read_stats.read_time_ms
        );

        Ok(builder.finish())
    }
}
