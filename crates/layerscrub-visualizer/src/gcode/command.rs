//! Line tokenization for slicer motion output
//!
//! Classifies one line of G-code into the handful of commands the toolpath
//! parser cares about. The first whitespace-separated word is the command
//! code; the remaining words are parsed as axis words. Anything after `;`
//! or `(` is a comment.

use regex::Regex;
use std::sync::OnceLock;

/// Motion type of a move command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// G0: travel without extrusion
    Rapid,
    /// G1: linear move, extrudes when E advances
    Linear,
}

/// Interpretation of X/Y/Z words (G90/G91)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositioningMode {
    #[default]
    Absolute,
    Relative,
}

/// Interpretation of E words (M82/M83)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtrusionMode {
    #[default]
    Absolute,
    Relative,
}

/// Axis values present on a line. Absent axes are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisWords {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
}

impl AxisWords {
    /// True when the line names at least one of X, Y or Z.
    pub fn has_position(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }
}

/// A classified G-code line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GcodeLine {
    /// G0/G1 with its axis words
    Move { kind: MotionKind, words: AxisWords },
    /// G92; only the E component is tracked
    SetPosition { e: Option<f64> },
    /// G90/G91
    Positioning(PositioningMode),
    /// M82/M83
    Extrusion(ExtrusionMode),
    /// Valid but irrelevant to toolpath reconstruction
    Ignored,
    /// An X/Y/Z/E word with an unparseable value
    Malformed,
}

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"))
}

fn axis_word_regex() -> &'static Regex {
    static AXIS_WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    AXIS_WORD_REGEX.get_or_init(|| {
        Regex::new(r"^([XYZE])([-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+))$")
            .expect("invalid regex pattern")
    })
}

/// Strip comments from a line
pub fn strip_comment(line: &str) -> &str {
    match comment_regex().find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    }
}

/// Parse the axis words following the command code.
///
/// Returns `None` if any X/Y/Z/E word is malformed. Words for other
/// letters (F, S, T, ...) are ignored.
fn parse_axis_words<'a>(words: impl Iterator<Item = &'a str>) -> Option<AxisWords> {
    let mut axes = AxisWords::default();

    for word in words {
        let upper = word.to_ascii_uppercase();
        let Some(first) = upper.chars().next() else {
            continue;
        };
        if !matches!(first, 'X' | 'Y' | 'Z' | 'E') {
            continue;
        }

        let caps = axis_word_regex().captures(&upper)?;
        let value: f64 = caps.get(2)?.as_str().parse().ok()?;
        if !value.is_finite() {
            return None;
        }

        match first {
            'X' => axes.x = Some(value),
            'Y' => axes.y = Some(value),
            'Z' => axes.z = Some(value),
            _ => axes.e = Some(value),
        }
    }

    Some(axes)
}

/// Classify a single line of G-code
pub fn classify_line(line: &str) -> GcodeLine {
    let code = strip_comment(line);
    let mut words = code.split_whitespace();
    let Some(command) = words.next() else {
        return GcodeLine::Ignored;
    };

    let kind = match command.to_ascii_uppercase().as_str() {
        "G0" | "G00" => MotionKind::Rapid,
        "G1" | "G01" => MotionKind::Linear,
        "G92" => {
            return match parse_axis_words(words) {
                Some(axes) => GcodeLine::SetPosition { e: axes.e },
                None => GcodeLine::Malformed,
            };
        }
        "G90" => return GcodeLine::Positioning(PositioningMode::Absolute),
        "G91" => return GcodeLine::Positioning(PositioningMode::Relative),
        "M82" => return GcodeLine::Extrusion(ExtrusionMode::Absolute),
        "M83" => return GcodeLine::Extrusion(ExtrusionMode::Relative),
        _ => return GcodeLine::Ignored,
    };

    match parse_axis_words(words) {
        Some(words) => GcodeLine::Move { kind, words },
        None => GcodeLine::Malformed,
    }
}
