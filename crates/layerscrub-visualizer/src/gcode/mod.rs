//! G-Code tokenizer and toolpath parser
//!
//! This module provides:
//! - Line classification (motion, modal and reset commands)
//! - Toolpath reconstruction into layers of extrusion paths
//! - Parse statistics

pub mod command;
pub mod parser;

pub use command::{
    classify_line, strip_comment, AxisWords, ExtrusionMode, GcodeLine, MotionKind,
    PositioningMode,
};
pub use parser::{ParseStats, ParsedToolpath, ToolpathParser};
