//! Geometry and color primitives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in millimeters.
pub type Point3 = glam::DVec3;

/// A translation in millimeters.
pub type Vector3 = glam::DVec3;

/// 8-bit RGB color handed to the rendering scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Dark gray used for already-printed layers.
    pub const GHOST_GRAY: Color = Color::rgb(80, 80, 80);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex notation, e.g. `#505050`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::GHOST_GRAY.to_hex(), "#505050");
        assert_eq!(Color::RED.to_string(), "#ff0000");
    }

    #[test]
    fn test_color_serde() {
        let json = serde_json::to_string(&Color::BLUE).unwrap();
        assert_eq!(json, r#"{"r":0,"g":0,"b":255}"#);
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::BLUE);
    }
}
