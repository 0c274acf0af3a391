//! Error handling for layerscrub
//!
//! Provides the error types shared across the workspace: scene errors
//! reported by rendering-scene implementations, and display errors for
//! contract violations on display-cache updates.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Failure reported by a rendering scene.
///
/// The display cache never propagates these; it logs them and keeps its
/// own bookkeeping consistent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The handle does not refer to a live scene object
    #[error("Unknown scene object: {handle}")]
    UnknownObject {
        /// Debug rendering of the offending handle.
        handle: String,
    },

    /// The scene refused to create an object
    #[error("Scene rejected {kind}: {reason}")]
    Rejected {
        /// Kind of object ("path", "marker").
        kind: &'static str,
        /// The reason given by the scene.
        reason: String,
    },

    /// Backend-specific failure
    #[error("Scene backend error: {message}")]
    Backend {
        /// The error message.
        message: String,
    },
}

/// Display cache error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DisplayError {
    /// An argument violated the call contract
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// Name of the argument.
        argument: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl DisplayError {
    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}
