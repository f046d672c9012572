//! Animation error types.

use engine_math::CurveError;

use crate::settings::SettingsError;

/// Errors raised while building or ticking an animation graph.
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    /// A named clip, or the distance curve for it, is not in the library.
    #[error("{asset} `{clip}` not found in the clip library")]
    ClipLookup { clip: String, asset: &'static str },

    /// The graph or one of its parts is malformed (empty blend space,
    /// undefined state, unknown action).
    #[error("invalid animation configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl AnimationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
