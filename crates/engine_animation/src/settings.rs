//! Avatar movement settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Failures loading [`AvatarSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse avatar settings")]
    Parse(#[from] serde_json::Error),

    #[error("invalid avatar settings: {0}")]
    Invalid(String),
}

/// Reference speeds that place the walk and run clips on the blend axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarSettings {
    /// Metres per second at which the walk cycle plays at full weight.
    pub walk_speed: f32,
    /// Metres per second at which the run cycle plays at full weight.
    pub run_speed: f32,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            walk_speed: 1.6,
            run_speed: 3.3,
        }
    }
}

impl AvatarSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a JSON settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Speeds must be finite with `0 < walk_speed < run_speed`.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.walk_speed.is_finite() || !self.run_speed.is_finite() {
            return Err(SettingsError::Invalid("speeds must be finite".into()));
        }
        if self.walk_speed <= 0.0 || self.run_speed <= self.walk_speed {
            return Err(SettingsError::Invalid(format!(
                "expected 0 < walk_speed < run_speed, got walk {} run {}",
                self.walk_speed, self.run_speed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AvatarSettings::default();
        assert!((settings.walk_speed - 1.6).abs() < f32::EPSILON);
        assert!((settings.run_speed - 3.3).abs() < f32::EPSILON);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = AvatarSettings::from_json_str(r#"{ "run_speed": 5.0 }"#).unwrap();
        assert!((settings.walk_speed - 1.6).abs() < f32::EPSILON);
        assert!((settings.run_speed - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_inverted_speeds() {
        let err = AvatarSettings::from_json_str(r#"{ "walk_speed": 4.0, "run_speed": 2.0 }"#);
        assert!(matches!(err, Err(SettingsError::Invalid(_))));
        assert!(matches!(
            AvatarSettings::from_json_str("not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AvatarSettings::from_json_file("/nonexistent/avatar.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/avatar.json"));
    }
}
