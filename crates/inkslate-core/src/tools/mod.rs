//! Eraser tool configuration.

use crate::error::{DocumentError, DocumentResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// How the eraser treats the strokes it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EraserMode {
    /// Cut only the touched pieces out of a stroke.
    #[default]
    Default,
    /// Remove every touched stroke completely.
    DeleteStroke,
}

impl EraserMode {
    /// Cycle to the other mode.
    pub fn next(self) -> Self {
        match self {
            EraserMode::Default => EraserMode::DeleteStroke,
            EraserMode::DeleteStroke => EraserMode::Default,
        }
    }
}

/// Persistent eraser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraserConfig {
    /// Eraser thickness (diameter of the eraser disk).
    pub thickness: f64,
    /// Eraser mode.
    pub mode: EraserMode,
}

impl Default for EraserConfig {
    fn default() -> Self {
        Self {
            thickness: Self::THICKNESS_DEFAULT,
            mode: EraserMode::default(),
        }
    }
}

impl EraserConfig {
    pub const THICKNESS_MIN: f64 = 1.0;
    pub const THICKNESS_MAX: f64 = 500.0;
    pub const THICKNESS_DEFAULT: f64 = 12.0;

    /// Keep the thickness within the supported range.
    pub fn clamped(mut self) -> Self {
        self.thickness = if self.thickness.is_finite() {
            self.thickness.clamp(Self::THICKNESS_MIN, Self::THICKNESS_MAX)
        } else {
            Self::THICKNESS_DEFAULT
        };
        self
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        serde_json::from_str::<Self>(json)
            .map(Self::clamped)
            .map_err(|e| DocumentError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> DocumentResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            DocumentError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Write the configuration to a file.
    pub fn save(&self, path: &Path) -> DocumentResult<()> {
        let json = self
            .to_json()
            .map_err(|e| DocumentError::Config(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| {
            DocumentError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// Read access to the live eraser settings.
///
/// Values may change between calls (e.g. from a keyboard shortcut in the
/// middle of a drag), so callers read them every time instead of caching.
pub trait EraserSettings: Send + Sync {
    /// Current eraser thickness.
    fn thickness(&self) -> f64;

    /// Current eraser mode.
    fn eraser_mode(&self) -> EraserMode;
}

/// Holds the active eraser configuration and allows changing it live.
#[derive(Debug, Default)]
pub struct ToolHandler {
    eraser: RwLock<EraserConfig>,
}

impl ToolHandler {
    /// Create a tool handler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tool handler from a configuration.
    pub fn with_config(config: EraserConfig) -> Self {
        Self {
            eraser: RwLock::new(config.clamped()),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> EraserConfig {
        match self.eraser.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Change the eraser thickness.
    pub fn set_thickness(&self, thickness: f64) {
        self.update(|config| config.thickness = thickness);
    }

    /// Change the eraser mode.
    pub fn set_eraser_mode(&self, mode: EraserMode) {
        self.update(|config| config.mode = mode);
    }

    fn update(&self, f: impl FnOnce(&mut EraserConfig)) {
        let mut guard = match self.eraser.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
        *guard = guard.clone().clamped();
    }
}

impl EraserSettings for ToolHandler {
    fn thickness(&self) -> f64 {
        self.config().thickness
    }

    fn eraser_mode(&self) -> EraserMode {
        self.config().mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_fields() {
        let config = EraserConfig::from_json(r#"{ "mode": "delete_stroke" }"#).unwrap();
        assert_eq!(config.mode, EraserMode::DeleteStroke);
        assert!((config.thickness - EraserConfig::THICKNESS_DEFAULT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_thickness_is_clamped() {
        let config = EraserConfig::from_json(r#"{ "thickness": 9000.0 }"#).unwrap();
        assert!((config.thickness - EraserConfig::THICKNESS_MAX).abs() < f64::EPSILON);

        let handler = ToolHandler::new();
        handler.set_thickness(0.0);
        assert!((handler.thickness() - EraserConfig::THICKNESS_MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = EraserConfig::from_json("{ thickness: }").unwrap_err();
        assert!(matches!(err, DocumentError::Config(_)));
    }

    #[test]
    fn test_live_mode_change() {
        let handler = ToolHandler::new();
        assert_eq!(handler.eraser_mode(), EraserMode::Default);
        handler.set_eraser_mode(EraserMode::Default.next());
        assert_eq!(handler.eraser_mode(), EraserMode::DeleteStroke);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eraser.json");
        let config = EraserConfig {
            thickness: 24.0,
            mode: EraserMode::DeleteStroke,
        };
        config.save(&path).unwrap();
        assert_eq!(EraserConfig::load(&path).unwrap(), config);

        let handler = ToolHandler::with_config(EraserConfig::load(&path).unwrap());
        assert_eq!(handler.eraser_mode(), EraserMode::DeleteStroke);
        assert!((handler.thickness() - 24.0).abs() < f64::EPSILON);

        let missing = dir.path().join("missing.json");
        assert!(matches!(EraserConfig::load(&missing), Err(DocumentError::Io(_))));
    }
}
