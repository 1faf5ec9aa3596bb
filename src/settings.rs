use crate::mouse_gestures::capture::{ModifierKey, Modifiers, PointerButton};
use crate::mouse_gestures::matcher::MatchingAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Key that, while held, keeps a gesture from starting and aborts one in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuppressionKey {
    #[default]
    None,
    Shift,
    Ctrl,
    Alt,
}

impl SuppressionKey {
    pub fn is_held(self, modifiers: &Modifiers) -> bool {
        match self {
            SuppressionKey::None => false,
            SuppressionKey::Shift => modifiers.shift,
            SuppressionKey::Ctrl => modifiers.ctrl,
            SuppressionKey::Alt => modifiers.alt,
        }
    }

    pub fn matches(self, key: ModifierKey) -> bool {
        matches!(
            (self, key),
            (SuppressionKey::Shift, ModifierKey::Shift)
                | (SuppressionKey::Ctrl, ModifierKey::Ctrl)
                | (SuppressionKey::Alt, ModifierKey::Alt)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    NegativeThreshold { name: &'static str, value: f64 },
    DifferenceThresholdOutOfRange(f64),
    DeviationToleranceOutOfRange(f64),
    ZeroPollInterval,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::NegativeThreshold { name, value } => {
                write!(f, "{name} must be a non-negative number, got {value}")
            }
            SettingsError::DifferenceThresholdOutOfRange(value) => {
                write!(f, "differenceThreshold must lie in (0, 1), got {value}")
            }
            SettingsError::DeviationToleranceOutOfRange(value) => {
                write!(f, "deviationTolerance must lie in [0, 1], got {value}")
            }
            SettingsError::ZeroPollInterval => write!(f, "pollIntervalMs must be positive"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureSettings {
    /// Button that draws gestures.
    pub trigger_button: PointerButton,
    pub suppression_key: SuppressionKey,
    /// Distance in pixels the pointer must travel before a press becomes a gesture.
    pub distance_threshold: f64,
    /// Movements shorter than this many pixels are treated as jitter.
    pub jitter_distance: f64,
    /// Minimum turn, as a fraction of a half circle, that starts a new segment.
    pub difference_threshold: f64,
    pub timeout_active: bool,
    /// Inactivity in milliseconds after which an active gesture is aborted.
    pub timeout_duration: u64,
    pub matching_algorithm: MatchingAlgorithm,
    /// Largest difference still accepted as a match.
    pub deviation_tolerance: f64,
    /// When enabled the service logs every capture transition.
    pub debug_logging: bool,
    /// How often the service polls its inactivity timer.
    pub poll_interval_ms: u64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            trigger_button: PointerButton::Secondary,
            suppression_key: SuppressionKey::None,
            distance_threshold: 10.0,
            jitter_distance: 10.0,
            difference_threshold: 0.12,
            timeout_active: false,
            timeout_duration: 1000,
            matching_algorithm: MatchingAlgorithm::Proportional,
            deviation_tolerance: 0.15,
            debug_logging: false,
            poll_interval_ms: 16,
        }
    }
}

impl GestureSettings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [
            ("distanceThreshold", self.distance_threshold),
            ("jitterDistance", self.jitter_distance),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(SettingsError::NegativeThreshold { name, value });
            }
        }
        if !(self.difference_threshold > 0.0 && self.difference_threshold < 1.0) {
            return Err(SettingsError::DifferenceThresholdOutOfRange(
                self.difference_threshold,
            ));
        }
        if !(0.0..=1.0).contains(&self.deviation_tolerance) {
            return Err(SettingsError::DeviationToleranceOutOfRange(
                self.deviation_tolerance,
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(SettingsError::ZeroPollInterval);
        }
        Ok(())
    }
}
