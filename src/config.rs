use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Tuning for the leave-one-out spike detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    /// Fraction of the sample count used as window size.
    pub window_ratio: f64,
    pub min_window: usize,
    /// Deviation from the local mean, in local standard deviations, that marks a spike.
    pub std_multiplier: f64,
    /// Flag a sample whose leave-one-out window is perfectly flat
    /// whenever it differs from that flat level.
    pub flag_flat_window_outliers: bool,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            window_ratio: 0.05,
            min_window: 10,
            std_multiplier: 4.0,
            flag_flat_window_outliers: true,
        }
    }
}

/// Tuning for the low-variance stall detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StallConfig {
    pub window_ratio: f64,
    pub min_window: usize,
    /// Local std below `global_std * threshold_ratio` counts as stalled.
    pub threshold_ratio: f64,
    /// Minimum number of consecutive stalled window offsets.
    pub min_stall_length: usize,
}

impl Default for StallConfig {
    fn default() -> Self {
        Self {
            window_ratio: 0.03,
            min_window: 10,
            threshold_ratio: 0.002,
            min_stall_length: 10,
        }
    }
}

/// Tuning for the zero-crossing oscillation detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillationConfig {
    /// Ratios tried in order; the search stops at the first one with a match.
    pub window_ratios: Vec<f64>,
    pub min_window: usize,
    /// Windows whose detrended std is below `energy_ratio * global_std` are skipped.
    pub energy_ratio: f64,
    /// A window needs strictly more crossings than this.
    pub min_crossings: usize,
    /// Minimum samples between two crossings for a half-cycle to count.
    pub min_gap: usize,
    /// Half-cycle amplitudes must satisfy `std < amplitude_cv * mean`.
    pub amplitude_cv: f64,
    /// A window needs strictly more qualifying half-cycles than this.
    pub min_qualifying: usize,
    /// Coalesce overlapping or touching windows in the multi-ratio search.
    pub merge_windows: bool,
}

impl Default for OscillationConfig {
    fn default() -> Self {
        Self {
            window_ratios: vec![0.05, 0.10],
            min_window: 10,
            energy_ratio: 0.01,
            min_crossings: 5,
            min_gap: 5,
            amplitude_cv: 0.3,
            min_qualifying: 3,
            merge_windows: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Median window is `1 + 2 * count_param`.
    pub count_param: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { count_param: 1 }
    }
}

/// Complete set of detector and transform settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub spikes: SpikeConfig,
    pub stalls: StallConfig,
    pub oscillations: OscillationConfig,
    pub filter: FilterConfig,
}

impl AnalysisConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AnalysisError::Config(format!("Malformed config: {e}")))
    }

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("Cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = AnalysisConfig::from_json_str(r#"{"spikes": {"std_multiplier": 3.0}}"#).unwrap();
        assert_eq!(cfg.spikes.std_multiplier, 3.0);
        assert_eq!(cfg.spikes.window_ratio, 0.05);
        assert_eq!(cfg.stalls, StallConfig::default());
        assert_eq!(cfg.oscillations.window_ratios, vec![0.05, 0.10]);
    }

    #[test]
    fn test_malformed_config() {
        let err = AnalysisConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AnalysisConfig::from_json_file(Path::new("/nonexistent/oxidesignal.json")).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}
