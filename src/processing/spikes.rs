use serde::Serialize;

use crate::config::SpikeConfig;
use crate::error::Result;
use crate::processing::statistics::mean_std;
use crate::processing::window::{ensure_window_fits, leave_one_out, window_size_for};

/// A single-sample outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spike {
    pub index: usize,
    pub value: f64,
}

/// Flag samples that sit far from the mean of their leave-one-out neighborhood.
///
/// Every sample is judged against the window centered on it, with the sample
/// itself removed so it cannot inflate its own baseline. Near the ends the
/// window is edge-padded, but padding that repeats the tested sample is
/// dropped too, so an outlier at either end is still caught. A window with zero
/// spread has no scale to compare against; such samples are only flagged when
/// `flag_flat_window_outliers` is set and they differ from the flat level.
pub fn detect_spikes(data: &[f64], config: &SpikeConfig) -> Result<Vec<Spike>> {
    let count = data.len();
    let window = window_size_for(count, config.window_ratio, config.min_window);
    ensure_window_fits(window, count)?;

    let mut spikes = Vec::new();

    for (i, &value) in data.iter().enumerate() {
        let neighbors = leave_one_out(data, i, window);
        let (local_mean, local_std) = mean_std(&neighbors)?;
        let diff = (value - local_mean).abs();

        let is_spike = if local_std > 0.0 {
            diff > config.std_multiplier * local_std
        } else {
            config.flag_flat_window_outliers && diff > 0.0
        };

        if is_spike {
            spikes.push(Spike { index: i, value });
        }
    }

    tracing::debug!(window, found = spikes.len(), "spike scan complete");
    Ok(spikes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    #[test]
    fn test_single_outlier_in_constant_signal() {
        let mut data = vec![5.0; 40];
        data[19] = 20.0;
        let spikes = detect_spikes(&data, &SpikeConfig::default()).unwrap();
        assert_eq!(spikes, vec![Spike { index: 19, value: 20.0 }]);
    }

    #[test]
    fn test_flat_window_rule_can_be_disabled() {
        let mut data = vec![5.0; 40];
        data[19] = 20.0;
        let config = SpikeConfig {
            flag_flat_window_outliers: false,
            ..SpikeConfig::default()
        };
        assert!(detect_spikes(&data, &config).unwrap().is_empty());
    }

    #[test]
    fn test_constant_signal_has_no_spikes() {
        let data = vec![0.1; 64];
        assert!(detect_spikes(&data, &SpikeConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_outlier_on_noisy_ramp() {
        // Saw-tooth jitter around a ramp gives every window a non-zero spread.
        let mut data: Vec<f64> = (0..200)
            .map(|i| 0.01 * i as f64 + if i % 2 == 0 { 0.05 } else { -0.05 })
            .collect();
        data[120] += 3.0;
        let spikes = detect_spikes(&data, &SpikeConfig::default()).unwrap();
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].index, 120);
        assert_eq!(spikes[0].value, data[120]);
    }

    #[test]
    fn test_first_sample_outlier() {
        let mut data: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { 1.1 }).collect();
        data[0] = 10.0;
        let spikes = detect_spikes(&data, &SpikeConfig::default()).unwrap();
        assert_eq!(spikes, vec![Spike { index: 0, value: 10.0 }]);
    }

    #[test]
    fn test_last_sample_outlier_in_constant_signal() {
        let mut data = vec![5.0; 20];
        data[19] = 20.0;
        let spikes = detect_spikes(&data, &SpikeConfig::default()).unwrap();
        assert_eq!(spikes, vec![Spike { index: 19, value: 20.0 }]);
    }

    #[test]
    fn test_too_short_series() {
        let err = detect_spikes(&[1.0; 10], &SpikeConfig::default()).unwrap_err();
        assert_eq!(err, AnalysisError::WindowTooLarge { window: 10, count: 10 });
    }
}
