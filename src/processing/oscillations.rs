use serde::Serialize;

use crate::config::OscillationConfig;
use crate::error::Result;
use crate::processing::statistics::{mean_std, std_dev};
use crate::processing::window::{
    detrend_linear, edge_padded, ensure_window_fits, window_size_for, zero_crossings,
};

/// Half-open range `[start, end)` holding a regular oscillation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OscillationRegion {
    pub start: usize,
    pub end: usize,
}

/// Scan every window of size `round(count * window_ratio)` for regular
/// zero-crossings of consistent amplitude. Qualifying windows are returned
/// as-is, overlapping ones included.
pub fn detect_oscillations(
    data: &[f64],
    window_ratio: f64,
    config: &OscillationConfig,
) -> Result<Vec<OscillationRegion>> {
    let count = data.len();
    let window = window_size_for(count, window_ratio, config.min_window);
    ensure_window_fits(window, count)?;

    let padded = edge_padded(data, window);
    let global_std = std_dev(data)?;
    let mut regions = Vec::new();

    for start in 0..=count - window {
        let centered = detrend_linear(&padded[start..start + window]);
        if window_oscillates(&centered, global_std, config)? {
            regions.push(OscillationRegion {
                start,
                end: start + window,
            });
        }
    }

    tracing::debug!(window, window_ratio, found = regions.len(), "oscillation scan complete");
    Ok(regions)
}

fn window_oscillates(centered: &[f64], global_std: f64, config: &OscillationConfig) -> Result<bool> {
    let local_std = std_dev(centered)?;
    if local_std < config.energy_ratio * global_std {
        return Ok(false);
    }

    let crossings = zero_crossings(centered);
    if crossings.len() <= config.min_crossings {
        return Ok(false);
    }

    let (gaps, amplitudes): (Vec<usize>, Vec<f64>) = crossings
        .windows(2)
        .map(|pair| {
            let peak = centered[pair[0]..pair[1]]
                .iter()
                .fold(0.0f64, |acc, v| acc.max(v.abs()));
            (pair[1] - pair[0], peak)
        })
        .unzip();

    let (amp_mean, amp_std) = mean_std(&amplitudes)?;
    let consistent = amp_std < config.amplitude_cv * amp_mean;
    let qualifying = gaps
        .iter()
        .filter(|&&gap| gap >= config.min_gap && consistent)
        .count();

    Ok(qualifying > config.min_qualifying)
}

/// Try each configured ratio in order and keep the first that finds anything.
/// Windows are coalesced when `merge_windows` is set.
pub fn find_oscillations(data: &[f64], config: &OscillationConfig) -> Result<Vec<OscillationRegion>> {
    for &ratio in &config.window_ratios {
        let regions = detect_oscillations(data, ratio, config)?;
        if !regions.is_empty() {
            return Ok(if config.merge_windows {
                merge_regions(&regions)
            } else {
                regions
            });
        }
    }
    Ok(Vec::new())
}

/// Coalesce overlapping or touching regions. Input must be sorted by start,
/// which `detect_oscillations` guarantees.
pub fn merge_regions(regions: &[OscillationRegion]) -> Vec<OscillationRegion> {
    let mut merged: Vec<OscillationRegion> = Vec::with_capacity(regions.len());
    for region in regions {
        match merged.last_mut() {
            Some(last) if region.start <= last.end => last.end = last.end.max(region.end),
            _ => merged.push(*region),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Flat baseline with a 12-sample-period burst over `[150, 250)`.
    fn burst_signal() -> Vec<f64> {
        (0..400)
            .map(|i| {
                if (150..250).contains(&i) {
                    (2.0 * PI * (i - 150) as f64 / 12.0 + 0.3).sin()
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn test_burst_found_at_wider_ratio() {
        let data = burst_signal();
        let config = OscillationConfig::default();
        // 20-sample windows hold too few crossings.
        assert!(detect_oscillations(&data, 0.05, &config).unwrap().is_empty());

        let raw = detect_oscillations(&data, 0.10, &config).unwrap();
        assert!(!raw.is_empty());
        for region in &raw {
            assert_eq!(region.end - region.start, 40);
            assert!(region.start < 270 && region.end > 150, "{region:?}");
        }
    }

    #[test]
    fn test_find_merges_windows() {
        let data = burst_signal();
        let merged = find_oscillations(&data, &OscillationConfig::default()).unwrap();
        assert_eq!(merged.len(), 1);

        let unmerged = find_oscillations(
            &data,
            &OscillationConfig {
                merge_windows: false,
                ..OscillationConfig::default()
            },
        )
        .unwrap();
        assert!(unmerged.len() > 1);
        assert_eq!(merged[0].start, unmerged[0].start);
        assert_eq!(merged[0].end, unmerged.last().unwrap().end);
    }

    #[test]
    fn test_trend_is_not_oscillation() {
        let data: Vec<f64> = (0..400).map(|i| 0.5 * i as f64).collect();
        assert!(find_oscillations(&data, &OscillationConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_merge_regions() {
        let regions = [
            OscillationRegion { start: 0, end: 10 },
            OscillationRegion { start: 5, end: 15 },
            OscillationRegion { start: 15, end: 20 },
            OscillationRegion { start: 30, end: 40 },
        ];
        assert_eq!(
            merge_regions(&regions),
            vec![
                OscillationRegion { start: 0, end: 20 },
                OscillationRegion { start: 30, end: 40 },
            ]
        );
    }
}
