//! Sliding-window helpers shared by the detectors and the median filter.

use crate::error::{AnalysisError, Result};

/// Window length for a detector: `max(round(count * ratio), min_window)`.
pub fn window_size_for(count: usize, ratio: f64, min_window: usize) -> usize {
    ((count as f64 * ratio).round() as usize).max(min_window)
}

/// Reject windows that cannot slide over the series at least once.
pub fn ensure_window_fits(window: usize, count: usize) -> Result<()> {
    if window == 0 || window >= count {
        return Err(AnalysisError::WindowTooLarge { window, count });
    }
    Ok(())
}

/// Pad both ends by `window / 2` copies of the first and last sample, so
/// `padded[i..i + window]` is the window centered on original index `i`.
pub fn edge_padded(data: &[f64], window: usize) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (data.first(), data.last()) else {
        return Vec::new();
    };
    let half = window / 2;
    let mut padded = Vec::with_capacity(data.len() + 2 * half);
    padded.extend(std::iter::repeat(first).take(half));
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(last).take(half));
    padded
}

/// Neighbors of `data[center]` in the edge-padded window of length `window`,
/// with the center and any padding copies of `data[center]` removed.
///
/// Slot `k` of the window maps to sample `center + k - window / 2`, clamped
/// into the series the same way `edge_padded` repeats the end samples.
pub fn leave_one_out(data: &[f64], center: usize, window: usize) -> Vec<f64> {
    let half = window / 2;
    let last = data.len().saturating_sub(1);
    (0..window)
        .map(|k| (center + k).saturating_sub(half).min(last))
        .filter(|&idx| idx != center)
        .map(|idx| data[idx])
        .collect()
}

/// Subtract the least-squares line fitted against sample position.
pub fn detrend_linear(data: &[f64]) -> Vec<f64> {
    let m = data.len();
    if m < 2 {
        return data.iter().map(|_| 0.0).collect();
    }

    let mean_t = (m - 1) as f64 / 2.0;
    let mean_y = data.iter().sum::<f64>() / m as f64;
    let mut sp = 0.0;
    let mut ss_t = 0.0;
    for (j, &y) in data.iter().enumerate() {
        let dt = j as f64 - mean_t;
        sp += dt * (y - mean_y);
        ss_t += dt * dt;
    }
    let slope = if ss_t.abs() > 1e-15 { sp / ss_t } else { 0.0 };
    let intercept = mean_y - slope * mean_t;

    data.iter()
        .enumerate()
        .map(|(j, &y)| y - (intercept + slope * j as f64))
        .collect()
}

/// -1, 0 or +1. Unlike `f64::signum`, zero maps to zero.
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Positions `j` where the sign of `data[j]` differs from the sign of `data[j + 1]`.
pub fn zero_crossings(data: &[f64]) -> Vec<usize> {
    data.windows(2)
        .enumerate()
        .filter(|(_, pair)| sign(pair[0]) != sign(pair[1]))
        .map(|(j, _)| j)
        .collect()
}
