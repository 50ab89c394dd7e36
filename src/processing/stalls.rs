use serde::Serialize;

use crate::config::StallConfig;
use crate::error::Result;
use crate::processing::statistics::std_dev;
use crate::processing::window::{ensure_window_fits, window_size_for};

/// Half-open sample range `[start, end)` where the signal is stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StallInterval {
    pub start: usize,
    pub end: usize,
}

impl StallInterval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Find intervals whose local spread is a tiny fraction of the global spread.
///
/// Run detection works on window start offsets: a run of flagged offsets
/// `[s, e)` covers samples `[s, e + window - 1)` and must hold at least
/// `min_stall_length` offsets. A run still open when the scan ends runs to the
/// last sample, and its length is measured from `s` to that final index. A
/// perfectly constant series is a single stall over the whole range.
pub fn detect_stalls(data: &[f64], config: &StallConfig) -> Result<Vec<StallInterval>> {
    let count = data.len();
    let window = window_size_for(count, config.window_ratio, config.min_window);
    ensure_window_fits(window, count)?;

    let global_std = std_dev(data)?;
    let is_constant = data.iter().all(|&v| v == data[0]);
    if global_std == 0.0 || is_constant {
        tracing::debug!(count, "constant series, reporting a single stall");
        return Ok(vec![StallInterval { start: 0, end: count }]);
    }

    let threshold = global_std * config.threshold_ratio;
    let flags = data
        .windows(window)
        .map(|w| std_dev(w).map(|s| s < threshold))
        .collect::<Result<Vec<bool>>>()?;

    let mut stalls = Vec::new();
    let mut run_start: Option<usize> = None;

    for (offset, &flag) in flags.iter().enumerate() {
        match (flag, run_start) {
            (true, None) => run_start = Some(offset),
            (false, Some(start)) => {
                if offset - start >= config.min_stall_length {
                    stalls.push(StallInterval {
                        start,
                        end: (offset + window - 1).min(count),
                    });
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        if count - 1 - start >= config.min_stall_length {
            stalls.push(StallInterval { start, end: count });
        }
    }

    tracing::debug!(window, threshold, found = stalls.len(), "stall scan complete");
    Ok(stalls)
}
