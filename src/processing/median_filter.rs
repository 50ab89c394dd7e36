use crate::error::{AnalysisError, Result};
use crate::processing::spikes::Spike;
use crate::processing::window::edge_padded;

/// Median filter with window `1 + 2 * count_param`, edge-padded so the
/// output has one value per input sample.
pub fn median_filter(data: &[f64], count_param: usize) -> Result<Vec<f64>> {
    if data.is_empty() {
        return Err(AnalysisError::invalid("median filter of an empty sequence"));
    }

    let window = 1 + 2 * count_param;
    let padded = edge_padded(data, window);
    let mut scratch = Vec::with_capacity(window);

    let filtered = (0..data.len())
        .map(|i| {
            scratch.clear();
            scratch.extend_from_slice(&padded[i..i + window]);
            scratch.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            scratch[window / 2]
        })
        .collect();

    Ok(filtered)
}

/// Write each spike's value back into `target` at its index.
///
/// All indices are checked before anything is written.
pub fn restore_spikes(spikes: &[Spike], target: &mut [f64]) -> Result<()> {
    if let Some(bad) = spikes.iter().find(|s| s.index >= target.len()) {
        return Err(AnalysisError::invalid(format!(
            "spike index {} outside a sequence of {} samples",
            bad.index,
            target.len()
        )));
    }
    for spike in spikes {
        target[spike.index] = spike.value;
    }
    Ok(())
}
