use serde::Serialize;

use crate::error::{AnalysisError, Result};

fn ensure_non_empty(data: &[f64]) -> Result<()> {
    if data.is_empty() {
        return Err(AnalysisError::invalid("statistics of an empty sequence"));
    }
    Ok(())
}

pub fn mean(data: &[f64]) -> Result<f64> {
    ensure_non_empty(data)?;
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population variance (divides by `n`).
pub fn variance(data: &[f64]) -> Result<f64> {
    let m = mean(data)?;
    Ok(data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64)
}

pub fn std_dev_from_variance(variance: f64) -> Result<f64> {
    if variance < 0.0 || variance.is_nan() {
        return Err(AnalysisError::invalid(format!("negative variance {variance}")));
    }
    Ok(variance.sqrt())
}

pub fn std_dev(data: &[f64]) -> Result<f64> {
    std_dev_from_variance(variance(data)?)
}

/// Mean and population std in one pass over the mean.
pub(crate) fn mean_std(data: &[f64]) -> Result<(f64, f64)> {
    let m = mean(data)?;
    let var = data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64;
    Ok((m, std_dev_from_variance(var)?))
}

pub fn median(data: &[f64]) -> Result<f64> {
    ensure_non_empty(data)?;
    let mut vals = data.to_vec();
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let count = vals.len();
    Ok(if count % 2 == 0 {
        (vals[count / 2 - 1] + vals[count / 2]) / 2.0
    } else {
        vals[count / 2]
    })
}

pub fn min(data: &[f64]) -> Result<f64> {
    ensure_non_empty(data)?;
    Ok(data.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn max(data: &[f64]) -> Result<f64> {
    ensure_non_empty(data)?;
    Ok(data.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn range(data: &[f64]) -> Result<f64> {
    Ok(max(data)? - min(data)?)
}

pub fn energy(data: &[f64]) -> Result<f64> {
    ensure_non_empty(data)?;
    Ok(data.iter().map(|v| v * v).sum())
}

pub fn rms(data: &[f64]) -> Result<f64> {
    Ok((energy(data)? / data.len() as f64).sqrt())
}

/// Sliding averages with window `floor(n / 10)`, one per start offset `0..=n-w`.
pub fn moving_average(data: &[f64]) -> Result<Vec<f64>> {
    let window = data.len() / 10;
    if window == 0 {
        return Err(AnalysisError::invalid(format!(
            "moving average needs at least 10 samples, got {}",
            data.len()
        )));
    }

    Ok(data
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect())
}

/// Statistics for a data series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub rms: f64,
    pub energy: f64,
    pub moving_average: Vec<f64>,
}

impl SeriesStats {
    /// Compute every descriptive statistic over `y`.
    pub fn compute(y: &[f64]) -> Result<Self> {
        let variance = variance(y)?;
        let min = min(y)?;
        let max = max(y)?;

        Ok(SeriesStats {
            count: y.len(),
            mean: mean(y)?,
            median: median(y)?,
            variance,
            std_dev: std_dev_from_variance(variance)?,
            min,
            max,
            range: max - min,
            rms: rms(y)?,
            energy: energy(y)?,
            moving_average: moving_average(y)?,
        })
    }

    /// Format as a multi-line report string.
    pub fn report(&self, label: &str) -> String {
        format!(
            "{}:\n  Count: {}\n  Mean: {:.3}\n  Median: {:.3}\n  Variance: {:.3}\n  Std Dev: {:.3}\n  Min: {:.3}\n  Max: {:.3}\n  Range: {:.3}\n  RMS: {:.3}\n  Energy: {:.3}\n  Moving Avg: {} points\n",
            label,
            self.count,
            self.mean,
            self.median,
            self.variance,
            self.std_dev,
            self.min,
            self.max,
            self.range,
            self.rms,
            self.energy,
            self.moving_average.len()
        )
    }
}
