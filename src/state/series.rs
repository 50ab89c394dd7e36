use crate::config::{OscillationConfig, SpikeConfig, StallConfig};
use crate::error::{AnalysisError, Result};
use crate::processing::median_filter::{median_filter, restore_spikes};
use crate::processing::oscillations::{self, OscillationRegion};
use crate::processing::spectral::SpectralAnalysis;
use crate::processing::spikes::{self, Spike};
use crate::processing::stalls::{self, StallInterval};
use crate::processing::statistics::SeriesStats;

/// One analyzed signal: the samples as loaded plus a working copy that
/// transforms replace wholesale.
///
/// Detectors only read `current`. Operations that replace it take
/// `&mut self`; share a `Series` between threads behind a lock if more than
/// one of them may mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    label: Option<String>,
    original: Vec<f64>,
    current: Vec<f64>,
}

impl Series {
    pub fn new(samples: Vec<f64>, label: Option<String>) -> Result<Self> {
        validate_samples(&samples)?;
        Ok(Self {
            label,
            original: samples.clone(),
            current: samples,
        })
    }

    /// Build from raw column tokens. A leading token that is not a number is
    /// taken as the label; every other token must parse as `f64`.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let (label, body) = split_label(tokens);
        let samples = body
            .iter()
            .enumerate()
            .map(|(row, token)| {
                let token = token.as_ref().trim();
                token.parse::<f64>().map_err(|_| {
                    AnalysisError::invalid(format!("non-numeric sample {token:?} at row {row}"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::new(samples, label)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label for display, falling back to `fallback` when the column had none.
    pub fn display_label(&self, fallback: &str) -> String {
        self.label.clone().unwrap_or_else(|| fallback.to_string())
    }

    pub fn original(&self) -> &[f64] {
        &self.original
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn count(&self) -> usize {
        self.current.len()
    }

    pub fn stats(&self) -> Result<SeriesStats> {
        SeriesStats::compute(&self.current)
    }

    pub fn detect_spikes(&self) -> Result<Vec<Spike>> {
        self.detect_spikes_with(&SpikeConfig::default())
    }

    pub fn detect_spikes_with(&self, config: &SpikeConfig) -> Result<Vec<Spike>> {
        spikes::detect_spikes(&self.current, config)
    }

    pub fn detect_stalls(&self) -> Result<Vec<StallInterval>> {
        self.detect_stalls_with(&StallConfig::default())
    }

    pub fn detect_stalls_with(&self, config: &StallConfig) -> Result<Vec<StallInterval>> {
        stalls::detect_stalls(&self.current, config)
    }

    /// Raw qualifying windows for a single window ratio.
    pub fn detect_oscillations(&self, window_ratio: f64) -> Result<Vec<OscillationRegion>> {
        self.detect_oscillations_with(window_ratio, &OscillationConfig::default())
    }

    pub fn detect_oscillations_with(
        &self,
        window_ratio: f64,
        config: &OscillationConfig,
    ) -> Result<Vec<OscillationRegion>> {
        oscillations::detect_oscillations(&self.current, window_ratio, config)
    }

    /// Multi-ratio search, merged according to `config.merge_windows`.
    pub fn find_oscillations(&self, config: &OscillationConfig) -> Result<Vec<OscillationRegion>> {
        oscillations::find_oscillations(&self.current, config)
    }

    /// Median-filtered copy of `current`; `current` itself is untouched.
    pub fn filtered(&self, count_param: usize) -> Result<Vec<f64>> {
        median_filter(&self.current, count_param)
    }

    pub fn apply_filter(&mut self, count_param: usize) -> Result<()> {
        let filtered = self.filtered(count_param)?;
        self.replace_current(filtered)
    }

    /// Filter while keeping detected spikes verbatim: spikes are found on
    /// the unfiltered signal and written back over the filtered one.
    pub fn filter_keeping_spikes(&mut self, count_param: usize, config: &SpikeConfig) -> Result<Vec<Spike>> {
        let spikes = self.detect_spikes_with(config)?;
        let mut filtered = self.filtered(count_param)?;
        restore_spikes(&spikes, &mut filtered)?;
        self.replace_current(filtered)?;
        tracing::debug!(count_param, restored = spikes.len(), "filtered with spikes kept");
        Ok(spikes)
    }

    pub fn spectral(&self, time_step: f64) -> Result<SpectralAnalysis<'_>> {
        SpectralAnalysis::new(self, time_step)
    }

    /// Replace `current` with its cumulative integral.
    pub fn integrate(&mut self, time_step: f64) -> Result<()> {
        let integral = self.spectral(time_step)?.integral();
        self.replace_current(integral)
    }

    pub fn replace_current(&mut self, samples: Vec<f64>) -> Result<()> {
        validate_samples(&samples)?;
        self.current = samples;
        Ok(())
    }

    pub fn restore_original(&mut self) {
        self.current.clone_from(&self.original);
    }
}

fn validate_samples(samples: &[f64]) -> Result<()> {
    if samples.is_empty() {
        return Err(AnalysisError::invalid("a series needs at least one sample"));
    }
    if let Some(idx) = samples.iter().position(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid(format!(
            "non-finite sample {} at index {idx}",
            samples[idx]
        )));
    }
    Ok(())
}

/// Separate a leading non-numeric token from the numeric body.
pub fn split_label<S: AsRef<str>>(tokens: &[S]) -> (Option<String>, &[S]) {
    match tokens.split_first() {
        Some((first, rest)) if first.as_ref().trim().parse::<f64>().is_err() => {
            (Some(first.as_ref().trim().to_string()), rest)
        }
        _ => (None, tokens),
    }
}
