use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::processing::oscillations::OscillationRegion;
use crate::processing::spectral::Spectrum;
use crate::processing::spikes::Spike;
use crate::processing::stalls::StallInterval;
use crate::processing::statistics::SeriesStats;
use crate::state::series::Series;

/// Everything the engine reports about one series.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub label: String,
    pub count: usize,
    pub time_step: f64,
    pub stats: SeriesStats,
    pub spikes: Vec<Spike>,
    pub stalls: Vec<StallInterval>,
    pub oscillations: Vec<OscillationRegion>,
    pub dominant_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<Spectrum>,
}

impl AnalysisReport {
    /// Run every detector over the current samples of `series`.
    pub fn build(series: &Series, label: &str, time_step: f64, config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            label: label.to_string(),
            count: series.count(),
            time_step,
            stats: series.stats()?,
            spikes: series.detect_spikes_with(&config.spikes)?,
            stalls: series.detect_stalls_with(&config.stalls)?,
            oscillations: series.find_oscillations(&config.oscillations)?,
            dominant_frequency: series.spectral(time_step)?.dominant_frequency(),
            spectrum: None,
        })
    }

    /// Attach the full amplitude, phase and PSD spectrum of `series`.
    pub fn with_spectrum(mut self, series: &Series) -> Result<Self> {
        self.spectrum = Some(series.spectral(self.time_step)?.spectrum());
        Ok(self)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalysisError::Report(format!("Cannot serialize report: {e}")))
    }

    pub fn to_text(&self) -> String {
        let mut output = self.stats.report(&self.label);

        output.push_str(&format!("  Time step: {}\n", self.time_step));
        match self.dominant_frequency {
            Some(freq) => output.push_str(&format!("  Dominant frequency: {freq:.4}\n")),
            None => output.push_str("  Dominant frequency: n/a\n"),
        }

        if let Some(spectrum) = &self.spectrum {
            output.push_str(&format!(
                "  Spectrum: {} bins, {:.4} Hz apart, total power {:.4}\n",
                spectrum.bin_count(),
                spectrum.bin_width(),
                spectrum.total_power()
            ));
            if let Some((freq, amp)) = spectrum.peak() {
                output.push_str(&format!("    peak {amp:.4} at {freq:.4} Hz\n"));
            }
        }

        output.push_str(&format!("  Spikes: {}\n", self.spikes.len()));
        for spike in &self.spikes {
            output.push_str(&format!("    [{}] {:.4}\n", spike.index, spike.value));
        }

        output.push_str(&format!("  Stalls: {}\n", self.stalls.len()));
        for stall in &self.stalls {
            output.push_str(&format!("    {}..{} ({} samples)\n", stall.start, stall.end, stall.len()));
        }

        output.push_str(&format!("  Oscillations: {}\n", self.oscillations.len()));
        for region in &self.oscillations {
            output.push_str(&format!("    {}..{}\n", region.start, region.end));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_of_flat_signal_with_outlier() {
        let mut samples = vec![5.0; 60];
        samples[30] = 20.0;
        let series = Series::new(samples, Some("pump".into())).unwrap();
        let report = AnalysisReport::build(&series, "pump", 0.1, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.count, 60);
        assert_eq!(report.spikes, vec![Spike { index: 30, value: 20.0 }]);
        assert!(report.dominant_frequency.is_some());

        let text = report.to_text();
        assert!(text.starts_with("pump:"));
        assert!(text.contains("Spikes: 1"));
        assert!(text.contains("[30] 20.0000"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["label"], "pump");
        assert_eq!(json["spikes"][0]["index"], 30);
        assert_eq!(json["stats"]["count"], 60);
    }

    #[test]
    fn test_report_with_spectrum() {
        // 0.5 Hz cosine, 8 samples per second, 16 s.
        let samples = (0..128)
            .map(|i| (2.0 * std::f64::consts::PI * 0.5 * i as f64 * 0.125).cos())
            .collect();
        let series = Series::new(samples, Some("wave".into())).unwrap();
        let config = AnalysisConfig::default();

        let plain = AnalysisReport::build(&series, "wave", 0.125, &config).unwrap();
        assert!(plain.spectrum.is_none());
        assert!(!plain.to_text().contains("Spectrum"));
        let json: serde_json::Value = serde_json::from_str(&plain.to_json().unwrap()).unwrap();
        assert!(json.get("spectrum").is_none());

        let report = plain.with_spectrum(&series).unwrap();
        let spectrum = report.spectrum.as_ref().unwrap();
        assert_eq!(spectrum.bin_count(), 65);
        assert_eq!(spectrum.phase.len(), 65);
        assert!((spectrum.amplitude[8] - 1.0).abs() < 1e-9);
        assert!((spectrum.total_power() - 0.5).abs() < 1e-9);

        let text = report.to_text();
        assert!(text.contains("Spectrum: 65 bins, 0.0625 Hz apart, total power 0.5000"));
        assert!(text.contains("peak 1.0000 at 0.5000 Hz"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["spectrum"]["frequencies"][8], 0.5);
        assert_eq!(json["spectrum"]["psd"].as_array().unwrap().len(), 65);
    }

    #[test]
    fn test_serialization_failure_kind() {
        let err = AnalysisError::Report("Cannot serialize report: key must be a string".into());
        assert_eq!(err.to_string(), "Report error: Cannot serialize report: key must be a string");
        assert!(!matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_report_requires_valid_time_step() {
        let series = Series::new((0..30).map(|i| i as f64).collect(), None).unwrap();
        assert!(AnalysisReport::build(&series, "ramp", 0.0, &AnalysisConfig::default()).is_err());
    }
}
