//! Frequency-domain view of a series.
//!
//! `SpectralAnalysis` borrows the series and reads its current samples on
//! every call, so nothing here goes stale when the series is transformed.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::state::series::Series;

/// Every spectral view of a series, bin for bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub amplitude: Vec<f64>,
    pub phase: Vec<f64>,
    pub psd: Vec<f64>,
}

impl Spectrum {
    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }

    pub fn bin_width(&self) -> f64 {
        match self.frequencies.as_slice() {
            [f0, f1, ..] => f1 - f0,
            _ => 0.0,
        }
    }

    /// Integrated PSD, the variance of the signal.
    pub fn total_power(&self) -> f64 {
        self.psd.iter().sum::<f64>() * self.bin_width()
    }

    /// Bin with the largest non-DC amplitude, as `(frequency, amplitude)`.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.amplitude
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(k, &a)| (self.frequencies[k], a))
    }
}

/// Spectral transforms of a uniformly sampled series.
pub struct SpectralAnalysis<'a> {
    series: &'a Series,
    time_step: f64,
}

impl<'a> SpectralAnalysis<'a> {
    pub fn new(series: &'a Series, time_step: f64) -> Result<Self> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(AnalysisError::invalid(format!(
                "time step must be positive and finite, got {time_step}"
            )));
        }
        Ok(Self { series, time_step })
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.time_step
    }

    /// Non-negative frequency bins of a real FFT: `k / (n * dt)`, `k = 0..=n/2`.
    pub fn frequencies(&self) -> Vec<f64> {
        let n = self.series.count();
        let df = 1.0 / (n as f64 * self.time_step);
        (0..=n / 2).map(|k| k as f64 * df).collect()
    }

    /// FFT coefficients for the non-negative frequencies.
    pub fn fourier(&self) -> Vec<Complex64> {
        real_fft(self.series.current())
    }

    /// Single-sided amplitude spectrum `2 |X_k| / n`.
    pub fn amplitude(&self) -> Vec<f64> {
        let n = self.series.count() as f64;
        self.fourier().iter().map(|c| 2.0 * c.norm() / n).collect()
    }

    /// Phase angle of each coefficient, in radians.
    pub fn phase(&self) -> Vec<f64> {
        self.fourier().iter().map(|c| c.arg()).collect()
    }

    /// One-sided periodogram power spectral density.
    ///
    /// The mean is removed first and no taper is applied. Densities are
    /// scaled by `1 / (fs * n)` and doubled except at DC and, for even `n`,
    /// at Nyquist, so `sum(psd) * df` equals the signal variance.
    pub fn psd(&self) -> (Vec<f64>, Vec<f64>) {
        let data = self.series.current();
        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = data.iter().map(|v| v - mean).collect();

        let norm = 1.0 / (self.sample_rate() * n as f64);
        let density = real_fft(&centered)
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let p = c.norm_sqr() * norm;
                if k == 0 || (n % 2 == 0 && k == n / 2) {
                    p
                } else {
                    2.0 * p
                }
            })
            .collect();

        (self.frequencies(), density)
    }

    /// Amplitude, phase and PSD in one pass over the FFT.
    pub fn spectrum(&self) -> Spectrum {
        let n = self.series.count() as f64;
        let coeffs = self.fourier();
        let (frequencies, psd) = self.psd();
        Spectrum {
            frequencies,
            amplitude: coeffs.iter().map(|c| 2.0 * c.norm() / n).collect(),
            phase: coeffs.iter().map(|c| c.arg()).collect(),
            psd,
        }
    }

    /// Cumulative trapezoidal integral, same length as the series, starting at 0.
    pub fn integral(&self) -> Vec<f64> {
        let data = self.series.current();
        let mut out = Vec::with_capacity(data.len());
        let mut acc = 0.0;
        out.push(acc);
        for pair in data.windows(2) {
            acc += self.time_step * (pair[0] + pair[1]) / 2.0;
            out.push(acc);
        }
        out
    }

    /// Frequency of the strongest non-DC amplitude bin.
    pub fn dominant_frequency(&self) -> Option<f64> {
        let amplitude = self.amplitude();
        let (k, _) = amplitude
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
        self.frequencies().get(k).copied()
    }
}

fn real_fft(data: &[f64]) -> Vec<Complex64> {
    let n = data.len();
    let mut buffer: Vec<Complex64> = data.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    if n > 0 {
        let fft = FftPlanner::<f64>::new().plan_fft_forward(n);
        fft.process(&mut buffer);
    }
    buffer.truncate(n / 2 + 1);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(n: usize, dt: f64, freq: f64, amplitude: f64, offset: f64) -> Series {
        let samples = (0..n)
            .map(|i| offset + amplitude * (2.0 * PI * freq * i as f64 * dt).sin())
            .collect();
        Series::new(samples, Some("tone".to_string())).unwrap()
    }

    #[test]
    fn test_rejects_bad_time_step() {
        let series = tone(16, 0.1, 1.0, 1.0, 0.0);
        assert!(SpectralAnalysis::new(&series, 0.0).is_err());
        assert!(SpectralAnalysis::new(&series, f64::NAN).is_err());
        assert!(SpectralAnalysis::new(&series, -0.5).is_err());
    }

    #[test]
    fn test_frequency_bins() {
        let series = tone(8, 0.5, 0.25, 1.0, 0.0);
        let spec = SpectralAnalysis::new(&series, 0.5).unwrap();
        assert_eq!(spec.time_step(), 0.5);
        assert_eq!(spec.sample_rate(), 2.0);
        assert_eq!(spec.frequencies(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let odd = tone(9, 0.5, 0.25, 1.0, 0.0);
        let spec = SpectralAnalysis::new(&odd, 0.5).unwrap();
        assert_eq!(spec.frequencies().len(), 5);
        assert_eq!(spec.fourier().len(), 5);
    }

    #[test]
    fn test_amplitude_of_bin_centered_tone() {
        // 1000 samples at 1 kHz, 50 Hz lands exactly on bin 50.
        let series = tone(1000, 0.001, 50.0, 3.0, 0.0);
        let spec = SpectralAnalysis::new(&series, 0.001).unwrap();
        let amplitude = spec.amplitude();
        assert!((amplitude[50] - 3.0).abs() < 1e-9, "amplitude {}", amplitude[50]);
        assert!(amplitude[49] < 1e-9);
        assert_eq!(spec.dominant_frequency(), Some(50.0));
    }

    #[test]
    fn test_phase_of_sine() {
        let series = tone(64, 1.0 / 64.0, 4.0, 1.0, 0.0);
        let spec = SpectralAnalysis::new(&series, 1.0 / 64.0).unwrap();
        // sin has phase -pi/2 relative to cos.
        assert!((spec.phase()[4] + PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_psd_parseval() {
        let series = tone(256, 0.01, 7.0, 2.0, 5.0);
        let spec = SpectralAnalysis::new(&series, 0.01).unwrap();
        let (freqs, psd) = spec.psd();
        assert_eq!(freqs.len(), psd.len());
        let df = freqs[1] - freqs[0];
        let power: f64 = psd.iter().sum::<f64>() * df;
        let variance = crate::processing::statistics::variance(series.current()).unwrap();
        assert!((power - variance).abs() < 1e-9 * variance.max(1.0), "{power} vs {variance}");
        // The mean is removed before the transform.
        assert!(psd[0] < 1e-20);
    }

    #[test]
    fn test_spectrum_matches_individual_views() {
        let series = tone(128, 0.125, 0.5, 1.0, 0.0);
        let spec = SpectralAnalysis::new(&series, 0.125).unwrap();
        let spectrum = spec.spectrum();
        assert_eq!(spectrum.bin_count(), 65);
        assert_eq!(spectrum.bin_width(), 0.0625);
        assert_eq!(spectrum.amplitude, spec.amplitude());
        assert_eq!(spectrum.phase, spec.phase());
        assert_eq!(spectrum.psd, spec.psd().1);
        let (freq, amp) = spectrum.peak().unwrap();
        assert_eq!(freq, 0.5);
        assert!((amp - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_views_follow_current_samples() {
        let mut series = tone(64, 0.25, 0.5, 1.0, 0.0);
        let before = SpectralAnalysis::new(&series, 0.25).unwrap().amplitude();

        series.replace_current(vec![3.0; 64]).unwrap();
        let spec = SpectralAnalysis::new(&series, 0.25).unwrap();
        let after = spec.amplitude();
        assert_ne!(before, after);
        assert!((after[0] - 6.0).abs() < 1e-12);
        assert!(after[1..].iter().all(|a| a.abs() < 1e-12));
        assert_eq!(spec.integral()[1], 0.75);

        series.integrate(0.25).unwrap();
        let spec = SpectralAnalysis::new(&series, 0.25).unwrap();
        assert_eq!(series.current()[2], 1.5);
        assert_eq!(spec.integral()[1], 0.25 * (0.0 + 0.75) / 2.0);
    }

    #[test]
    fn test_integral_of_constant() {
        let series = Series::new(vec![2.0; 5], None).unwrap();
        let spec = SpectralAnalysis::new(&series, 0.5).unwrap();
        assert_eq!(spec.integral(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_integral_of_ramp() {
        let series = Series::new(vec![0.0, 1.0, 2.0, 3.0], None).unwrap();
        let spec = SpectralAnalysis::new(&series, 1.0).unwrap();
        assert_eq!(spec.integral(), vec![0.0, 0.5, 2.0, 4.5]);
    }
}
