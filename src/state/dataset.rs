use crate::data::datetime::column_to_timestamps;
use crate::data::loader;
use crate::error::{AnalysisError, Result};
use crate::state::series::{split_label, Series};

/// All columns of a loaded table, column 0 being the time axis.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub series: Vec<Series>,
    /// Spacing of the first two samples of column 0. Uniform sampling is
    /// assumed from there on; see [`Dataset::is_uniformly_sampled`].
    pub time_step: f64,
}

impl Dataset {
    /// Build one series per raw column. Columns that are not numeric but hold
    /// dates are converted to Unix seconds.
    pub fn from_columns(columns: &[Vec<String>]) -> Result<Self> {
        if columns.is_empty() {
            return Err(AnalysisError::invalid("no columns to analyze"));
        }

        let series = columns
            .iter()
            .enumerate()
            .map(|(idx, tokens)| {
                column_to_series(tokens).map_err(|e| match e {
                    AnalysisError::InvalidInput(msg) => {
                        AnalysisError::InvalidInput(format!("column {idx}: {msg}"))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<Series>>>()?;

        let time = series[0].original();
        if time.len() < 2 {
            return Err(AnalysisError::invalid(
                "the time column needs at least two samples to estimate the time step",
            ));
        }
        let time_step = time[1] - time[0];

        let dataset = Self { series, time_step };
        if !dataset.is_uniformly_sampled(1e-6) {
            tracing::warn!(time_step, "time column is not uniformly sampled, spectra assume it is");
        }
        Ok(dataset)
    }

    /// Build from row-major records, as read straight from a CSV file.
    pub fn from_rows(rows: &[Vec<String>]) -> Result<Self> {
        loader::rows_to_columns(rows.to_vec())?.into_dataset()
    }

    /// Whether every spacing in column 0 matches `time_step` within `rel_tol`.
    pub fn is_uniformly_sampled(&self, rel_tol: f64) -> bool {
        let tol = rel_tol * self.time_step.abs().max(f64::MIN_POSITIVE);
        self.series[0]
            .original()
            .windows(2)
            .all(|w| ((w[1] - w[0]) - self.time_step).abs() <= tol)
    }

    pub fn time(&self) -> &Series {
        &self.series[0]
    }

    /// Look up a column by label, or by index when `key` is a number.
    pub fn find(&self, key: &str) -> Option<(usize, &Series)> {
        if let Ok(idx) = key.parse::<usize>() {
            return self.series.get(idx).map(|s| (idx, s));
        }
        self.series
            .iter()
            .enumerate()
            .find(|(_, s)| s.label() == Some(key))
    }
}

fn column_to_series(tokens: &[String]) -> Result<Series> {
    match Series::from_tokens(tokens) {
        Ok(series) => Ok(series),
        Err(numeric_err) => {
            if let Some(timestamps) = column_to_timestamps(tokens) {
                return Series::new(timestamps, None);
            }
            let (label, body) = split_label(tokens);
            match column_to_timestamps(body) {
                Some(timestamps) => Series::new(timestamps, label),
                None => Err(numeric_err),
            }
        }
    }
}
