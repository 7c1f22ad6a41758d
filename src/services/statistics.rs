//! Rolling statistics over recent scores.

use serde::Serialize;

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); `0.0` below two samples.
pub fn std_dev(values: &[f64]) -> f64 {
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Summary of a pool of recent scores, ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStatistics {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Mean of the short window minus mean of the whole pool.
    ///
    /// Only present once the pool holds enough samples.
    pub trend: Option<f64>,
}

impl ScoreStatistics {
    /// Summarise `samples`, returning `None` when there are none.
    pub fn from_samples(
        samples: &[f64],
        short_window: usize,
        trend_min_samples: usize,
    ) -> Option<Self> {
        let avg = mean(samples)?;
        let trend = if samples.len() >= trend_min_samples && short_window > 0 {
            let start = samples.len().saturating_sub(short_window);
            mean(&samples[start..]).map(|short| short - avg)
        } else {
            None
        };

        Some(Self {
            count: samples.len(),
            mean: avg,
            std_dev: std_dev(samples),
            trend,
        })
    }

    /// True when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.mean.is_finite()
            && self.std_dev.is_finite()
            && self.trend.map_or(true, f64::is_finite)
    }
}
