use shelfwatch_core::{DomainError, DomainResult, Sku};

use crate::history::SalesRecord;

/// Descriptive statistics of a sales series.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SeriesStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n-1). Zero when fewer than two points.
    pub std_dev: f64,
}

impl SeriesStats {
    /// Statistics over the full series.
    ///
    /// An empty series has no mean and is reported as `InsufficientHistory`.
    pub fn from_series(sku: &Sku, series: &[SalesRecord]) -> DomainResult<Self> {
        if series.is_empty() {
            return Err(DomainError::InsufficientHistory(sku.clone()));
        }

        let xs: Vec<f64> = series.iter().map(|r| r.sales_count as f64).collect();
        let mean = mean(&xs);
        Ok(Self {
            count: xs.len(),
            mean,
            std_dev: stddev_sample(&xs, mean),
        })
    }

    /// Flat-zero fallback used when no history exists.
    pub fn flat_zero() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            std_dev: 0.0,
        }
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

fn stddev_sample(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    var.sqrt()
}
