/// Summary statistics of a recorded particle-count series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub samples: usize,
    pub mean: f64,
    /// Unbiased sample variance; zero for a single sample.
    pub variance: f64,
    /// Standard error of the mean from block averaging, if the series is long enough to be
    /// split into the requested number of blocks.
    pub std_error: Option<f64>,
}

impl SeriesSummary {
    /// Summarises `series`, estimating the standard error from `blocks` equal-length block
    /// means. Trailing samples that do not fill a block are ignored for the error estimate.
    ///
    /// Returns `None` for an empty series.
    pub fn from_counts(series: &[usize], blocks: usize) -> Option<Self> {
        let values: Vec<f64> = series.iter().map(|&n| n as f64).collect();
        Self::from_values(&values, blocks)
    }

    pub fn from_values(values: &[f64], blocks: usize) -> Option<Self> {
        let (mean, variance) = mean_and_variance(values)?;
        Some(Self {
            samples: values.len(),
            mean,
            variance,
            std_error: block_standard_error(values, blocks),
        })
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Mean and unbiased variance, or `None` for an empty slice.
pub fn mean_and_variance(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = if values.len() > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    Some((mean, variance))
}

/// Mean and standard error of independent estimates, e.g. the means of independent chains.
pub fn mean_and_standard_error(values: &[f64]) -> Option<(f64, f64)> {
    let (mean, variance) = mean_and_variance(values)?;
    Some((mean, (variance / values.len() as f64).sqrt()))
}

fn block_standard_error(values: &[f64], blocks: usize) -> Option<f64> {
    if blocks < 2 || values.len() < blocks {
        return None;
    }
    let block_len = values.len() / blocks;
    let block_means: Vec<f64> = values
        .chunks_exact(block_len)
        .take(blocks)
        .map(|block| block.iter().sum::<f64>() / block_len as f64)
        .collect();
    mean_and_standard_error(&block_means).map(|(_, err)| err)
}
