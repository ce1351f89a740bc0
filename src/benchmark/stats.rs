//! Descriptive statistics and equal-width histograms.

use serde::Serialize;

/// Summary of one value series; every field but `count` is absent for an empty series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Ordered bins; each upper edge is exclusive except the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistogramBins {
    pub bins: Vec<HistogramBin>,
}

impl HistogramBins {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}

pub fn summarize(values: &[f64]) -> StatisticsSummary {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return StatisticsSummary::default();
    }
    sorted.sort_by(f64::total_cmp);
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    StatisticsSummary {
        count,
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        mean: Some(mean),
        median: median_sorted(&sorted),
    }
}

/// Median of an ascending slice; the two middle values are averaged for even lengths.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

/// Split `[min, max]` into `bin_count` equal-width bins and count the values in each.
pub fn histogram(values: &[f64], bin_count: usize) -> HistogramBins {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return HistogramBins::default();
    };

    if max <= min {
        return HistogramBins {
            bins: vec![HistogramBin {
                lower: min,
                upper: max,
                count: finite.len(),
            }],
        };
    }

    let bin_count = bin_count.max(1);
    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in finite {
        let mut idx = (((value - min) / width).floor() as usize).min(bin_count - 1);
        // The division can land one bin off an edge; the stored edges decide.
        while idx > 0 && value < bins[idx].lower {
            idx -= 1;
        }
        while idx + 1 < bin_count && value >= bins[idx + 1].lower {
            idx += 1;
        }
        bins[idx].count += 1;
    }
    HistogramBins { bins }
}
