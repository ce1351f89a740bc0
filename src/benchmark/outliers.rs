//! Salary floor and Tukey IQR fence.

use serde::Serialize;
use tracing::debug;

use super::PipelineConfig;

/// Quartiles and the fence derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fence {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Fence {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Items retained after filtering, in input order, with per-stage counts.
#[derive(Debug, Clone, Serialize)]
pub struct FilterResult<T> {
    pub kept: Vec<T>,
    pub total_in: usize,
    /// Items with no representative value; they pass both stages.
    pub without_value: usize,
    pub below_floor: usize,
    pub outside_fence: usize,
    /// `None` when the fence step was skipped (small sample or zero IQR).
    pub fence: Option<Fence>,
}

impl<T> FilterResult<T> {
    pub fn total_kept(&self) -> usize {
        self.kept.len()
    }

    pub fn after_floor(&self) -> usize {
        self.total_in - self.below_floor
    }
}

/// Linearly interpolated quantile of an ascending slice (position `p * (n - 1)`).
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = p.clamp(0.0, 1.0) * last as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    let frac = position - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Fence `[Q1 - k*IQR, Q3 + k*IQR]` over `values`.
///
/// `None` below `min_sample` values or when the quartiles coincide.
pub fn tukey_fence(values: &[f64], multiplier: f64, min_sample: usize) -> Option<Fence> {
    if values.len() < min_sample.max(1) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    if iqr <= 0.0 {
        return None;
    }
    Some(Fence {
        q1,
        q3,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Apply the floor, then the fence, keying each item by `value_of`.
pub fn filter_outliers<T, F>(items: Vec<T>, value_of: F, config: &PipelineConfig) -> FilterResult<T>
where
    F: Fn(&T) -> Option<f64>,
{
    let total_in = items.len();
    let without_value = items.iter().filter(|item| value_of(*item).is_none()).count();

    let (above_floor, below): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| value_of(item).map_or(true, |v| v >= config.salary_floor));

    let remaining: Vec<f64> = above_floor.iter().filter_map(&value_of).collect();
    let fence = tukey_fence(&remaining, config.fence_multiplier, config.min_fence_sample).map(
        |fence| Fence {
            lower: fence.lower.max(config.salary_floor),
            ..fence
        },
    );

    let kept: Vec<T> = match fence {
        Some(fence) => above_floor
            .into_iter()
            .filter(|item| value_of(item).map_or(true, |v| fence.contains(v)))
            .collect(),
        None => above_floor,
    };
    let outside_fence = total_in - below.len() - kept.len();

    debug!(
        total_in,
        without_value,
        below_floor = below.len(),
        outside_fence,
        fenced = fence.is_some(),
        "filtered salary outliers"
    );

    FilterResult {
        kept,
        total_in,
        without_value,
        below_floor: below.len(),
        outside_fence,
        fence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn fence_needs_minimum_sample() {
        assert!(tukey_fence(&[1.0, 2.0, 300.0], 1.5, 4).is_none());
        assert!(tukey_fence(&[1.0, 2.0, 3.0, 300.0], 1.5, 4).is_some());
    }

    #[test]
    fn coinciding_quartiles_give_no_fence() {
        assert!(tukey_fence(&[7.0, 7.0, 7.0, 7.0, 7.0, 40.0], 1.5, 4).is_none());
    }

    #[test]
    fn reported_fence_never_dips_below_the_floor() {
        let config = PipelineConfig::default();
        // Q1 750, Q3 1150: the raw lower bound is 150
        let values = vec![600.0, 700.0, 900.0, 1000.0, 1200.0, 5000.0];
        let result = filter_outliers(values, |v| Some(*v), &config);
        let fence = result.fence.expect("fence applies");
        assert_eq!(fence.lower, 500.0);
        assert_eq!(result.kept, vec![600.0, 700.0, 900.0, 1000.0, 1200.0]);
    }

    #[test]
    fn filtering_preserves_input_order() {
        let config = PipelineConfig {
            salary_floor: 0.0,
            ..PipelineConfig::default()
        };
        let items = vec![5.0, 1.0, 4.0, 2.0, 3.0, 400.0];
        let result = filter_outliers(items, |v| Some(*v), &config);
        assert_eq!(result.kept, vec![5.0, 1.0, 4.0, 2.0, 3.0]);
        assert_eq!(result.outside_fence, 1);
    }
}
