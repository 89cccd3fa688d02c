use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::Value;

// ---------------------------------------------------------------------------
// Five-number summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// `None` when `values` is empty. NaNs must already be filtered out.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Rows labelled the way `describe()` labels them.
    pub fn rows(&self) -> [(&'static str, f64); 5] {
        [
            ("min", self.min),
            ("25%", self.q1),
            ("50%", self.median),
            ("75%", self.q3),
            ("max", self.max),
        ]
    }
}

/// Linear interpolation between the closest order statistics.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// What the histogram's y-axis means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    #[default]
    Count,
    Frequency,
    Density,
    Probability,
    Percent,
}

impl Stat {
    pub const ALL: [Stat; 5] = [
        Stat::Count,
        Stat::Frequency,
        Stat::Density,
        Stat::Probability,
        Stat::Percent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stat::Count => "count",
            Stat::Frequency => "frequency",
            Stat::Density => "density",
            Stat::Probability => "probability",
            Stat::Percent => "percent",
        }
    }

    fn height(self, count: usize, n: usize, width: f64) -> f64 {
        let count = count as f64;
        let n = n as f64;
        match self {
            Stat::Count => count,
            Stat::Frequency => count / width,
            Stat::Density => count / (n * width),
            Stat::Probability => count / n,
            Stat::Percent => 100.0 * count / n,
        }
    }

    /// Factor turning a probability density into this stat's units.
    fn density_scale(self, n: usize, width: f64) -> f64 {
        let n = n as f64;
        match self {
            Stat::Count => n * width,
            Stat::Frequency => n,
            Stat::Density => 1.0,
            Stat::Probability => width,
            Stat::Percent => 100.0 * width,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub left: f64,
    pub right: f64,
    pub count: usize,
    /// Bar height in the units of the requested [`Stat`].
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    pub bin_width: f64,
    pub n: usize,
    pub stat: Stat,
}

impl Histogram {
    /// Equal-width bins over `[min, max]`, the last bin closed on the right.
    /// A constant column gets the range `[v - 0.5, v + 0.5]`.
    ///
    /// Returns `None` for no values or zero bins.
    pub fn compute(values: &[f64], n_bins: usize, stat: Stat) -> Option<Self> {
        if values.is_empty() || n_bins == 0 {
            return None;
        }
        let (mut lo, mut hi) = min_max(values);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / n_bins as f64;

        let mut counts = vec![0usize; n_bins];
        for &v in values {
            let idx = (((v - lo) / (hi - lo)) * n_bins as f64).floor() as usize;
            counts[idx.min(n_bins - 1)] += 1;
        }

        let n = values.len();
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                left: lo + width * i as f64,
                right: if i + 1 == n_bins { hi } else { lo + width * (i + 1) as f64 },
                count,
                height: stat.height(count, n, width),
            })
            .collect();

        Some(Self {
            bins,
            bin_width: width,
            n,
            stat,
        })
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Number of points the density curve is evaluated at.
pub const KDE_GRID_POINTS: usize = 200;

/// Gaussian KDE with Scott's bandwidth, evaluated over the data range and
/// scaled to match a histogram drawn with `stat` and `bin_width`.
///
/// `None` when fewer than two values or zero variance.
pub fn kde_curve(values: &[f64], stat: Stat, bin_width: f64) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = var.sqrt();
    if std <= 0.0 || !std.is_finite() {
        return None;
    }

    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * PI).sqrt());
    let scale = stat.density_scale(n, bin_width);
    let (lo, hi) = min_max(values);
    let step = (hi - lo) / (KDE_GRID_POINTS - 1) as f64;

    let curve = (0..KDE_GRID_POINTS)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|&xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect();
    Some(curve)
}

// ---------------------------------------------------------------------------
// Categorical statistics
// ---------------------------------------------------------------------------

/// Occurrences of each distinct non-missing value, in first-appearance order.
pub fn category_counts(values: &[Value]) -> Vec<(Value, usize)> {
    let mut index: HashMap<&Value, usize> = HashMap::new();
    let mut counts: Vec<(Value, usize)> = Vec::new();
    for v in values.iter().filter(|v| !v.is_null()) {
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v, counts.len());
                counts.push((v.clone(), 1));
            }
        }
    }
    counts
}

/// Share of all rows held by each distinct non-missing value, most common
/// first. Shares sum to 1 only when nothing is missing.
pub fn value_proportions(values: &[Value]) -> Vec<(Value, f64)> {
    let mut counts = category_counts(values);
    let total = values.len();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(v, n)| (v, n as f64 / total as f64))
        .collect()
}

/// Mean of `numbers` per category, in first-appearance order of the
/// categories. Missing numbers are skipped; a category with none left
/// keeps its place with `None`.
pub fn category_means(categories: &[Value], numbers: &[Value]) -> Vec<(Value, Option<f64>)> {
    let order = category_counts(categories);
    let index: HashMap<&Value, usize> = order
        .iter()
        .enumerate()
        .map(|(i, (cat, _))| (cat, i))
        .collect();

    let mut sums = vec![(0.0, 0usize); order.len()];
    for (cat, num) in categories.iter().zip(numbers) {
        let (Some(&i), Some(x)) = (index.get(cat), num.as_f64()) else {
            continue;
        };
        sums[i].0 += x;
        sums[i].1 += 1;
    }

    order
        .iter()
        .zip(sums)
        .map(|((cat, _), (sum, n))| (cat.clone(), (n > 0).then(|| sum / n as f64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn five_number_summary_of_ages() {
        let summary = FiveNumberSummary::of(&[25.0, 30.0, 25.0]).unwrap();
        assert_eq!(summary.min, 25.0);
        assert_eq!(summary.median, 25.0);
        assert_eq!(summary.max, 30.0);
        assert_eq!(summary.q1, 25.0);
        assert_eq!(summary.q3, 27.5);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let summary = FiveNumberSummary::of(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(summary.q1, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q3, 3.25);
    }

    #[test]
    fn five_number_summary_of_nothing() {
        assert!(FiveNumberSummary::of(&[]).is_none());
    }

    #[test]
    fn histogram_honours_bin_count() {
        let values = [1.0, 2.0, 2.0, 3.0, 10.0];
        let hist = Histogram::compute(&values, 5, Stat::Count).unwrap();
        assert_eq!(hist.bins.len(), 5);
        assert_eq!(hist.bin_width, 1.8);
        let counts: Vec<usize> = hist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![3, 1, 0, 0, 1]);
        assert_eq!(hist.bins[4].right, 10.0);
    }

    #[test]
    fn constant_column_gets_unit_range() {
        let hist = Histogram::compute(&[4.0, 4.0], 10, Stat::Count).unwrap();
        assert_eq!(hist.bins[0].left, 3.5);
        assert_eq!(hist.bins[9].right, 4.5);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn stat_heights() {
        let values = [0.0, 0.0, 1.0, 2.0];
        let width = 2.0 / 2.0;
        let check = |stat: Stat, expected: [f64; 2]| {
            let hist = Histogram::compute(&values, 2, stat).unwrap();
            let heights: Vec<f64> = hist.bins.iter().map(|b| b.height).collect();
            assert_eq!(heights, expected.to_vec(), "{stat}");
        };
        check(Stat::Count, [2.0, 2.0]);
        check(Stat::Frequency, [2.0 / width, 2.0 / width]);
        check(Stat::Density, [0.5, 0.5]);
        check(Stat::Probability, [0.5, 0.5]);
        check(Stat::Percent, [50.0, 50.0]);
    }

    #[test]
    fn kde_needs_spread() {
        assert!(kde_curve(&[1.0], Stat::Density, 1.0).is_none());
        assert!(kde_curve(&[2.0, 2.0, 2.0], Stat::Density, 1.0).is_none());
    }

    #[test]
    fn kde_spans_data_range() {
        let values = [1.0, 2.0, 2.5, 4.0];
        let curve = kde_curve(&values, Stat::Density, 0.5).unwrap();
        assert_eq!(curve.len(), KDE_GRID_POINTS);
        assert_eq!(curve[0].0, 1.0);
        assert!((curve[KDE_GRID_POINTS - 1].0 - 4.0).abs() < 1e-9);
        assert!(curve.iter().all(|(_, y)| *y > 0.0));
    }

    #[test]
    fn kde_count_scale_is_density_times_n_width() {
        let values = [1.0, 2.0, 2.5, 4.0];
        let density = kde_curve(&values, Stat::Density, 0.5).unwrap();
        let count = kde_curve(&values, Stat::Count, 0.5).unwrap();
        for ((_, d), (_, c)) in density.iter().zip(&count) {
            assert!((c - d * 4.0 * 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn proportions_of_city() {
        let props = value_proportions(&[s("A"), s("B"), s("A")]);
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].0, s("A"));
        assert!((props[0].1 - 2.0 / 3.0).abs() < 1e-9);
        assert!((props[1].1 - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn proportions_count_missing_rows_in_total() {
        let props = value_proportions(&[s("A"), Value::Null, s("B"), s("B")]);
        assert_eq!(props, vec![(s("B"), 0.5), (s("A"), 0.25)]);
        assert!(value_proportions(&[Value::Null]).is_empty());
    }

    #[test]
    fn counts_keep_first_appearance_order() {
        let counts = category_counts(&[s("b"), s("a"), s("b"), Value::Null]);
        assert_eq!(counts, vec![(s("b"), 2), (s("a"), 1)]);
    }

    #[test]
    fn means_per_category() {
        let cats = [s("x"), s("y"), s("x"), s("z"), Value::Null];
        let nums = [
            Value::Integer(1),
            Value::Float(4.0),
            Value::Integer(3),
            Value::Null,
            Value::Integer(100),
        ];
        let means = category_means(&cats, &nums);
        assert_eq!(
            means,
            vec![(s("x"), Some(2.0)), (s("y"), Some(4.0)), (s("z"), None)]
        );
    }

    #[test]
    fn means_follow_category_discovery_order() {
        let cats = [s("A"), s("B"), s("C"), s("B")];
        let nums = [
            Value::Integer(1),
            Value::Null,
            Value::Integer(2),
            Value::Integer(3),
        ];
        let order: Vec<Value> = category_means(&cats, &nums).into_iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![s("A"), s("B"), s("C")]);
    }

    proptest! {
        #[test]
        fn five_numbers_are_ordered(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let s = FiveNumberSummary::of(&values).unwrap();
            prop_assert!(s.min <= s.q1);
            prop_assert!(s.q1 <= s.median);
            prop_assert!(s.median <= s.q3);
            prop_assert!(s.q3 <= s.max);
        }

        #[test]
        fn proportions_sum_to_one_without_gaps(cats in prop::collection::vec("[a-e]", 1..100)) {
            let values: Vec<Value> = cats.into_iter().map(Value::String).collect();
            let props = value_proportions(&values);
            let total: f64 = props.iter().map(|(_, p)| p).sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
            prop_assert!(props.iter().all(|(_, p)| (0.0..=1.0).contains(p)));
        }

        #[test]
        fn proportions_sum_to_present_share(
            cats in prop::collection::vec(prop::option::of("[a-e]"), 1..100),
        ) {
            let values: Vec<Value> = cats
                .into_iter()
                .map(|c| c.map(Value::String).unwrap_or(Value::Null))
                .collect();
            let present = values.iter().filter(|v| !v.is_null()).count() as f64;
            let total: f64 = value_proportions(&values).iter().map(|(_, p)| p).sum();
            prop_assert!((total - present / values.len() as f64).abs() < 1e-9);
        }

        #[test]
        fn histogram_has_exact_bin_count(
            values in prop::collection::vec(-1e3f64..1e3, 1..300),
            bins in 5usize..=100,
        ) {
            let hist = Histogram::compute(&values, bins, Stat::Count).unwrap();
            prop_assert_eq!(hist.bins.len(), bins);
            prop_assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        }
    }
}
