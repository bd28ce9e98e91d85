use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use rustc_hash::{FxBuildHasher, FxHashSet};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::core::base::matrix::NumericMatrix;
use crate::core::base::vector::NumericVector;
use crate::utils::errors::{KernelError, KernelResult};
use crate::utils::general::median_of_clean;

/////////////////////
// Enums | Helpers //
/////////////////////

/// Per-gene class contrast used to rank genes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RankingMetric {
    /// `(center_a - center_b) / (sd_a + sd_b)`
    SignalToNoise,
    /// Welch style t statistic
    TTest,
    /// `center_a / center_b`
    RatioOfClasses,
    /// `center_a - center_b`
    DiffOfClasses,
    /// `log2(center_a / center_b)`
    Log2RatioOfClasses,
}

/// Helper function to get the ranking metric
///
/// ### Params
///
/// * `s` - String, name of the metric.
///
/// ### Returns
///
/// Option of the `RankingMetric`
pub fn parse_ranking_metric(s: &str) -> Option<RankingMetric> {
    match s.to_lowercase().as_str() {
        "signal2noise" | "signal_to_noise" => Some(RankingMetric::SignalToNoise),
        "ttest" | "t_test" => Some(RankingMetric::TTest),
        "ratio_of_classes" => Some(RankingMetric::RatioOfClasses),
        "diff_of_classes" => Some(RankingMetric::DiffOfClasses),
        "log2_ratio_of_classes" => Some(RankingMetric::Log2RatioOfClasses),
        _ => None,
    }
}

impl FromStr for RankingMetric {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_ranking_metric(s).ok_or_else(|| KernelError::UnknownVariant {
            kind: "ranking metric",
            token: s.to_string(),
        })
    }
}

impl fmt::Display for RankingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            RankingMetric::SignalToNoise => "signal2noise",
            RankingMetric::TTest => "ttest",
            RankingMetric::RatioOfClasses => "ratio_of_classes",
            RankingMetric::DiffOfClasses => "diff_of_classes",
            RankingMetric::Log2RatioOfClasses => "log2_ratio_of_classes",
        };
        write!(f, "{}", token)
    }
}

////////////
// Params //
////////////

/// Structure to store two-sample test params
///
/// ### Fields
///
/// * `use_biased` - Use `n` instead of `n - 1` for the variances
/// * `use_median` - Use the median instead of the mean as class center
/// * `fix_low` - Clamp small standard deviations (see
///   [`NumericVector::stddev`])
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TwoSampleParams {
    pub use_biased: bool,
    pub use_median: bool,
    pub fix_low: bool,
}

impl Default for TwoSampleParams {
    fn default() -> Self {
        Self {
            use_biased: false,
            use_median: false,
            fix_low: true,
        }
    }
}

/// Structure for the Mann-Whitney U test results
///
/// ### Fields
///
/// * `u` - The U statistic of the hit group
/// * `z` - Normal approximation Z-score of `u`
/// * `p_value` - Two-sided p-value of `z`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MannWhitneyResult {
    pub u: f64,
    pub z: f64,
    pub p_value: f64,
}

/////////////
// Helpers //
/////////////

/// Class center over the non-NaN values
#[inline]
fn center(x: &NumericVector, use_median: bool) -> f64 {
    let clean = x.nan_less();
    if use_median {
        clean.median()
    } else {
        clean.mean()
    }
}

/// Median of a slice the caller guarantees to be NaN free
///
/// ### Params
///
/// * `x` - The values, without NaN
///
/// ### Returns
///
/// The median; NaN for an empty slice. NaN in the input gives an undefined
/// (but non-panicking) result.
pub fn median_nan_unsafe(x: &[f32]) -> f64 {
    median_of_clean(x)
}

///////////////////////
// Two-sample scores //
///////////////////////

/// Signal to noise ratio of two classes
///
/// ### Params
///
/// * `x` - Values of the first class
/// * `y` - Values of the second class
/// * `params` - The `TwoSampleParams`
///
/// ### Returns
///
/// `(center_x - center_y) / (sd_x + sd_y)`, computed on the non-NaN values.
pub fn signal_to_noise(x: &NumericVector, y: &NumericVector, params: &TwoSampleParams) -> f64 {
    let (x, y) = (x.nan_less(), y.nan_less());
    let sd_x = x.stddev(params.use_biased, params.fix_low);
    let sd_y = y.stddev(params.use_biased, params.fix_low);

    (center(x, params.use_median) - center(y, params.use_median)) / (sd_x + sd_y)
}

/// T statistic of two classes
///
/// ### Params
///
/// * `x` - Values of the first class
/// * `y` - Values of the second class
/// * `params` - The `TwoSampleParams`
///
/// ### Returns
///
/// `(center_x - center_y) / sqrt(var_x / n_x + var_y / n_y)`, computed on the
/// non-NaN values.
pub fn t_test(x: &NumericVector, y: &NumericVector, params: &TwoSampleParams) -> f64 {
    let (x, y) = (x.nan_less(), y.nan_less());
    let var_x = x.variance(params.use_biased, params.fix_low);
    let var_y = y.variance(params.use_biased, params.fix_low);
    let standard_error = (var_x / x.len() as f64 + var_y / y.len() as f64).sqrt();

    (center(x, params.use_median) - center(y, params.use_median)) / standard_error
}

/// Two-sided p-value of the t statistic (Welch-Satterthwaite degrees of
/// freedom)
///
/// ### Params
///
/// * `x` - Values of the first class
/// * `y` - Values of the second class
/// * `params` - The `TwoSampleParams`
///
/// ### Returns
///
/// The p-value; NaN if the degrees of freedom are undefined.
pub fn t_test_p_value(x: &NumericVector, y: &NumericVector, params: &TwoSampleParams) -> f64 {
    let t = t_test(x, y, params);

    let (x, y) = (x.nan_less(), y.nan_less());
    let (n_x, n_y) = (x.len() as f64, y.len() as f64);
    let a = x.variance(params.use_biased, params.fix_low) / n_x;
    let b = y.variance(params.use_biased, params.fix_low) / n_y;
    let df = (a + b).powi(2) / (a.powi(2) / (n_x - 1.0) + b.powi(2) / (n_y - 1.0));

    if t.is_nan() || !df.is_finite() || df <= 0.0 {
        return f64::NAN;
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    }
}

/// Score two classes with the given ranking metric
///
/// ### Params
///
/// * `metric` - The `RankingMetric`
/// * `x` - Values of the first class
/// * `y` - Values of the second class
/// * `params` - The `TwoSampleParams`
///
/// ### Returns
///
/// The score.
pub fn ranking_score(
    metric: RankingMetric,
    x: &NumericVector,
    y: &NumericVector,
    params: &TwoSampleParams,
) -> f64 {
    match metric {
        RankingMetric::SignalToNoise => signal_to_noise(x, y, params),
        RankingMetric::TTest => t_test(x, y, params),
        RankingMetric::RatioOfClasses => {
            center(x, params.use_median) / center(y, params.use_median)
        }
        RankingMetric::DiffOfClasses => center(x, params.use_median) - center(y, params.use_median),
        RankingMetric::Log2RatioOfClasses => {
            (center(x, params.use_median) / center(y, params.use_median)).log2()
        }
    }
}

/// Mann-Whitney U test of a set of hits within a ranked population
///
/// ### Params
///
/// * `hit_positions` - 0-based rank positions of the hits
/// * `total` - Size of the ranked population
///
/// ### Returns
///
/// The `MannWhitneyResult`; all fields NaN if either group is empty. Fails on
/// positions `>= total` or repeated positions.
pub fn mann_whitney_u(hit_positions: &[usize], total: usize) -> KernelResult<MannWhitneyResult> {
    let mut seen: FxHashSet<usize> =
        FxHashSet::with_capacity_and_hasher(hit_positions.len(), FxBuildHasher);
    for &pos in hit_positions {
        if pos >= total {
            return Err(KernelError::IndexOutOfRange {
                index: pos,
                len: total,
            });
        }
        if !seen.insert(pos) {
            return Err(KernelError::DuplicateIndex { index: pos });
        }
    }

    let n1 = hit_positions.len() as f64;
    let n2 = (total - hit_positions.len()) as f64;
    if n1 == 0.0 || n2 == 0.0 {
        return Ok(MannWhitneyResult {
            u: f64::NAN,
            z: f64::NAN,
            p_value: f64::NAN,
        });
    }

    let r1: f64 = hit_positions.iter().map(|&p| (p + 1) as f64).sum();
    let u = r1 - n1 * (n1 + 1.0) / 2.0;

    let mean = n1 * n2 / 2.0;
    let variance = n1 * n2 * (n1 + n2 + 1.0) / 12.0;
    let z = (u - mean) / variance.sqrt();

    let normal = Normal::standard();
    let p_value = 2.0 * (1.0 - normal.cdf(z.abs()));

    Ok(MannWhitneyResult { u, z, p_value })
}

//////////////////
// Significance //
//////////////////

/// Fraction of the null distribution strictly greater than the score
///
/// ### Params
///
/// * `score` - The observed score
/// * `null_distribution` - Scores under the null; NaN entries are ignored
///
/// ### Returns
///
/// The empirical p-value; NaN if the score is NaN or no null value is usable.
pub fn empirical_p_value(score: f64, null_distribution: &NumericVector) -> f64 {
    empirical_fraction(score, null_distribution, |null, s| null > s)
}

/// Fraction of the null distribution strictly less than the score
///
/// See [`empirical_p_value`].
pub fn empirical_p_value_less_than(score: f64, null_distribution: &NumericVector) -> f64 {
    empirical_fraction(score, null_distribution, |null, s| null < s)
}

fn empirical_fraction<F>(score: f64, null_distribution: &NumericVector, beyond: F) -> f64
where
    F: Fn(f64, f64) -> bool,
{
    if score.is_nan() {
        return f64::NAN;
    }
    let (n_valid, n_beyond) = null_distribution
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0_usize, 0_usize), |(n, b), &x| {
            (n + 1, b + beyond(x as f64, score) as usize)
        });

    if n_valid == 0 {
        return f64::NAN;
    }
    n_beyond as f64 / n_valid as f64
}

/// Family-wise error rate of a score
///
/// Each permutation column is reduced to its most extreme value (max for the
/// positive tail, min for the negative tail) and the score is ranked against
/// those extremes.
///
/// ### Params
///
/// * `score` - The observed score
/// * `permutation_matrix` - Permuted scores; rows are gene sets, columns are
///   permutations
/// * `positive_tail` - Score the positive (`true`) or negative tail
///
/// ### Returns
///
/// The FWER.
pub fn fwer(score: f64, permutation_matrix: &NumericMatrix, positive_tail: bool) -> f64 {
    if positive_tail {
        empirical_p_value(score, permutation_matrix.column_maxes())
    } else {
        empirical_p_value_less_than(score, permutation_matrix.column_mins())
    }
}

/// FWER for many scores against the same permutation matrix
///
/// ### Params
///
/// * `scores` - The observed scores
/// * `permutation_matrix` - Permuted scores; rows are gene sets, columns are
///   permutations
/// * `positive_tail` - Score the positive (`true`) or negative tail
///
/// ### Returns
///
/// One FWER per score.
pub fn fwer_all(
    scores: &[f64],
    permutation_matrix: &NumericMatrix,
    positive_tail: bool,
) -> Vec<f64> {
    tracing::debug!(
        n_scores = scores.len(),
        n_perm = permutation_matrix.ncols(),
        positive_tail,
        "computing FWER"
    );
    scores
        .iter()
        .map(|&s| fwer(s, permutation_matrix, positive_tail))
        .collect()
}

////////////////////////
// Cohort aggregation //
////////////////////////

/// Apply a reduction to the non-NaN values found at each position
///
/// ### Params
///
/// * `vectors` - The cohort; all vectors must share a length
/// * `reduce` - Called with the non-NaN values of one position (never empty)
///
/// ### Returns
///
/// The per-position results; NaN where every vector is NaN.
fn cohort_reduce<F>(vectors: &[NumericVector], reduce: F) -> KernelResult<NumericVector>
where
    F: Fn(&[f32]) -> f32 + Sync,
{
    let first = vectors.first().ok_or(KernelError::EmptyCohort)?;
    let len = first.len();
    if vectors.iter().any(|v| v.len() != len) {
        return Err(KernelError::LengthMismatch {
            lengths: vectors.iter().map(|v| v.len()).collect(),
        });
    }

    let res: Vec<f32> = (0..len)
        .into_par_iter()
        .map(|pos| {
            let values: Vec<f32> = vectors
                .iter()
                .map(|v| v.as_slice()[pos])
                .filter(|x| !x.is_nan())
                .collect();
            if values.is_empty() {
                f32::NAN
            } else {
                reduce(&values)
            }
        })
        .collect();

    Ok(NumericVector::from_vec(res))
}

/// Per-position mean over the vectors, excluding NaN from the denominator
pub fn cohort_mean(vectors: &[NumericVector]) -> KernelResult<NumericVector> {
    cohort_reduce(vectors, |values| {
        (values.iter().map(|&x| x as f64).sum::<f64>() / values.len() as f64) as f32
    })
}

/// Per-position sum over the vectors, excluding NaN
pub fn cohort_sum(vectors: &[NumericVector]) -> KernelResult<NumericVector> {
    cohort_reduce(vectors, |values| {
        values.iter().map(|&x| x as f64).sum::<f64>() as f32
    })
}

/// Per-position maximum over the vectors, excluding NaN
pub fn cohort_max(vectors: &[NumericVector]) -> KernelResult<NumericVector> {
    cohort_reduce(vectors, |values| values.iter().copied().fold(values[0], f32::max))
}

/// Per-position value of largest magnitude, sign preserved
///
/// On equal magnitudes the value from the earlier vector wins.
pub fn cohort_signed_abs_max(vectors: &[NumericVector]) -> KernelResult<NumericVector> {
    cohort_reduce(vectors, |values| {
        values
            .iter()
            .copied()
            .fold(values[0], |best, x| if x.abs() > best.abs() { x } else { best })
    })
}
