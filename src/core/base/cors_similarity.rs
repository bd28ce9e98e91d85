use std::fmt;
use std::str::FromStr;

use faer::Mat;
use rayon::prelude::*;

use crate::core::base::matrix::NumericMatrix;
use crate::core::base::ranking::rank_vector;
use crate::core::base::vector::{sync_nan_less, NumericVector};
use crate::utils::errors::{KernelError, KernelResult};

/// Paired observations needed before a metric is defined
pub const MIN_PAIRED_OBSERVATIONS: usize = 2;

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// Distance/similarity metric enum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    /// L2 norm of the difference
    Euclidean,
    /// L1 norm of the difference
    Manhattan,
    /// One minus the cosine similarity
    Cosine,
    /// Pearson correlation
    Pearson,
    /// Spearman rank correlation
    Spearman,
}

////////////
// Params //
////////////

/// Parsing the distance metric
///
/// ### Params
///
/// * `s` - string defining the metric
///
/// ### Returns
///
/// The `DistanceMetric`.
pub fn parse_distance_metric(s: &str) -> Option<DistanceMetric> {
    match s.to_lowercase().as_str() {
        "euclidean" => Some(DistanceMetric::Euclidean),
        "manhattan" => Some(DistanceMetric::Manhattan),
        "cosine" => Some(DistanceMetric::Cosine),
        "pearson" => Some(DistanceMetric::Pearson),
        "spearman" => Some(DistanceMetric::Spearman),
        _ => None,
    }
}

impl FromStr for DistanceMetric {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_distance_metric(s).ok_or_else(|| KernelError::UnknownVariant {
            kind: "distance metric",
            token: s.to_string(),
        })
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Pearson => "pearson",
            DistanceMetric::Spearman => "spearman",
        };
        write!(f, "{}", token)
    }
}

/////////////
// Helpers //
/////////////

/// NaN-synced pairs in double precision, `None` if too few survive
fn paired_values(
    x: &NumericVector,
    y: &NumericVector,
) -> KernelResult<Option<(Vec<f64>, Vec<f64>)>> {
    let (x, y) = sync_nan_less(x, y)?;
    if x.len() < MIN_PAIRED_OBSERVATIONS {
        return Ok(None);
    }
    Ok(Some((x.to_f64_vec(), y.to_f64_vec())))
}

/// Pearson correlation of two clean, equal-length slices
fn pearson_clean(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0_f64;
    let mut ss_x = 0_f64;
    let mut ss_y = 0_f64;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        ss_x += dx * dx;
        ss_y += dy * dy;
    }

    cov / (ss_x * ss_y).sqrt()
}

//////////////////////
// Vector functions //
//////////////////////

/// Euclidean distance over the positions valid in both vectors
///
/// ### Params
///
/// * `x` - First vector
/// * `y` - Second vector, same length as `x`
///
/// ### Returns
///
/// The distance; NaN if fewer than two pairs survive.
pub fn euclidean(x: &NumericVector, y: &NumericVector) -> KernelResult<f64> {
    Ok(paired_values(x, y)?
        .map(|(x, y)| {
            x.iter()
                .zip(y.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .unwrap_or(f64::NAN))
}

/// Manhattan distance over the positions valid in both vectors
///
/// ### Params
///
/// * `x` - First vector
/// * `y` - Second vector, same length as `x`
///
/// ### Returns
///
/// The distance; NaN if fewer than two pairs survive.
pub fn manhattan(x: &NumericVector, y: &NumericVector) -> KernelResult<f64> {
    Ok(paired_values(x, y)?
        .map(|(x, y)| x.iter().zip(y.iter()).map(|(a, b)| (a - b).abs()).sum())
        .unwrap_or(f64::NAN))
}

/// Cosine distance, i.e. `1 - cosine similarity`
///
/// ### Params
///
/// * `x` - First vector
/// * `y` - Second vector, same length as `x`
///
/// ### Returns
///
/// `0` for identical directions, `2` for opposite ones. NaN if fewer than
/// two pairs survive or either vector has zero norm.
pub fn cosine(x: &NumericVector, y: &NumericVector) -> KernelResult<f64> {
    Ok(paired_values(x, y)?
        .map(|(x, y)| {
            let dot: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
            let norm_x = x.iter().map(|a| a * a).sum::<f64>().sqrt();
            let norm_y = y.iter().map(|b| b * b).sum::<f64>().sqrt();
            let denominator = norm_x * norm_y;
            if denominator == 0.0 {
                f64::NAN
            } else {
                1.0 - dot / denominator
            }
        })
        .unwrap_or(f64::NAN))
}

/// Pearson correlation over the positions valid in both vectors
///
/// ### Params
///
/// * `x` - First vector
/// * `y` - Second vector, same length as `x`
///
/// ### Returns
///
/// The correlation; NaN if fewer than two pairs survive or one side is
/// constant.
pub fn pearson(x: &NumericVector, y: &NumericVector) -> KernelResult<f64> {
    Ok(paired_values(x, y)?
        .map(|(x, y)| pearson_clean(&x, &y))
        .unwrap_or(f64::NAN))
}

/// Spearman rank correlation over the positions valid in both vectors
///
/// If either vector has tied values the Pearson correlation of the
/// tie-averaged ranks is returned, otherwise the closed form
/// `1 - 6 * sum(d^2) / (n * (n^2 - 1))`.
///
/// ### Params
///
/// * `x` - First vector
/// * `y` - Second vector, same length as `x`
///
/// ### Returns
///
/// The correlation; NaN if fewer than two pairs survive.
pub fn spearman(x: &NumericVector, y: &NumericVector) -> KernelResult<f64> {
    let (x, y) = sync_nan_less(x, y)?;
    if x.len() < MIN_PAIRED_OBSERVATIONS {
        return Ok(f64::NAN);
    }

    let rank_x = rank_vector(&x)?;
    let rank_y = rank_vector(&y)?;

    if rank_x.has_ties || rank_y.has_ties {
        return Ok(pearson_clean(&rank_x.ranks, &rank_y.ranks));
    }

    Ok(spearman_no_ties(&rank_x.ranks, &rank_y.ranks))
}

/// Closed-form Spearman for tie-free ranks
///
/// ### Params
///
/// * `rank_x` - Ranks of the first vector
/// * `rank_y` - Ranks of the second vector
///
/// ### Returns
///
/// `1 - 6 * sum(d^2) / (n * (n^2 - 1))`
pub fn spearman_no_ties(rank_x: &[f64], rank_y: &[f64]) -> f64 {
    let n = rank_x.len() as f64;
    let sum_d_sq: f64 = rank_x
        .iter()
        .zip(rank_y.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    1.0 - 6.0 * sum_d_sq / (n * (n * n - 1.0))
}

/// Dispatch to the metric
pub fn distance(metric: DistanceMetric, x: &NumericVector, y: &NumericVector) -> KernelResult<f64> {
    match metric {
        DistanceMetric::Euclidean => euclidean(x, y),
        DistanceMetric::Manhattan => manhattan(x, y),
        DistanceMetric::Cosine => cosine(x, y),
        DistanceMetric::Pearson => pearson(x, y),
        DistanceMetric::Spearman => spearman(x, y),
    }
}

////////////////////
// Row matrix ops //
////////////////////

/// Pairwise metric between all rows of a matrix
///
/// ### Params
///
/// * `mat` - The matrix; rows are the observations (e.g. genes)
/// * `metric` - The metric to apply
///
/// ### Returns
///
/// The symmetric `nrows x nrows` result. The diagonal holds the metric of a
/// row with itself.
pub fn row_distance_matrix(
    mat: &NumericMatrix,
    metric: DistanceMetric,
) -> KernelResult<NumericMatrix> {
    let nrows = mat.nrows();
    let rows: Vec<NumericVector> = (0..nrows)
        .map(|i| mat.row(i))
        .collect::<KernelResult<_>>()?;

    let pairs: Vec<(usize, usize)> = (0..nrows)
        .flat_map(|i| (i..nrows).map(move |j| (i, j)))
        .collect();

    let results: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| distance(metric, &rows[i], &rows[j]).map(|d| (i, j, d)))
        .collect::<KernelResult<_>>()?;

    let mut res: Mat<f32> = Mat::from_fn(nrows, nrows, |_, _| 0_f32);
    for (i, j, dist) in results {
        res[(i, j)] = dist as f32;
        res[(j, i)] = dist as f32;
    }

    Ok(NumericMatrix::from_mat(res))
}
