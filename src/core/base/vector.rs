use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::core::base::ranking::{compare_nan_aware, IndexedElement, Order, SortMode};
use crate::utils::errors::{KernelError, KernelResult};
use crate::utils::general::*;
use crate::{ensure_in_bounds, ensure_same_len};

/// Replacement magnitude for non-finite values at the ends of a ranked vector
pub const RANKED_INFINITY_ADJUSTMENT: f32 = 1e-6;

/// Fraction of |mean| used as the floor for the low standard deviation fix
pub const LOW_STDDEV_FRACTION: f64 = 0.20;

///////////
// Enums //
///////////

/// Which signs to keep when extracting from a vector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoreMode {
    /// Values `>= 0`
    PosOnly,
    /// Values `< 0`
    NegOnly,
    /// Every value
    PosAndNegTogether,
}

/// Parsing the score mode
///
/// ### Params
///
/// * `s` - string defining the score mode
///
/// ### Returns
///
/// The `ScoreMode`.
pub fn parse_score_mode(s: &str) -> Option<ScoreMode> {
    match s.to_lowercase().as_str() {
        "pos_only" | "positive" => Some(ScoreMode::PosOnly),
        "neg_only" | "negative" => Some(ScoreMode::NegOnly),
        "pos_and_neg_together" | "both" => Some(ScoreMode::PosAndNegTogether),
        _ => None,
    }
}

impl FromStr for ScoreMode {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_score_mode(s).ok_or_else(|| KernelError::UnknownVariant {
            kind: "score mode",
            token: s.to_string(),
        })
    }
}

impl fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ScoreMode::PosOnly => "pos_only",
            ScoreMode::NegOnly => "neg_only",
            ScoreMode::PosAndNegTogether => "pos_and_neg_together",
        };
        write!(f, "{}", token)
    }
}

/////////////
// Builder //
/////////////

/// Owned, mutable float vector
///
/// All mutation happens here. Calling [`VectorBuilder::freeze`] consumes the
/// builder and yields a read-only [`NumericVector`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorBuilder {
    data: Vec<f32>,
}

impl VectorBuilder {
    /// A builder of `n` zeroes
    pub fn zeros(n: usize) -> Self {
        Self::filled(n, 0.0)
    }

    /// A builder of `n` copies of `value`
    pub fn filled(n: usize, value: f32) -> Self {
        Self {
            data: vec![value; n],
        }
    }

    /// Take ownership of the values without copying
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Copy the values
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Copy double precision values, narrowing them to `f32`
    pub fn from_f64_slice(data: &[f64]) -> Self {
        Self {
            data: data.iter().map(|&x| x as f32).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Bounds-checked element access
    pub fn get(&self, index: usize) -> KernelResult<f32> {
        ensure_in_bounds!(index, self.data.len());
        Ok(self.data[index])
    }

    /// Bounds-checked element update
    pub fn set(&mut self, index: usize, value: f32) -> KernelResult<()> {
        ensure_in_bounds!(index, self.data.len());
        self.data[index] = value;
        Ok(())
    }

    /// Ascending sort with the ranking comparator, so NaN comes first
    pub fn sort(&mut self) {
        self.sort_by_mode(SortMode::Real, Order::Ascending);
    }

    /// Sort with the NaN aware element comparator
    ///
    /// ### Params
    ///
    /// * `mode` - Compare real or absolute values
    /// * `order` - Direction of the sort
    pub fn sort_by_mode(&mut self, mode: SortMode, order: Order) {
        let mut elements: Vec<IndexedElement> = self
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| IndexedElement::new(i, v as f64))
            .collect();
        elements.sort_by(|a, b| compare_nan_aware(Some(a), Some(b), mode, order));
        self.data = elements.iter().map(|e| e.value as f32).collect();
    }

    pub fn reverse(&mut self) {
        self.data.reverse();
    }

    /// Replace every value with its absolute value
    pub fn abs(&mut self) {
        self.data.iter_mut().for_each(|x| *x = x.abs());
    }

    /// Consume the builder into a frozen vector
    pub fn freeze(self) -> NumericVector {
        NumericVector::new(self.data)
    }
}

////////////////
// Aggregates //
////////////////

/// Summary statistics computed when a vector is frozen
///
/// ### Fields
///
/// * `mean` - Arithmetic mean (NaN if any element is NaN or empty)
/// * `variance` - Unbiased variance (`n - 1` denominator)
/// * `stddev` - Square root of `variance`
/// * `min` - Smallest non-NaN value
/// * `min_index` - First position of `min`
/// * `max` - Largest non-NaN value
/// * `max_index` - First position of `max`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregates {
    pub mean: f64,
    pub variance: f64,
    pub stddev: f64,
    pub min: f32,
    pub min_index: Option<usize>,
    pub max: f32,
    pub max_index: Option<usize>,
}

////////////
// Vector //
////////////

/// Read-only float vector with precomputed aggregates
///
/// There is no way to mutate a `NumericVector`; it has no setters and the
/// sort-like operations live on [`VectorBuilder`]:
///
/// ```compile_fail
/// use gsea_kernel::core::base::vector::NumericVector;
///
/// let v = NumericVector::from_slice(&[3.0, 1.0, 2.0]);
/// v.sort();
/// ```
#[derive(Debug)]
pub struct NumericVector {
    data: Vec<f32>,
    aggregates: Aggregates,
    sum_sq_dev: f64,
    nan_less: OnceLock<Box<NumericVector>>,
}

impl Clone for NumericVector {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            aggregates: self.aggregates,
            sum_sq_dev: self.sum_sq_dev,
            nan_less: OnceLock::new(),
        }
    }
}

impl PartialEq for NumericVector {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl NumericVector {
    fn new(data: Vec<f32>) -> Self {
        let n = data.len();
        let mean = if n == 0 {
            f64::NAN
        } else {
            sum_f64(&data) / n as f64
        };
        let sum_sq_dev: f64 = if n == 0 {
            f64::NAN
        } else {
            data.iter()
                .map(|&x| {
                    let d = x as f64 - mean;
                    d * d
                })
                .sum()
        };
        let variance = sum_sq_dev / (n as f64 - 1.0);
        let (min, min_index) = array_min_nan_safe(&data);
        let (max, max_index) = array_max_nan_safe(&data);

        Self {
            data,
            aggregates: Aggregates {
                mean,
                variance,
                stddev: variance.sqrt(),
                min,
                min_index,
                max,
                max_index,
            },
            sum_sq_dev,
            nan_less: OnceLock::new(),
        }
    }

    //////////////////
    // Constructors //
    //////////////////

    /// Freeze the values without copying
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self::new(data)
    }

    /// Freeze a copy of the values
    pub fn from_slice(data: &[f32]) -> Self {
        Self::new(data.to_vec())
    }

    /// Freeze a narrowed copy of double precision values
    pub fn from_f64_slice(data: &[f64]) -> Self {
        VectorBuilder::from_f64_slice(data).freeze()
    }

    /// Concatenate several vectors in the given order
    ///
    /// ### Params
    ///
    /// * `parts` - The vectors to join
    ///
    /// ### Returns
    ///
    /// A new vector of length equal to the summed lengths.
    pub fn concat(parts: &[&NumericVector]) -> Self {
        let total: usize = parts.iter().map(|p| p.len()).sum();
        let mut data = Vec::with_capacity(total);
        for part in parts {
            data.extend_from_slice(&part.data);
        }
        Self::new(data)
    }

    /// Copy of the first `len` elements
    ///
    /// ### Params
    ///
    /// * `len` - Number of leading elements to keep
    ///
    /// ### Returns
    ///
    /// The truncated copy, or `IndexOutOfRange` if `len` exceeds the size.
    pub fn prefix(&self, len: usize) -> KernelResult<Self> {
        if len > self.data.len() {
            return Err(KernelError::IndexOutOfRange {
                index: len,
                len: self.data.len() + 1,
            });
        }
        Ok(Self::new(self.data[..len].to_vec()))
    }

    /// An independent mutable copy
    pub fn to_builder(&self) -> VectorBuilder {
        VectorBuilder::from_slice(&self.data)
    }

    ///////////////
    // Accessors //
    ///////////////

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f32> {
        self.data.iter()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.data.clone()
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.data.iter().map(|&x| x as f64).collect()
    }

    /// Bounds-checked element access
    pub fn get(&self, index: usize) -> KernelResult<f32> {
        ensure_in_bounds!(index, self.data.len());
        Ok(self.data[index])
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    pub fn nan_count(&self) -> usize {
        self.data.iter().filter(|x| x.is_nan()).count()
    }

    ////////////////
    // Reductions //
    ////////////////

    /// Sum; NaN propagates
    pub fn sum(&self) -> f64 {
        sum_f64(&self.data)
    }

    /// Sum of the non-NaN values; NaN if there are none
    pub fn sum_nan_safe(&self) -> f64 {
        match sum_count_nan_safe(&self.data) {
            (_, 0) => f64::NAN,
            (s, _) => s,
        }
    }

    /// Sum of the squared values
    pub fn squaresum(&self) -> f64 {
        self.data.iter().map(|&x| (x as f64) * (x as f64)).sum()
    }

    pub fn mean(&self) -> f64 {
        self.aggregates.mean
    }

    /// Mean of the non-NaN values; NaN if there are none
    pub fn mean_nan_safe(&self) -> f64 {
        match sum_count_nan_safe(&self.data) {
            (_, 0) => f64::NAN,
            (s, n) => s / n as f64,
        }
    }

    /// Median of the non-NaN values; NaN if there are none
    pub fn median(&self) -> f64 {
        let clean: Vec<f32> = self.data.iter().copied().filter(|x| !x.is_nan()).collect();
        median_of_clean(&clean)
    }

    pub fn min(&self) -> f32 {
        self.aggregates.min
    }

    pub fn min_index(&self) -> Option<usize> {
        self.aggregates.min_index
    }

    pub fn max(&self) -> f32 {
        self.aggregates.max
    }

    pub fn max_index(&self) -> Option<usize> {
        self.aggregates.max_index
    }

    /// Largest absolute value (ignores NaN)
    pub fn max_dev_from_zero(&self) -> f32 {
        self.aggregates.max.abs().max(self.aggregates.min.abs())
    }

    /// Standard deviation
    ///
    /// ### Params
    ///
    /// * `biased` - Use `n` instead of `n - 1` as the denominator.
    /// * `fix_low` - Clamp the result to at least `0.20 * |mean|` (or `0.20`
    ///   when the mean is zero) so that near constant values do not blow up
    ///   ratios downstream.
    ///
    /// ### Returns
    ///
    /// The standard deviation. NaN for empty input, NaN-containing input or
    /// a single element with the unbiased denominator.
    pub fn stddev(&self, biased: bool, fix_low: bool) -> f64 {
        let n = self.data.len() as f64;
        let denominator = if biased { n } else { n - 1.0 };
        let stddev = (self.sum_sq_dev / denominator).sqrt();

        if !fix_low || stddev.is_nan() {
            return stddev;
        }

        let mean = self.aggregates.mean;
        let floor = if is_nearly_zero(mean) {
            LOW_STDDEV_FRACTION
        } else {
            LOW_STDDEV_FRACTION * mean.abs()
        };
        stddev.max(floor)
    }

    /// Variance; with `fix_low` the square of the clamped standard deviation
    ///
    /// ### Params
    ///
    /// * `biased` - Use `n` instead of `n - 1` as the denominator.
    /// * `fix_low` - See [`NumericVector::stddev`].
    pub fn variance(&self, biased: bool, fix_low: bool) -> f64 {
        if fix_low {
            return self.stddev(biased, true).powi(2);
        }
        let n = self.data.len() as f64;
        let denominator = if biased { n } else { n - 1.0 };
        self.sum_sq_dev / denominator
    }

    /////////////////
    // Derivations //
    /////////////////

    /// Keep only the values matching the score mode
    ///
    /// ### Params
    ///
    /// * `mode` - Which signs to keep. NaN is dropped by both signed modes.
    ///
    /// ### Returns
    ///
    /// A new vector; also for `PosAndNegTogether`.
    pub fn extract(&self, mode: ScoreMode) -> NumericVector {
        let data: Vec<f32> = match mode {
            ScoreMode::PosOnly => self.data.iter().copied().filter(|&x| x >= 0.0).collect(),
            ScoreMode::NegOnly => self.data.iter().copied().filter(|&x| x < 0.0).collect(),
            ScoreMode::PosAndNegTogether => self.data.clone(),
        };
        Self::new(data)
    }

    /// Replace non-finite runs at both ends of a rank-ordered vector
    ///
    /// Scans from the front and from the back until the first finite value.
    /// Infinities keep their sign, NaN becomes negative at the front and
    /// positive at the back. Values in the interior are untouched.
    ///
    /// ### Returns
    ///
    /// The adjusted copy.
    pub fn infinity_adjust_ranked(&self) -> NumericVector {
        let mut data = self.data.clone();
        let n = data.len();

        let mut head = 0;
        while head < n && !data[head].is_finite() {
            data[head] = if data[head] == f32::INFINITY {
                RANKED_INFINITY_ADJUSTMENT
            } else {
                -RANKED_INFINITY_ADJUSTMENT
            };
            head += 1;
        }

        let mut tail = n;
        while tail > head && !data[tail - 1].is_finite() {
            data[tail - 1] = if data[tail - 1] == f32::NEG_INFINITY {
                -RANKED_INFINITY_ADJUSTMENT
            } else {
                RANKED_INFINITY_ADJUSTMENT
            };
            tail -= 1;
        }

        Self::new(data)
    }

    /// The vector without its NaN values (order preserved, cached)
    pub fn nan_less(&self) -> &NumericVector {
        self.nan_less.get_or_init(|| {
            let clean: Vec<f32> = self.data.iter().copied().filter(|x| !x.is_nan()).collect();
            Box::new(Self::new(clean))
        })
    }
}

impl<'a> IntoIterator for &'a NumericVector {
    type Item = &'a f32;
    type IntoIter = std::slice::Iter<'a, f32>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Drop every position that is NaN in either of two paired vectors
///
/// ### Params
///
/// * `x` - First vector
/// * `y` - Second vector, same length as `x`
///
/// ### Returns
///
/// Tuple of the two aligned NaN-free vectors.
pub fn sync_nan_less(
    x: &NumericVector,
    y: &NumericVector,
) -> KernelResult<(NumericVector, NumericVector)> {
    ensure_same_len!(x, y);

    let (a, b): (Vec<f32>, Vec<f32>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip();

    Ok((NumericVector::from_vec(a), NumericVector::from_vec(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_aggregates() {
        let v = NumericVector::from_slice(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(approx(v.mean(), 5.0));
        assert!(approx(v.stddev(true, false), 2.0));
        assert!(approx(v.variance(false, false), 32.0 / 7.0));
        assert_eq!(v.min(), 2.0);
        assert_eq!(v.min_index(), Some(0));
        assert_eq!(v.max(), 9.0);
        assert_eq!(v.max_index(), Some(7));
        assert!(approx(v.sum(), 40.0));
        assert!(approx(v.squaresum(), 232.0));
    }

    #[test]
    fn test_nan_handling_in_reductions() {
        let v = NumericVector::from_slice(&[1.0, f32::NAN, 3.0]);
        assert!(v.sum().is_nan());
        assert!(v.mean().is_nan());
        assert!(approx(v.sum_nan_safe(), 4.0));
        assert!(approx(v.mean_nan_safe(), 2.0));
        assert_eq!(v.max(), 3.0);
        assert_eq!(v.max_index(), Some(2));

        let all_nan = NumericVector::from_slice(&[f32::NAN, f32::NAN]);
        assert!(all_nan.sum_nan_safe().is_nan());
        assert!(all_nan.mean_nan_safe().is_nan());
        assert!(all_nan.median().is_nan());
        assert_eq!(all_nan.max_index(), None);

        let empty = NumericVector::from_vec(Vec::new());
        assert!(empty.mean().is_nan());
        assert!(empty.median().is_nan());
        assert!(empty.stddev(false, true).is_nan());
    }

    #[test]
    fn test_median() {
        assert_eq!(NumericVector::from_slice(&[1.0, 2.0, 3.0, 4.0]).median(), 2.5);
        assert_eq!(NumericVector::from_slice(&[f32::NAN, 1.0, 2.0]).median(), 1.5);
    }

    #[test]
    fn test_fix_low_stddev() {
        // constant values have stddev 0, floor is 0.2 * |mean|
        let v = NumericVector::from_slice(&[10.0, 10.0, 10.0]);
        assert!(approx(v.stddev(false, false), 0.0));
        assert!(approx(v.stddev(false, true), 2.0));
        assert!(approx(v.variance(false, true), 4.0));

        // mean of zero uses the absolute floor
        let z = NumericVector::from_slice(&[0.0, 0.0]);
        assert!(approx(z.stddev(true, true), 0.2));

        // large spread is left alone
        let w = NumericVector::from_slice(&[1.0, 9.0]);
        assert!(approx(w.stddev(true, true), 4.0));
    }

    #[test]
    fn test_single_element_unbiased_is_nan() {
        let v = NumericVector::from_slice(&[3.0]);
        assert!(v.stddev(false, false).is_nan());
        assert!(v.stddev(false, true).is_nan());
        assert!(approx(v.stddev(true, false), 0.0));
    }

    #[test]
    fn test_get_out_of_range() {
        let v = NumericVector::from_slice(&[1.0, 2.0]);
        assert_eq!(v.get(1), Ok(2.0));
        let err = v.get(2).unwrap_err();
        assert_eq!(err, KernelError::IndexOutOfRange { index: 2, len: 2 });
        assert!(err.to_string().contains("0..2"));
    }

    #[test]
    fn test_builder_mutation_and_freeze() {
        let mut b = VectorBuilder::from_vec(vec![3.0, -1.0, f32::NAN, 2.0]);
        b.set(0, 5.0).unwrap();
        assert!(b.set(4, 1.0).is_err());
        b.sort();
        assert!(b.as_slice()[0].is_nan());
        assert_eq!(&b.as_slice()[1..], &[-1.0, 2.0, 5.0]);
        b.reverse();
        assert!(b.as_slice()[3].is_nan());
        b.abs();
        let v = b.freeze();
        assert_eq!(&v.as_slice()[..3], &[5.0, 2.0, 1.0]);
    }

    #[test]
    fn test_builder_sort_matches_ranking_order() {
        let values = [2.0, f32::NAN, -4.0, 0.5, f32::NAN];
        let mut plain = VectorBuilder::from_slice(&values);
        plain.sort();
        let mut ranked = VectorBuilder::from_slice(&values);
        ranked.sort_by_mode(SortMode::Real, Order::Ascending);

        let plain = plain.freeze();
        let ranked = ranked.freeze();
        assert_eq!(plain.nan_count(), 2);
        assert!(plain.as_slice()[..2].iter().all(|x| x.is_nan()));
        assert_eq!(&plain.as_slice()[2..], &ranked.as_slice()[2..]);
        assert_eq!(&plain.as_slice()[2..], &[-4.0, 0.5, 2.0]);
    }

    #[test]
    fn test_builder_sort_by_mode() {
        let mut b = VectorBuilder::from_slice(&[1.0, -3.0, 2.0]);
        b.sort_by_mode(SortMode::Absolute, Order::Descending);
        assert_eq!(b.as_slice(), &[-3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_to_builder_is_independent() {
        let v = NumericVector::from_slice(&[1.0, 2.0]);
        let mut b = v.to_builder();
        b.set(0, 9.0).unwrap();
        assert_eq!(v.as_slice(), &[1.0, 2.0]);
        assert_eq!(b.freeze().mean(), 5.5);
    }

    #[test]
    fn test_concat_and_prefix() {
        let a = NumericVector::from_slice(&[1.0, 2.0]);
        let b = NumericVector::from_slice(&[3.0]);
        let c = NumericVector::concat(&[&a, &b, &a]);
        assert_eq!(c.as_slice(), &[1.0, 2.0, 3.0, 1.0, 2.0]);
        assert_eq!(c.prefix(3).unwrap().as_slice(), &[1.0, 2.0, 3.0]);
        assert!(c.prefix(0).unwrap().is_empty());
        assert!(c.prefix(6).is_err());
    }

    #[test]
    fn test_extract() {
        let v = NumericVector::from_slice(&[1.0, -2.0, 0.0, f32::NAN, -0.5]);
        assert_eq!(v.extract(ScoreMode::PosOnly).as_slice(), &[1.0, 0.0]);
        assert_eq!(v.extract(ScoreMode::NegOnly).as_slice(), &[-2.0, -0.5]);
        assert_eq!(v.extract(ScoreMode::PosAndNegTogether).len(), 5);
    }

    #[test]
    fn test_infinity_adjust_ranked() {
        let v = NumericVector::from_slice(&[f32::NEG_INFINITY, 0.3, f32::NAN]);
        let adj = v.infinity_adjust_ranked();
        assert_eq!(adj.as_slice(), &[-0.000001, 0.3, 0.000001]);

        let w = NumericVector::from_slice(&[
            f32::INFINITY,
            f32::NAN,
            1.0,
            f32::NAN,
            2.0,
            -f32::INFINITY,
        ]);
        let adj = w.infinity_adjust_ranked();
        assert_eq!(adj.as_slice()[0], 1e-6);
        assert_eq!(adj.as_slice()[1], -1e-6);
        // interior NaN is not touched
        assert!(adj.as_slice()[3].is_nan());
        assert_eq!(adj.as_slice()[5], -1e-6);
    }

    #[test]
    fn test_nan_less() {
        let v = NumericVector::from_slice(&[f32::NAN, 1.0, f32::NAN, 2.0]);
        let clean = v.nan_less();
        assert_eq!(clean.as_slice(), &[1.0, 2.0]);
        assert_eq!(clean.len(), v.len() - v.nan_count());
        assert!(std::ptr::eq(clean, v.nan_less()));
    }

    #[test]
    fn test_sync_nan_less() {
        let x = NumericVector::from_slice(&[1.0, f32::NAN, 3.0, 4.0]);
        let y = NumericVector::from_slice(&[5.0, 6.0, f32::NAN, 8.0]);
        let (a, b) = sync_nan_less(&x, &y).unwrap();
        assert_eq!(a.as_slice(), &[1.0, 4.0]);
        assert_eq!(b.as_slice(), &[5.0, 8.0]);

        let short = NumericVector::from_slice(&[1.0]);
        assert_eq!(
            sync_nan_less(&x, &short).unwrap_err(),
            KernelError::LengthMismatch {
                lengths: vec![4, 1]
            }
        );
    }

    #[test]
    fn test_score_mode_parse() {
        assert_eq!("pos_only".parse::<ScoreMode>().unwrap(), ScoreMode::PosOnly);
        assert_eq!(ScoreMode::NegOnly.to_string(), "neg_only");
        assert!("up".parse::<ScoreMode>().is_err());
    }
}
