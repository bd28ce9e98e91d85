/// Tolerance under which a mean is treated as zero by the low-stddev fix.
pub const NEARLY_ZERO_EPS: f64 = 1e-9;

//////////////////
// VECTOR STUFF //
//////////////////

/// Get the maximum value of an array and its position, ignoring NaN
///
/// ### Params
///
/// * `arr` - The array of values
///
/// ### Returns
///
/// Tuple of the maximum and its first position. `(NaN, None)` if the array
/// is empty or only holds NaN.
pub fn array_max_nan_safe(arr: &[f32]) -> (f32, Option<usize>) {
    let mut res: (f32, Option<usize>) = (f32::NAN, None);
    for (i, &number) in arr.iter().enumerate() {
        if number.is_nan() {
            continue;
        }
        match res.1 {
            Some(_) if number <= res.0 => {}
            _ => res = (number, Some(i)),
        }
    }
    res
}

/// Get the minimum value of an array and its position, ignoring NaN
///
/// ### Params
///
/// * `arr` - The array of values
///
/// ### Returns
///
/// Tuple of the minimum and its first position. `(NaN, None)` if the array
/// is empty or only holds NaN.
pub fn array_min_nan_safe(arr: &[f32]) -> (f32, Option<usize>) {
    let mut res: (f32, Option<usize>) = (f32::NAN, None);
    for (i, &number) in arr.iter().enumerate() {
        if number.is_nan() {
            continue;
        }
        match res.1 {
            Some(_) if number >= res.0 => {}
            _ => res = (number, Some(i)),
        }
    }
    res
}

/// Sum in double precision; NaN propagates.
#[inline]
pub fn sum_f64(arr: &[f32]) -> f64 {
    arr.iter().map(|&x| x as f64).sum()
}

/// Sum and count of the non-NaN elements in double precision.
#[inline]
pub fn sum_count_nan_safe(arr: &[f32]) -> (f64, usize) {
    arr.iter()
        .filter(|x| !x.is_nan())
        .fold((0_f64, 0_usize), |(s, n), &x| (s + x as f64, n + 1))
}

/// Check if a value is within `NEARLY_ZERO_EPS` of zero.
#[inline]
pub fn is_nearly_zero(x: f64) -> bool {
    x.abs() < NEARLY_ZERO_EPS
}

/// Median of a slice that is known not to contain NaN
///
/// ### Params
///
/// * `x` - The slice for which to calculate the median for.
///
/// ### Results
///
/// The median, `NaN` for an empty slice.
pub fn median_of_clean(x: &[f32]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }

    let mut data = x.to_vec();
    let len = data.len();

    if len % 2 == 0 {
        let (_, median1, right) = data.select_nth_unstable_by(len / 2 - 1, |a, b| a.total_cmp(b));
        let median1 = *median1 as f64;
        let median2 = right
            .iter()
            .copied()
            .min_by(|a, b| a.total_cmp(b))
            .map(|v| v as f64)
            .unwrap_or(median1);
        (median1 + median2) / 2.0
    } else {
        let (_, median, _) = data.select_nth_unstable_by(len / 2, |a, b| a.total_cmp(b));
        *median as f64
    }
}
