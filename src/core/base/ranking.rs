use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::base::vector::NumericVector;
use crate::utils::errors::{KernelError, KernelResult};

///////////
// Enums //
///////////

/// How element values are compared when sorting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Compare the signed values
    Real,
    /// Compare the absolute values
    Absolute,
}

/// Direction of a sort
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Smallest value first
    Ascending,
    /// Largest value first
    Descending,
}

/// Parsing the sort mode
///
/// ### Params
///
/// * `s` - string defining the sort mode
///
/// ### Returns
///
/// The `SortMode`.
pub fn parse_sort_mode(s: &str) -> Option<SortMode> {
    match s.to_lowercase().as_str() {
        "real" => Some(SortMode::Real),
        "abs" | "absolute" => Some(SortMode::Absolute),
        _ => None,
    }
}

/// Parsing the sort order
///
/// ### Params
///
/// * `s` - string defining the order
///
/// ### Returns
///
/// The `Order`.
pub fn parse_order(s: &str) -> Option<Order> {
    match s.to_lowercase().as_str() {
        "ascending" | "asc" => Some(Order::Ascending),
        "descending" | "desc" => Some(Order::Descending),
        _ => None,
    }
}

impl FromStr for SortMode {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sort_mode(s).ok_or_else(|| KernelError::UnknownVariant {
            kind: "sort mode",
            token: s.to_string(),
        })
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Real => write!(f, "real"),
            SortMode::Absolute => write!(f, "abs"),
        }
    }
}

impl FromStr for Order {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_order(s).ok_or_else(|| KernelError::UnknownVariant {
            kind: "order",
            token: s.to_string(),
        })
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Ascending => write!(f, "ascending"),
            Order::Descending => write!(f, "descending"),
        }
    }
}

impl Order {
    /// Apply the direction to an ascending ordering
    #[inline]
    pub fn apply(self, ascending: Ordering) -> Ordering {
        match self {
            Order::Ascending => ascending,
            Order::Descending => ascending.reverse(),
        }
    }
}

////////////////
// Structures //
////////////////

/// A value that remembers where it came from
///
/// ### Fields
///
/// * `index` - Position of the value before any sorting
/// * `value` - The value itself
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedElement {
    pub index: usize,
    pub value: f64,
}

impl IndexedElement {
    /// Generate a new element
    pub fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }

    /// The value the sort mode compares on
    #[inline]
    pub fn sort_key(&self, mode: SortMode) -> f64 {
        match mode {
            SortMode::Real => self.value,
            SortMode::Absolute => self.value.abs(),
        }
    }
}

/// Ranks with tie correction and whether any tie was seen
///
/// ### Fields
///
/// * `ranks` - 1-based ranks, in the position order of the input
/// * `has_ties` - Did at least two values share a rank
#[derive(Clone, Debug, PartialEq)]
pub struct RankResult {
    pub ranks: Vec<f64>,
    pub has_ties: bool,
}

/////////////////
// Comparators //
/////////////////

/// NaN and null aware comparison
///
/// In value order a null element sorts below NaN, which sorts below every
/// number. The direction is then applied to the whole value order and equal
/// elements fall back to their original index (always ascending).
///
/// ### Params
///
/// * `a` - First element, `None` for a missing element
/// * `b` - Second element, `None` for a missing element
/// * `mode` - Compare real or absolute values
/// * `order` - Direction of the sort
///
/// ### Returns
///
/// The `Ordering` of `a` relative to `b`.
pub fn compare_nan_aware(
    a: Option<&IndexedElement>,
    b: Option<&IndexedElement>,
    mode: SortMode,
    order: Order,
) -> Ordering {
    let value_order = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let (key_a, key_b) = (a.sort_key(mode), b.sort_key(mode));
            match (key_a.is_nan(), key_b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => key_a.partial_cmp(&key_b).unwrap_or(Ordering::Equal),
            }
        }
    };

    order.apply(value_order).then_with(|| match (a, b) {
        (Some(a), Some(b)) => a.index.cmp(&b.index),
        _ => Ordering::Equal,
    })
}

/// Comparison for elements known to be NaN free
///
/// ### Params
///
/// * `a` - First element
/// * `b` - Second element
/// * `mode` - Compare real or absolute values
/// * `order` - Direction of the sort
///
/// ### Returns
///
/// Tuple of the `Ordering` (ties broken by original index) and whether the
/// two values tied.
#[inline]
pub fn compare_nan_free(
    a: &IndexedElement,
    b: &IndexedElement,
    mode: SortMode,
    order: Order,
) -> (Ordering, bool) {
    let value_order = a
        .sort_key(mode)
        .partial_cmp(&b.sort_key(mode))
        .unwrap_or(Ordering::Equal);
    let tie = value_order == Ordering::Equal;

    (
        order.apply(value_order).then_with(|| a.index.cmp(&b.index)),
        tie,
    )
}

/////////////
// Sorting //
/////////////

/// Turn a vector into indexed elements
pub fn elements_from_vector(vector: &NumericVector) -> Vec<IndexedElement> {
    vector
        .iter()
        .enumerate()
        .map(|(i, &v)| IndexedElement::new(i, v as f64))
        .collect()
}

/// Sort elements with the NaN aware comparator
///
/// ### Params
///
/// * `mode` - Compare real or absolute values
/// * `order` - Direction of the sort
/// * `elements` - The elements to sort
///
/// ### Returns
///
/// A new, sorted vector of the elements
pub fn sort_elements(
    mode: SortMode,
    order: Order,
    elements: &[IndexedElement],
) -> Vec<IndexedElement> {
    let mut sorted = elements.to_vec();
    sorted.sort_by(|a, b| compare_nan_aware(Some(a), Some(b), mode, order));
    sorted
}

/// Sort elements that may be missing
///
/// ### Params
///
/// * `mode` - Compare real or absolute values
/// * `order` - Direction of the sort
/// * `elements` - The elements to sort, `None` for missing entries
///
/// ### Returns
///
/// The sorted elements; missing entries lead in ascending order and trail in
/// descending order.
pub fn sort_nullable(
    mode: SortMode,
    order: Order,
    mut elements: Vec<Option<IndexedElement>>,
) -> Vec<Option<IndexedElement>> {
    elements.sort_by(|a, b| compare_nan_aware(a.as_ref(), b.as_ref(), mode, order));
    elements
}

/// Sort NaN free elements and report value ties
///
/// ### Params
///
/// * `mode` - Compare real or absolute values
/// * `order` - Direction of the sort
/// * `elements` - The elements to sort; must not contain NaN
///
/// ### Returns
///
/// Tuple of the sorted elements and whether any two values tied.
pub fn sort_detect_ties(
    mode: SortMode,
    order: Order,
    elements: &[IndexedElement],
) -> KernelResult<(Vec<IndexedElement>, bool)> {
    if let Some(pos) = elements.iter().position(|e| e.value.is_nan()) {
        return Err(KernelError::UnexpectedNan { index: pos });
    }

    let mut sorted = elements.to_vec();
    sorted.sort_by(|a, b| compare_nan_free(a, b, mode, order).0);

    // tied values are contiguous after sorting
    let has_ties = sorted
        .windows(2)
        .any(|w| compare_nan_free(&w[0], &w[1], mode, order).1);

    Ok((sorted, has_ties))
}

/////////////
// Ranking //
/////////////

/// Generate the rank of values with tie correction.
///
/// ### Params
///
/// * `values` - The values to rank. Must not contain NaN.
///
/// ### Returns
///
/// The `RankResult` with ascending 1-based ranks. Members of a tie group all
/// receive the mean of the rank range they occupy.
pub fn rank_with_ties(values: &[f64]) -> KernelResult<RankResult> {
    let n = values.len();
    let elements: Vec<IndexedElement> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| IndexedElement::new(i, v))
        .collect();

    let (sorted, has_ties) = sort_detect_ties(SortMode::Real, Order::Ascending, &elements)?;

    let mut ranks = vec![0.0; n];
    if !has_ties {
        for (pos, element) in sorted.iter().enumerate() {
            ranks[element.index] = (pos + 1) as f64;
        }
        return Ok(RankResult { ranks, has_ties });
    }

    let mut i = 0;
    while i < n {
        let current_value = sorted[i].value;
        let start = i;
        while i < n && sorted[i].value == current_value {
            i += 1;
        }
        let avg_rank = (start + i + 1) as f64 / 2.0;
        for element in &sorted[start..i] {
            ranks[element.index] = avg_rank;
        }
    }

    Ok(RankResult { ranks, has_ties })
}

/// Rank a vector with tie correction (see [`rank_with_ties`])
pub fn rank_vector(vector: &NumericVector) -> KernelResult<RankResult> {
    rank_with_ties(&vector.to_f64_vec())
}

/// Original positions of a vector in rank order
///
/// ### Params
///
/// * `vector` - The values to order
/// * `mode` - Compare real or absolute values
/// * `order` - Direction of the sort
///
/// ### Returns
///
/// The original indices, first ranked first.
pub fn rank_order(vector: &NumericVector, mode: SortMode, order: Order) -> Vec<usize> {
    sort_elements(mode, order, &elements_from_vector(vector))
        .into_iter()
        .map(|e| e.index)
        .collect()
}

/// A new vector holding the values in rank order
pub fn sorted_vector(vector: &NumericVector, mode: SortMode, order: Order) -> NumericVector {
    let values: Vec<f32> = rank_order(vector, mode, order)
        .into_iter()
        .map(|i| vector.as_slice()[i])
        .collect();
    NumericVector::from_vec(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(values: &[f64]) -> Vec<IndexedElement> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| IndexedElement::new(i, v))
            .collect()
    }

    fn indices(sorted: &[IndexedElement]) -> Vec<usize> {
        sorted.iter().map(|e| e.index).collect()
    }

    #[test]
    fn test_sort_real_ascending_and_descending() {
        let e = elements(&[0.5, -2.0, 1.5, 0.0]);
        let asc = sort_elements(SortMode::Real, Order::Ascending, &e);
        assert_eq!(indices(&asc), vec![1, 3, 0, 2]);
        let desc = sort_elements(SortMode::Real, Order::Descending, &e);
        assert_eq!(indices(&desc), vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_sort_absolute() {
        let e = elements(&[0.5, -2.0, 1.5, 0.0]);
        let desc = sort_elements(SortMode::Absolute, Order::Descending, &e);
        assert_eq!(indices(&desc), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_ties_keep_index_order_in_both_directions() {
        let e = elements(&[1.0, 3.0, 1.0, 3.0]);
        let asc = sort_elements(SortMode::Real, Order::Ascending, &e);
        assert_eq!(indices(&asc), vec![0, 2, 1, 3]);
        let desc = sort_elements(SortMode::Real, Order::Descending, &e);
        assert_eq!(indices(&desc), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_nan_sorts_least() {
        let e = elements(&[1.0, f64::NAN, -1.0]);
        let asc = sort_elements(SortMode::Real, Order::Ascending, &e);
        assert_eq!(indices(&asc), vec![1, 2, 0]);
        let desc = sort_elements(SortMode::Real, Order::Descending, &e);
        assert_eq!(indices(&desc), vec![0, 2, 1]);
    }

    #[test]
    fn test_null_sorts_below_nan() {
        let input = vec![
            Some(IndexedElement::new(0, 2.0)),
            None,
            Some(IndexedElement::new(2, f64::NAN)),
            Some(IndexedElement::new(3, -4.0)),
        ];
        let asc = sort_nullable(SortMode::Real, Order::Ascending, input.clone());
        let got: Vec<Option<usize>> = asc.iter().map(|e| e.map(|x| x.index)).collect();
        assert_eq!(got, vec![None, Some(2), Some(3), Some(0)]);

        let desc = sort_nullable(SortMode::Absolute, Order::Descending, input);
        let got: Vec<Option<usize>> = desc.iter().map(|e| e.map(|x| x.index)).collect();
        assert_eq!(got, vec![Some(3), Some(0), Some(2), None]);
    }

    #[test]
    fn test_sort_detect_ties() {
        let ascending = elements(&[3.0, 1.0, 2.0]);
        let (_, ties) = sort_detect_ties(SortMode::Real, Order::Ascending, &ascending).unwrap();
        assert!(!ties);
        let descending = elements(&[-2.0, 1.0, 2.0]);
        let (sorted, ties) =
            sort_detect_ties(SortMode::Absolute, Order::Descending, &descending).unwrap();
        assert!(ties);
        assert_eq!(indices(&sorted), vec![0, 2, 1]);
    }

    #[test]
    fn test_sort_detect_ties_rejects_nan() {
        let res = sort_detect_ties(SortMode::Real, Order::Ascending, &elements(&[1.0, f64::NAN]));
        assert_eq!(res, Err(KernelError::UnexpectedNan { index: 1 }));
    }

    #[test]
    fn test_rank_without_ties() {
        let res = rank_with_ties(&[10.0, 30.0, 20.0]).unwrap();
        assert!(!res.has_ties);
        assert_eq!(res.ranks, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_rank_with_ties_averages() {
        let res = rank_with_ties(&[2.0, 0.0, 2.0, 1.0, 2.0]).unwrap();
        assert!(res.has_ties);
        assert_eq!(res.ranks, vec![4.0, 1.0, 4.0, 2.0, 4.0]);
    }

    #[test]
    fn test_rank_order_and_sorted_vector() {
        let v = NumericVector::from_slice(&[0.1, -3.0, 2.0]);
        assert_eq!(
            rank_order(&v, SortMode::Real, Order::Descending),
            vec![2, 0, 1]
        );
        let sorted = sorted_vector(&v, SortMode::Absolute, Order::Descending);
        assert_eq!(sorted.as_slice(), &[-3.0, 2.0, 0.1]);
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!("ABS".parse::<SortMode>().unwrap(), SortMode::Absolute);
        assert_eq!("desc".parse::<Order>().unwrap(), Order::Descending);
        assert_eq!(SortMode::Real.to_string(), "real");
        assert_eq!(
            Order::Ascending.to_string().parse::<Order>().unwrap(),
            Order::Ascending
        );
        assert!("sideways".parse::<Order>().is_err());
    }
}
