use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;

/// A document in a weight group that has no usable weight yet.
#[derive(Debug, Clone)]
pub struct WeightCandidate {
    pub file_name: String,
    pub date: Option<DateTime<FixedOffset>>,
}

/// Largest existing weight, never below zero.
pub fn max_weight<I>(weights: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    weights.into_iter().fold(0, i64::max)
}

/// Assign `current_max + 1 ..= current_max + K` to the candidates.
///
/// Order: parsed date ascending, undated documents last, ties by file name.
/// Returns `(candidate index, weight)` pairs in assignment order.
pub fn plan_weights(candidates: &[WeightCandidate], current_max: i64) -> Vec<(usize, i64)> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| compare(&candidates[a], &candidates[b]));

    order
        .into_iter()
        .zip(current_max + 1..)
        .collect()
}

fn compare(a: &WeightCandidate, b: &WeightCandidate) -> Ordering {
    let by_date = match (&a.date, &b.date) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.file_name.cmp(&b.file_name))
}
