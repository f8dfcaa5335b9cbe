use crate::analyzers::types::LabeledValue;

/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of the defined values only; `None` when nothing is defined.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let defined: Vec<f64> = values.into_iter().flatten().collect();
    mean(&defined)
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Median of an unsorted slice. Returns 0.0 for empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Stride that keeps at most `max` points: `ceil(len / max)`, never below 1.
pub fn downsample_step(len: usize, max: usize) -> usize {
    if max == 0 || len <= max {
        1
    } else {
        len.div_ceil(max)
    }
}

/// Sorts descending by value. The sort is stable, so label-ordered input
/// keeps ties ordered by label.
pub fn rank_descending(values: &mut [LabeledValue]) {
    values.sort_by(|a, b| b.value.total_cmp(&a.value));
}

/// The `limit` largest values, descending, ties in input order.
pub fn top_ranked(mut values: Vec<LabeledValue>, limit: usize) -> Vec<LabeledValue> {
    rank_descending(&mut values);
    values.truncate(limit);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(label: &str, value: f64) -> LabeledValue {
        LabeledValue {
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_mean_defined_skips_missing() {
        assert_eq!(mean_defined([Some(2.0), None, Some(4.0)]), Some(3.0));
        assert_eq!(mean_defined([None, None]), None);
    }

    #[test]
    fn test_stddev() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(stddev(&v, 5.0), 2.0);
        assert_eq!(stddev(&[], 0.0), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_downsample_step() {
        assert_eq!(downsample_step(10, 500), 1);
        assert_eq!(downsample_step(500, 500), 1);
        assert_eq!(downsample_step(501, 500), 2);
        assert_eq!(downsample_step(1500, 500), 3);
        assert_eq!(downsample_step(1501, 500), 4);
    }

    #[test]
    fn test_top_ranked_breaks_ties_by_input_order() {
        let values = vec![
            labeled("a", 2.0),
            labeled("b", 5.0),
            labeled("c", 2.0),
            labeled("d", 1.0),
        ];
        let top = top_ranked(values, 3);
        let labels: Vec<&str> = top.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
        assert!(top_ranked(Vec::new(), 3).is_empty());
    }
}
