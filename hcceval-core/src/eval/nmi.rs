// Imports
use std::collections::HashMap;

use ndarray::ArrayView1;

/// Normalized mutual information between two labelings of the same entities.
///
/// Contingency-table mutual information over natural logarithms, normalized by the arithmetic
/// mean of the two label entropies. Values land in `[0, 1]`; two trivial labelings are handled
/// upstream by the degenerate-pair rule, so a vanishing normalizer maps to 0 here.
pub fn normalized_mutual_information(
    cc1: ArrayView1<i32>,
    cc2: ArrayView1<i32>,
) -> f64 {
    debug_assert_eq!(cc1.len(), cc2.len());
    let n = cc1.len() as f64;

    let mut joint: HashMap<(i32, i32), f64> = HashMap::new();
    let mut left: HashMap<i32, f64> = HashMap::new();
    let mut right: HashMap<i32, f64> = HashMap::new();
    for (&a, &b) in cc1.iter().zip(cc2.iter()) {
        *joint.entry((a, b)).or_default() += 1.0;
        *left.entry(a).or_default() += 1.0;
        *right.entry(b).or_default() += 1.0;
    }

    let normalizer = 0.5 * (entropy(&left, n) + entropy(&right, n));
    if normalizer < f64::EPSILON {
        return 0.0;
    }

    let mut mi: f64 = 0.0;
    for (&(a, b), &count) in joint.iter() {
        mi += (count / n) * ((count * n) / (left[&a] * right[&b])).ln();
    }

    // floating-point noise can push an independent pair epsilon-below zero
    (mi / normalizer).max(0.0)
}

fn entropy(
    counts: &HashMap<i32, f64>,
    n: f64,
) -> f64 {
    -counts.values().map(|&count| (count / n) * (count / n).ln()).sum::<f64>()
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;
    use crate::assert_float_eq;

    #[test]
    fn identical_labelings_score_one() {
        let u = array![0, 0, 1, 1, 2, 2];
        assert_float_eq!(normalized_mutual_information(u.view(), u.view()), 1.0);
    }

    #[test]
    fn relabeling_does_not_change_the_score() {
        let u = array![0, 0, 1, 1];
        let v = array![7, 7, 3, 3];
        assert_float_eq!(normalized_mutual_information(u.view(), v.view()), 1.0);
    }

    #[test]
    fn independent_labelings_score_zero() {
        let u = array![0, 0, 1, 1];
        let v = array![0, 1, 0, 1];
        assert_float_eq!(normalized_mutual_information(u.view(), v.view()), 0.0);
    }

    #[test]
    fn partially_agreeing_labelings_match_the_closed_form() {
        // contingency [[2, 1], [0, 1]]: MI = 0.5·ln(4/3) + 0.25·ln(2/3) + 0.25·ln(2),
        // H(u) with counts (3, 1), H(v) with counts (2, 2)
        let u = array![0, 0, 0, 1];
        let v = array![0, 0, 1, 1];
        assert_float_eq!(normalized_mutual_information(u.view(), v.view()), 0.343711, 1e-5);
    }
}
