// Imports
use std::collections::HashMap;

use ndarray::{ArrayView1, ArrayView2};

/// Silhouette coefficient over a precomputed pairwise-distance matrix.
///
/// For each entity, `a` is the mean distance to its own cluster (excluding itself) and `b` the
/// smallest mean distance to any other cluster; the entity's score is `(b - a) / max(a, b)`, with
/// singleton-cluster entities scoring 0. The returned value is the mean over all entities.
///
/// Callers must ensure `2 <= distinct tags < N`; outside that regime the measure is undefined and
/// the evaluator substitutes the 0.0 sentinel instead of calling this.
pub fn silhouette_score(
    dist: ArrayView2<i32>,
    tags: ArrayView1<i32>,
) -> f64 {
    let n = tags.len();

    // dense cluster indices in first-seen order
    let mut index_of: HashMap<i32, usize> = HashMap::new();
    let mut cluster_of: Vec<usize> = Vec::with_capacity(n);
    for &tag in tags.iter() {
        let next = index_of.len();
        cluster_of.push(*index_of.entry(tag).or_insert(next));
    }
    let nb_clusters = index_of.len();

    let mut sizes = vec![0_usize; nb_clusters];
    for &cluster in cluster_of.iter() {
        sizes[cluster] += 1;
    }

    let mut total: f64 = 0.0;
    let mut sums = vec![0.0_f64; nb_clusters];
    for i in 0..n {
        let own = cluster_of[i];
        if sizes[own] == 1 {
            continue; // singleton, contributes 0
        }

        sums.fill(0.0);
        for j in 0..n {
            if j != i {
                sums[cluster_of[j]] += f64::from(dist[[i, j]]);
            }
        }

        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..nb_clusters)
            .filter(|&cluster| cluster != own)
            .map(|cluster| sums[cluster] / sizes[cluster] as f64)
            .fold(f64::INFINITY, f64::min);

        let denominator = a.max(b);
        if denominator > 0.0 {
            total += (b - a) / denominator;
        }
    }

    total / n as f64
}
