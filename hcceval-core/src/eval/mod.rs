// Modules
mod nmi;
mod silhouette;

// Re-exports
pub use nmi::normalized_mutual_information;
pub use silhouette::silhouette_score;

// Imports
use indicatif::MultiProgress;
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1};
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;

use crate::{
    data::{LevelSet, ProfileMatrix},
    distance::{DistanceProvider, SharedDistanceStore},
    utils::{simple_progressbar, simple_spinner},
};

/// Default worker-pool width; constant, never scaled to the number of levels or entities.
pub const DEFAULT_NB_WORKERS: usize = 10;

/// Off-diagonal similarity values computed by the metric are clamped to `[0.0, SIMILARITY_CEILING]`.
/// Sentinel cells (diagonal, degenerate pairs) stay at exactly 1.0 and are never clamped.
pub const SIMILARITY_CEILING: f64 = 0.999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Silhouette,
    Similarity,
}

impl std::fmt::Display for Phase {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Silhouette => write!(f, "silhouette"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Distance(#[from] crate::distance::Error),
    #[error(transparent)]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("{phase} task {index} failed, {source}")]
    WorkerTask { phase: Phase, index: usize, source: crate::distance::Error },
}

pub type SimFunc = fn(ArrayView1<i32>, ArrayView1<i32>) -> f64;

#[derive(Debug, Clone, Copy, Default)]
pub enum Similarity {
    #[default]
    NormalizedMutualInformation,
}

impl Similarity {
    pub fn to_simfunc(&self) -> SimFunc {
        match self {
            Self::NormalizedMutualInformation => nmi::normalized_mutual_information,
        }
    }
}

/// Runs both evaluation phases over a fixed-width worker pool.
///
/// Each phase is a blocking scatter/gather: the full task list is submitted, every scalar is
/// gathered back by task index, and a single failing task aborts the whole phase.
pub struct Evaluator {
    pool: rayon::ThreadPool,
}

impl Evaluator {
    pub fn new(nb_workers: usize) -> Result<Self, Error> {
        Ok(Self { pool: rayon::ThreadPoolBuilder::new().num_threads(nb_workers).build()? })
    }

    /// One silhouette score per level, against a distance matrix shared across all workers.
    ///
    /// The store is built (and symmetrized) once before any worker attaches, and released when
    /// this returns, on success and on failure alike. Levels where every entity carries the same
    /// tag, or every entity a distinct one, take the 0.0 sentinel without touching the matrix.
    pub fn silhouette_scores<P: DistanceProvider>(
        &self,
        profile: &ProfileMatrix,
        levels: &LevelSet,
        provider: &P,
        multi: Option<&MultiProgress>,
    ) -> Result<Array1<f64>, Error> {
        let spinner = simple_spinner(Some("Calculating pairwise distances ..."), Some(100), multi);
        let store = SharedDistanceStore::open(profile, provider)?;
        spinner.finish_and_clear();

        let handle = store.handle();
        let nb_entities = levels.nb_entities();

        let pb = simple_progressbar(levels.nb_levels(), "silhouette scores", multi);
        let scores = self.pool.install(|| {
            (0..levels.nb_levels())
                .into_par_iter()
                .map(|index| {
                    let tag = levels.level(index);
                    let nb_tags = distinct_tag_count(tag);
                    let score = if (2..nb_entities).contains(&nb_tags) {
                        let view = handle
                            .attach()
                            .map_err(|source| Error::WorkerTask { phase: Phase::Silhouette, index, source })?;
                        silhouette::silhouette_score(view.matrix(), tag)
                    } else {
                        0.0
                    };
                    pb.inc(1);
                    Ok(score)
                })
                .collect::<Result<Vec<f64>, Error>>()
        })?;
        pb.finish();

        Ok(Array1::from_vec(scores))
    }

    /// The symmetric level-by-level similarity matrix.
    ///
    /// Only the upper triangle is computed; each scalar is mirrored into the lower triangle as it
    /// is folded in. A pair where either level has a single distinct tag is defined to score 1.0
    /// without invoking the metric.
    pub fn similarity_matrix(
        &self,
        levels: &LevelSet,
        similarity: Similarity,
        multi: Option<&MultiProgress>,
    ) -> Array2<f64> {
        let nb_levels = levels.nb_levels();
        let method = similarity.to_simfunc();

        let single_tag =
            (0..nb_levels).map(|idx| distinct_tag_count(levels.level(idx)) == 1).collect_vec();
        let tasks = (0..nb_levels).tuple_combinations::<(usize, usize)>().collect_vec();

        let pb = simple_progressbar(tasks.len(), "level pairs", multi);
        let scores: Vec<f64> = self.pool.install(|| {
            tasks
                .par_iter()
                .map(|&(i, j)| {
                    let score = if single_tag[i] || single_tag[j] {
                        1.0
                    } else {
                        method(levels.level(i), levels.level(j)).clamp(0.0, SIMILARITY_CEILING)
                    };
                    pb.inc(1);
                    score
                })
                .collect()
        });
        pb.finish();

        // self-similarity is assumed, not computed
        let mut matrix = Array2::from_elem((nb_levels, nb_levels), 1.0);
        for (&(i, j), &score) in tasks.iter().zip_eq(scores.iter()) {
            matrix[[i, j]] = score;
            matrix[[j, i]] = score;
        }
        matrix
    }
}

fn distinct_tag_count(tag: ArrayView1<i32>) -> usize {
    tag.iter().unique().count()
}

#[cfg(test)]
mod test {
    use indoc::indoc;
    use ndarray::array;

    use super::*;
    use crate::{
        assert_float_eq,
        data::{CompressionMethod, ProfileMatrix},
        distance::AllelicDistance,
    };

    fn evaluator() -> Evaluator {
        Evaluator::new(4).unwrap()
    }

    #[test]
    fn degenerate_levels_take_the_sentinels() {
        // level 0 puts all six entities in one cluster, level 1 gives each its own
        let profile_str = indoc! {"
            #ST\tl1\tl2
            1\t1\t1
            2\t1\t2
            3\t2\t2
            4\t2\t3
            5\t3\t3
            6\t3\t4
        "};
        let profile =
            ProfileMatrix::from_reader(profile_str.as_bytes(), &CompressionMethod::None).unwrap();
        let levels = LevelSet::from_columns(
            array![[1, 1], [1, 2], [1, 3], [1, 4], [1, 5], [1, 6]],
            1,
        );

        let evaluator = evaluator();
        let silhouette =
            evaluator.silhouette_scores(&profile, &levels, &AllelicDistance, None).unwrap();
        assert_float_eq!(silhouette[0], 0.0);
        assert_float_eq!(silhouette[1], 0.0);

        let similarity = evaluator.similarity_matrix(&levels, Similarity::default(), None);
        assert_float_eq!(similarity[[0, 1]], 1.0);
        assert_float_eq!(similarity[[1, 0]], 1.0);
        assert_float_eq!(similarity[[0, 0]], 1.0);
        assert_float_eq!(similarity[[1, 1]], 1.0);
    }

    #[test]
    fn silhouette_phase_matches_the_hand_computed_score() {
        // two pairs of near-identical profiles: intra-pair distance 2, cross-pair distance 10,
        // so every entity scores (10 - 2) / 10 = 0.8
        let profile_str = indoc! {"
            #ST\tl1\tl2\tl3\tl4\tl5\tl6\tl7\tl8\tl9\tl10
            1\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1
            2\t1\t1\t1\t1\t1\t1\t1\t1\t2\t2
            3\t3\t3\t3\t3\t3\t3\t3\t3\t3\t3
            4\t3\t3\t3\t3\t3\t3\t3\t3\t4\t4
        "};
        let profile =
            ProfileMatrix::from_reader(profile_str.as_bytes(), &CompressionMethod::None).unwrap();
        let levels = LevelSet::from_columns(array![[1], [1], [2], [2]], 10);

        let silhouette = evaluator()
            .silhouette_scores(&profile, &levels, &AllelicDistance, None)
            .unwrap();
        assert_float_eq!(silhouette[0], 0.8);
    }

    #[test]
    fn similarity_matrix_is_symmetric_with_a_unit_diagonal() {
        let levels = LevelSet::from_columns(
            array![
                [1, 1, 1],
                [1, 1, 2],
                [1, 2, 3],
                [2, 2, 4],
                [2, 3, 5],
                [2, 3, 6],
            ],
            1,
        );
        let similarity = evaluator().similarity_matrix(&levels, Similarity::default(), None);

        for i in 0..3 {
            assert_float_eq!(similarity[[i, i]], 1.0);
            for j in 0..3 {
                assert_float_eq!(similarity[[i, j]], similarity[[j, i]]);
            }
        }
        // no level here is degenerate, so every off-diagonal cell is a computed, clamped value
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert!((0.0..=SIMILARITY_CEILING).contains(&similarity[[i, j]]));
                }
            }
        }
    }

    #[test]
    fn identical_levels_are_clamped_to_the_ceiling() {
        // two identical, non-degenerate levels: NMI = 1.0, clamped to 0.999
        let levels = LevelSet::from_columns(array![[1, 1], [1, 1], [2, 2], [2, 2]], 1);
        let similarity = evaluator().similarity_matrix(&levels, Similarity::default(), None);
        assert_float_eq!(similarity[[0, 1]], SIMILARITY_CEILING);
    }
}
