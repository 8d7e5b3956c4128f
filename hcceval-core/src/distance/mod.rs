// Modules
mod allelic;
mod store;

// Re-exports
pub use allelic::AllelicDistance;
pub use store::{DistanceHandle, DistanceView, SharedDistanceStore};

// Imports
use std::path::PathBuf;

use ndarray::{ArrayView2, ArrayViewMut2};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot build a distance matrix over an empty profile matrix")]
    EmptyProfile,
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("Shared segment at '{path}' holds {found} bytes, expected {expected}")]
    SegmentSize { path: PathBuf, found: usize, expected: usize },
}

/// Fills the strict upper triangle of an N×N pairwise-distance matrix from the allele calls
/// (one row per entity). The diagonal stays 0 and the lower triangle is completed by the store's
/// single symmetrization pass, never by the provider.
pub trait DistanceProvider: Sync {
    fn fill_upper_triangle(
        &self,
        alleles: ArrayView2<i32>,
        dist: &mut ArrayViewMut2<i32>,
    ) -> Result<(), Error>;
}
