// Imports
use std::path::PathBuf;

use memmap2::{Mmap, MmapMut};
use ndarray::{ArrayView2, ArrayViewMut2};
use tempfile::NamedTempFile;

use super::{DistanceProvider, Error};
use crate::data::ProfileMatrix;

/// One N×N pairwise-distance matrix in a memory segment any number of workers can map read-only,
/// without per-worker copies.
///
/// The segment is backed by an unlinked-on-drop temporary file: dropping the store releases it
/// exactly once, on every exit path. Workers attach through a [`DistanceHandle`] and get their own
/// short-lived read-only mapping of the same bytes.
#[derive(Debug)]
pub struct SharedDistanceStore {
    file: NamedTempFile,
    map: MmapMut,
    n: usize,
}

impl SharedDistanceStore {
    /// Builds the distance matrix for `profile` inside a fresh shared segment.
    ///
    /// The provider fills the upper triangle; the matrix is then symmetrized here, once, before
    /// any handle can attach for scoring.
    pub fn open<P: DistanceProvider>(
        profile: &ProfileMatrix,
        provider: &P,
    ) -> Result<Self, Error> {
        let n = profile.nb_entities();
        if n == 0 {
            return Err(Error::EmptyProfile);
        }

        let file = tempfile::Builder::new().prefix("hcceval-dist-").tempfile()?;
        file.as_file().set_len((n * n * size_of::<i32>()) as u64)?;
        // Safety: the file was just created, sized, and is exclusively ours until dropped
        let mut map = unsafe { MmapMut::map_mut(file.as_file())? };

        {
            let cells: &mut [i32] = bytemuck::cast_slice_mut(&mut map[..]);
            let mut dist = ArrayViewMut2::from_shape((n, n), cells)
                .expect("segment is sized to exactly n*n cells");
            provider.fill_upper_triangle(profile.alleles(), &mut dist)?;
        }

        let mut store = Self { file, map, n };
        store.symmetrize();
        Ok(store)
    }

    /// Mirrors the upper triangle onto the lower one. Idempotent, so re-applying it to an already
    /// symmetric matrix changes nothing.
    pub fn symmetrize(&mut self) {
        let n = self.n;
        let cells: &mut [i32] = bytemuck::cast_slice_mut(&mut self.map[..]);
        for i in 0..n {
            for j in (i + 1)..n {
                cells[j * n + i] = cells[i * n + j];
            }
        }
    }

    /// A cheap, cloneable handle workers use to attach to the segment.
    pub fn handle(&self) -> DistanceHandle {
        DistanceHandle { path: self.file.path().to_path_buf(), n: self.n }
    }

    pub fn matrix(&self) -> ArrayView2<'_, i32> {
        let cells: &[i32] = bytemuck::cast_slice(&self.map[..]);
        ArrayView2::from_shape((self.n, self.n), cells).expect("segment is sized to exactly n*n cells")
    }
}

/// Segment key plus shape; everything a worker needs to map the matrix without copying it.
#[derive(Debug, Clone)]
pub struct DistanceHandle {
    path: PathBuf,
    n: usize,
}

impl DistanceHandle {
    pub fn attach(&self) -> Result<DistanceView, Error> {
        let file = std::fs::OpenOptions::new().read(true).open(&self.path)?;
        // Safety: the owning store keeps the matrix immutable for the lifetime of every view
        let map = unsafe { Mmap::map(&file)? };

        let expected = self.n * self.n * size_of::<i32>();
        if map.len() != expected {
            return Err(Error::SegmentSize { path: self.path.clone(), found: map.len(), expected });
        }
        Ok(DistanceView { map, n: self.n })
    }
}

/// A read-only mapping of the shared matrix; unmapped when dropped.
pub struct DistanceView {
    map: Mmap,
    n: usize,
}

impl DistanceView {
    pub fn matrix(&self) -> ArrayView2<'_, i32> {
        let cells: &[i32] = bytemuck::cast_slice(&self.map[..]);
        ArrayView2::from_shape((self.n, self.n), cells).expect("length is checked at attach time")
    }
}

#[cfg(test)]
mod test {
    use indoc::indoc;

    use super::*;
    use crate::{
        data::CompressionMethod,
        distance::AllelicDistance,
    };

    const PROFILE: &str = indoc! {"
        #ST\tl1\tl2\tl3
        1\t1\t1\t1
        2\t1\t1\t2
        3\t2\t2\t2
    "};

    fn profile() -> ProfileMatrix {
        ProfileMatrix::from_reader(PROFILE.as_bytes(), &CompressionMethod::None).unwrap()
    }

    #[test]
    fn open_yields_a_symmetric_matrix() {
        let store = SharedDistanceStore::open(&profile(), &AllelicDistance).unwrap();
        let dist = store.matrix();
        for i in 0..3 {
            assert_eq!(dist[[i, i]], 0);
            for j in 0..3 {
                assert_eq!(dist[[i, j]], dist[[j, i]]);
            }
        }
        assert_eq!(dist[[0, 1]], 1);
        assert_eq!(dist[[0, 2]], 3);
        assert_eq!(dist[[1, 2]], 2);
    }

    #[test]
    fn symmetrize_is_idempotent() {
        let mut store = SharedDistanceStore::open(&profile(), &AllelicDistance).unwrap();
        let before = store.matrix().to_owned();
        store.symmetrize();
        assert_eq!(store.matrix(), before);
    }

    #[test]
    fn attached_views_observe_the_same_bytes() {
        let store = SharedDistanceStore::open(&profile(), &AllelicDistance).unwrap();
        let handle = store.handle();

        let view_a = handle.attach().unwrap();
        let view_b = handle.attach().unwrap();
        assert_eq!(view_a.matrix(), store.matrix());
        assert_eq!(view_b.matrix(), store.matrix());
    }

    #[test]
    fn the_segment_is_released_when_the_store_drops() {
        let handle = {
            let store = SharedDistanceStore::open(&profile(), &AllelicDistance).unwrap();
            store.handle()
        };
        assert!(handle.attach().is_err());
    }

    #[test]
    fn open_rejects_an_empty_profile() {
        let profile = ProfileMatrix::from_reader("#ST\tl1\n".as_bytes(), &CompressionMethod::None)
            .unwrap();
        let err = SharedDistanceStore::open(&profile, &AllelicDistance).unwrap_err();
        assert!(matches!(err, Error::EmptyProfile));
    }
}
