// Imports
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut2, Axis, parallel::prelude::*};

use super::{DistanceProvider, Error};

/// Pairwise allelic distance between typing profiles.
///
/// Loci where either call is non-positive are treated as missing data and ignored; the count of
/// differing calls is then rescaled from the shared loci to the full scheme size, so profiles with
/// many missing calls are not artificially close. A pair sharing no callable locus is maximally
/// distant.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllelicDistance;

impl AllelicDistance {
    fn between(
        a: ArrayView1<i32>,
        b: ArrayView1<i32>,
    ) -> i32 {
        let nb_loci = a.len();
        let mut shared: usize = 0;
        let mut differing: usize = 0;
        for (&x, &y) in a.iter().zip(b.iter()) {
            if x > 0 && y > 0 {
                shared += 1;
                if x != y {
                    differing += 1;
                }
            }
        }
        if shared == 0 {
            return nb_loci as i32;
        }
        ((differing as f64) * (nb_loci as f64) / (shared as f64)).round() as i32
    }
}

impl DistanceProvider for AllelicDistance {
    fn fill_upper_triangle(
        &self,
        alleles: ArrayView2<i32>,
        dist: &mut ArrayViewMut2<i32>,
    ) -> Result<(), Error> {
        if alleles.nrows() == 0 || alleles.ncols() == 0 {
            return Err(Error::EmptyProfile);
        }

        dist.axis_iter_mut(Axis(0)).into_par_iter().enumerate().for_each(|(i, mut row)| {
            let a = alleles.row(i);
            for j in (i + 1)..alleles.nrows() {
                row[j] = Self::between(a, alleles.row(j));
            }
        });

        Ok(())
    }
}
