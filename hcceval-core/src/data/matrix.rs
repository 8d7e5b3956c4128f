// Imports
use std::{collections::HashMap, io::Read, path::Path};

use itertools::Itertools;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis, s};

use super::{CompressionMethod, Error, MatrixParsingError};

/// Integer matrix parsed from a tab-separated file, column 0 holding the entity IDs.
///
/// The first row is treated as a header: column 0 is always kept (its header token is the file's
/// leading label), any later column whose header starts with `#` is excluded. Rows whose entity ID
/// is not positive are dropped.
fn parse_matrix<R: Read>(
    input: R,
    compression: &CompressionMethod,
) -> Result<Array2<i32>, Error> {
    let content = compression.decompress_to_string(input)?;
    let mut lines = content.lines().enumerate();

    let (_, header) = lines.next().ok_or(MatrixParsingError::MissingHeader)?;
    let kept_columns = header
        .split('\t')
        .enumerate()
        .map(|(idx, h)| idx == 0 || !h.starts_with('#'))
        .collect_vec();
    if kept_columns.iter().filter(|&&keep| keep).count() < 2 {
        return Err(MatrixParsingError::NoFeatureColumns.into());
    }

    let mut values: Vec<i32> = Vec::new();
    let mut nb_rows: usize = 0;
    for (line_idx, line) in lines {
        let fields = line.split('\t').collect_vec();
        if fields.len() != kept_columns.len() {
            return Err(MatrixParsingError::FieldCountMismatch {
                expected: kept_columns.len(),
                found: fields.len(),
                line: line_idx + 1,
            }
            .into());
        }
        let row_start = values.len();
        for (field, _) in fields.into_iter().zip_eq(kept_columns.iter()).filter(|&(_, &keep)| keep) {
            let value: i32 = field
                .parse()
                .map_err(|_| MatrixParsingError::Int(field.to_string(), line_idx + 1))?;
            values.push(value);
        }
        // entity IDs must be positive, anything else marks a placeholder row
        if values[row_start] > 0 {
            nb_rows += 1;
        } else {
            values.truncate(row_start);
        }
    }

    let nb_cols = kept_columns.iter().filter(|&&keep| keep).count();
    Ok(Array2::from_shape_vec((nb_rows, nb_cols), values).expect("row width is checked per line"))
}

fn open_with_compression<Q: AsRef<Path>>(filepath: Q) -> Result<Array2<i32>, Error> {
    let filepath: &Path = filepath.as_ref();
    let compression =
        CompressionMethod::from(filepath.extension().and_then(|s| s.to_str()).unwrap_or_default());
    parse_matrix(std::fs::OpenOptions::new().read(true).open(filepath)?, &compression)
}

/// Allelic profiles, one row per entity: `[entity ID, allele call, allele call, ...]`.
#[derive(Debug)]
pub struct ProfileMatrix {
    mat: Array2<i32>,
}

impl ProfileMatrix {
    pub fn from_file<Q: AsRef<Path>>(filepath: Q) -> Result<Self, Error> {
        Ok(Self { mat: open_with_compression(filepath)? })
    }

    pub fn from_reader<R: Read>(
        input: R,
        compression: &CompressionMethod,
    ) -> Result<Self, Error> {
        Ok(Self { mat: parse_matrix(input, compression)? })
    }

    pub fn nb_entities(&self) -> usize {
        self.mat.nrows()
    }

    pub fn entity_ids(&self) -> ArrayView1<'_, i32> {
        self.mat.column(0)
    }

    /// Allele calls only, the ID column stripped.
    pub fn alleles(&self) -> ArrayView2<'_, i32> {
        self.mat.slice(s![.., 1..])
    }
}

/// Cluster assignments, one row per entity: `[entity ID, tag at level 0, tag at level 1, ...]`.
#[derive(Debug)]
pub struct ClusterMatrix {
    mat: Array2<i32>,
}

impl ClusterMatrix {
    pub fn from_file<Q: AsRef<Path>>(filepath: Q) -> Result<Self, Error> {
        Ok(Self { mat: open_with_compression(filepath)? })
    }

    pub fn from_reader<R: Read>(
        input: R,
        compression: &CompressionMethod,
    ) -> Result<Self, Error> {
        Ok(Self { mat: parse_matrix(input, compression)? })
    }

    /// Re-orders and filters the rows so that row `i` describes the same entity as row `i` of
    /// `profile`. Rows whose ID is absent from the profile are dropped; if the row counts then no
    /// longer match, every remaining computation would be misattributed, so this is fatal.
    pub fn align_to(
        self,
        profile: &ProfileMatrix,
    ) -> Result<Self, Error> {
        let idx: HashMap<i32, usize> =
            profile.entity_ids().iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let row_order = self
            .mat
            .column(0)
            .iter()
            .enumerate()
            .filter_map(|(row, id)| idx.get(id).map(|&profile_row| (profile_row, row)))
            .sorted_unstable()
            .map(|(_, row)| row)
            .collect_vec();

        if row_order.len() != profile.nb_entities() {
            return Err(Error::InputAlignment {
                profiles: profile.nb_entities(),
                clusters: row_order.len(),
            });
        }

        Ok(Self { mat: self.mat.select(Axis(0), &row_order) })
    }

    /// Keeps every `stepwise`-th level column (columns `1, 1+s, 1+2s, ...`).
    pub fn select_levels(
        &self,
        stepwise: usize,
    ) -> Result<LevelSet, Error> {
        if stepwise == 0 {
            return Err(Error::InvalidStepwise);
        }
        let columns = (1..self.mat.ncols()).step_by(stepwise).collect_vec();
        Ok(LevelSet { levels: self.mat.select(Axis(1), &columns), stepwise })
    }
}

/// The retained clustering levels, shape `(nb entities, nb levels)`.
pub struct LevelSet {
    levels: Array2<i32>,
    stepwise: usize,
}

impl LevelSet {
    pub fn nb_levels(&self) -> usize {
        self.levels.ncols()
    }

    pub fn nb_entities(&self) -> usize {
        self.levels.nrows()
    }

    pub fn stepwise(&self) -> usize {
        self.stepwise
    }

    /// The cluster-tag vector of one level, one tag per entity.
    pub fn level(
        &self,
        idx: usize,
    ) -> ArrayView1<'_, i32> {
        self.levels.column(idx)
    }

    /// `HC<allelic distance>` labels, one per retained level.
    pub fn labels(&self) -> Vec<String> {
        (0..self.nb_levels()).map(|idx| format!("HC{}", idx * self.stepwise)).collect_vec()
    }

    #[cfg(test)]
    pub(crate) fn from_columns(
        levels: Array2<i32>,
        stepwise: usize,
    ) -> Self {
        Self { levels, stepwise }
    }
}

#[cfg(test)]
mod test {
    use indoc::indoc;

    use super::*;

    const PROFILE: &str = indoc! {"
        #ST\tlocus_1\tlocus_2\t#note
        1\t1\t1\tx
        2\t1\t2\tx
        3\t2\t2\tx
        0\t9\t9\tx
    "};

    const CLUSTER: &str = indoc! {"
        #ST\tHC0\tHC1\tHC2
        3\t3\t1\t1
        1\t1\t1\t1
        2\t2\t1\t1
    "};

    #[test]
    fn parse_profile() {
        let profile = ProfileMatrix::from_reader(PROFILE.as_bytes(), &CompressionMethod::None).unwrap();
        // the `#note` column and the ID-0 row are dropped
        assert_eq!(profile.nb_entities(), 3);
        assert_eq!(profile.entity_ids().to_vec(), vec![1, 2, 3]);
        assert_eq!(profile.alleles().ncols(), 2);
        assert_eq!(profile.alleles().row(2).to_vec(), vec![2, 2]);
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let ragged = "#ST\tl1\n1\t2\t3\n";
        let err = ProfileMatrix::from_reader(ragged.as_bytes(), &CompressionMethod::None).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(MatrixParsingError::FieldCountMismatch { expected: 2, found: 3, line: 2 })
        ));
    }

    #[test]
    fn align_reorders_by_entity_id() {
        let profile = ProfileMatrix::from_reader(PROFILE.as_bytes(), &CompressionMethod::None).unwrap();
        let cluster = ClusterMatrix::from_reader(CLUSTER.as_bytes(), &CompressionMethod::None).unwrap();
        let aligned = cluster.align_to(&profile).unwrap();
        assert_eq!(aligned.mat.column(0).to_vec(), vec![1, 2, 3]);
        assert_eq!(aligned.mat.column(1).to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn align_fails_on_missing_entities() {
        let profile = ProfileMatrix::from_reader(PROFILE.as_bytes(), &CompressionMethod::None).unwrap();
        // entity 4 is unknown to the profile and entity 2 is missing entirely
        let cluster_str = "#ST\tHC0\n1\t1\n3\t3\n4\t4\n";
        let cluster =
            ClusterMatrix::from_reader(cluster_str.as_bytes(), &CompressionMethod::None).unwrap();
        let err = cluster.align_to(&profile).unwrap_err();
        assert!(matches!(err, Error::InputAlignment { profiles: 3, clusters: 2 }));
    }

    #[test]
    fn level_selection_strides_over_columns() {
        let profile = ProfileMatrix::from_reader(PROFILE.as_bytes(), &CompressionMethod::None).unwrap();
        let cluster = ClusterMatrix::from_reader(CLUSTER.as_bytes(), &CompressionMethod::None).unwrap();
        let aligned = cluster.align_to(&profile).unwrap();

        let levels = aligned.select_levels(2).unwrap();
        assert_eq!(levels.nb_levels(), 2);
        assert_eq!(levels.nb_entities(), 3);
        assert_eq!(levels.level(0).to_vec(), vec![1, 2, 3]);
        assert_eq!(levels.level(1).to_vec(), vec![1, 1, 1]);
        assert_eq!(levels.labels(), vec!["HC0", "HC2"]);

        assert!(matches!(aligned.select_levels(0), Err(Error::InvalidStepwise)));
    }

    #[test]
    fn gzip_roundtrip() {
        use std::io::Write;

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(PROFILE.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let profile =
            ProfileMatrix::from_reader(compressed.as_slice(), &CompressionMethod::from("gz")).unwrap();
        assert_eq!(profile.nb_entities(), 3);
    }
}
