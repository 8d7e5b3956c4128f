// Modules
mod matrix;

// Re-exports
pub use matrix::{ClusterMatrix, LevelSet, ProfileMatrix};

// Imports
use std::io::Read;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] MatrixParsingError),
    #[error(
        "{clusters} cluster rows remain for {profiles} profile rows after ID alignment, some profiles do not have corresponding cluster info"
    )]
    InputAlignment { profiles: usize, clusters: usize },
    #[error("The stepwise stride must be at least 1")]
    InvalidStepwise,
}

#[derive(Debug, Error)]
pub enum MatrixParsingError {
    #[error("The matrix file contains no header row")]
    MissingHeader,
    #[error("Expected {expected} fields on line {line}, found {found}")]
    FieldCountMismatch { expected: usize, found: usize, line: usize },
    #[error("Failed to parse `{0}` as an integer on line {1}")]
    Int(String, usize),
    #[error("Expected at least one feature column besides the entity IDs")]
    NoFeatureColumns,
}

pub enum CompressionMethod {
    Gzip,
    Zstd,
    None,
}

impl From<&str> for CompressionMethod {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "gz" | "gzip" => Self::Gzip,
            "zst" | "zstd" => Self::Zstd,
            _ => Self::None,
        }
    }
}

impl CompressionMethod {
    pub fn decompress_to_string<R: Read>(
        &self,
        mut input: R,
    ) -> std::io::Result<String> {
        let mut buffer: String = String::new();
        match self {
            Self::Gzip => {
                let mut decoder = flate2::read::GzDecoder::new(input);
                decoder.read_to_string(&mut buffer)?;
            }
            Self::Zstd => {
                let mut decoder = zstd::Decoder::new(input)?;
                decoder.read_to_string(&mut buffer)?;
            }
            Self::None => {
                input.read_to_string(&mut buffer)?;
            }
        }
        Ok(buffer)
    }
}
