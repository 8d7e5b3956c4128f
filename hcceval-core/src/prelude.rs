pub use crate::data::{
    ClusterMatrix, CompressionMethod, Error as DataError, LevelSet, MatrixParsingError, ProfileMatrix,
};
pub use crate::distance::{
    AllelicDistance, DistanceHandle, DistanceProvider, DistanceView, Error as DistanceError,
    SharedDistanceStore,
};
pub use crate::eval::{
    DEFAULT_NB_WORKERS, Error as EvalError, Evaluator, Phase, SIMILARITY_CEILING, SimFunc, Similarity,
    normalized_mutual_information, silhouette_score,
};
pub use crate::report::{Error as ReportError, render_chart, write_report, write_report_to_file};
