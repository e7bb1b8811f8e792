//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Modules:
//! - `selector`: the fixed catalog of model-selection criteria.
//! - `report`: parsing PLTB result files into tree entries.
//! - `oracle`: distance oracle interface + RAxML subprocess implementation.
//! - `matrix`: symmetric selector-pair sample matrix with canonical keys.
//! - `aggregate`: cross-file distance, variance and histogram views.
//! - `io`: writers for sample, count and table artifacts.
//! - `error`: crate-wide error type.
//!
//! Public API kept stable by re-exporting key items from the modules.

pub mod aggregate;
pub mod error;
pub mod io;
pub mod matrix;
pub mod oracle;
pub mod report;
pub mod selector;

// Re-export frequently used types & functions
pub use aggregate::{FileResult, SortOrder};
pub use error::{EvalError, OracleFailure};
pub use matrix::PairMatrix;
pub use oracle::{DistanceMap, DistanceOracle, RaxmlOracle};
pub use report::{TreeEntry, parse_report, parse_report_file};
pub use selector::{GTR_MODEL, Selector};
