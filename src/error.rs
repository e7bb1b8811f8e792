//! Crate-wide error type.
//!
//! Every failure is terminal for the operation that raised it; retry policy
//! belongs to the caller. Report-level problems always name the offending
//! file so a batch run over many results stays diagnosable.

use std::io;

/// External distance tool failed; carries the tool's raw diagnostic output.
#[derive(Debug, thiserror::Error)]
#[error("{output}")]
pub struct OracleFailure {
    pub output: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Malformed or incomplete PLTB result file.
    #[error("inconsistent result file {file}: {reason}")]
    Parse { file: String, reason: String },

    /// Zero trees handed to distance computation; a usage error, not a
    /// per-file data problem.
    #[error("empty tree list given")]
    EmptyTreeList,

    /// The distance oracle failed for one file. Other files are unaffected.
    #[error("distance computation failed for {file}")]
    Oracle {
        file: String,
        #[source]
        source: OracleFailure,
    },

    /// Statistics over an empty sample set. Never coerced to zero or NaN.
    #[error("cannot compute {stat} of an empty sample set")]
    EmptySample { stat: &'static str },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl EvalError {
    pub(crate) fn parse(file: &str, reason: impl Into<String>) -> Self {
        EvalError::Parse {
            file: file.to_string(),
            reason: reason.into(),
        }
    }
}
