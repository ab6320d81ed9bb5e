//! Error types for the span task core.
//!
//! Everything here is a precondition failure that must stop the run before
//! (or instead of) presenting trials. Unexpected key presses are never errors;
//! the automata drop them.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpanError {
    /// An item pool contained no usable lines.
    #[error("item pool '{0}' is empty")]
    EmptyPool(String),

    /// A pool cannot supply a list of the requested size without repetition.
    #[error("item pool '{pool}' has {available} unique items but a list of {required} is requested")]
    PoolTooSmall {
        pool: String,
        available: usize,
        required: usize,
    },

    /// A processing item line lacks the `statement<TAB>response` shape.
    #[error("malformed processing item on line {line}: {content:?}")]
    MalformedProcessingItem { line: usize, content: String },

    /// The response labels used by the processing items differ from the configured ones.
    #[error("processing items use responses {found:?} but the configuration defines {configured:?}")]
    ResponseMismatch {
        found: Vec<String>,
        configured: Vec<String>,
    },

    #[error("no response keys are configured")]
    NoResponses,

    #[error("level sizes must be at least 1")]
    ZeroLevel,

    #[error("no test levels are configured")]
    NoTestLevels,

    /// A phase with levels would present no lists and report no score.
    #[error("{0} must be at least 1")]
    NoListsPerLevel(&'static str),

    #[error("too few practice trials for a time estimate ({practice} trials, warm-up {warm_up})")]
    TooFewPracticeTrials { practice: usize, warm_up: usize },

    #[error("target items are too similar to be used with sloppy spelling: {0}, {1}")]
    TargetsTooSimilar(String, String),

    #[error("not enough verification items: only {available} instead of {required}")]
    NotEnoughProcessingItems { available: usize, required: usize },

    /// Mean of an empty sample.
    #[error("the arithmetic mean of an empty sample is undefined")]
    EmptySample,

    /// A phase needs a value an earlier phase should have forwarded.
    #[error("missing carried option '{0}'")]
    MissingOption(&'static str),

    #[error("malformed result line: {0:?}")]
    MalformedResultLine(String),

    #[error("invalid subject id {0:?}: use letters and digits only")]
    InvalidSubjectId(String),

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SpanError>;
