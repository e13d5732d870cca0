use thiserror::Error;

/// Errors raised while building filters.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("unknown filter: {0} (available: {available})", available = crate::filter::BUILTIN_NAMES.join(", "))]
    UnknownFilter(String),
    #[error("signature {0:?} has no required patterns")]
    EmptySignature(String),
    #[error("signature {name:?}: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
