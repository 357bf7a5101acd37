use crate::rule::Matcher;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid rule expression {expression:?} at offset {offset}: {reason}")]
    Parse {
        expression: String,
        offset: usize,
        reason: String,
    },

    #[error("{0} not supported")]
    UnsupportedMatcher(Matcher),

    #[error("{0} matcher requires an argument")]
    MissingArgument(Matcher),

    #[error("Invalid hostname {host:?}: {reason}")]
    InvalidHostname { host: String, reason: String },
}
