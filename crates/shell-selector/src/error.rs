//! Error types for data selectors
//!
//! All of these are configuration errors: they are returned immediately and
//! never retried.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Selector {selector}: missing required parameter {key:?}")]
    MissingParameter { selector: String, key: String },

    #[error("Selector {selector}: parameter key {key:?} is already used on the parent chain")]
    DuplicateParameterKey { selector: String, key: String },

    #[error("Selector {selector}: no execute function configured")]
    MissingExecute { selector: String },
}
