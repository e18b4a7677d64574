//! Layout errors.
//!
//! Only the JSON boundary surfaces these to callers. Inside the engine a
//! per-school error is logged and the school is skipped.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("no anchor for school: {0}")]
    MissingAnchor(String),

    #[error("no grid points for school: {0}")]
    MissingGridPoints(String),

    #[error("root {root} of school {category} is not in its node list")]
    MissingRoot { category: String, root: String },

    #[error("invalid {what}: {source}")]
    InvalidInput {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize layout: {0}")]
    Output(#[source] serde_json::Error),
}
