//! Build error types.

use std::path::PathBuf;

use sg_comments::{ParseError, ReferenceError};

/// Error that aborts a style guide build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Missing or invalid option, including an unresolved preprocess hook.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A section was referenced with `@sectionof` but never defined.
    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),
    /// A documentation comment could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Template, partial, source or stylesheet file unreadable.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Template compilation or rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    /// A chunk lists a stylesheet the host has no content for.
    #[error("Asset {0} has no source in the build output")]
    Asset(String),
    /// The preprocess hook reported a failure.
    #[error("Preprocess hook failed for page {page}: {message}")]
    Preprocess { page: String, message: String },
    /// The render phase was requested without a successful parse phase.
    #[error("Render phase requested before a successful parse phase")]
    PhaseOrder,
    /// A render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(String),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
