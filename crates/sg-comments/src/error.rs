//! Parse error types.

use crate::section::SourceLocation;

/// Error returned when a documentation comment cannot be accepted.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Two sections resolve to the same identifier.
    #[error("Duplicate section {id:?} at {location} (first defined at {first})")]
    DuplicateSection {
        id: String,
        first: SourceLocation,
        location: SourceLocation,
    },
    /// A tag value could not be interpreted.
    #[error("Invalid @{tag} at {location}: {message}")]
    InvalidTag {
        tag: String,
        location: SourceLocation,
        message: String,
    },
    /// A section is, directly or through other sections, its own parent.
    #[error("Section {id:?} at {location} is its own ancestor")]
    CycleDetected { id: String, location: SourceLocation },
    /// A `/**` opener without a closing `*/`.
    #[error("Unterminated documentation comment at {location}")]
    UnterminatedComment { location: SourceLocation },
}
