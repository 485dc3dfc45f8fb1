//! Tracking of `@sectionof` references to sections not yet parsed.
//!
//! A child may be declared before its parent, possibly in another file. The
//! reference is parked here until the parent shows up; whatever is still
//! parked once every source is parsed makes the build fail.

use crate::section::{SectionId, SourceLocation};

/// A child waiting for its parent section to be defined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReference {
    /// Child section that declared the reference.
    pub child: SectionId,
    /// Diagnostic reported if the parent never appears.
    pub error: String,
    /// Where the child was declared.
    pub location: SourceLocation,
}

/// Pending references for one missing section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardReference {
    /// The section that does not exist yet.
    pub target: SectionId,
    /// Children waiting for it, in registration order.
    pub pending: Vec<PendingReference>,
}

/// A section was referenced but never defined.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({location})")]
pub struct ReferenceError {
    /// The section that was never defined.
    pub target: SectionId,
    /// Diagnostic recorded at registration.
    pub message: String,
    /// Where the earliest reference was declared.
    pub location: SourceLocation,
}

/// Registration-ordered set of unresolved references.
#[derive(Clone, Debug, Default)]
pub struct ForwardReferences {
    records: Vec<ForwardReference>,
}

impl ForwardReferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `reference` until `target` is defined.
    pub fn register(&mut self, target: &str, reference: PendingReference) {
        match self.records.iter_mut().find(|r| r.target == target) {
            Some(record) => record.pending.push(reference),
            None => self.records.push(ForwardReference {
                target: target.to_owned(),
                pending: vec![reference],
            }),
        }
    }

    /// Remove and return the references waiting for `target`.
    pub fn resolve(&mut self, target: &str) -> Vec<PendingReference> {
        match self.records.iter().position(|r| r.target == target) {
            Some(index) => self.records.remove(index).pending,
            None => Vec::new(),
        }
    }

    /// Whether no reference is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unresolved records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ForwardReference> {
        self.records.iter()
    }

    /// Fail with the first reference of the earliest unresolved target.
    pub fn ensure_resolved(&self) -> Result<(), ReferenceError> {
        let Some(record) = self.records.first() else {
            return Ok(());
        };
        // Records are created with one entry and removed whole.
        let first = &record.pending[0];
        Err(ReferenceError {
            target: record.target.clone(),
            message: first.error.clone(),
            location: first.location.clone(),
        })
    }
}
