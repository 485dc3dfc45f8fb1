//! Documentation comment parsing and context accumulation for SG.
//!
//! This crate provides:
//! - [`CommentParser`] and the default [`DocBlockParser`] for `/** */` blocks
//! - [`TagRegistry`] mapping `@tag` names to [`TagHandler`]s
//! - [`ContextBuilder`], the arena sections are committed to while parsing,
//!   and the [`AccumulatedContext`] snapshot it produces
//! - [`ForwardReferences`] for parents referenced before they are defined
//!
//! # Quick Start
//!
//! ```
//! use std::path::Path;
//! use sg_comments::{CommentParser, ContextBuilder, DocBlockParser, TagRegistry};
//!
//! let mut builder = ContextBuilder::default();
//! DocBlockParser.parse(
//!     "/** @section Buttons */",
//!     Path::new("buttons.css"),
//!     &TagRegistry::with_defaults(),
//!     &mut builder,
//! )?;
//! let context = builder.snapshot();
//! assert_eq!(context.pages[0].sections[0].name, "Buttons");
//! # Ok::<(), sg_comments::ParseError>(())
//! ```

mod context;
mod error;
mod forward;
mod parser;
mod section;
mod tags;

pub use context::{
    AccumulatedContext, ContextBuilder, ContextDefaults, DEFAULT_PAGE, NavEntry, SectionDraft,
};
pub use error::ParseError;
pub use forward::{ForwardReference, ForwardReferences, PendingReference, ReferenceError};
pub use parser::{CommentParser, DocBlockParser};
pub use section::{Example, Page, Section, SectionId, SourceLocation, slugify};
pub use tags::{Tag, TagHandler, TagRegistry};
