//! Documentation comment parsing.
//!
//! [`DocBlockParser`] recognises `/** ... */` blocks in stylesheet sources:
//!
//! ```text
//! /**
//!  * Clickable controls. Markdown is **supported**.
//!  *
//!  * @section Buttons
//!  * @page Controls
//!  * @example
//!  * <button class="btn">Go</button>
//!  */
//! ```
//!
//! Text before the first tag is the markdown description. A block becomes a
//! section only when its tags give it a name; other blocks are ignored.

use std::path::Path;

use crate::context::{ContextBuilder, SectionDraft};
use crate::error::ParseError;
use crate::section::SourceLocation;
use crate::tags::{Tag, TagRegistry};

/// Turns source text into sections appended to a [`ContextBuilder`].
pub trait CommentParser: Send + Sync {
    fn parse(
        &self,
        source: &str,
        file: &Path,
        tags: &TagRegistry,
        context: &mut ContextBuilder,
    ) -> Result<(), ParseError>;
}

/// Parser for `/** */` documentation blocks with `@tag` lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocBlockParser;

impl CommentParser for DocBlockParser {
    fn parse(
        &self,
        source: &str,
        file: &Path,
        tags: &TagRegistry,
        context: &mut ContextBuilder,
    ) -> Result<(), ParseError> {
        for block in extract_blocks(source, file)? {
            let location = SourceLocation::new(file, block.line);
            let (description, block_tags) = split_block(&block.lines);
            let mut draft = SectionDraft {
                description,
                ..SectionDraft::default()
            };

            for tag in &block_tags {
                let Some(handler) = tags.get(&tag.name) else {
                    tracing::debug!(tag = %tag.name, location = %location, "Skipping unknown tag");
                    continue;
                };
                handler
                    .apply(tag, &mut draft)
                    .map_err(|message| ParseError::InvalidTag {
                        tag: tag.name.clone(),
                        location: SourceLocation::new(file, tag.line),
                        message,
                    })?;
            }

            if draft.name.is_none() {
                continue;
            }
            if draft.code.is_none() {
                draft.code.clone_from(&draft.example);
            }
            context.add_section(draft, location)?;
        }
        Ok(())
    }
}

/// Cleaned lines of one comment block.
#[derive(Debug, PartialEq, Eq)]
struct CommentBlock {
    /// Line of the `/**` opener.
    line: usize,
    /// Content lines with their source line numbers.
    lines: Vec<(usize, String)>,
}

fn extract_blocks(source: &str, file: &Path) -> Result<Vec<CommentBlock>, ParseError> {
    let mut blocks = Vec::new();
    let mut offset = 0;

    while let Some(found) = source[offset..].find("/**") {
        let start = offset + found;
        let line = source[..start].matches('\n').count() + 1;

        // `/**/` is an empty ordinary comment.
        if source[start + 2..].starts_with("*/") {
            offset = start + 4;
            continue;
        }

        let body_start = start + 3;
        let Some(len) = source[body_start..].find("*/") else {
            return Err(ParseError::UnterminatedComment {
                location: SourceLocation::new(file, line),
            });
        };

        let lines = source[body_start..body_start + len]
            .lines()
            .enumerate()
            .map(|(i, raw)| (line + i, clean_line(raw)))
            .collect();
        blocks.push(CommentBlock { line, lines });
        offset = body_start + len + 2;
    }

    Ok(blocks)
}

/// Strip indentation, the leading `*` and one following space.
fn clean_line(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let without_star = trimmed.strip_prefix('*').unwrap_or(trimmed);
    let text = without_star.strip_prefix(' ').unwrap_or(without_star);
    text.trim_end().to_owned()
}

fn tag_start(line: &str) -> Option<(String, String)> {
    let rest = line.trim_start().strip_prefix('@')?;
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Some((name.to_owned(), value.trim().to_owned()))
}

/// Split block lines into the description and its tags.
fn split_block(lines: &[(usize, String)]) -> (String, Vec<Tag>) {
    let mut description = Vec::new();
    let mut tags: Vec<Tag> = Vec::new();
    let mut bodies: Vec<Vec<&str>> = Vec::new();

    for (number, text) in lines {
        if let Some((name, value)) = tag_start(text) {
            tags.push(Tag {
                name,
                value,
                body: String::new(),
                line: *number,
            });
            bodies.push(Vec::new());
        } else if let Some(body) = bodies.last_mut() {
            body.push(text.as_str());
        } else {
            description.push(text.as_str());
        }
    }

    for (tag, body) in tags.iter_mut().zip(bodies) {
        let start = body.iter().position(|l| !l.trim().is_empty()).unwrap_or(body.len());
        tag.body = body[start..].join("\n").trim_end().to_owned();
    }

    (description.join("\n").trim().to_owned(), tags)
}
