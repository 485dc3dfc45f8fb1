//! Host build interface.
//!
//! The style guide runs inside a larger asset build. The host exposes the
//! files it produced per chunk, their contents, and an output artifact map.

use std::collections::BTreeMap;

/// Host lifecycle points the plugin is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Before output is produced: run the parse phase.
    PreOutput,
    /// Output stage: run the render phase.
    Emit,
}

/// An output file registered with the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub source: String,
    /// Size of `source` in bytes.
    pub size: usize,
}

impl Artifact {
    #[must_use]
    pub fn new(source: String) -> Self {
        Self {
            size: source.len(),
            source,
        }
    }
}

/// Handle to the host's current build.
pub trait Compilation: Send {
    /// Files the build produced for `chunk`, or `None` for an unknown chunk.
    fn chunk_files(&self, chunk: &str) -> Option<Vec<String>>;

    /// Contents of a produced file.
    fn asset_source(&self, file: &str) -> Option<String>;

    /// Register an output artifact. A later artifact replaces an earlier one
    /// at the same URL.
    fn emit_asset(&mut self, url: &str, artifact: Artifact);
}

/// In-memory host used by the CLI and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryCompilation {
    chunks: BTreeMap<String, Vec<String>>,
    assets: BTreeMap<String, String>,
    emitted: BTreeMap<String, Artifact>,
}

impl MemoryCompilation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `chunk` as producing `files`.
    pub fn add_chunk(&mut self, chunk: &str, files: impl IntoIterator<Item = impl Into<String>>) {
        self.chunks
            .insert(chunk.to_owned(), files.into_iter().map(Into::into).collect());
    }

    /// Provide the contents of a produced file.
    pub fn add_asset(&mut self, file: &str, source: impl Into<String>) {
        self.assets.insert(file.to_owned(), source.into());
    }

    /// Artifacts registered so far, by URL.
    #[must_use]
    pub fn emitted(&self) -> &BTreeMap<String, Artifact> {
        &self.emitted
    }

    /// Consume the host, returning the registered artifacts.
    #[must_use]
    pub fn into_emitted(self) -> BTreeMap<String, Artifact> {
        self.emitted
    }
}

impl Compilation for MemoryCompilation {
    fn chunk_files(&self, chunk: &str) -> Option<Vec<String>> {
        self.chunks.get(chunk).cloned()
    }

    fn asset_source(&self, file: &str) -> Option<String> {
        self.assets.get(file).cloned()
    }

    fn emit_asset(&mut self, url: &str, artifact: Artifact) {
        self.emitted.insert(url.to_owned(), artifact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_size_is_byte_length() {
        assert_eq!(Artifact::new("héllo".to_owned()).size, 6);
    }

    #[test]
    fn emit_asset_last_write_wins() {
        let mut host = MemoryCompilation::new();
        host.emit_asset("styleguide/index.html", Artifact::new("one".to_owned()));
        host.emit_asset("styleguide/index.html", Artifact::new("two".to_owned()));

        assert_eq!(host.emitted().len(), 1);
        assert_eq!(host.emitted()["styleguide/index.html"].source, "two");
    }

    #[test]
    fn unknown_chunk_is_none() {
        let mut host = MemoryCompilation::new();
        host.add_chunk("frontend", ["app.css"]);

        assert_eq!(host.chunk_files("frontend"), Some(vec!["app.css".to_owned()]));
        assert_eq!(host.chunk_files("admin"), None);
    }
}
