//! Filesystem-backed host build for the CLI.
//!
//! Chunks are described by `[assets.chunks]`; their files are read from the
//! build output directory, where rendered pages are written back.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sg_config::AssetsConfig;
use sg_site::{Artifact, MemoryCompilation};

use crate::error::CliError;

/// Build a host from the configured build output.
///
/// Stylesheets are read eagerly. A missing stylesheet is left out; the
/// render phase reports it if a configured chunk needs it.
pub(crate) async fn load_host(assets: &AssetsConfig) -> Result<MemoryCompilation, CliError> {
    let mut host = MemoryCompilation::new();

    for (chunk, files) in &assets.chunks {
        for file in files.iter().filter(|f| f.ends_with(".css")) {
            let path = assets.dir.join(file);
            match tokio::fs::read_to_string(&path).await {
                Ok(source) => host.add_asset(file, source),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Chunk stylesheet not found");
                }
                Err(e) => return Err(e.into()),
            }
        }
        host.add_chunk(chunk, files.iter().cloned());
    }

    Ok(host)
}

/// Write emitted artifacts below `dir`, returning the written paths.
pub(crate) async fn write_artifacts(
    dir: &Path,
    artifacts: &BTreeMap<String, Artifact>,
) -> Result<Vec<PathBuf>, CliError> {
    let mut written = Vec::with_capacity(artifacts.len());
    for (url, artifact) in artifacts {
        let path = dir.join(url.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CliError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, &artifact.source)
            .await
            .map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
        written.push(path);
    }
    Ok(written)
}
