//! Merging of host build output into the styles and scripts of every page.

use std::path::PathBuf;

use crate::error::BuildError;
use crate::host::Compilation;

/// Styles and scripts added to every page of one render phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetBundle {
    /// Raw CSS, build output first, then configured extras.
    pub styles: Vec<String>,
    /// Root-relative script URLs in build order.
    pub scripts: Vec<String>,
}

/// Gather the output of `chunks` from the host.
///
/// `.css` files contribute their contents, `.js` files a root-relative URL.
/// Other files are ignored. `extra_styles` are appended after the build
/// styles.
pub fn collect_assets(
    compilation: &dyn Compilation,
    chunks: &[String],
    extra_styles: &[String],
) -> Result<AssetBundle, BuildError> {
    let mut bundle = AssetBundle::default();

    for chunk in chunks {
        let Some(files) = compilation.chunk_files(chunk) else {
            tracing::debug!(chunk = %chunk, "Chunk not in build output, skipping");
            continue;
        };
        for file in files {
            match extension(&file) {
                Some("css") => {
                    let source = compilation
                        .asset_source(&file)
                        .ok_or_else(|| BuildError::Asset(file.clone()))?;
                    bundle.styles.push(source);
                }
                Some("js") => bundle.scripts.push(root_relative(&file)),
                _ => tracing::debug!(file = %file, "Ignoring chunk file"),
            }
        }
    }

    bundle.styles.extend(extra_styles.iter().cloned());
    Ok(bundle)
}

/// Read the configured stylesheet files, in order.
pub async fn read_stylesheets(paths: &[PathBuf]) -> Result<Vec<String>, BuildError> {
    let mut styles = Vec::with_capacity(paths.len());
    for path in paths {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BuildError::io(path, e))?;
        styles.push(source);
    }
    Ok(styles)
}

fn extension(file: &str) -> Option<&str> {
    let name = file.rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty()).then_some(ext)
}

fn root_relative(file: &str) -> String {
    let mut url = String::with_capacity(file.len() + 1);
    for segment in file.split('/').filter(|s| !s.is_empty()) {
        url.push('/');
        url.push_str(segment);
    }
    url
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::MemoryCompilation;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn frontend_chunk_splits_styles_and_scripts() {
        let mut host = MemoryCompilation::new();
        host.add_chunk("frontend", ["app.css", "app.js"]);
        host.add_asset("app.css", ".btn{color:red}");

        let bundle = collect_assets(&host, &strings(&["frontend"]), &[]).unwrap();

        assert_eq!(bundle.styles, strings(&[".btn{color:red}"]));
        assert_eq!(bundle.scripts, strings(&["/app.js"]));
    }

    #[test]
    fn extra_styles_follow_build_styles() {
        let mut host = MemoryCompilation::new();
        host.add_chunk("main", ["main.css"]);
        host.add_asset("main.css", "a{}");

        let bundle = collect_assets(&host, &strings(&["main"]), &strings(&["b{}"])).unwrap();

        assert_eq!(bundle.styles, strings(&["a{}", "b{}"]));
    }

    #[test]
    fn unknown_chunk_skipped() {
        let host = MemoryCompilation::new();
        let bundle = collect_assets(&host, &strings(&["ghost"]), &[]).unwrap();
        assert_eq!(bundle, AssetBundle::default());
    }

    #[test]
    fn css_without_source_is_error() {
        let mut host = MemoryCompilation::new();
        host.add_chunk("main", ["main.css"]);

        let err = collect_assets(&host, &strings(&["main"]), &[]).unwrap_err();

        assert!(matches!(err, BuildError::Asset(file) if file == "main.css"));
    }

    #[test]
    fn other_extensions_ignored() {
        let mut host = MemoryCompilation::new();
        host.add_chunk("main", ["app.js.map", "logo.svg", "vendor/lib.js"]);

        let bundle = collect_assets(&host, &strings(&["main"]), &[]).unwrap();

        assert!(bundle.styles.is_empty());
        assert_eq!(bundle.scripts, strings(&["/vendor/lib.js"]));
    }

    #[test]
    fn script_urls_normalized() {
        assert_eq!(root_relative("app.js"), "/app.js");
        assert_eq!(root_relative("/static//app.js"), "/static/app.js");
    }

    #[tokio::test]
    async fn read_stylesheets_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.css");
        let second = dir.path().join("b.css");
        std::fs::write(&first, "a{}").unwrap();
        std::fs::write(&second, "b{}").unwrap();

        let styles = read_stylesheets(&[second, first]).await.unwrap();

        assert_eq!(styles, strings(&["b{}", "a{}"]));
    }

    #[tokio::test]
    async fn read_stylesheets_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_stylesheets(&[dir.path().join("nope.css")])
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
