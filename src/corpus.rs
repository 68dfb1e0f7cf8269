use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::model::{PageResult, Tier};
use crate::rubric::{MarkdownPatterns, evaluate_page, unreadable_page};

/// `*.md` files directly inside `dir`, sorted by path.
pub fn discover_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("md"))
            .unwrap_or(false);

        if is_markdown {
            pages.push(path);
        }
    }

    if pages.is_empty() {
        bail!("no .md files found in {}", dir.display());
    }

    pages.sort();
    Ok(pages)
}

/// Reads and evaluates one page; a read failure yields a degraded result
/// rather than an error.
pub fn evaluate_file(path: &Path, tier: Option<Tier>, patterns: &MarkdownPatterns) -> PageResult {
    match fs::read_to_string(path) {
        Ok(text) => evaluate_page(&path.display().to_string(), &text, tier, patterns),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "page unreadable; scoring as empty");
            unreadable_page(path, tier, &err.to_string())
        }
    }
}

/// Evaluates pages in parallel; results keep the order of `paths`.
pub fn evaluate_files(
    paths: &[PathBuf],
    tier: Option<Tier>,
    patterns: &MarkdownPatterns,
) -> Vec<PageResult> {
    let results = paths
        .par_iter()
        .map(|path| evaluate_file(path, tier, patterns))
        .collect::<Vec<PageResult>>();

    info!(pages = results.len(), "page evaluation complete");
    results
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{discover_pages, evaluate_file, evaluate_files};
    use crate::model::{Severity, Tier};
    use crate::rubric::MarkdownPatterns;

    #[test]
    fn discover_pages_returns_sorted_markdown_files_only() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        fs::write(dir.path().join("4.1-core.md"), "# Core\n").expect("write page");
        fs::write(dir.path().join("1.1-overview.md"), "# Overview\n").expect("write page");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write note");
        fs::create_dir(dir.path().join("nested.md")).expect("create dir");

        let pages = discover_pages(dir.path()).expect("pages should be discovered");
        let names = pages
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect::<Vec<&str>>();
        assert_eq!(names, vec!["1.1-overview.md", "4.1-core.md"]);
    }

    #[test]
    fn discover_pages_rejects_directory_without_markdown() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let error = discover_pages(dir.path()).expect_err("empty directory should fail");
        assert!(
            error.to_string().contains("no .md files found"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn unreadable_page_degrades_instead_of_failing() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("2.1-setup.md");
        fs::write(&path, [0xff_u8, 0xfe, 0x00, 0x80]).expect("write invalid utf-8");

        let patterns = MarkdownPatterns::compile().expect("patterns should compile");
        let result = evaluate_file(&path, None, &patterns);

        assert_eq!(result.tier, Tier::Medium);
        assert!(result.content_sha256.is_none());
        let first = result.issues.first().expect("unreadable issue should be recorded");
        assert_eq!(first.severity, Severity::Warning);
        assert_eq!(first.criterion, None);
        assert!(first.message.starts_with("page could not be read"));
        assert!(result.grade().is_failing());
        assert!(result.score <= result.max_score);
    }

    #[test]
    fn evaluate_files_preserves_input_order() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        for name in ["1.1-a.md", "2.1-b.md", "3.1-c.md", "index.md"] {
            fs::write(dir.path().join(name), format!("# {name}\n\nBody text.\n"))
                .expect("write page");
        }

        let patterns = MarkdownPatterns::compile().expect("patterns should compile");
        let paths = discover_pages(dir.path()).expect("pages should be discovered");
        let results = evaluate_files(&paths, None, &patterns);

        let names = results
            .iter()
            .map(|result| result.file_name())
            .collect::<Vec<&str>>();
        assert_eq!(names, vec!["1.1-a.md", "2.1-b.md", "3.1-c.md", "index.md"]);
        assert_eq!(results[0].tier, Tier::High);
        assert_eq!(results[3].tier, Tier::Index);
    }
}
