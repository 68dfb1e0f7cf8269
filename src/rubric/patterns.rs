use anyhow::{Context, Result};
use regex::Regex;

/// Compiled matchers shared by every metric extractor. Built once per run and
/// borrowed by the (possibly parallel) page evaluations.
#[derive(Debug)]
pub struct MarkdownPatterns {
    pub(super) fenced_block: Regex,
    pub(super) markdown_punctuation: Regex,
    pub(super) diagram_fence: Regex,
    pub(super) diagram_block: Regex,
    pub(super) fence_language: Regex,
    pub(super) tagged_block: Regex,
    pub(super) snippet_citation: Regex,
    pub(super) sources_label: Regex,
    pub(super) line_range: Regex,
    pub(super) line_number: Regex,
    pub(super) section_heading: Regex,
    pub(super) diagram_label: Regex,
    pub(super) compound_identifier: Regex,
    pub(super) related_marker: Regex,
    pub(super) table_row: Regex,
    pub(super) table_separator: Regex,
}

impl MarkdownPatterns {
    pub fn compile() -> Result<Self> {
        Ok(Self {
            fenced_block: Regex::new(r"(?s)```.*?```")
                .context("failed to compile fenced block regex")?,
            markdown_punctuation: Regex::new(r"[#|>\-*`\[\]()]")
                .context("failed to compile markdown punctuation regex")?,
            diagram_fence: Regex::new(r"```mermaid")
                .context("failed to compile diagram fence regex")?,
            diagram_block: Regex::new(r"(?s)```mermaid[^\n]*\n(.*?)```")
                .context("failed to compile diagram block regex")?,
            fence_language: Regex::new(r"```(\w*)")
                .context("failed to compile fence language regex")?,
            tagged_block: Regex::new(r"(?s)```(\w+)[^\n]*\n(.*?)```")
                .context("failed to compile tagged block regex")?,
            snippet_citation: Regex::new(
                r"(?://|#|--)\s*\S+\.(?:tsx?|jsx?|py|go|rs|java|kt|rb|cs|cpp|c|h|swift|php)\s*[:\s]L\d+",
            )
            .context("failed to compile snippet citation regex")?,
            sources_label: Regex::new(r"(?i)\bsources?\**\s*:")
                .context("failed to compile sources label regex")?,
            line_range: Regex::new(r"\bL(\d+)\s*[-–]\s*L?(\d+)")
                .context("failed to compile line range regex")?,
            line_number: Regex::new(r"\bL\d+").context("failed to compile line number regex")?,
            section_heading: Regex::new(r"(?m)^## ")
                .context("failed to compile section heading regex")?,
            diagram_label: Regex::new(r"\[([^\]]+)\]")
                .context("failed to compile diagram label regex")?,
            compound_identifier: Regex::new(r"^(?:[A-Z][a-z]+[A-Z]|[a-z]+[A-Z])")
                .context("failed to compile compound identifier regex")?,
            related_marker: Regex::new(r"(?i)(?:関連ページ|related|see also|参照|← 前|→ 次)")
                .context("failed to compile related marker regex")?,
            table_row: Regex::new(r"^\s*\|.*\|.*\|").context("failed to compile table row regex")?,
            table_separator: Regex::new(r"^\s*\|[\s\-:]+\|[\s\-:]+\|")
                .context("failed to compile table separator regex")?,
        })
    }
}
