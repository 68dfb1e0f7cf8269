use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use super::patterns::MarkdownPatterns;

/// Sources-line spans wider than this many lines count as imprecise.
pub const MAX_ACCEPTABLE_LINE_RANGE: u64 = 200;

const DIAGRAM_LANGUAGE: &str = "mermaid";

const GENERIC_LABELS: [&str; 11] = [
    "Component",
    "Module",
    "Service",
    "System",
    "Client",
    "Server",
    "Manager",
    "Handler",
    "Engine",
    "Registry",
    "Controller",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Gantt,
    Pie,
    Other,
}

impl DiagramKind {
    fn classify(block: &str) -> Self {
        let first_line = block
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if first_line.starts_with("graph") || first_line.starts_with("flowchart") {
            Self::Flowchart
        } else if first_line.starts_with("sequencediagram") {
            Self::Sequence
        } else if first_line.starts_with("classdiagram") {
            Self::Class
        } else if first_line.starts_with("statediagram") {
            Self::State
        } else if first_line.starts_with("erdiagram") {
            Self::EntityRelationship
        } else if first_line.starts_with("gantt") {
            Self::Gantt
        } else if first_line.starts_with("pie") {
            Self::Pie
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequenceDiagram",
            Self::Class => "classDiagram",
            Self::State => "stateDiagram",
            Self::EntityRelationship => "erDiagram",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinePrecision {
    pub precise: usize,
    pub imprecise: usize,
    pub absent: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelSpecificity {
    pub specific: usize,
    pub generic: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetrics {
    pub word_count: usize,
    pub diagram_count: usize,
    pub diagram_kinds: BTreeSet<DiagramKind>,
    pub snippet_count: usize,
    pub cited_snippet_count: usize,
    pub sources_line_count: usize,
    pub line_precision: LinePrecision,
    pub section_count: usize,
    pub has_overview: bool,
    pub label_specificity: LabelSpecificity,
    pub has_related_links: bool,
    pub table_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedMetric {
    pub metric: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsExtraction {
    pub metrics: PageMetrics,
    pub degraded: Vec<DegradedMetric>,
}

impl PageMetrics {
    /// Runs every extractor over `text`. Only line-number precision can fail;
    /// a failed metric falls back to its zero value and is listed in
    /// `degraded`.
    pub fn extract(text: &str, patterns: &MarkdownPatterns) -> MetricsExtraction {
        let mut degraded = Vec::new();
        let sources = sources_lines(text, patterns);
        let line_precision = degrade(
            "line_precision",
            line_number_precision(&sources, patterns),
            &mut degraded,
        );

        let metrics = PageMetrics {
            word_count: word_count(text, patterns),
            diagram_count: diagram_count(text, patterns),
            diagram_kinds: diagram_kinds(text, patterns),
            snippet_count: snippet_count(text, patterns),
            cited_snippet_count: cited_snippet_count(text, patterns),
            sources_line_count: sources.len(),
            line_precision,
            section_count: section_count(text, patterns),
            has_overview: has_overview_paragraph(text),
            label_specificity: label_specificity(text, patterns),
            has_related_links: has_related_links(text, patterns),
            table_count: table_count(text, patterns),
        };

        MetricsExtraction { metrics, degraded }
    }
}

fn degrade<T: Default>(
    metric: &'static str,
    value: Result<T>,
    degraded: &mut Vec<DegradedMetric>,
) -> T {
    match value {
        Ok(value) => value,
        Err(err) => {
            warn!(metric, error = %err, "metric extraction failed; using zero value");
            degraded.push(DegradedMetric {
                metric,
                reason: format!("{err:#}"),
            });
            T::default()
        }
    }
}

fn is_cjk(ch: char) -> bool {
    matches!(
        ch,
        '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}'
    )
}

/// CJK characters count one each; other text counts whitespace-delimited
/// tokens that contain a Latin letter. Code fences and Markdown punctuation
/// are removed first.
pub fn word_count(text: &str, patterns: &MarkdownPatterns) -> usize {
    let without_code = patterns.fenced_block.replace_all(text, "");
    let cleaned = patterns
        .markdown_punctuation
        .replace_all(&without_code, " ");

    let cjk_chars = cleaned.chars().filter(|ch| is_cjk(*ch)).count();
    let latin_words = cleaned
        .split_whitespace()
        .filter(|token| token.chars().any(|ch| ch.is_ascii_alphabetic()))
        .count();

    cjk_chars + latin_words
}

pub fn diagram_count(text: &str, patterns: &MarkdownPatterns) -> usize {
    patterns.diagram_fence.find_iter(text).count()
}

fn diagram_blocks<'t>(text: &'t str, patterns: &MarkdownPatterns) -> Vec<&'t str> {
    patterns
        .diagram_block
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|body| body.as_str())
        .collect()
}

pub fn diagram_kinds(text: &str, patterns: &MarkdownPatterns) -> BTreeSet<DiagramKind> {
    diagram_blocks(text, patterns)
        .into_iter()
        .map(DiagramKind::classify)
        .collect()
}

pub fn snippet_count(text: &str, patterns: &MarkdownPatterns) -> usize {
    patterns
        .fence_language
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .filter(|language| !language.as_str().is_empty() && language.as_str() != DIAGRAM_LANGUAGE)
        .count()
}

/// Number of non-diagram code blocks carrying at least one
/// `// path/to/file.ext:L<n>` style comment.
pub fn cited_snippet_count(text: &str, patterns: &MarkdownPatterns) -> usize {
    patterns
        .tagged_block
        .captures_iter(text)
        .filter(|captures| {
            captures
                .get(1)
                .map(|language| language.as_str() != DIAGRAM_LANGUAGE)
                .unwrap_or(false)
        })
        .filter_map(|captures| captures.get(2))
        .filter(|body| patterns.snippet_citation.is_match(body.as_str()))
        .count()
}

pub fn sources_lines<'t>(text: &'t str, patterns: &MarkdownPatterns) -> Vec<&'t str> {
    text.lines()
        .filter(|line| patterns.sources_label.is_match(line))
        .collect()
}

pub fn line_number_precision(lines: &[&str], patterns: &MarkdownPatterns) -> Result<LinePrecision> {
    let mut precision = LinePrecision::default();

    for line in lines {
        let mut has_range = false;
        let mut precise = true;

        for captures in patterns.line_range.captures_iter(line) {
            has_range = true;
            let start = parse_line_number(captures.get(1).map(|m| m.as_str()), line)?;
            let end = parse_line_number(captures.get(2).map(|m| m.as_str()), line)?;
            if end.saturating_sub(start) > MAX_ACCEPTABLE_LINE_RANGE {
                precise = false;
            }
        }

        if has_range {
            if precise {
                precision.precise += 1;
            } else {
                precision.imprecise += 1;
            }
        } else if patterns.line_number.is_match(line) {
            precision.precise += 1;
        } else {
            precision.absent += 1;
        }
    }

    Ok(precision)
}

fn parse_line_number(raw: Option<&str>, line: &str) -> Result<u64> {
    raw.context("missing line number capture")?
        .parse::<u64>()
        .with_context(|| format!("invalid line number in sources line: {}", line.trim()))
}

pub fn section_count(text: &str, patterns: &MarkdownPatterns) -> usize {
    patterns.section_heading.find_iter(text).count()
}

/// True when prose sits between the `# ` title and the first `## ` heading.
pub fn has_overview_paragraph(text: &str) -> bool {
    let mut found_title = false;
    let mut in_fence = false;

    for line in text.lines() {
        if !found_title {
            if line.starts_with("# ") {
                found_title = true;
            }
            continue;
        }

        if line.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if line.starts_with("## ") {
            return false;
        }

        let trimmed = line.trim();
        if !trimmed.is_empty() && !line.starts_with('#') && !line.starts_with('>') {
            return true;
        }
    }

    false
}

pub fn label_specificity(text: &str, patterns: &MarkdownPatterns) -> LabelSpecificity {
    let mut specificity = LabelSpecificity::default();

    for block in diagram_blocks(text, patterns) {
        for captures in patterns.diagram_label.captures_iter(block) {
            let Some(label) = captures.get(1) else {
                continue;
            };
            let clean = label.as_str().trim_matches('"').trim();

            if patterns.compound_identifier.is_match(clean) || clean.split_whitespace().count() >= 2
            {
                specificity.specific += 1;
            } else if GENERIC_LABELS.contains(&clean) {
                specificity.generic += 1;
            }
        }
    }

    specificity
}

pub fn has_related_links(text: &str, patterns: &MarkdownPatterns) -> bool {
    patterns.related_marker.is_match(text)
}

pub fn table_count(text: &str, patterns: &MarkdownPatterns) -> usize {
    let lines = text.lines().collect::<Vec<&str>>();
    lines
        .windows(2)
        .filter(|pair| patterns.table_row.is_match(pair[0]) && patterns.table_separator.is_match(pair[1]))
        .count()
}
