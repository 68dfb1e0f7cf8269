use std::path::Path;

use crate::model::{
    Criterion, INDEX_FILE_NAME, PASS_SYMBOL, PageIssue, PageResult, Severity, Tier, file_name_of,
    section_number,
};
use crate::util::sha256_text;

use super::criteria::{Assessment, RUBRIC};
use super::metrics::{DegradedMetric, PageMetrics};
use super::patterns::MarkdownPatterns;

/// Tier implied by a page's file name: `index.md` is index, sections 1 and 4
/// are high, every other page is medium.
pub fn detect_tier(file: &str) -> Tier {
    let file_name = file_name_of(file);
    if file_name == INDEX_FILE_NAME {
        return Tier::Index;
    }

    match section_number(file_name) {
        Some(1 | 4) => Tier::High,
        _ => Tier::Medium,
    }
}

pub fn evaluate_page(
    file: &str,
    text: &str,
    tier: Option<Tier>,
    patterns: &MarkdownPatterns,
) -> PageResult {
    let tier = tier.unwrap_or_else(|| detect_tier(file));
    let extraction = PageMetrics::extract(text, patterns);

    let mut result = score_metrics(file, tier, extraction.metrics, &extraction.degraded);
    result.content_sha256 = Some(sha256_text(text));
    result
}

/// Result for a page whose text could not be read: the rubric runs over
/// zero-valued metrics and a leading warning names the failure.
pub fn unreadable_page(file: &Path, tier: Option<Tier>, reason: &str) -> PageResult {
    let file = file.display().to_string();
    let tier = tier.unwrap_or_else(|| detect_tier(&file));

    let mut result = score_metrics(&file, tier, PageMetrics::default(), &[]);
    result.issues.insert(
        0,
        PageIssue {
            severity: Severity::Warning,
            criterion: None,
            message: format!("page could not be read: {reason}"),
        },
    );
    result
}

pub fn score_metrics(
    file: &str,
    tier: Tier,
    metrics: PageMetrics,
    degraded: &[DegradedMetric],
) -> PageResult {
    let reqs = tier.requirements();

    let tally = RUBRIC.iter().fold(Tally::default(), |tally, rule| {
        tally.record(rule.criterion, (rule.assess)(&metrics, reqs, tier))
    });

    let mut issues = degraded
        .iter()
        .map(|failure| PageIssue {
            severity: Severity::Warning,
            criterion: None,
            message: format!(
                "metric '{}' could not be extracted ({}); scored as zero",
                failure.metric, failure.reason
            ),
        })
        .collect::<Vec<PageIssue>>();
    issues.extend(tally.issues);

    PageResult {
        file: file.to_string(),
        tier,
        score: tally.score,
        max_score: tally.max_score,
        issues,
        passes: tally.passes,
        content_sha256: None,
        metrics,
    }
}

#[derive(Debug, Default)]
struct Tally {
    score: u32,
    max_score: u32,
    issues: Vec<PageIssue>,
    passes: Vec<String>,
}

impl Tally {
    fn record(mut self, criterion: Criterion, assessment: Assessment) -> Self {
        let weight = criterion.weight();

        match assessment {
            Assessment::Skipped => return self,
            Assessment::Full(message) | Assessment::Waived(message) => {
                self.score += weight;
                self.passes.push(format!("{PASS_SYMBOL} {message}"));
            }
            Assessment::Allowance { points, message } => {
                self.score += points.min(weight);
                self.passes.push(format!("{PASS_SYMBOL} {message}"));
            }
            Assessment::Partial {
                points,
                severity,
                message,
            } => {
                self.score += points.min(weight);
                self.push_issue(criterion, severity, message);
            }
            Assessment::Zero { severity, message } => {
                self.push_issue(criterion, severity, message);
            }
        }

        self.max_score += weight;
        self
    }

    fn push_issue(&mut self, criterion: Criterion, severity: Severity, message: String) {
        self.issues.push(PageIssue {
            severity,
            criterion: Some(criterion),
            message,
        });
    }
}
