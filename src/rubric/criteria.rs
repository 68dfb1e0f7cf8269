use crate::model::{Criterion, RequirementProfile, Severity, Tier};

use super::metrics::{MAX_ACCEPTABLE_LINE_RANGE, PageMetrics};

/// Outcome of assessing one criterion against one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Assessment {
    Full(String),
    /// Criterion not required for the tier; full credit.
    Waived(String),
    /// Reduced credit that still counts as acceptable for the tier.
    Allowance { points: u32, message: String },
    Partial {
        points: u32,
        severity: Severity,
        message: String,
    },
    Zero { severity: Severity, message: String },
    /// Prerequisite metric absent; contributes to neither score nor max-score.
    Skipped,
}

type Assessor = fn(&PageMetrics, &RequirementProfile, Tier) -> Assessment;

pub(super) struct CriterionRule {
    pub criterion: Criterion,
    pub assess: Assessor,
}

pub(super) const RUBRIC: [CriterionRule; 12] = [
    CriterionRule {
        criterion: Criterion::WordCount,
        assess: word_count,
    },
    CriterionRule {
        criterion: Criterion::DiagramCount,
        assess: diagram_count,
    },
    CriterionRule {
        criterion: Criterion::DiagramDiversity,
        assess: diagram_diversity,
    },
    CriterionRule {
        criterion: Criterion::SnippetCount,
        assess: snippet_count,
    },
    CriterionRule {
        criterion: Criterion::CitationRatio,
        assess: citation_ratio,
    },
    CriterionRule {
        criterion: Criterion::SourcesPresence,
        assess: sources_presence,
    },
    CriterionRule {
        criterion: Criterion::SourcesPrecision,
        assess: sources_precision,
    },
    CriterionRule {
        criterion: Criterion::SectionCount,
        assess: section_count,
    },
    CriterionRule {
        criterion: Criterion::OverviewParagraph,
        assess: overview_paragraph,
    },
    CriterionRule {
        criterion: Criterion::DiagramSpecificity,
        assess: diagram_specificity,
    },
    CriterionRule {
        criterion: Criterion::RelatedLinks,
        assess: related_links,
    },
    CriterionRule {
        criterion: Criterion::Tables,
        assess: tables,
    },
];

const SNIPPET_PARTIAL_CAP: u32 = 10;

fn partial(points: u32, message: String) -> Assessment {
    Assessment::Partial {
        points,
        severity: Severity::Warning,
        message,
    }
}

fn critical(message: String) -> Assessment {
    Assessment::Zero {
        severity: Severity::Critical,
        message,
    }
}

fn warning(message: String) -> Assessment {
    Assessment::Zero {
        severity: Severity::Warning,
        message,
    }
}

fn word_count(metrics: &PageMetrics, reqs: &RequirementProfile, _: Tier) -> Assessment {
    let (actual, required) = (metrics.word_count, reqs.min_words);
    if actual >= required {
        Assessment::Full(format!("word count: {actual} (required: {required}+)"))
    } else if actual * 10 >= required * 7 {
        partial(
            8,
            format!("word count short: {actual} (required: {required}+, above 70% so partial credit)"),
        )
    } else {
        critical(format!("word count short: {actual} (required: {required}+)"))
    }
}

fn diagram_count(metrics: &PageMetrics, reqs: &RequirementProfile, _: Tier) -> Assessment {
    let (actual, required) = (metrics.diagram_count, reqs.min_diagrams);
    if actual >= required {
        Assessment::Full(format!("diagrams: {actual} (required: {required}+)"))
    } else if actual > 0 {
        partial(5, format!("too few diagrams: {actual} (required: {required}+)"))
    } else {
        critical(format!("no diagrams (required: {required}+)"))
    }
}

fn diagram_diversity(metrics: &PageMetrics, reqs: &RequirementProfile, _: Tier) -> Assessment {
    let actual = metrics.diagram_kinds.len();
    let required = reqs.min_diagram_types;
    let kinds = metrics
        .diagram_kinds
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<&str>>()
        .join(", ");

    if actual >= required {
        Assessment::Full(format!(
            "diagram types: {kinds} ({actual} kinds, required: {required}+)"
        ))
    } else if actual > 0 {
        partial(
            2,
            format!("too few diagram types: {kinds} ({actual} kinds, required: {required}+)"),
        )
    } else {
        critical(format!("no diagram types (required: {required}+)"))
    }
}

fn snippet_count(metrics: &PageMetrics, reqs: &RequirementProfile, tier: Tier) -> Assessment {
    let (actual, required) = (metrics.snippet_count, reqs.min_snippets);
    if required == 0 {
        return Assessment::Waived(format!(
            "code snippets: not required for this tier ({tier})"
        ));
    }

    if actual >= required {
        Assessment::Full(format!("code snippets: {actual} (required: {required}+)"))
    } else if actual > 0 {
        let weight = Criterion::SnippetCount.weight() as usize;
        let points = u32::try_from(weight * actual / required)
            .unwrap_or(SNIPPET_PARTIAL_CAP)
            .min(SNIPPET_PARTIAL_CAP);
        partial(
            points,
            format!("too few code snippets: {actual} (required: {required}+)"),
        )
    } else {
        critical(format!("no code snippets (required: {required}+)"))
    }
}

fn citation_ratio(metrics: &PageMetrics, _: &RequirementProfile, _: Tier) -> Assessment {
    let (cited, snippets) = (metrics.cited_snippet_count, metrics.snippet_count);
    if snippets == 0 {
        return Assessment::Skipped;
    }

    if cited * 10 >= snippets * 6 {
        Assessment::Full(format!(
            "snippet citations: {cited}/{snippets} snippets cite their source"
        ))
    } else if cited > 0 {
        partial(
            2,
            format!("snippet citations short: only {cited}/{snippets} snippets cite their source (60% required)"),
        )
    } else {
        critical(
            "no snippet citations (each snippet needs a `// path/to/file.ts:L<line>` comment)"
                .to_string(),
        )
    }
}

fn sources_presence(metrics: &PageMetrics, reqs: &RequirementProfile, tier: Tier) -> Assessment {
    let (actual, required) = (metrics.sources_line_count, reqs.min_sources_lines);
    if required == 0 {
        return Assessment::Waived(format!(
            "Sources lines: not required for this tier ({tier})"
        ));
    }

    if actual >= required {
        Assessment::Full(format!("Sources lines: {actual} (required: {required}+)"))
    } else if actual > 0 {
        partial(
            5,
            format!("too few Sources lines: {actual} (required: {required}+)"),
        )
    } else {
        critical(format!("no Sources lines (required: {required}+)"))
    }
}

fn sources_precision(metrics: &PageMetrics, reqs: &RequirementProfile, tier: Tier) -> Assessment {
    let lines = metrics.sources_line_count;
    let precision = metrics.line_precision;

    if !reqs.sources_need_line_numbers {
        return if lines > 0 {
            Assessment::Allowance {
                points: 5,
                message: format!(
                    "Sources line numbers: not required for this tier ({tier}), half credit"
                ),
            }
        } else {
            warning("no Sources lines; line-number precision not assessed".to_string())
        };
    }

    if lines == 0 {
        return critical("no Sources lines to carry line numbers".to_string());
    }

    if precision.precise > 0 && precision.imprecise == 0 && precision.absent == 0 {
        Assessment::Full(format!(
            "Sources line numbers: all {} lines precise",
            precision.precise
        ))
    } else if precision.precise > 0 {
        let mut parts = Vec::new();
        if precision.imprecise > 0 {
            parts.push(format!(
                "{} imprecise (span > {MAX_ACCEPTABLE_LINE_RANGE} lines)",
                precision.imprecise
            ));
        }
        if precision.absent > 0 {
            parts.push(format!("{} without line numbers", precision.absent));
        }
        partial(
            7,
            format!(
                "Sources line numbers: {} precise, {}",
                precision.precise,
                parts.join(", ")
            ),
        )
    } else if precision.imprecise > 0 {
        partial(
            3,
            format!(
                "Sources line numbers imprecise: {} lines span more than {MAX_ACCEPTABLE_LINE_RANGE} lines (L1-L1000 is rejected)",
                precision.imprecise
            ),
        )
    } else {
        critical("Sources lines carry no line numbers (e.g. [file.ts:L100-L200])".to_string())
    }
}

fn section_count(metrics: &PageMetrics, reqs: &RequirementProfile, _: Tier) -> Assessment {
    let (actual, required) = (metrics.section_count, reqs.min_sections);
    let message = format!("too few sections: {actual} (required: {required}+)");
    if actual >= required {
        Assessment::Full(format!("sections: {actual} (required: {required}+)"))
    } else if actual > 0 {
        partial(2, message)
    } else {
        warning(message)
    }
}

fn overview_paragraph(metrics: &PageMetrics, _: &RequirementProfile, _: Tier) -> Assessment {
    if metrics.has_overview {
        Assessment::Full("overview paragraph present".to_string())
    } else {
        critical("no overview paragraph (a scope summary must follow the # heading)".to_string())
    }
}

fn diagram_specificity(metrics: &PageMetrics, _: &RequirementProfile, _: Tier) -> Assessment {
    if metrics.diagram_count == 0 {
        return Assessment::Skipped;
    }

    let labels = metrics.label_specificity;
    if labels.specific > 0 {
        Assessment::Full(format!(
            "diagram labels name concrete code: {}",
            labels.specific
        ))
    } else if labels.generic > 0 {
        partial(
            2,
            format!(
                "diagram labels are generic only ({}); use real class and function names",
                labels.generic
            ),
        )
    } else {
        warning("diagram nodes carry no recognizable labels".to_string())
    }
}

fn related_links(metrics: &PageMetrics, _: &RequirementProfile, _: Tier) -> Assessment {
    if metrics.has_related_links {
        Assessment::Full("related-page links present".to_string())
    } else {
        warning("no related-page links".to_string())
    }
}

fn tables(metrics: &PageMetrics, reqs: &RequirementProfile, tier: Tier) -> Assessment {
    let (actual, required) = (metrics.table_count, reqs.min_tables);

    if required == 0 {
        return if actual > 0 {
            Assessment::Full(format!("tables: {actual} (recommended)"))
        } else {
            Assessment::Allowance {
                points: 3,
                message: format!("tables: optional for this tier ({tier})"),
            }
        };
    }

    if actual >= required {
        Assessment::Full(format!("tables: {actual} (required: {required}+)"))
    } else if actual > 0 {
        partial(2, format!("too few tables: {actual} (required: {required}+)"))
    } else {
        critical(format!(
            "no tables (required: {required}+; tabulate enums, constants and categories)"
        ))
    }
}
