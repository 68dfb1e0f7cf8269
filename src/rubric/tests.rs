use super::criteria::{Assessment, RUBRIC};
use super::evaluate::{detect_tier, score_metrics};
use super::metrics::{
    DiagramKind, LinePrecision, PageMetrics, has_overview_paragraph, has_related_links,
    label_specificity, line_number_precision, sources_lines, table_count, word_count,
};
use super::{MarkdownPatterns, evaluate_page};
use crate::model::{Criterion, Grade, Severity, Tier};

fn patterns() -> MarkdownPatterns {
    MarkdownPatterns::compile().expect("patterns should compile")
}

fn snippet(cited: bool) -> String {
    let citation = if cited { "// src/store.rs:L12\n" } else { "" };
    format!("```rust\n{citation}fn open_store() -> Store {{\n    Store::default()\n}}\n```\n\n")
}

/// A page that satisfies every threshold of the high tier.
fn complete_page() -> String {
    let mut page = String::new();
    page.push_str("# Storage Engine\n\n");
    page.push_str("The storage engine persists records and serves reads for every caller.\n\n");

    page.push_str("## Architecture\n\n");
    page.push_str(&"storage ".repeat(1250));
    page.push_str("\n\n```mermaid\nflowchart TD\n    A[ConfigLoader] --> B[parseArgs]\n```\n\n");
    page.push_str("```mermaid\nsequenceDiagram\n    ClientSession->>StoreWriter: write\n```\n\n");
    page.push_str("**Sources:** [src/store.rs:L10-L50](src/store.rs)\n\n");

    page.push_str("## Components\n\n");
    for _ in 0..5 {
        page.push_str(&snippet(true));
    }
    page.push_str("**Sources:** [src/writer.rs:L1-L120](src/writer.rs)\n\n");

    page.push_str("## Settings\n\n");
    page.push_str("| key | meaning |\n|-----|---------|\n| path | data directory |\n\n");
    page.push_str("**Sources:** [src/config.rs:L5](src/config.rs)\n\n");

    page.push_str("## Related pages\n\n");
    page.push_str("- [Getting started](2.1-setup.md)\n\n");
    page.push_str("**Sources:** [src/lib.rs:L1-L30](src/lib.rs)\n");
    page
}

fn assess(criterion: Criterion, metrics: &PageMetrics, tier: Tier) -> Assessment {
    let rule = RUBRIC
        .iter()
        .find(|rule| rule.criterion == criterion)
        .expect("criterion should be in the rubric");
    (rule.assess)(metrics, tier.requirements(), tier)
}

fn issue_for(result: &crate::model::PageResult, criterion: Criterion) -> Option<Severity> {
    result
        .issues
        .iter()
        .find(|issue| issue.criterion == Some(criterion))
        .map(|issue| issue.severity)
}

#[test]
fn complete_page_earns_every_point_on_content_tiers() {
    let patterns = patterns();
    let page = complete_page();

    for tier in [Tier::High, Tier::Medium, Tier::Low] {
        let result = evaluate_page("1.1-storage.md", &page, Some(tier), &patterns);
        assert!(result.issues.is_empty(), "{tier}: unexpected issues {:?}", result.issues);
        assert_eq!(result.score, result.max_score, "{tier}");
        assert_eq!(result.max_score, 95, "{tier}");
        assert_eq!(result.percentage(), 100.0);
        assert_eq!(result.grade(), Grade::A);
    }
}

#[test]
fn score_never_exceeds_max_score() {
    let patterns = patterns();
    let documents = [
        String::new(),
        "# Title only\n".to_string(),
        "# Notes\n\nSee also the setup page.\n\n## One\n\ntext\n".to_string(),
        format!("# Mixed\n\nIntro.\n\n{}", snippet(false)),
        complete_page(),
    ];

    for document in &documents {
        for tier in Tier::ALL {
            let result = evaluate_page("2.1-page.md", document, Some(tier), &patterns);
            assert!(result.score <= result.max_score, "{tier}: {result:?}");
            assert!(result.max_score <= 100, "{tier}: {result:?}");
        }
    }
}

#[test]
fn index_tier_waives_snippets_and_sources() {
    let patterns = patterns();
    let result = evaluate_page("index.md", &complete_page(), None, &patterns);

    assert_eq!(result.tier, Tier::Index);
    assert!(
        result
            .passes
            .iter()
            .any(|pass| pass.contains("code snippets: not required"))
    );
    assert!(
        result
            .passes
            .iter()
            .any(|pass| pass.contains("Sources lines: not required"))
    );
    // Line numbers earn half credit when the tier does not require them.
    assert_eq!(result.max_score - result.score, 5);
}

#[test]
fn bounded_line_range_is_precise_and_wide_range_is_not() {
    let patterns = patterns();
    let text = "Sources: [a.ts:L10-L50](a.ts)\nSources: [b.ts:L1-L1000](b.ts)\nSources: see a.ts\n";
    let lines = sources_lines(text, &patterns);
    assert_eq!(lines.len(), 3);

    let precision = line_number_precision(&lines, &patterns).expect("line numbers should parse");
    assert_eq!(
        precision,
        LinePrecision {
            precise: 1,
            imprecise: 1,
            absent: 1,
        }
    );
}

#[test]
fn only_imprecise_ranges_earn_three_points() {
    let metrics = PageMetrics {
        sources_line_count: 2,
        line_precision: LinePrecision {
            precise: 0,
            imprecise: 2,
            absent: 0,
        },
        ..PageMetrics::default()
    };

    let assessment = assess(Criterion::SourcesPrecision, &metrics, Tier::Medium);
    assert!(
        matches!(assessment, Assessment::Partial { points: 3, .. }),
        "unexpected assessment: {assessment:?}"
    );
}

#[test]
fn flowchart_and_sequence_diagram_satisfy_medium_diagram_criteria() {
    let patterns = patterns();
    let text = "# Flow\n\nIntro.\n\n```mermaid\ngraph TD\n    A[RequestParser] --> B[handleRequest]\n```\n\n```mermaid\nsequenceDiagram\n    A->>B: call\n```\n";
    let result = evaluate_page("3.1-flow.md", text, Some(Tier::Medium), &patterns);

    assert_eq!(result.metrics.diagram_count, 2);
    assert_eq!(
        result.metrics.diagram_kinds.iter().copied().collect::<Vec<_>>(),
        vec![DiagramKind::Flowchart, DiagramKind::Sequence]
    );
    assert_eq!(issue_for(&result, Criterion::DiagramCount), None);
    assert_eq!(issue_for(&result, Criterion::DiagramDiversity), None);
    assert_eq!(issue_for(&result, Criterion::DiagramSpecificity), None);
}

#[test]
fn three_of_five_cited_snippets_meets_citation_bar() {
    let patterns = patterns();
    let mut text = "# Snippets\n\nIntro.\n\n".to_string();
    for cited in [true, false, true, false, true] {
        text.push_str(&snippet(cited));
    }

    let result = evaluate_page("2.1-snippets.md", &text, Some(Tier::High), &patterns);
    assert_eq!(result.metrics.snippet_count, 5);
    assert_eq!(result.metrics.cited_snippet_count, 3);
    assert_eq!(issue_for(&result, Criterion::CitationRatio), None);
    assert_eq!(issue_for(&result, Criterion::SnippetCount), None);
}

#[test]
fn citation_ratio_is_skipped_without_snippets() {
    let metrics = PageMetrics::default();
    assert_eq!(
        assess(Criterion::CitationRatio, &metrics, Tier::High),
        Assessment::Skipped
    );
    assert_eq!(
        assess(Criterion::DiagramSpecificity, &metrics, Tier::High),
        Assessment::Skipped
    );
}

#[test]
fn partial_snippet_credit_is_floored_and_capped() {
    let two = PageMetrics {
        snippet_count: 2,
        ..PageMetrics::default()
    };
    assert!(matches!(
        assess(Criterion::SnippetCount, &two, Tier::High),
        Assessment::Partial { points: 6, .. }
    ));

    let four = PageMetrics {
        snippet_count: 4,
        ..PageMetrics::default()
    };
    assert!(matches!(
        assess(Criterion::SnippetCount, &four, Tier::High),
        Assessment::Partial { points: 10, .. }
    ));
}

#[test]
fn word_count_above_seventy_percent_earns_partial_credit() {
    let metrics = PageMetrics {
        word_count: 840,
        ..PageMetrics::default()
    };
    assert!(matches!(
        assess(Criterion::WordCount, &metrics, Tier::High),
        Assessment::Partial {
            points: 8,
            severity: Severity::Warning,
            ..
        }
    ));

    let short = PageMetrics {
        word_count: 839,
        ..PageMetrics::default()
    };
    assert!(matches!(
        assess(Criterion::WordCount, &short, Tier::High),
        Assessment::Zero {
            severity: Severity::Critical,
            ..
        }
    ));
}

#[test]
fn tables_are_optional_below_high_tier() {
    let metrics = PageMetrics::default();
    assert!(matches!(
        assess(Criterion::Tables, &metrics, Tier::Low),
        Assessment::Allowance { points: 3, .. }
    ));
    assert!(matches!(
        assess(Criterion::Tables, &metrics, Tier::High),
        Assessment::Zero {
            severity: Severity::Critical,
            ..
        }
    ));
}

#[test]
fn unparsable_line_number_degrades_only_that_metric() {
    let patterns = patterns();
    let text = "# Page\n\nSome intro words here.\n\nSources: [a.rs:L99999999999999999999999-L2](a.rs)\n";
    let result = evaluate_page("2.1-page.md", text, Some(Tier::Medium), &patterns);

    let first = result.issues.first().expect("degraded metric should be reported");
    assert_eq!(first.severity, Severity::Warning);
    assert_eq!(first.criterion, None);
    assert!(first.message.contains("line_precision"), "{}", first.message);

    assert_eq!(result.metrics.line_precision, LinePrecision::default());
    assert_eq!(result.metrics.sources_line_count, 1);
    assert!(result.metrics.word_count > 0);
    assert!(result.metrics.has_overview);
}

#[test]
fn degraded_metrics_are_listed_before_rubric_issues() {
    let degraded = [super::metrics::DegradedMetric {
        metric: "line_precision",
        reason: "bad input".to_string(),
    }];
    let result = score_metrics("2.1-page.md", Tier::Low, PageMetrics::default(), &degraded);

    assert_eq!(result.issues[0].criterion, None);
    assert!(result.issues[1..].iter().all(|issue| issue.criterion.is_some()));
}

#[test]
fn tier_follows_file_name() {
    assert_eq!(detect_tier("wiki/index.md"), Tier::Index);
    assert_eq!(detect_tier("wiki/1.2-layout.md"), Tier::High);
    assert_eq!(detect_tier("4-core.md"), Tier::High);
    assert_eq!(detect_tier("2.1-setup.md"), Tier::Medium);
    assert_eq!(detect_tier("10.1-extra.md"), Tier::Medium);
    assert_eq!(detect_tier("notes.md"), Tier::Medium);
}

#[test]
fn evaluation_is_deterministic() {
    let patterns = patterns();
    let page = complete_page();
    let first = evaluate_page("4.1-core.md", &page, None, &patterns);
    let second = evaluate_page("4.1-core.md", &page, None, &patterns);

    assert_eq!(first, second);
    assert!(first.content_sha256.is_some());
}

#[test]
fn word_count_counts_cjk_characters_and_latin_words() {
    let patterns = patterns();
    assert_eq!(word_count("# 概要\n\n日本語のテキスト", &patterns), 10);
    assert_eq!(word_count("storage エンジン", &patterns), 5);
    assert_eq!(
        word_count("Two words\n\n```rust\nlet hidden = 1;\n```\n", &patterns),
        2
    );
}

#[test]
fn overview_paragraph_requires_prose_before_first_section() {
    assert!(has_overview_paragraph("# Title\n\nScope of this page.\n\n## Details\n"));
    assert!(!has_overview_paragraph("# Title\n\n## Details\n\nText.\n"));
    assert!(!has_overview_paragraph(
        "# Title\n\n> note only\n\n```text\ncode\n```\n\n## Details\n"
    ));
    assert!(!has_overview_paragraph("No title at all.\n"));
}

#[test]
fn table_needs_header_and_separator_rows() {
    let patterns = patterns();
    assert_eq!(
        table_count("| a | b |\n|---|:-:|\n| 1 | 2 |\n", &patterns),
        1
    );
    assert_eq!(table_count("| a | b |\n| 1 | 2 |\n", &patterns), 0);
}

#[test]
fn diagram_labels_split_into_specific_and_generic() {
    let patterns = patterns();
    let text = "```mermaid\ngraph TD\n    A[Service] --> B[Manager]\n    B --> C[IndexWriter]\n    C --> D[write batch]\n```\n";
    let labels = label_specificity(text, &patterns);

    assert_eq!(labels.specific, 2);
    assert_eq!(labels.generic, 2);
}

#[test]
fn related_links_accept_localized_markers() {
    let patterns = patterns();
    for text in [
        "## Related pages\n\n- [Setup](2.1-setup.md)\n",
        "See also [Setup](2.1-setup.md).\n",
        "## 関連ページ\n\n- [セットアップ](2.1-setup.md)\n",
        "参照: [セットアップ](2.1-setup.md)\n",
        "[← 前](1.1-overview.md) | [→ 次](2.2-auth.md)\n",
    ] {
        assert!(has_related_links(text, &patterns), "marker not found in {text:?}");
    }
    assert!(!has_related_links("# Page\n\nBody text only.\n", &patterns));
}

#[test]
fn missing_related_links_cost_a_warning() {
    let patterns = patterns();

    let linked = evaluate_page("2.1-page.md", "## A\n\n関連ページ: foo\n", None, &patterns);
    assert!(linked.metrics.has_related_links);
    assert_eq!(issue_for(&linked, Criterion::RelatedLinks), None);

    let unlinked = evaluate_page("2.1-page.md", "# Page\n\nBody text only.\n", None, &patterns);
    assert!(!unlinked.metrics.has_related_links);
    assert_eq!(
        issue_for(&unlinked, Criterion::RelatedLinks),
        Some(Severity::Warning)
    );
    assert!(matches!(
        assess(Criterion::RelatedLinks, &unlinked.metrics, Tier::Medium),
        Assessment::Zero {
            severity: Severity::Warning,
            ..
        }
    ));
}
