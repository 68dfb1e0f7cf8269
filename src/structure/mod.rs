use std::collections::BTreeMap;

use crate::model::{
    PASS_SYMBOL, PageResult, SECTIONS, Scale, ScaleGuideline, Severity, StructureIssue,
    StructureIssueKind, StructureResult, section_number,
};


const PAGE_COUNT_WEIGHT: u32 = 20;
const REQUIRED_SECTIONS_WEIGHT: u32 = 30;
const CORE_RATIO_WEIGHT: u32 = 20;
const SECTION_COUNT_WEIGHT: u32 = 15;
const GRADE_DISTRIBUTION_WEIGHT: u32 = 15;

const CORE_SECTIONS: [u32; 2] = [3, 4];

pub type SectionMap = BTreeMap<u32, Vec<String>>;

/// Groups non-index pages by the leading number of their file name.
pub fn analyze_sections(pages: &[PageResult]) -> (SectionMap, Vec<String>) {
    let mut sections = SectionMap::new();
    let mut unclassified = Vec::new();

    for page in pages.iter().filter(|page| !page.is_index()) {
        let file_name = page.file_name().to_string();
        match section_number(&file_name) {
            Some(number) => sections.entry(number).or_default().push(file_name),
            None => unclassified.push(file_name),
        }
    }

    (sections, unclassified)
}

/// Five weighted checks: page count 20, required sections 30, core-content
/// ratio 20, section count 15, grade distribution 15. Falling short of a range
/// costs more than overshooting it.
pub fn validate_corpus(pages: &[PageResult], scale: Option<Scale>) -> StructureResult {
    let content_pages = pages
        .iter()
        .filter(|page| !page.is_index())
        .collect::<Vec<&PageResult>>();
    let page_count = content_pages.len();
    let scale = scale.unwrap_or_else(|| Scale::infer(page_count));
    let guide = scale.guideline();
    let (sections, unclassified) = analyze_sections(pages);

    let checks = [
        check_page_count(page_count, scale, guide),
        check_required_sections(&sections),
        check_core_ratio(&sections, page_count),
        check_section_count(sections.len(), scale, guide),
        check_grade_distribution(&content_pages),
    ];

    let mut result = StructureResult {
        scale,
        page_count,
        score: 0,
        max_score: 0,
        issues: Vec::new(),
        passes: Vec::new(),
        sections,
        unclassified,
    };
    for check in checks {
        result.score += check.points;
        result.max_score += check.weight;
        result.issues.extend(check.issues);
        result.passes.extend(check.passes);
    }
    result
}

#[derive(Debug)]
struct Check {
    weight: u32,
    points: u32,
    issues: Vec<StructureIssue>,
    passes: Vec<String>,
}

impl Check {
    fn new(weight: u32) -> Self {
        Self {
            weight,
            points: 0,
            issues: Vec::new(),
            passes: Vec::new(),
        }
    }

    fn pass(mut self, message: String) -> Self {
        self.points = self.weight;
        self.passes.push(format!("{PASS_SYMBOL} {message}"));
        self
    }

    fn award(mut self, points: u32) -> Self {
        self.points = points.min(self.weight);
        self
    }

    fn issue(mut self, severity: Severity, kind: StructureIssueKind, message: String) -> Self {
        self.issues.push(StructureIssue {
            severity,
            kind,
            message,
        });
        self
    }
}

fn check_page_count(page_count: usize, scale: Scale, guide: &ScaleGuideline) -> Check {
    let (min, max) = (guide.min_pages, guide.max_pages);
    let check = Check::new(PAGE_COUNT_WEIGHT);

    if (min..=max).contains(&page_count) {
        check.pass(format!(
            "page count: {page_count} (scale '{scale}': {min}-{max} pages)"
        ))
    } else if page_count > max {
        check.award(15).issue(
            Severity::Warning,
            StructureIssueKind::PageCountHigh,
            format!("too many pages: {page_count} (scale '{scale}': {min}-{max} pages)"),
        )
    } else if page_count * 10 >= min * 7 {
        let points = u32::try_from(page_count * 100 / (min * 7)).unwrap_or(0).min(14);
        check.award(points).issue(
            Severity::Warning,
            StructureIssueKind::PageCountLow,
            format!("page count slightly low: {page_count} (scale '{scale}': {min}-{max} pages)"),
        )
    } else {
        check.issue(
            Severity::Critical,
            StructureIssueKind::PageCountShortfall,
            format!("too few pages: {page_count} (scale '{scale}': at least {min} pages)"),
        )
    }
}

fn check_required_sections(sections: &SectionMap) -> Check {
    let mut check = Check::new(REQUIRED_SECTIONS_WEIGHT);
    let required = SECTIONS.iter().filter(|section| section.required);
    let required_total = required.clone().count();
    let required_present = required
        .clone()
        .filter(|section| sections.contains_key(&section.number))
        .count();

    if required_present == required_total {
        check = check.pass(format!(
            "required sections: {required_present}/{required_total} present"
        ));
    } else {
        let points = REQUIRED_SECTIONS_WEIGHT as usize * required_present / required_total;
        check = check.award(u32::try_from(points).unwrap_or(0));
        for section in required.filter(|section| !sections.contains_key(&section.number)) {
            check = check.issue(
                Severity::Critical,
                StructureIssueKind::MissingRequiredSection {
                    number: section.number,
                },
                format!(
                    "required section missing: Section {} ({}): {}",
                    section.number, section.name, section.description
                ),
            );
        }
    }

    for section in SECTIONS
        .iter()
        .filter(|section| !section.required && !sections.contains_key(&section.number))
    {
        check = check.issue(
            Severity::Warning,
            StructureIssueKind::MissingOptionalSection {
                number: section.number,
            },
            format!(
                "recommended section missing: Section {} ({}): {}",
                section.number, section.name, section.description
            ),
        );
    }

    check
}

fn check_core_ratio(sections: &SectionMap, page_count: usize) -> Check {
    let check = Check::new(CORE_RATIO_WEIGHT);
    if page_count == 0 {
        return check.issue(
            Severity::Critical,
            StructureIssueKind::EmptyCorpus,
            "no content pages; core-content ratio cannot be assessed".to_string(),
        );
    }

    let core_pages = CORE_SECTIONS
        .iter()
        .map(|number| sections.get(number).map(Vec::len).unwrap_or(0))
        .sum::<usize>();
    let ratio = core_pages as f64 / page_count as f64;
    let share = format!("{core_pages}/{page_count} ({:.0}%)", ratio * 100.0);

    if (0.40..=0.70).contains(&ratio) {
        check.pass(format!("Core Systems + User Guide share: {share}"))
    } else if (0.30..0.40).contains(&ratio) {
        check.award(10).issue(
            Severity::Warning,
            StructureIssueKind::CoreRatio,
            format!("Core Systems + User Guide share is low: {share}, recommended 50-60%"),
        )
    } else if ratio > 0.70 {
        check.award(15).issue(
            Severity::Warning,
            StructureIssueKind::CoreRatio,
            format!(
                "Core Systems + User Guide share is too high: {share}; flesh out Overview and Getting Started"
            ),
        )
    } else {
        check.issue(
            Severity::Critical,
            StructureIssueKind::CoreRatio,
            format!("Core Systems + User Guide share is inadequate: {share}, recommended 50-60%"),
        )
    }
}

fn check_section_count(section_count: usize, scale: Scale, guide: &ScaleGuideline) -> Check {
    let (min, max) = (guide.min_sections, guide.max_sections);
    let check = Check::new(SECTION_COUNT_WEIGHT);

    if (min..=max).contains(&section_count) {
        check.pass(format!(
            "sections: {section_count} (scale '{scale}': {min}-{max})"
        ))
    } else if section_count > max {
        check.award(12).issue(
            Severity::Warning,
            StructureIssueKind::SectionCount,
            format!("too many sections: {section_count} (scale '{scale}': {min}-{max})"),
        )
    } else if section_count + 1 >= min {
        check.award(8).issue(
            Severity::Warning,
            StructureIssueKind::SectionCount,
            format!("section count slightly low: {section_count} (scale '{scale}': {min}-{max})"),
        )
    } else {
        check.issue(
            Severity::Critical,
            StructureIssueKind::SectionCount,
            format!("too few sections: {section_count} (scale '{scale}': at least {min})"),
        )
    }
}

fn check_grade_distribution(content_pages: &[&PageResult]) -> Check {
    let page_count = content_pages.len();
    let good = content_pages
        .iter()
        .filter(|page| page.grade().is_good())
        .count();
    let failing = content_pages
        .iter()
        .filter(|page| page.grade().is_failing())
        .count();
    let share = if page_count == 0 {
        0.0
    } else {
        good as f64 / page_count as f64 * 100.0
    };
    let summary = format!("{good}/{page_count} ({share:.0}%)");
    let check = Check::new(GRADE_DISTRIBUTION_WEIGHT);

    let check = if page_count > 0 && good * 10 >= page_count * 8 {
        check.pass(format!("pages graded B or better: {summary}"))
    } else if page_count > 0 && good * 10 >= page_count * 6 {
        check.award(10).issue(
            Severity::Warning,
            StructureIssueKind::GradeDistribution,
            format!("share of pages graded B or better is low: {summary}, target 80%+"),
        )
    } else {
        check.award(if good > 0 { 5 } else { 0 }).issue(
            Severity::Critical,
            StructureIssueKind::GradeDistribution,
            format!("share of pages graded B or better is inadequate: {summary}, target 80%+"),
        )
    };

    if failing > 0 {
        check.issue(
            Severity::Critical,
            StructureIssueKind::FailingPages { count: failing },
            format!("{failing} page(s) graded D or F must be fixed"),
        )
    } else {
        check
    }
}
