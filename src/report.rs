use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::{Grade, Instruction, PageResult, StructureResult, percentage, section_definition};

const RULE_WIDTH: usize = 60;
const TOP_ISSUES_PER_FAILING_PAGE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub page_count: usize,
    pub total_score: u32,
    pub total_max_score: u32,
    pub percentage: f64,
    pub grade_distribution: BTreeMap<String, usize>,
}

impl CorpusSummary {
    pub fn from_pages(pages: &[PageResult]) -> Self {
        let total_score = pages.iter().map(|page| page.score).sum::<u32>();
        let total_max_score = pages.iter().map(|page| page.max_score).sum::<u32>();

        let mut grade_distribution = BTreeMap::new();
        for page in pages {
            *grade_distribution
                .entry(page.grade().as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            page_count: pages.len(),
            total_score,
            total_max_score,
            percentage: percentage(total_score, total_max_score),
            grade_distribution,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageReport<'a> {
    #[serde(flatten)]
    pub page: &'a PageResult,
    pub grade: Grade,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct QualityReport<'a> {
    pub report_version: u32,
    pub generated_at: String,
    pub target: String,
    pub passed: bool,
    pub pages: Vec<PageReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CorpusSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<&'a StructureResult>,
    pub instructions: &'a [Instruction],
}

impl<'a> QualityReport<'a> {
    pub fn new(
        generated_at: String,
        target: String,
        pages: &'a [PageResult],
        structure: Option<&'a StructureResult>,
        instructions: &'a [Instruction],
    ) -> Self {
        let summary = structure.map(|_| CorpusSummary::from_pages(pages));
        Self {
            report_version: 1,
            generated_at,
            target,
            passed: pages.iter().all(|page| !page.grade().is_failing()),
            pages: pages
                .iter()
                .map(|page| PageReport {
                    page,
                    grade: page.grade(),
                    percentage: page.percentage(),
                })
                .collect(),
            summary,
            structure,
            instructions,
        }
    }
}

pub fn write_json<W: Write, T: Serialize>(output: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *output, value).context("failed to serialize json report")?;
    writeln!(output)?;
    Ok(())
}

fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, RULE_WIDTH).collect()
}

pub fn write_page_result<W: Write>(output: &mut W, page: &PageResult) -> Result<()> {
    writeln!(output, "{}", rule('='))?;
    writeln!(output, "📄 {}", page.file_name())?;
    writeln!(
        output,
        "   Importance: {}  |  Grade: {}  |  Score: {}/{} ({:.0}%)",
        page.tier,
        page.grade(),
        page.score,
        page.max_score,
        page.percentage()
    )?;
    writeln!(output, "{}", rule('='))?;

    if !page.issues.is_empty() {
        writeln!(output)?;
        writeln!(output, "  Needs improvement:")?;
        for issue in &page.issues {
            writeln!(output, "    {issue}")?;
        }
    }

    if !page.passes.is_empty() {
        writeln!(output)?;
        writeln!(output, "  Passed:")?;
        for pass in &page.passes {
            writeln!(output, "    {pass}")?;
        }
    }

    writeln!(output)?;
    Ok(())
}

pub fn write_summary<W: Write>(output: &mut W, pages: &[PageResult]) -> Result<()> {
    let summary = CorpusSummary::from_pages(pages);

    writeln!(output)?;
    writeln!(output, "{}", rule('#'))?;
    writeln!(output, "  Wiki quality report")?;
    writeln!(output, "{}", rule('#'))?;
    writeln!(output)?;
    writeln!(
        output,
        "  Overall score: {}/{} ({:.0}%)",
        summary.total_score, summary.total_max_score, summary.percentage
    )?;
    writeln!(output, "  Pages: {}", summary.page_count)?;
    let distribution = summary
        .grade_distribution
        .iter()
        .map(|(grade, count)| format!("{grade}={count}"))
        .collect::<Vec<String>>()
        .join(", ");
    writeln!(output, "  Grade distribution: {distribution}")?;
    writeln!(output)?;

    writeln!(output, "  {:<45} {:>5}  {:>10}", "Page", "Grade", "Score")?;
    writeln!(output, "  {} {}  {}", "-".repeat(45), "-".repeat(5), "-".repeat(10))?;
    for page in pages {
        writeln!(
            output,
            "  {:<45} {:>5}  {:>3}/{:<3} ({:.0}%)",
            page.file_name(),
            page.grade().as_str(),
            page.score,
            page.max_score,
            page.percentage()
        )?;
    }

    let failing = pages
        .iter()
        .filter(|page| page.grade().is_failing())
        .collect::<Vec<&PageResult>>();
    if !failing.is_empty() {
        writeln!(output)?;
        writeln!(output, "  ⚠️  Pages needing rework ({}):", failing.len())?;
        for page in failing {
            let top_issues = page
                .critical_issues()
                .take(TOP_ISSUES_PER_FAILING_PAGE)
                .map(|issue| issue.to_string())
                .collect::<Vec<String>>()
                .join(", ");
            writeln!(output, "    - {}: {top_issues}", page.file_name())?;
        }
    }

    writeln!(output)?;
    Ok(())
}

pub fn write_structure_result<W: Write>(output: &mut W, structure: &StructureResult) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "{}", rule('='))?;
    writeln!(output, "  📊 Wiki structure check (scale: {})", structure.scale)?;
    writeln!(output, "{}", rule('='))?;
    writeln!(
        output,
        "  Score: {}/{} ({:.0}%)",
        structure.score,
        structure.max_score,
        structure.percentage()
    )?;
    writeln!(output)?;

    writeln!(output, "  Pages per section:")?;
    for (number, pages) in &structure.sections {
        let (name, mark) = match section_definition(*number) {
            Some(section) => (section.name.to_string(), if section.required { "★" } else { " " }),
            None => (format!("Section {number}"), " "),
        };
        writeln!(
            output,
            "    {mark} Section {number} ({name}): {} page(s)",
            pages.len()
        )?;
    }
    if !structure.unclassified.is_empty() {
        writeln!(
            output,
            "      Unnumbered: {}",
            structure.unclassified.join(", ")
        )?;
    }
    writeln!(output)?;

    if !structure.passes.is_empty() {
        writeln!(output, "  Passed:")?;
        for pass in &structure.passes {
            writeln!(output, "    {pass}")?;
        }
        writeln!(output)?;
    }

    if !structure.issues.is_empty() {
        writeln!(output, "  Needs improvement:")?;
        for issue in &structure.issues {
            writeln!(output, "    {issue}")?;
        }
        writeln!(output)?;
    }

    Ok(())
}

pub fn write_instructions<W: Write>(output: &mut W, instructions: &[Instruction]) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "{}", rule('='))?;
    writeln!(output, "  🤖 Correction instructions")?;
    writeln!(output, "{}", rule('='))?;

    if instructions.is_empty() {
        writeln!(output)?;
        writeln!(output, "  ✅ No corrections needed; every page meets the rubric.")?;
        writeln!(output)?;
        return Ok(());
    }

    writeln!(output)?;
    writeln!(
        output,
        "  Instructions: {} (in priority order)",
        instructions.len()
    )?;
    writeln!(output)?;
    for instruction in instructions {
        writeln!(
            output,
            "  [{}] {}: {}",
            instruction.priority,
            instruction.kind.label(),
            instruction.target
        )?;
        writeln!(output, "      {}", instruction.summary)?;
        for (index, action) in instruction.actions.iter().enumerate() {
            writeln!(output, "        [{}] {action}", index + 1)?;
        }
        writeln!(output)?;
    }

    Ok(())
}
